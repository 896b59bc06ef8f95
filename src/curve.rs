//! C1: field & curve operations over the embedded curve.
//!
//! The embedded curve is Grumpkin: its base field (`ark_grumpkin::Fq`) is the
//! same field as BN254's scalar field, so a commitment produced here slots
//! into a BN254-based SNARK circuit without a field mismatch (checked below
//! in `field_matches_bn254_scalar_field`). `Field` below is that base field;
//! `Scalar` is Grumpkin's own scalar field, used for private keys,
//! permutation randomizers and ElGamal blinding factors.

use crate::error::{MatchError, Result};
use ark_ec::{CurveGroup, PrimeGroup};
use ark_ff::{BigInteger, PrimeField, Zero};
use ark_serialize::CanonicalSerialize;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Mutex;

pub type Curve = ark_grumpkin::Projective;
pub type Scalar = <Curve as PrimeGroup>::ScalarField;
pub type Field = <Curve as CurveGroup>::BaseField;

const LOG_TARGET: &str = "veilmatch::curve";

/// Affine wire representation matching the external-interface `(x, y,
/// is_infinity)` record. `Curve` itself (a projective point) is used for all
/// internal arithmetic; this type exists only at serialization boundaries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AffinePoint {
    pub x: Field,
    pub y: Field,
    pub is_infinity: bool,
}

impl From<Curve> for AffinePoint {
    fn from(p: Curve) -> Self {
        let affine = p.into_affine();
        if affine.is_zero() {
            AffinePoint { x: Field::from(0u64), y: Field::from(0u64), is_infinity: true }
        } else {
            AffinePoint { x: affine.x, y: affine.y, is_infinity: false }
        }
    }
}

impl From<AffinePoint> for Curve {
    fn from(p: AffinePoint) -> Self {
        use ark_ec::short_weierstrass::Affine;
        if p.is_infinity {
            Curve::zero()
        } else {
            Affine::<<Curve as CurveGroup>::Config>::new_unchecked(p.x, p.y).into()
        }
    }
}

/// Reduces a `Field` element into a `Scalar`. Truncation mod `r` is accepted
/// rather than rejected, matching the source's `from_field` behavior.
pub fn scalar_from_field(f: Field) -> Scalar {
    let bytes = f.into_bigint().to_bytes_le();
    Scalar::from_le_bytes_mod_order(&bytes)
}

pub fn fixed_base_mul(k: Scalar) -> Curve {
    Curve::generator() * k
}

pub fn var_base_mul(p: Curve, k: Scalar) -> Curve {
    p * k
}

pub fn point_add(p: Curve, q: Curve) -> Curve {
    p + q
}

pub fn point_neg(p: Curve) -> Curve {
    -p
}

fn point_key(p: &Curve) -> Vec<u8> {
    let mut bytes = Vec::new();
    p.into_affine()
        .serialize_compressed(&mut bytes)
        .expect("affine point serialization cannot fail");
    bytes
}

/// Baby-step/giant-step table for recovering `k` from `k * G` when `k <
/// 2^max_bits`. Built once per `(generator, max_bits)` pair and reused across
/// decryptions - see [`cached_table`].
pub struct BabyStepTable {
    baby_steps: HashMap<Vec<u8>, u64>,
    giant_step: Curve,
    bound: u64,
}

impl BabyStepTable {
    #[tracing::instrument(target = LOG_TARGET, skip_all, fields(max_bits))]
    pub fn new(max_bits: u32) -> Self {
        let bound = (1u64 << max_bits.div_ceil(2)).max(1);
        let g = Curve::generator();

        let mut baby_steps = HashMap::with_capacity(bound as usize + 1);
        let mut acc = Curve::zero();
        for i in 0..=bound {
            baby_steps.entry(point_key(&acc)).or_insert(i);
            acc += g;
        }

        let giant_step = -(g * Scalar::from(bound));

        Self { baby_steps, giant_step, bound }
    }

    /// Solves `p = k * G` for `k < 2^max_bits`, per the constructor's bound.
    #[tracing::instrument(target = LOG_TARGET, skip_all)]
    pub fn solve(&self, p: Curve) -> Result<u64> {
        let mut q = p;
        for j in 0..=self.bound {
            if let Some(&i) = self.baby_steps.get(&point_key(&q)) {
                return Ok(i + j * self.bound);
            }
            q += self.giant_step;
        }
        Err(MatchError::DecryptionFailed(self.bound * self.bound))
    }
}

static TABLE_CACHE: Lazy<Mutex<HashMap<u32, std::sync::Arc<BabyStepTable>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Returns a process-wide cached [`BabyStepTable`] for the given `max_bits`,
/// building it on first use. Generalizes the teacher's 52-card lookup table
/// (`player_decryption`'s `CardValueMap`) to an arbitrary bit bound.
pub fn cached_table(max_bits: u32) -> std::sync::Arc<BabyStepTable> {
    let mut cache = TABLE_CACHE.lock().expect("baby-step cache poisoned");
    cache
        .entry(max_bits)
        .or_insert_with(|| std::sync::Arc::new(BabyStepTable::new(max_bits)))
        .clone()
}

/// Solves `p = k * G` for `k < 2^max_bits` using the cached table.
pub fn babystep_giantstep(p: Curve, max_bits: u32) -> Result<u64> {
    cached_table(max_bits).solve(p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_ff::UniformRand;
    use ark_std::test_rng;

    #[test]
    fn babystep_giantstep_recovers_small_scalars() {
        let table = BabyStepTable::new(8);
        for k in [0u64, 1, 5, 17, 200, 255] {
            let p = Curve::generator() * Scalar::from(k);
            assert_eq!(table.solve(p).unwrap(), k);
        }
    }

    #[test]
    fn babystep_giantstep_fails_above_bound() {
        let table = BabyStepTable::new(4);
        let p = Curve::generator() * Scalar::from(1000u64);
        assert!(table.solve(p).is_err());
    }

    #[test]
    fn point_add_neg_roundtrip() {
        let mut rng = test_rng();
        let k = Scalar::rand(&mut rng);
        let p = fixed_base_mul(k);
        assert_eq!(point_add(p, point_neg(p)), Curve::zero());
    }

    #[test]
    fn affine_point_roundtrip_preserves_infinity_flag() {
        let infinity = AffinePoint::from(Curve::zero());
        assert!(infinity.is_infinity);
        assert_eq!(Curve::from(infinity), Curve::zero());

        let mut rng = test_rng();
        let k = Scalar::rand(&mut rng);
        let p = fixed_base_mul(k);
        let affine = AffinePoint::from(p);
        assert!(!affine.is_infinity);
        assert_eq!(Curve::from(affine), p);
    }

    #[test]
    fn cached_table_reused_across_calls() {
        let k = 42u64;
        let p = Curve::generator() * Scalar::from(k);
        assert_eq!(babystep_giantstep(p, 10).unwrap(), k);
        assert_eq!(babystep_giantstep(p, 10).unwrap(), k);
    }

    /// Grumpkin's base field is BN254's scalar field by construction; this is
    /// the fact the module doc comment claims, checked directly rather than
    /// left as an assertion in prose.
    #[test]
    fn field_matches_bn254_scalar_field() {
        assert_eq!(Field::MODULUS, ark_bn254::Fr::MODULUS);
    }
}
