//! C2 - exponential ElGamal over the embedded curve, bounded to small
//! plaintexts so decryption can recover the integer via
//! baby-step/giant-step. Ciphertext shape and `add_encryption_layer` are
//! carried from the teacher's `shuffling::data_structures::ElGamalCiphertext`
//! (itself a card-deck ElGamal layer); the bounded-plaintext range check,
//! the derived-randomness path and `decrypt_to_scalar` are new.

use crate::curve::{babystep_giantstep, fixed_base_mul, scalar_from_field, Curve, Field, Scalar};
use crate::data::{BITS_DL, UNMATCHED};
use crate::error::{MatchError, Result};
use crate::hash::poseidon_hash;
use ark_ec::PrimeGroup;
use ark_ff::Zero;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

const LOG_TARGET: &str = "veilmatch::elgamal";

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, CanonicalSerialize, CanonicalDeserialize,
)]
pub struct ElGamalCiphertext {
    #[serde(with = "crate::serde_support::canonical_hex")]
    pub c1: Curve,
    #[serde(with = "crate::serde_support::canonical_hex")]
    pub c2: Curve,
}

impl ElGamalCiphertext {
    pub fn new(c1: Curve, c2: Curve) -> Self {
        Self { c1, c2 }
    }

    /// Padding ciphertext `(∞, ∞)`, per spec §3.
    pub fn infinity() -> Self {
        Self { c1: Curve::zero(), c2: Curve::zero() }
    }

    /// `(r*G, r*pk + msg*G)`. Fails with `InvalidPlaintext` unless `0 <= msg
    /// < 2^BITS_DL`. `randomness` must never be reused across encryptions.
    #[tracing::instrument(target = LOG_TARGET, skip_all, fields(msg))]
    pub fn encrypt(public_key: Curve, msg: u64, randomness: Scalar) -> Result<Self> {
        if msg >= (1u64 << BITS_DL) {
            return Err(MatchError::InvalidPlaintext(msg, BITS_DL));
        }
        let g = Curve::generator();
        let message_point = g * Scalar::from(msg);
        Ok(Self {
            c1: g * randomness,
            c2: message_point + public_key * randomness,
        })
    }

    /// `c2 - sk*c1`, yielding `msg*G`.
    pub fn decrypt_to_point(&self, secret_key: Scalar) -> Curve {
        self.c2 - self.c1 * secret_key
    }

    /// Recovers the integer plaintext via baby-step/giant-step, bounded by
    /// `BITS_DL`.
    #[tracing::instrument(target = LOG_TARGET, skip_all)]
    pub fn decrypt_to_scalar(&self, secret_key: Scalar) -> Result<u64> {
        babystep_giantstep(self.decrypt_to_point(secret_key), BITS_DL)
    }

    /// Additively homomorphic ciphertext combination: `(c1_a + c1_b, c2_a +
    /// c2_b)` decrypts to `a + b`, as long as the sum stays below
    /// `2^BITS_DL` - enforcing that bound is the caller's responsibility.
    pub fn add(&self, other: &Self) -> Self {
        Self { c1: self.c1 + other.c1, c2: self.c2 + other.c2 }
    }
}

#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ElGamalKeys {
    pub secret_key: Scalar,
    #[zeroize(skip)]
    pub public_key: Curve,
}

impl ElGamalKeys {
    pub fn new(secret_key: Scalar) -> Self {
        Self { secret_key, public_key: fixed_base_mul(secret_key) }
    }
}

/// Derives the encryption randomness for the `i`-th ciphertext in a matching
/// round as `H(msg, pk.x, pk.y, recipient_id, i, nonce_seed)`, so the prover
/// never needs a trusted off-circuit RNG at encryption time. Security rests
/// on `nonce_seed` being secret and `H` behaving as a random oracle - this
/// is a design assumption, not a proof.
pub fn derive_randomness(
    msg: u64,
    public_key: Curve,
    recipient_id: u16,
    i: u64,
    nonce_seed: Field,
) -> Scalar {
    let affine = ark_ec::CurveGroup::into_affine(public_key);
    let inputs = [
        Field::from(msg),
        affine.x,
        affine.y,
        Field::from(recipient_id),
        Field::from(i),
        nonce_seed,
    ];
    scalar_from_field(poseidon_hash(&inputs))
}

/// Off-circuit, host-side decryption entry point (spec §6). Returns
/// `plaintext - 1` when decryption succeeds and falls in `[1, 2^BITS_DL]`,
/// else `UNMATCHED`. Fails only when the baby-step/giant-step search is
/// exhausted.
pub fn decrypt_match(ciphertext: &ElGamalCiphertext, secret_key: Scalar) -> Result<u16> {
    let plaintext = ciphertext.decrypt_to_scalar(secret_key)?;
    if plaintext == 0 || plaintext > (1u64 << BITS_DL) {
        return Ok(UNMATCHED);
    }
    Ok((plaintext - 1) as u16)
}
