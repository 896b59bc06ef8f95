//! C3 - the identity-permutation layer. A single Field `permutation_seed`
//! drives two independent Fisher–Yates shuffles via a keyed LCG. Per the
//! design note, this PRG is deliberately *not* cryptographically strong:
//! `π` is a private witness the adversary never observes, so it only needs
//! to be a bijection. Do not reuse this PRG for nonce or key derivation.

use crate::curve::Field;
use ark_ff::{BigInteger, PrimeField};

const LCG_A: u64 = 1_103_515_245;
const LCG_B: u64 = 12_345;
const LCG_M: u64 = (1u64 << 31) - 1;

fn lcg_rand(seed: u64, i: u64) -> u64 {
    seed.wrapping_mul(LCG_A).wrapping_add(LCG_B).wrapping_add(i) % LCG_M
}

fn seed_to_u64(seed: Field) -> u64 {
    let bytes = seed.into_bigint().to_bytes_le();
    let mut buf = [0u8; 8];
    let n = bytes.len().min(8);
    buf[..n].copy_from_slice(&bytes[..n]);
    u64::from_le_bytes(buf)
}

/// A bijection on `[0, N)`, represented as the forward mapping `original
/// index -> permuted index`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Permutation<const N: usize> {
    forward: [usize; N],
}

impl<const N: usize> Permutation<N> {
    /// Fisher–Yates over `[0, N)` keyed by `seed`, per the source's
    /// `rand(seed, i) = (seed*A + B + i) mod M`.
    pub fn generate(seed: Field) -> Self {
        let seed = seed_to_u64(seed);
        let mut forward: [usize; N] = std::array::from_fn(|i| i);
        for i in (1..N).rev() {
            let r = lcg_rand(seed, i as u64);
            let j = (r as usize) % (i + 1);
            forward.swap(i, j);
        }
        Self { forward }
    }

    pub fn image(&self, original_index: usize) -> usize {
        self.forward[original_index]
    }

    /// `invert(apply(x)) = x`, per the §4.3 invariant.
    pub fn inverse(&self) -> Self {
        let mut inv = [0usize; N];
        for (original, &permuted) in self.forward.iter().enumerate() {
            inv[permuted] = original;
        }
        Self { forward: inv }
    }

    /// `apply_keys(keys, π)`: permuted index `π[i]` receives `keys[i]`.
    pub fn apply_keys<T: Copy>(&self, keys: &[T; N], fill: T) -> [T; N] {
        let mut out = [fill; N];
        for (i, &k) in keys.iter().enumerate() {
            out[self.forward[i]] = k;
        }
        out
    }
}

/// `apply(prefs, π_self, π_other)`: at permuted row `π_self[i]`, store
/// `[π_other[prefs[i][j]]]` for each real entry, `UNMATCHED` kept as-is.
pub fn apply_preferences<const N: usize, const M: usize, const ROW: usize>(
    prefs: &[[u16; ROW]; N],
    pi_self: &Permutation<N>,
    pi_other: &Permutation<M>,
    unmatched: u16,
) -> [[u16; ROW]; N] {
    let mut out = [[unmatched; ROW]; N];
    for (i, row) in prefs.iter().enumerate() {
        let mut mapped = [unmatched; ROW];
        for (j, &v) in row.iter().enumerate() {
            mapped[j] = if v == unmatched { unmatched } else { pi_other.image(v as usize) as u16 };
        }
        out[pi_self.image(i)] = mapped;
    }
    out
}

/// `invert(matches, π_S, π_C)`: recovers original-ID student→college matches
/// from permuted matches.
pub fn invert_matches<const N_S: usize, const N_C: usize>(
    permuted_matches: &[u16; N_S],
    pi_s: &Permutation<N_S>,
    pi_c: &Permutation<N_C>,
    unmatched: u16,
) -> [u16; N_S] {
    let inv_s = pi_s.inverse();
    let inv_c = pi_c.inverse();
    let mut out = [unmatched; N_S];
    for (permuted_s, &permuted_c) in permuted_matches.iter().enumerate() {
        let original_s = inv_s.image(permuted_s);
        out[original_s] = if permuted_c == unmatched {
            unmatched
        } else {
            inv_c.image(permuted_c as usize) as u16
        };
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_bijection<const N: usize>(p: &Permutation<N>) -> bool {
        let mut seen = [false; N];
        for i in 0..N {
            let img = p.image(i);
            if seen[img] {
                return false;
            }
            seen[img] = true;
        }
        true
    }

    #[test]
    fn generated_permutation_is_a_bijection() {
        for seed in [0u64, 1, 42, 999999] {
            let p: Permutation<10> = Permutation::generate(Field::from(seed));
            assert!(is_bijection(&p));
        }
    }

    #[test]
    fn inverse_undoes_permutation() {
        let p: Permutation<7> = Permutation::generate(Field::from(123456u64));
        let inv = p.inverse();
        for i in 0..7 {
            assert_eq!(inv.image(p.image(i)), i);
        }
    }

    #[test]
    fn apply_preferences_maps_unmatched_through() {
        const UNM: u16 = 999;
        let pi_s: Permutation<3> = Permutation::generate(Field::from(7u64));
        let pi_c: Permutation<2> = Permutation::generate(Field::from(11u64));
        let prefs: [[u16; 2]; 3] = [[0, 1], [1, UNM], [UNM, UNM]];
        let permuted = apply_preferences::<3, 2, 2>(&prefs, &pi_s, &pi_c, UNM);

        // row 2 (all-UNMATCHED) stays all-UNMATCHED wherever it lands.
        let dest = pi_s.image(2);
        assert_eq!(permuted[dest], [UNM, UNM]);
    }

    #[test]
    fn invert_matches_roundtrips_through_permutation() {
        const UNM: u16 = 999;
        let pi_s: Permutation<4> = Permutation::generate(Field::from(55u64));
        let pi_c: Permutation<3> = Permutation::generate(Field::from(77u64));

        let original_matches: [u16; 4] = [2, UNM, 0, 1];
        let mut permuted_matches = [UNM; 4];
        for (s, &c) in original_matches.iter().enumerate() {
            let permuted_c = if c == UNM { UNM } else { pi_c.image(c as usize) as u16 };
            permuted_matches[pi_s.image(s)] = permuted_c;
        }

        let recovered = invert_matches(&permuted_matches, &pi_s, &pi_c, UNM);
        assert_eq!(recovered, original_matches);
    }
}
