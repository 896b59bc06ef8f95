//! Data model per spec §3: participants, preferences, capacities, public
//! keys and match records, all fixed-size and const-generic over the
//! compile-time population sizes.

use crate::curve::{Curve, Field};
use crate::error::{MatchError, Result};

/// Sentinel marking "no match / padding". Never equals a valid index.
pub const UNMATCHED: u16 = 999;

/// Default discrete-log search bound for C2, matching the source.
pub const BITS_DL: u32 = 16;

/// `TOTAL_CAP = N_S + N_C * MAX_CAP`, the number of ciphertext slots.
pub const fn total_cap(n_s: usize, n_c: usize, max_cap: usize) -> usize {
    n_s + n_c * max_cap
}

/// One matching round's full input, per the external-interface record in
/// spec §6 (everything but `operation` and the Merkle-proof fields, which
/// live on [`crate::session::MatchingSession`]).
#[derive(Clone, Debug)]
pub struct MatchingInput<const N_S: usize, const N_C: usize, const MAX_PREFS: usize> {
    /// `student_prefs[s]`: ordered college indices, `UNMATCHED`-padded.
    pub student_prefs: [[u16; MAX_PREFS]; N_S],
    /// `college_prefs[c]`: ordered student indices, `UNMATCHED`-padded.
    pub college_prefs: [[u16; N_S]; N_C],
    pub college_capacities: [u8; N_C],
    pub student_pubkeys: [Curve; N_S],
    pub college_pubkeys: [Curve; N_C],
    pub actual_student_list: usize,
    pub actual_uni_list: usize,
}

impl<const N_S: usize, const N_C: usize, const MAX_PREFS: usize>
    MatchingInput<N_S, N_C, MAX_PREFS>
{
    /// Validates the §3 row/capacity invariants. Violations are
    /// `InvalidInput`, per the §7 error taxonomy - these are supposed to be
    /// unreachable for an honest prover, but the core asserts them rather
    /// than trusting the caller.
    pub fn validate(&self, max_cap: usize) -> Result<()> {
        if self.actual_student_list > N_S {
            return Err(MatchError::InvalidInput(format!(
                "actual_student_list {} exceeds N_S {}",
                self.actual_student_list, N_S
            )));
        }
        if self.actual_uni_list > N_C {
            return Err(MatchError::InvalidInput(format!(
                "actual_uni_list {} exceeds N_C {}",
                self.actual_uni_list, N_C
            )));
        }

        for (s, row) in self.student_prefs.iter().enumerate() {
            validate_row(row, N_C as u16, s >= self.actual_student_list)?;
        }
        for (c, row) in self.college_prefs.iter().enumerate() {
            validate_row(row, N_S as u16, c >= self.actual_uni_list)?;
        }

        for (c, &cap) in self.college_capacities.iter().enumerate() {
            if cap as usize > max_cap {
                return Err(MatchError::InvalidInput(format!(
                    "college {c} capacity {cap} exceeds MAX_CAP {max_cap}"
                )));
            }
            if c >= self.actual_uni_list && cap != 0 {
                return Err(MatchError::InvalidInput(format!(
                    "inactive college {c} has nonzero capacity {cap}"
                )));
            }
        }

        Ok(())
    }
}

/// A valid row is a prefix of real, pairwise-distinct indices `< bound`,
/// followed by `UNMATCHED` padding; an inactive row (`beyond_active`) must be
/// all `UNMATCHED`.
fn validate_row(row: &[u16], bound: u16, beyond_active: bool) -> Result<()> {
    let mut seen = std::collections::HashSet::new();
    let mut hit_padding = false;
    for &v in row {
        if v == UNMATCHED {
            hit_padding = true;
            continue;
        }
        if hit_padding {
            return Err(MatchError::InvalidInput(
                "real entry follows UNMATCHED padding".into(),
            ));
        }
        if beyond_active {
            return Err(MatchError::InvalidInput(
                "inactive row has a real entry".into(),
            ));
        }
        if v >= bound {
            return Err(MatchError::InvalidInput(format!(
                "preference entry {v} out of range (< {bound})"
            )));
        }
        if !seen.insert(v) {
            return Err(MatchError::InvalidInput(format!(
                "duplicate preference entry {v}"
            )));
        }
    }
    Ok(())
}

/// `(s_id, c_id, nonce, commitment)` per spec §3. `UNMATCHED` sentinels fill
/// unused slots; `commitment` is the Merkle leaf `H(recipient_id, match_id,
/// nonce)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatchRecord {
    pub s_id: u16,
    pub c_id: u16,
    pub nonce: Field,
    pub commitment: Field,
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_ff::Zero;

    fn row<const N: usize>(vals: &[u16]) -> [u16; N] {
        let mut out = [UNMATCHED; N];
        out[..vals.len()].copy_from_slice(vals);
        out
    }

    #[test]
    fn validate_accepts_well_formed_input() {
        let input: MatchingInput<3, 2, 2> = MatchingInput {
            student_prefs: [row(&[0, 1]), row(&[1, 0]), row(&[0])],
            college_prefs: [row(&[0, 1, 2]), row(&[2, 1, 0])],
            college_capacities: [1, 1],
            student_pubkeys: [Curve::zero(); 3],
            college_pubkeys: [Curve::zero(); 2],
            actual_student_list: 3,
            actual_uni_list: 2,
        };
        assert!(input.validate(1).is_ok());
    }

    #[test]
    fn validate_rejects_duplicate_preference() {
        let input: MatchingInput<2, 2, 2> = MatchingInput {
            student_prefs: [row(&[0, 0]), row(&[0, 1])],
            college_prefs: [row(&[0, 1]), row(&[1, 0])],
            college_capacities: [1, 1],
            student_pubkeys: [Curve::zero(); 2],
            college_pubkeys: [Curve::zero(); 2],
            actual_student_list: 2,
            actual_uni_list: 2,
        };
        assert!(input.validate(1).is_err());
    }

    #[test]
    fn validate_rejects_capacity_above_max() {
        let input: MatchingInput<1, 1, 1> = MatchingInput {
            student_prefs: [row(&[0])],
            college_prefs: [row(&[0])],
            college_capacities: [5],
            student_pubkeys: [Curve::zero(); 1],
            college_pubkeys: [Curve::zero(); 1],
            actual_student_list: 1,
            actual_uni_list: 1,
        };
        assert!(input.validate(1).is_err());
    }

    #[test]
    fn validate_rejects_inactive_row_with_real_entry() {
        let input: MatchingInput<2, 1, 1> = MatchingInput {
            student_prefs: [row(&[0]), row(&[0])],
            college_prefs: [row(&[0, 1])],
            college_capacities: [1],
            student_pubkeys: [Curve::zero(); 2],
            college_pubkeys: [Curve::zero(); 1],
            actual_student_list: 1,
            actual_uni_list: 1,
        };
        assert!(input.validate(1).is_err());
    }
}
