//! C5(a) - input commitment. Binds every public output to one specific
//! input set: `H_input = Poseidon(flatten(student_prefs, college_prefs,
//! capacities, pubkey_hashes))`, canonical order per spec §4.5.

use crate::curve::{Curve, Field};
use crate::error::{MatchError, Result};
use crate::hash::{poseidon_hash, pubkey_hash};

const LOG_TARGET: &str = "veilmatch::commitment";

/// Flattens the canonical sequence - all student_prefs row-major, then all
/// college_prefs row-major, then capacities, then student pubkey hashes,
/// then college pubkey hashes - and hashes it with the single algebraic
/// hash used throughout the core.
#[tracing::instrument(target = LOG_TARGET, skip_all)]
pub fn compute_input_commitment<
    const N_S: usize,
    const N_C: usize,
    const MAX_PREFS: usize,
>(
    student_prefs: &[[u16; MAX_PREFS]; N_S],
    college_prefs: &[[u16; N_S]; N_C],
    college_capacities: &[u8; N_C],
    student_pubkeys: &[Curve; N_S],
    college_pubkeys: &[Curve; N_C],
) -> Field {
    let mut flattened = Vec::with_capacity(
        N_S * MAX_PREFS + N_C * N_S + N_C + N_S + N_C,
    );

    for row in student_prefs {
        flattened.extend(row.iter().map(|&v| Field::from(v)));
    }
    for row in college_prefs {
        flattened.extend(row.iter().map(|&v| Field::from(v)));
    }
    flattened.extend(college_capacities.iter().map(|&v| Field::from(v)));
    flattened.extend(student_pubkeys.iter().map(pubkey_hash));
    flattened.extend(college_pubkeys.iter().map(pubkey_hash));

    poseidon_hash(&flattened)
}

/// Recomputes `H_input` and asserts it equals the caller-supplied public
/// input, per §7's `CommitmentMismatch` handling.
pub fn verify_input_commitment<const N_S: usize, const N_C: usize, const MAX_PREFS: usize>(
    student_prefs: &[[u16; MAX_PREFS]; N_S],
    college_prefs: &[[u16; N_S]; N_C],
    college_capacities: &[u8; N_C],
    student_pubkeys: &[Curve; N_S],
    college_pubkeys: &[Curve; N_C],
    supplied: Field,
) -> Result<()> {
    let recomputed = compute_input_commitment(
        student_prefs,
        college_prefs,
        college_capacities,
        student_pubkeys,
        college_pubkeys,
    );
    if recomputed != supplied {
        return Err(MatchError::CommitmentMismatch);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_ff::Zero;

    #[test]
    fn commitment_is_deterministic() {
        let student_prefs: [[u16; 2]; 2] = [[0, 1], [1, 0]];
        let college_prefs: [[u16; 2]; 2] = [[0, 1], [1, 0]];
        let capacities = [1u8, 1];
        let keys = [Curve::zero(); 2];

        let a = compute_input_commitment(&student_prefs, &college_prefs, &capacities, &keys, &keys);
        let b = compute_input_commitment(&student_prefs, &college_prefs, &capacities, &keys, &keys);
        assert_eq!(a, b);
    }

    #[test]
    fn commitment_changes_with_any_byte_of_input() {
        let student_prefs: [[u16; 2]; 2] = [[0, 1], [1, 0]];
        let college_prefs: [[u16; 2]; 2] = [[0, 1], [1, 0]];
        let capacities = [1u8, 1];
        let keys = [Curve::zero(); 2];

        let base = compute_input_commitment(&student_prefs, &college_prefs, &capacities, &keys, &keys);

        let mut tweaked_capacities = capacities;
        tweaked_capacities[0] = 0;
        let tweaked = compute_input_commitment(
            &student_prefs,
            &college_prefs,
            &tweaked_capacities,
            &keys,
            &keys,
        );
        assert_ne!(base, tweaked);
    }

    #[test]
    fn verify_rejects_mismatched_commitment() {
        let student_prefs: [[u16; 2]; 2] = [[0, 1], [1, 0]];
        let college_prefs: [[u16; 2]; 2] = [[0, 1], [1, 0]];
        let capacities = [1u8, 1];
        let keys = [Curve::zero(); 2];

        let result = verify_input_commitment(
            &student_prefs,
            &college_prefs,
            &capacities,
            &keys,
            &keys,
            Field::from(0u64),
        );
        assert!(matches!(result, Err(MatchError::CommitmentMismatch)));
    }
}
