//! The `MatchingSession` entry point: threads the five components through
//! one matching round. Replaces the source's module-scope globals
//! (`globalMerkleRoot`, `globalStudentMatches`, ...) with fields on a value
//! returned from `solve_*`, per design note "global mutable state -> explicit
//! arguments".

use crate::commitment::verify_input_commitment;
use crate::curve::{Curve, Field};
use crate::data::{total_cap, MatchingInput, MatchRecord, UNMATCHED};
use crate::elgamal::{derive_randomness, ElGamalCiphertext};
use crate::error::Result;
use crate::hash::poseidon_hash;
use crate::merkle::{self, MerkleTree};
use crate::permutation::{apply_preferences, invert_matches, Permutation};
use crate::solver::{find_cycles, solve_deferred_acceptance, CompatEdge, Cycle};
use ark_ff::Zero;

const LOG_TARGET: &str = "veilmatch::session";

/// Which of the three multiplexed operations spec §6 describes a single
/// solver entry point must serve.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Solve = 0,
    VerifyPath = 1,
    GeneratePath = 2,
}

/// The output of a stable-matching round: `TOTAL_CAP` ciphertexts in
/// canonical slot order, the Merkle root over match leaves, and the match
/// records themselves (kept for host-side bookkeeping - the actual
/// participant-facing output is the ciphertexts, per §6).
pub struct MatchingSession<
    const N_S: usize,
    const N_C: usize,
    const MAX_PREFS: usize,
    const MAX_CAP: usize,
> {
    pub ciphertexts: Vec<ElGamalCiphertext>,
    pub input_commitment: Field,
    pub matches: [u16; N_S],
    merkle: MerkleTree,
}

impl<const N_S: usize, const N_C: usize, const MAX_PREFS: usize, const MAX_CAP: usize>
    MatchingSession<N_S, N_C, MAX_PREFS, MAX_CAP>
{
    /// Variant A: permute -> solve (deferred acceptance) -> invert -> encrypt
    /// -> commit, per the data-flow diagram in spec §2.
    #[tracing::instrument(target = LOG_TARGET, skip_all, fields(n_s = N_S, n_c = N_C))]
    pub fn solve_stable_matching(
        input: &MatchingInput<N_S, N_C, MAX_PREFS>,
        nonce_seed: Field,
        permutation_seed: Field,
        input_commitment: Field,
        merkle_height: usize,
    ) -> Result<Self> {
        input.validate(MAX_CAP)?;
        verify_input_commitment(
            &input.student_prefs,
            &input.college_prefs,
            &input.college_capacities,
            &input.student_pubkeys,
            &input.college_pubkeys,
            input_commitment,
        )?;

        // π_S and π_C must be independent (spec §4.3): deriving both from the
        // same seed would make them identical whenever N_S == N_C, since the
        // LCG only depends on the seed and the slot index, not on N. Domain
        // separate π_C's seed from π_S's with the single algebraic hash.
        let pi_s: Permutation<N_S> = Permutation::generate(permutation_seed);
        let college_permutation_seed = poseidon_hash(&[permutation_seed, Field::from(1u64)]);
        let pi_c: Permutation<N_C> = Permutation::generate(college_permutation_seed);

        let permuted_student_prefs =
            apply_preferences::<N_S, N_C, MAX_PREFS>(&input.student_prefs, &pi_s, &pi_c, UNMATCHED);
        let permuted_college_prefs =
            apply_preferences::<N_C, N_S, N_S>(&input.college_prefs, &pi_c, &pi_s, UNMATCHED);
        let permuted_capacities = pi_c.apply_keys(&input.college_capacities, 0u8);

        let permuted_matches = solve_deferred_acceptance::<N_S, N_C, MAX_PREFS, MAX_CAP>(
            &permuted_student_prefs,
            &permuted_college_prefs,
            &permuted_capacities,
            input.actual_student_list,
            input.actual_uni_list,
        );

        let original_matches = invert_matches(&permuted_matches, &pi_s, &pi_c, UNMATCHED);

        Self::assemble(input, original_matches, nonce_seed, input_commitment, merkle_height)
    }

    /// Builds per-recipient ciphertexts (C5b), per-match commitments and the
    /// Merkle tree (C5c) from original-identity matches.
    fn assemble(
        input: &MatchingInput<N_S, N_C, MAX_PREFS>,
        matches: [u16; N_S],
        nonce_seed: Field,
        input_commitment: Field,
        merkle_height: usize,
    ) -> Result<Self> {
        // Per-college bags of matched students, in ascending student order,
        // UNMATCHED-padded to MAX_CAP, to fill the college ciphertext slots.
        let mut college_bags = vec![[UNMATCHED; MAX_CAP]; N_C];
        for (s, &c) in matches.iter().enumerate() {
            if c == UNMATCHED {
                continue;
            }
            let bag = &mut college_bags[c as usize];
            let slot = bag
                .iter()
                .position(|&v| v == UNMATCHED)
                .expect("college bag overflowed MAX_CAP; capacity invariant was violated upstream");
            bag[slot] = s as u16;
        }

        let total = total_cap(N_S, N_C, MAX_CAP);
        let mut ciphertexts = Vec::with_capacity(total);
        let mut match_records: Vec<MatchRecord> = Vec::new();
        let mut leaves = vec![Field::zero(); N_S];

        for s in 0..N_S {
            let c = matches[s];
            let plaintext = if c == UNMATCHED { 1000u64 } else { c as u64 + 1 };
            let pk = input.student_pubkeys[s];
            let r = derive_randomness(plaintext, pk, s as u16, s as u64, nonce_seed);
            ciphertexts.push(ElGamalCiphertext::encrypt(pk, plaintext, r)?);

            if c != UNMATCHED {
                let nonce = poseidon_hash(&[Field::from(s as u64), Field::from(c), nonce_seed]);
                let commitment = poseidon_hash(&[Field::from(s as u64), Field::from(c), nonce]);
                leaves[s] = commitment;
                match_records.push(MatchRecord { s_id: s as u16, c_id: c, nonce, commitment });
            }
        }

        for c in 0..N_C {
            let pk = input.college_pubkeys[c];
            for (slot, &s) in college_bags[c].iter().enumerate() {
                let plaintext = if s == UNMATCHED { 1000u64 } else { s as u64 + 1 };
                let i = (N_S + c * MAX_CAP + slot) as u64;
                let r = derive_randomness(plaintext, pk, c as u16, i, nonce_seed);
                ciphertexts.push(ElGamalCiphertext::encrypt(pk, plaintext, r)?);
            }
        }

        let merkle = MerkleTree::build(merkle_height, leaves);

        Ok(Self { ciphertexts, input_commitment, matches, merkle })
    }

    pub fn merkle_root(&self) -> Field {
        self.merkle.root()
    }

    /// Operation 2: authentication path for the leaf at `index`.
    pub fn generate_path(&self, index: usize) -> Vec<Field> {
        self.merkle.generate_path(index)
    }

    /// Operation 1: verifies a claimed leaf + path against this session's
    /// root.
    pub fn verify_path(&self, leaf: Field, index: usize, path: &[Field], height: usize) -> Result<bool> {
        merkle::verify_path(self.merkle_root(), leaf, index, path, height)
    }
}

/// The full external-interface record from spec §6: a single multiplexed
/// witness, `operation`-tagged, that a future circuit would consume whole
/// regardless of which of the three modes it runs - unused fields for a
/// given operation are simply ignored, the way the teacher's own record-style
/// circuit inputs carry fields unused by a particular code path.
pub struct CircuitWitness<const N_S: usize, const N_C: usize, const MAX_PREFS: usize, const MAX_CAP: usize>
{
    pub operation: Operation,
    pub input: MatchingInput<N_S, N_C, MAX_PREFS>,
    pub nonce_seed: Field,
    pub permutation_seed: Field,
    pub input_commitment: Field,
    pub merkle_height: usize,
    /// Used only when `operation == VerifyPath`.
    pub merkle_path: Vec<Field>,
    /// Used when `operation` is `VerifyPath` or `GeneratePath`.
    pub merkle_index: usize,
    /// Used only when `operation == VerifyPath`.
    pub merkle_leaf: Field,
}

/// The public outputs for whichever operation a [`CircuitWitness`] selects,
/// per spec §6's return shape.
pub enum CircuitOutput {
    Solve { ciphertexts: Vec<ElGamalCiphertext>, merkle_root: Field },
    VerifyPath { merkle_root: Field, verified: bool },
    GeneratePath { merkle_root: Field, path: Vec<Field> },
}

impl<const N_S: usize, const N_C: usize, const MAX_PREFS: usize, const MAX_CAP: usize>
    CircuitWitness<N_S, N_C, MAX_PREFS, MAX_CAP>
{
    /// Runs the matching round once - every operation needs the same
    /// ciphertexts/root, `solve` just also returns them, `verify_path` and
    /// `generate_path` reuse the Merkle tree they imply - then dispatches on
    /// `operation`, per the §4.5(c) "multiplexed `operation`" design.
    #[tracing::instrument(target = LOG_TARGET, skip_all, fields(operation = ?self.operation))]
    pub fn dispatch(&self) -> Result<CircuitOutput> {
        let session = MatchingSession::<N_S, N_C, MAX_PREFS, MAX_CAP>::solve_stable_matching(
            &self.input,
            self.nonce_seed,
            self.permutation_seed,
            self.input_commitment,
            self.merkle_height,
        )?;
        let merkle_root = session.merkle_root();

        Ok(match self.operation {
            Operation::Solve => CircuitOutput::Solve { ciphertexts: session.ciphertexts, merkle_root },
            Operation::VerifyPath => {
                let verified =
                    session.verify_path(self.merkle_leaf, self.merkle_index, &self.merkle_path, self.merkle_height)?;
                CircuitOutput::VerifyPath { merkle_root, verified }
            }
            Operation::GeneratePath => {
                let path = session.generate_path(self.merkle_index);
                CircuitOutput::GeneratePath { merkle_root, path }
            }
        })
    }
}

/// Variant B output: selected cycles plus a Merkle commitment over one leaf
/// per participating pair, reusing the same C2/C5 machinery. The spec's
/// canonical `TOTAL_CAP` ciphertext layout is phrased in terms of
/// `N_S`/`N_C`/`MAX_CAP`, which doesn't apply to the kidney-exchange data
/// model, so this variant packages its own per-pair ciphertexts instead.
pub struct KidneyExchangeSession<const MAX_EDGES: usize, const MAX_CYCLES: usize> {
    pub cycles: [Cycle; MAX_CYCLES],
    pub ciphertexts: Vec<ElGamalCiphertext>,
    merkle: MerkleTree,
}

impl<const MAX_EDGES: usize, const MAX_CYCLES: usize> KidneyExchangeSession<MAX_EDGES, MAX_CYCLES> {
    #[tracing::instrument(target = LOG_TARGET, skip_all, fields(max_edges = MAX_EDGES))]
    pub fn solve(
        edges: &[CompatEdge; MAX_EDGES],
        actual_edge_count: usize,
        pair_pubkeys: &[Curve],
        nonce_seed: Field,
        merkle_height: usize,
    ) -> Result<Self> {
        let cycles = find_cycles::<MAX_EDGES, MAX_CYCLES>(edges, actual_edge_count);

        // For each edge selected into a cycle, the donor pair is told the
        // recipient pair it was matched to; encode as plaintext pair_id + 1.
        let mut partner = vec![UNMATCHED; pair_pubkeys.len()];
        for cycle in &cycles {
            for &edge_idx in &cycle.edges {
                if edge_idx == UNMATCHED {
                    continue;
                }
                let edge = edges[edge_idx as usize];
                partner[edge.from_pair as usize] = edge.to_pair;
            }
        }

        let mut ciphertexts = Vec::with_capacity(pair_pubkeys.len());
        let mut leaves = vec![Field::zero(); pair_pubkeys.len()];
        for (pair_id, &pk) in pair_pubkeys.iter().enumerate() {
            let to = partner[pair_id];
            let plaintext = if to == UNMATCHED { 1000u64 } else { to as u64 + 1 };
            let r = derive_randomness(plaintext, pk, pair_id as u16, pair_id as u64, nonce_seed);
            ciphertexts.push(ElGamalCiphertext::encrypt(pk, plaintext, r)?);

            if to != UNMATCHED {
                let nonce = poseidon_hash(&[Field::from(pair_id as u64), Field::from(to), nonce_seed]);
                leaves[pair_id] = poseidon_hash(&[Field::from(pair_id as u64), Field::from(to), nonce]);
            }
        }

        let merkle = MerkleTree::build(merkle_height, leaves);
        Ok(Self { cycles, ciphertexts, merkle })
    }

    pub fn merkle_root(&self) -> Field {
        self.merkle.root()
    }
}
