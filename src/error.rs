//! Crate-wide error taxonomy.
//!
//! Mirrors the teacher's per-module `thiserror` enums (see the old
//! `shuffling::error::ShuffleError`), but collapsed into one enum since the
//! matching core is a single logical entry point rather than a family of
//! independent shuffle backends.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("input commitment mismatch")]
    CommitmentMismatch,

    #[error("plaintext {0} is not in [0, 2^{1})")]
    InvalidPlaintext(u64, u32),

    #[error("discrete log search exhausted within {0} baby steps")]
    DecryptionFailed(u64),

    #[error("merkle path has length {actual}, expected {expected}")]
    InvalidMerkleProof { expected: usize, actual: usize },

    #[error("no stable matching exists for the supplied preference lists")]
    SolverUnsatisfiable,
}

pub type Result<T> = std::result::Result<T, MatchError>;
