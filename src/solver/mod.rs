//! C4 - the matching solver. Two independent, interchangeable variants
//! sharing the same envelope (permute → solve → encrypt → commit), mirroring
//! the teacher's habit of carrying multiple interchangeable shuffle backends
//! (`rs_shuffle`, `bayer_groth`) behind one `ElGamalCiphertext` surface.

pub mod deferred_acceptance;
pub mod kidney_exchange;

pub use deferred_acceptance::solve_deferred_acceptance;
pub use kidney_exchange::{find_cycles, CompatEdge, Cycle};

/// Which C4 algorithm a [`crate::session::MatchingSession`] runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchingVariant {
    /// Variant A: college-proposing deferred acceptance with capacities.
    StableMatching,
    /// Variant B: kidney-exchange 2-/3-cycle enumeration.
    KidneyExchange,
}
