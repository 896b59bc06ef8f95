//! A linearly-homomorphic Pedersen commitment over scalar-field elements,
//! carried from the teacher's `pedersen_commitment::native` for an optional
//! hiding commitment to `nonce_seed`/`permutation_seed` (the Sigma-protocol
//! opening proof that consumed it in the teacher is out of scope here, so
//! only the commitment itself survives - see DESIGN.md).

use ark_crypto_primitives::commitment::pedersen::Parameters;
use ark_ec::CurveGroup;
use ark_ff::UniformRand;
use ark_std::rand::RngCore;

const LOG_TARGET: &str = "veilmatch::pedersen_commitment";

pub struct WithCommitment<G: CurveGroup, const N: usize> {
    pub comm: G,
    pub value: [G::ScalarField; N],
}

impl<G: CurveGroup, const N: usize> WithCommitment<G, N> {
    /// Generates a random blinding factor and computes the commitment.
    /// Returns the value and its commitment, plus the blinding factor used.
    pub fn new(
        params: &Parameters<G>,
        value: [G::ScalarField; N],
        rng: &mut impl RngCore,
    ) -> (Self, G::ScalarField) {
        let blinding_factor = G::ScalarField::rand(rng);
        let comm = pedersen_commit_scalars(params, &value, blinding_factor);

        (Self { comm, value }, blinding_factor)
    }
}

/// Extracts `N` bases for a linear Pedersen commitment from the parameters,
/// reusing the window generators as a long list of bases: `(H, [G_1..G_N])`
/// such that `com(v; r) = H^r * Prod_j G_j^{v_j}`.
pub fn extract_pedersen_bases<G, const N: usize>(params: &Parameters<G>) -> (G, [G; N])
where
    G: CurveGroup,
{
    let blinding_base = params.randomness_generator[0].into_affine().into();

    let mut generator_iter = params.generators.iter().flat_map(|row| row.iter());
    let message_bases: [G; N] = std::array::from_fn(|_| {
        let base = generator_iter
            .next()
            .expect("not enough Pedersen generators for the requested N");
        base.into_affine().into()
    });

    (blinding_base, message_bases)
}

/// `com(values; randomness) = H^randomness * Prod_j G_j^{values[j]}`.
#[tracing::instrument(target = LOG_TARGET, skip_all, fields(n = N))]
pub fn pedersen_commit_scalars<G: CurveGroup, const N: usize>(
    params: &Parameters<G>,
    values: &[G::ScalarField; N],
    randomness: G::ScalarField,
) -> G {
    let (blinding_base, message_bases) = extract_pedersen_bases::<G, N>(params);

    message_bases
        .iter()
        .zip(values.iter())
        .fold(blinding_base * randomness, |acc, (base, value)| acc + (*base * value))
}
