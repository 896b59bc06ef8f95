//! The single algebraic hash used throughout the core - input commitments,
//! ElGamal randomness derivation, and Merkle internal nodes all go through
//! this one Poseidon sponge, per the design note that "a single hash" stands
//! in for every `H(...)` in spec §4. Grounded in the teacher's
//! `shuffling::utils::generate_random_values` absorb/squeeze pattern.

use crate::config::poseidon_config;
use crate::curve::{Curve, Field};
use ark_crypto_primitives::sponge::{poseidon::PoseidonSponge, Absorb, CryptographicSponge};

const LOG_TARGET: &str = "veilmatch::hash";

/// `H(inputs...)`, squeezing a single field element.
#[tracing::instrument(target = LOG_TARGET, skip_all, fields(n = inputs.len()))]
pub fn poseidon_hash(inputs: &[Field]) -> Field {
    let config = poseidon_config::<Field>();
    let mut sponge = PoseidonSponge::new(&config);
    sponge.absorb(&inputs.to_vec());
    sponge.squeeze_field_elements(1)[0]
}

/// Absorbs a curve point into a sponge over its base field, following the
/// teacher's `CurveAbsorb` native impl for Grumpkin: points go in affine,
/// using the `Absorb` impl arkworks derives for affine curve coordinates.
pub fn absorb_point(sponge: &mut PoseidonSponge<Field>, point: &Curve) {
    let affine = ark_ec::CurveGroup::into_affine(*point);
    sponge.absorb(&affine);
}

/// Hash of a public key's affine coordinates - the Field-sized handle the
/// circuit binds to, per spec §3 ("each key's x-coordinate hash").
pub fn pubkey_hash(point: &Curve) -> Field {
    let config = poseidon_config::<Field>();
    let mut sponge = PoseidonSponge::new(&config);
    absorb_point(&mut sponge, point);
    sponge.squeeze_field_elements(1)[0]
}

/// Derives `count` pseudorandom field elements from a seed by repeated
/// absorb/squeeze - used for nonce_seed-derived per-match nonces.
pub fn derive_values(seed: Field, count: usize) -> Vec<Field> {
    let config = poseidon_config::<Field>();
    let mut sponge = PoseidonSponge::new(&config);
    sponge.absorb(&seed);
    sponge.squeeze_field_elements(count)
}
