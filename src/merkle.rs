//! C5(c) - Merkle commitment over match leaves. Native generate/verify-path
//! functions are first-class here (not just circuit gadgets), since the
//! spec's `operation ∈ {0,1,2}` implies a plain reference implementation the
//! eventual circuit wraps.

use crate::curve::Field;
use crate::error::{MatchError, Result};
use crate::hash::poseidon_hash;
use ark_ff::Zero;

const LOG_TARGET: &str = "veilmatch::merkle";

/// A complete binary tree of fixed `height`, `2^height` leaves. Leaves
/// beyond the real match count are the zero Field; internal nodes are
/// `H(left, right)` using the same algebraic hash as commitments.
pub struct MerkleTree {
    height: usize,
    levels: Vec<Vec<Field>>,
}

impl MerkleTree {
    #[tracing::instrument(target = LOG_TARGET, skip_all, fields(height))]
    pub fn build(height: usize, mut leaves: Vec<Field>) -> Self {
        let size = 1usize << height;
        assert!(leaves.len() <= size, "more leaves than the tree can hold");
        leaves.resize(size, Field::zero());

        let mut levels = vec![leaves];
        for _ in 0..height {
            let prev = levels.last().expect("levels is never empty");
            let next = prev
                .chunks(2)
                .map(|pair| poseidon_hash(&[pair[0], pair[1]]))
                .collect();
            levels.push(next);
        }

        Self { height, levels }
    }

    pub fn root(&self) -> Field {
        self.levels[self.height][0]
    }

    pub fn leaf(&self, index: usize) -> Field {
        self.levels[0][index]
    }

    /// Sibling hashes along the root-to-leaf walk, bottom to top.
    pub fn generate_path(&self, index: usize) -> Vec<Field> {
        let mut idx = index;
        let mut path = Vec::with_capacity(self.height);
        for level in self.levels.iter().take(self.height) {
            path.push(level[idx ^ 1]);
            idx /= 2;
        }
        path
    }
}

/// Recomputes the root from a claimed `leaf` at `index` and its
/// authentication `path`, comparing against `root`. Errors only on a
/// malformed path length; a legitimate mismatch returns `Ok(false)`, per the
/// §7 handling for `InvalidMerkleProof` ("return verified = false").
pub fn verify_path(root: Field, leaf: Field, index: usize, path: &[Field], height: usize) -> Result<bool> {
    if path.len() != height {
        return Err(MatchError::InvalidMerkleProof { expected: height, actual: path.len() });
    }

    let mut idx = index;
    let mut current = leaf;
    for &sibling in path {
        current = if idx % 2 == 0 {
            poseidon_hash(&[current, sibling])
        } else {
            poseidon_hash(&[sibling, current])
        };
        idx /= 2;
    }
    Ok(current == root)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tree_root_is_stable_zero_leaf_root() {
        let a = MerkleTree::build(3, vec![]);
        let b = MerkleTree::build(3, vec![]);
        assert_eq!(a.root(), b.root());
    }

    #[test]
    fn every_leaf_path_verifies() {
        let height = 4;
        let leaves: Vec<Field> = (0..(1u64 << height)).map(Field::from).collect();
        let tree = MerkleTree::build(height, leaves.clone());
        let root = tree.root();

        for i in 0..(1usize << height) {
            let path = tree.generate_path(i);
            assert!(verify_path(root, leaves[i], i, &path, height).unwrap());
        }
    }

    #[test]
    fn flipping_the_leaf_fails_verification() {
        let height = 3;
        let leaves: Vec<Field> = (0..(1u64 << height)).map(Field::from).collect();
        let tree = MerkleTree::build(height, leaves.clone());
        let root = tree.root();
        let path = tree.generate_path(2);

        assert!(!verify_path(root, Field::from(999u64), 2, &path, height).unwrap());
    }

    #[test]
    fn flipping_a_path_entry_fails_verification() {
        let height = 3;
        let leaves: Vec<Field> = (0..(1u64 << height)).map(Field::from).collect();
        let tree = MerkleTree::build(height, leaves.clone());
        let root = tree.root();
        let mut path = tree.generate_path(5);
        path[0] += Field::from(1u64);

        assert!(!verify_path(root, leaves[5], 5, &path, height).unwrap());
    }

    #[test]
    fn mismatched_path_length_is_an_error() {
        let height = 3;
        let tree = MerkleTree::build(height, vec![Field::from(1u64)]);
        let root = tree.root();
        let result = verify_path(root, Field::from(1u64), 0, &[Field::zero(); 2], height);
        assert!(matches!(result, Err(MatchError::InvalidMerkleProof { .. })));
    }
}
