//! Merkle tree implementation
//!
//! Used for the transaction commitment in block headers and for the
//! authorizing-data root that feeds the block commitments hash.
//!
//! Each level pairs adjacent nodes; an odd node at the end of a level is
//! paired with itself. That duplication lets two different transaction lists
//! produce the same root (`[a, b, c]` and `[a, b, c, c]`), so the builder
//! reports a tree as *mutated* whenever the last two nodes of an even-width
//! level are identical.

use super::{hash_pair, Hash};

/// A fully materialised merkle tree, level by level from the leaves up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleTree {
    levels: Vec<Vec<Hash>>,
    mutated: bool,
}

impl MerkleTree {
    /// Build the tree over `leaves`
    pub fn build(leaves: &[Hash]) -> Self {
        let mut levels = vec![leaves.to_vec()];
        let mut mutated = false;

        while let Some(current) = levels.last() {
            if current.len() <= 1 {
                break;
            }

            let width = current.len();
            let mut next = Vec::with_capacity((width + 1) / 2);
            for i in (0..width).step_by(2) {
                let i2 = (i + 1).min(width - 1);
                if i2 == i + 1 && i2 + 1 == width && current[i] == current[i2] {
                    // Two identical hashes at the end of the level
                    mutated = true;
                }
                next.push(hash_pair(&current[i], &current[i2]));
            }
            levels.push(next);
        }

        Self { levels, mutated }
    }

    /// Root of the tree; the zero hash for an empty leaf list
    pub fn root(&self) -> Hash {
        self.levels
            .last()
            .and_then(|level| level.first())
            .copied()
            .unwrap_or_else(Hash::zero)
    }

    /// Whether duplicate trailing nodes were seen while building
    pub fn is_mutated(&self) -> bool {
        self.mutated
    }

    pub fn leaf_count(&self) -> usize {
        self.levels[0].len()
    }

    /// Sibling hashes from the leaf at `index` up to (not including) the root
    pub fn branch(&self, index: usize) -> Option<Vec<Hash>> {
        if index >= self.leaf_count() {
            return None;
        }

        let mut branch = Vec::with_capacity(self.levels.len().saturating_sub(1));
        let mut index = index;
        for level in &self.levels[..self.levels.len() - 1] {
            let sibling = (index ^ 1).min(level.len() - 1);
            branch.push(level[sibling]);
            index >>= 1;
        }
        Some(branch)
    }
}

/// Compute the merkle root of `leaves` and whether the tree is mutated
pub fn build_merkle_tree(leaves: &[Hash]) -> (Hash, bool) {
    let tree = MerkleTree::build(leaves);
    (tree.root(), tree.is_mutated())
}

/// Authentication path for the leaf at `index`, or `None` if out of range
pub fn merkle_branch(leaves: &[Hash], index: usize) -> Option<Vec<Hash>> {
    MerkleTree::build(leaves).branch(index)
}

/// Recompute a root from a leaf and its branch.
///
/// Bit `k` of `index` says whether the running hash is the right-hand node
/// at level `k`.
pub fn check_merkle_branch(leaf: Hash, branch: &[Hash], index: usize) -> Hash {
    let mut hash = leaf;
    let mut index = index;
    for sibling in branch {
        hash = if index & 1 == 1 {
            hash_pair(sibling, &hash)
        } else {
            hash_pair(&hash, sibling)
        };
        index >>= 1;
    }
    hash
}

/// Root of the tree over transactions' authorizing-data digests.
///
/// Same pairing and duplication rule as the transaction tree; only the leaves
/// differ.
pub fn build_auth_data_merkle_tree(auth_digests: &[Hash]) -> Hash {
    MerkleTree::build(auth_digests).root()
}
