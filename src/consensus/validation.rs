//! Per-block rejections
//!
//! Checks on headers and blocks received from elsewhere. Failures are
//! returned to the caller as a `ValidationError`; nothing here panics on
//! bad input.

use primitive_types::U256;
use thiserror::Error;

use super::block::{Block, BlockHeader};
use super::pow::{hash_to_uint, pow_hash, CompactTarget, PowError, PowHashParams};
use crate::crypto::{check_merkle_branch, derive_block_commitments_hash, Hash};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("proof of work hash {hash} above target")]
    HighHash { hash: Hash },
    #[error("invalid proof-of-work target: {0}")]
    BadTarget(#[from] PowError),
    #[error("merkle root mismatch: header has {expected}, transactions give {computed}")]
    BadMerkleRoot { expected: Hash, computed: Hash },
    #[error("duplicate transactions mutate the merkle tree")]
    MutatedMerkleTree,
    #[error("merkle branch does not reconstruct root {expected}")]
    BadMerkleBranch { expected: Hash },
    #[error("version {version} header has no block commitments")]
    MissingBlockCommitments { version: i32 },
    #[error("block commitments hash mismatch: header has {expected}, roots give {computed}")]
    BadBlockCommitments { expected: Hash, computed: Hash },
}

/// Check the header's memory-hard hash against its own `bits`
pub fn validate_header_pow(
    header: &BlockHeader,
    hash_params: &PowHashParams,
    pow_limit: &U256,
) -> Result<(), ValidationError> {
    let target = CompactTarget(header.bits).to_checked_target(pow_limit)?;
    let hash = pow_hash(header, hash_params)?;
    if hash_to_uint(&hash) > target {
        return Err(ValidationError::HighHash { hash });
    }
    Ok(())
}

/// Recompute the transaction tree and compare it with the header
pub fn validate_merkle_root(block: &Block) -> Result<(), ValidationError> {
    let (computed, mutated) = block.build_merkle_tree();
    if computed != block.header.merkle_root {
        return Err(ValidationError::BadMerkleRoot {
            expected: block.header.merkle_root,
            computed,
        });
    }
    if mutated {
        return Err(ValidationError::MutatedMerkleTree);
    }
    Ok(())
}

/// Check an inclusion proof for `leaf` at `index` against `root`
pub fn verify_merkle_branch(
    leaf: Hash,
    branch: &[Hash],
    index: usize,
    root: &Hash,
) -> Result<(), ValidationError> {
    if check_merkle_branch(leaf, branch, index) != *root {
        return Err(ValidationError::BadMerkleBranch { expected: *root });
    }
    Ok(())
}

/// Check the header's commitment field against the two sub-roots
pub fn validate_block_commitments(
    header: &BlockHeader,
    chain_history_root: &Hash,
    auth_data_root: &Hash,
) -> Result<(), ValidationError> {
    if !header.has_block_commitments() {
        return Err(ValidationError::MissingBlockCommitments {
            version: header.version,
        });
    }
    let computed = derive_block_commitments_hash(chain_history_root, auth_data_root);
    if computed != header.hash_block_commitments {
        return Err(ValidationError::BadBlockCommitments {
            expected: header.hash_block_commitments,
            computed,
        });
    }
    Ok(())
}

impl Block {
    pub fn validate_merkle_root(&self) -> Result<(), ValidationError> {
        validate_merkle_root(self)
    }
}
