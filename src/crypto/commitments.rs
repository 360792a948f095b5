//! Block commitments hash (ZIP 244)
//!
//! Headers at or above the commitment-carrying version commit to the chain
//! history root and the authorizing-data root through a single hash.

use super::{blake2b_personal, Hash};

const BLOCK_COMMITMENTS_PERSONALIZATION: &[u8; 16] = b"ZcashBlockCommit";

/// Combine the chain-history root and the auth-data root.
///
/// `BLAKE2b-256("ZcashBlockCommit", history_root || auth_data_root || [0; 32])`;
/// the trailing zero block is a terminator reserved for future roots.
pub fn derive_block_commitments_hash(chain_history_root: &Hash, auth_data_root: &Hash) -> Hash {
    let terminator = Hash::zero();
    blake2b_personal(
        BLOCK_COMMITMENTS_PERSONALIZATION,
        &[&chain_history_root.0, &auth_data_root.0, &terminator.0],
    )
}
