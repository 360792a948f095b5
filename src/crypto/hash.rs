//! SHA-256d and personalized BLAKE2b hashing
//!
//! Block and transaction identifiers are double SHA-256. Hashes are kept in
//! wire (little-endian) byte order and displayed byte-reversed, the way
//! block explorers and RPC print them.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// 32-byte hash output
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Hash(pub [u8; 32]);

impl Hash {
    /// All-zero hash (null previous-block hash, empty roots)
    pub const fn zero() -> Self {
        Hash([0u8; 32])
    }

    /// Create hash from wire-order bytes
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Hash(bytes)
    }

    /// Parse a display-order hex string (optionally `0x`-prefixed).
    ///
    /// Short strings are left-padded with zeros, so `"0x00"` is the zero hash.
    pub fn from_hex(hex: &str) -> Result<Self, hex::FromHexError> {
        let trimmed = hex
            .trim()
            .trim_start_matches("0x")
            .trim_start_matches("0X");
        if trimmed.len() > 64 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let padded = format!("{:0>64}", trimmed);
        let mut arr = [0u8; 32];
        hex::decode_to_slice(&padded, &mut arr)?;
        arr.reverse();
        Ok(Hash(arr))
    }

    /// Display-order hex string
    pub fn to_hex(&self) -> String {
        let mut reversed = self.0;
        reversed.reverse();
        hex::encode(reversed)
    }

    /// Get as bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", self.to_hex())
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Default for Hash {
    fn default() -> Self {
        Self::zero()
    }
}

/// Parse a compiled-in hash constant.
///
/// Panics on malformed input: pinned constants are part of the binary and a
/// bad one means the build cannot follow the chain.
pub(crate) fn pinned(hex: &str) -> Hash {
    Hash::from_hex(hex).unwrap_or_else(|e| panic!("malformed pinned hash {hex:?}: {e}"))
}

/// Double SHA-256 of arbitrary bytes
pub fn sha256d(data: &[u8]) -> Hash {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    let mut out = [0u8; 32];
    out.copy_from_slice(&second);
    Hash(out)
}

/// Hash two nodes together (merkle interior node)
pub fn hash_pair(left: &Hash, right: &Hash) -> Hash {
    let mut data = [0u8; 64];
    data[..32].copy_from_slice(&left.0);
    data[32..].copy_from_slice(&right.0);
    sha256d(&data)
}

/// BLAKE2b-256 with a 16-byte personalization string
pub fn blake2b_personal(personal: &[u8; 16], parts: &[&[u8]]) -> Hash {
    let mut state = blake2b_simd::Params::new()
        .hash_length(32)
        .personal(personal)
        .to_state();
    for part in parts {
        state.update(part);
    }
    let mut out = [0u8; 32];
    out.copy_from_slice(state.finalize().as_bytes());
    Hash(out)
}
