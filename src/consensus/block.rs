//! Block structure and wire format
//!
//! Headers from version 5 onwards carry a block commitments hash after the
//! nonce; earlier headers end at the nonce.

use serde::{Deserialize, Serialize};

use crate::crypto::{build_auth_data_merkle_tree, build_merkle_tree, merkle_branch, sha256d, Hash};
use crate::serialization::{write_compact_size, CodecError, Reader};
use crate::validation::Transaction;

/// Header version produced by this code
pub const CURRENT_VERSION: i32 = 5;

/// First header version that carries `hash_block_commitments`
pub const COMMITMENTS_VERSION: i32 = 5;

/// Maximum serialized header length (with the commitments field)
pub const HEADER_SIZE: usize = 4 + 32 + 32 + 4 + 4 + 4 + 32;

/// Block header containing all metadata
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlockHeader {
    pub version: i32,
    pub prev_hash: Hash,
    pub merkle_root: Hash,
    /// Block timestamp (seconds since Unix epoch)
    pub time: u32,
    /// Compact-encoded difficulty target
    pub bits: u32,
    pub nonce: u32,
    /// Only serialized when `version >= COMMITMENTS_VERSION`
    pub hash_block_commitments: Hash,
}

impl Default for BlockHeader {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            prev_hash: Hash::zero(),
            merkle_root: Hash::zero(),
            time: 0,
            bits: 0,
            nonce: 0,
            hash_block_commitments: Hash::zero(),
        }
    }
}

impl BlockHeader {
    pub fn has_block_commitments(&self) -> bool {
        self.version >= COMMITMENTS_VERSION
    }

    /// Serialize the header in wire order
    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(HEADER_SIZE);
        self.encode_into(&mut bytes);
        bytes
    }

    fn encode_into(&self, bytes: &mut Vec<u8>) {
        bytes.extend_from_slice(&self.version.to_le_bytes());
        bytes.extend_from_slice(&self.prev_hash.0);
        bytes.extend_from_slice(&self.merkle_root.0);
        bytes.extend_from_slice(&self.time.to_le_bytes());
        bytes.extend_from_slice(&self.bits.to_le_bytes());
        bytes.extend_from_slice(&self.nonce.to_le_bytes());
        if self.has_block_commitments() {
            bytes.extend_from_slice(&self.hash_block_commitments.0);
        }
    }

    /// Parse a standalone header, rejecting trailing bytes
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        let mut reader = Reader::new(bytes);
        let header = Self::decode_from(&mut reader)?;
        reader.finish()?;
        Ok(header)
    }

    fn decode_from(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        let version = reader.read_i32_le()?;
        let prev_hash = reader.read_hash()?;
        let merkle_root = reader.read_hash()?;
        let time = reader.read_u32_le()?;
        let bits = reader.read_u32_le()?;
        let nonce = reader.read_u32_le()?;
        let hash_block_commitments = if version >= COMMITMENTS_VERSION {
            reader
                .read_hash()
                .map_err(|_| CodecError::MissingBlockCommitments { version })?
        } else {
            Hash::zero()
        };

        Ok(Self {
            version,
            prev_hash,
            merkle_root,
            time,
            bits,
            nonce,
            hash_block_commitments,
        })
    }

    /// Block hash: double SHA-256 of the serialized header
    pub fn hash(&self) -> Hash {
        sha256d(&self.encode())
    }

    pub fn set_null(&mut self) {
        *self = Self::default();
    }

    pub fn is_null(&self) -> bool {
        self.bits == 0
    }

    pub fn block_time(&self) -> i64 {
        i64::from(self.time)
    }
}

/// A complete block containing header and transactions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Block {
    pub header: BlockHeader,
    pub transactions: Vec<Transaction>,
}

impl Block {
    pub fn new(header: BlockHeader, transactions: Vec<Transaction>) -> Self {
        Self {
            header,
            transactions,
        }
    }

    pub fn header(&self) -> BlockHeader {
        self.header
    }

    pub fn hash(&self) -> Hash {
        self.header.hash()
    }

    pub fn is_genesis(&self) -> bool {
        self.header.prev_hash.is_zero()
    }

    pub fn txids(&self) -> Vec<Hash> {
        self.transactions.iter().map(Transaction::txid).collect()
    }

    /// Merkle root over the txids and whether the tree is mutated
    pub fn build_merkle_tree(&self) -> (Hash, bool) {
        build_merkle_tree(&self.txids())
    }

    /// Authentication path of the transaction at `index`
    pub fn merkle_branch(&self, index: usize) -> Option<Vec<Hash>> {
        merkle_branch(&self.txids(), index)
    }

    /// Root of the authorizing-data tree over this block's transactions
    pub fn build_auth_data_merkle_tree(&self) -> Hash {
        let digests: Vec<Hash> = self.transactions.iter().map(Transaction::auth_digest).collect();
        build_auth_data_merkle_tree(&digests)
    }

    /// Serialize: header, then a length-prefixed transaction list
    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        self.header.encode_into(&mut bytes);
        write_compact_size(&mut bytes, self.transactions.len() as u64);
        for tx in &self.transactions {
            tx.encode_into(&mut bytes);
        }
        bytes
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        let mut reader = Reader::new(bytes);
        let header = BlockHeader::decode_from(&mut reader)?;
        let count = reader.read_compact_size()?;
        let mut transactions = Vec::with_capacity(count.min(1024) as usize);
        for _ in 0..count {
            transactions.push(Transaction::decode_from(&mut reader)?);
        }
        reader.finish()?;
        Ok(Self {
            header,
            transactions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{Script, TxOut};

    fn header(version: i32) -> BlockHeader {
        BlockHeader {
            version,
            prev_hash: sha256d(b"prev"),
            merkle_root: sha256d(b"root"),
            time: 1_512_879_054,
            bits: 0x1f07ffff,
            nonce: 42,
            hash_block_commitments: if version >= COMMITMENTS_VERSION {
                sha256d(b"commitments")
            } else {
                Hash::zero()
            },
        }
    }

    fn coinbase(tag: &[u8]) -> Transaction {
        Transaction::coinbase(
            Script::new().push_slice(tag),
            vec![TxOut {
                value: 0,
                script_pubkey: Script::new(),
            }],
        )
    }

    #[test]
    fn test_block_header_serialization() {
        assert_eq!(header(4).encode().len(), 80);
        assert_eq!(header(5).encode().len(), HEADER_SIZE);
    }

    #[test]
    fn test_header_decode_restores_bytes() {
        for version in [1, 4, 5, 6] {
            let bytes = header(version).encode();
            let decoded = BlockHeader::decode(&bytes).unwrap();
            assert_eq!(decoded, header(version));
            assert_eq!(decoded.encode(), bytes);
        }
    }

    #[test]
    fn test_missing_commitments_rejected() {
        let bytes = header(5).encode();
        assert_eq!(
            BlockHeader::decode(&bytes[..80]),
            Err(CodecError::MissingBlockCommitments { version: 5 })
        );
        assert_eq!(
            BlockHeader::decode(&bytes[..100]),
            Err(CodecError::MissingBlockCommitments { version: 5 })
        );
    }

    #[test]
    fn test_pre_commitment_header_with_extra_bytes_rejected() {
        let mut bytes = header(4).encode();
        bytes.extend_from_slice(&[0u8; 32]);
        assert_eq!(BlockHeader::decode(&bytes), Err(CodecError::TrailingBytes(32)));
    }

    #[test]
    fn test_hash_covers_commitments() {
        let a = header(5);
        let mut b = a;
        b.hash_block_commitments = sha256d(b"other");
        assert_ne!(a.hash(), b.hash());

        // Below the threshold the field is not serialized at all
        let c = header(4);
        let mut d = c;
        d.hash_block_commitments = sha256d(b"ignored");
        assert_eq!(c.hash(), d.hash());
    }

    #[test]
    fn test_null_header() {
        let mut h = header(5);
        assert!(!h.is_null());
        h.set_null();
        assert!(h.is_null());
        assert_eq!(h.time, 0);
        assert!(h.prev_hash.is_zero());
    }

    #[test]
    fn test_block_merkle_helpers() {
        let block = Block::new(header(5), vec![coinbase(b"a"), coinbase(b"b"), coinbase(b"c")]);
        let (root, mutated) = block.build_merkle_tree();
        assert!(!mutated);
        assert_eq!(root, build_merkle_tree(&block.txids()).0);
        let branch = block.merkle_branch(2).unwrap();
        assert_eq!(
            crate::crypto::check_merkle_branch(block.transactions[2].txid(), &branch, 2),
            root
        );
        assert!(block.merkle_branch(3).is_none());
    }

    #[test]
    fn test_block_decode_restores_block() {
        let block = Block::new(header(5), vec![coinbase(b"x"), coinbase(b"y")]);
        let bytes = block.encode();
        assert_eq!(Block::decode(&bytes).unwrap(), block);
    }

    #[test]
    fn test_genesis_block_detection() {
        let mut h = header(4);
        h.prev_hash = Hash::zero();
        assert!(Block::new(h, vec![]).is_genesis());
        assert!(!Block::new(header(4), vec![]).is_genesis());
    }
}
