//! Transparent transaction structure
//!
//! Pre-Overwinter transactions: version, inputs, outputs and lock time. This
//! is enough to carry coinbase transactions in blocks and to compute the
//! merkle leaves (txids) and authorizing-data leaves. Version 2 appends the
//! Sprout JoinSplit vector, which must be empty here.

use serde::{Deserialize, Serialize};

use super::script::Script;
use crate::crypto::{sha256d, Hash};
use crate::serialization::{write_compact_size, write_var_bytes, CodecError, Reader};

/// Authorizing-data digest of a transaction that predates ZIP 244
pub const LEGACY_AUTH_DIGEST: Hash = Hash([0xff; 32]);

/// First version that serializes a JoinSplit vector after the lock time
pub const JOINSPLIT_VERSION: i32 = 2;

/// Reference to an output of a previous transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutPoint {
    pub hash: Hash,
    pub index: u32,
}

impl OutPoint {
    /// The outpoint spent by a coinbase input
    pub const fn null() -> Self {
        Self {
            hash: Hash::zero(),
            index: u32::MAX,
        }
    }

    pub fn is_null(&self) -> bool {
        self.hash.is_zero() && self.index == u32::MAX
    }
}

/// A transaction input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxIn {
    pub prevout: OutPoint,
    pub script_sig: Script,
    pub sequence: u32,
}

/// A transaction output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOut {
    /// Value in zatoshis
    pub value: i64,
    pub script_pubkey: Script,
}

/// A complete transparent transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub version: i32,
    pub inputs: Vec<TxIn>,
    pub outputs: Vec<TxOut>,
    pub lock_time: u32,
}

impl Transaction {
    /// Create a version 1 transaction
    pub fn new(inputs: Vec<TxIn>, outputs: Vec<TxOut>) -> Self {
        Self {
            version: 1,
            inputs,
            outputs,
            lock_time: 0,
        }
    }

    /// Create a coinbase transaction with the given scriptSig and outputs
    pub fn coinbase(script_sig: Script, outputs: Vec<TxOut>) -> Self {
        Self::new(
            vec![TxIn {
                prevout: OutPoint::null(),
                script_sig,
                sequence: u32::MAX,
            }],
            outputs,
        )
    }

    /// Check if this is a coinbase transaction
    pub fn is_coinbase(&self) -> bool {
        self.inputs.len() == 1 && self.inputs[0].prevout.is_null()
    }

    /// Transaction id: double SHA-256 of the serialized transaction
    pub fn txid(&self) -> Hash {
        sha256d(&self.encode())
    }

    /// Leaf of the authorizing-data tree
    pub fn auth_digest(&self) -> Hash {
        LEGACY_AUTH_DIGEST
    }

    pub fn total_output_value(&self) -> i64 {
        self.outputs.iter().map(|o| o.value).sum()
    }

    /// Serialize to wire format
    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        self.encode_into(&mut bytes);
        bytes
    }

    pub(crate) fn encode_into(&self, bytes: &mut Vec<u8>) {
        bytes.extend_from_slice(&self.version.to_le_bytes());

        write_compact_size(bytes, self.inputs.len() as u64);
        for input in &self.inputs {
            bytes.extend_from_slice(&input.prevout.hash.0);
            bytes.extend_from_slice(&input.prevout.index.to_le_bytes());
            write_var_bytes(bytes, input.script_sig.as_bytes());
            bytes.extend_from_slice(&input.sequence.to_le_bytes());
        }

        write_compact_size(bytes, self.outputs.len() as u64);
        for output in &self.outputs {
            bytes.extend_from_slice(&output.value.to_le_bytes());
            write_var_bytes(bytes, output.script_pubkey.as_bytes());
        }

        bytes.extend_from_slice(&self.lock_time.to_le_bytes());

        if self.version >= JOINSPLIT_VERSION {
            write_compact_size(bytes, 0);
        }
    }

    /// Parse a complete transaction, rejecting trailing bytes
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        let mut reader = Reader::new(bytes);
        let tx = Self::decode_from(&mut reader)?;
        reader.finish()?;
        Ok(tx)
    }

    pub(crate) fn decode_from(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        let version = reader.read_i32_le()?;
        // Overwintered transactions set the high bit of the header
        if !(1..=JOINSPLIT_VERSION).contains(&version) {
            return Err(CodecError::UnsupportedTransactionVersion(version));
        }

        let input_count = reader.read_compact_size()?;
        let mut inputs = Vec::with_capacity(input_count.min(1024) as usize);
        for _ in 0..input_count {
            let hash = reader.read_hash()?;
            let index = reader.read_u32_le()?;
            let script_sig = Script(reader.read_var_bytes()?.to_vec());
            let sequence = reader.read_u32_le()?;
            inputs.push(TxIn {
                prevout: OutPoint { hash, index },
                script_sig,
                sequence,
            });
        }

        let output_count = reader.read_compact_size()?;
        let mut outputs = Vec::with_capacity(output_count.min(1024) as usize);
        for _ in 0..output_count {
            let value = reader.read_i64_le()?;
            let script_pubkey = Script(reader.read_var_bytes()?.to_vec());
            outputs.push(TxOut {
                value,
                script_pubkey,
            });
        }

        let lock_time = reader.read_u32_le()?;

        if version >= JOINSPLIT_VERSION {
            let joinsplits = reader.read_compact_size()?;
            if joinsplits != 0 {
                return Err(CodecError::UnsupportedJoinSplits(joinsplits));
            }
        }

        Ok(Self {
            version,
            inputs,
            outputs,
            lock_time,
        })
    }
}
