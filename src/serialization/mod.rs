//! Wire-format primitives
//!
//! Little-endian integers, 32-byte hashes and compact-size length prefixes,
//! read from externally supplied bytes with every failure reported as a
//! [`CodecError`].

use crate::crypto::Hash;
use thiserror::Error;

/// Largest length prefix accepted from the wire (32 MiB)
pub const MAX_SIZE: u64 = 0x0200_0000;

/// Wire decoding errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("unexpected end of data: needed {needed} bytes, {remaining} left")]
    UnexpectedEof { needed: usize, remaining: usize },
    #[error("non-canonical compact size encoding")]
    NonCanonicalCompactSize,
    #[error("length prefix {0} exceeds maximum")]
    OversizedLength(u64),
    #[error("{0} trailing bytes after message")]
    TrailingBytes(usize),
    #[error("header version {version} requires a block commitments hash")]
    MissingBlockCommitments { version: i32 },
    #[error("unsupported transaction version {0}")]
    UnsupportedTransactionVersion(i32),
    #[error("transaction carries {0} Sprout JoinSplit descriptions")]
    UnsupportedJoinSplits(u64),
}

/// Cursor over a byte slice
#[derive(Debug)]
pub struct Reader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        if self.remaining() < n {
            return Err(CodecError::UnexpectedEof {
                needed: n,
                remaining: self.remaining(),
            });
        }
        let bytes = &self.data[self.offset..self.offset + n];
        self.offset += n;
        Ok(bytes)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u16_le(&mut self) -> Result<u16, CodecError> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32_le(&mut self) -> Result<u32, CodecError> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_i32_le(&mut self) -> Result<i32, CodecError> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    pub fn read_u64_le(&mut self) -> Result<u64, CodecError> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    pub fn read_i64_le(&mut self) -> Result<i64, CodecError> {
        Ok(i64::from_le_bytes(self.read_array()?))
    }

    pub fn read_hash(&mut self) -> Result<Hash, CodecError> {
        Ok(Hash(self.read_array()?))
    }

    /// Read a compact-size integer, rejecting non-minimal encodings and
    /// values above [`MAX_SIZE`]
    pub fn read_compact_size(&mut self) -> Result<u64, CodecError> {
        let value = match self.read_u8()? {
            0xfd => {
                let v = u64::from(self.read_u16_le()?);
                if v < 0xfd {
                    return Err(CodecError::NonCanonicalCompactSize);
                }
                v
            }
            0xfe => {
                let v = u64::from(self.read_u32_le()?);
                if v <= 0xffff {
                    return Err(CodecError::NonCanonicalCompactSize);
                }
                v
            }
            0xff => {
                let v = self.read_u64_le()?;
                if v <= 0xffff_ffff {
                    return Err(CodecError::NonCanonicalCompactSize);
                }
                v
            }
            small => u64::from(small),
        };
        if value > MAX_SIZE {
            return Err(CodecError::OversizedLength(value));
        }
        Ok(value)
    }

    /// Read a compact-size length followed by that many bytes
    pub fn read_var_bytes(&mut self) -> Result<&'a [u8], CodecError> {
        let len = self.read_compact_size()? as usize;
        self.read_bytes(len)
    }

    /// Require that every byte was consumed
    pub fn finish(self) -> Result<(), CodecError> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(CodecError::TrailingBytes(n)),
        }
    }
}

/// Append a compact-size integer
pub fn write_compact_size(out: &mut Vec<u8>, value: u64) {
    if value < 0xfd {
        out.push(value as u8);
    } else if value <= 0xffff {
        out.push(0xfd);
        out.extend_from_slice(&(value as u16).to_le_bytes());
    } else if value <= 0xffff_ffff {
        out.push(0xfe);
        out.extend_from_slice(&(value as u32).to_le_bytes());
    } else {
        out.push(0xff);
        out.extend_from_slice(&value.to_le_bytes());
    }
}

/// Append a compact-size length followed by the bytes
pub fn write_var_bytes(out: &mut Vec<u8>, bytes: &[u8]) {
    write_compact_size(out, bytes.len() as u64);
    out.extend_from_slice(bytes);
}
