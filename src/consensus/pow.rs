//! Proof-of-work: compact targets and the memory-hard header hash
//!
//! `bits` in a header is a floating-point style encoding of a 256-bit target:
//! the top byte is a base-256 exponent, the low 23 bits a mantissa and bit 23
//! a sign. A header is valid when its PoW hash, read as a little-endian
//! 256-bit integer, does not exceed the decoded target.

use primitive_types::U256;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::block::BlockHeader;
use crate::crypto::{yespower_hash, Hash, YespowerError, YespowerParams};

/// Target decoding and hashing failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PowError {
    #[error("compact target {0:#010x} is zero")]
    ZeroTarget(u32),
    #[error("compact target {0:#010x} is negative")]
    NegativeTarget(u32),
    #[error("compact target {0:#010x} overflows 256 bits")]
    TargetOverflow(u32),
    #[error("compact target {0:#010x} is easier than the network limit")]
    TargetAboveLimit(u32),
    #[error("memory-hard hasher rejected parameters: {0}")]
    Hasher(#[from] YespowerError),
}

/// Compact (`nBits`) target encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompactTarget(pub u32);

impl CompactTarget {
    fn size(self) -> u32 {
        self.0 >> 24
    }

    fn word(self) -> u32 {
        self.0 & 0x007f_ffff
    }

    pub fn is_negative(self) -> bool {
        self.word() != 0 && (self.0 & 0x0080_0000) != 0
    }

    pub fn is_overflow(self) -> bool {
        let (size, word) = (self.size(), self.word());
        word != 0 && (size > 34 || (word > 0xff && size > 33) || (word > 0xffff && size > 32))
    }

    /// Decode into a 256-bit target
    pub fn to_target(self) -> Result<U256, PowError> {
        if self.is_negative() {
            return Err(PowError::NegativeTarget(self.0));
        }
        if self.is_overflow() {
            return Err(PowError::TargetOverflow(self.0));
        }

        let (size, word) = (self.size(), self.word());
        let target = if size <= 3 {
            U256::from(word >> (8 * (3 - size)))
        } else {
            U256::from(word) << (8 * (size - 3)) as usize
        };

        if target.is_zero() {
            return Err(PowError::ZeroTarget(self.0));
        }
        Ok(target)
    }

    /// Canonical compact encoding of a non-negative target
    pub fn from_target(target: U256) -> Self {
        let mut size = (target.bits() as u32 + 7) / 8;
        let mut compact = if size <= 3 {
            (target.low_u64() << (8 * (3 - size))) as u32
        } else {
            (target >> (8 * (size - 3)) as usize).low_u64() as u32
        };

        // Keep the sign bit clear by moving one byte into the exponent
        if compact & 0x0080_0000 != 0 {
            compact >>= 8;
            size += 1;
        }
        Self(compact | (size << 24))
    }

    /// Decode and check against the network's easiest allowed target
    pub fn to_checked_target(self, pow_limit: &U256) -> Result<U256, PowError> {
        let target = self.to_target()?;
        if target > *pow_limit {
            return Err(PowError::TargetAboveLimit(self.0));
        }
        Ok(target)
    }
}

/// Whether `pow_hash` satisfies the target encoded in `bits`.
///
/// False when the target is zero, negative, overflowing or easier than
/// `pow_limit`.
pub fn check_proof_of_work(pow_hash: &Hash, bits: u32, pow_limit: &U256) -> bool {
    match CompactTarget(bits).to_checked_target(pow_limit) {
        Ok(target) => hash_to_uint(pow_hash) <= target,
        Err(_) => false,
    }
}

/// Hash bytes read as a little-endian 256-bit integer
pub fn hash_to_uint(hash: &Hash) -> U256 {
    U256::from_little_endian(hash.as_bytes())
}

/// Expected number of hashes needed to meet `bits`; zero for invalid targets
pub fn block_work(bits: u32) -> U256 {
    match CompactTarget(bits).to_target() {
        Ok(target) => (!target / (target + U256::one())) + U256::one(),
        Err(_) => U256::zero(),
    }
}

/// Memory-hard hash parameters: `n` work-memory factor, `r` block-size factor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowHashParams {
    pub n: u32,
    pub r: u32,
}

impl Default for PowHashParams {
    fn default() -> Self {
        Self { n: 2048, r: 8 }
    }
}

impl PowHashParams {
    /// Working memory in KiB (`128 * r * n` bytes)
    pub fn memory_kib(&self) -> u32 {
        self.n.saturating_mul(self.r) / 8
    }

    fn yespower(&self) -> YespowerParams {
        YespowerParams { n: self.n, r: self.r }
    }
}

/// Memory-hard PoW hash of a header: yespower 0.5 over the serialized
/// header, personalised with the same bytes.
pub fn pow_hash(header: &BlockHeader, params: &PowHashParams) -> Result<Hash, PowError> {
    let bytes = header.encode();
    let out = yespower_hash(&bytes, &params.yespower(), Some(&bytes))?;
    Ok(Hash(out))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limit(hex: &str) -> U256 {
        U256::from_str_radix(hex, 16).unwrap()
    }

    #[test]
    fn test_decode_known_targets() {
        let target = CompactTarget(0x1d00ffff).to_target().unwrap();
        assert_eq!(target, U256::from(0xffffu64) << 208);

        let koto_main = CompactTarget(0x1f07ffff).to_target().unwrap();
        assert_eq!(
            koto_main,
            limit("0007ffff00000000000000000000000000000000000000000000000000000000")
        );

        assert_eq!(CompactTarget(0x01003456).to_target(), Err(PowError::ZeroTarget(0x01003456)));
        assert_eq!(CompactTarget(0x02123456).to_target().unwrap(), U256::from(0x1234u64));
    }

    #[test]
    fn test_decode_rejects_invalid() {
        assert_eq!(CompactTarget(0).to_target(), Err(PowError::ZeroTarget(0)));
        assert_eq!(
            CompactTarget(0x04923456).to_target(),
            Err(PowError::NegativeTarget(0x04923456))
        );
        assert_eq!(
            CompactTarget(0xff123456).to_target(),
            Err(PowError::TargetOverflow(0xff123456))
        );
        // Sign bit with a zero mantissa is just zero
        assert_eq!(CompactTarget(0x04800000).to_target(), Err(PowError::ZeroTarget(0x04800000)));
    }

    #[test]
    fn test_encode_is_canonical() {
        for bits in [0x1d00ffffu32, 0x1f07ffff, 0x2007ffff, 0x200f0f0f, 0x05009234, 0x02123400] {
            let target = CompactTarget(bits).to_target().unwrap();
            let encoded = CompactTarget::from_target(target);
            assert_eq!(encoded.to_target().unwrap(), target);
        }
        // Mantissa with the sign bit set is shifted into the exponent
        assert_eq!(CompactTarget::from_target(U256::from(0x80u64)).0, 0x02008000);
        assert_eq!(CompactTarget::from_target(U256::from(0x12u64)).0, 0x01120000);
    }

    #[test]
    fn test_check_proof_of_work_boundaries() {
        let pow_limit = limit("0007ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff");
        let bits = 0x1f07ffff;
        let target = CompactTarget(bits).to_target().unwrap();

        let mut at_target = [0u8; 32];
        target.to_little_endian(&mut at_target);
        assert!(check_proof_of_work(&Hash(at_target), bits, &pow_limit));

        let mut above = [0u8; 32];
        (target + U256::one()).to_little_endian(&mut above);
        assert!(!check_proof_of_work(&Hash(above), bits, &pow_limit));

        assert!(check_proof_of_work(&Hash::zero(), bits, &pow_limit));
        // Easier than the limit
        assert!(!check_proof_of_work(&Hash::zero(), 0x2007ffff, &pow_limit));
        assert!(!check_proof_of_work(&Hash::zero(), 0, &pow_limit));
    }

    #[test]
    fn test_block_work() {
        // Target 2^255 - 1 style values give roughly two hashes of work
        assert_eq!(block_work(0x207fffff), U256::from(2u64));
        assert_eq!(block_work(0x1d00ffff), U256::from(0x0100010001u64));
        assert_eq!(block_work(0), U256::zero());
    }

    #[test]
    fn test_pow_hash_depends_on_nonce() {
        let params = PowHashParams { n: 1024, r: 8 };
        let mut header = BlockHeader::default();
        let first = pow_hash(&header, &params).unwrap();
        assert_eq!(first, pow_hash(&header, &params).unwrap());
        header.nonce = 1;
        assert_ne!(first, pow_hash(&header, &params).unwrap());
    }

    #[test]
    fn test_pow_hash_rejects_tiny_memory() {
        let params = PowHashParams { n: 64, r: 8 };
        assert_eq!(
            pow_hash(&BlockHeader::default(), &params),
            Err(PowError::Hasher(YespowerError::InvalidN(64)))
        );
    }
}
