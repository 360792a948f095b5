//! Address encodings per network
//!
//! Transparent addresses are Base58Check: a network prefix, a 20-byte hash
//! and the first four bytes of the payload's double SHA-256. Koto prefixes
//! are two bytes wide so that addresses start with a recognisable `k`.

use thiserror::Error;

use crate::crypto::sha256d;
use crate::validation::Script;

/// Base58 prefix slots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Base58Type {
    PubkeyAddress = 0,
    ScriptAddress,
    SecretKey,
    ExtPublicKey,
    ExtSecretKey,
    ZcPaymentAddress,
    ZcViewingKey,
    ZcSpendingKey,
}

pub const MAX_BASE58_TYPES: usize = 8;

/// Bech32 human-readable part slots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bech32Type {
    SaplingPaymentAddress = 0,
    SaplingFullViewingKey,
    SaplingIncomingViewingKey,
    SaplingExtendedSpendKey,
    SaplingExtendedFvk,
}

pub const MAX_BECH32_TYPES: usize = 5;

/// Address prefixes and HRPs for one network
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyConstants {
    pub network_id: &'static str,
    pub base58_prefixes: [&'static [u8]; MAX_BASE58_TYPES],
    pub bech32_hrps: [&'static str; MAX_BECH32_TYPES],
}

impl KeyConstants {
    pub fn base58_prefix(&self, kind: Base58Type) -> &'static [u8] {
        self.base58_prefixes[kind as usize]
    }

    pub fn bech32_hrp(&self, kind: Bech32Type) -> &'static str {
        self.bech32_hrps[kind as usize]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("invalid base58 encoding")]
    InvalidBase58,
    #[error("address too short")]
    TooShort,
    #[error("invalid address checksum")]
    InvalidChecksum,
    #[error("address prefix does not belong to network {0}")]
    UnknownPrefix(&'static str),
}

/// A decoded transparent destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Destination {
    PubkeyHash([u8; 20]),
    ScriptHash([u8; 20]),
}

impl Destination {
    pub fn is_script(&self) -> bool {
        matches!(self, Destination::ScriptHash(_))
    }

    /// Output script paying to this destination
    pub fn script_pubkey(&self) -> Script {
        match self {
            Destination::PubkeyHash(hash) => Script::p2pkh(hash),
            Destination::ScriptHash(hash) => Script::p2sh(hash),
        }
    }
}

/// Decode a transparent address for the network described by `keys`
pub fn decode_destination(keys: &KeyConstants, address: &str) -> Result<Destination, AddressError> {
    let decoded = bs58::decode(address)
        .into_vec()
        .map_err(|_| AddressError::InvalidBase58)?;

    if decoded.len() < 4 {
        return Err(AddressError::TooShort);
    }
    let (payload, checksum) = decoded.split_at(decoded.len() - 4);
    if checksum != &sha256d(payload).0[..4] {
        return Err(AddressError::InvalidChecksum);
    }

    let hash_after = |prefix: &[u8]| -> Option<[u8; 20]> {
        let rest = payload.strip_prefix(prefix)?;
        rest.try_into().ok()
    };

    if let Some(hash) = hash_after(keys.base58_prefix(Base58Type::PubkeyAddress)) {
        return Ok(Destination::PubkeyHash(hash));
    }
    if let Some(hash) = hash_after(keys.base58_prefix(Base58Type::ScriptAddress)) {
        return Ok(Destination::ScriptHash(hash));
    }
    Err(AddressError::UnknownPrefix(keys.network_id))
}

/// Encode a transparent destination for the network described by `keys`
pub fn encode_destination(keys: &KeyConstants, destination: &Destination) -> String {
    let (prefix, hash) = match destination {
        Destination::PubkeyHash(hash) => (keys.base58_prefix(Base58Type::PubkeyAddress), hash),
        Destination::ScriptHash(hash) => (keys.base58_prefix(Base58Type::ScriptAddress), hash),
    };
    let mut payload = prefix.to_vec();
    payload.extend_from_slice(hash);
    let checksum = sha256d(&payload);
    payload.extend_from_slice(&checksum.0[..4]);
    bs58::encode(payload).into_string()
}
