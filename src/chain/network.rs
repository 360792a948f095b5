//! Network identity and the full per-network parameter set

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use super::checkpoints::CheckpointData;
use super::seeds::DnsSeed;
use crate::consensus::{Block, ConsensusParams};
use crate::crypto::Hash;
use crate::keys::KeyConstants;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkId {
    Main,
    Test,
    Regtest,
}

impl NetworkId {
    pub const ALL: [NetworkId; 3] = [NetworkId::Main, NetworkId::Test, NetworkId::Regtest];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "main" => Some(NetworkId::Main),
            "test" => Some(NetworkId::Test),
            "regtest" => Some(NetworkId::Regtest),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NetworkId::Main => "main",
            NetworkId::Test => "test",
            NetworkId::Regtest => "regtest",
        }
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NetworkId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| format!("unknown network {s:?}"))
    }
}

/// Node behaviour that differs between networks but is not consensus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NetworkFlags {
    pub mining_requires_peers: bool,
    pub default_consistency_checks: bool,
    pub require_standard: bool,
    pub mine_blocks_on_demand: bool,
    pub testnet_to_be_deprecated_field_rpc: bool,
}

/// Compiled-in inputs and expected outputs of a genesis block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenesisParams {
    pub time: u32,
    pub nonce: u32,
    pub bits: u32,
    pub version: i32,
    pub reward: i64,
    /// Display-order hex of the expected block hash
    pub hash: &'static str,
    pub merkle_root: &'static str,
}

/// Fallback Sprout value pool balance for nodes that have not reindexed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SproutValuePoolCheckpoint {
    pub height: u32,
    pub balance: i64,
    pub block_hash: Hash,
}

/// Everything a node needs to know about one network
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkParams {
    pub id: NetworkId,
    pub currency_units: &'static str,
    pub bip44_coin_type: u32,
    pub consensus: ConsensusParams,
    pub keys: KeyConstants,
    pub message_start: [u8; 4],
    pub alert_pubkey: Vec<u8>,
    pub default_port: u16,
    pub prune_after_height: u64,
    pub genesis: Block,
    pub dns_seeds: Vec<DnsSeed>,
    pub fixed_seeds: Vec<std::net::SocketAddr>,
    pub flags: NetworkFlags,
    pub checkpoints: CheckpointData,
    pub sprout_value_pool_checkpoint: Option<SproutValuePoolCheckpoint>,
    pub zip209_enabled: bool,
    /// P2SH addresses paid by the founders' reward
    pub founders_reward_addresses: Vec<&'static str>,
}

impl NetworkParams {
    pub fn network_id(&self) -> &'static str {
        self.id.as_str()
    }

    pub fn genesis_block(&self) -> &Block {
        &self.genesis
    }

    pub fn genesis_hash(&self) -> Hash {
        self.consensus.hash_genesis_block
    }

    pub fn is_regtest(&self) -> bool {
        self.id == NetworkId::Regtest
    }

    pub fn is_testnet(&self) -> bool {
        self.id == NetworkId::Test
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_names() {
        for id in NetworkId::ALL {
            assert_eq!(NetworkId::from_name(id.as_str()), Some(id));
            assert_eq!(id.to_string().parse::<NetworkId>().unwrap(), id);
        }
        assert_eq!(NetworkId::from_name("mainnet"), None);
        assert_eq!(NetworkId::from_name("Main"), None);
        assert!("bogus".parse::<NetworkId>().is_err());
    }

    #[test]
    fn test_network_id_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&NetworkId::Regtest).unwrap(), "\"regtest\"");
    }
}
