//! Seed node configuration
//!
//! DNS seeds are queried for peer addresses on first start. Fixed seeds are
//! literal socket addresses used when DNS gives nothing back.

use serde::Serialize;
use std::net::SocketAddr;

use super::network::NetworkId;

/// A DNS seed: operator name and the host to query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DnsSeed {
    pub name: &'static str,
    pub host: &'static str,
}

const MAINNET_DNS_SEEDS: &[DnsSeed] = &[DnsSeed {
    name: "ko-to.org",
    host: "dnsseed.ko-to.org",
}];

const TESTNET_DNS_SEEDS: &[DnsSeed] = &[
    DnsSeed {
        name: "ko-to.org",
        host: "testnet.ko-to.org",
    },
    DnsSeed {
        name: "kotocoin.info",
        host: "dnsseed.testnet.kotocoin.info",
    },
];

/// DNS seeds for a network; regtest has none
pub fn dns_seeds(network: NetworkId) -> Vec<DnsSeed> {
    match network {
        NetworkId::Main => MAINNET_DNS_SEEDS.to_vec(),
        NetworkId::Test => TESTNET_DNS_SEEDS.to_vec(),
        NetworkId::Regtest => Vec::new(),
    }
}

/// Fixed seed addresses compiled into the binary.
///
/// No addresses are shipped yet on any network, so nodes bootstrap from DNS.
pub fn fixed_seeds(_network: NetworkId) -> Vec<SocketAddr> {
    Vec::new()
}
