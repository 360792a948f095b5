//! Network upgrade activation table
//!
//! Each network carries one entry per upgrade slot: the protocol version it
//! introduces, the height it activates at and optionally the hash of the
//! activation block that nodes pin to. Slots are ordered, and later slots
//! always activate at or after earlier ones on a well-formed network.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::crypto::Hash;

/// Number of upgrade slots
pub const MAX_NETWORK_UPGRADES: usize = 9;

/// Index of an upgrade slot, in activation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum UpgradeIndex {
    BaseSprout = 0,
    TestDummy,
    Overwinter,
    Sapling,
    Blossom,
    Heartwood,
    Canopy,
    Nu5,
    ZFuture,
}

/// Raw slot index outside `0..MAX_NETWORK_UPGRADES`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("network upgrade index {0} out of range")]
pub struct UpgradeIndexError(pub usize);

impl UpgradeIndex {
    pub const ALL: [UpgradeIndex; MAX_NETWORK_UPGRADES] = [
        UpgradeIndex::BaseSprout,
        UpgradeIndex::TestDummy,
        UpgradeIndex::Overwinter,
        UpgradeIndex::Sapling,
        UpgradeIndex::Blossom,
        UpgradeIndex::Heartwood,
        UpgradeIndex::Canopy,
        UpgradeIndex::Nu5,
        UpgradeIndex::ZFuture,
    ];

    pub fn info(self) -> &'static UpgradeInfo {
        &UPGRADE_INFO[self as usize]
    }

    pub fn branch_id(self) -> u32 {
        self.info().branch_id
    }

    pub fn name(self) -> &'static str {
        self.info().name
    }
}

impl TryFrom<usize> for UpgradeIndex {
    type Error = UpgradeIndexError;

    fn try_from(raw: usize) -> Result<Self, Self::Error> {
        UpgradeIndex::ALL
            .get(raw)
            .copied()
            .ok_or(UpgradeIndexError(raw))
    }
}

impl fmt::Display for UpgradeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Network-independent facts about an upgrade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpgradeInfo {
    /// Consensus branch id committed to in transaction signatures
    pub branch_id: u32,
    pub name: &'static str,
    pub info: &'static str,
}

pub const UPGRADE_INFO: [UpgradeInfo; MAX_NETWORK_UPGRADES] = [
    UpgradeInfo {
        branch_id: 0,
        name: "Sprout",
        info: "The Koto network at launch",
    },
    UpgradeInfo {
        branch_id: 0x7473_6554,
        name: "Test dummy",
        info: "Test dummy info",
    },
    UpgradeInfo {
        branch_id: 0x5ba8_1b19,
        name: "Overwinter",
        info: "Transaction expiry and versioned transaction formats",
    },
    UpgradeInfo {
        branch_id: 0x76b8_09bb,
        name: "Sapling",
        info: "Sapling shielded pool",
    },
    UpgradeInfo {
        branch_id: 0x2bb4_0e60,
        name: "Blossom",
        info: "Halved target block spacing",
    },
    UpgradeInfo {
        branch_id: 0xf5b9_230b,
        name: "Heartwood",
        info: "Chain history commitments and shielded coinbase",
    },
    UpgradeInfo {
        branch_id: 0xe9ff_75a6,
        name: "Canopy",
        info: "Funding streams",
    },
    UpgradeInfo {
        branch_id: 0xc2d6_d0b4,
        name: "NU5",
        info: "Orchard shielded pool and block commitments",
    },
    UpgradeInfo {
        branch_id: 0xffff_ffff,
        name: "ZFUTURE",
        info: "Some future upgrade",
    },
];

/// When an upgrade activates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivationHeight {
    /// Active from genesis
    AlwaysActive,
    At(u32),
    /// Never activates on this network
    NoActivation,
}

impl ActivationHeight {
    /// Concrete height, `None` if the upgrade never activates
    pub fn height(self) -> Option<u32> {
        match self {
            ActivationHeight::AlwaysActive => Some(0),
            ActivationHeight::At(h) => Some(h),
            ActivationHeight::NoActivation => None,
        }
    }

    pub fn is_reached(self, height: u32) -> bool {
        self.height().is_some_and(|activation| height >= activation)
    }
}

/// One slot of the table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkUpgrade {
    pub protocol_version: u32,
    pub activation_height: ActivationHeight,
    /// Hash of the block at the activation height, when pinned
    pub hash_activation_block: Option<Hash>,
}

impl NetworkUpgrade {
    pub const fn new(protocol_version: u32, activation_height: ActivationHeight) -> Self {
        Self {
            protocol_version,
            activation_height,
            hash_activation_block: None,
        }
    }

    pub const fn pinned(protocol_version: u32, height: u32, hash: Hash) -> Self {
        Self {
            protocol_version,
            activation_height: ActivationHeight::At(height),
            hash_activation_block: Some(hash),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpgradeState {
    /// Never activates on this network
    Disabled,
    /// Scheduled but not yet reached
    Pending,
    Active,
}

/// Per-network upgrade schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkUpgradeTable {
    upgrades: [NetworkUpgrade; MAX_NETWORK_UPGRADES],
}

impl NetworkUpgradeTable {
    /// Build a table; Sprout must be active from genesis
    pub fn new(upgrades: [NetworkUpgrade; MAX_NETWORK_UPGRADES]) -> Self {
        assert_eq!(
            upgrades[UpgradeIndex::BaseSprout as usize].activation_height,
            ActivationHeight::AlwaysActive,
            "Sprout must be active from genesis"
        );
        Self { upgrades }
    }

    pub fn get(&self, idx: UpgradeIndex) -> &NetworkUpgrade {
        &self.upgrades[idx as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = (UpgradeIndex, &NetworkUpgrade)> {
        UpgradeIndex::ALL.into_iter().zip(self.upgrades.iter())
    }

    /// Protocol version of the highest upgrade active at `height`
    pub fn upgrade_for_height(&self, height: u32) -> u32 {
        self.upgrades
            .iter()
            .rev()
            .find(|upgrade| upgrade.activation_height.is_reached(height))
            .map(|upgrade| upgrade.protocol_version)
            .unwrap_or(self.upgrades[0].protocol_version)
    }

    pub fn state(&self, idx: UpgradeIndex, height: u32) -> UpgradeState {
        match self.get(idx).activation_height {
            ActivationHeight::NoActivation => UpgradeState::Disabled,
            activation if activation.is_reached(height) => UpgradeState::Active,
            _ => UpgradeState::Pending,
        }
    }

    pub fn is_active(&self, idx: UpgradeIndex, height: u32) -> bool {
        self.state(idx, height) == UpgradeState::Active
    }

    /// Whether `height` is exactly where `idx` activates. Sprout has no
    /// activation height.
    pub fn is_activation_height(&self, idx: UpgradeIndex, height: u32) -> bool {
        if idx == UpgradeIndex::BaseSprout {
            return false;
        }
        self.get(idx).activation_height == ActivationHeight::At(height)
    }

    /// Whether `height` activates any upgrade
    pub fn is_any_activation_height(&self, height: u32) -> bool {
        UpgradeIndex::ALL
            .into_iter()
            .any(|idx| self.is_activation_height(idx, height))
    }

    /// Latest upgrade active at `height`
    pub fn current_epoch(&self, height: u32) -> UpgradeIndex {
        UpgradeIndex::ALL
            .into_iter()
            .rev()
            .find(|&idx| self.is_active(idx, height))
            .unwrap_or(UpgradeIndex::BaseSprout)
    }

    pub fn current_epoch_branch_id(&self, height: u32) -> u32 {
        self.current_epoch(height).branch_id()
    }

    /// First upgrade still pending at `height`
    pub fn next_epoch(&self, height: u32) -> Option<UpgradeIndex> {
        UpgradeIndex::ALL
            .into_iter()
            .skip(1)
            .find(|&idx| self.state(idx, height) == UpgradeState::Pending)
    }

    pub fn next_activation_height(&self, height: u32) -> Option<u32> {
        self.next_epoch(height)
            .and_then(|idx| self.get(idx).activation_height.height())
    }

    /// Move an activation height. Only reachable through regtest overrides.
    pub(crate) fn set_activation_height(&mut self, idx: UpgradeIndex, activation: ActivationHeight) {
        assert!(
            idx != UpgradeIndex::BaseSprout,
            "cannot move the Sprout activation height"
        );
        self.upgrades[idx as usize].activation_height = activation;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ActivationHeight::*;

    fn table() -> NetworkUpgradeTable {
        NetworkUpgradeTable::new([
            NetworkUpgrade::new(170_002, AlwaysActive),
            NetworkUpgrade::new(170_002, NoActivation),
            NetworkUpgrade::new(170_005, At(100)),
            NetworkUpgrade::new(170_007, At(200)),
            NetworkUpgrade::new(170_009, At(300)),
            NetworkUpgrade::new(170_011, NoActivation),
            NetworkUpgrade::new(170_013, NoActivation),
            NetworkUpgrade::new(170_015, NoActivation),
            NetworkUpgrade::new(0x7fff_ffff, NoActivation),
        ])
    }

    #[test]
    fn test_upgrade_for_height() {
        let t = table();
        assert_eq!(t.upgrade_for_height(0), 170_002);
        assert_eq!(t.upgrade_for_height(99), 170_002);
        assert_eq!(t.upgrade_for_height(100), 170_005);
        assert_eq!(t.upgrade_for_height(250), 170_007);
        assert_eq!(t.upgrade_for_height(u32::MAX), 170_009);
    }

    #[test]
    fn test_states() {
        let t = table();
        assert_eq!(t.state(UpgradeIndex::BaseSprout, 0), UpgradeState::Active);
        assert_eq!(t.state(UpgradeIndex::Overwinter, 99), UpgradeState::Pending);
        assert_eq!(t.state(UpgradeIndex::Overwinter, 100), UpgradeState::Active);
        assert_eq!(t.state(UpgradeIndex::Heartwood, 1_000_000), UpgradeState::Disabled);
        assert!(!t.is_active(UpgradeIndex::TestDummy, u32::MAX));
    }

    #[test]
    fn test_activation_heights() {
        let t = table();
        assert!(t.is_activation_height(UpgradeIndex::Sapling, 200));
        assert!(!t.is_activation_height(UpgradeIndex::Sapling, 201));
        assert!(!t.is_activation_height(UpgradeIndex::BaseSprout, 0));
        assert!(t.is_any_activation_height(300));
        assert!(!t.is_any_activation_height(301));
    }

    #[test]
    fn test_epochs() {
        let t = table();
        assert_eq!(t.current_epoch(0), UpgradeIndex::BaseSprout);
        assert_eq!(t.current_epoch(150), UpgradeIndex::Overwinter);
        assert_eq!(t.current_epoch_branch_id(150), 0x5ba8_1b19);
        assert_eq!(t.current_epoch_branch_id(10), 0);
        assert_eq!(t.next_epoch(150), Some(UpgradeIndex::Sapling));
        assert_eq!(t.next_activation_height(150), Some(200));
        assert_eq!(t.next_activation_height(300), None);
    }

    #[test]
    fn test_index_conversion() {
        assert_eq!(UpgradeIndex::try_from(4), Ok(UpgradeIndex::Blossom));
        assert_eq!(UpgradeIndex::try_from(9), Err(UpgradeIndexError(9)));
        for (raw, idx) in UpgradeIndex::ALL.into_iter().enumerate() {
            assert_eq!(idx as usize, raw);
        }
        assert_eq!(UpgradeIndex::Nu5.to_string(), "NU5");
    }

    #[test]
    fn test_set_activation_height() {
        let mut t = table();
        t.set_activation_height(UpgradeIndex::Heartwood, At(400));
        assert!(t.is_active(UpgradeIndex::Heartwood, 400));
        assert_eq!(t.upgrade_for_height(400), 170_011);
    }

    #[test]
    #[should_panic(expected = "cannot move the Sprout activation height")]
    fn test_set_sprout_activation_panics() {
        table().set_activation_height(UpgradeIndex::BaseSprout, At(10));
    }
}
