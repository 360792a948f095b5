//! Test-only mutation of regtest parameters
//!
//! Main and test parameters are immutable once built. Regtest can be
//! reshaped before it is selected, so integration tests can activate
//! upgrades at low heights, install funding streams or relax proof-of-work.

use primitive_types::U256;
use tracing::warn;

use super::chainparams::regtest_params;
use super::network::NetworkParams;
use crate::consensus::{ActivationHeight, FundingStream, FundingStreamError, FundingStreamIndex, UpgradeIndex};

/// Builder over a regtest parameter set
#[derive(Debug, Clone)]
pub struct RegtestOverrides {
    params: NetworkParams,
}

impl Default for RegtestOverrides {
    fn default() -> Self {
        Self::new()
    }
}

impl RegtestOverrides {
    pub fn new() -> Self {
        Self {
            params: regtest_params(),
        }
    }

    /// Wrap an existing parameter set, which must be regtest
    pub fn from_params(params: NetworkParams) -> Self {
        assert!(
            params.is_regtest(),
            "overrides are only allowed on regtest, not {}",
            params.id
        );
        Self { params }
    }

    pub fn params(&self) -> &NetworkParams {
        &self.params
    }

    /// Move an upgrade's activation height. Panics for Sprout.
    pub fn update_network_upgrade(mut self, idx: UpgradeIndex, activation: ActivationHeight) -> Self {
        warn!(upgrade = %idx, ?activation, "overriding regtest network upgrade");
        self.params
            .consensus
            .upgrades
            .set_activation_height(idx, activation);
        self
    }

    /// Install an already validated funding stream
    pub fn update_funding_stream(mut self, idx: FundingStreamIndex, stream: FundingStream) -> Self {
        warn!(
            stream = ?idx,
            start = stream.start_height(),
            end = stream.end_height(),
            "overriding regtest funding stream"
        );
        self.params.consensus.funding_streams[idx as usize] = Some(stream);
        self
    }

    /// Parse, validate and install a funding stream from regtest addresses
    pub fn add_funding_stream(
        mut self,
        idx: FundingStreamIndex,
        start_height: u32,
        end_height: u32,
        addresses: &[&str],
    ) -> Result<Self, FundingStreamError> {
        let keys = self.params.keys.clone();
        self.params
            .consensus
            .add_zip207_funding_stream(&keys, idx, start_height, end_height, addresses)?;
        warn!(stream = ?idx, start_height, end_height, "added regtest funding stream");
        Ok(self)
    }

    pub fn update_pow(
        mut self,
        max_adjust_down: i64,
        max_adjust_up: i64,
        pow_limit: U256,
        no_retargeting: bool,
    ) -> Self {
        warn!(
            max_adjust_down,
            max_adjust_up,
            no_retargeting,
            "overriding regtest proof-of-work"
        );
        let consensus = &mut self.params.consensus;
        consensus.pow_max_adjust_down = max_adjust_down;
        consensus.pow_max_adjust_up = max_adjust_up;
        consensus.pow_limit = pow_limit;
        consensus.pow_no_retargeting = no_retargeting;
        consensus.assert_pow_limit("regtest");
        self
    }

    pub fn set_coinbase_must_be_shielded(mut self) -> Self {
        warn!("regtest coinbase must be shielded");
        self.params.consensus.coinbase_must_be_shielded = true;
        self
    }

    pub fn set_zip209_enabled(mut self) -> Self {
        warn!("regtest ZIP 209 enabled");
        self.params.zip209_enabled = true;
        self
    }

    pub fn build(self) -> NetworkParams {
        self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::chainparams::main_params;
    use crate::consensus::UpgradeState;

    #[test]
    fn test_update_network_upgrade() {
        let params = RegtestOverrides::new()
            .update_network_upgrade(UpgradeIndex::Overwinter, ActivationHeight::At(10))
            .update_network_upgrade(UpgradeIndex::Sapling, ActivationHeight::At(20))
            .build();
        let upgrades = &params.consensus.upgrades;
        assert_eq!(upgrades.state(UpgradeIndex::Overwinter, 9), UpgradeState::Pending);
        assert_eq!(upgrades.upgrade_for_height(10), 170_003);
        assert_eq!(upgrades.upgrade_for_height(20), 170_006);
        assert_eq!(upgrades.state(UpgradeIndex::Blossom, 20), UpgradeState::Disabled);
    }

    #[test]
    #[should_panic(expected = "cannot move the Sprout activation height")]
    fn test_sprout_cannot_move() {
        RegtestOverrides::new().update_network_upgrade(UpgradeIndex::BaseSprout, ActivationHeight::At(5));
    }

    #[test]
    #[should_panic(expected = "overrides are only allowed on regtest")]
    fn test_main_rejected() {
        RegtestOverrides::from_params(main_params());
    }

    #[test]
    fn test_flags_and_pow() {
        let limit = U256::MAX >> 8;
        let params = RegtestOverrides::new()
            .set_coinbase_must_be_shielded()
            .set_zip209_enabled()
            .update_pow(4, 2, limit, false)
            .build();
        assert!(params.consensus.coinbase_must_be_shielded);
        assert!(params.zip209_enabled);
        assert_eq!(params.consensus.pow_limit, limit);
        assert_eq!(params.consensus.pow_max_adjust_down, 4);
        assert!(!params.consensus.pow_no_retargeting);
    }

    #[test]
    fn test_funding_stream_needs_canopy() {
        let address = "k2A4ArX2YAQJ6Qiut7tNNWUhq3Np7Et525K";
        let err = RegtestOverrides::new()
            .add_funding_stream(FundingStreamIndex::Zip214Bp, 10, 20, &[address])
            .unwrap_err();
        assert_eq!(err, FundingStreamError::CanopyNotActive(10));

        let overrides = RegtestOverrides::new()
            .update_network_upgrade(UpgradeIndex::Blossom, ActivationHeight::At(5))
            .update_network_upgrade(UpgradeIndex::Canopy, ActivationHeight::At(5))
            .add_funding_stream(FundingStreamIndex::Zip214Bp, 10, 11, &[address])
            .unwrap();
        let params = overrides.build();
        let stream = params.consensus.funding_stream(FundingStreamIndex::Zip214Bp).unwrap();
        assert!(stream.recipient(&params.consensus, 10).unwrap().is_p2sh());

        let copy = RegtestOverrides::new()
            .update_funding_stream(FundingStreamIndex::Zip214Mg, stream.clone())
            .build();
        assert_eq!(copy.consensus.funding_stream(FundingStreamIndex::Zip214Mg), Some(stream));
    }

    #[test]
    fn test_funding_stream_with_early_blossom() {
        let address = "k2A4ArX2YAQJ6Qiut7tNNWUhq3Np7Et525K";
        let params = RegtestOverrides::new()
            .update_network_upgrade(UpgradeIndex::Blossom, ActivationHeight::At(300))
            .update_network_upgrade(UpgradeIndex::Canopy, ActivationHeight::At(300))
            .add_funding_stream(FundingStreamIndex::Zip214Bp, 300, 310, &[address, address])
            .unwrap()
            .build();
        let consensus = &params.consensus;
        assert!(consensus.halving_height(300, 1) < 0);

        let stream = consensus.funding_stream(FundingStreamIndex::Zip214Bp).unwrap();
        assert_eq!(consensus.funding_period_index(300, 309), 1);
        assert!(stream.recipient(consensus, 309).is_some());
        assert!(stream.recipient(consensus, 310).is_none());

        let err = RegtestOverrides::new()
            .update_network_upgrade(UpgradeIndex::Blossom, ActivationHeight::At(300))
            .update_network_upgrade(UpgradeIndex::Canopy, ActivationHeight::At(300))
            .add_funding_stream(FundingStreamIndex::Zip214Bp, 300, 310, &[address])
            .unwrap_err();
        assert_eq!(
            err,
            FundingStreamError::InsufficientAddresses { needed: 2, available: 1 }
        );
    }
}
