//! Consensus parameters
//!
//! Immutable per-network rules: proof-of-work limits, the halving schedule
//! and the upgrade table. Every derived query here is a pure function of the
//! stored fields and a block height.

use primitive_types::U256;

use super::funding::{FundingStream, FundingStreamIndex, MAX_FUNDING_STREAMS};
use super::pow::PowHashParams;
use super::upgrades::{ActivationHeight, NetworkUpgradeTable, UpgradeIndex};
use crate::crypto::Hash;

/// Target spacing before Blossom, in seconds
pub const PRE_BLOSSOM_POW_TARGET_SPACING: i64 = 60;

/// Blossom halves the block interval
pub const BLOSSOM_POW_TARGET_SPACING_RATIO: i64 = 2;

pub const POST_BLOSSOM_POW_TARGET_SPACING: i64 =
    PRE_BLOSSOM_POW_TARGET_SPACING / BLOSSOM_POW_TARGET_SPACING_RATIO;

pub const PRE_BLOSSOM_HALVING_INTERVAL: u32 = 1_051_200;
pub const PRE_BLOSSOM_REGTEST_HALVING_INTERVAL: u32 = 144;

/// Halving interval once blocks come twice as fast
pub const fn post_blossom_halving_interval(pre_blossom_interval: u32) -> u32 {
    pre_blossom_interval * BLOSSOM_POW_TARGET_SPACING_RATIO as u32
}

/// Number of funding periods per post-Blossom halving interval
pub const FUNDING_PERIODS_PER_HALVING: u32 = 48;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsensusParams {
    pub hash_genesis_block: Hash,

    pub subsidy_slow_start_interval: u32,
    pub pre_blossom_subsidy_halving_interval: u32,
    pub post_blossom_subsidy_halving_interval: u32,
    pub founders_reward_percentage: u32,
    pub founders_reward_tx_percentage: u32,

    pub majority_enforce_block_upgrade: u32,
    pub majority_reject_block_outdated: u32,
    pub majority_window: u32,

    pub upgrades: NetworkUpgradeTable,
    pub funding_streams: [Option<FundingStream>; MAX_FUNDING_STREAMS],
    pub funding_period_length: u32,

    pub coinbase_must_be_shielded: bool,

    pub pow_limit: U256,
    pub pow_hash: PowHashParams,
    pub pow_averaging_window: i64,
    /// Percent
    pub pow_max_adjust_down: i64,
    /// Percent
    pub pow_max_adjust_up: i64,
    pub pre_blossom_pow_target_spacing: i64,
    pub post_blossom_pow_target_spacing: i64,
    pub pow_allow_min_difficulty_blocks_after_height: Option<u32>,
    pub pow_no_retargeting: bool,
    pub future_timestamp_soft_fork_height: Option<u32>,
    pub minimum_chain_work: U256,
}

impl ConsensusParams {
    /// Fail fast on a pow limit so easy that averaging `pow_averaging_window`
    /// targets would overflow 256 bits
    pub fn assert_pow_limit(&self, network: &str) {
        assert!(!self.pow_limit.is_zero(), "{network}: pow limit is zero");
        assert!(
            U256::MAX / self.pow_limit >= U256::from(self.pow_averaging_window as u64),
            "{network}: pow limit too large for averaging window {}",
            self.pow_averaging_window
        );
    }

    pub fn is_active(&self, idx: UpgradeIndex, height: u32) -> bool {
        self.upgrades.is_active(idx, height)
    }

    fn blossom_activation(&self, height: u32) -> Option<i64> {
        if !self.is_active(UpgradeIndex::Blossom, height) {
            return None;
        }
        match self.upgrades.get(UpgradeIndex::Blossom).activation_height {
            ActivationHeight::AlwaysActive => Some(0),
            ActivationHeight::At(h) => Some(i64::from(h)),
            ActivationHeight::NoActivation => None,
        }
    }

    pub fn subsidy_slow_start_shift(&self) -> u32 {
        self.subsidy_slow_start_interval / 2
    }

    pub fn subsidy_halving_interval(&self, height: u32) -> u32 {
        if self.is_active(UpgradeIndex::Blossom, height) {
            self.post_blossom_subsidy_halving_interval
        } else {
            self.pre_blossom_subsidy_halving_interval
        }
    }

    /// Number of halvings that have happened by `height`.
    ///
    /// Blocks before Blossom count double, since they were twice as far
    /// apart. Heights inside the slow-start shift give 0.
    pub fn halving(&self, height: u32) -> i64 {
        let shift = i64::from(self.subsidy_slow_start_shift());
        let h = i64::from(height);
        match self.blossom_activation(height) {
            Some(blossom) => {
                let scaled = (blossom - shift) * BLOSSOM_POW_TARGET_SPACING_RATIO;
                (scaled + (h - blossom)) / i64::from(self.post_blossom_subsidy_halving_interval)
            }
            None => (h - shift) / i64::from(self.pre_blossom_subsidy_halving_interval),
        }
    }

    /// Height of halving number `halving_index` as seen from `height`.
    ///
    /// Signed: with Blossom active very early the scaled formula can fall
    /// below zero.
    pub fn halving_height(&self, height: u32, halving_index: u32) -> i64 {
        assert!(halving_index > 0, "halving index must be positive");
        let shift = i64::from(self.subsidy_slow_start_shift());
        let index = i64::from(halving_index);
        match self.blossom_activation(height) {
            Some(blossom) => {
                index * i64::from(self.post_blossom_subsidy_halving_interval)
                    - (blossom - shift) * BLOSSOM_POW_TARGET_SPACING_RATIO
                    + blossom
            }
            None => index * i64::from(self.pre_blossom_subsidy_halving_interval) + shift,
        }
    }

    /// Last block that pays a founders' reward
    pub fn last_founders_reward_height(&self, height: u32) -> i64 {
        self.halving_height(height, 1) - 1
    }

    /// Index of the funding period containing `height` for a stream starting
    /// at `start_height`. The first period is shortened so that periods line
    /// up with the first halving.
    pub fn funding_period_index(&self, start_height: u32, height: u32) -> u32 {
        assert!(height >= start_height, "height {height} before funding stream start {start_height}");
        let length = i64::from(self.funding_period_length);
        let first_halving = self.halving_height(start_height, 1);
        let offset = (i64::from(start_height) - first_halving).rem_euclid(length);
        ((i64::from(height) - i64::from(start_height) + offset) / length) as u32
    }

    pub fn funding_stream(&self, idx: FundingStreamIndex) -> Option<&FundingStream> {
        self.funding_streams[idx as usize].as_ref()
    }

    pub fn pow_target_spacing(&self, height: u32) -> i64 {
        if self.is_active(UpgradeIndex::Blossom, height) {
            self.post_blossom_pow_target_spacing
        } else {
            self.pre_blossom_pow_target_spacing
        }
    }

    pub fn averaging_window_timespan(&self, height: u32) -> i64 {
        self.pow_averaging_window * self.pow_target_spacing(height)
    }

    pub fn min_actual_timespan(&self, height: u32) -> i64 {
        (self.averaging_window_timespan(height) * (100 - self.pow_max_adjust_up)) / 100
    }

    pub fn max_actual_timespan(&self, height: u32) -> i64 {
        (self.averaging_window_timespan(height) * (100 + self.pow_max_adjust_down)) / 100
    }

    /// Whether minimum-difficulty blocks may be mined at `height`
    pub fn allows_min_difficulty_at(&self, height: u32) -> bool {
        self.pow_allow_min_difficulty_blocks_after_height
            .is_some_and(|after| height > after)
    }

    pub fn future_timestamp_soft_fork_active(&self, height: u32) -> bool {
        self.future_timestamp_soft_fork_height
            .is_some_and(|fork| height >= fork)
    }
}
