//! Checkpoint table
//!
//! Block hashes at fixed heights that every node must agree on. Blocks that
//! contradict a checkpoint are rejected outright, and reorganisations that
//! would replace a checkpointed block are refused.

use std::collections::BTreeMap;

use crate::crypto::{pinned, Hash};

const SECONDS_PER_DAY: f64 = 86_400.0;

#[derive(Debug, Clone, PartialEq)]
pub struct CheckpointData {
    pub checkpoints: BTreeMap<u32, Hash>,
    /// UNIX timestamp of the last checkpoint block
    pub time_last_checkpoint: i64,
    /// Transactions between genesis and the last checkpoint
    pub transactions_last_checkpoint: u64,
    /// Estimated transactions per day after the last checkpoint
    pub transactions_per_day: f64,
}

impl CheckpointData {
    /// Build a table from `(height, display-order hash)` pairs
    pub fn new(
        entries: &[(u32, &str)],
        time_last_checkpoint: i64,
        transactions_last_checkpoint: u64,
        transactions_per_day: f64,
    ) -> Self {
        let checkpoints = entries
            .iter()
            .map(|&(height, hash)| (height, pinned(hash)))
            .collect();
        Self {
            checkpoints,
            time_last_checkpoint,
            transactions_last_checkpoint,
            transactions_per_day,
        }
    }

    /// Pin `hash` at `height`, replacing any previous entry
    pub fn with_checkpoint(mut self, height: u32, hash: Hash) -> Self {
        self.checkpoints.insert(height, hash);
        self
    }

    /// False only if `height` is checkpointed to a different hash
    pub fn check_block(&self, height: u32, hash: &Hash) -> bool {
        self.checkpoints
            .get(&height)
            .map_or(true, |expected| expected == hash)
    }

    pub fn last_checkpoint_height(&self) -> u32 {
        self.checkpoints.keys().next_back().copied().unwrap_or(0)
    }

    pub fn last_checkpoint(&self) -> Option<(u32, Hash)> {
        self.checkpoints
            .iter()
            .next_back()
            .map(|(height, hash)| (*height, *hash))
    }

    /// Whether a fork replacing the block at `height` may be accepted
    pub fn fork_allowed_at(&self, height: u32) -> bool {
        height > self.last_checkpoint_height()
    }

    /// Rough total transaction count at time `now`
    pub fn estimated_transactions(&self, now: i64) -> f64 {
        let elapsed_days = (now - self.time_last_checkpoint).max(0) as f64 / SECONDS_PER_DAY;
        self.transactions_last_checkpoint as f64 + elapsed_days * self.transactions_per_day
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::sha256d;

    fn data() -> CheckpointData {
        CheckpointData::new(
            &[(
                85_000,
                "f1b07e23116246700d5ad5e12a1105f02faa6b9d952fac8da5e2bb299b86372e",
            )],
            1_526_264_849,
            86_482,
            1_465.0,
        )
        .with_checkpoint(0, sha256d(b"genesis"))
    }

    #[test]
    fn test_check_block() {
        let data = data();
        let pinned_hash =
            Hash::from_hex("f1b07e23116246700d5ad5e12a1105f02faa6b9d952fac8da5e2bb299b86372e").unwrap();
        assert!(data.check_block(85_000, &pinned_hash));
        assert!(!data.check_block(85_000, &sha256d(b"other")));
        // Heights without a checkpoint accept anything
        assert!(data.check_block(85_001, &sha256d(b"other")));
        assert!(data.check_block(0, &sha256d(b"genesis")));
    }

    #[test]
    fn test_last_checkpoint_and_forks() {
        let data = data();
        assert_eq!(data.last_checkpoint_height(), 85_000);
        assert_eq!(data.last_checkpoint().unwrap().0, 85_000);
        assert!(!data.fork_allowed_at(85_000));
        assert!(!data.fork_allowed_at(10));
        assert!(data.fork_allowed_at(85_001));
    }

    #[test]
    fn test_estimated_transactions() {
        let data = data();
        assert_eq!(data.estimated_transactions(1_526_264_849), 86_482.0);
        assert_eq!(data.estimated_transactions(1_526_264_849 + 2 * 86_400), 86_482.0 + 2.0 * 1_465.0);
        // Clock before the checkpoint does not go backwards
        assert_eq!(data.estimated_transactions(0), 86_482.0);
    }
}
