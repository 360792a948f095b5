//! Genesis block miner
//!
//! Searches for a nonce that gives a genesis header a PoW hash at or below
//! its target. Only used to produce new genesis constants; a normal node
//! start never runs it.

use primitive_types::U256;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

use crate::chain::{GenesisParams, NetworkParams};
use crate::consensus::{hash_to_uint, pow_hash, Block, CompactTarget, PowError, PowHashParams};
use crate::node::create_koto_genesis_block;

/// Nonces between progress reports
pub const PROGRESS_INTERVAL: u64 = 100;

/// Mining result
#[derive(Debug)]
pub enum MiningResult {
    /// Header meets its target
    Found(Block),
    /// Stopped before a solution; the block holds the next nonce to try
    Interrupted(Block),
}

/// Single-threaded, cancellable nonce search
#[derive(Debug, Clone)]
pub struct GenesisMiner {
    hash_params: PowHashParams,
    pow_limit: U256,
    stop_signal: Arc<AtomicBool>,
}

impl GenesisMiner {
    pub fn new(hash_params: PowHashParams, pow_limit: U256) -> Self {
        Self {
            hash_params,
            pow_limit,
            stop_signal: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn for_network(params: &NetworkParams) -> Self {
        Self::new(params.consensus.pow_hash, params.consensus.pow_limit)
    }

    /// Get a stop signal handle
    pub fn stop_signal(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop_signal)
    }

    pub fn stop(&self) {
        self.stop_signal.store(true, Ordering::SeqCst);
    }

    pub fn reset(&self) {
        self.stop_signal.store(false, Ordering::SeqCst);
    }

    /// Build the genesis block from `genesis` with nonce 0 and search from there
    pub fn mine_genesis(&self, genesis: &GenesisParams) -> Result<MiningResult, PowError> {
        info!(
            time = genesis.time,
            bits = format_args!("{:#010x}", genesis.bits),
            memory_kib = self.hash_params.memory_kib(),
            "mining genesis block"
        );
        let block = create_koto_genesis_block(genesis.time, 0, genesis.bits, genesis.version, genesis.reward);
        let result = self.mine(block)?;
        if let MiningResult::Found(block) = &result {
            info!(
                hash = %block.hash(),
                merkle_root = %block.header.merkle_root,
                time = block.header.time,
                nonce = block.header.nonce,
                "genesis block found"
            );
        }
        Ok(result)
    }

    /// Search from the block's current nonce
    pub fn mine(&self, block: Block) -> Result<MiningResult, PowError> {
        self.mine_with_progress(block, PROGRESS_INTERVAL, |tried, block| {
            debug!(tried, nonce = block.header.nonce, time = block.header.time, "still mining");
        })
    }

    /// Search from the block's current nonce, calling `callback` every
    /// `progress_interval` hashes.
    ///
    /// When the nonce wraps the timestamp moves forward one second and the
    /// search continues. Fails up front if `bits` is not a usable target.
    pub fn mine_with_progress<F>(
        &self,
        mut block: Block,
        progress_interval: u64,
        mut callback: F,
    ) -> Result<MiningResult, PowError>
    where
        F: FnMut(u64, &Block),
    {
        let target = CompactTarget(block.header.bits).to_checked_target(&self.pow_limit)?;
        let interval = progress_interval.max(1);
        let mut tried = 0u64;

        loop {
            if self.stop_signal.load(Ordering::SeqCst) {
                return Ok(MiningResult::Interrupted(block));
            }

            let hash = pow_hash(&block.header, &self.hash_params)?;
            if hash_to_uint(&hash) <= target {
                return Ok(MiningResult::Found(block));
            }

            block.header.nonce = block.header.nonce.wrapping_add(1);
            if block.header.nonce == 0 {
                block.header.time = block.header.time.wrapping_add(1);
                info!(time = block.header.time, "nonce space exhausted, bumping time");
            }

            tried += 1;
            if tried % interval == 0 {
                callback(tried, &block);
            }
        }
    }
}
