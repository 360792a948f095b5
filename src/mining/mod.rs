//! Mining module - genesis nonce search

mod miner;

pub use miner::*;
