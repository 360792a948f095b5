//! Chain parameters - per-network constants, checkpoints, seeds and the
//! process-wide network selection

pub mod chainparams;
mod checkpoints;
mod network;
pub mod regtest;
mod registry;
mod seeds;

pub use chainparams::{genesis_params, main_params, params_for, regtest_params, test_params};
pub use checkpoints::CheckpointData;
pub use network::*;
pub use regtest::RegtestOverrides;
pub use registry::*;
pub use seeds::*;
