//! Koto Core Library
//!
//! Consensus parameters, block header format and genesis construction for
//! the Koto chain (a Zcash-derived, memory-hard proof-of-work coin).
//!
//! A process selects one network at startup through
//! [`chain::select_network`]; every consensus check afterwards reads the
//! same immutable [`chain::NetworkParams`].

pub mod chain;
pub mod config;
pub mod consensus;
pub mod crypto;
pub mod keys;
pub mod mining;
pub mod node;
pub mod serialization;
pub mod validation;

