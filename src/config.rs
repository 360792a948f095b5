//! Command line and environment configuration for `koto-chainparams`

use clap::Parser;
use serde::Serialize;

use crate::chain::{NetworkId, RegtestToggles};

/// Environment switch that turns on genesis mining
pub const MINE_GENESIS_ENV: &str = "MINE_GENESIS";

#[derive(Parser, Debug, Clone)]
#[command(name = "koto-chainparams")]
#[command(about = "Inspect Koto chain parameters and mine genesis blocks", long_about = None)]
pub struct Args {
    /// Network (main, test, regtest)
    #[arg(short, long, default_value = "main")]
    pub network: String,

    /// Require shielded coinbase outputs (regtest only)
    #[arg(long)]
    pub regtest_shield_coinbase: bool,

    /// Enable ZIP 209 pool-size checks from genesis (regtest only)
    #[arg(long)]
    pub developer_set_pool_size_zero: bool,

    /// Search for a genesis nonce instead of using the compiled-in one
    #[arg(long)]
    pub mine_genesis: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    pub log_level: String,

    /// Print the parameter summary as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn parse_args() -> Args {
    Args::parse()
}

/// Resolved configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeConfig {
    pub network: String,
    #[serde(skip)]
    pub regtest: RegtestToggles,
    pub mine_genesis: bool,
    pub log_level: String,
    pub json: bool,
}

impl NodeConfig {
    /// Merge arguments with the environment value of `MINE_GENESIS`
    pub fn resolve(args: Args, mine_genesis_env: Option<&str>) -> Self {
        Self {
            network: args.network,
            regtest: RegtestToggles {
                shield_coinbase: args.regtest_shield_coinbase,
                zero_pool_sizes: args.developer_set_pool_size_zero,
            },
            mine_genesis: args.mine_genesis || mine_genesis_enabled(mine_genesis_env),
            log_level: args.log_level,
            json: args.json,
        }
    }

    pub fn from_env(args: Args) -> Self {
        let env = std::env::var(MINE_GENESIS_ENV).ok();
        Self::resolve(args, env.as_deref())
    }

    pub fn network_id(&self) -> Option<NetworkId> {
        NetworkId::from_name(&self.network)
    }
}

/// A value whose leading integer is non-zero enables mining, so `1x` counts
/// and `yes` does not
pub fn mine_genesis_enabled(value: Option<&str>) -> bool {
    value.map(leading_integer).is_some_and(|n| n != 0)
}

/// Optional sign and leading decimal digits after whitespace; 0 if none
fn leading_integer(value: &str) -> i64 {
    let trimmed = value.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let magnitude = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i64, |acc, d| acc.saturating_mul(10).saturating_add(i64::from(d - b'0')));
    if negative {
        -magnitude
    } else {
        magnitude
    }
}
