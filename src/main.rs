//! Koto chain parameter tool
//!
//! Selects a network, verifies its compiled-in genesis block and prints the
//! parameter set. With `--mine-genesis` (or `MINE_GENESIS=1`) it first
//! searches for a genesis nonce under the network's proof-of-work rules.

use koto_core::chain::{genesis_params, select_network, NetworkId, NetworkParams};
use koto_core::config::{self, NodeConfig};
use koto_core::consensus::{ActivationHeight, UpgradeIndex};
use koto_core::mining::{GenesisMiner, MiningResult};
use serde::Serialize;
use std::error::Error;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = NodeConfig::from_env(config::parse_args());
    init_logging(&config.log_level);

    if let Err(e) = run(&config).await {
        error!("{}", e);
        return Err(e);
    }
    Ok(())
}

fn init_logging(log_level: &str) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    fmt().with_env_filter(filter).with_target(true).init();
}

async fn run(config: &NodeConfig) -> Result<(), Box<dyn Error>> {
    let params = select_network(&config.network, config.regtest)?;

    if config.mine_genesis {
        mine_genesis(params).await?;
    }

    let summary = ParamsSummary::new(params);
    if config.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        summary.print();
    }
    Ok(())
}

async fn mine_genesis(params: &'static NetworkParams) -> Result<(), Box<dyn Error>> {
    let miner = GenesisMiner::for_network(params);
    let genesis = genesis_params(params.id);
    let worker = miner.clone();
    let mut handle = tokio::task::spawn_blocking(move || worker.mine_genesis(&genesis));

    let result = tokio::select! {
        res = &mut handle => res??,
        _ = tokio::signal::ctrl_c() => {
            warn!("shutdown signal received, stopping genesis search");
            miner.stop();
            handle.await??
        }
    };

    match result {
        MiningResult::Found(block) => {
            println!("Mined genesis block for {}:", params.id);
            println!("  Hash:        {}", block.hash());
            println!("  Merkle Root: {}", block.header.merkle_root);
            println!("  Time:        {}", block.header.time);
            println!("  Nonce:       {}", block.header.nonce);
            println!("  Bits:        {:#010x}", block.header.bits);
            println!();
        }
        MiningResult::Interrupted(block) => {
            info!(
                time = block.header.time,
                nonce = block.header.nonce,
                "genesis search interrupted"
            );
        }
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct UpgradeSummary {
    name: &'static str,
    branch_id: String,
    protocol_version: u32,
    activation: ActivationHeight,
}

#[derive(Debug, Serialize)]
struct ParamsSummary {
    network: NetworkId,
    currency_units: &'static str,
    bip44_coin_type: u32,
    message_start: String,
    default_port: u16,
    genesis_hash: String,
    genesis_merkle_root: String,
    genesis_time: u32,
    genesis_bits: String,
    pow_limit: String,
    upgrades: Vec<UpgradeSummary>,
    last_founders_reward_height: i64,
    founders_reward_address: &'static str,
    dns_seeds: Vec<&'static str>,
    last_checkpoint_height: u32,
}

impl ParamsSummary {
    fn new(params: &NetworkParams) -> Self {
        let genesis = params.genesis_block();
        let upgrades = params
            .consensus
            .upgrades
            .iter()
            .filter(|(idx, _)| *idx != UpgradeIndex::TestDummy)
            .map(|(idx, upgrade)| UpgradeSummary {
                name: idx.name(),
                branch_id: format!("{:08x}", idx.branch_id()),
                protocol_version: upgrade.protocol_version,
                activation: upgrade.activation_height,
            })
            .collect();

        Self {
            network: params.id,
            currency_units: params.currency_units,
            bip44_coin_type: params.bip44_coin_type,
            message_start: hex::encode(params.message_start),
            default_port: params.default_port,
            genesis_hash: genesis.hash().to_string(),
            genesis_merkle_root: genesis.header.merkle_root.to_string(),
            genesis_time: genesis.header.time,
            genesis_bits: format!("{:#010x}", genesis.header.bits),
            pow_limit: format!("{:064x}", params.consensus.pow_limit),
            upgrades,
            last_founders_reward_height: params.consensus.last_founders_reward_height(0),
            founders_reward_address: params.founders_reward_address_at_height(1),
            dns_seeds: params.dns_seeds.iter().map(|seed| seed.host).collect(),
            last_checkpoint_height: params.checkpoints.last_checkpoint_height(),
        }
    }

    fn print(&self) {
        println!("Network:            {} ({})", self.network, self.currency_units);
        println!("Message Start:      {}", self.message_start);
        println!("Default Port:       {}", self.default_port);
        println!("Genesis Hash:       {}", self.genesis_hash);
        println!("Genesis Merkle:     {}", self.genesis_merkle_root);
        println!("Genesis Time:       {}", self.genesis_time);
        println!("Genesis Bits:       {}", self.genesis_bits);
        println!("PoW Limit:          {}", self.pow_limit);
        println!("Founders' Reward:   {} (until height {})", self.founders_reward_address, self.last_founders_reward_height);
        println!("Last Checkpoint:    {}", self.last_checkpoint_height);
        println!("DNS Seeds:          {}", self.dns_seeds.join(", "));
        println!("Network Upgrades:");
        for upgrade in &self.upgrades {
            let activation = match upgrade.activation {
                ActivationHeight::AlwaysActive => "always active".to_string(),
                ActivationHeight::At(height) => format!("height {height}"),
                ActivationHeight::NoActivation => "not scheduled".to_string(),
            };
            println!(
                "  {:<12} branch {}  protocol {:<10} {}",
                upgrade.name, upgrade.branch_id, upgrade.protocol_version, activation
            );
        }
    }
}
