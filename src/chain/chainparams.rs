//! Main, test and regtest parameter sets
//!
//! Each factory builds the full parameter set and then checks it: the
//! genesis block rebuilt from its constants must hash to the pinned value,
//! and the pow limit must leave room for difficulty averaging. A failure is
//! a broken binary, so the factories panic rather than return an error.

use primitive_types::U256;

use super::checkpoints::CheckpointData;
use super::network::{GenesisParams, NetworkFlags, NetworkId, NetworkParams, SproutValuePoolCheckpoint};
use super::seeds::{dns_seeds, fixed_seeds};
use crate::consensus::{
    post_blossom_halving_interval, ActivationHeight, ConsensusParams, NetworkUpgrade,
    NetworkUpgradeTable, PowHashParams, FUNDING_PERIODS_PER_HALVING, POST_BLOSSOM_POW_TARGET_SPACING,
    PRE_BLOSSOM_HALVING_INTERVAL, PRE_BLOSSOM_POW_TARGET_SPACING, PRE_BLOSSOM_REGTEST_HALVING_INTERVAL,
};
use crate::crypto::{pinned, Hash};
use crate::keys::KeyConstants;
use crate::node::{create_koto_genesis_block, verify_genesis_hash};

use ActivationHeight::{AlwaysActive, At, NoActivation};

pub const MAIN_GENESIS: GenesisParams = GenesisParams {
    time: 1_512_879_054,
    nonce: 2764,
    bits: 0x1f07ffff,
    version: 4,
    reward: 0,
    hash: "6d424c350729ae633275d51dc3496e16cd1b1d195c164da00f39c499a2e9959e",
    merkle_root: "e18deb20a8da8ae6a9e965a10f52873adb65f4f568a5ac4b24ab074c7c81bb72",
};

pub const TEST_GENESIS: GenesisParams = GenesisParams {
    time: 1_512_879_055,
    nonce: 28,
    bits: 0x2007ffff,
    version: 4,
    reward: 0,
    hash: "bf84afbde20c2d213b68b231ddb585ab616ef7567226820f00d9b397d774d2f0",
    merkle_root: "e18deb20a8da8ae6a9e965a10f52873adb65f4f568a5ac4b24ab074c7c81bb72",
};

pub const REGTEST_GENESIS: GenesisParams = GenesisParams {
    time: 1_512_879_056,
    nonce: 7,
    bits: 0x200f0f0f,
    version: 4,
    reward: 0,
    hash: "dd905d5cda469020ddc364fdb530a4fb4559b9a117f78fdfbcc89d29d4909289",
    merkle_root: "e18deb20a8da8ae6a9e965a10f52873adb65f4f568a5ac4b24ab074c7c81bb72",
};

const MAIN_FOUNDERS_REWARD_ADDRESS: &str = "k3EEgqMM8jpaGW6XXUHpv3kDprMfm1x1VEf";
const TEST_FOUNDERS_REWARD_ADDRESS: &str = "k2A4ArX2YAQJ6Qiut7tNNWUhq3Np7Et525K";

pub fn genesis_params(network: NetworkId) -> GenesisParams {
    match network {
        NetworkId::Main => MAIN_GENESIS,
        NetworkId::Test => TEST_GENESIS,
        NetworkId::Regtest => REGTEST_GENESIS,
    }
}

pub fn params_for(network: NetworkId) -> NetworkParams {
    match network {
        NetworkId::Main => main_params(),
        NetworkId::Test => test_params(),
        NetworkId::Regtest => regtest_params(),
    }
}

fn u256_hex(hex: &str) -> U256 {
    U256::from_str_radix(hex, 16).unwrap_or_else(|e| panic!("malformed 256-bit constant {hex}: {e:?}"))
}

fn testnet_keys(network_id: &'static str, hrps: [&'static str; 5]) -> KeyConstants {
    KeyConstants {
        network_id,
        base58_prefixes: [
            &[0x18, 0xa4],
            &[0x18, 0x39],
            &[0xef],
            &[0x04, 0x35, 0x87, 0xcf],
            &[0x04, 0x35, 0x83, 0x94],
            &[0x16, 0xb6],
            &[0xa8, 0xac, 0x0c],
            &[0xac, 0x08],
        ],
        bech32_hrps: hrps,
    }
}

/// Rebuild the genesis block, pin its hash and check the remaining
/// compiled-in invariants
fn finish(mut params: NetworkParams, genesis: GenesisParams) -> NetworkParams {
    let network = params.id;
    let block = create_koto_genesis_block(
        genesis.time,
        genesis.nonce,
        genesis.bits,
        genesis.version,
        genesis.reward,
    );
    assert_eq!(
        block.header.merkle_root,
        pinned(genesis.merkle_root),
        "{network}: genesis merkle root mismatch"
    );
    assert!(
        verify_genesis_hash(&block, &pinned(genesis.hash)),
        "{network}: genesis hash mismatch, rebuilt block hashes to {}",
        block.hash()
    );

    params.consensus.hash_genesis_block = block.hash();
    params.genesis = block;
    params.checkpoints = params
        .checkpoints
        .with_checkpoint(0, params.consensus.hash_genesis_block);

    params.consensus.assert_pow_limit(network.as_str());
    assert!(
        params.founders_reward_addresses.len() as i64
            <= params.consensus.last_founders_reward_height(0),
        "{network}: more founders' reward addresses than reward blocks"
    );
    params
}

fn placeholder_genesis() -> crate::consensus::Block {
    crate::consensus::Block::new(Default::default(), Vec::new())
}

pub fn main_params() -> NetworkParams {
    let consensus = ConsensusParams {
        hash_genesis_block: Hash::zero(),
        subsidy_slow_start_interval: 43_200,
        pre_blossom_subsidy_halving_interval: PRE_BLOSSOM_HALVING_INTERVAL,
        post_blossom_subsidy_halving_interval: post_blossom_halving_interval(PRE_BLOSSOM_HALVING_INTERVAL),
        founders_reward_percentage: 3,
        founders_reward_tx_percentage: 10,
        majority_enforce_block_upgrade: 750,
        majority_reject_block_outdated: 950,
        majority_window: 4000,
        upgrades: NetworkUpgradeTable::new([
            NetworkUpgrade::new(170_002, AlwaysActive),
            NetworkUpgrade::new(170_002, NoActivation),
            NetworkUpgrade::pinned(
                170_005,
                335_600,
                pinned("019a9db8304e4c97af41388b3406df936340c4b2cf6014b95e34dc7c957e168e"),
            ),
            NetworkUpgrade::pinned(
                170_007,
                556_500,
                pinned("069d7f5b21621d4e9d1072d7e3d417c5603b14be37fcaab5b57e812495635265"),
            ),
            NetworkUpgrade::pinned(
                170_009,
                1_060_000,
                pinned("f4b0a581ed3579131ed969b20db9f165a0b4b6edb4a53c86a53caddb15f9437f"),
            ),
            NetworkUpgrade::pinned(
                170_011,
                1_480_000,
                pinned("87730e5ef75e52c36abd454e22e068842f5d012ec323f51d601f8562353e4993"),
            ),
            NetworkUpgrade::pinned(
                170_013,
                1_530_000,
                pinned("356b8806085d5da6780c7957f11094d884963e8a4cc864b8724d07ada3971975"),
            ),
            NetworkUpgrade::new(170_017, NoActivation),
            NetworkUpgrade::new(0x7fff_ffff, NoActivation),
        ]),
        funding_streams: Default::default(),
        funding_period_length: post_blossom_halving_interval(PRE_BLOSSOM_HALVING_INTERVAL)
            / FUNDING_PERIODS_PER_HALVING,
        coinbase_must_be_shielded: true,
        pow_limit: u256_hex("0007ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff"),
        pow_hash: PowHashParams::default(),
        pow_averaging_window: 17,
        pow_max_adjust_down: 32,
        pow_max_adjust_up: 16,
        pre_blossom_pow_target_spacing: PRE_BLOSSOM_POW_TARGET_SPACING,
        post_blossom_pow_target_spacing: POST_BLOSSOM_POW_TARGET_SPACING,
        pow_allow_min_difficulty_blocks_after_height: None,
        pow_no_retargeting: false,
        future_timestamp_soft_fork_height: None,
        minimum_chain_work: u256_hex("1714e5c11bccf"),
    };

    let params = NetworkParams {
        id: NetworkId::Main,
        currency_units: "KOTO",
        bip44_coin_type: 510,
        consensus,
        keys: KeyConstants {
            network_id: "main",
            base58_prefixes: [
                &[0x18, 0x36],
                &[0x18, 0x3b],
                &[0x80],
                &[0x04, 0x88, 0xb2, 0x1e],
                &[0x04, 0x88, 0xad, 0xe4],
                &[0x16, 0xa8],
                &[0xa8, 0xab, 0xd3],
                &[0xab, 0x36],
            ],
            bech32_hrps: ["koto", "kviews", "kivks", "ksecret-extended-key-main", "kxviews"],
        },
        message_start: [0x4b, 0x6f, 0x74, 0x6f],
        alert_pubkey: hex_bytes("045d763849214a55543e2a88442fdd5c666ac04cf66dcfb6b423b5e45200569de7e9456820cc30dfd7e66e174196a53ac7c64b57ebc6ab033ec1306a9bcbd64aed"),
        default_port: 8433,
        prune_after_height: 100_000,
        genesis: placeholder_genesis(),
        dns_seeds: dns_seeds(NetworkId::Main),
        fixed_seeds: fixed_seeds(NetworkId::Main),
        flags: NetworkFlags {
            mining_requires_peers: true,
            default_consistency_checks: false,
            require_standard: true,
            mine_blocks_on_demand: false,
            testnet_to_be_deprecated_field_rpc: false,
        },
        checkpoints: CheckpointData::new(
            &[
                (77_500, "8ed5cf1de772152f15cb392fd5e686796f77c08386eba922cbe109d4df96381a"),
                (150_000, "31d1e2c5aa0a4ece690cb68912ddce8db49f837919bf141e163135dc95ae2bc4"),
                (200_000, "134c68f3769274f2757fa32795c0cc9aa2fbf18b47ac3670e57652721011d3b4"),
                (300_000, "f1fddcac288c30e451a498bd049c8db9d45663f4e7d7c37c37353d2f317b3634"),
                (400_000, "852027615028ba35a7c7173e69b6e59eff0d60585c30658eb0d2c67ba453e029"),
                (500_000, "f2fdfd332036ec8674ba2d1c1a10f2cf2291f41a068ef12c5cb21bd45f7116ed"),
                (600_000, "322d57bb27260cd770a258f8e43b1e08d548f2c6014fbaa38ef65f7ebd521547"),
                (650_000, "825a9cfc0eea84e7c34e524a7cef5f56b5532fa164f3980390419358b530a2ec"),
                (700_000, "c1774d610daa8dd37e09803c4adea7d621cb05934b46561568ca43e172e72bcb"),
                (750_000, "d9eb625eff0714058efb07be471d5ba4018c995b67e8abc67275bee50c2fe7fe"),
            ],
            1_558_339_235,
            2_639_821,
            5_068.0,
        ),
        sprout_value_pool_checkpoint: Some(SproutValuePoolCheckpoint {
            height: 722_400,
            balance: 603_936_718_320_696,
            block_hash: pinned("aefbc36781564d1a3519b39e211d85b0dd9a53efff9009c9f2a99fbd9268bc5c"),
        }),
        zip209_enabled: true,
        founders_reward_addresses: vec![MAIN_FOUNDERS_REWARD_ADDRESS],
    };

    finish(params, MAIN_GENESIS)
}

pub fn test_params() -> NetworkParams {
    let consensus = ConsensusParams {
        hash_genesis_block: Hash::zero(),
        subsidy_slow_start_interval: 43_200,
        pre_blossom_subsidy_halving_interval: PRE_BLOSSOM_HALVING_INTERVAL,
        post_blossom_subsidy_halving_interval: post_blossom_halving_interval(PRE_BLOSSOM_HALVING_INTERVAL),
        founders_reward_percentage: 3,
        founders_reward_tx_percentage: 10,
        majority_enforce_block_upgrade: 51,
        majority_reject_block_outdated: 75,
        majority_window: 400,
        upgrades: NetworkUpgradeTable::new([
            NetworkUpgrade::new(170_002, AlwaysActive),
            NetworkUpgrade::new(170_002, NoActivation),
            NetworkUpgrade::pinned(
                170_003,
                93_500,
                pinned("8e6684d30b08e6e3474ec2abb66d7b3508d16dbf49e66ce697340995fc455506"),
            ),
            NetworkUpgrade::pinned(
                170_007,
                275_500,
                pinned("64cd1b50b132e95c1981dfe7eca151ffd99356ac970d975d5cd06ea7090aa7bb"),
            ),
            NetworkUpgrade::pinned(
                170_008,
                710_000,
                pinned("8bcf13409aff9a8b484d92b8e0ff26d559c4145ab52afc4283dee6f915ea0869"),
            ),
            NetworkUpgrade::pinned(
                170_010,
                1_050_800,
                pinned("ea626d2eea61873a08a9546e3e8a5d248c079b8114895888c6e2f211d624d5eb"),
            ),
            NetworkUpgrade::pinned(
                170_012,
                1_249_000,
                pinned("9a671dd602556450bfa3f467d1bacee25bd2618a52f102d288dc39fd9601feb3"),
            ),
            NetworkUpgrade::new(170_015, At(1_770_000)),
            NetworkUpgrade::new(0x7fff_ffff, NoActivation),
        ]),
        funding_streams: Default::default(),
        funding_period_length: post_blossom_halving_interval(PRE_BLOSSOM_HALVING_INTERVAL)
            / FUNDING_PERIODS_PER_HALVING,
        coinbase_must_be_shielded: true,
        pow_limit: u256_hex("07ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff"),
        pow_hash: PowHashParams::default(),
        pow_averaging_window: 17,
        pow_max_adjust_down: 32,
        pow_max_adjust_up: 16,
        pre_blossom_pow_target_spacing: PRE_BLOSSOM_POW_TARGET_SPACING,
        post_blossom_pow_target_spacing: POST_BLOSSOM_POW_TARGET_SPACING,
        pow_allow_min_difficulty_blocks_after_height: None,
        pow_no_retargeting: false,
        future_timestamp_soft_fork_height: Some(851_830),
        minimum_chain_work: u256_hex("6dabaf6d0"),
    };

    let params = NetworkParams {
        id: NetworkId::Test,
        currency_units: "TOKO",
        bip44_coin_type: 1,
        consensus,
        keys: testnet_keys(
            "test",
            [
                "ktestsapling",
                "kviewtestsapling",
                "kivktestsapling",
                "ksecret-extended-key-test",
                "kxviewtestsapling",
            ],
        ),
        message_start: [0x54, 0x6f, 0x6b, 0x6f],
        alert_pubkey: hex_bytes("043a6bd19f557ad74d57a5e991fb3d018595e551b1fcfd8ac94479b1642206fded363eb990465afe826a8879d4d9b08942d1ea7c0d52772130b4b91cad28720dc7"),
        default_port: 18433,
        prune_after_height: 1000,
        genesis: placeholder_genesis(),
        dns_seeds: dns_seeds(NetworkId::Test),
        fixed_seeds: fixed_seeds(NetworkId::Test),
        flags: NetworkFlags {
            mining_requires_peers: true,
            default_consistency_checks: false,
            require_standard: true,
            mine_blocks_on_demand: false,
            testnet_to_be_deprecated_field_rpc: true,
        },
        checkpoints: CheckpointData::new(
            &[(85_000, "f1b07e23116246700d5ad5e12a1105f02faa6b9d952fac8da5e2bb299b86372e")],
            1_526_264_849,
            86_482,
            1_465.0,
        ),
        sprout_value_pool_checkpoint: Some(SproutValuePoolCheckpoint {
            height: 478_416,
            balance: 254_952_316_712_485,
            block_hash: pinned("564e2778bed6de32e887109f2aa1d2407db3073cd4f5cbb44398e00b4e458237"),
        }),
        zip209_enabled: true,
        founders_reward_addresses: vec![TEST_FOUNDERS_REWARD_ADDRESS],
    };

    finish(params, TEST_GENESIS)
}

pub fn regtest_params() -> NetworkParams {
    let consensus = ConsensusParams {
        hash_genesis_block: Hash::zero(),
        subsidy_slow_start_interval: 0,
        pre_blossom_subsidy_halving_interval: PRE_BLOSSOM_REGTEST_HALVING_INTERVAL,
        post_blossom_subsidy_halving_interval: post_blossom_halving_interval(
            PRE_BLOSSOM_REGTEST_HALVING_INTERVAL,
        ),
        founders_reward_percentage: 3,
        founders_reward_tx_percentage: 10,
        majority_enforce_block_upgrade: 750,
        majority_reject_block_outdated: 950,
        majority_window: 1000,
        upgrades: NetworkUpgradeTable::new([
            NetworkUpgrade::new(170_002, AlwaysActive),
            NetworkUpgrade::new(170_002, NoActivation),
            NetworkUpgrade::new(170_003, NoActivation),
            NetworkUpgrade::new(170_006, NoActivation),
            NetworkUpgrade::new(170_008, NoActivation),
            NetworkUpgrade::new(170_010, NoActivation),
            NetworkUpgrade::new(170_012, NoActivation),
            NetworkUpgrade::new(170_015, NoActivation),
            NetworkUpgrade::new(0x7fff_ffff, NoActivation),
        ]),
        funding_streams: Default::default(),
        funding_period_length: post_blossom_halving_interval(PRE_BLOSSOM_REGTEST_HALVING_INTERVAL)
            / FUNDING_PERIODS_PER_HALVING,
        coinbase_must_be_shielded: false,
        pow_limit: u256_hex("0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f"),
        pow_hash: PowHashParams::default(),
        pow_averaging_window: 17,
        pow_max_adjust_down: 0,
        pow_max_adjust_up: 0,
        pre_blossom_pow_target_spacing: PRE_BLOSSOM_POW_TARGET_SPACING,
        post_blossom_pow_target_spacing: POST_BLOSSOM_POW_TARGET_SPACING,
        pow_allow_min_difficulty_blocks_after_height: Some(0),
        pow_no_retargeting: true,
        future_timestamp_soft_fork_height: None,
        minimum_chain_work: U256::zero(),
    };

    let params = NetworkParams {
        id: NetworkId::Regtest,
        currency_units: "REG",
        bip44_coin_type: 1,
        consensus,
        keys: testnet_keys(
            "regtest",
            [
                "kregtestsapling",
                "kviewregtestsapling",
                "kivkregtestsapling",
                "ksecret-extended-key-regtest",
                "kxviewregtestsapling",
            ],
        ),
        message_start: [0x52, 0x65, 0x6b, 0x6f],
        alert_pubkey: Vec::new(),
        default_port: 18344,
        prune_after_height: 1000,
        genesis: placeholder_genesis(),
        dns_seeds: dns_seeds(NetworkId::Regtest),
        fixed_seeds: fixed_seeds(NetworkId::Regtest),
        flags: NetworkFlags {
            mining_requires_peers: false,
            default_consistency_checks: true,
            require_standard: false,
            mine_blocks_on_demand: true,
            testnet_to_be_deprecated_field_rpc: false,
        },
        checkpoints: CheckpointData::new(&[], i64::from(REGTEST_GENESIS.time), 0, 0.0),
        sprout_value_pool_checkpoint: None,
        zip209_enabled: false,
        founders_reward_addresses: vec![TEST_FOUNDERS_REWARD_ADDRESS],
    };

    finish(params, REGTEST_GENESIS)
}

fn hex_bytes(hex: &str) -> Vec<u8> {
    hex::decode(hex).unwrap_or_else(|e| panic!("malformed hex constant: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consensus::UpgradeIndex;
    use crate::keys::{decode_destination, Base58Type};

    #[test]
    fn test_genesis_hashes_pinned() {
        for id in NetworkId::ALL {
            let params = params_for(id);
            let expected = genesis_params(id);
            assert_eq!(params.genesis_hash().to_hex(), expected.hash);
            assert_eq!(params.genesis.header.merkle_root.to_hex(), expected.merkle_root);
            assert_eq!(params.checkpoints.checkpoints[&0], params.genesis_hash());
        }
    }

    #[test]
    fn test_main_identity() {
        let params = main_params();
        assert_eq!(params.network_id(), "main");
        assert_eq!(params.currency_units, "KOTO");
        assert_eq!(params.bip44_coin_type, 510);
        assert_eq!(params.default_port, 8433);
        assert_eq!(&params.message_start, b"Koto");
        assert_eq!(params.alert_pubkey.len(), 65);
        assert_eq!(params.keys.base58_prefix(Base58Type::ScriptAddress), &[0x18, 0x3b]);
        assert_eq!(params.checkpoints.last_checkpoint_height(), 750_000);
        assert!(params.consensus.coinbase_must_be_shielded);
        assert!(params.zip209_enabled);
    }

    #[test]
    fn test_main_upgrade_schedule() {
        let upgrades = &main_params().consensus.upgrades;
        assert_eq!(upgrades.upgrade_for_height(335_599), 170_002);
        assert_eq!(upgrades.upgrade_for_height(335_600), 170_005);
        assert_eq!(upgrades.upgrade_for_height(1_530_000), 170_013);
        assert_eq!(upgrades.current_epoch(1_530_000), UpgradeIndex::Canopy);
        assert!(!upgrades.is_active(UpgradeIndex::Nu5, u32::MAX));
        assert!(upgrades.get(UpgradeIndex::Canopy).hash_activation_block.is_some());
    }

    #[test]
    fn test_testnet_identity() {
        let params = test_params();
        assert_eq!(params.currency_units, "TOKO");
        assert_eq!(&params.message_start, b"Toko");
        assert_eq!(params.default_port, 18433);
        assert_eq!(params.dns_seeds.len(), 2);
        assert!(params.consensus.future_timestamp_soft_fork_active(851_830));
        assert!(params.consensus.is_active(UpgradeIndex::Nu5, 1_770_000));
        assert!(params.flags.testnet_to_be_deprecated_field_rpc);
    }

    #[test]
    fn test_regtest_identity() {
        let params = regtest_params();
        assert_eq!(params.currency_units, "REG");
        assert_eq!(&params.message_start, b"Reko");
        assert_eq!(params.default_port, 18344);
        assert!(params.dns_seeds.is_empty());
        assert!(params.flags.mine_blocks_on_demand);
        assert!(!params.consensus.coinbase_must_be_shielded);
        assert!(!params.zip209_enabled);
        assert!(params.consensus.pow_no_retargeting);
        assert_eq!(params.consensus.funding_period_length, 6);
        assert_eq!(params.checkpoints.last_checkpoint_height(), 0);
        assert_eq!(params.checkpoints.time_last_checkpoint, 1_512_879_056);
        for idx in UpgradeIndex::ALL.into_iter().skip(1) {
            assert!(!params.consensus.is_active(idx, u32::MAX), "{idx}");
        }
    }

    #[test]
    fn test_founders_addresses_decode_on_their_network() {
        for id in NetworkId::ALL {
            let params = params_for(id);
            for address in &params.founders_reward_addresses {
                let dest = decode_destination(&params.keys, address).unwrap();
                assert!(dest.is_script(), "{id}: {address}");
            }
        }
    }

    #[test]
    fn test_pow_limits_cover_genesis_bits() {
        for id in NetworkId::ALL {
            let params = params_for(id);
            let bits = params.genesis.header.bits;
            assert!(
                crate::consensus::CompactTarget(bits)
                    .to_checked_target(&params.consensus.pow_limit)
                    .is_ok(),
                "{id}"
            );
        }
    }
}
