//! Property-based and adversarial tests for Koto consensus primitives
//!
//! These tests verify invariants hold under random inputs and attack scenarios.

use primitive_types::U256;
use proptest::prelude::*;
use std::sync::OnceLock;

use koto_core::chain::{main_params, regtest_params, NetworkParams};
use koto_core::consensus::{
    check_proof_of_work, hash_to_uint, BlockHeader, CompactTarget, COMMITMENTS_VERSION, HEADER_SIZE,
};
use koto_core::crypto::{build_merkle_tree, check_merkle_branch, merkle_branch, sha256d, Hash};
use koto_core::serialization::CodecError;

fn main_network() -> &'static NetworkParams {
    static PARAMS: OnceLock<NetworkParams> = OnceLock::new();
    PARAMS.get_or_init(main_params)
}

fn hashes(max: usize) -> impl Strategy<Value = Vec<Hash>> {
    prop::collection::vec(any::<[u8; 32]>().prop_map(Hash), 1..max)
}

fn hash_of(value: U256) -> Hash {
    let mut bytes = [0u8; 32];
    value.to_little_endian(&mut bytes);
    Hash(bytes)
}

// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================

proptest! {
    /// Every leaf's branch reconstructs the tree root
    #[test]
    fn prop_merkle_branch_reconstructs_root(leaves in hashes(40)) {
        let (root, _) = build_merkle_tree(&leaves);
        for (index, leaf) in leaves.iter().enumerate() {
            let branch = merkle_branch(&leaves, index).unwrap();
            prop_assert_eq!(check_merkle_branch(*leaf, &branch, index), root);
        }
        prop_assert!(merkle_branch(&leaves, leaves.len()).is_none());
    }

    /// Identical leaf lists always give identical roots
    #[test]
    fn prop_merkle_root_deterministic(leaves in hashes(40)) {
        prop_assert_eq!(build_merkle_tree(&leaves), build_merkle_tree(&leaves.clone()));
    }

    /// Appending a copy of the last leaf to an odd list flags the tree as
    /// mutated. Past a single leaf the root is unchanged too.
    #[test]
    fn prop_duplicated_tail_is_mutated(leaves in hashes(40)) {
        prop_assume!(leaves.len() % 2 == 1);
        let (root, _) = build_merkle_tree(&leaves);

        let mut attack = leaves.clone();
        attack.push(*leaves.last().unwrap());
        let (attack_root, attack_mutated) = build_merkle_tree(&attack);
        prop_assert!(attack_mutated);
        if leaves.len() > 1 {
            prop_assert_eq!(attack_root, root);
        }
    }

    /// Protocol version never decreases with height
    #[test]
    fn prop_upgrade_for_height_monotonic(h1 in 0u32..2_000_000, delta in 0u32..2_000_000) {
        let upgrades = &main_network().consensus.upgrades;
        let h2 = h1 + delta;
        prop_assert!(upgrades.upgrade_for_height(h1) <= upgrades.upgrade_for_height(h2));
    }

    /// A hash passes exactly when it does not exceed the decoded target
    #[test]
    fn prop_check_proof_of_work_compares_target(
        bytes in any::<[u8; 32]>(),
        exponent in 4u32..=0x1f,
        mantissa in 0x0000_8000u32..=0x007f_ffff,
    ) {
        let bits = (exponent << 24) | mantissa;
        let target = CompactTarget(bits).to_target().unwrap();
        let hash = Hash(bytes);
        prop_assert_eq!(
            check_proof_of_work(&hash, bits, &U256::MAX),
            hash_to_uint(&hash) <= target
        );

        prop_assert!(check_proof_of_work(&hash_of(target), bits, &U256::MAX));
        prop_assert!(!check_proof_of_work(&hash_of(target + 1), bits, &U256::MAX));
        // A limit below the target rejects even the easiest hash
        prop_assert!(!check_proof_of_work(&Hash::zero(), bits, &(target - 1)));
    }

    /// Headers re-encode byte-for-byte, with or without commitments
    #[test]
    fn prop_header_round_trip(
        version in 1i32..10,
        prev in any::<[u8; 32]>(),
        merkle in any::<[u8; 32]>(),
        time in any::<u32>(),
        bits in any::<u32>(),
        nonce in any::<u32>(),
        commitments in any::<[u8; 32]>(),
    ) {
        let with_commitments = version >= COMMITMENTS_VERSION;
        let header = BlockHeader {
            version,
            prev_hash: Hash(prev),
            merkle_root: Hash(merkle),
            time,
            bits,
            nonce,
            hash_block_commitments: if with_commitments { Hash(commitments) } else { Hash::zero() },
        };
        let bytes = header.encode();
        prop_assert_eq!(bytes.len(), if with_commitments { HEADER_SIZE } else { HEADER_SIZE - 32 });

        let decoded = BlockHeader::decode(&bytes).unwrap();
        prop_assert_eq!(decoded, header);
        prop_assert_eq!(decoded.encode(), bytes);
        prop_assert_eq!(decoded.hash(), header.hash());
    }

    /// Founders' reward scripts are always `HASH160 <20 bytes> EQUAL`
    #[test]
    fn prop_founders_script_shape(height in 1u32..1_000_000) {
        let params = main_network();
        prop_assume!(i64::from(height) <= params.consensus.last_founders_reward_height(height));
        let script = params.founders_reward_script_at_height(height);
        prop_assert_eq!(script.len(), 23);
        prop_assert!(script.is_p2sh());
    }
}

// ============================================================================
// ADVERSARIAL TESTS
// ============================================================================

/// Test: Duplicate transaction attack
///
/// An attacker repeats the last transactions of a block so the merkle root
/// is unchanged; the mutation flag must expose it.
#[test]
fn test_duplicate_transaction_attack_detected() {
    let leaves: Vec<Hash> = (0u8..6).map(|i| sha256d(&[i])).collect();
    let (root, mutated) = build_merkle_tree(&leaves);
    assert!(!mutated);

    let mut attack = leaves.clone();
    attack.extend_from_slice(&leaves[4..6]);
    let (attack_root, attack_mutated) = build_merkle_tree(&attack);
    assert_eq!(attack_root, root);
    assert!(attack_mutated);
}

/// Test: Truncated commitments
///
/// A version 5 header cut off after the nonce is rejected, not padded.
#[test]
fn test_header_missing_commitments_rejected() {
    let header = BlockHeader {
        bits: 0x1f07ffff,
        ..BlockHeader::default()
    };
    let bytes = header.encode();
    let err = BlockHeader::decode(&bytes[..HEADER_SIZE - 32]).unwrap_err();
    assert_eq!(err, CodecError::MissingBlockCommitments { version: 5 });
}

/// Test: Trailing garbage after a header
#[test]
fn test_header_trailing_bytes_rejected() {
    let mut bytes = BlockHeader::default().encode();
    bytes.push(0);
    assert_eq!(
        BlockHeader::decode(&bytes).unwrap_err(),
        CodecError::TrailingBytes(1)
    );
}

/// Test: Targets easier than the network limit
///
/// A block claiming the regtest difficulty on main must fail even with a
/// zero hash.
#[test]
fn test_easy_bits_rejected_on_main() {
    let regtest_bits = regtest_params().genesis_block().header.bits;
    let main = main_network();
    assert!(!check_proof_of_work(&Hash::zero(), regtest_bits, &main.consensus.pow_limit));
    assert!(check_proof_of_work(
        &Hash::zero(),
        main.genesis_block().header.bits,
        &main.consensus.pow_limit
    ));
}

/// Test: Malformed compact targets
#[test]
fn test_malformed_bits_never_pass() {
    for bits in [0u32, 0x0480_0001, 0x2300_ffff, 0xff7f_ffff] {
        assert!(!check_proof_of_work(&Hash::zero(), bits, &U256::MAX), "bits {bits:#x}");
    }
}
