//! Genesis block construction
//!
//! The genesis block holds a single coinbase transaction whose scriptSig
//! embeds a timestamp message. Its output can never be spent: it was never
//! added to the UTXO set, and on Koto it carries zero value anyway.

use crate::consensus::{Block, BlockHeader};
use crate::crypto::Hash;
use crate::validation::{Script, Transaction, TxOut};

/// Message embedded in every Koto genesis coinbase
pub const GENESIS_MESSAGE: &str = "Koto:Japanese crypto-currency";

/// Uncompressed public key paid by the genesis output
pub const GENESIS_OUTPUT_PUBKEY: &str = "04678afdb0fe5548271967f1a67130b7105cd6a828e03909a67962e0ea1f61deb649f6bc3f4cef38c4f35504e51ec112de5c384df7ba0b8d578a4c702b6bf11d5f";

/// First scriptSig push, `0x1f07ffff` read as a script number
const GENESIS_SCRIPT_SIG_BITS: i64 = 520_617_983;

/// Header version of all three genesis blocks
pub const GENESIS_VERSION: i32 = 4;

/// Build a genesis block from its timestamp message and output script.
///
/// The header commits to the merkle root of the single coinbase; the
/// previous-block hash is null.
pub fn create_genesis_block(
    message: &str,
    output_script: Script,
    time: u32,
    nonce: u32,
    bits: u32,
    version: i32,
    reward: i64,
) -> Block {
    let script_sig = Script::new()
        .push_int(GENESIS_SCRIPT_SIG_BITS)
        .push_num(4)
        .push_slice(message.as_bytes());

    let coinbase = Transaction::coinbase(
        script_sig,
        vec![TxOut {
            value: reward,
            script_pubkey: output_script,
        }],
    );

    let mut block = Block::new(
        BlockHeader {
            version,
            prev_hash: Hash::zero(),
            merkle_root: Hash::zero(),
            time,
            bits,
            nonce,
            hash_block_commitments: Hash::zero(),
        },
        vec![coinbase],
    );
    block.header.merkle_root = block.build_merkle_tree().0;
    block
}

/// The pay-to-pubkey script of the Koto genesis output
pub fn genesis_output_script() -> Script {
    let pubkey = hex::decode(GENESIS_OUTPUT_PUBKEY)
        .unwrap_or_else(|e| panic!("malformed genesis output pubkey: {e}"));
    Script::p2pk(&pubkey)
}

/// Koto genesis block with the fixed message and output script
pub fn create_koto_genesis_block(time: u32, nonce: u32, bits: u32, version: i32, reward: i64) -> Block {
    create_genesis_block(
        GENESIS_MESSAGE,
        genesis_output_script(),
        time,
        nonce,
        bits,
        version,
        reward,
    )
}

/// Verify genesis block matches expected hash
pub fn verify_genesis_hash(block: &Block, expected_hash: &Hash) -> bool {
    block.hash() == *expected_hash
}
