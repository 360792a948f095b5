//! Founders' reward destinations
//!
//! Until the first halving a share of every block subsidy goes to a fixed
//! P2SH address. The address list is compiled in per network; only the first
//! entry is ever paid, whatever the height.

use crate::chain::NetworkParams;
use crate::keys::{decode_destination, Destination};
use crate::validation::Script;

impl NetworkParams {
    fn assert_founders_reward_height(&self, height: u32) {
        let last = self.consensus.last_founders_reward_height(height);
        assert!(
            height > 0 && i64::from(height) <= last,
            "{}: height {height} outside founders' reward range 1..={last}",
            self.id
        );
    }

    /// Address paid the founders' reward at `height`.
    ///
    /// Panics unless `0 < height <= last_founders_reward_height(height)`.
    pub fn founders_reward_address_at_height(&self, height: u32) -> &'static str {
        self.assert_founders_reward_height(height);
        self.founders_reward_address_at_index(0)
    }

    /// Output script paying the founders' reward at `height`
    pub fn founders_reward_script_at_height(&self, height: u32) -> Script {
        let address = self.founders_reward_address_at_height(height);
        match decode_destination(&self.keys, address) {
            Ok(Destination::ScriptHash(hash)) => Script::p2sh(&hash),
            Ok(other) => panic!("{}: founders' reward address {address} is not P2SH: {other:?}", self.id),
            Err(e) => panic!("{}: founders' reward address {address} is invalid: {e}", self.id),
        }
    }

    pub fn founders_reward_address_at_index(&self, index: usize) -> &'static str {
        let addresses = &self.founders_reward_addresses;
        assert!(
            index < addresses.len(),
            "{}: founders' reward index {index} out of range ({} addresses)",
            self.id,
            addresses.len()
        );
        addresses[index]
    }
}
