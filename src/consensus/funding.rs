//! ZIP 207 funding streams
//!
//! A funding stream pays a fixed share of the block subsidy to a recipient
//! over a height range. The range is cut into funding periods and each
//! period pays to its own address.

use thiserror::Error;

use super::params::ConsensusParams;
use super::upgrades::UpgradeIndex;
use crate::keys::{decode_destination, AddressError, KeyConstants};
use crate::validation::Script;

pub const MAX_FUNDING_STREAMS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FundingStreamIndex {
    Zip214Bp = 0,
    Zip214Zf,
    Zip214Mg,
}

impl FundingStreamIndex {
    pub fn info(self) -> &'static FundingStreamInfo {
        &FUNDING_STREAM_INFO[self as usize]
    }
}

/// Recipient and subsidy share of a stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FundingStreamInfo {
    pub recipient: &'static str,
    pub zip_url: &'static str,
    pub value_numerator: u64,
    pub value_denominator: u64,
}

pub const FUNDING_STREAM_INFO: [FundingStreamInfo; MAX_FUNDING_STREAMS] = [
    FundingStreamInfo {
        recipient: "Electric Coin Company",
        zip_url: "https://zips.z.cash/zip-0214",
        value_numerator: 7,
        value_denominator: 100,
    },
    FundingStreamInfo {
        recipient: "Zcash Foundation",
        zip_url: "https://zips.z.cash/zip-0214",
        value_numerator: 5,
        value_denominator: 100,
    },
    FundingStreamInfo {
        recipient: "Major Grants",
        zip_url: "https://zips.z.cash/zip-0214",
        value_numerator: 8,
        value_denominator: 100,
    },
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FundingStreamError {
    #[error("funding stream start height {0} is before Canopy activation")]
    CanopyNotActive(u32),
    #[error("funding stream end height {end} precedes start height {start}")]
    IllegalRange { start: u32, end: u32 },
    #[error("funding stream needs {needed} addresses but has {available}")]
    InsufficientAddresses { needed: usize, available: usize },
    #[error("invalid funding stream address {address}: {source}")]
    InvalidAddress {
        address: String,
        #[source]
        source: AddressError,
    },
}

/// A validated funding stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FundingStream {
    start_height: u32,
    end_height: u32,
    recipients: Vec<Script>,
}

impl FundingStream {
    /// Validate a stream against the schedule in `params`
    pub fn validate(
        params: &ConsensusParams,
        start_height: u32,
        end_height: u32,
        recipients: Vec<Script>,
    ) -> Result<Self, FundingStreamError> {
        if !params.is_active(UpgradeIndex::Canopy, start_height) {
            return Err(FundingStreamError::CanopyNotActive(start_height));
        }
        if end_height < start_height {
            return Err(FundingStreamError::IllegalRange {
                start: start_height,
                end: end_height,
            });
        }
        // The end height is exclusive; an empty range touches no period
        if end_height > start_height {
            let last_period = params.funding_period_index(start_height, end_height - 1) as usize;
            if last_period >= recipients.len() {
                return Err(FundingStreamError::InsufficientAddresses {
                    needed: last_period + 1,
                    available: recipients.len(),
                });
            }
        }
        Ok(Self {
            start_height,
            end_height,
            recipients,
        })
    }

    /// Decode transparent addresses and validate the resulting stream
    pub fn parse(
        params: &ConsensusParams,
        keys: &KeyConstants,
        start_height: u32,
        end_height: u32,
        addresses: &[&str],
    ) -> Result<Self, FundingStreamError> {
        let recipients = addresses
            .iter()
            .map(|address| {
                decode_destination(keys, address)
                    .map(|dest| dest.script_pubkey())
                    .map_err(|source| FundingStreamError::InvalidAddress {
                        address: address.to_string(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::validate(params, start_height, end_height, recipients)
    }

    pub fn start_height(&self) -> u32 {
        self.start_height
    }

    pub fn end_height(&self) -> u32 {
        self.end_height
    }

    pub fn recipients(&self) -> &[Script] {
        &self.recipients
    }

    pub fn is_active_at(&self, height: u32) -> bool {
        self.start_height <= height && height < self.end_height
    }

    /// Output script that receives this stream's share at `height`
    pub fn recipient(&self, params: &ConsensusParams, height: u32) -> Option<&Script> {
        if !self.is_active_at(height) {
            return None;
        }
        let index = params.funding_period_index(self.start_height, height) as usize;
        self.recipients.get(index)
    }
}

impl ConsensusParams {
    /// Parse and install a ZIP 207 funding stream
    pub fn add_zip207_funding_stream(
        &mut self,
        keys: &KeyConstants,
        idx: FundingStreamIndex,
        start_height: u32,
        end_height: u32,
        addresses: &[&str],
    ) -> Result<(), FundingStreamError> {
        let stream = FundingStream::parse(self, keys, start_height, end_height, addresses)?;
        self.funding_streams[idx as usize] = Some(stream);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consensus::params::tests::params_with_blossom;
    use crate::consensus::upgrades::ActivationHeight;

    fn canopy_params() -> ConsensusParams {
        let mut params = params_with_blossom(ActivationHeight::At(1_000));
        params
            .upgrades
            .set_activation_height(UpgradeIndex::Canopy, ActivationHeight::At(2_000));
        params
    }

    fn scripts(n: usize) -> Vec<Script> {
        (0..n).map(|i| Script::p2sh(&[i as u8; 20])).collect()
    }

    #[test]
    fn test_canopy_required() {
        let params = canopy_params();
        assert_eq!(
            FundingStream::validate(&params, 1_999, 3_000, scripts(1)),
            Err(FundingStreamError::CanopyNotActive(1_999))
        );
    }

    #[test]
    fn test_illegal_range() {
        let params = canopy_params();
        assert_eq!(
            FundingStream::validate(&params, 3_000, 2_500, scripts(1)),
            Err(FundingStreamError::IllegalRange { start: 3_000, end: 2_500 })
        );
    }

    #[test]
    fn test_insufficient_addresses() {
        let params = canopy_params();
        let len = params.funding_period_length;
        let start = 2_000;
        let end = start + 3 * len;
        let needed = params.funding_period_index(start, end - 1) as usize + 1;
        assert!(FundingStream::validate(&params, start, end, scripts(needed)).is_ok());
        assert_eq!(
            FundingStream::validate(&params, start, end, scripts(needed - 1)),
            Err(FundingStreamError::InsufficientAddresses {
                needed,
                available: needed - 1
            })
        );
    }

    #[test]
    fn test_recipient_rotates_per_period() {
        let params = canopy_params();
        let start = 2_000;
        let end = start + 4 * params.funding_period_length;
        let stream = FundingStream::validate(&params, start, end, scripts(5)).unwrap();

        assert_eq!(stream.recipient(&params, start), Some(&scripts(1)[0]));
        assert_eq!(stream.recipient(&params, start - 1), None);
        assert_eq!(stream.recipient(&params, end), None);

        let period = params.funding_period_index(start, end - 1) as usize;
        assert_eq!(stream.recipient(&params, end - 1), Some(&scripts(5)[period]));
    }

    #[test]
    fn test_invalid_address_reported() {
        let mut params = canopy_params();
        let keys = KeyConstants {
            network_id: "regtest",
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
            bech32_hrps: ["a", "b", "c", "d", "e"],
        };

        let err = params
            .add_zip207_funding_stream(&keys, FundingStreamIndex::Zip214Zf, 2_000, 2_100, &["nope"])
            .unwrap_err();
        assert!(matches!(err, FundingStreamError::InvalidAddress { .. }));

        params
            .add_zip207_funding_stream(
                &keys,
                FundingStreamIndex::Zip214Zf,
                2_000,
                2_100,
                &["k2A4ArX2YAQJ6Qiut7tNNWUhq3Np7Et525K"],
            )
            .unwrap();
        let stream = params.funding_stream(FundingStreamIndex::Zip214Zf).unwrap();
        assert!(stream.recipients()[0].is_p2sh());
        assert_eq!(FundingStreamIndex::Zip214Mg.info().value_numerator, 8);
    }
}
