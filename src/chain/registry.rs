//! Process-wide network selection
//!
//! A node picks its network once at startup. After that every component
//! reads the same immutable parameter set through [`current_params`].

use std::sync::OnceLock;
use thiserror::Error;
use tracing::{info, warn};

use super::chainparams::params_for;
use super::network::{NetworkId, NetworkParams};
use super::regtest::RegtestOverrides;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("unknown network {0:?}")]
    UnrecognizedNetwork(String),
    #[error("network already selected: {0}")]
    AlreadySelected(NetworkId),
}

/// Command-line switches that only make sense on regtest
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegtestToggles {
    /// Require coinbase outputs to be shielded
    pub shield_coinbase: bool,
    /// Enable ZIP 209 pool-size checks from genesis
    pub zero_pool_sizes: bool,
}

impl RegtestToggles {
    pub fn any(&self) -> bool {
        self.shield_coinbase || self.zero_pool_sizes
    }

    fn apply(self, mut overrides: RegtestOverrides) -> RegtestOverrides {
        if self.shield_coinbase {
            overrides = overrides.set_coinbase_must_be_shielded();
        }
        if self.zero_pool_sizes {
            overrides = overrides.set_zip209_enabled();
        }
        overrides
    }
}

/// Holds at most one selected network
#[derive(Debug, Default)]
pub struct NetworkRegistry {
    selected: OnceLock<NetworkParams>,
}

impl NetworkRegistry {
    pub const fn new() -> Self {
        Self {
            selected: OnceLock::new(),
        }
    }

    /// Build the parameters for `name` without selecting them
    pub fn params(name: &str) -> Result<NetworkParams, RegistryError> {
        let id = NetworkId::from_name(name)
            .ok_or_else(|| RegistryError::UnrecognizedNetwork(name.to_string()))?;
        Ok(params_for(id))
    }

    /// Select a network by name. Regtest toggles are ignored elsewhere.
    pub fn select(&self, name: &str, toggles: RegtestToggles) -> Result<&NetworkParams, RegistryError> {
        if let Some(current) = self.selected.get() {
            return Err(RegistryError::AlreadySelected(current.id));
        }
        let mut params = Self::params(name)?;
        if params.is_regtest() {
            params = toggles.apply(RegtestOverrides::from_params(params)).build();
        } else if toggles.any() {
            warn!(network = %params.id, ?toggles, "regtest-only options ignored");
        }
        self.install(params)
    }

    /// Select a fully built parameter set, such as customised regtest
    pub fn select_params(&self, params: NetworkParams) -> Result<&NetworkParams, RegistryError> {
        if let Some(current) = self.selected.get() {
            return Err(RegistryError::AlreadySelected(current.id));
        }
        self.install(params)
    }

    fn install(&self, params: NetworkParams) -> Result<&NetworkParams, RegistryError> {
        let id = params.id;
        let mut installed = false;
        let stored = self.selected.get_or_init(|| {
            installed = true;
            params
        });
        if !installed {
            return Err(RegistryError::AlreadySelected(stored.id));
        }
        info!(network = %id, genesis = %stored.genesis_hash(), "selected network");
        Ok(stored)
    }

    pub fn current(&self) -> Option<&NetworkParams> {
        self.selected.get()
    }

    /// The selected network. Panics if none has been selected yet.
    pub fn current_params(&self) -> &NetworkParams {
        self.current()
            .expect("no network selected; call select_network first")
    }
}

static REGISTRY: NetworkRegistry = NetworkRegistry::new();

pub fn select_network(name: &str, toggles: RegtestToggles) -> Result<&'static NetworkParams, RegistryError> {
    REGISTRY.select(name, toggles)
}

pub fn select_network_params(params: NetworkParams) -> Result<&'static NetworkParams, RegistryError> {
    REGISTRY.select_params(params)
}

pub fn try_current_params() -> Option<&'static NetworkParams> {
    REGISTRY.current()
}

pub fn current_params() -> &'static NetworkParams {
    REGISTRY.current_params()
}
