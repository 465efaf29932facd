use crate::error::{Result, SetupError};
use alloy::primitives::Address;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

pub const POOL_PROXY_ID: &str = "Pool-Proxy";
pub const POOL_CONFIGURATOR_PROXY_ID: &str = "PoolConfigurator-Proxy";
pub const POOL_ADDRESSES_PROVIDER_ID: &str = "PoolAddressesProvider";
pub const POOL_ADDRESSES_PROVIDER_REGISTRY_ID: &str = "PoolAddressesProviderRegistry";
pub const ORACLE_ID: &str = "HopeOracle";
pub const POOL_DATA_PROVIDER_ID: &str = "PoolDataProvider";
pub const WRAPPED_TOKEN_GATEWAY_ID: &str = "WrappedTokenGateway";
pub const INCENTIVES_PROXY_ID: &str = "IncentivesProxy";
pub const EMISSION_MANAGER_ID: &str = "EmissionManager";

pub const DEFAULT_MARKET_NAME: &str = "HopeLend";

/// `-TestnetMintableERC20-Reward-<market>`, appended to a reward symbol.
pub fn testnet_reward_token_prefix(market: &str) -> String {
    format!("-TestnetMintableERC20-Reward-{market}")
}

/// `-TestnetPriceAggregator-<market>`, appended to an asset symbol.
pub fn testnet_price_aggregator_prefix(market: &str) -> String {
    format!("-TestnetPriceAggregator-{market}")
}

pub fn htoken_mock_id(slug: &str) -> String {
    format!("{slug}-HTokenMock")
}

#[derive(Debug, Deserialize)]
struct DeploymentRecord {
    address: Address,
}

/// hardhat-deploy records of one network, deployment name -> address.
#[derive(Debug, Clone, Default)]
pub struct DeploymentStore {
    addresses: BTreeMap<String, Address>,
}

impl DeploymentStore {
    /// Read every `*.json` record in `dir` (typically `deployments/<network>`).
    pub fn open(dir: &Path) -> Result<Self> {
        let entries = std::fs::read_dir(dir).map_err(|err| {
            SetupError::MissingDeployment(format!("{}: {err}", dir.display()))
        })?;
        let mut store = Self::default();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() || path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let raw = std::fs::read_to_string(&path).map_err(|err| SetupError::InvalidArtifact {
                name: name.to_string(),
                reason: format!("unreadable deployment record: {err}"),
            })?;
            let record: DeploymentRecord =
                serde_json::from_str(&raw).map_err(|err| SetupError::InvalidArtifact {
                    name: name.to_string(),
                    reason: format!("malformed deployment record: {err}"),
                })?;
            store.addresses.insert(name.to_string(), record.address);
        }
        tracing::debug!(
            dir = %dir.display(),
            deployments = store.addresses.len(),
            "deployment store loaded"
        );
        Ok(store)
    }

    pub fn from_entries<'a>(entries: impl IntoIterator<Item = (&'a str, Address)>) -> Self {
        Self {
            addresses: entries
                .into_iter()
                .map(|(name, address)| (name.to_string(), address))
                .collect(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.addresses.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<Address> {
        self.addresses.get(name).copied()
    }

    pub fn address(&self, name: &str) -> std::result::Result<Address, SetupError> {
        self.get(name)
            .ok_or_else(|| SetupError::MissingDeployment(name.to_string()))
    }

    /// Record a deployment made during bootstrap.
    pub fn insert(&mut self, name: impl Into<String>, address: Address) {
        self.addresses.insert(name.into(), address);
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}
