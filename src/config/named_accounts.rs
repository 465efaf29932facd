use crate::error::SetupError;
use alloy::primitives::Address;
use std::collections::BTreeMap;

pub const DEPLOYER: &str = "deployer";
pub const ACL_ADMIN: &str = "aclAdmin";
pub const EMERGENCY_ADMIN: &str = "emergencyAdmin";
pub const POOL_ADMIN: &str = "poolAdmin";
pub const ADDRESSES_PROVIDER_REGISTRY_OWNER: &str = "addressesProviderRegistryOwner";
pub const TREASURY_PROXY_ADMIN: &str = "treasuryProxyAdmin";
pub const INCENTIVES_PROXY_ADMIN: &str = "incentivesProxyAdmin";
pub const INCENTIVES_EMISSION_MANAGER: &str = "incentivesEmissionManager";
pub const INCENTIVES_REWARDS_VAULT: &str = "incentivesRewardsVault";

/// Logical role name -> signer index, as the deployment scripts see it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedAccounts {
    indices: BTreeMap<String, usize>,
}

impl Default for NamedAccounts {
    fn default() -> Self {
        let indices = [
            (DEPLOYER, 0),
            (ACL_ADMIN, 0),
            (EMERGENCY_ADMIN, 0),
            (POOL_ADMIN, 0),
            (ADDRESSES_PROVIDER_REGISTRY_OWNER, 0),
            (TREASURY_PROXY_ADMIN, 1),
            (INCENTIVES_PROXY_ADMIN, 1),
            (INCENTIVES_EMISSION_MANAGER, 0),
            (INCENTIVES_REWARDS_VAULT, 2),
        ]
        .into_iter()
        .map(|(name, index)| (name.to_string(), index))
        .collect();
        Self { indices }
    }
}

impl NamedAccounts {
    pub fn with_override(mut self, name: &str, index: usize) -> Self {
        self.indices.insert(name.to_string(), index);
        self
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.indices.get(name).copied()
    }

    /// Resolve a role against the node's signer list.
    pub fn resolve(&self, name: &str, signers: &[Address]) -> Result<Address, SetupError> {
        let index = self
            .index_of(name)
            .ok_or_else(|| SetupError::UnknownNamedAccount(name.to_string()))?;
        signers
            .get(index)
            .copied()
            .ok_or_else(|| SetupError::NamedAccountOutOfRange {
                name: name.to_string(),
                index,
                available: signers.len(),
            })
    }
}
