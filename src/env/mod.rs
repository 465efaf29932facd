//! The test environment every suite reads.
//!
//! A [`TestEnv`] is built once by [`bootstrap::initialize`] and then passed by
//! reference into every test group.

pub mod address_book;
pub mod bootstrap;
pub mod rewards;

use crate::chain::ChainBackend;
use crate::contracts::deployments::INCENTIVES_PROXY_ID;
use crate::contracts::{
    ArtifactStore, DeploymentStore, HToken, HopeOracle, MintableERC20, Pool,
    PoolAddressesProvider, PoolAddressesProviderRegistry, PoolConfigurator, PoolDataProvider,
    StableDebtToken, VariableDebtToken, WETH9Mocked, WrappedTokenGateway,
};
use crate::error::{ChainError, SetupError};
use alloy::primitives::{Address, U256};
use std::sync::Arc;

pub use address_book::AddressBook;
pub use bootstrap::{initialize, initialize_or_exit, BootstrapConfig};
pub use rewards::RewardsEnv;

/// How transactions from a signer get accepted by the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignerKind {
    /// The node holds the key (`eth_accounts`).
    Unlocked,
    /// The node was told to accept unsigned transactions from the address.
    Impersonated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignerWithAddress {
    pub address: Address,
    pub kind: SignerKind,
}

impl SignerWithAddress {
    pub fn unlocked(address: Address) -> Self {
        Self {
            address,
            kind: SignerKind::Unlocked,
        }
    }

    /// Impersonate `address` on the node and optionally fund it.
    pub async fn impersonate(
        chain: &dyn ChainBackend,
        address: Address,
        funding: Option<U256>,
    ) -> Result<Self, ChainError> {
        chain.impersonate(address).await?;
        if let Some(amount) = funding {
            chain.set_balance(address, amount).await?;
        }
        tracing::debug!(%address, funded = funding.is_some(), "impersonating account");
        Ok(Self {
            address,
            kind: SignerKind::Impersonated,
        })
    }
}

/// Signers reserved for admin roles; users start after them.
pub const ROLE_SIGNERS: usize = 3;
/// Cases address `users[0]` and `users[1]`.
pub const MIN_USERS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roles {
    pub deployer: SignerWithAddress,
    pub pool_admin: SignerWithAddress,
    pub emergency_admin: SignerWithAddress,
    pub risk_admin: SignerWithAddress,
    pub users: Vec<SignerWithAddress>,
}

impl Roles {
    /// First signer deploys and administers the pool, second is emergency
    /// admin, third is risk admin, the rest are users.
    pub fn assign(accounts: &[Address]) -> Result<Self, SetupError> {
        let required = ROLE_SIGNERS + MIN_USERS;
        if accounts.len() < required {
            return Err(SetupError::NotEnoughSigners {
                required,
                available: accounts.len(),
            });
        }
        let deployer = SignerWithAddress::unlocked(accounts[0]);
        Ok(Self {
            deployer,
            pool_admin: deployer,
            emergency_admin: SignerWithAddress::unlocked(accounts[1]),
            risk_admin: SignerWithAddress::unlocked(accounts[2]),
            users: accounts[ROLE_SIGNERS..]
                .iter()
                .copied()
                .map(SignerWithAddress::unlocked)
                .collect(),
        })
    }
}

/// Everything a test case may touch, resolved before the first case runs.
#[derive(Debug)]
pub struct TestEnv {
    pub chain: Arc<dyn ChainBackend>,
    pub deployer: SignerWithAddress,
    pub pool_admin: SignerWithAddress,
    pub emergency_admin: SignerWithAddress,
    pub risk_admin: SignerWithAddress,
    pub users: Vec<SignerWithAddress>,

    pub pool: Pool,
    pub configurator: PoolConfigurator,
    pub addresses_provider: PoolAddressesProvider,
    pub registry: PoolAddressesProviderRegistry,
    pub oracle: HopeOracle,
    pub helpers_contract: PoolDataProvider,
    pub wrapped_token_gateway: WrappedTokenGateway,

    pub dai: MintableERC20,
    pub usdc: MintableERC20,
    pub hope: MintableERC20,
    pub weth: WETH9Mocked,
    pub h_dai: HToken,
    pub h_usdc: HToken,
    pub h_weth: HToken,
    pub stable_debt_dai: StableDebtToken,
    pub variable_debt_dai: VariableDebtToken,

    pub address_book: AddressBook,
    /// `EXTRA` reward token and its price aggregator, when artifacts were available.
    pub extra_reward_token: Option<Address>,
    pub extra_price_aggregator: Option<Address>,
    pub rewards: Option<RewardsEnv>,

    pub deployments: DeploymentStore,
    pub artifacts: Option<ArtifactStore>,
}

impl TestEnv {
    /// Rewards part of the environment. Fails when the deployment has no
    /// incentives subsystem.
    pub fn rewards(&self) -> Result<&RewardsEnv, SetupError> {
        self.rewards
            .as_ref()
            .ok_or_else(|| SetupError::MissingDeployment(INCENTIVES_PROXY_ID.to_string()))
    }

    pub fn user(&self, index: usize) -> Result<&SignerWithAddress, SetupError> {
        self.users.get(index).ok_or(SetupError::NotEnoughSigners {
            required: ROLE_SIGNERS + index + 1,
            available: ROLE_SIGNERS + self.users.len(),
        })
    }
}
