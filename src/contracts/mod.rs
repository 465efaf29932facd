//! Typed contract handles routed through the chain boundary.

pub mod artifacts;
pub mod bindings;
pub mod deployments;

use crate::chain::{ChainBackend, TxReceipt, TxRequest};
use crate::env::SignerWithAddress;
use crate::error::ChainError;
use alloy::primitives::{Address, U256};
use alloy::sol_types::SolCall;
use bindings::*;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

pub use artifacts::{deploy_code, runtime_init_code, Artifact, ArtifactStore};
pub use deployments::DeploymentStore;

/// Handle to a deployed contract speaking interface `I`.
///
/// `I` is the `sol!` call enum of the interface; it tags the handle so a token
/// handle and a controller handle are distinct types.
pub struct Contract<I> {
    address: Address,
    from: Address,
    chain: Arc<dyn ChainBackend>,
    _interface: PhantomData<fn() -> I>,
}

impl<I> Clone for Contract<I> {
    fn clone(&self) -> Self {
        Self {
            address: self.address,
            from: self.from,
            chain: Arc::clone(&self.chain),
            _interface: PhantomData,
        }
    }
}

impl<I> fmt::Debug for Contract<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Contract")
            .field("address", &self.address)
            .field("from", &self.from)
            .field("chain", &self.chain.label())
            .finish()
    }
}

impl<I> Contract<I> {
    pub fn at(address: Address, chain: Arc<dyn ChainBackend>, from: Address) -> Self {
        Self {
            address,
            from,
            chain,
            _interface: PhantomData,
        }
    }

    /// Same contract, transactions sent by `signer`.
    pub fn connect(&self, signer: &SignerWithAddress) -> Self {
        Self {
            from: signer.address,
            ..self.clone()
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn sender(&self) -> Address {
        self.from
    }

    pub fn chain(&self) -> &Arc<dyn ChainBackend> {
        &self.chain
    }

    /// `eth_call` the function and decode its return values.
    pub async fn read<C>(&self, call: C) -> Result<C::Return, ChainError>
    where
        C: SolCall,
    {
        let tx = TxRequest::call(self.from, self.address, call.abi_encode());
        let output = self.chain.call(&tx).await?;
        C::abi_decode_returns(&output, true)
            .map_err(|err| ChainError::decode(format!("{} return", C::SIGNATURE), err))
    }

    pub async fn send<C>(&self, call: C) -> Result<TxReceipt, ChainError>
    where
        C: SolCall,
    {
        self.send_with_value(call, U256::ZERO).await
    }

    pub async fn send_with_value<C>(&self, call: C, value: U256) -> Result<TxReceipt, ChainError>
    where
        C: SolCall,
    {
        let tx = TxRequest::call(self.from, self.address, call.abi_encode()).with_value(value);
        tracing::trace!(
            contract = %self.address,
            from = %self.from,
            function = C::SIGNATURE,
            "sending transaction"
        );
        self.chain.send(&tx).await
    }
}

pub type PoolDataProvider = Contract<IPoolDataProvider::IPoolDataProviderCalls>;
pub type Pool = Contract<IPool::IPoolCalls>;
pub type PoolConfigurator = Contract<IPoolConfigurator::IPoolConfiguratorCalls>;
pub type PoolAddressesProvider = Contract<IPoolAddressesProvider::IPoolAddressesProviderCalls>;
pub type PoolAddressesProviderRegistry =
    Contract<IPoolAddressesProviderRegistry::IPoolAddressesProviderRegistryCalls>;
pub type HopeOracle = Contract<IHopeOracle::IHopeOracleCalls>;
pub type WrappedTokenGateway = Contract<IWrappedTokenGateway::IWrappedTokenGatewayCalls>;
pub type MintableERC20 = Contract<IMintableERC20::IMintableERC20Calls>;
pub type WETH9Mocked = Contract<IWETH9Mocked::IWETH9MockedCalls>;
pub type HToken = Contract<IHToken::IHTokenCalls>;
pub type StableDebtToken = Contract<IStableDebtToken::IStableDebtTokenCalls>;
pub type VariableDebtToken = Contract<IVariableDebtToken::IVariableDebtTokenCalls>;
pub type EmissionManager = Contract<IEmissionManager::IEmissionManagerCalls>;
pub type RewardsController = Contract<IRewardsController::IRewardsControllerCalls>;
pub type HTokenMock = Contract<IHTokenMock::IHTokenMockCalls>;
pub type MockAggregator = Contract<IMockAggregator::IMockAggregatorCalls>;
