//! Environment bootstrap: resolve every deployed contract, assign signer roles
//! and prepare the auxiliary mocks the incentive suites rely on.

use crate::chain::{ChainBackend, RpcChain};
use crate::config::named_accounts::NamedAccounts;
use crate::contracts::bindings::{IMintableERC20, IPoolDataProvider, IWETH9Mocked};
use crate::contracts::deployments::{
    testnet_price_aggregator_prefix, testnet_reward_token_prefix, DEFAULT_MARKET_NAME,
    EMISSION_MANAGER_ID, INCENTIVES_PROXY_ID, ORACLE_ID, POOL_ADDRESSES_PROVIDER_ID,
    POOL_ADDRESSES_PROVIDER_REGISTRY_ID, POOL_CONFIGURATOR_PROXY_ID, POOL_DATA_PROVIDER_ID,
    POOL_PROXY_ID, WRAPPED_TOKEN_GATEWAY_ID,
};
use crate::contracts::{
    ArtifactStore, DeploymentStore, HToken, HopeOracle, MintableERC20, Pool,
    PoolAddressesProvider, PoolAddressesProviderRegistry, PoolConfigurator, PoolDataProvider,
    StableDebtToken, VariableDebtToken, WETH9Mocked, WrappedTokenGateway,
};
use crate::env::address_book::AddressBook;
use crate::env::rewards;
use crate::env::{Roles, TestEnv};
use crate::error::{ChainError, ConfigError, Result, SetupError, TokenClass};
use crate::utils::config::HarnessConfig;
use alloy::primitives::{Address, I256, U256};
use alloy::sol_types::SolValue;
use std::sync::Arc;

const EXTRA_SYMBOL: &str = "EXTRA";
const MOCK_DECIMALS: u8 = 18;
/// Answer of the `EXTRA` price aggregator, 2e18.
const EXTRA_AGGREGATOR_ANSWER: u128 = 2_000_000_000_000_000_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrappedSymbols {
    pub dai: String,
    pub usdc: String,
    pub weth: String,
}

impl Default for WrappedSymbols {
    fn default() -> Self {
        Self {
            dai: "hTestDAI".to_string(),
            usdc: "hTestUSDC".to_string(),
            weth: "hTestWETH".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReserveSymbols {
    pub dai: String,
    pub usdc: String,
    pub hope: String,
    pub weth: String,
}

impl Default for ReserveSymbols {
    fn default() -> Self {
        Self {
            dai: "DAI".to_string(),
            usdc: "USDC".to_string(),
            hope: "HOPE".to_string(),
            weth: "WETH".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    pub wrapped: WrappedSymbols,
    pub reserves: ReserveSymbols,
    /// Market suffix of testnet deployment ids.
    pub market_name: String,
    pub named_accounts: NamedAccounts,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            wrapped: WrappedSymbols::default(),
            reserves: ReserveSymbols::default(),
            market_name: DEFAULT_MARKET_NAME.to_string(),
            named_accounts: NamedAccounts::default(),
        }
    }
}

pub(crate) fn step(name: &'static str) -> impl Fn(ChainError) -> SetupError {
    move |source| SetupError::Step { step: name, source }
}

/// Reuse deployment `id` when it exists, else deploy `contract` from the
/// artifacts and record it under `id`.
pub(crate) async fn ensure_deployment(
    chain: &dyn ChainBackend,
    deployments: &mut DeploymentStore,
    artifacts: Option<&ArtifactStore>,
    id: &str,
    contract: &str,
    from: Address,
    ctor_args: &[u8],
) -> Result<Address> {
    if let Some(address) = deployments.get(id) {
        tracing::debug!(deployment = id, %address, "reusing existing deployment");
        return Ok(address);
    }
    let store = artifacts.ok_or_else(|| SetupError::MissingArtifact(contract.to_string()))?;
    let address = store.deploy(chain, from, contract, ctor_args).await?;
    tracing::info!(deployment = id, contract, %address, "deployed");
    deployments.insert(id, address);
    Ok(address)
}

/// Build the RPC backend described by `cfg`. Networks with a fork source are
/// reset onto it first.
pub async fn connect_chain(cfg: &HarnessConfig) -> Result<Arc<dyn ChainBackend>> {
    let chain = RpcChain::new(&cfg.rpc_url, cfg.dialect, cfg.fork_head, cfg.rpc_timeout)?
        .with_gas_price(cfg.network.gas_price_wei);
    if let Some(fork) = &cfg.network.fork {
        chain.reset_to_fork(fork).await?;
    }
    tracing::info!(
        rpc = %cfg.rpc_url,
        backend = chain.label(),
        network = cfg.network.name,
        "connected to chain"
    );
    Ok(Arc::new(chain))
}

/// Connect, load the deployment records and artifacts named by `cfg`, and bootstrap.
pub async fn connect_and_initialize(
    cfg: &HarnessConfig,
    bootstrap: &BootstrapConfig,
) -> Result<TestEnv> {
    let chain = connect_chain(cfg).await?;
    let deployments_dir = cfg
        .network_deployments_dir()
        .ok_or_else(|| ConfigError::Missing("HARNESS_DEPLOYMENTS_DIR".to_string()))?;
    let deployments = DeploymentStore::open(&deployments_dir)?;
    let artifacts = cfg
        .artifacts_dir
        .as_deref()
        .map(ArtifactStore::open)
        .transpose()?;
    initialize(chain, deployments, artifacts, bootstrap).await
}

/// Bootstrap or terminate the process with exit code 1.
pub async fn initialize_or_exit(cfg: &HarnessConfig, bootstrap: &BootstrapConfig) -> TestEnv {
    match connect_and_initialize(cfg, bootstrap).await {
        Ok(env) => env,
        Err(err) => {
            tracing::error!(error = %err, "environment bootstrap failed");
            std::process::exit(1);
        }
    }
}

/// Produce a populated [`TestEnv`] from a freshly deployed chain.
pub async fn initialize(
    chain: Arc<dyn ChainBackend>,
    mut deployments: DeploymentStore,
    artifacts: Option<ArtifactStore>,
    config: &BootstrapConfig,
) -> Result<TestEnv> {
    let accounts = chain.accounts().await.map_err(step("resolve signers"))?;
    let roles = Roles::assign(&accounts)?;
    let deployer = roles.deployer;
    tracing::debug!(
        deployer = %deployer.address,
        users = roles.users.len(),
        "signer roles assigned"
    );

    let handle = |id: &str| -> std::result::Result<Address, SetupError> { deployments.address(id) };
    let helpers_contract =
        PoolDataProvider::at(handle(POOL_DATA_PROVIDER_ID)?, chain.clone(), deployer.address);

    let wrapped_listing = helpers_contract
        .read(IPoolDataProvider::getAllHTokensCall {})
        .await
        .map_err(step("getAllHTokens"))?
        ._0;
    let reserve_listing = helpers_contract
        .read(IPoolDataProvider::getAllReservesTokensCall {})
        .await
        .map_err(step("getAllReservesTokens"))?
        ._0;
    let address_book = AddressBook::from_token_data(&wrapped_listing, &reserve_listing);

    let wrapped = &config.wrapped;
    let [h_dai, h_usdc, h_weth] = address_book.require(
        TokenClass::Wrapped,
        [wrapped.dai.as_str(), wrapped.usdc.as_str(), wrapped.weth.as_str()],
    )?;
    let reserves = &config.reserves;
    let [dai, usdc, hope, weth] = address_book.require(
        TokenClass::Reserve,
        [
            reserves.dai.as_str(),
            reserves.usdc.as_str(),
            reserves.hope.as_str(),
            reserves.weth.as_str(),
        ],
    )?;

    let dai_debt = helpers_contract
        .read(IPoolDataProvider::getReserveTokensAddressesCall { asset: dai })
        .await
        .map_err(step("getReserveTokensAddresses"))?;

    let from = deployer.address;
    let pool = Pool::at(handle(POOL_PROXY_ID)?, chain.clone(), from);
    let configurator =
        PoolConfigurator::at(handle(POOL_CONFIGURATOR_PROXY_ID)?, chain.clone(), from);
    let addresses_provider =
        PoolAddressesProvider::at(handle(POOL_ADDRESSES_PROVIDER_ID)?, chain.clone(), from);
    let registry = PoolAddressesProviderRegistry::at(
        handle(POOL_ADDRESSES_PROVIDER_REGISTRY_ID)?,
        chain.clone(),
        from,
    );
    let oracle = HopeOracle::at(handle(ORACLE_ID)?, chain.clone(), from);
    let wrapped_token_gateway =
        WrappedTokenGateway::at(handle(WRAPPED_TOKEN_GATEWAY_ID)?, chain.clone(), from);

    let dai = MintableERC20::at(dai, chain.clone(), from);
    let usdc = MintableERC20::at(usdc, chain.clone(), from);
    let hope = MintableERC20::at(hope, chain.clone(), from);
    let weth = WETH9Mocked::at(weth, chain.clone(), from);
    let h_dai = HToken::at(h_dai, chain.clone(), from);
    let h_usdc = HToken::at(h_usdc, chain.clone(), from);
    let h_weth = HToken::at(h_weth, chain.clone(), from);
    let stable_debt_dai = StableDebtToken::at(dai_debt.stableDebtTokenAddress, chain.clone(), from);
    let variable_debt_dai =
        VariableDebtToken::at(dai_debt.variableDebtTokenAddress, chain.clone(), from);

    for token in [&dai, &hope, &usdc] {
        for user in &roles.users {
            token
                .send(IMintableERC20::addMinterCall { account: user.address })
                .await
                .map_err(step("addMinter"))?;
        }
    }
    for user in &roles.users {
        weth.send(IWETH9Mocked::addMinterCall { account: user.address })
            .await
            .map_err(step("addMinter"))?;
    }
    tracing::debug!(users = roles.users.len(), "users registered as reserve minters");

    let reward_prefix = testnet_reward_token_prefix(&config.market_name);
    let aggregator_prefix = testnet_price_aggregator_prefix(&config.market_name);
    let extra_reward_id = format!("{EXTRA_SYMBOL}{reward_prefix}");
    let extra_aggregator_id = format!("{EXTRA_SYMBOL}{aggregator_prefix}");
    let (extra_reward_token, extra_price_aggregator) = match artifacts.as_ref() {
        Some(store) => {
            let token = ensure_deployment(
                chain.as_ref(),
                &mut deployments,
                Some(store),
                &extra_reward_id,
                "MintableERC20",
                deployer.address,
                &mintable_erc20_args(EXTRA_SYMBOL, deployer.address),
            )
            .await?;
            let answer = I256::from_raw(U256::from(EXTRA_AGGREGATOR_ANSWER));
            let aggregator = ensure_deployment(
                chain.as_ref(),
                &mut deployments,
                Some(store),
                &extra_aggregator_id,
                "MockAggregator",
                deployer.address,
                &(answer,).abi_encode_params(),
            )
            .await?;
            (Some(token), Some(aggregator))
        }
        None => {
            tracing::info!("no artifact store configured, skipping EXTRA reward mocks");
            (
                deployments.get(&extra_reward_id),
                deployments.get(&extra_aggregator_id),
            )
        }
    };

    let has_incentives =
        deployments.contains(INCENTIVES_PROXY_ID) && deployments.contains(EMISSION_MANAGER_ID);
    let rewards = if has_incentives {
        Some(
            rewards::bootstrap(rewards::RewardsBootstrap {
                chain: &chain,
                deployments: &mut deployments,
                artifacts: artifacts.as_ref(),
                deployer,
                accounts: &accounts,
                named_accounts: &config.named_accounts,
                reward_prefix: &reward_prefix,
                aggregator_prefix: &aggregator_prefix,
            })
            .await?,
        )
    } else {
        tracing::info!("deployment has no incentives subsystem, rewards environment not built");
        None
    };

    tracing::info!(
        pool = %pool.address(),
        wrapped = wrapped_listing.len(),
        reserves = reserve_listing.len(),
        rewards = rewards.is_some(),
        "test environment ready"
    );

    Ok(TestEnv {
        chain,
        deployer,
        pool_admin: roles.pool_admin,
        emergency_admin: roles.emergency_admin,
        risk_admin: roles.risk_admin,
        users: roles.users,
        pool,
        configurator,
        addresses_provider,
        registry,
        oracle,
        helpers_contract,
        wrapped_token_gateway,
        dai,
        usdc,
        hope,
        weth,
        h_dai,
        h_usdc,
        h_weth,
        stable_debt_dai,
        variable_debt_dai,
        address_book,
        extra_reward_token,
        extra_price_aggregator,
        rewards,
        deployments,
        artifacts,
    })
}

/// Constructor arguments of `MintableERC20(name, symbol, 18, owner)`.
pub(crate) fn mintable_erc20_args(symbol: &str, owner: Address) -> Vec<u8> {
    (
        symbol.to_string(),
        symbol.to_string(),
        U256::from(MOCK_DECIMALS),
        owner,
    )
        .abi_encode_params()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{HeadId, SnapshotId, TxReceipt, TxRequest};
    use crate::config::networks::DEV_ACCOUNTS;
    use crate::contracts::bindings::{IEmissionManager, IRewardsController, TokenData};
    use crate::contracts::deployments::htoken_mock_id;
    use crate::env::SignerKind;
    use crate::error::HarnessError;
    use alloy::primitives::{address, Bytes};
    use alloy::sol_types::SolCall;
    use std::sync::Mutex;

    const MANAGER_ACCOUNT: Address = address!("eeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee");

    /// Answers the data-provider and rewards reads from fixed listings and
    /// records every transaction.
    struct FakeChain {
        wrapped: Vec<TokenData>,
        reserves: Vec<TokenData>,
        sent: Mutex<Vec<TxRequest>>,
        impersonated: Mutex<Vec<Address>>,
    }

    impl FakeChain {
        fn new(wrapped: &[&str], reserves: &[&str]) -> Arc<Self> {
            let listing = |symbols: &[&str], base: u8| -> Vec<TokenData> {
                symbols
                    .iter()
                    .enumerate()
                    .map(|(i, symbol)| TokenData {
                        symbol: symbol.to_string(),
                        tokenAddress: Address::with_last_byte(base + i as u8),
                    })
                    .collect()
            };
            Arc::new(Self {
                wrapped: listing(wrapped, 0x10),
                reserves: listing(reserves, 0x20),
                sent: Mutex::new(Vec::new()),
                impersonated: Mutex::new(Vec::new()),
            })
        }

        fn complete() -> Arc<Self> {
            Self::new(
                &["hTestDAI", "hTestUSDC", "hTestWETH"],
                &["DAI", "USDC", "HOPE", "WETH"],
            )
        }

        fn sent(&self) -> Vec<TxRequest> {
            self.sent.lock().unwrap().clone()
        }
    }

    fn selector(data: &[u8]) -> [u8; 4] {
        let mut sel = [0u8; 4];
        sel.copy_from_slice(&data[..4]);
        sel
    }

    #[async_trait::async_trait]
    impl ChainBackend for FakeChain {
        fn label(&self) -> &'static str {
            "fake"
        }

        async fn accounts(&self) -> std::result::Result<Vec<Address>, ChainError> {
            Ok(DEV_ACCOUNTS.to_vec())
        }

        async fn chain_id(&self) -> std::result::Result<u64, ChainError> {
            Ok(31337)
        }

        async fn call(&self, tx: &TxRequest) -> std::result::Result<Bytes, ChainError> {
            let sel = selector(&tx.data);
            let encoded = if sel == IPoolDataProvider::getAllHTokensCall::SELECTOR {
                (self.wrapped.clone(),).abi_encode_params()
            } else if sel == IPoolDataProvider::getAllReservesTokensCall::SELECTOR {
                (self.reserves.clone(),).abi_encode_params()
            } else if sel == IPoolDataProvider::getReserveTokensAddressesCall::SELECTOR {
                (
                    Address::with_last_byte(0x30),
                    Address::with_last_byte(0x31),
                    Address::with_last_byte(0x32),
                )
                    .abi_encode_params()
            } else if sel == IRewardsController::getEmissionManagerCall::SELECTOR {
                (MANAGER_ACCOUNT,).abi_encode_params()
            } else if sel == IEmissionManager::ownerCall::SELECTOR {
                (DEV_ACCOUNTS[0],).abi_encode_params()
            } else {
                return Err(ChainError::Execution(format!("unexpected call {sel:02x?}")));
            };
            Ok(Bytes::from(encoded))
        }

        async fn send(&self, tx: &TxRequest) -> std::result::Result<TxReceipt, ChainError> {
            self.sent.lock().unwrap().push(tx.clone());
            Ok(TxReceipt {
                status: true,
                ..TxReceipt::default()
            })
        }

        async fn impersonate(&self, account: Address) -> std::result::Result<(), ChainError> {
            self.impersonated.lock().unwrap().push(account);
            Ok(())
        }

        async fn set_balance(&self, _: Address, _: U256) -> std::result::Result<(), ChainError> {
            Ok(())
        }

        async fn balance(&self, _: Address) -> std::result::Result<U256, ChainError> {
            Ok(U256::ZERO)
        }

        async fn block_timestamp(&self) -> std::result::Result<u64, ChainError> {
            Ok(1_700_000_000)
        }

        async fn increase_time(&self, _: u64) -> std::result::Result<(), ChainError> {
            Ok(())
        }

        async fn snapshot(&self) -> std::result::Result<SnapshotId, ChainError> {
            Err(ChainError::Unsupported {
                backend: "fake",
                operation: "snapshot",
            })
        }

        async fn revert(&self, _: &SnapshotId) -> std::result::Result<bool, ChainError> {
            Ok(false)
        }

        async fn head(&self) -> std::result::Result<Option<HeadId>, ChainError> {
            Ok(None)
        }

        async fn set_head(&self, _: &HeadId) -> std::result::Result<(), ChainError> {
            Ok(())
        }
    }

    fn core_deployments() -> DeploymentStore {
        DeploymentStore::from_entries(
            [
                POOL_PROXY_ID,
                POOL_CONFIGURATOR_PROXY_ID,
                POOL_ADDRESSES_PROVIDER_ID,
                POOL_ADDRESSES_PROVIDER_REGISTRY_ID,
                ORACLE_ID,
                POOL_DATA_PROVIDER_ID,
                WRAPPED_TOKEN_GATEWAY_ID,
            ]
            .into_iter()
            .enumerate()
            .map(|(i, id)| (id, Address::with_last_byte(0x40 + i as u8))),
        )
    }

    fn with_rewards(mut store: DeploymentStore) -> DeploymentStore {
        let market = DEFAULT_MARKET_NAME;
        store.insert(INCENTIVES_PROXY_ID, Address::with_last_byte(0x50));
        store.insert(EMISSION_MANAGER_ID, Address::with_last_byte(0x51));
        store.insert(
            format!("REW{}", testnet_reward_token_prefix(market)),
            Address::with_last_byte(0x52),
        );
        store.insert(
            format!("HOPE{}", testnet_price_aggregator_prefix(market)),
            Address::with_last_byte(0x53),
        );
        for (i, slug) in ["hDai", "hWeth", "hHope", "hEurs"].into_iter().enumerate() {
            store.insert(htoken_mock_id(slug), Address::with_last_byte(0x60 + i as u8));
        }
        store
    }

    fn count_selector(sent: &[TxRequest], sel: [u8; 4]) -> usize {
        sent.iter().filter(|tx| selector(&tx.data) == sel).count()
    }

    #[tokio::test]
    async fn wrapped_symbols_are_checked_before_reserves() {
        let chain = FakeChain::new(&["hTestUSDC"], &["DAI"]);
        let err = initialize(chain.clone(), core_deployments(), None, &BootstrapConfig::default())
            .await
            .unwrap_err();
        match err {
            HarnessError::Setup(SetupError::MissingSymbols { class, symbols }) => {
                assert_eq!(class, TokenClass::Wrapped);
                assert_eq!(symbols, vec!["hTestDAI", "hTestWETH"]);
            }
            other => panic!("expected missing wrapped symbols, got {other}"),
        }
        assert!(chain.sent().is_empty());
    }

    #[tokio::test]
    async fn every_user_becomes_a_minter_of_each_reserve() {
        let chain = FakeChain::complete();
        let env = initialize(chain.clone(), core_deployments(), None, &BootstrapConfig::default())
            .await
            .unwrap();
        let sent = chain.sent();
        assert_eq!(env.users.len(), 7);
        assert_eq!(sent.len(), 4 * env.users.len());
        assert_eq!(
            count_selector(&sent, IMintableERC20::addMinterCall::SELECTOR),
            sent.len()
        );
        // DAI, HOPE and USDC first, then WETH.
        let targets: Vec<Address> = sent.iter().filter_map(|tx| tx.to).collect();
        assert_eq!(targets[0], Address::with_last_byte(0x20));
        assert_eq!(targets[7], Address::with_last_byte(0x22));
        assert_eq!(targets[14], Address::with_last_byte(0x21));
        assert_eq!(targets[21], Address::with_last_byte(0x23));
        assert!(sent.iter().all(|tx| tx.from == DEV_ACCOUNTS[0]));
        assert_eq!(env.stable_debt_dai.address(), Address::with_last_byte(0x31));
        assert!(env.rewards.is_none());
        assert!(env.extra_reward_token.is_none());
    }

    #[tokio::test]
    async fn rewards_environment_built_when_incentives_are_deployed() {
        let chain = FakeChain::complete();
        let env = initialize(
            chain.clone(),
            with_rewards(core_deployments()),
            None,
            &BootstrapConfig::default(),
        )
        .await
        .unwrap();
        let rewards = env.rewards.as_ref().expect("rewards environment");
        assert_eq!(rewards.emission_manager_account.address, MANAGER_ACCOUNT);
        assert_eq!(rewards.emission_manager_account.kind, SignerKind::Impersonated);
        assert_eq!(rewards.emission_manager_owner.kind, SignerKind::Unlocked);
        assert_eq!(rewards.rewards_vault, DEV_ACCOUNTS[2]);
        assert_eq!(
            rewards.distribution_end,
            1_700_000_000 + rewards::DISTRIBUTION_PERIOD_SECS
        );
        assert_eq!(rewards.hope_price_aggregator, Address::with_last_byte(0x53));
        assert_eq!(rewards.h_eurs_mock.address(), Address::with_last_byte(0x63));
        assert_eq!(*chain.impersonated.lock().unwrap(), vec![MANAGER_ACCOUNT]);

        let sent = chain.sent();
        assert_eq!(
            count_selector(&sent, IEmissionManager::setRewardsControllerCall::SELECTOR),
            1
        );
        assert_eq!(count_selector(&sent, IMintableERC20::mintCall::SELECTOR), 1);
        assert_eq!(sent.len(), 28 + 2);
    }

    #[tokio::test]
    async fn rewards_mocks_without_records_or_artifacts_are_fatal() {
        let chain = FakeChain::complete();
        let mut deployments = core_deployments();
        deployments.insert(INCENTIVES_PROXY_ID, Address::with_last_byte(0x50));
        deployments.insert(EMISSION_MANAGER_ID, Address::with_last_byte(0x51));
        let err = initialize(chain, deployments, None, &BootstrapConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            HarnessError::Setup(SetupError::MissingArtifact(ref name)) if name == "MintableERC20"
        ));
    }

    #[tokio::test]
    async fn extra_mocks_reuse_records_and_need_artifacts_otherwise() {
        let extra_reward_id = format!(
            "{EXTRA_SYMBOL}{}",
            testnet_reward_token_prefix(DEFAULT_MARKET_NAME)
        );
        let extra_aggregator_id = format!(
            "{EXTRA_SYMBOL}{}",
            testnet_price_aggregator_prefix(DEFAULT_MARKET_NAME)
        );
        let mut deployments = core_deployments();
        deployments.insert(extra_reward_id.clone(), Address::with_last_byte(0x70));
        deployments.insert(extra_aggregator_id, Address::with_last_byte(0x71));

        let chain = FakeChain::complete();
        let env = initialize(
            chain.clone(),
            deployments,
            Some(ArtifactStore::default()),
            &BootstrapConfig::default(),
        )
        .await
        .unwrap();
        assert_eq!(env.extra_reward_token, Some(Address::with_last_byte(0x70)));
        assert_eq!(env.extra_price_aggregator, Some(Address::with_last_byte(0x71)));
        assert_eq!(chain.sent().len(), 28);
        assert!(env.deployments.contains(&extra_reward_id));

        // A configured store that lacks the artifact cannot deploy the mock.
        let err = initialize(
            FakeChain::complete(),
            core_deployments(),
            Some(ArtifactStore::default()),
            &BootstrapConfig::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            HarnessError::Setup(SetupError::MissingArtifact(ref name)) if name == "MintableERC20"
        ));
    }

    #[tokio::test]
    async fn ensure_deployment_reuses_recorded_address() {
        let chain = FakeChain::complete();
        let mut deployments =
            DeploymentStore::from_entries([("Thing", Address::with_last_byte(9))]);
        let address = ensure_deployment(
            chain.as_ref(),
            &mut deployments,
            None,
            "Thing",
            "MintableERC20",
            DEV_ACCOUNTS[0],
            &[],
        )
        .await
        .unwrap();
        assert_eq!(address, Address::with_last_byte(9));
        assert!(chain.sent().is_empty());

        let err = ensure_deployment(
            chain.as_ref(),
            &mut deployments,
            None,
            "Other",
            "MockAggregator",
            DEV_ACCOUNTS[0],
            &[],
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            HarnessError::Setup(SetupError::MissingArtifact(ref name)) if name == "MockAggregator"
        ));
        assert!(!deployments.contains("Other"));
    }

    #[test]
    fn mintable_erc20_args_encode_decimals_as_a_word() {
        let owner = Address::with_last_byte(0xab);
        let args = mintable_erc20_args("EXTRA", owner);
        let (name, symbol, decimals, decoded_owner) =
            <(String, String, U256, Address)>::abi_decode_params(&args, true).unwrap();
        assert_eq!(name, "EXTRA");
        assert_eq!(symbol, "EXTRA");
        assert_eq!(decimals, U256::from(18));
        assert_eq!(decoded_owner, owner);
    }
}
