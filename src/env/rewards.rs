use crate::chain::ChainBackend;
use crate::config::named_accounts::{NamedAccounts, INCENTIVES_REWARDS_VAULT};
use crate::contracts::bindings::{IEmissionManager, IMintableERC20, IRewardsController};
use crate::contracts::deployments::{htoken_mock_id, EMISSION_MANAGER_ID, INCENTIVES_PROXY_ID};
use crate::contracts::{
    ArtifactStore, DeploymentStore, EmissionManager, HTokenMock, MintableERC20, RewardsController,
};
use crate::env::bootstrap::{ensure_deployment, mintable_erc20_args, step};
use crate::env::SignerWithAddress;
use crate::error::Result;
use alloy::primitives::{Address, U256};
use alloy::sol_types::SolValue;
use std::sync::Arc;

const REWARD_SYMBOL: &str = "REW";
const HOPE_SYMBOL: &str = "HOPE";
const WEI_PER_ETH: u128 = 1_000_000_000_000_000_000;
pub const EMISSION_MANAGER_FUNDING_ETH: u64 = 10;
pub const REWARDS_VAULT_TOKENS: u64 = 2_000_000_000;
pub const DISTRIBUTION_PERIOD_SECS: u64 = 365 * 24 * 60 * 60;
pub const HTOKEN_MOCK_DECIMALS: u8 = 18;

/// Rewards part of the environment, present when the deployment carries the
/// incentives subsystem.
#[derive(Debug)]
pub struct RewardsEnv {
    /// Bound to the deployer.
    pub rewards_controller: RewardsController,
    /// Bound to the emission manager's owner.
    pub emission_manager: EmissionManager,
    pub emission_manager_owner: SignerWithAddress,
    /// The account the controller accepts emission-manager calls from. Impersonated.
    pub emission_manager_account: SignerWithAddress,
    pub rewards_vault: Address,
    pub reward_token: MintableERC20,
    pub distribution_end: u64,
    pub hope_price_aggregator: Address,
    pub h_dai_mock: HTokenMock,
    pub h_weth_mock: HTokenMock,
    pub h_hope_mock: HTokenMock,
    pub h_eurs_mock: HTokenMock,
}

pub(crate) struct RewardsBootstrap<'a> {
    pub chain: &'a Arc<dyn ChainBackend>,
    pub deployments: &'a mut DeploymentStore,
    pub artifacts: Option<&'a ArtifactStore>,
    pub deployer: SignerWithAddress,
    pub accounts: &'a [Address],
    pub named_accounts: &'a NamedAccounts,
    pub reward_prefix: &'a str,
    pub aggregator_prefix: &'a str,
}

fn eth(amount: u64) -> U256 {
    U256::from(amount) * U256::from(WEI_PER_ETH)
}

/// Constructor arguments of `HTokenMock(controller, 18)`.
pub(crate) fn htoken_mock_args(controller: Address) -> Vec<u8> {
    (controller, U256::from(HTOKEN_MOCK_DECIMALS)).abi_encode_params()
}

/// Deploy (or reuse) `HTokenMock(controller, 18)` under `<slug>-HTokenMock`.
async fn htoken_mock(
    chain: &Arc<dyn ChainBackend>,
    deployments: &mut DeploymentStore,
    artifacts: Option<&ArtifactStore>,
    slug: &str,
    controller: Address,
    from: Address,
) -> Result<HTokenMock> {
    let address = ensure_deployment(
        chain.as_ref(),
        deployments,
        artifacts,
        &htoken_mock_id(slug),
        "HTokenMock",
        from,
        &htoken_mock_args(controller),
    )
    .await?;
    Ok(HTokenMock::at(address, chain.clone(), from))
}

pub(crate) async fn bootstrap(ctx: RewardsBootstrap<'_>) -> Result<RewardsEnv> {
    let RewardsBootstrap {
        chain,
        deployments,
        artifacts,
        deployer,
        accounts,
        named_accounts,
        reward_prefix,
        aggregator_prefix,
    } = ctx;

    let controller_address = deployments.address(INCENTIVES_PROXY_ID)?;
    let rewards_controller =
        RewardsController::at(controller_address, chain.clone(), deployer.address);

    let manager_account = rewards_controller
        .read(IRewardsController::getEmissionManagerCall {})
        .await
        .map_err(step("getEmissionManager"))?
        ._0;
    let emission_manager_account = SignerWithAddress::impersonate(
        chain.as_ref(),
        manager_account,
        Some(eth(EMISSION_MANAGER_FUNDING_ETH)),
    )
    .await
    .map_err(step("impersonate emission manager"))?;

    let emission_manager = EmissionManager::at(
        deployments.address(EMISSION_MANAGER_ID)?,
        chain.clone(),
        deployer.address,
    );
    let owner = emission_manager
        .read(IEmissionManager::ownerCall {})
        .await
        .map_err(step("EmissionManager.owner"))?
        ._0;
    let emission_manager_owner = if accounts.contains(&owner) {
        SignerWithAddress::unlocked(owner)
    } else {
        SignerWithAddress::impersonate(chain.as_ref(), owner, None)
            .await
            .map_err(step("impersonate emission manager owner"))?
    };
    let emission_manager = emission_manager.connect(&emission_manager_owner);
    emission_manager
        .send(IEmissionManager::setRewardsControllerCall {
            controller: controller_address,
        })
        .await
        .map_err(step("setRewardsController"))?;
    tracing::debug!(
        controller = %controller_address,
        emission_manager = %emission_manager.address(),
        manager_account = %manager_account,
        "rewards controller bound to emission manager"
    );

    let reward_token_address = ensure_deployment(
        chain.as_ref(),
        deployments,
        artifacts,
        &format!("{REWARD_SYMBOL}{reward_prefix}"),
        "MintableERC20",
        deployer.address,
        &mintable_erc20_args(REWARD_SYMBOL, deployer.address),
    )
    .await?;
    let reward_token = MintableERC20::at(reward_token_address, chain.clone(), deployer.address);

    let rewards_vault = named_accounts.resolve(INCENTIVES_REWARDS_VAULT, accounts)?;
    reward_token
        .send(IMintableERC20::mintCall {
            account: rewards_vault,
            value: eth(REWARDS_VAULT_TOKENS),
        })
        .await
        .map_err(step("mint rewards vault"))?;

    let distribution_end = chain
        .block_timestamp()
        .await
        .map_err(step("latest block timestamp"))?
        + DISTRIBUTION_PERIOD_SECS;
    let hope_price_aggregator = deployments.address(&format!("{HOPE_SYMBOL}{aggregator_prefix}"))?;

    let h_dai_mock =
        htoken_mock(chain, deployments, artifacts, "hDai", controller_address, deployer.address)
            .await?;
    let h_weth_mock =
        htoken_mock(chain, deployments, artifacts, "hWeth", controller_address, deployer.address)
            .await?;
    let h_hope_mock =
        htoken_mock(chain, deployments, artifacts, "hHope", controller_address, deployer.address)
            .await?;
    let h_eurs_mock =
        htoken_mock(chain, deployments, artifacts, "hEurs", controller_address, deployer.address)
            .await?;

    tracing::info!(
        reward_token = %reward_token_address,
        vault = %rewards_vault,
        distribution_end,
        "rewards environment ready"
    );

    Ok(RewardsEnv {
        rewards_controller,
        emission_manager,
        emission_manager_owner,
        emission_manager_account,
        rewards_vault,
        reward_token,
        distribution_end,
        hope_price_aggregator,
        h_dai_mock,
        h_weth_mock,
        h_hope_mock,
        h_eurs_mock,
    })
}
