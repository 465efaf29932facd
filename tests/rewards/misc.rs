use alloy::primitives::aliases::U88;
use alloy::primitives::{address, Address, U256};
use alloy::sol_types::SolValue;
use anyhow::{ensure, Context};
use hopelend_harness::contracts::bindings::{
    IHTokenMock, IRewardsController, RewardsConfigInput,
};
use hopelend_harness::contracts::{ArtifactStore, RewardsController};
use hopelend_harness::env::TestEnv;
use hopelend_harness::suite::{expect_revert_with, TestGroup};

const OTHER_EMISSION_MANAGER: Address = address!("0000000000000000000000000000000000000321");
const EMISSION_PER_SECOND: u64 = 2000;
const USER_BALANCE: u64 = 300_000;
const TOTAL_SUPPLY: u64 = 30_000;

fn artifacts(env: &TestEnv) -> anyhow::Result<&ArtifactStore> {
    env.artifacts
        .as_ref()
        .context("HARNESS_ARTIFACTS_DIR is required to deploy contracts in this group")
}

async fn deployment_exposes_emission_manager(env: &TestEnv) -> anyhow::Result<()> {
    let deployer = env.deployer.address;
    let address = artifacts(env)?
        .deploy(
            env.chain.as_ref(),
            deployer,
            "RewardsController",
            &OTHER_EMISSION_MANAGER.abi_encode(),
        )
        .await?;
    let controller = RewardsController::at(address, env.chain.clone(), deployer);

    let constant = controller.read(IRewardsController::EMISSION_MANAGERCall {}).await?._0;
    ensure!(constant == OTHER_EMISSION_MANAGER, "EMISSION_MANAGER() is {constant}");
    let getter = controller.read(IRewardsController::getEmissionManagerCall {}).await?._0;
    ensure!(getter == OTHER_EMISSION_MANAGER, "getEmissionManager() is {getter}");
    Ok(())
}

async fn claim_reverts_when_transfer_fails(env: &TestEnv) -> anyhow::Result<()> {
    let rewards = env.rewards()?;
    let controller = rewards.rewards_controller.address();
    let strategy = artifacts(env)?
        .deploy(
            env.chain.as_ref(),
            env.deployer.address,
            "MockBadTransferStrategy",
            &(controller, env.deployer.address).abi_encode_params(),
        )
        .await?;
    let distribution_end = u32::try_from(rewards.distribution_end)
        .with_context(|| {
            format!("distribution end {} does not fit uint32", rewards.distribution_end)
        })?;

    rewards
        .rewards_controller
        .connect(&rewards.emission_manager_account)
        .send(IRewardsController::configureAssetsCall {
            config: vec![RewardsConfigInput {
                emissionPerSecond: U88::from(EMISSION_PER_SECOND),
                totalSupply: U256::ZERO,
                distributionEnd: distribution_end,
                asset: rewards.h_dai_mock.address(),
                reward: rewards.reward_token.address(),
                transferStrategy: strategy,
                rewardOracle: rewards.hope_price_aggregator,
            }],
        })
        .await
        .context("configureAssets")?;
    rewards
        .h_dai_mock
        .send(IHTokenMock::setUserBalanceAndSupplyCall {
            userBalance: U256::from(USER_BALANCE),
            totalSupply: U256::from(TOTAL_SUPPLY),
        })
        .await
        .context("setUserBalanceAndSupply")?;

    let claimer = rewards.rewards_controller.connect(env.user(0)?);
    expect_revert_with(
        claimer.send(IRewardsController::claimAllRewardsToSelfCall {
            assets: vec![rewards.h_dai_mock.address()],
        }),
        "TRANSFER_ERROR",
    )
    .await
}

pub fn group() -> TestGroup<TestEnv> {
    TestGroup::new("RewardsController misc")
        .case("deployment exposes the emission manager", |env| {
            Box::pin(deployment_exposes_emission_manager(env))
        })
        .case("claim reverts when the transfer strategy returns false", |env| {
            Box::pin(claim_reverts_when_transfer_fails(env))
        })
}
