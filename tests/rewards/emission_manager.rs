use alloy::primitives::{address, Address};
use anyhow::{ensure, Context};
use hopelend_harness::contracts::bindings::IEmissionManager;
use hopelend_harness::contracts::bindings::IEmissionManager::EmissionAdminUpdated;
use hopelend_harness::contracts::{deploy_code, runtime_init_code};
use hopelend_harness::env::TestEnv;
use hopelend_harness::suite::{expect_event, expect_revert_with, TestGroup};
use std::sync::{Arc, OnceLock};

const NOT_OWNER: &str = "Ownable: caller is not the owner";
const ONLY_EMISSION_ADMIN: &str = "ONLY_EMISSION_ADMIN";
const ONE_ADDRESS: Address = address!("0000000000000000000000000000000000000001");
const RANDOM_DISTRIBUTION_END: u32 = 20_232_312;

/// Runtime that stops on any calldata, so every controller call succeeds.
const PERMISSIVE_RUNTIME: [u8; 1] = [0x00];

type MockSlot = Arc<OnceLock<Address>>;

async fn bind_mock_controller(env: &TestEnv, slot: MockSlot) -> anyhow::Result<()> {
    let rewards = env.rewards()?;
    let mock = match slot.get() {
        Some(mock) => *mock,
        None => {
            let mock = deploy_code(
                env.chain.as_ref(),
                env.deployer.address,
                runtime_init_code(&PERMISSIVE_RUNTIME)?,
            )
            .await?;
            tracing::info!(%mock, "mock rewards controller deployed");
            *slot.get_or_init(|| mock)
        }
    };
    rewards
        .emission_manager
        .send(IEmissionManager::setRewardsControllerCall { controller: mock })
        .await?;
    Ok(())
}

async fn owner_sets_rewards_controller(env: &TestEnv, slot: MockSlot) -> anyhow::Result<()> {
    let manager = &env.rewards()?.emission_manager;
    let mock = *slot.get().context("mock controller was not deployed")?;
    let current = manager.read(IEmissionManager::getRewardsControllerCall {}).await?._0;
    ensure!(current == mock, "controller is {current}, expected mock {mock}");

    manager
        .send(IEmissionManager::setRewardsControllerCall {
            controller: Address::ZERO,
        })
        .await?;
    let current = manager.read(IEmissionManager::getRewardsControllerCall {}).await?._0;
    ensure!(current == Address::ZERO, "controller is {current} after reset");
    Ok(())
}

async fn non_owner_cannot_set_rewards_controller(env: &TestEnv) -> anyhow::Result<()> {
    let manager = env.rewards()?.emission_manager.connect(env.user(0)?);
    expect_revert_with(
        manager.send(IEmissionManager::setRewardsControllerCall {
            controller: Address::ZERO,
        }),
        NOT_OWNER,
    )
    .await
}

async fn emission_admin_of(env: &TestEnv) -> anyhow::Result<Address> {
    let rewards = env.rewards()?;
    Ok(rewards
        .emission_manager
        .read(IEmissionManager::getEmissionAdminCall {
            reward: rewards.reward_token.address(),
        })
        .await?
        ._0)
}

async fn non_owner_cannot_set_emission_admin(env: &TestEnv) -> anyhow::Result<()> {
    let rewards = env.rewards()?;
    ensure!(emission_admin_of(env).await? == Address::ZERO, "reward already has an admin");
    expect_revert_with(
        rewards
            .emission_manager
            .connect(env.user(0)?)
            .send(IEmissionManager::setEmissionAdminCall {
                reward: rewards.reward_token.address(),
                admin: env.user(1)?.address,
            }),
        NOT_OWNER,
    )
    .await?;
    ensure!(emission_admin_of(env).await? == Address::ZERO, "admin changed after revert");
    Ok(())
}

async fn owner_sets_emission_admin(env: &TestEnv) -> anyhow::Result<()> {
    let rewards = env.rewards()?;
    let reward = rewards.reward_token.address();
    let admin = env.user(1)?.address;
    ensure!(emission_admin_of(env).await? == Address::ZERO, "reward already has an admin");

    let receipt = rewards
        .emission_manager
        .send(IEmissionManager::setEmissionAdminCall { reward, admin })
        .await?;
    let event: EmissionAdminUpdated = expect_event(&receipt, rewards.emission_manager.address())?;
    ensure!(
        event.reward == reward && event.oldAdmin == Address::ZERO && event.newAdmin == admin,
        "unexpected EmissionAdminUpdated({}, {}, {})",
        event.reward,
        event.oldAdmin,
        event.newAdmin
    );
    ensure!(emission_admin_of(env).await? == admin, "admin was not stored");
    Ok(())
}

async fn non_owner_cannot_set_claimer(env: &TestEnv) -> anyhow::Result<()> {
    let manager = env.rewards()?.emission_manager.connect(env.user(0)?);
    expect_revert_with(
        manager.send(IEmissionManager::setClaimerCall {
            user: env.user(0)?.address,
            claimer: env.user(1)?.address,
        }),
        NOT_OWNER,
    )
    .await
}

async fn owner_sets_claimer(env: &TestEnv) -> anyhow::Result<()> {
    env.rewards()?
        .emission_manager
        .send(IEmissionManager::setClaimerCall {
            user: env.user(0)?.address,
            claimer: env.user(1)?.address,
        })
        .await?;
    Ok(())
}

async fn call_admin_only_functions(env: &TestEnv, expect_rejection: bool) -> anyhow::Result<()> {
    let rewards = env.rewards()?;
    let reward = rewards.reward_token.address();
    let manager = rewards.emission_manager.connect(env.user(1)?);

    let strategy = manager.send(IEmissionManager::setTransferStrategyCall {
        reward,
        transferStrategy: ONE_ADDRESS,
    });
    let oracle = manager.send(IEmissionManager::setRewardOracleCall {
        reward,
        rewardOracle: ONE_ADDRESS,
    });
    let distribution_end = manager.send(IEmissionManager::setDistributionEndCall {
        asset: ONE_ADDRESS,
        reward,
        newDistributionEnd: RANDOM_DISTRIBUTION_END,
    });

    if expect_rejection {
        expect_revert_with(strategy, ONLY_EMISSION_ADMIN)
            .await
            .context("setTransferStrategy")?;
        expect_revert_with(oracle, ONLY_EMISSION_ADMIN)
            .await
            .context("setRewardOracle")?;
        expect_revert_with(distribution_end, ONLY_EMISSION_ADMIN)
            .await
            .context("setDistributionEnd")?;
    } else {
        strategy.await.context("setTransferStrategy")?;
        oracle.await.context("setRewardOracle")?;
        distribution_end.await.context("setDistributionEnd")?;
    }
    Ok(())
}

async fn only_emission_admin_functions(env: &TestEnv) -> anyhow::Result<()> {
    call_admin_only_functions(env, true).await?;

    let rewards = env.rewards()?;
    rewards
        .emission_manager
        .send(IEmissionManager::setEmissionAdminCall {
            reward: rewards.reward_token.address(),
            admin: env.user(1)?.address,
        })
        .await?;

    call_admin_only_functions(env, false).await
}

pub fn group() -> TestGroup<TestEnv> {
    let mock: MockSlot = Arc::default();
    let before_slot = mock.clone();
    let case_slot = mock;

    TestGroup::new("EmissionManager")
        .before("bind mock rewards controller", move |env| {
            Box::pin(bind_mock_controller(env, before_slot.clone()))
        })
        .isolate_each_case()
        .case("owner sets a new rewards controller", move |env| {
            Box::pin(owner_sets_rewards_controller(env, case_slot.clone()))
        })
        .case("non-owner cannot set a new rewards controller", |env| {
            Box::pin(non_owner_cannot_set_rewards_controller(env))
        })
        .case("non-owner cannot set a new emission admin", |env| {
            Box::pin(non_owner_cannot_set_emission_admin(env))
        })
        .case("owner sets a new emission admin", |env| {
            Box::pin(owner_sets_emission_admin(env))
        })
        .case("non-owner cannot set an authorized claimer", |env| {
            Box::pin(non_owner_cannot_set_claimer(env))
        })
        .case("owner sets an authorized claimer", |env| {
            Box::pin(owner_sets_claimer(env))
        })
        .case("onlyEmissionAdmin functions need the emission admin", |env| {
            Box::pin(only_emission_admin_functions(env))
        })
}

