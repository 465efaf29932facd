use alloy::primitives::Address;
use hopelend_harness::contracts::bindings::IRewardsController;
use hopelend_harness::env::TestEnv;
use hopelend_harness::suite::{expect_revert_with, TestGroup};

async fn only_emission_manager(env: &TestEnv) -> anyhow::Result<()> {
    let controller = env.rewards()?.rewards_controller.connect(env.user(0)?);
    expect_revert_with(
        controller.send(IRewardsController::setDistributionEndCall {
            asset: Address::ZERO,
            reward: Address::ZERO,
            newDistributionEnd: 0,
        }),
        "ONLY_EMISSION_MANAGER",
    )
    .await
}

pub fn group() -> TestGroup<TestEnv> {
    TestGroup::new("RewardsController setDistributionEnd").case(
        "reverts when caller is not the emission manager",
        |env| Box::pin(only_emission_manager(env)),
    )
}
