use alloy::primitives::Address;
use hopelend_harness::contracts::bindings::IRewardsController;
use hopelend_harness::env::TestEnv;
use hopelend_harness::suite::{expect_revert, TestGroup};

async fn second_initialize_reverts(env: &TestEnv) -> anyhow::Result<()> {
    expect_revert(env.rewards()?.rewards_controller.send(
        IRewardsController::initializeCall {
            emissionManager: Address::ZERO,
        },
    ))
    .await
}

pub fn group() -> TestGroup<TestEnv> {
    TestGroup::new("RewardsController initialize").case(
        "a second initialize reverts",
        |env| Box::pin(second_initialize_reverts(env)),
    )
}
