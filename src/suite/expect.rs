//! Assertions for the three outcomes a case checks: a state change, an event,
//! or a rejection with a given reason.

use crate::chain::TxReceipt;
use crate::error::ChainError;
use alloy::primitives::Address;
use alloy::sol_types::SolEvent;
use anyhow::{anyhow, bail};
use std::future::Future;

/// Pass only when `call` reverts with exactly `reason`.
pub async fn expect_revert_with<T, F>(call: F, reason: &str) -> anyhow::Result<()>
where
    F: Future<Output = Result<T, ChainError>>,
{
    match call.await {
        Ok(_) => bail!("expected revert with `{reason}`, but the call succeeded"),
        Err(ChainError::Reverted {
            reason: Some(actual),
            ..
        }) if actual == reason => Ok(()),
        Err(ChainError::Reverted { reason: actual, .. }) => bail!(
            "expected revert with `{reason}`, reverted with `{}`",
            actual.as_deref().unwrap_or("<no reason>")
        ),
        Err(other) => bail!("expected revert with `{reason}`, got error: {other}"),
    }
}

/// Pass on any revert, with or without a reason.
pub async fn expect_revert<T, F>(call: F) -> anyhow::Result<()>
where
    F: Future<Output = Result<T, ChainError>>,
{
    match call.await {
        Ok(_) => bail!("expected revert, but the call succeeded"),
        Err(ChainError::Reverted { .. }) => Ok(()),
        Err(other) => bail!("expected revert, got error: {other}"),
    }
}

/// First `E` emitted by `emitter` in `receipt`.
pub fn expect_event<E: SolEvent>(receipt: &TxReceipt, emitter: Address) -> anyhow::Result<E> {
    receipt
        .logs_from(emitter)
        .filter(|log| log.data.topics().first() == Some(&E::SIGNATURE_HASH))
        .find_map(|log| E::decode_log_data(&log.data, true).ok())
        .ok_or_else(|| anyhow!("no `{}` event emitted by {emitter}", E::SIGNATURE))
}
