//! Chain-access boundary.
//!
//! Every interaction the harness has with a chain goes through [`ChainBackend`]:
//! contract calls and transactions, the node cheat methods used during
//! bootstrap, and the two state-isolation primitive pairs
//! (`snapshot`/`revert` for local chains, `head`/`set_head` for remote forks).

pub mod local;
pub mod revert;
pub mod rpc;

use crate::error::ChainError;
use alloy::primitives::{Address, Bytes, Log, B256, U256};
use async_trait::async_trait;
use std::fmt;

pub use local::LocalChain;
pub use rpc::RpcChain;

/// Identifier returned by `evm_snapshot`. Consumed by a successful revert.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SnapshotId(pub String);

/// Identifier of a remote fork's state pointer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HeadId(pub String);

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for HeadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TxRequest {
    pub from: Address,
    /// `None` creates a contract from `data`.
    pub to: Option<Address>,
    pub data: Bytes,
    pub value: U256,
    pub gas: Option<u64>,
}

impl TxRequest {
    pub fn call(from: Address, to: Address, data: impl Into<Bytes>) -> Self {
        Self {
            from,
            to: Some(to),
            data: data.into(),
            ..Self::default()
        }
    }

    pub fn create(from: Address, init_code: impl Into<Bytes>) -> Self {
        Self {
            from,
            to: None,
            data: init_code.into(),
            ..Self::default()
        }
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct TxReceipt {
    pub tx_hash: Option<B256>,
    pub status: bool,
    pub contract_address: Option<Address>,
    pub gas_used: u64,
    pub logs: Vec<Log>,
}

impl TxReceipt {
    /// Logs emitted by `emitter`, in order.
    pub fn logs_from(&self, emitter: Address) -> impl Iterator<Item = &Log> {
        self.logs.iter().filter(move |log| log.address == emitter)
    }
}

#[async_trait]
pub trait ChainBackend: Send + Sync {
    /// Short backend name for logs and errors.
    fn label(&self) -> &'static str;

    async fn accounts(&self) -> Result<Vec<Address>, ChainError>;

    async fn chain_id(&self) -> Result<u64, ChainError>;

    /// Execute without committing. Reverts map to [`ChainError::Reverted`].
    async fn call(&self, tx: &TxRequest) -> Result<Bytes, ChainError>;

    /// Execute and commit. A failed transaction maps to [`ChainError::Reverted`].
    async fn send(&self, tx: &TxRequest) -> Result<TxReceipt, ChainError>;

    async fn impersonate(&self, account: Address) -> Result<(), ChainError>;

    async fn set_balance(&self, account: Address, amount: U256) -> Result<(), ChainError>;

    async fn balance(&self, account: Address) -> Result<U256, ChainError>;

    async fn block_timestamp(&self) -> Result<u64, ChainError>;

    /// Move the clock forward and mine one block.
    async fn increase_time(&self, seconds: u64) -> Result<(), ChainError>;

    async fn snapshot(&self) -> Result<SnapshotId, ChainError>;

    /// Returns `false` when the id is unknown or was already consumed.
    async fn revert(&self, id: &SnapshotId) -> Result<bool, ChainError>;

    /// Current head pointer, `None` while the backend has not reported one.
    async fn head(&self) -> Result<Option<HeadId>, ChainError>;

    async fn set_head(&self, head: &HeadId) -> Result<(), ChainError>;
}

impl fmt::Debug for dyn ChainBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
