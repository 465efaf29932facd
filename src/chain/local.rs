//! In-process ephemeral chain on top of revm.
//!
//! Each committed transaction is mined into its own block (automine). State
//! isolation supports both primitive pairs:
//! - `snapshot`/`revert` with hardhat semantics: reverting consumes the
//!   snapshot and every snapshot taken after it;
//! - `head`/`set_head` with fork-pointer semantics: a head stays valid after
//!   it is restored and can be restored again. Only the most recent
//!   [`MAX_RECORDED_HEADS`] heads are kept, plus genesis.

use crate::chain::revert::decode_revert_reason;
use crate::chain::{ChainBackend, HeadId, SnapshotId, TxReceipt, TxRequest};
use crate::config::networks::{Hardfork, NetworkProfile, DEV_ACCOUNTS};
use crate::error::ChainError;
use alloy::primitives::{Address, Bytes, Log, B256, U256};
use async_trait::async_trait;
use revm::db::{CacheDB, EmptyDB};
use revm::primitives::{
    AccountInfo, Address as RAddress, Bytes as RBytes, ExecutionResult, Output, SpecId, TxKind,
    U256 as RU256,
};
use revm::{DatabaseRef, Evm};
use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;

/// Version id of the state the chain starts from.
pub const GENESIS_VERSION: u64 = 1;
/// Recorded heads kept besides genesis; the oldest is evicted first.
pub const MAX_RECORDED_HEADS: usize = 256;
const DEV_ACCOUNT_BALANCE_ETH: u64 = 10_000;
const WEI_PER_ETH: u128 = 1_000_000_000_000_000_000;

fn to_revm_address(address: Address) -> RAddress {
    RAddress::from_slice(address.as_slice())
}

fn from_revm_address(address: RAddress) -> Address {
    Address::from_slice(address.as_slice())
}

fn to_revm_u256(value: U256) -> RU256 {
    RU256::from_be_bytes(value.to_be_bytes::<32>())
}

fn from_revm_u256(value: RU256) -> U256 {
    U256::from_be_bytes(value.to_be_bytes::<32>())
}

fn spec_for(hardfork: Hardfork) -> SpecId {
    match hardfork {
        Hardfork::Berlin => SpecId::BERLIN,
        Hardfork::London => SpecId::LONDON,
    }
}

fn format_version(version: u64) -> String {
    format!("0x{version:x}")
}

fn parse_version(raw: &str) -> Option<u64> {
    let body = raw.trim().strip_prefix("0x")?;
    u64::from_str_radix(body, 16).ok()
}

#[derive(Clone)]
struct ChainState {
    db: CacheDB<EmptyDB>,
    block_number: u64,
    timestamp: u64,
    version: u64,
}

struct Inner {
    state: ChainState,
    next_version: u64,
    snapshots: Vec<(u64, ChainState)>,
    next_snapshot: u64,
    heads: BTreeMap<u64, ChainState>,
}

impl Inner {
    fn bump_version(&mut self) {
        self.next_version += 1;
        self.state.version = self.next_version;
    }

    /// Record the current state as a head. A version already recorded is not
    /// cloned again.
    fn record_head(&mut self) -> u64 {
        let version = self.state.version;
        if !self.heads.contains_key(&version) {
            self.heads.insert(version, self.state.clone());
            while self.heads.len() > MAX_RECORDED_HEADS + 1 {
                let oldest = self
                    .heads
                    .keys()
                    .copied()
                    .find(|v| *v != GENESIS_VERSION);
                match oldest {
                    Some(v) => {
                        self.heads.remove(&v);
                        tracing::debug!(version = v, "evicted oldest recorded head");
                    }
                    None => break,
                }
            }
        }
        version
    }
}

pub struct LocalChain {
    inner: Mutex<Inner>,
    chain_id: u64,
    spec_id: SpecId,
    block_gas_limit: u64,
    accounts: Vec<Address>,
}

impl LocalChain {
    pub fn new(profile: &NetworkProfile) -> Self {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self::with_genesis_timestamp(profile, now)
    }

    pub fn with_genesis_timestamp(profile: &NetworkProfile, timestamp: u64) -> Self {
        let mut db = CacheDB::new(EmptyDB::default());
        let balance = RU256::from(DEV_ACCOUNT_BALANCE_ETH) * RU256::from(WEI_PER_ETH);
        for account in DEV_ACCOUNTS {
            db.insert_account_info(
                to_revm_address(account),
                AccountInfo {
                    balance,
                    ..AccountInfo::default()
                },
            );
        }

        let genesis = ChainState {
            db,
            block_number: 0,
            timestamp,
            version: GENESIS_VERSION,
        };
        let mut heads = BTreeMap::new();
        heads.insert(GENESIS_VERSION, genesis.clone());

        tracing::debug!(
            chain_id = profile.chain_id,
            hardfork = ?profile.hardfork,
            "local chain initialised"
        );
        Self {
            inner: Mutex::new(Inner {
                state: genesis,
                next_version: GENESIS_VERSION,
                snapshots: Vec::new(),
                next_snapshot: 1,
                heads,
            }),
            chain_id: profile.chain_id,
            spec_id: spec_for(profile.hardfork),
            block_gas_limit: profile.block_gas_limit,
            accounts: DEV_ACCOUNTS.to_vec(),
        }
    }

    fn execute(
        &self,
        state: &mut ChainState,
        tx: &TxRequest,
        commit: bool,
    ) -> Result<ExecutionResult, ChainError> {
        let (number, timestamp) = if commit {
            (state.block_number + 1, state.timestamp + 1)
        } else {
            (state.block_number, state.timestamp)
        };
        let caller = to_revm_address(tx.from);
        let kind = match tx.to {
            Some(to) => TxKind::Call(to_revm_address(to)),
            None => TxKind::Create,
        };
        let data = RBytes::copy_from_slice(tx.data.as_ref());
        let value = to_revm_u256(tx.value);
        let block_gas_limit = self.block_gas_limit;
        let gas_limit = tx.gas.unwrap_or(block_gas_limit).min(block_gas_limit);
        let chain_id = self.chain_id;

        let outcome = {
            let mut evm = Evm::builder()
                .with_db(&mut state.db)
                .with_spec_id(self.spec_id)
                .modify_cfg_env(|cfg| {
                    cfg.chain_id = chain_id;
                })
                .modify_block_env(|block| {
                    block.number = RU256::from(number);
                    block.timestamp = RU256::from(timestamp);
                    block.gas_limit = RU256::from(block_gas_limit);
                    block.basefee = RU256::ZERO;
                })
                .modify_tx_env(|env| {
                    env.caller = caller;
                    env.transact_to = kind;
                    env.data = data;
                    env.value = value;
                    env.gas_limit = gas_limit;
                    env.gas_price = RU256::ZERO;
                    env.nonce = None;
                })
                .build();
            if commit {
                evm.transact_commit()
            } else {
                evm.transact().map(|res| res.result)
            }
        };

        let result = outcome.map_err(|err| ChainError::Execution(format!("{err:?}")))?;
        if commit {
            state.block_number = number;
            state.timestamp = timestamp;
        }
        Ok(result)
    }

    fn result_to_receipt(result: ExecutionResult) -> Result<(TxReceipt, Bytes), ChainError> {
        match result {
            ExecutionResult::Success {
                gas_used,
                logs,
                output,
                ..
            } => {
                let contract_address = match &output {
                    Output::Create(_, created) => created.map(from_revm_address),
                    Output::Call(_) => None,
                };
                let logs = logs
                    .into_iter()
                    .map(|log| {
                        Log::new_unchecked(
                            from_revm_address(log.address),
                            log.data
                                .topics()
                                .iter()
                                .map(|topic| B256::from_slice(topic.as_slice()))
                                .collect(),
                            Bytes::copy_from_slice(log.data.data.as_ref()),
                        )
                    })
                    .collect();
                let returned = Bytes::copy_from_slice(output.into_data().as_ref());
                Ok((
                    TxReceipt {
                        tx_hash: None,
                        status: true,
                        contract_address,
                        gas_used,
                        logs,
                    },
                    returned,
                ))
            }
            ExecutionResult::Revert { output, .. } => {
                let data = Bytes::copy_from_slice(output.as_ref());
                Err(ChainError::Reverted {
                    reason: decode_revert_reason(&data),
                    data,
                })
            }
            ExecutionResult::Halt { reason, .. } => Err(ChainError::Halted(format!("{reason:?}"))),
        }
    }
}

#[async_trait]
impl ChainBackend for LocalChain {
    fn label(&self) -> &'static str {
        "local-evm"
    }

    async fn accounts(&self) -> Result<Vec<Address>, ChainError> {
        Ok(self.accounts.clone())
    }

    async fn chain_id(&self) -> Result<u64, ChainError> {
        Ok(self.chain_id)
    }

    async fn call(&self, tx: &TxRequest) -> Result<Bytes, ChainError> {
        let mut inner = self.inner.lock().await;
        let result = self.execute(&mut inner.state, tx, false)?;
        Self::result_to_receipt(result).map(|(_, returned)| returned)
    }

    async fn send(&self, tx: &TxRequest) -> Result<TxReceipt, ChainError> {
        let mut inner = self.inner.lock().await;
        let result = self.execute(&mut inner.state, tx, true)?;
        inner.bump_version();
        Self::result_to_receipt(result).map(|(receipt, _)| receipt)
    }

    async fn impersonate(&self, account: Address) -> Result<(), ChainError> {
        // Transactions are never signature-checked here; every sender is usable.
        tracing::trace!(%account, "impersonation is implicit on the local chain");
        Ok(())
    }

    async fn set_balance(&self, account: Address, amount: U256) -> Result<(), ChainError> {
        let mut inner = self.inner.lock().await;
        let key = to_revm_address(account);
        let mut info = inner
            .state
            .db
            .basic_ref(key)
            .ok()
            .flatten()
            .unwrap_or_default();
        info.balance = to_revm_u256(amount);
        inner.state.db.insert_account_info(key, info);
        inner.bump_version();
        Ok(())
    }

    async fn balance(&self, account: Address) -> Result<U256, ChainError> {
        let inner = self.inner.lock().await;
        let info = inner
            .state
            .db
            .basic_ref(to_revm_address(account))
            .ok()
            .flatten();
        Ok(info.map(|i| from_revm_u256(i.balance)).unwrap_or(U256::ZERO))
    }

    async fn block_timestamp(&self) -> Result<u64, ChainError> {
        Ok(self.inner.lock().await.state.timestamp)
    }

    async fn increase_time(&self, seconds: u64) -> Result<(), ChainError> {
        let mut inner = self.inner.lock().await;
        inner.state.timestamp = inner.state.timestamp.saturating_add(seconds);
        inner.state.block_number += 1;
        inner.bump_version();
        Ok(())
    }

    async fn snapshot(&self) -> Result<SnapshotId, ChainError> {
        let mut inner = self.inner.lock().await;
        let id = inner.next_snapshot;
        inner.next_snapshot += 1;
        let state = inner.state.clone();
        inner.snapshots.push((id, state));
        Ok(SnapshotId(format_version(id)))
    }

    async fn revert(&self, id: &SnapshotId) -> Result<bool, ChainError> {
        let Some(wanted) = parse_version(&id.0) else {
            return Ok(false);
        };
        let mut inner = self.inner.lock().await;
        let Some(pos) = inner.snapshots.iter().position(|(sid, _)| *sid == wanted) else {
            return Ok(false);
        };
        let Some((_, state)) = inner.snapshots.drain(pos..).next() else {
            return Ok(false);
        };
        inner.state = state;
        Ok(true)
    }

    async fn head(&self) -> Result<Option<HeadId>, ChainError> {
        let version = self.inner.lock().await.record_head();
        Ok(Some(HeadId(format_version(version))))
    }

    async fn set_head(&self, head: &HeadId) -> Result<(), ChainError> {
        let version =
            parse_version(&head.0).ok_or_else(|| ChainError::UnknownHead(head.0.clone()))?;
        let mut inner = self.inner.lock().await;
        let state = inner
            .heads
            .get(&version)
            .cloned()
            .ok_or_else(|| ChainError::UnknownHead(head.0.clone()))?;
        inner.state = state;
        Ok(())
    }
}
