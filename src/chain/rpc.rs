//! JSON-RPC backend for a Hardhat/Anvil node or a remote simulated fork.
//!
//! Remote forks expose their state pointer through a `Head` HTTP header. When
//! head tracking is on, every response's `Head` is remembered and every request
//! carries the remembered value, so `set_head` rewinds all later traffic.

use crate::chain::revert::{decode_revert_reason, parse_hex_payload, reason_from_message};
use crate::chain::{ChainBackend, HeadId, SnapshotId, TxReceipt, TxRequest};
use crate::config::networks::{ForkSource, NodeDialect};
use crate::error::ChainError;
use crate::utils::error::compact_error_message;
use alloy::primitives::aliases::U64;
use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::rpc::types::{TransactionInput, TransactionReceipt, TransactionRequest};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub const HEAD_HEADER: &str = "Head";
const RPC_ERR_MAX_LEN: usize = 260;
const RECEIPT_POLL_ATTEMPTS: usize = 50;
const RECEIPT_POLL_INTERVAL_MS: u64 = 100;

pub struct RpcChain {
    client: reqwest::Client,
    url: reqwest::Url,
    dialect: NodeDialect,
    next_id: AtomicU64,
    track_head: bool,
    head: Mutex<Option<String>>,
    gas_price: Option<u128>,
}

impl RpcChain {
    pub fn new(
        url: &str,
        dialect: NodeDialect,
        track_head: bool,
        timeout: Duration,
    ) -> Result<Self, ChainError> {
        let url = url
            .trim()
            .parse::<reqwest::Url>()
            .map_err(|err| ChainError::Transport(format!("invalid RPC url `{url}`: {err}")))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ChainError::Transport(format!("failed to build HTTP client: {err}")))?;
        Ok(Self {
            client,
            url,
            dialect,
            next_id: AtomicU64::new(1),
            track_head,
            head: Mutex::new(None),
            gas_price: None,
        })
    }

    /// Send `gasPrice` with every transaction, as the network profile prescribes.
    pub fn with_gas_price(mut self, gas_price_wei: u128) -> Self {
        self.gas_price = Some(gas_price_wei);
        self
    }

    /// Reset the node onto a fork of `source`.
    pub async fn reset_to_fork(&self, source: &ForkSource) -> Result<(), ChainError> {
        self.request(self.dialect.reset_method(), fork_reset_params(source))
            .await?;
        tracing::info!(block = source.block_number, "node reset onto mainnet fork");
        Ok(())
    }

    fn tx_json(&self, tx: &TxRequest) -> Result<Value, ChainError> {
        to_json(&tx_request(tx, self.gas_price), "transaction request")
    }

    fn current_head(&self) -> Option<String> {
        match self.head.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn store_head(&self, head: String) {
        match self.head.lock() {
            Ok(mut guard) => *guard = Some(head),
            Err(poisoned) => *poisoned.into_inner() = Some(head),
        }
    }

    pub async fn request(&self, method: &str, params: Value) -> Result<Value, ChainError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let mut builder = self.client.post(self.url.clone()).json(&body);
        if self.track_head {
            if let Some(head) = self.current_head() {
                builder = builder.header(HEAD_HEADER, head);
            }
        }

        let resp = builder.send().await.map_err(|err| {
            ChainError::Transport(compact_error_message(
                &format!("{method} transport error: {err}"),
                RPC_ERR_MAX_LEN,
            ))
        })?;
        if self.track_head {
            if let Some(head) = resp
                .headers()
                .get(HEAD_HEADER)
                .and_then(|v| v.to_str().ok())
                .filter(|v| !v.is_empty())
            {
                self.store_head(head.to_string());
            }
        }

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|err| ChainError::Transport(format!("{method} read error: {err}")))?;
        if !status.is_success() {
            return Err(ChainError::Transport(compact_error_message(
                &format!("{method} http error {status}: {text}"),
                RPC_ERR_MAX_LEN,
            )));
        }

        let parsed: Value = serde_json::from_str(&text)
            .map_err(|err| ChainError::decode(format!("{method} response"), err))?;
        if let Some(error) = parsed.get("error") {
            let mapped = map_rpc_error(error);
            tracing::debug!(method, error = %mapped, "rpc call failed");
            return Err(mapped);
        }
        parsed
            .get("result")
            .cloned()
            .ok_or_else(|| ChainError::decode(format!("{method} response"), "missing result"))
    }

    async fn fetch_receipt(&self, hash: B256) -> Result<Value, ChainError> {
        for _ in 0..RECEIPT_POLL_ATTEMPTS {
            let receipt = self
                .request("eth_getTransactionReceipt", json!([hash_hex(hash)]))
                .await?;
            if !receipt.is_null() {
                return Ok(receipt);
            }
            tokio::time::sleep(Duration::from_millis(RECEIPT_POLL_INTERVAL_MS)).await;
        }
        Err(ChainError::Transport(format!(
            "receipt for {} not available after {} polls",
            hash_hex(hash),
            RECEIPT_POLL_ATTEMPTS
        )))
    }
}

fn hash_hex(hash: B256) -> String {
    format!("{hash:#x}")
}

fn address_hex(address: Address) -> String {
    format!("{address:#x}")
}

fn quantity(value: U256) -> String {
    format!("{value:#x}")
}

fn to_json<T: Serialize>(value: &T, what: &str) -> Result<Value, ChainError> {
    serde_json::to_value(value).map_err(|err| ChainError::decode(what, err))
}

fn decode<T: DeserializeOwned>(value: Value, what: &str) -> Result<T, ChainError> {
    serde_json::from_value(value).map_err(|err| ChainError::decode(what, err))
}

fn decode_u64(value: Value, what: &str) -> Result<u64, ChainError> {
    decode::<U64>(value, what).map(|q| q.to::<u64>())
}

/// `eth_call` / `eth_sendTransaction` request for `tx`.
///
/// Calldata goes out as both `input` and `data`, since older Hardhat nodes
/// only read `data`.
pub fn tx_request(tx: &TxRequest, gas_price: Option<u128>) -> TransactionRequest {
    let mut req = TransactionRequest::default()
        .from(tx.from)
        .input(TransactionInput {
            input: Some(tx.data.clone()),
            data: Some(tx.data.clone()),
        });
    if let Some(to) = tx.to {
        req = req.to(to);
    }
    if !tx.value.is_zero() {
        req = req.value(tx.value);
    }
    req.gas = tx.gas.map(Into::into);
    req.gas_price = gas_price;
    req
}

/// `hardhat_reset` / `anvil_reset` parameters that fork `source`.
pub fn fork_reset_params(source: &ForkSource) -> Value {
    json!([{
        "forking": {
            "jsonRpcUrl": source.url,
            "blockNumber": source.block_number,
        }
    }])
}

/// Map a JSON-RPC `error` member onto [`ChainError`].
///
/// Revert data may sit directly in `data` (Anvil, geth) or in `data.data`
/// (Hardhat). Without data, Hardhat's `reverted with reason string` message
/// still yields the reason.
pub fn map_rpc_error(error: &Value) -> ChainError {
    let code = error.get("code").and_then(Value::as_i64).unwrap_or(0);
    let message = error
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();

    let data = error.get("data").and_then(|data| match data {
        Value::String(raw) => parse_hex_payload(raw),
        Value::Object(obj) => obj
            .get("data")
            .and_then(Value::as_str)
            .and_then(parse_hex_payload),
        _ => None,
    });

    if let Some(data) = data {
        let reason = decode_revert_reason(&data).or_else(|| reason_from_message(&message));
        return ChainError::Reverted { reason, data };
    }
    if let Some(reason) = reason_from_message(&message) {
        return ChainError::Reverted {
            reason: Some(reason),
            data: Bytes::new(),
        };
    }
    if message.to_ascii_lowercase().contains("revert") {
        return ChainError::Reverted {
            reason: None,
            data: Bytes::new(),
        };
    }
    ChainError::Rpc {
        code,
        message: compact_error_message(&message, RPC_ERR_MAX_LEN),
    }
}

/// Parse an `eth_getTransactionReceipt` result.
///
/// Pre-typed-transaction nodes omit `type`; such receipts are read as legacy.
pub fn parse_receipt(mut value: Value) -> Result<TxReceipt, ChainError> {
    if let Value::Object(obj) = &mut value {
        obj.entry("type").or_insert_with(|| json!("0x0"));
    }
    let receipt: TransactionReceipt = decode(value, "transaction receipt")?;
    Ok(TxReceipt {
        tx_hash: Some(receipt.transaction_hash),
        status: receipt.inner.status(),
        contract_address: receipt.contract_address,
        gas_used: u64::try_from(receipt.gas_used).unwrap_or(u64::MAX),
        logs: receipt
            .inner
            .logs()
            .iter()
            .map(|log| log.inner.clone())
            .collect(),
    })
}

#[async_trait]
impl ChainBackend for RpcChain {
    fn label(&self) -> &'static str {
        if self.track_head {
            "rpc-fork"
        } else {
            "rpc-node"
        }
    }

    async fn accounts(&self) -> Result<Vec<Address>, ChainError> {
        let result = self.request("eth_accounts", json!([])).await?;
        decode(result, "eth_accounts")
    }

    async fn chain_id(&self) -> Result<u64, ChainError> {
        let result = self.request("eth_chainId", json!([])).await?;
        decode_u64(result, "eth_chainId")
    }

    async fn call(&self, tx: &TxRequest) -> Result<Bytes, ChainError> {
        let result = self
            .request("eth_call", json!([self.tx_json(tx)?, "latest"]))
            .await?;
        decode(result, "eth_call result")
    }

    async fn send(&self, tx: &TxRequest) -> Result<TxReceipt, ChainError> {
        let result = self
            .request("eth_sendTransaction", json!([self.tx_json(tx)?]))
            .await?;
        let hash: B256 = decode(result, "transaction hash")?;
        let receipt = parse_receipt(self.fetch_receipt(hash).await?)?;
        if receipt.status {
            return Ok(receipt);
        }

        // Nodes that mine failed transactions only report status 0; replay for the reason.
        tracing::debug!(tx = %hash_hex(hash), "transaction failed, replaying for revert data");
        match self.call(tx).await {
            Err(err @ ChainError::Reverted { .. }) => Err(err),
            _ => Err(ChainError::Reverted {
                reason: None,
                data: Bytes::new(),
            }),
        }
    }

    async fn impersonate(&self, account: Address) -> Result<(), ChainError> {
        self.request(self.dialect.impersonate_method(), json!([address_hex(account)]))
            .await
            .map(|_| ())
    }

    async fn set_balance(&self, account: Address, amount: U256) -> Result<(), ChainError> {
        self.request(
            self.dialect.set_balance_method(),
            json!([address_hex(account), quantity(amount)]),
        )
        .await
        .map(|_| ())
    }

    async fn balance(&self, account: Address) -> Result<U256, ChainError> {
        let result = self
            .request("eth_getBalance", json!([address_hex(account), "latest"]))
            .await?;
        decode(result, "eth_getBalance")
    }

    async fn block_timestamp(&self) -> Result<u64, ChainError> {
        let block = self
            .request("eth_getBlockByNumber", json!(["latest", false]))
            .await?;
        decode_u64(block["timestamp"].clone(), "block timestamp")
    }

    async fn increase_time(&self, seconds: u64) -> Result<(), ChainError> {
        self.request("evm_increaseTime", json!([seconds])).await?;
        self.request("evm_mine", json!([])).await.map(|_| ())
    }

    async fn snapshot(&self) -> Result<SnapshotId, ChainError> {
        let result = self.request("evm_snapshot", json!([])).await?;
        let id = match result {
            Value::String(id) => id,
            Value::Number(n) => format!("0x{:x}", n.as_u64().unwrap_or(0)),
            other => return Err(ChainError::decode("evm_snapshot", format!("unexpected {other}"))),
        };
        Ok(SnapshotId(id))
    }

    async fn revert(&self, id: &SnapshotId) -> Result<bool, ChainError> {
        let result = self.request("evm_revert", json!([id.0])).await?;
        Ok(result.as_bool().unwrap_or(false))
    }

    async fn head(&self) -> Result<Option<HeadId>, ChainError> {
        if !self.track_head {
            return Err(ChainError::Unsupported {
                backend: self.label(),
                operation: "head",
            });
        }
        Ok(self.current_head().map(HeadId))
    }

    async fn set_head(&self, head: &HeadId) -> Result<(), ChainError> {
        if !self.track_head {
            return Err(ChainError::Unsupported {
                backend: self.label(),
                operation: "set_head",
            });
        }
        self.store_head(head.0.clone());
        Ok(())
    }
}
