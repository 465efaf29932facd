use alloy::primitives::{Address, U256};
use hopelend_harness::chain::{ChainBackend, LocalChain, TxReceipt, TxRequest};
use hopelend_harness::config::networks::{NetworkProfile, DEV_ACCOUNTS};
use hopelend_harness::contracts::{deploy_code, runtime_init_code};
use hopelend_harness::error::ChainError;
use std::sync::Arc;

/// Empty calldata returns slot 0; a 32-byte word is stored into slot 0.
pub const STORAGE_RUNTIME: [u8; 24] = [
    0x36, // CALLDATASIZE
    0x15, // ISZERO
    0x60, 0x0c, // PUSH1 read
    0x57, // JUMPI
    0x60, 0x00, // PUSH1 0
    0x35, // CALLDATALOAD
    0x60, 0x00, // PUSH1 0
    0x55, // SSTORE
    0x00, // STOP
    0x5b, // JUMPDEST read
    0x60, 0x00, // PUSH1 0
    0x54, // SLOAD
    0x60, 0x00, // PUSH1 0
    0x52, // MSTORE
    0x60, 0x20, // PUSH1 32
    0x60, 0x00, // PUSH1 0
    0xf3, // RETURN
];

pub struct LocalEnv {
    pub chain: Arc<LocalChain>,
    pub storage: Address,
    pub owner: Address,
}

impl LocalEnv {
    pub async fn deploy() -> Self {
        let chain = Arc::new(LocalChain::with_genesis_timestamp(
            &NetworkProfile::hardhat(None),
            1_700_000_000,
        ));
        let owner = DEV_ACCOUNTS[0];
        let storage = deploy_code(
            chain.as_ref(),
            owner,
            runtime_init_code(&STORAGE_RUNTIME).expect("init code"),
        )
        .await
        .expect("storage contract deploys");
        Self {
            chain,
            storage,
            owner,
        }
    }

    pub fn backend(&self) -> Arc<dyn ChainBackend> {
        self.chain.clone()
    }

    pub async fn write(&self, value: u64) -> Result<TxReceipt, ChainError> {
        let word = U256::from(value).to_be_bytes::<32>().to_vec();
        self.chain
            .send(&TxRequest::call(self.owner, self.storage, word))
            .await
    }

    pub async fn read(&self) -> Result<U256, ChainError> {
        let out = self
            .chain
            .call(&TxRequest::call(self.owner, self.storage, Vec::new()))
            .await?;
        Ok(U256::from_be_slice(&out))
    }
}
