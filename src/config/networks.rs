use alloy::primitives::{address, Address};

pub const DEFAULT_BLOCK_GAS_LIMIT: u64 = 12_450_000;
pub const HARDHAT_CHAIN_ID: u64 = 31337;
const HARDHAT_GAS_PRICE_WEI: u128 = 8_000_000_000;
const MAINNET_FORK_BLOCK: u64 = 12_012_081;

/// The first ten accounts of the default hardhat/anvil mnemonic.
pub const DEV_ACCOUNTS: [Address; 10] = [
    address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266"),
    address!("70997970C51812dc3A010C7d01b50e0d17dc79C8"),
    address!("3C44CdDdB6a900fa2b585dd299e03d12FA4293BC"),
    address!("90F79bf6EB2c4f870365E785982E1f101E93b906"),
    address!("15d34AAf54267DB7D7c367839AAf71A00a2C6A65"),
    address!("9965507D1a55bcC2695C58ba16FB37d819B0A4dc"),
    address!("976EA74026E726554dB657fA54763abd0C3a0aa9"),
    address!("14dC79964da2C08b23698B3D3cc7Ca32193d9955"),
    address!("23618e81E3f5cdF7f54C3d65f7FBc0aBf5B21E8f"),
    address!("a0Ee7A142d267C1f36714E4a8F75612F20a79720"),
];

/// JSON-RPC method family for node-specific cheat methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeDialect {
    Hardhat,
    Anvil,
}

impl NodeDialect {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "hardhat" => Some(Self::Hardhat),
            "anvil" | "foundry" => Some(Self::Anvil),
            _ => None,
        }
    }

    pub fn impersonate_method(self) -> &'static str {
        match self {
            Self::Hardhat => "hardhat_impersonateAccount",
            Self::Anvil => "anvil_impersonateAccount",
        }
    }

    pub fn set_balance_method(self) -> &'static str {
        match self {
            Self::Hardhat => "hardhat_setBalance",
            Self::Anvil => "anvil_setBalance",
        }
    }

    pub fn reset_method(self) -> &'static str {
        match self {
            Self::Hardhat => "hardhat_reset",
            Self::Anvil => "anvil_reset",
        }
    }
}

/// EVM rule set the local chain executes under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hardfork {
    Berlin,
    London,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForkSource {
    pub url: String,
    pub block_number: u64,
}

#[derive(Debug, Clone)]
pub struct NetworkProfile {
    pub name: &'static str,
    pub chain_id: u64,
    pub hardfork: Hardfork,
    pub block_gas_limit: u64,
    /// Sent as `gasPrice` on every transaction.
    pub gas_price_wei: u128,
    /// Endpoint used when `HARNESS_RPC_URL` is unset.
    pub url: Option<&'static str>,
    /// Upstream the node is reset onto before bootstrap.
    pub fork: Option<ForkSource>,
}

impl NetworkProfile {
    pub fn by_name(name: &str, mainnet_fork_url: Option<String>) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "hardhat" => Some(Self::hardhat(mainnet_fork_url)),
            "ganache" => Some(Self::ganache()),
            _ => None,
        }
    }

    pub fn hardhat(mainnet_fork_url: Option<String>) -> Self {
        Self {
            name: "hardhat",
            chain_id: HARDHAT_CHAIN_ID,
            hardfork: Hardfork::Berlin,
            block_gas_limit: DEFAULT_BLOCK_GAS_LIMIT,
            gas_price_wei: HARDHAT_GAS_PRICE_WEI,
            url: None,
            fork: mainnet_fork_url.map(|url| ForkSource {
                url,
                block_number: MAINNET_FORK_BLOCK,
            }),
        }
    }

    pub fn ganache() -> Self {
        Self {
            name: "ganache",
            chain_id: 1337,
            hardfork: Hardfork::London,
            block_gas_limit: DEFAULT_BLOCK_GAS_LIMIT,
            gas_price_wei: HARDHAT_GAS_PRICE_WEI,
            url: Some("http://ganache:8545"),
            fork: None,
        }
    }
}
