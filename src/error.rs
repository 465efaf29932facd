use alloy::primitives::{Address, Bytes};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, HarnessError>;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("setup error: {0}")]
    Setup(#[from] SetupError),
    #[error("chain error: {0}")]
    Chain(#[from] ChainError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

/// Class of token listing a symbol is resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenClass {
    Wrapped,
    Reserve,
}

impl TokenClass {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Wrapped => "HToken",
            Self::Reserve => "Reserve",
        }
    }
}

/// Errors that make the environment unusable. Any of these halts the run.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("Missing {} address for symbol(s): {}", .class.as_str(), .symbols.join(", "))]
    MissingSymbols {
        class: TokenClass,
        symbols: Vec<String>,
    },
    #[error("missing deployment `{0}`")]
    MissingDeployment(String),
    #[error("missing artifact `{0}`")]
    MissingArtifact(String),
    #[error("artifact `{name}` is unusable: {reason}")]
    InvalidArtifact { name: String, reason: String },
    #[error("need at least {required} signers, node exposes {available}")]
    NotEnoughSigners { required: usize, available: usize },
    #[error("named account `{0}` is not configured")]
    UnknownNamedAccount(String),
    #[error("named account `{name}` maps to index {index}, node exposes {available} signers")]
    NamedAccountOutOfRange {
        name: String,
        index: usize,
        available: usize,
    },
    #[error("contract creation from {from} returned no address")]
    NoCreatedAddress { from: Address },
    #[error("bootstrap step `{step}` failed: {source}")]
    Step {
        step: &'static str,
        #[source]
        source: ChainError,
    },
}

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("execution reverted: {}", .reason.as_deref().unwrap_or("<no reason>"))]
    Reverted { reason: Option<String>, data: Bytes },
    #[error("execution halted: {0}")]
    Halted(String),
    #[error("evm execution failed: {0}")]
    Execution(String),
    #[error("unknown head `{0}`")]
    UnknownHead(String),
    #[error("failed to decode {what}: {reason}")]
    Decode { what: String, reason: String },
    #[error("{backend} does not support `{operation}`")]
    Unsupported {
        backend: &'static str,
        operation: &'static str,
    },
}

impl ChainError {
    pub fn decode(what: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Decode {
            what: what.into(),
            reason: reason.to_string(),
        }
    }

    /// Revert reason when this error is a revert, `None` otherwise.
    pub fn revert_reason(&self) -> Option<&str> {
        match self {
            Self::Reverted { reason, .. } => reason.as_deref(),
            _ => None,
        }
    }

    pub fn is_revert(&self) -> bool {
        matches!(self, Self::Reverted { .. })
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required configuration: {0}")]
    Missing(String),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
