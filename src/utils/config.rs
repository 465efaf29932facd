use crate::config::networks::{NetworkProfile, NodeDialect};
use crate::error::{ConfigError, Result};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";
/// Per-case timeout, matching the mocha configuration of the Solidity test suites.
const DEFAULT_CASE_TIMEOUT_MS: u64 = 400_000;
const DEFAULT_RPC_TIMEOUT_MS: u64 = 30_000;

/// Runtime configuration resolved from `HARNESS_*` environment variables.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    pub rpc_url: String,
    /// Remote simulated fork: isolate groups with head get/set instead of snapshots.
    pub fork_head: bool,
    pub dialect: NodeDialect,
    pub network: NetworkProfile,
    pub deployments_dir: Option<PathBuf>,
    pub artifacts_dir: Option<PathBuf>,
    pub runner: RunnerSettings,
    pub rpc_timeout: Duration,
}

#[derive(Debug, Clone, Copy)]
pub struct RunnerSettings {
    pub case_timeout: Duration,
    pub bail: bool,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            case_timeout: Duration::from_millis(DEFAULT_CASE_TIMEOUT_MS),
            bail: true,
        }
    }
}

pub fn parse_bool_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn validate_http_url(name: &str, raw: &str) -> Result<()> {
    let parsed = raw.parse::<reqwest::Url>().map_err(|e| {
        ConfigError::Invalid(format!("{name} must be a valid URL, got `{raw}`: {e}"))
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::Invalid(format!(
            "{name} must use http(s) scheme, got `{other}`"
        ))
        .into()),
    }
}

/// Source of raw configuration values. The process environment in production,
/// a fixed table in tests.
pub trait ConfigSource {
    fn get(&self, key: &str) -> Option<String>;
}

pub struct ProcessEnv;

impl ConfigSource for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

impl<const N: usize> ConfigSource for [(&str, &str); N] {
    fn get(&self, key: &str) -> Option<String> {
        self.iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

fn read_bool(source: &dyn ConfigSource, key: &str, default: bool) -> Result<bool> {
    match source.get(key) {
        None => Ok(default),
        Some(raw) => parse_bool_flag(&raw).ok_or_else(|| {
            ConfigError::Invalid(format!("{key} must be a boolean flag, got `{raw}`")).into()
        }),
    }
}

fn read_millis(
    source: &dyn ConfigSource,
    key: &str,
    default_ms: u64,
    range: std::ops::RangeInclusive<u64>,
) -> Result<Duration> {
    let Some(raw) = source.get(key) else {
        return Ok(Duration::from_millis(default_ms));
    };
    let value = raw
        .parse::<u64>()
        .map_err(|e| {
            ConfigError::Invalid(format!("{key} must be milliseconds, got `{raw}`: {e}"))
        })?;
    if !range.contains(&value) {
        return Err(ConfigError::Invalid(format!(
            "{key} must be within {}..={} ms, got {value}",
            range.start(),
            range.end()
        ))
        .into());
    }
    Ok(Duration::from_millis(value))
}

impl HarnessConfig {
    pub fn load() -> Result<Self> {
        Self::from_source(&ProcessEnv)
    }

    pub fn from_source(source: &dyn ConfigSource) -> Result<Self> {
        let fork_head = read_bool(source, "HARNESS_FORK_HEAD", false)?;
        let dialect = match source.get("HARNESS_NODE_DIALECT") {
            None => NodeDialect::Hardhat,
            Some(raw) => NodeDialect::parse(&raw).ok_or_else(|| {
                ConfigError::Invalid(format!(
                    "HARNESS_NODE_DIALECT must be `hardhat` or `anvil`, got `{raw}`"
                ))
            })?,
        };

        let network_name = source
            .get("HARNESS_NETWORK")
            .unwrap_or_else(|| "hardhat".to_string());
        let mainnet_fork = read_bool(source, "MAINNET_FORK", false)?;
        let mainnet_rpc_url = source.get("HARNESS_MAINNET_RPC_URL");
        if mainnet_fork && mainnet_rpc_url.is_none() {
            return Err(ConfigError::Missing(
                "HARNESS_MAINNET_RPC_URL must be set when MAINNET_FORK=true".to_string(),
            )
            .into());
        }
        if let Some(url) = mainnet_rpc_url.as_deref() {
            validate_http_url("HARNESS_MAINNET_RPC_URL", url)?;
        }
        let fork_url = if mainnet_fork { mainnet_rpc_url } else { None };
        let network = NetworkProfile::by_name(&network_name, fork_url).ok_or_else(|| {
            ConfigError::Invalid(format!(
                "HARNESS_NETWORK must be `hardhat` or `ganache`, got `{network_name}`"
            ))
        })?;

        let rpc_url = source
            .get("HARNESS_RPC_URL")
            .or_else(|| network.url.map(str::to_string))
            .unwrap_or_else(|| DEFAULT_RPC_URL.to_string());
        validate_http_url("HARNESS_RPC_URL", &rpc_url)?;

        let deployments_dir = source.get("HARNESS_DEPLOYMENTS_DIR").map(PathBuf::from);
        let artifacts_dir = source.get("HARNESS_ARTIFACTS_DIR").map(PathBuf::from);

        let runner = RunnerSettings {
            case_timeout: read_millis(
                source,
                "HARNESS_CASE_TIMEOUT_MS",
                DEFAULT_CASE_TIMEOUT_MS,
                1..=3_600_000,
            )?,
            bail: read_bool(source, "HARNESS_BAIL", true)?,
        };
        let rpc_timeout = read_millis(
            source,
            "HARNESS_RPC_TIMEOUT_MS",
            DEFAULT_RPC_TIMEOUT_MS,
            250..=600_000,
        )?;

        Ok(Self {
            rpc_url,
            fork_head,
            dialect,
            network,
            deployments_dir,
            artifacts_dir,
            runner,
            rpc_timeout,
        })
    }

    /// Whether the on-chain suites have what they need: an explicitly configured
    /// node (a URL, or a network with a fixed endpoint) and a deployments directory.
    pub fn on_chain_ready(source: &dyn ConfigSource) -> bool {
        let node = source.get("HARNESS_RPC_URL").is_some()
            || source
                .get("HARNESS_NETWORK")
                .and_then(|name| NetworkProfile::by_name(&name, None))
                .is_some_and(|profile| profile.url.is_some());
        node && source.get("HARNESS_DEPLOYMENTS_DIR").is_some()
    }

    /// Directory holding this network's hardhat-deploy records.
    pub fn network_deployments_dir(&self) -> Option<PathBuf> {
        self.deployments_dir
            .as_ref()
            .map(|dir| dir.join(self.network.name))
    }
}
