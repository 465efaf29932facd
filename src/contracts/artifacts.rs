use crate::chain::{ChainBackend, TxRequest};
use crate::error::{Result, SetupError};
use alloy::json_abi::JsonAbi;
use alloy::primitives::{Address, Bytes};
use anyhow::Context;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const DEBUG_SUFFIX: &str = ".dbg.json";
/// Placeholder marker solc leaves for unresolved library links.
const LINK_PLACEHOLDER: &str = "__";
/// Fixed prefix length of the creation code built by [`runtime_init_code`].
const INIT_PREFIX_LEN: u8 = 12;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HardhatArtifact {
    contract_name: String,
    abi: JsonAbi,
    bytecode: String,
}

/// Compiled contract ready for deployment.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub name: String,
    pub abi: JsonAbi,
    pub bytecode: Bytes,
}

impl Artifact {
    /// Creation code followed by ABI-encoded constructor arguments.
    pub fn init_code(&self, ctor_args: &[u8]) -> Bytes {
        let mut code = Vec::with_capacity(self.bytecode.len() + ctor_args.len());
        code.extend_from_slice(&self.bytecode);
        code.extend_from_slice(ctor_args);
        code.into()
    }
}

fn read_artifact(path: &Path) -> anyhow::Result<HardhatArtifact> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

/// Parse creation bytecode, rejecting unlinked libraries.
pub fn parse_bytecode(name: &str, raw: &str) -> std::result::Result<Bytes, SetupError> {
    let invalid = |reason: String| SetupError::InvalidArtifact {
        name: name.to_string(),
        reason,
    };
    let body = raw.trim();
    let body = body.strip_prefix("0x").unwrap_or(body);
    if body.contains(LINK_PLACEHOLDER) {
        return Err(invalid("bytecode has unlinked library references".to_string()));
    }
    if body.is_empty() {
        return Err(invalid("bytecode is empty (abstract contract or interface)".to_string()));
    }
    hex::decode(body)
        .map(Bytes::from)
        .map_err(|err| invalid(format!("bytecode is not hex: {err}")))
}

/// Index of Hardhat artifact files keyed by contract name.
#[derive(Debug, Clone, Default)]
pub struct ArtifactStore {
    paths: HashMap<String, PathBuf>,
}

impl ArtifactStore {
    /// Walk `root` and index every `<Name>.json` artifact. `.dbg.json` files and
    /// `build-info` are skipped; for duplicate names the first file found wins.
    pub fn open(root: &Path) -> Result<Self> {
        let mut store = Self::default();
        let mut pending = vec![root.to_path_buf()];
        while let Some(dir) = pending.pop() {
            let entries = std::fs::read_dir(&dir).map_err(|err| SetupError::InvalidArtifact {
                name: dir.display().to_string(),
                reason: format!("unreadable artifacts directory: {err}"),
            })?;
            let mut entries: Vec<PathBuf> = entries.flatten().map(|e| e.path()).collect();
            entries.sort();
            for path in entries {
                if path.is_dir() {
                    if path.file_name().is_some_and(|n| n == "build-info") {
                        continue;
                    }
                    pending.push(path);
                    continue;
                }
                let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                    continue;
                };
                if file_name.ends_with(DEBUG_SUFFIX) {
                    continue;
                }
                let Some(name) = file_name.strip_suffix(".json") else {
                    continue;
                };
                if store.paths.contains_key(name) {
                    tracing::debug!(
                        contract = name,
                        path = %path.display(),
                        "duplicate artifact ignored"
                    );
                    continue;
                }
                store.paths.insert(name.to_string(), path.clone());
            }
        }
        tracing::debug!(
            root = %root.display(),
            artifacts = store.paths.len(),
            "artifact store indexed"
        );
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.paths.contains_key(name)
    }

    pub fn load(&self, name: &str) -> std::result::Result<Artifact, SetupError> {
        let path = self
            .paths
            .get(name)
            .ok_or_else(|| SetupError::MissingArtifact(name.to_string()))?;
        let raw = read_artifact(path).map_err(|err| SetupError::InvalidArtifact {
            name: name.to_string(),
            reason: format!("{err:#}"),
        })?;
        if raw.contract_name != name {
            tracing::debug!(
                contract = name,
                declared = %raw.contract_name,
                "artifact file name and contractName differ"
            );
        }
        let bytecode = parse_bytecode(name, &raw.bytecode)?;
        Ok(Artifact {
            name: name.to_string(),
            abi: raw.abi,
            bytecode,
        })
    }

    /// Deploy contract `name` from `from` and return the created address.
    pub async fn deploy(
        &self,
        chain: &dyn ChainBackend,
        from: Address,
        name: &str,
        ctor_args: &[u8],
    ) -> Result<Address> {
        let artifact = self.load(name)?;
        deploy_code(chain, from, artifact.init_code(ctor_args)).await
    }
}

/// Send a create transaction and return the new contract's address.
pub async fn deploy_code(
    chain: &dyn ChainBackend,
    from: Address,
    init_code: Bytes,
) -> Result<Address> {
    let receipt = chain.send(&TxRequest::create(from, init_code)).await?;
    let address = receipt
        .contract_address
        .ok_or(SetupError::NoCreatedAddress { from })?;
    tracing::debug!(%address, %from, gas_used = receipt.gas_used, "contract created");
    Ok(address)
}

/// Creation code that copies `runtime` into memory and returns it.
pub fn runtime_init_code(runtime: &[u8]) -> std::result::Result<Bytes, SetupError> {
    let len = u16::try_from(runtime.len()).map_err(|_| SetupError::InvalidArtifact {
        name: "runtime".to_string(),
        reason: format!("runtime of {} bytes does not fit PUSH2", runtime.len()),
    })?;
    let [hi, lo] = len.to_be_bytes();
    let mut code = vec![
        0x61, hi, lo, // PUSH2 len
        0x80, // DUP1
        0x60, INIT_PREFIX_LEN, // PUSH1 offset
        0x60, 0x00, // PUSH1 0
        0x39, // CODECOPY
        0x60, 0x00, // PUSH1 0
        0xf3, // RETURN
    ];
    code.extend_from_slice(runtime);
    Ok(code.into())
}
