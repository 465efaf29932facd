use alloy::primitives::Bytes;
use alloy::sol_types::{Panic, Revert, SolError};

/// Decode revert output into a human-readable reason.
///
/// `Error(string)` yields the bare string so it can be compared against a
/// `require` message. `Panic(uint256)` renders as `panic_code=0x..`. Anything
/// else goes through `alloy`'s generic decoder. Empty output has no reason.
pub fn decode_revert_reason(output: &[u8]) -> Option<String> {
    if output.is_empty() {
        return None;
    }
    if let Ok(revert) = Revert::abi_decode(output, true) {
        return Some(revert.reason);
    }
    if let Ok(panic) = Panic::abi_decode(output, true) {
        return Some(format!("panic_code=0x{:x}", panic.code));
    }
    alloy::sol_types::decode_revert_reason(output)
}

/// Pull a reason out of Hardhat's message form,
/// `... reverted with reason string 'ONLY_EMISSION_ADMIN'`.
pub fn reason_from_message(message: &str) -> Option<String> {
    const MARKER: &str = "reverted with reason string '";
    let start = message.find(MARKER)? + MARKER.len();
    let rest = &message[start..];
    let end = rest.rfind('\'')?;
    Some(rest[..end].to_string())
}

/// Parse a `0x`-prefixed hex payload as returned in JSON-RPC error data.
pub fn parse_hex_payload(raw: &str) -> Option<Bytes> {
    let body = raw.trim().strip_prefix("0x")?;
    hex::decode(body).ok().map(Bytes::from)
}
