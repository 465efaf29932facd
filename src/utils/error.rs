/// Squash an RPC or EVM error message into a single bounded log line.
///
/// Hex payloads longer than `HEX_ELIDE_MIN` characters are replaced with their
/// length, and everything after a backtrace marker is dropped.
pub fn compact_error_message(message: &str, max_len: usize) -> String {
    let mut raw = message.to_string();
    if let Some((prefix, _)) = raw.split_once("Stack backtrace:") {
        raw = prefix.to_string();
    }

    let mut compact = String::with_capacity(raw.len().min(max_len.saturating_add(16)));
    let mut prev_ws = false;
    for token in raw.split_whitespace() {
        if prev_ws {
            compact.push(' ');
        }
        compact.push_str(&elide_hex_token(token));
        prev_ws = true;
        if compact.len() > max_len {
            break;
        }
    }
    if compact.len() <= max_len {
        compact
    } else {
        let mut cut = max_len;
        while !compact.is_char_boundary(cut) {
            cut -= 1;
        }
        compact.truncate(cut);
        compact.push_str("...(truncated)");
        compact
    }
}

const HEX_ELIDE_MIN: usize = 74;

fn elide_hex_token(token: &str) -> String {
    let trimmed = token.trim_matches(|c: char| c == '"' || c == ',' || c == '}' || c == '{');
    let Some(hex_body) = trimmed.strip_prefix("0x") else {
        return token.to_string();
    };
    if hex_body.len() + 2 < HEX_ELIDE_MIN || !hex_body.chars().all(|c| c.is_ascii_hexdigit()) {
        return token.to_string();
    }
    token.replace(trimmed, &format!("0x<{} bytes>", hex_body.len() / 2))
}
