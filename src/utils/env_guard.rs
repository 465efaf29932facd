use std::fs;
use std::path::Path;

/// Parse `.env` content into key/value pairs.
///
/// Blank lines and `#` comments are skipped, trailing comments are stripped, and a
/// single layer of matching quotes is removed from values.
pub fn parse_dot_env(content: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let trimmed = trimmed.strip_prefix("export ").unwrap_or(trimmed);
        let Some((key, value)) = trimmed.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }

        let value = value.trim();
        let parsed = if value.len() >= 2
            && ((value.starts_with('"') && value.ends_with('"'))
                || (value.starts_with('\'') && value.ends_with('\'')))
        {
            &value[1..value.len() - 1]
        } else {
            value.split('#').next().unwrap_or("").trim()
        };
        out.push((key.to_string(), parsed.to_string()));
    }
    out
}

/// Seed the process environment from a `.env` file without overriding variables
/// that are already set. Returns how many variables were applied.
pub fn load_dot_env(path: &Path) -> usize {
    if !path.exists() {
        return 0;
    }
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(err) => {
            tracing::warn!(path = %path.display(), %err, "failed to read env file");
            return 0;
        }
    };

    let mut applied = 0usize;
    for (key, value) in parse_dot_env(&content) {
        if std::env::var_os(&key).is_some() {
            continue;
        }
        std::env::set_var(&key, value);
        applied += 1;
    }
    tracing::debug!(path = %path.display(), applied, "loaded env file");
    applied
}

/// Load `.env` from the working directory and from its parent, the layout the
/// deployment workspace uses.
pub fn harden_env_setup() {
    let local = load_dot_env(Path::new(".env"));
    let parent = load_dot_env(Path::new("../.env"));
    if local + parent == 0 {
        tracing::debug!("no .env overrides applied");
    }
    if std::env::var("HARNESS_RPC_URL").is_err() {
        tracing::info!("HARNESS_RPC_URL is not set; on-chain suites will be skipped");
    }
}
