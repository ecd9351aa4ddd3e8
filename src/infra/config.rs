//! Centralized configuration (environment variables + defaults).

use anyhow::{anyhow, Context};
use std::time::Duration;

fn required(name: &str) -> anyhow::Result<String> {
    let value = std::env::var(name).with_context(|| format!("{} must be set", name))?;
    if value.trim().is_empty() {
        return Err(anyhow!("{} must not be empty", name));
    }
    Ok(value)
}

fn optional(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn flag(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(v) => matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}

/// Base URL of the hosted record store (required).
pub fn api_url() -> anyhow::Result<String> {
    Ok(required("STAFFSYNC_API_URL")?.trim_end_matches('/').to_string())
}

/// Project the records belong to (required).
pub fn project_id() -> anyhow::Result<String> {
    required("STAFFSYNC_PROJECT_ID")
}

/// Public key sent as the bearer token (required).
pub fn public_key() -> anyhow::Result<String> {
    required("STAFFSYNC_PUBLIC_KEY")
}

/// Per-request timeout for gateway calls. Defaults to 30 seconds.
pub fn request_timeout() -> anyhow::Result<Duration> {
    match std::env::var("STAFFSYNC_REQUEST_TIMEOUT_SECS") {
        Ok(v) => {
            let secs = v
                .trim()
                .parse::<u64>()
                .context("STAFFSYNC_REQUEST_TIMEOUT_SECS must be a valid u64")?;
            Ok(Duration::from_secs(secs.max(1)))
        }
        Err(_) => Ok(Duration::from_secs(30)),
    }
}

/// Address the dev record store binds to.
pub fn bind_addr() -> String {
    std::env::var("STAFFSYNC_BIND").unwrap_or_else(|_| "0.0.0.0:3000".to_string())
}

/// Key the dev record store requires, if any. Same variable the client sends.
pub fn store_public_key() -> Option<String> {
    optional("STAFFSYNC_PUBLIC_KEY")
}

/// Project the dev record store serves, if restricted.
pub fn store_project_id() -> Option<String> {
    optional("STAFFSYNC_PROJECT_ID")
}

/// Whether the dev record store starts with the demo tables.
pub fn seed_demo() -> bool {
    flag("STAFFSYNC_SEED_DEMO", true)
}

/// Emit logs as JSON lines instead of human-readable text.
pub fn log_json() -> bool {
    flag("STAFFSYNC_LOG_JSON", false)
}

/// Everything the HTTP gateway needs to talk to the hosted store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub api_url: String,
    pub project_id: String,
    pub public_key: String,
    pub timeout: Duration,
}

impl GatewayConfig {
    /// Reads `.env` (if present) and the `STAFFSYNC_*` variables.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        Ok(Self {
            api_url: api_url()?,
            project_id: project_id()?,
            public_key: public_key()?,
            timeout: request_timeout()?,
        })
    }
}
