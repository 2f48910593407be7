//! Bridge configuration.
//!
//! Passed explicitly to constructors; nothing in the core reads the process
//! environment. The CLI is responsible for loading and overriding it.

use crate::error::{TurboNetError, TurboNetResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
/// Bot name sent with every bind request.
pub const DEFAULT_BOT_NAME: &str = "yibot";

/// Top-level bridge configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Base URL of the TurboNET API, e.g. `https://api.example.com`.
    pub api_base: String,
    /// Platform user whose credential backs the admin-only commands.
    pub admin_user_id: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// `botName` sent on bind.
    pub bot_name: String,
    /// Default tracing filter when `RUST_LOG` is unset.
    pub log_level: String,
    /// Credential store settings.
    pub store: StoreConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            api_base: String::new(),
            admin_user_id: String::new(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            bot_name: DEFAULT_BOT_NAME.to_string(),
            log_level: "info".to_string(),
            store: StoreConfig::default(),
        }
    }
}

impl BridgeConfig {
    /// Request timeout as a `Duration`.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Check required fields and normalize them in place.
    ///
    /// Runs once at startup; a missing admin identity or base URL is a boot
    /// failure rather than a per-command error.
    pub fn validate(&mut self) -> TurboNetResult<()> {
        self.api_base = self.api_base.trim().trim_end_matches('/').to_string();
        if self.api_base.is_empty() {
            return Err(TurboNetError::Config("api_base is not set".to_string()));
        }
        let parsed = url::Url::parse(&self.api_base)
            .map_err(|e| TurboNetError::Config(format!("api_base '{}': {e}", self.api_base)))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(TurboNetError::Config(format!(
                "api_base must be http or https, got '{}'",
                parsed.scheme()
            )));
        }

        self.admin_user_id = self.admin_user_id.trim().to_string();
        if self.admin_user_id.is_empty() {
            return Err(TurboNetError::Config(
                "admin_user_id is not set".to_string(),
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(TurboNetError::Config(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Which credential store backend to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Sqlite,
    Memory,
}

/// Credential store settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// SQLite database file.
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Sqlite,
            path: default_home_dir().join("turbonet.db"),
        }
    }
}

/// `~/.turbonet`, or `./.turbonet` when no home directory is known.
pub fn default_home_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".turbonet")
}
