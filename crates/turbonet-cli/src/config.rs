//! Configuration loading from `~/.turbonet/config.toml` with env overrides.

use std::path::{Path, PathBuf};
use turbonet_types::config::{default_home_dir, BridgeConfig};
use turbonet_types::error::{TurboNetError, TurboNetResult};

pub const ENV_API_BASE: &str = "TURBONET_API_BASE";
pub const ENV_ADMIN_USER: &str = "TURBONET_ADMIN_USER";
pub const ENV_DB_PATH: &str = "TURBONET_DB_PATH";

/// `~/.turbonet/config.toml`.
pub fn default_config_path() -> PathBuf {
    default_home_dir().join("config.toml")
}

/// Load configuration from a TOML file.
///
/// A missing file yields defaults. A file that exists but cannot be read or
/// parsed is an error: the bridge must not start on a half-read config.
pub fn load_config(path: Option<&Path>) -> TurboNetResult<BridgeConfig> {
    let config_path = path
        .map(|p| p.to_path_buf())
        .unwrap_or_else(default_config_path);

    if !config_path.exists() {
        return Ok(BridgeConfig::default());
    }
    let contents = std::fs::read_to_string(&config_path)?;
    toml::from_str::<BridgeConfig>(&contents)
        .map_err(|e| TurboNetError::Config(format!("{}: {e}", config_path.display())))
}

/// Apply `TURBONET_*` overrides. Empty values are ignored.
pub fn apply_env_overrides<F>(config: &mut BridgeConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
    if let Some(v) = get(ENV_API_BASE) {
        config.api_base = v;
    }
    if let Some(v) = get(ENV_ADMIN_USER) {
        config.admin_user_id = v;
    }
    if let Some(v) = get(ENV_DB_PATH) {
        config.store.path = PathBuf::from(v);
    }
}

/// File, then process environment, then validation.
pub fn resolve_config(path: Option<&Path>) -> TurboNetResult<BridgeConfig> {
    let mut config = load_config(path)?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    config.validate()?;
    Ok(config)
}
