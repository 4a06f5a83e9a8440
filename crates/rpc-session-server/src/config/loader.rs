//! Configuration loading from TOML files and the environment.

use std::path::Path;

use rpc_session::SessionConfig;
use serde::{Deserialize, Serialize};

use crate::types::{RpcError, RpcResult};

/// Environment variable consulted when no `--config` flag is given.
pub const CONFIG_ENV_VAR: &str = "RPC_SESSION_CONFIG";

/// Default method namespace.
pub const DEFAULT_PREFIX: &str = "session";

/// Default permission that unlocks `management/*` methods.
pub const DEFAULT_ADMIN_PERMISSION: &str = "session.admin";

fn default_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}

fn default_admin_permission() -> String {
    DEFAULT_ADMIN_PERMISSION.to_string()
}

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Method name prefix, e.g. `session` gives `session/create`.
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Permission a user must hold to call administrative methods.
    #[serde(default = "default_admin_permission")]
    pub admin_permission: String,

    /// Session engine settings.
    #[serde(default)]
    pub session: SessionConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            admin_permission: default_admin_permission(),
            session: SessionConfig::default(),
        }
    }
}

/// Load configuration from a TOML file.
pub fn load_config(path: &str) -> RpcResult<ServerConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| RpcError::Config(format!("Failed to read config file {path}: {e}")))?;
    let config: ServerConfig = toml::from_str(&content)
        .map_err(|e| RpcError::Config(format!("Failed to parse config file {path}: {e}")))?;
    tracing::debug!("Loaded configuration from {path}");
    Ok(config)
}

/// Resolve the configuration: CLI path, then `RPC_SESSION_CONFIG`, then
/// built-in defaults. An explicitly named file that does not exist is an
/// error.
pub fn resolve_config(explicit_path: Option<&str>) -> RpcResult<ServerConfig> {
    if let Some(path) = explicit_path {
        return load_config(path);
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
        if Path::new(&env_path).exists() {
            return load_config(&env_path);
        }
        tracing::warn!("{CONFIG_ENV_VAR} points at missing file {env_path}, using defaults");
    }

    Ok(ServerConfig::default())
}
