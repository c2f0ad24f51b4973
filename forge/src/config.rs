//! Configuration management for the Forge service.
//!
//! Configuration is loaded from multiple sources:
//! 1. Default values
//! 2. Config file (forge.toml, or the path given on the command line)
//! 3. Environment variables (FORGE_*)
//!
//! Priority: ENV vars > config file > defaults.

use forge_core::{AccessPolicy, ForgeError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Forge service configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ForgeConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Authentication configuration
    #[serde(default)]
    pub auth: AuthConfig,

    /// Git gateway configuration
    #[serde(default)]
    pub git: GitConfig,

    /// Access policy knobs
    #[serde(default)]
    pub access: AccessPolicy,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (FORGE_ADDRESS)
    pub address: String,

    /// Bind port (FORGE_PORT)
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// JWT signing secret (FORGE_JWT_SECRET)
    pub jwt_secret: String,

    /// Access token lifetime in minutes (FORGE_TOKEN_EXPIRY_MINUTES)
    pub access_token_expiry_minutes: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "forge-dev-secret-change-in-production".to_string(),
            access_token_expiry_minutes: 60,
        }
    }
}

/// Git gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitConfig {
    /// Root directory for per-user repository checkouts (FORGE_REPOS_ROOT)
    pub repos_root: PathBuf,

    /// Deadline for a single git operation, in seconds
    /// (FORGE_GIT_TIMEOUT_SECS). A timeout is a failure, never a success.
    pub operation_timeout_secs: u64,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            repos_root: PathBuf::from("./data/repos"),
            operation_timeout_secs: 30,
        }
    }
}

impl ForgeConfig {
    /// Load configuration: defaults, then file (if present), then env.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Path::new("forge.toml");
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ForgeError::internal(format!("Failed to read config: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| ForgeError::internal(format!("Failed to parse config: {}", e)))
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("FORGE_ADDRESS") {
            self.server.address = val;
        }
        if let Ok(val) = std::env::var("FORGE_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = std::env::var("FORGE_JWT_SECRET") {
            self.auth.jwt_secret = val;
        }
        if let Ok(val) = std::env::var("FORGE_TOKEN_EXPIRY_MINUTES") {
            if let Ok(minutes) = val.parse() {
                self.auth.access_token_expiry_minutes = minutes;
            }
        }
        if let Ok(val) = std::env::var("FORGE_REPOS_ROOT") {
            self.git.repos_root = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("FORGE_GIT_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                self.git.operation_timeout_secs = secs;
            }
        }
        if let Ok(val) = std::env::var("FORGE_MAINTAINER_CAN_MANAGE") {
            self.access.maintainer_can_manage = val.parse().unwrap_or(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // process-wide env vars: tests that touch them take this lock
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_default_config() {
        let config = ForgeConfig::default();
        assert_eq!(config.server.address, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.auth.access_token_expiry_minutes, 60);
        assert_eq!(config.git.operation_timeout_secs, 30);
        assert!(!config.access.maintainer_can_manage);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let toml = r#"
            [server]
            address = "0.0.0.0"
            port = 9000
        "#;
        let config: ForgeConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.git.repos_root, PathBuf::from("./data/repos"));
        assert!(!config.access.maintainer_can_manage);
    }

    #[test]
    fn test_access_policy_from_file() {
        let toml = r#"
            [access]
            maintainer_can_manage = true
        "#;
        let config: ForgeConfig = toml::from_str(toml).unwrap();
        assert!(config.access.maintainer_can_manage);
    }

    #[test]
    fn test_env_overrides_beat_file_values() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var("FORGE_PORT", "7070");
        std::env::set_var("FORGE_JWT_SECRET", "env-secret");
        std::env::set_var("FORGE_REPOS_ROOT", "/srv/env-repos");
        std::env::set_var("FORGE_GIT_TIMEOUT_SECS", "5");
        std::env::set_var("FORGE_MAINTAINER_CAN_MANAGE", "true");

        let toml = r#"
            [server]
            port = 9000

            [access]
            maintainer_can_manage = false
        "#;
        let mut config: ForgeConfig = toml::from_str(toml).unwrap();
        config.apply_env_overrides();

        assert_eq!(config.server.port, 7070);
        assert_eq!(config.auth.jwt_secret, "env-secret");
        assert_eq!(config.git.repos_root, PathBuf::from("/srv/env-repos"));
        assert_eq!(config.git.operation_timeout_secs, 5);
        assert!(config.access.maintainer_can_manage);
        // values without an env override keep their file/default values
        assert_eq!(config.server.address, "127.0.0.1");

        for var in [
            "FORGE_PORT",
            "FORGE_JWT_SECRET",
            "FORGE_REPOS_ROOT",
            "FORGE_GIT_TIMEOUT_SECS",
            "FORGE_MAINTAINER_CAN_MANAGE",
        ] {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_malformed_env_values_are_ignored() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var("FORGE_PORT", "not-a-port");
        std::env::set_var("FORGE_MAINTAINER_CAN_MANAGE", "sometimes");

        let mut config = ForgeConfig::default();
        config.apply_env_overrides();
        assert_eq!(config.server.port, 8080);
        assert!(!config.access.maintainer_can_manage);

        std::env::remove_var("FORGE_PORT");
        std::env::remove_var("FORGE_MAINTAINER_CAN_MANAGE");
    }
}
