//! Configuration management

use std::{env, path::Path};

use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Environment files to load before processing config.
    /// Paths support ~ expansion. Loaded in order, later files override earlier.
    pub env_files: Vec<String>,
    /// Server configuration
    pub server: ServerConfig,
    /// Authorization gate configuration
    pub auth: AuthConfig,
    /// Widget definition configuration
    pub widgets: WidgetsConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8646,
        }
    }
}

/// Authorization gate configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// API key guarding widget routes.
    /// Supports: literal value, `env:VAR_NAME`, or `auto` (generates a
    /// random key at startup). Absent means the gate always permits.
    pub api_key: Option<String>,

    /// Paths that bypass the gate (default: `["/health"]`)
    #[serde(default = "default_public_paths")]
    pub public_paths: Vec<String>,
}

fn default_public_paths() -> Vec<String> {
    vec!["/health".to_string()]
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            public_paths: default_public_paths(),
        }
    }
}

impl AuthConfig {
    /// Resolve the API key (expand env vars, generate if `auto`)
    #[must_use]
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key.as_ref().map(|key| {
            if key == "auto" {
                use rand::RngExt;
                let random_bytes: [u8; 32] = rand::rng().random();
                format!(
                    "wg_{}",
                    base64::Engine::encode(
                        &base64::engine::general_purpose::URL_SAFE_NO_PAD,
                        random_bytes
                    )
                )
            } else if let Some(var_name) = key.strip_prefix("env:") {
                env::var(var_name).unwrap_or_else(|_| key.clone())
            } else {
                key.clone()
            }
        })
    }
}

/// Widget definition configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetsConfig {
    /// Directories to load widget definitions from
    pub directories: Vec<String>,
}

impl Default for WidgetsConfig {
    fn default() -> Self {
        Self {
            directories: vec!["widgets".to_string()],
        }
    }
}

impl Config {
    /// Load configuration from file and environment
    ///
    /// # Errors
    ///
    /// Returns an error if the config file does not exist or cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new();

        // Load from file if provided
        if let Some(p) = path {
            if !p.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            figment = figment.merge(Yaml::file(p));
        }

        // Merge environment variables (WIDGET_GATEWAY_ prefix)
        figment = figment.merge(Env::prefixed("WIDGET_GATEWAY_").split("__"));

        let config: Self = figment
            .extract()
            .map_err(|e| Error::Config(e.to_string()))?;

        // Load env files into process environment (before api_key expansion)
        config.load_env_files();

        Ok(config)
    }

    /// Load environment files into the process environment.
    /// Supports ~ expansion. Files that don't exist are silently skipped.
    fn load_env_files(&self) {
        for path_str in &self.env_files {
            let expanded = if path_str.starts_with('~') {
                if let Some(home) = dirs::home_dir() {
                    path_str.replacen('~', &home.display().to_string(), 1)
                } else {
                    path_str.clone()
                }
            } else {
                path_str.clone()
            };

            let path = Path::new(&expanded);
            if path.exists() {
                match dotenvy::from_path(path) {
                    Ok(()) => {
                        tracing::info!("Loaded env file: {expanded}");
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load env file {expanded}: {e}");
                    }
                }
            } else {
                tracing::debug!("Env file not found (skipped): {expanded}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8646);
        assert!(config.auth.api_key.is_none());
        assert_eq!(config.auth.public_paths, ["/health"]);
        assert_eq!(config.widgets.directories, ["widgets"]);
    }

    #[test]
    fn test_resolve_literal_key() {
        let auth = AuthConfig {
            api_key: Some("abc".to_string()),
            ..AuthConfig::default()
        };
        assert_eq!(auth.resolve_api_key(), Some("abc".to_string()));
    }

    #[test]
    fn test_resolve_env_key() {
        // Unset variables fall back to the literal reference.
        let auth = AuthConfig {
            api_key: Some("env:WIDGET_GATEWAY_TEST_KEY_UNSET".to_string()),
            ..AuthConfig::default()
        };
        assert_eq!(
            auth.resolve_api_key(),
            Some("env:WIDGET_GATEWAY_TEST_KEY_UNSET".to_string())
        );
    }

    #[test]
    fn test_resolve_auto_key() {
        let auth = AuthConfig {
            api_key: Some("auto".to_string()),
            ..AuthConfig::default()
        };
        let key = auth.resolve_api_key().unwrap();
        assert!(key.starts_with("wg_"), "key should carry the wg_ prefix");
        assert!(key.len() > 40, "key should be reasonably long");
    }

    #[test]
    fn test_missing_config_file() {
        let err = Config::load(Some(Path::new("/nonexistent/widget-gateway.yaml"))).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
