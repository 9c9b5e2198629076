//! Application configuration
//!
//! Configuration is loaded from ~/.codeloop/config.toml when present and
//! merged over built-in defaults. Every field has a working default so the
//! server runs with no config file at all.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::util::paths::config_path;

/// Default Anthropic-compatible messages endpoint.
pub const DEFAULT_AI_BASE_URL: &str = "https://api.anthropic.com";
/// Default model used for both generation and explanation prompts.
pub const DEFAULT_AI_MODEL: &str = "claude-sonnet-4-20250514";

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Host address the web server binds to
    pub host: String,
    /// Port the web server listens on
    pub port: u16,
    /// Enable permissive CORS (any origin) for development
    pub cors_permissive: bool,
    /// Prompt service settings
    pub ai: AiConfig,
    /// Override for the database file location (used by tests; defaults to
    /// the data-dir path when unset)
    pub database_path: Option<PathBuf>,
}

/// Prompt service configuration
#[derive(Debug, Clone)]
pub struct AiConfig {
    /// Base URL of the messages endpoint
    pub base_url: String,
    /// API key; falls back to the ANTHROPIC_API_KEY environment variable
    pub api_key: Option<String>,
    /// Model identifier sent with every request
    pub model: String,
    /// Maximum tokens requested per completion
    pub max_tokens: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            cors_permissive: true,
            ai: AiConfig::default(),
            database_path: None,
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_AI_BASE_URL.to_string(),
            api_key: None,
            model: DEFAULT_AI_MODEL.to_string(),
            max_tokens: 4096,
            timeout_secs: 60,
        }
    }
}

/// Raw TOML shape; every field optional so partial configs merge over defaults
#[derive(Debug, Default, Deserialize)]
struct TomlConfig {
    server: Option<TomlServerConfig>,
    ai: Option<TomlAiConfig>,
}

#[derive(Debug, Default, Deserialize)]
struct TomlServerConfig {
    host: Option<String>,
    port: Option<u16>,
    cors_permissive: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct TomlAiConfig {
    base_url: Option<String>,
    api_key: Option<String>,
    model: Option<String>,
    max_tokens: Option<u32>,
    timeout_secs: Option<u64>,
}

impl Config {
    /// Load configuration from the default location, falling back to
    /// defaults when the file is missing or unreadable.
    pub fn load() -> Self {
        Self::load_from(&config_path())
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Self {
        let mut config = Self::default();

        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(_) => return config,
        };

        let toml_config: TomlConfig = match toml::from_str(&contents) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Failed to parse config file, using defaults"
                );
                return config;
            }
        };

        if let Some(server) = toml_config.server {
            if let Some(host) = server.host {
                config.host = host;
            }
            if let Some(port) = server.port {
                config.port = port;
            }
            if let Some(cors) = server.cors_permissive {
                config.cors_permissive = cors;
            }
        }

        if let Some(ai) = toml_config.ai {
            if let Some(base_url) = ai.base_url {
                config.ai.base_url = base_url;
            }
            if let Some(api_key) = ai.api_key {
                config.ai.api_key = Some(api_key);
            }
            if let Some(model) = ai.model {
                config.ai.model = model;
            }
            if let Some(max_tokens) = ai.max_tokens {
                config.ai.max_tokens = max_tokens;
            }
            if let Some(timeout_secs) = ai.timeout_secs {
                config.ai.timeout_secs = timeout_secs;
            }
        }

        config
    }

    /// Resolve the database file path, preferring the explicit override.
    pub fn resolve_database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(crate::util::paths::database_path)
    }

    /// Resolve the API key, falling back to the environment.
    pub fn api_key(&self) -> Option<String> {
        self.ai
            .api_key
            .clone()
            .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert!(config.cors_permissive);
        assert_eq!(config.ai.base_url, DEFAULT_AI_BASE_URL);
        assert_eq!(config.ai.max_tokens, 4096);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = Config::load_from(Path::new("/nonexistent/config.toml"));
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_partial_config_merges_over_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[server]
port = 9090

[ai]
model = "claude-haiku-4-5"
"#,
        )
        .unwrap();

        let config = Config::load_from(&path);
        assert_eq!(config.port, 9090);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.ai.model, "claude-haiku-4-5");
        assert_eq!(config.ai.base_url, DEFAULT_AI_BASE_URL);
    }

    #[test]
    fn test_invalid_toml_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "this is not toml [[[").unwrap();

        let config = Config::load_from(&path);
        assert_eq!(config.port, 8080);
    }
}
