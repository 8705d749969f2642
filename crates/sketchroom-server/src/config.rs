//! Relay configuration from environment variables.

use crate::auth::Identity;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

const DEFAULT_ADDR: &str = "0.0.0.0:3030";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid SKETCHROOM_ADDR {value:?}: {source}")]
    InvalidAddr {
        value: String,
        source: std::net::AddrParseError,
    },
    #[error("invalid token entry {0:?}, expected token=userId:Name")]
    InvalidToken(String),
    #[error("invalid boolean for {key}: {value:?}")]
    InvalidBool { key: &'static str, value: String },
}

/// Relay server configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Listen address.
    pub addr: SocketAddr,
    /// Directory for room files; `None` keeps rooms in memory.
    pub data_dir: Option<PathBuf>,
    /// Known bearer tokens.
    pub tokens: HashMap<String, Identity>,
    /// Accept connections without a known token.
    pub allow_anonymous: bool,
}

impl ServerConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from a variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let addr_value = lookup("SKETCHROOM_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr: SocketAddr = addr_value
            .trim()
            .parse()
            .map_err(|source| ConfigError::InvalidAddr {
                value: addr_value.clone(),
                source,
            })?;

        let data_dir = lookup("SKETCHROOM_DATA_DIR")
            .map(|dir| dir.trim().to_string())
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from);

        let tokens = match lookup("SKETCHROOM_TOKENS") {
            Some(raw) => parse_tokens(&raw)?,
            None => HashMap::new(),
        };

        let allow_anonymous = match lookup("SKETCHROOM_ALLOW_ANONYMOUS") {
            Some(raw) => parse_bool("SKETCHROOM_ALLOW_ANONYMOUS", &raw)?,
            None => true,
        };

        Ok(Self {
            addr,
            data_dir,
            tokens,
            allow_anonymous,
        })
    }
}

/// Parse `token=userId:Display Name` entries separated by `;`.
fn parse_tokens(raw: &str) -> Result<HashMap<String, Identity>, ConfigError> {
    let mut tokens = HashMap::new();
    for entry in raw.split(';').map(str::trim).filter(|e| !e.is_empty()) {
        let invalid = || ConfigError::InvalidToken(entry.to_string());
        let (token, identity) = entry.split_once('=').ok_or_else(invalid)?;
        let (user_id, name) = identity.split_once(':').ok_or_else(invalid)?;
        let (token, user_id, name) = (token.trim(), user_id.trim(), name.trim());
        if token.is_empty() || user_id.is_empty() || name.is_empty() {
            return Err(invalid());
        }
        tokens.insert(
            token.to_string(),
            Identity {
                user_id: user_id.to_string(),
                name: name.to_string(),
            },
        );
    }
    Ok(tokens)
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            key,
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.addr, "0.0.0.0:3030".parse().unwrap());
        assert_eq!(config.data_dir, None);
        assert!(config.tokens.is_empty());
        assert!(config.allow_anonymous);
    }

    #[test]
    fn test_full_config() {
        let config = config(&[
            ("SKETCHROOM_ADDR", "127.0.0.1:9000"),
            ("SKETCHROOM_DATA_DIR", "/var/lib/sketchroom"),
            ("SKETCHROOM_TOKENS", "abc=u1:Ada Lovelace; def=u2:Bob;"),
            ("SKETCHROOM_ALLOW_ANONYMOUS", "false"),
        ])
        .unwrap();

        assert_eq!(config.addr.port(), 9000);
        assert_eq!(config.data_dir, Some(PathBuf::from("/var/lib/sketchroom")));
        assert_eq!(config.tokens.len(), 2);
        assert_eq!(config.tokens["abc"].name, "Ada Lovelace");
        assert_eq!(config.tokens["def"].user_id, "u2");
        assert!(!config.allow_anonymous);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            config(&[("SKETCHROOM_ADDR", "nowhere")]),
            Err(ConfigError::InvalidAddr { .. })
        ));
        assert!(matches!(
            config(&[("SKETCHROOM_TOKENS", "abc=missing-name")]),
            Err(ConfigError::InvalidToken(_))
        ));
        assert!(matches!(
            config(&[("SKETCHROOM_TOKENS", "=u1:Name")]),
            Err(ConfigError::InvalidToken(_))
        ));
        assert!(matches!(
            config(&[("SKETCHROOM_ALLOW_ANONYMOUS", "maybe")]),
            Err(ConfigError::InvalidBool { .. })
        ));
    }

    #[test]
    fn test_empty_data_dir_is_memory() {
        let config = config(&[("SKETCHROOM_DATA_DIR", "  ")]).unwrap();
        assert_eq!(config.data_dir, None);
    }
}
