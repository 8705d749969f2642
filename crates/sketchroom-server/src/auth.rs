//! Bearer-token identity for WebSocket connections.

use crate::config::ServerConfig;
use std::collections::HashMap;
use uuid::Uuid;

/// Display name given to connections without a known token.
pub const ANONYMOUS_NAME: &str = "Anonymous";

/// Who a connection belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub name: String,
}

impl Identity {
    /// A fresh anonymous identity.
    pub fn anonymous() -> Self {
        Self {
            user_id: Uuid::new_v4().to_string(),
            name: ANONYMOUS_NAME.to_string(),
        }
    }
}

/// Resolves the `token` query parameter of a WebSocket upgrade.
pub trait TokenVerifier: Send + Sync {
    /// The identity for `token`, or `None` to reject the upgrade.
    fn verify(&self, token: Option<&str>) -> Option<Identity>;
}

/// Verifier backed by a fixed token table.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenVerifier {
    tokens: HashMap<String, Identity>,
    allow_anonymous: bool,
}

impl StaticTokenVerifier {
    pub fn new(tokens: HashMap<String, Identity>, allow_anonymous: bool) -> Self {
        Self {
            tokens,
            allow_anonymous,
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(config.tokens.clone(), config.allow_anonymous)
    }
}

impl TokenVerifier for StaticTokenVerifier {
    fn verify(&self, token: Option<&str>) -> Option<Identity> {
        if let Some(identity) = token.and_then(|t| self.tokens.get(t)) {
            return Some(identity.clone());
        }
        self.allow_anonymous.then(Identity::anonymous)
    }
}
