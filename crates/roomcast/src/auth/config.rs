//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Authentication section of the broker config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Shared HS256 secret. Supports `env:VAR_NAME` indirection so the
    /// secret can live outside the config file.
    pub jwt_secret: Option<String>,

    /// Token lifetime in seconds for tokens minted by this process.
    pub token_ttl_secs: i64,

    /// Allowed CORS origins for the HTTP surface. Empty means any.
    pub allowed_origins: Vec<String>,
}

impl AuthConfig {
    /// Resolve `env:VAR_NAME` syntax in the configured secret.
    ///
    /// Returns `Ok(Some(secret))` when an indirection was resolved,
    /// `Ok(None)` when the secret is literal or absent.
    pub fn resolve_jwt_secret(&self) -> Result<Option<String>, std::env::VarError> {
        match self.jwt_secret.as_deref().and_then(|s| s.strip_prefix("env:")) {
            Some(var) => std::env::var(var).map(Some),
            None => Ok(None),
        }
    }

    /// TTL with a 24h default when the config leaves it zero.
    pub fn effective_token_ttl_secs(&self) -> i64 {
        if self.token_ttl_secs > 0 {
            self.token_ttl_secs
        } else {
            3600 * 24
        }
    }
}
