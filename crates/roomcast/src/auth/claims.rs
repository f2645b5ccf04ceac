//! JWT claims.

use serde::{Deserialize, Serialize};

/// Claims carried by a Roomcast token.
///
/// `sub` is the verified identity; it is the single source of truth
/// the dispatcher compares against the envelope's declared `userId`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: String,

    /// Expiration time (Unix timestamp).
    pub exp: i64,

    /// Issued at (Unix timestamp).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Display name, when the issuer embeds one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Claims {
    /// Display name, falling back to the subject.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.sub)
    }
}
