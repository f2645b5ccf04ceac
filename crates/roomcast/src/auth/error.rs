//! Authentication errors.

use thiserror::Error;

/// Authentication errors.
///
/// An auth failure terminates only the triggering command; the
/// dispatcher replies with an error frame and keeps the connection
/// open.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Missing token on the envelope.
    #[error("missing token")]
    MissingToken,

    /// Invalid token.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// Token expired.
    #[error("token expired")]
    TokenExpired,

    /// The token's verified subject does not match the identity the
    /// envelope declares.
    #[error("token subject does not match declared user id")]
    IdentityMismatch,

    /// Internal error.
    #[error("internal auth error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        assert_eq!(AuthError::TokenExpired.to_string(), "token expired");
        assert_eq!(
            AuthError::InvalidToken("bad".to_string()).to_string(),
            "invalid token: bad"
        );
    }
}
