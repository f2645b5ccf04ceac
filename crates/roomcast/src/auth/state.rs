//! Token verification and generation.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use log::warn;
use std::sync::Arc;

use super::{AuthConfig, AuthError, Claims};

/// Authentication state shared by every connection.
#[derive(Clone)]
pub struct AuthState {
    config: Arc<AuthConfig>,
    decoding_key: Option<DecodingKey>,
}

impl AuthState {
    /// Create new auth state from config.
    /// Resolves `env:VAR_NAME` syntax in jwt_secret at construction time.
    pub fn new(mut config: AuthConfig) -> Self {
        if let Ok(Some(resolved)) = config.resolve_jwt_secret() {
            config.jwt_secret = Some(resolved);
        }

        let decoding_key = config
            .jwt_secret
            .as_ref()
            .map(|s| DecodingKey::from_secret(s.as_bytes()));

        Self {
            config: Arc::new(config),
            decoding_key,
        }
    }

    /// Get allowed CORS origins from config.
    pub fn allowed_origins(&self) -> &[String] {
        &self.config.allowed_origins
    }

    /// Validate a JWT token.
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }

        let decoding_key = self
            .decoding_key
            .as_ref()
            .ok_or_else(|| AuthError::Internal("no JWT secret configured".to_string()))?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_nbf = false;
        validation.required_spec_claims.clear(); // Allow missing iss/aud

        let token_data = decode::<Claims>(token, decoding_key, &validation).map_err(|e| {
            warn!("JWT validation failed: {:?}", e);
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken(e.to_string()),
            }
        })?;

        Ok(token_data.claims)
    }

    /// Authorize one command envelope.
    ///
    /// Verifies the token and requires the verified subject to equal
    /// the identity the envelope declares. The claim is the single
    /// source of truth; a mismatch is an auth failure, not a lookup
    /// failure.
    pub fn authorize_command(
        &self,
        token: &str,
        declared_user_id: &str,
    ) -> Result<Claims, AuthError> {
        let claims = self.validate_token(token)?;
        if claims.sub != declared_user_id {
            warn!(
                "identity mismatch: token sub {} vs declared {}",
                claims.sub, declared_user_id
            );
            return Err(AuthError::IdentityMismatch);
        }
        Ok(claims)
    }

    /// Generate a JWT token for a user.
    pub fn generate_token(&self, user_id: &str, name: Option<&str>) -> Result<String, AuthError> {
        let secret = self
            .config
            .jwt_secret
            .as_ref()
            .ok_or_else(|| AuthError::Internal("no JWT secret configured".to_string()))?;

        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            exp: now + self.config.effective_token_ttl_secs(),
            iat: Some(now),
            name: name.map(str::to_string),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .map_err(|e| AuthError::Internal(e.to_string()))
    }

    /// Generate a token that is already expired. Test aid.
    pub fn generate_expired_token(&self, user_id: &str) -> Result<String, AuthError> {
        let secret = self
            .config
            .jwt_secret
            .as_ref()
            .ok_or_else(|| AuthError::Internal("no JWT secret configured".to_string()))?;

        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            exp: now - 3600,
            iat: Some(now - 7200),
            name: None,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .map_err(|e| AuthError::Internal(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_state() -> AuthState {
        AuthState::new(AuthConfig {
            jwt_secret: Some("test-secret-for-unit-tests-minimum-32-chars-long".to_string()),
            ..AuthConfig::default()
        })
    }

    #[test]
    fn generate_and_validate_token() {
        let state = test_state();
        let token = state.generate_token("u1", Some("Ada")).unwrap();

        let claims = state.validate_token(&token).unwrap();
        assert_eq!(claims.sub, "u1");
        assert_eq!(claims.display_name(), "Ada");
    }

    #[test]
    fn expired_token_is_rejected() {
        let state = test_state();
        let token = state.generate_expired_token("u1").unwrap();

        let err = state.validate_token(&token).unwrap_err();
        assert!(matches!(err, AuthError::TokenExpired));
    }

    #[test]
    fn garbage_token_is_rejected() {
        let state = test_state();
        let err = state.validate_token("not.a.jwt").unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken(_)));
    }

    #[test]
    fn empty_token_is_missing() {
        let state = test_state();
        let err = state.validate_token("").unwrap_err();
        assert!(matches!(err, AuthError::MissingToken));
    }

    #[test]
    fn authorize_command_enforces_subject_equality() {
        let state = test_state();
        let token = state.generate_token("u1", None).unwrap();

        assert!(state.authorize_command(&token, "u1").is_ok());

        let err = state.authorize_command(&token, "u2").unwrap_err();
        assert!(matches!(err, AuthError::IdentityMismatch));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let state = test_state();
        let token = state.generate_token("u1", None).unwrap();

        let other = AuthState::new(AuthConfig {
            jwt_secret: Some("a-completely-different-secret-also-32-chars!".to_string()),
            ..AuthConfig::default()
        });
        assert!(matches!(
            other.validate_token(&token).unwrap_err(),
            AuthError::InvalidToken(_)
        ));
    }
}
