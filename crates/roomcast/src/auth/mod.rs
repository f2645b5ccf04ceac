//! Authentication gate.
//!
//! Verifies the signed token carried by every command envelope against
//! the process-wide shared secret, and cross-checks the verified claim
//! against the envelope's declared identity.

mod claims;
mod config;
mod error;
mod state;

pub use claims::Claims;
pub use config::AuthConfig;
pub use error::AuthError;
pub use state::AuthState;
