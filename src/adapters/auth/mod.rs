//! Authentication adapters.
//!
//! Implementations of the `TokenVerifier` port:
//!
//! - `jwt_verifier` - HS256 validation against the identity service's shared secret
//! - `static_verifier` - Literal token map for tests

mod jwt_verifier;
mod static_verifier;

pub use jwt_verifier::{JwtConfig, JwtTokenVerifier};
pub use static_verifier::StaticTokenVerifier;
