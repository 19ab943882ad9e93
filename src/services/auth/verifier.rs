use crate::services::auth::access_jwt::{AccessJwtError, VerifiedAccessToken};

/// Verifies a raw bearer token and decodes the caller identity.
///
/// Injected into `AppState` so the access middleware can be exercised with a
/// fake in tests.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<VerifiedAccessToken, AccessJwtError>;
}
