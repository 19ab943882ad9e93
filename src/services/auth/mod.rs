pub mod access_jwt;
pub mod error;
pub mod token_issuer;
pub mod verifier;

pub use access_jwt::JwtVerifier;
pub use error::AuthError;
pub use token_issuer::TokenIssuer;
pub use verifier::TokenVerifier;
