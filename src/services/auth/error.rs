use thiserror::Error;

/// Reasons the authorization pipeline refuses a request.
///
/// Every variant maps to 403 (see `AppError::from`); the message is the
/// reason shown to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("missing or malformed credential")]
    CredentialMissing,
    #[error("invalid credential")]
    CredentialInvalid,
    #[error("not resource owner")]
    NotOwner,
    #[error("invalid user name or password")]
    BadLogin,
}
