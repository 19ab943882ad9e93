/*
 * Responsibility
 * - the "authenticated context" type as handlers see it
 * - the access middleware verifies the token and stores this in request extensions;
 *   handlers and the ownership guard only ever read it
 */
use uuid::Uuid;

use crate::services::auth::access_jwt::VerifiedAccessToken;

/// Identity of the caller, valid for a single request.
///
/// - `user_id` is the token `sub` (users."userId")
/// - `jti` is kept for audit/log correlation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthCtx {
    pub user_id: Uuid,
    pub user_name: Option<String>,
    pub jti: Option<String>,
}

impl AuthCtx {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            user_name: None,
            jti: None,
        }
    }
}

impl From<VerifiedAccessToken> for AuthCtx {
    fn from(token: VerifiedAccessToken) -> Self {
        Self {
            user_name: token.user_name,
            jti: token.jti,
            ..Self::new(token.user_id)
        }
    }
}
