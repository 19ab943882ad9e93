//! Bearer access token verification → `AuthCtx` in request extensions.
//!
//! - `Authorization` missing, or not starting with `Bearer` → 403 (missing or malformed credential)
//! - token rejected by the `TokenVerifier` → 403 (invalid credential)
//!
//! 403 (not 401) is what clients of this API already expect for both cases.

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::auth::{AuthError, TokenVerifier};
use crate::state::AppState;

const BEARER_SCHEME: &str = "Bearer";
// "Bearer " including the separating space
const BEARER_PREFIX_LEN: usize = 7;

/// Route layer: `middleware::from_fn_with_state(state, access_middleware)`.
pub async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let auth_ctx = authenticate(auth_header, state.verifier.as_ref())?;

    tracing::debug!(
        user_id = %auth_ctx.user_id,
        user_name = ?auth_ctx.user_name,
        jti = ?auth_ctx.jti,
        "access token accepted"
    );

    // middleware → extractor / ownership guard
    req.extensions_mut().insert(auth_ctx);

    Ok(next.run(req).await)
}

/// Turns an `Authorization` header value into the caller identity.
///
/// The verifier is only consulted once the header has the bearer shape.
pub fn authenticate(
    auth_header: Option<&str>,
    verifier: &dyn TokenVerifier,
) -> Result<AuthCtx, AuthError> {
    let auth_header = match auth_header {
        Some(value) if value.starts_with(BEARER_SCHEME) => value,
        _ => return Err(AuthError::CredentialMissing),
    };

    // Header values passed `to_str`, so they are ASCII and any index is a char boundary.
    let token = auth_header.get(BEARER_PREFIX_LEN..).unwrap_or_default();

    match verifier.verify(token) {
        Ok(verified) => Ok(AuthCtx::from(verified)),
        Err(err) => {
            tracing::warn!(error = %err, "access token verification failed");
            Err(AuthError::CredentialInvalid)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        Json, Router,
        http::StatusCode,
        middleware,
        routing::get,
    };
    use serde_json::json;
    use uuid::Uuid;

    use super::*;
    use crate::api::v1::extractors::AuthCtxExtractor;
    use crate::testing::{self, CountingVerifier};

    #[test]
    fn missing_header_never_reaches_the_verifier() {
        let verifier = CountingVerifier::new();

        assert_eq!(
            authenticate(None, &verifier),
            Err(AuthError::CredentialMissing)
        );
        assert_eq!(verifier.calls(), 0);
    }

    #[test]
    fn non_bearer_scheme_never_reaches_the_verifier() {
        let verifier = CountingVerifier::new();

        for header in ["Basic dXNlcjpwYXNz", "bearer abc", "Token abc", "", " Bearer abc"] {
            assert_eq!(
                authenticate(Some(header), &verifier),
                Err(AuthError::CredentialMissing),
                "header {header:?}"
            );
        }
        assert_eq!(verifier.calls(), 0);
    }

    #[test]
    fn bad_tokens_are_invalid_credentials() {
        let verifier = CountingVerifier::new();
        let expired = testing::expired_token_for(Uuid::new_v4());
        let forged = testing::forged_token_for(Uuid::new_v4());

        for header in [
            "Bearer not-a-jwt".to_string(),
            "Bearer".to_string(),
            format!("Bearer {expired}"),
            format!("Bearer {forged}"),
        ] {
            assert_eq!(
                authenticate(Some(&header), &verifier),
                Err(AuthError::CredentialInvalid),
                "header {header:?}"
            );
        }
        assert_eq!(verifier.calls(), 4);
    }

    #[test]
    fn valid_token_yields_identity_of_its_subject() {
        let verifier = CountingVerifier::new();
        let user_id = Uuid::new_v4();
        let header = format!("Bearer {}", testing::token_for(user_id));

        let ctx = authenticate(Some(&header), &verifier).unwrap();

        assert_eq!(ctx.user_id, user_id);
        assert_eq!(ctx.user_name.as_deref(), Some("tester"));
        assert_eq!(verifier.calls(), 1);
    }

    fn whoami_router(state: AppState) -> Router {
        async fn whoami(AuthCtxExtractor(ctx): AuthCtxExtractor) -> Json<serde_json::Value> {
            Json(json!({ "user_id": ctx.user_id }))
        }

        Router::new()
            .route("/whoami", get(whoami))
            .route_layer(middleware::from_fn_with_state(
                state.clone(),
                access_middleware,
            ))
            .with_state(state)
    }

    #[tokio::test]
    async fn middleware_attaches_identity_for_downstream_handlers() {
        let state = testing::state(Arc::default(), Arc::default());
        let user_id = Uuid::new_v4();

        let (status, body) = testing::send(
            whoami_router(state),
            testing::request("GET", "/whoami", Some(user_id), None),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user_id"], user_id.to_string());
    }

    #[tokio::test]
    async fn middleware_short_circuits_with_403() {
        let state = testing::state(Arc::default(), Arc::default());

        let (status, body) = testing::send(
            whoami_router(state),
            testing::request("GET", "/whoami", None, None),
        )
        .await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["message"], "missing or malformed credential");
    }
}
