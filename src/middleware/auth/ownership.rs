//! Resource ownership check, run after `access_middleware`.
//!
//! Looks up the owner of the resource named by the single `{id}` path
//! parameter and refuses the request when the authenticated caller is
//! someone else.
//!
//! Lookup failures are returned as they are (404 for a missing resource,
//! 500 for a database error); they are never turned into a 403.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::api::v1::extractors::{AuthCtx, ResourceId};
use crate::error::AppError;
use crate::repos::owner::OwnerLookup;
use crate::services::auth::AuthError;

#[derive(Clone)]
pub struct OwnershipGuard {
    owners: Arc<dyn OwnerLookup>,
}

impl OwnershipGuard {
    pub fn new(owners: Arc<dyn OwnerLookup>) -> Self {
        Self { owners }
    }

    /// One read from the owner lookup, then the comparison.
    pub async fn authorize(
        &self,
        resource_id: Uuid,
        identity: Option<&AuthCtx>,
    ) -> Result<(), AppError> {
        let owner = self.owners.owner_of(resource_id).await?;
        check_owner(identity, owner)?;
        Ok(())
    }
}

/// Without an identity there is no ownership policy to apply.
pub fn check_owner(identity: Option<&AuthCtx>, owner: Uuid) -> Result<(), AuthError> {
    match identity {
        Some(ctx) if ctx.user_id != owner => Err(AuthError::NotOwner),
        _ => Ok(()),
    }
}

/// Route layer: `middleware::from_fn_with_state(guard, ownership_middleware)`.
pub async fn ownership_middleware(
    State(guard): State<OwnershipGuard>,
    ResourceId(resource_id): ResourceId,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let identity = req.extensions().get::<AuthCtx>();

    if let Err(err) = guard.authorize(resource_id, identity).await {
        tracing::warn!(
            %resource_id,
            user_id = ?identity.map(|ctx| ctx.user_id),
            error = %err,
            "ownership check refused request"
        );
        return Err(err);
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use axum::{Router, http::StatusCode, middleware, routing::get};

    use super::*;
    use crate::testing::{self, InMemoryRobots};

    fn guarded_router(robots: InMemoryRobots) -> Router {
        async fn reached() -> &'static str {
            "reached"
        }

        Router::new()
            .route("/things/{id}", get(reached))
            .route_layer(middleware::from_fn_with_state(
                OwnershipGuard::new(Arc::new(robots)),
                ownership_middleware,
            ))
    }

    #[test]
    fn matching_owner_passes() {
        let user_id = Uuid::new_v4();
        assert_eq!(check_owner(Some(&AuthCtx::new(user_id)), user_id), Ok(()));
    }

    #[test]
    fn other_owner_is_refused() {
        let ctx = AuthCtx::new(Uuid::new_v4());
        assert_eq!(
            check_owner(Some(&ctx), Uuid::new_v4()),
            Err(AuthError::NotOwner)
        );
    }

    #[test]
    fn no_identity_defines_no_policy() {
        assert_eq!(check_owner(None, Uuid::new_v4()), Ok(()));
    }

    #[tokio::test]
    async fn missing_resource_propagates_lookup_failure() {
        let guard = OwnershipGuard::new(Arc::new(InMemoryRobots::default()));
        let ctx = AuthCtx::new(Uuid::new_v4());

        let err = guard.authorize(Uuid::new_v4(), Some(&ctx)).await.unwrap_err();

        assert!(
            matches!(err, AppError::NotFound { resource: "robot" }),
            "got {err:?}"
        );
    }

    #[tokio::test]
    async fn guard_compares_against_stored_owner() {
        let owner = Uuid::new_v4();
        let robots = InMemoryRobots::with(vec![testing::robot("Bender", owner)]);
        let robot_id = robots.ids()[0];
        let guard = OwnershipGuard::new(Arc::new(robots));

        assert!(guard.authorize(robot_id, Some(&AuthCtx::new(owner))).await.is_ok());

        let err = guard
            .authorize(robot_id, Some(&AuthCtx::new(Uuid::new_v4())))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(AuthError::NotOwner)));
    }

    #[tokio::test]
    async fn middleware_without_identity_passes_to_the_handler() {
        let robots = InMemoryRobots::with(vec![testing::robot("Bender", Uuid::new_v4())]);
        let robot_id = robots.ids()[0];

        let (status, _) = testing::send(
            guarded_router(robots),
            testing::request("GET", &format!("/things/{robot_id}"), None, None),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn middleware_with_other_identity_is_refused() {
        let robots = InMemoryRobots::with(vec![testing::robot("Bender", Uuid::new_v4())]);
        let robot_id = robots.ids()[0];
        let mut req = testing::request("GET", &format!("/things/{robot_id}"), None, None);
        req.extensions_mut().insert(AuthCtx::new(Uuid::new_v4()));

        let (status, body) = testing::send(guarded_router(robots), req).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["message"], "not resource owner");
    }

    #[tokio::test]
    async fn malformed_id_is_a_json_400() {
        let (status, body) = testing::send(
            guarded_router(InMemoryRobots::default()),
            testing::request("GET", "/things/not-a-uuid", None, None),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_ID");
    }
}
