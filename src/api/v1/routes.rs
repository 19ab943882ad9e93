/*
 * Responsibility
 * - URL layout of v1
 * - which routes need a bearer token (access layer) and which also need ownership (guard layer)
 *
 * Layers added later wrap the earlier ones, so `access` is always added last:
 * request → access_middleware → ownership_middleware → handler
 */
use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{delete, get, patch, post},
};

use crate::api::v1::handlers::{
    health::health,
    robots::{create_robot, delete_robot, get_robot, list_robots, update_robot},
    users::{delete_user, get_user, list_users, login, register, update_user},
};
use crate::middleware::auth::{OwnershipGuard, access_middleware, ownership_middleware};
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let robot_guard = OwnershipGuard::new(state.robot_owners.clone());
    let user_guard = OwnershipGuard::new(state.user_owners.clone());

    let create_robot_route =
        post(create_robot).route_layer(from_fn_with_state(state.clone(), access_middleware));

    let owned_robot_routes = patch(update_robot)
        .merge(delete(delete_robot))
        .route_layer(from_fn_with_state(robot_guard, ownership_middleware))
        .route_layer(from_fn_with_state(state.clone(), access_middleware));

    let owned_user_routes = patch(update_user)
        .merge(delete(delete_user))
        .route_layer(from_fn_with_state(user_guard, ownership_middleware))
        .route_layer(from_fn_with_state(state, access_middleware));

    Router::new()
        .route("/health", get(health))
        .route("/robots", get(list_robots).merge(create_robot_route))
        .route(
            "/robots/{robot_id}",
            get(get_robot).merge(owned_robot_routes),
        )
        .route("/users/register", post(register))
        .route("/users/login", post(login))
        .route("/users", get(list_users))
        .route("/users/{user_id}", get(get_user).merge(owned_user_routes))
}
