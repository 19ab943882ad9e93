/*
 * Responsibility
 * - /robots CRUD handlers
 * - create takes the owner from AuthCtx (a deleted owner is an invalid credential, not a 500)
 * - update/delete run behind the access + ownership layers, so reaching them means the caller owns the robot
 */
use axum::{Json, extract::State, http::StatusCode};

use crate::{
    api::v1::{
        dto::{
            DeletedEnvelope,
            robots::{CreateRobotRequest, RobotEnvelope, RobotListEnvelope, UpdateRobotRequest},
        },
        extractors::{ApiJson, AuthCtxExtractor, ResourceId},
    },
    error::AppError,
    repos::error::RepoError,
    services::auth::AuthError,
    state::AppState,
};

pub async fn list_robots(
    State(state): State<AppState>,
) -> Result<Json<RobotListEnvelope>, AppError> {
    let rows = state.robots.list().await?;

    Ok(Json(RobotListEnvelope {
        robots: rows.into_iter().map(Into::into).collect(),
    }))
}

pub async fn get_robot(
    State(state): State<AppState>,
    ResourceId(robot_id): ResourceId,
) -> Result<Json<RobotEnvelope>, AppError> {
    let row = state.robots.get(robot_id).await?;

    Ok(Json(RobotEnvelope { robot: row.into() }))
}

pub async fn create_robot(
    State(state): State<AppState>,
    AuthCtxExtractor(auth): AuthCtxExtractor,
    ApiJson(req): ApiJson<CreateRobotRequest>,
) -> Result<(StatusCode, Json<RobotEnvelope>), AppError> {
    req.validate()
        .map_err(|msg| AppError::bad_request("INVALID_ROBOT", msg))?;

    // A still-valid token can outlive its user; the owner FK then has nothing to point at.
    let row = state
        .robots
        .create(req.into_new_robot(auth.user_id))
        .await
        .map_err(|e| match e {
            RepoError::MissingReference => {
                tracing::warn!(user_id = %auth.user_id, "robot create refused: token subject no longer exists");
                AppError::Forbidden(AuthError::CredentialInvalid)
            }
            other => other.into(),
        })?;
    tracing::info!(robot_id = %row.id, owner_id = %row.owner_id, "robot created");

    Ok((StatusCode::CREATED, Json(RobotEnvelope { robot: row.into() })))
}

pub async fn update_robot(
    State(state): State<AppState>,
    ResourceId(robot_id): ResourceId,
    ApiJson(req): ApiJson<UpdateRobotRequest>,
) -> Result<Json<RobotEnvelope>, AppError> {
    req.validate()
        .map_err(|msg| AppError::bad_request("INVALID_ROBOT", msg))?;

    let row = state.robots.update(robot_id, req.into()).await?;

    Ok(Json(RobotEnvelope { robot: row.into() }))
}

pub async fn delete_robot(
    State(state): State<AppState>,
    ResourceId(robot_id): ResourceId,
) -> Result<Json<DeletedEnvelope>, AppError> {
    let id = state.robots.delete(robot_id).await?;
    tracing::info!(robot_id = %id, "robot deleted");

    Ok(Json(DeletedEnvelope { id }))
}
