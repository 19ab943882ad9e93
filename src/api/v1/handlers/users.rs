/*
 * Responsibility
 * - /users handlers: register / login, plus CRUD
 * - passwords are hashed here (blocking pool) before reaching the repo
 * - update/delete run behind the access + ownership layers (a user owns their own record)
 */
use axum::{Json, extract::State, http::StatusCode};

use crate::{
    api::v1::{
        dto::{
            DeletedEnvelope,
            users::{
                LoginRequest, LoginResponse, RegisterRequest, UpdateUserRequest, UserEnvelope,
                UserListEnvelope,
            },
        },
        extractors::{ApiJson, ResourceId},
    },
    error::AppError,
    repos::{
        error::RepoError,
        user_repo::{NewUser, UserChanges},
    },
    services::{auth::AuthError, password},
    state::AppState,
};

pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<UserEnvelope>), AppError> {
    req.validate()
        .map_err(|msg| AppError::bad_request("INVALID_USER", msg))?;

    let password_hash = password::hash_blocking(req.password).await?;

    let row = state
        .users
        .create(NewUser {
            user_name: req.user_name.trim().to_string(),
            email: req.email.trim().to_string(),
            password_hash,
        })
        .await
        .map_err(|e| match e {
            RepoError::Conflict => AppError::conflict("user_name or email already registered"),
            other => other.into(),
        })?;

    tracing::info!(user_id = %row.id, "user registered");

    Ok((StatusCode::CREATED, Json(UserEnvelope { user: row.into() })))
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    req.validate()
        .map_err(|msg| AppError::bad_request("INVALID_LOGIN", msg))?;

    let user = match state.users.find_by_name(req.user_name.trim()).await {
        Ok(user) => user,
        Err(RepoError::NotFound { .. }) => {
            // same Argon2 cost as a wrong password, so timing does not reveal user names
            password::verify_absent_blocking(req.password).await?;
            return Err(AuthError::BadLogin.into());
        }
        Err(e) => return Err(e.into()),
    };

    if !password::verify_blocking(req.password, user.password_hash).await? {
        tracing::info!(user_id = %user.id, "login refused: wrong password");
        return Err(AuthError::BadLogin.into());
    }

    let issued = state.issuer.issue_access_token(user.id, &user.user_name)?;

    Ok(Json(LoginResponse {
        token: issued.token,
        token_type: "Bearer",
        expires_in: issued.expires_in,
    }))
}

pub async fn list_users(State(state): State<AppState>) -> Result<Json<UserListEnvelope>, AppError> {
    let rows = state.users.list().await?;

    Ok(Json(UserListEnvelope {
        users: rows.into_iter().map(Into::into).collect(),
    }))
}

pub async fn get_user(
    State(state): State<AppState>,
    ResourceId(user_id): ResourceId,
) -> Result<Json<UserEnvelope>, AppError> {
    let row = state.users.get(user_id).await?;

    Ok(Json(UserEnvelope { user: row.into() }))
}

pub async fn update_user(
    State(state): State<AppState>,
    ResourceId(user_id): ResourceId,
    ApiJson(req): ApiJson<UpdateUserRequest>,
) -> Result<Json<UserEnvelope>, AppError> {
    req.validate()
        .map_err(|msg| AppError::bad_request("INVALID_USER", msg))?;

    let password_hash = match req.password {
        Some(plain) => Some(password::hash_blocking(plain).await?),
        None => None,
    };

    let changes = UserChanges {
        user_name: req.user_name.map(|n| n.trim().to_string()),
        email: req.email.map(|e| e.trim().to_string()),
        password_hash,
    };

    let row = state
        .users
        .update(user_id, changes)
        .await
        .map_err(|e| match e {
            RepoError::Conflict => AppError::conflict("user_name or email already registered"),
            other => other.into(),
        })?;

    Ok(Json(UserEnvelope { user: row.into() }))
}

pub async fn delete_user(
    State(state): State<AppState>,
    ResourceId(user_id): ResourceId,
) -> Result<Json<DeletedEnvelope>, AppError> {
    let id = state.users.delete(user_id).await?;
    tracing::info!(user_id = %id, "user deleted");

    Ok(Json(DeletedEnvelope { id }))
}
