/*
 * Responsibility
 * - Users request/response DTOs
 * - the password hash never leaves the server (UserResponse has no such field)
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::repos::user_repo::UserRow;
use crate::services::password::MAX_PASSWORD_LENGTH;

const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_USER_NAME_LENGTH: usize = 64;

fn check_password(password: &str) -> Result<(), &'static str> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err("password must be at least 8 chars");
    }
    check_password_size(password)
}

// The hashing bound is in bytes, not chars.
fn check_password_size(password: &str) -> Result<(), &'static str> {
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err("password must be <= 512 bytes");
    }
    Ok(())
}

fn check_user_name(user_name: &str) -> Result<(), &'static str> {
    if user_name.chars().count() > MAX_USER_NAME_LENGTH {
        return Err("user_name must be <= 64 chars");
    }
    Ok(())
}

fn check_email(email: &str) -> Result<(), &'static str> {
    // Shape only; deliverability is not our concern
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err("email is invalid"),
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub user_name: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        let user_name = self.user_name.trim();
        if user_name.is_empty() {
            return Err("user_name is required");
        }
        check_user_name(user_name)?;
        check_email(self.email.trim())?;
        check_password(&self.password)?;

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub user_name: String,
    pub password: String,
}

impl LoginRequest {
    /// Size checks only; whether the credentials match is the login handler's job.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.user_name.trim().is_empty() {
            return Err("user_name is required");
        }
        check_password_size(&self.password)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub user_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl UpdateUserRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if let Some(name) = &self.user_name {
            let name = name.trim();
            if name.is_empty() {
                return Err("user_name cannot be empty");
            }
            check_user_name(name)?;
        }
        if let Some(email) = &self.email {
            check_email(email.trim())?;
        }
        if let Some(password) = &self.password {
            check_password(password)?;
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub user_name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<UserRow> for UserResponse {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            user_name: row.user_name,
            email: row.email,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserEnvelope {
    pub user: UserResponse,
}

#[derive(Debug, Serialize)]
pub struct UserListEnvelope {
    pub users: Vec<UserResponse>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
}
