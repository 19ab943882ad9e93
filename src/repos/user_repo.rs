/*
 * Responsibility
 * - SQLx operations on the users table
 * - takes a PgPool at construction and provides CRUD
 * - passwords arrive already hashed; this layer never sees plaintext
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::repos::error::{RepoError, RepoResult};
use crate::repos::owner::OwnerLookup;

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    #[sqlx(rename = "userId")]
    pub id: Uuid,
    #[sqlx(rename = "userName")]
    pub user_name: String,
    pub email: String,
    #[sqlx(rename = "passwordHash")]
    pub password_hash: String,
    #[sqlx(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub user_name: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub user_name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn list(&self) -> RepoResult<Vec<UserRow>>;
    async fn get(&self, user_id: Uuid) -> RepoResult<UserRow>;
    async fn find_by_name(&self, user_name: &str) -> RepoResult<UserRow>;
    async fn create(&self, user: NewUser) -> RepoResult<UserRow>;
    async fn update(&self, user_id: Uuid, changes: UserChanges) -> RepoResult<UserRow>;
    async fn delete(&self, user_id: Uuid) -> RepoResult<Uuid>;
}

#[derive(Clone, Debug)]
pub struct PgUserRepo {
    pool: PgPool,
}

impl PgUserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserRepo {
    async fn list(&self) -> RepoResult<Vec<UserRow>> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT "userId", "userName", email, "passwordHash", "createdAt"
            FROM users
            ORDER BY "createdAt" DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn get(&self, user_id: Uuid) -> RepoResult<UserRow> {
        sqlx::query_as::<_, UserRow>(
            r#"
            SELECT "userId", "userName", email, "passwordHash", "createdAt"
            FROM users
            WHERE "userId" = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepoError::not_found("user"))
    }

    async fn find_by_name(&self, user_name: &str) -> RepoResult<UserRow> {
        sqlx::query_as::<_, UserRow>(
            r#"
            SELECT "userId", "userName", email, "passwordHash", "createdAt"
            FROM users
            WHERE "userName" = $1
            "#,
        )
        .bind(user_name)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepoError::not_found("user"))
    }

    async fn create(&self, user: NewUser) -> RepoResult<UserRow> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users ("userName", email, "passwordHash")
            VALUES ($1, $2, $3)
            RETURNING "userId", "userName", email, "passwordHash", "createdAt"
            "#,
        )
        .bind(&user.user_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(row)
    }

    async fn update(&self, user_id: Uuid, changes: UserChanges) -> RepoResult<UserRow> {
        sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET
                "userName" = COALESCE($2, "userName"),
                email = COALESCE($3, email),
                "passwordHash" = COALESCE($4, "passwordHash")
            WHERE "userId" = $1
            RETURNING "userId", "userName", email, "passwordHash", "createdAt"
            "#,
        )
        .bind(user_id)
        .bind(changes.user_name)
        .bind(changes.email)
        .bind(changes.password_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)?
        .ok_or(RepoError::not_found("user"))
    }

    async fn delete(&self, user_id: Uuid) -> RepoResult<Uuid> {
        let result = sqlx::query(
            r#"
            DELETE FROM users
            WHERE "userId" = $1
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("user"));
        }
        Ok(user_id)
    }
}

// A user record is owned by the user it describes.
#[async_trait]
impl OwnerLookup for PgUserRepo {
    async fn owner_of(&self, user_id: Uuid) -> RepoResult<Uuid> {
        sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT "userId"
            FROM users
            WHERE "userId" = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepoError::not_found("user"))
    }
}
