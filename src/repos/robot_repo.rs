/*
 * Responsibility
 * - robots CRUD
 * - ownerId is a FK to users (CASCADE), read by the ownership guard
 */
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::repos::error::{RepoError, RepoResult};
use crate::repos::owner::OwnerLookup;

#[derive(Debug, Clone, FromRow)]
pub struct RobotRow {
    #[sqlx(rename = "robotId")]
    pub id: Uuid,

    pub name: String,
    pub image: String,
    pub speed: i16,
    pub strength: i16,

    #[sqlx(rename = "creationDate")]
    pub creation_date: NaiveDate,

    #[sqlx(rename = "ownerId")]
    pub owner_id: Uuid,

    #[sqlx(rename = "createdAt")]
    pub created_at: DateTime<Utc>,

    #[sqlx(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewRobot {
    pub name: String,
    pub image: String,
    pub speed: i16,
    pub strength: i16,
    pub creation_date: Option<NaiveDate>,
    pub owner_id: Uuid,
}

// None fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct RobotChanges {
    pub name: Option<String>,
    pub image: Option<String>,
    pub speed: Option<i16>,
    pub strength: Option<i16>,
    pub creation_date: Option<NaiveDate>,
}

#[async_trait]
pub trait RobotStore: Send + Sync {
    async fn list(&self) -> RepoResult<Vec<RobotRow>>;
    async fn get(&self, robot_id: Uuid) -> RepoResult<RobotRow>;
    async fn create(&self, robot: NewRobot) -> RepoResult<RobotRow>;
    async fn update(&self, robot_id: Uuid, changes: RobotChanges) -> RepoResult<RobotRow>;
    async fn delete(&self, robot_id: Uuid) -> RepoResult<Uuid>;
}

#[derive(Clone, Debug)]
pub struct PgRobotRepo {
    pool: PgPool,
}

impl PgRobotRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RobotStore for PgRobotRepo {
    async fn list(&self) -> RepoResult<Vec<RobotRow>> {
        let rows = sqlx::query_as::<_, RobotRow>(
            r#"
            SELECT
                "robotId", name, image, speed, strength,
                "creationDate", "ownerId", "createdAt", "updatedAt"
            FROM robots
            ORDER BY "createdAt" DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn get(&self, robot_id: Uuid) -> RepoResult<RobotRow> {
        sqlx::query_as::<_, RobotRow>(
            r#"
            SELECT
                "robotId", name, image, speed, strength,
                "creationDate", "ownerId", "createdAt", "updatedAt"
            FROM robots
            WHERE "robotId" = $1
            "#,
        )
        .bind(robot_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepoError::not_found("robot"))
    }

    async fn create(&self, robot: NewRobot) -> RepoResult<RobotRow> {
        let row = sqlx::query_as::<_, RobotRow>(
            r#"
            INSERT INTO robots (name, image, speed, strength, "creationDate", "ownerId")
            VALUES ($1, $2, $3, $4, COALESCE($5, CURRENT_DATE), $6)
            RETURNING
                "robotId", name, image, speed, strength,
                "creationDate", "ownerId", "createdAt", "updatedAt"
            "#,
        )
        .bind(&robot.name)
        .bind(&robot.image)
        .bind(robot.speed)
        .bind(robot.strength)
        .bind(robot.creation_date)
        .bind(robot.owner_id)
        .fetch_one(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(row)
    }

    async fn update(&self, robot_id: Uuid, changes: RobotChanges) -> RepoResult<RobotRow> {
        sqlx::query_as::<_, RobotRow>(
            r#"
            UPDATE robots
            SET
                name = COALESCE($2, name),
                image = COALESCE($3, image),
                speed = COALESCE($4, speed),
                strength = COALESCE($5, strength),
                "creationDate" = COALESCE($6, "creationDate"),
                "updatedAt" = now()
            WHERE "robotId" = $1
            RETURNING
                "robotId", name, image, speed, strength,
                "creationDate", "ownerId", "createdAt", "updatedAt"
            "#,
        )
        .bind(robot_id)
        .bind(changes.name)
        .bind(changes.image)
        .bind(changes.speed)
        .bind(changes.strength)
        .bind(changes.creation_date)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepoError::not_found("robot"))
    }

    async fn delete(&self, robot_id: Uuid) -> RepoResult<Uuid> {
        let result = sqlx::query(
            r#"
            DELETE FROM robots
            WHERE "robotId" = $1
            "#,
        )
        .bind(robot_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("robot"));
        }
        Ok(robot_id)
    }
}

#[async_trait]
impl OwnerLookup for PgRobotRepo {
    async fn owner_of(&self, robot_id: Uuid) -> RepoResult<Uuid> {
        sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT "ownerId"
            FROM robots
            WHERE "robotId" = $1
            "#,
        )
        .bind(robot_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepoError::not_found("robot"))
    }
}
