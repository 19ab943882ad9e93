/*
 * Responsibility
 * - Robots request/response DTOs
 * - validate() checks shape only; ownership comes from the token, never the body
 */
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::repos::robot_repo::{NewRobot, RobotChanges, RobotRow};

pub const MAX_STAT: i16 = 10;
const MAX_IMAGE_LEN: usize = 2048;

fn check_stat(name: &'static str, value: i16) -> Result<(), &'static str> {
    if !(0..=MAX_STAT).contains(&value) {
        return Err(name);
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct CreateRobotRequest {
    pub name: String,
    pub image: String,
    pub speed: i16,
    pub strength: i16,
    pub creation_date: Option<NaiveDate>,
}

impl CreateRobotRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.name.trim().is_empty() {
            return Err("name is required");
        }
        if self.image.trim().is_empty() {
            return Err("image is required");
        }
        if self.image.chars().count() > MAX_IMAGE_LEN {
            return Err("image must be <= 2048 chars");
        }
        check_stat("speed must be between 0 and 10", self.speed)?;
        check_stat("strength must be between 0 and 10", self.strength)?;

        Ok(())
    }

    pub fn into_new_robot(self, owner_id: Uuid) -> NewRobot {
        NewRobot {
            name: self.name.trim().to_string(),
            image: self.image,
            speed: self.speed,
            strength: self.strength,
            creation_date: self.creation_date,
            owner_id,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateRobotRequest {
    pub name: Option<String>,
    pub image: Option<String>,
    pub speed: Option<i16>,
    pub strength: Option<i16>,
    pub creation_date: Option<NaiveDate>,
}

impl UpdateRobotRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if let Some(name) = &self.name
            && name.trim().is_empty()
        {
            return Err("name cannot be empty");
        }
        if let Some(image) = &self.image
            && (image.trim().is_empty() || image.chars().count() > MAX_IMAGE_LEN)
        {
            return Err("image must be 1..=2048 chars");
        }
        if let Some(speed) = self.speed {
            check_stat("speed must be between 0 and 10", speed)?;
        }
        if let Some(strength) = self.strength {
            check_stat("strength must be between 0 and 10", strength)?;
        }

        Ok(())
    }
}

impl From<UpdateRobotRequest> for RobotChanges {
    fn from(req: UpdateRobotRequest) -> Self {
        Self {
            name: req.name.map(|n| n.trim().to_string()),
            image: req.image,
            speed: req.speed,
            strength: req.strength,
            creation_date: req.creation_date,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RobotResponse {
    pub id: Uuid,
    pub name: String,
    pub image: String,
    pub speed: i16,
    pub strength: i16,
    pub creation_date: NaiveDate,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<RobotRow> for RobotResponse {
    fn from(row: RobotRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            image: row.image,
            speed: row.speed,
            strength: row.strength,
            creation_date: row.creation_date,
            owner_id: row.owner_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RobotEnvelope {
    pub robot: RobotResponse,
}

#[derive(Debug, Serialize)]
pub struct RobotListEnvelope {
    pub robots: Vec<RobotResponse>,
}
