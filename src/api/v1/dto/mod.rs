use serde::Serialize;
use uuid::Uuid;

pub mod robots;
pub mod users;

/// Body of a successful DELETE: the id that was removed.
#[derive(Debug, Serialize)]
pub struct DeletedEnvelope {
    pub id: Uuid,
}
