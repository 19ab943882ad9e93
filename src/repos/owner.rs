use async_trait::async_trait;
use uuid::Uuid;

use crate::repos::error::RepoResult;

/// Reads the owner of a resource by id.
///
/// Used by the ownership guard; a missing resource must surface as
/// `RepoError::NotFound`.
#[async_trait]
pub trait OwnerLookup: Send + Sync {
    async fn owner_of(&self, id: Uuid) -> RepoResult<Uuid>;
}
