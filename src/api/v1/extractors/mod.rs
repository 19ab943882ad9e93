/*
 * Responsibility
 * - request extractors shared by v1 handlers
 */
mod auth_ctx;
mod input;

pub use auth_ctx::{AuthCtx, AuthCtxExtractor};
pub use input::{ApiJson, ResourceId};
