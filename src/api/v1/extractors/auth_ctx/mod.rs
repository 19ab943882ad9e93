/*!
 * Authenticated caller context
 *
 * Responsibility:
 * - hand the identity that the access middleware attached to handlers
 * - axum specifics live in core, the type itself in types
 *
 * Public API:
 * - AuthCtx
 * - AuthCtxExtractor
 */

mod core;
mod types;

pub use self::core::AuthCtxExtractor;
pub use self::types::AuthCtx;
