/*!
 * Path id and JSON body extractors
 *
 * Responsibility:
 * - wrap axum's `Path` / `Json` so malformed input is reported as an `AppError`
 *   (same JSON error body as every other failure) instead of axum's plain-text rejection
 *
 * Public API:
 * - ResourceId
 * - ApiJson
 */

mod core;

pub use self::core::{ApiJson, ResourceId};
