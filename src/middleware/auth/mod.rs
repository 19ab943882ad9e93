pub mod access;
pub mod ownership;

pub use access::access_middleware;
pub use ownership::{OwnershipGuard, ownership_middleware};
