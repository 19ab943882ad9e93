/*
 * Responsibility
 * - persistence behind traits (RobotStore / UserStore / OwnerLookup)
 * - Postgres implementations are built once at startup and injected via AppState
 */
pub mod error;
pub mod owner;
pub mod robot_repo;
pub mod user_repo;
