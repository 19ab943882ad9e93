/*
 * Responsibility
 * - shared context bound to the Router (AppState)
 *   - repositories, token verifier / issuer, built once at startup
 * - cheap to Clone (Arc inside)
 */
use std::sync::Arc;

use crate::repos::{owner::OwnerLookup, robot_repo::RobotStore, user_repo::UserStore};
use crate::services::auth::{TokenIssuer, TokenVerifier};

#[derive(Clone)]
pub struct AppState {
    pub robots: Arc<dyn RobotStore>,
    pub robot_owners: Arc<dyn OwnerLookup>,
    pub users: Arc<dyn UserStore>,
    pub user_owners: Arc<dyn OwnerLookup>,
    pub verifier: Arc<dyn TokenVerifier>,
    pub issuer: Arc<TokenIssuer>,
}

impl AppState {
    pub fn new<R, U>(
        robots: Arc<R>,
        users: Arc<U>,
        verifier: Arc<dyn TokenVerifier>,
        issuer: Arc<TokenIssuer>,
    ) -> Self
    where
        R: RobotStore + OwnerLookup + 'static,
        U: UserStore + OwnerLookup + 'static,
    {
        Self {
            robots: robots.clone(),
            robot_owners: robots,
            users: users.clone(),
            user_owners: users,
            verifier,
            issuer,
        }
    }
}
