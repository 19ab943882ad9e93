/**
 * Responsibility
 * - the meaning a repo reports upward (not found / conflict / dangling reference / db failure)
 */
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("{resource} not found")]
    NotFound { resource: &'static str },
    #[error("conflict")]
    Conflict,
    #[error("referenced row does not exist")]
    MissingReference,
    #[error("db error")]
    Db(#[from] sqlx::Error),
}

pub type RepoResult<T> = Result<T, RepoError>;

impl RepoError {
    pub fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }

    pub fn from_sqlx(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(dbe) = &e {
            match dbe.code().as_deref() {
                // unique_violation
                Some("23505") => return RepoError::Conflict,
                // foreign_key_violation
                Some("23503") => return RepoError::MissingReference,
                _ => {}
            }
        }
        RepoError::Db(e)
    }
}
