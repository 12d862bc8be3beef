pub mod audit_repository;
pub mod party_repository;
pub mod user_repository;
pub mod vote_repository;

pub use audit_repository::{AuditRepository, SqliteAuditRepository};
pub use party_repository::{PartyRepository, SqlitePartyRepository};
pub use user_repository::{SqliteUserRepository, UserRepository};
pub use vote_repository::{SqliteVoteRepository, VoteRepository};

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Record not found")]
    NotFound,
    #[error("Record already exists")]
    AlreadyExists,
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// SQLite surfaces constraint failures as generic database errors; the
/// message text is the only way to tell them apart.
pub(crate) fn map_constraint_violation(e: sqlx::Error) -> RepositoryError {
    let message = e.to_string();
    if message.contains("UNIQUE") {
        RepositoryError::AlreadyExists
    } else if message.contains("FOREIGN KEY") {
        RepositoryError::NotFound
    } else {
        RepositoryError::Database(e)
    }
}
