use super::session::{SessionId, SurveySession};

/// Storage abstraction for in-progress survey sessions.
pub trait SessionRepository: Send + Sync {
    fn insert(&self, session: SurveySession) -> Result<SurveySession, RepositoryError>;
    fn fetch(&self, id: &SessionId) -> Result<Option<SurveySession>, RepositoryError>;

    /// Apply `change` to the stored session as one read-modify-write.
    ///
    /// No other write to the same session may interleave with `change`, and the stored copy
    /// is only replaced when `change` returns `Ok`.
    fn modify<T, E, F>(&self, id: &SessionId, change: F) -> Result<T, E>
    where
        F: FnOnce(&mut SurveySession) -> Result<T, E>,
        E: From<RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("session already exists")]
    Conflict,
    #[error("session not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
