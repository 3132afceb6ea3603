use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use super::SessionId;
use crate::steps::FormSession;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Session not found: {0}")]
    NotFound(SessionId),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Storage for in-progress [`FormSession`]s, keyed by [`SessionId`].
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Stores and returns a fresh session at step 1.
    async fn create(&self) -> Result<FormSession, RepositoryError> {
        let session = FormSession::new();
        self.save(&session).await?;
        Ok(session)
    }

    async fn load(&self, id: &SessionId) -> Result<FormSession, RepositoryError>;

    /// Inserts or replaces the session with the same id.
    async fn save(&self, session: &FormSession) -> Result<(), RepositoryError>;

    /// Removes a session. Deleting an unknown id is not an error.
    async fn delete(&self, id: &SessionId) -> Result<(), RepositoryError>;

    async fn list_sessions(&self) -> Result<Vec<SessionId>, RepositoryError>;

    /// Drops every session last updated before `older_than` and returns how
    /// many were removed.
    async fn purge_expired(&self, older_than: DateTime<Utc>) -> Result<u64, RepositoryError>;
}
