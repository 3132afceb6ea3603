use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use super::SessionId;
use super::repository::{RepositoryError, SessionRepository};
use crate::steps::FormSession;

/// Process-local session store.
#[derive(Debug, Default)]
pub struct MemorySessionRepository {
    sessions: RwLock<HashMap<SessionId, FormSession>>,
}

impl MemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> RepositoryError {
    RepositoryError::Database("session store lock poisoned".to_string())
}

#[async_trait]
impl SessionRepository for MemorySessionRepository {
    async fn load(&self, id: &SessionId) -> Result<FormSession, RepositoryError> {
        let sessions = self.sessions.read().map_err(poisoned)?;
        sessions
            .get(id)
            .cloned()
            .ok_or(RepositoryError::NotFound(*id))
    }

    async fn save(&self, session: &FormSession) -> Result<(), RepositoryError> {
        let mut sessions = self.sessions.write().map_err(poisoned)?;
        sessions.insert(session.id, session.clone());
        Ok(())
    }

    async fn delete(&self, id: &SessionId) -> Result<(), RepositoryError> {
        let mut sessions = self.sessions.write().map_err(poisoned)?;
        sessions.remove(id);
        Ok(())
    }

    async fn list_sessions(&self) -> Result<Vec<SessionId>, RepositoryError> {
        let sessions = self.sessions.read().map_err(poisoned)?;
        let mut ids: Vec<_> = sessions.keys().copied().collect();
        ids.sort_unstable();
        Ok(ids)
    }

    async fn purge_expired(&self, older_than: DateTime<Utc>) -> Result<u64, RepositoryError> {
        let mut sessions = self.sessions.write().map_err(poisoned)?;
        let before = sessions.len();
        sessions.retain(|_, s| s.updated_at >= older_than);
        let removed = (before - sessions.len()) as u64;
        debug!(removed, "purged expired sessions");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::{FormFields, FormStep, StepPosition};

    #[tokio::test]
    async fn create_then_load() {
        let repo = MemorySessionRepository::new();

        let session = repo.create().await.unwrap();
        let loaded = repo.load(&session.id).await.unwrap();

        assert_eq!(loaded, session);
        assert_eq!(loaded.current_step, StepPosition::Step(FormStep::Personal));
    }

    #[tokio::test]
    async fn load_unknown_is_not_found() {
        let repo = MemorySessionRepository::new();
        let id = SessionId::new();

        assert_eq!(repo.load(&id).await, Err(RepositoryError::NotFound(id)));
    }

    #[tokio::test]
    async fn save_replaces_existing() {
        let repo = MemorySessionRepository::new();
        let mut session = repo.create().await.unwrap();
        let mut data = FormFields::new();
        data.insert("name", "Jane");
        session.accumulator.merge(data);

        repo.save(&session).await.unwrap();

        assert_eq!(repo.load(&session.id).await.unwrap().accumulator.text("name"), "Jane");
        assert_eq!(repo.list_sessions().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let repo = MemorySessionRepository::new();
        let session = repo.create().await.unwrap();

        repo.delete(&session.id).await.unwrap();
        repo.delete(&session.id).await.unwrap();

        assert!(repo.list_sessions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn purge_removes_only_stale_sessions() {
        let repo = MemorySessionRepository::new();
        let now = Utc::now();
        let stale = FormSession::with_id(SessionId::new(), now - TimeDelta::hours(3));
        let fresh = FormSession::with_id(SessionId::new(), now);
        repo.save(&stale).await.unwrap();
        repo.save(&fresh).await.unwrap();

        let removed = repo.purge_expired(now - TimeDelta::hours(1)).await.unwrap();

        assert_eq!(removed, 1);
        assert_eq!(repo.list_sessions().await.unwrap(), vec![fresh.id]);
    }
}
