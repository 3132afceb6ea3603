use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, sqlite::SqlitePool};
use tracing::debug;
use will_core::{
    FormFields, FormSession, RepositoryError, SessionId, SessionRepository, StepPosition,
};

use crate::value::{encode_value, get_form_value};

/// Sessions in two tables: `form_session` for the header and `form_field`
/// for the accumulated fields, one row each.
pub struct SqliteSessionRepository {
    pool: SqlitePool,
}

impl SqliteSessionRepository {
    pub async fn connect(database_url: &str) -> Result<Self, RepositoryError> {
        let pool = SqlitePool::connect(database_url)
            .await
            .map_err(|e| RepositoryError::Connection(format!("{}: {}", database_url, e)))?;
        Ok(Self { pool })
    }

    pub async fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<(), RepositoryError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(format!("Failed to run migrations: {}", e)))?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn load_fields(
        &self,
        id: &SessionId,
    ) -> Result<FormFields, RepositoryError> {
        let rows = sqlx::query("SELECT name, kind, value FROM form_field WHERE session_id = ?")
            .bind(id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        let mut fields = FormFields::new();
        for row in &rows {
            let name: String = row
                .try_get("name")
                .map_err(|e| RepositoryError::Database(format!("Failed to get name: {}", e)))?;
            fields.insert(name, get_form_value(row)?);
        }
        Ok(fields)
    }
}

fn parse_id(s: &str) -> Result<SessionId, RepositoryError> {
    s.parse()
        .map_err(|e| RepositoryError::Database(format!("Invalid session id '{}': {}", s, e)))
}

fn parse_step(s: &str) -> Result<StepPosition, RepositoryError> {
    StepPosition::parse(s)
        .ok_or_else(|| RepositoryError::Database(format!("Invalid step '{}'", s)))
}

fn row_to_session_header(row: &sqlx::sqlite::SqliteRow) -> Result<FormSession, RepositoryError> {
    let id: String = row
        .try_get("id")
        .map_err(|e| RepositoryError::Database(e.to_string()))?;
    let step: String = row
        .try_get("current_step")
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

    Ok(FormSession {
        id: parse_id(&id)?,
        current_step: parse_step(&step)?,
        accumulator: FormFields::new(),
        created_at: row
            .try_get::<DateTime<Utc>, _>("created_at")
            .map_err(|e| RepositoryError::Database(format!("Failed to get created_at: {}", e)))?,
        updated_at: row
            .try_get::<DateTime<Utc>, _>("updated_at")
            .map_err(|e| RepositoryError::Database(format!("Failed to get updated_at: {}", e)))?,
    })
}

#[async_trait]
impl SessionRepository for SqliteSessionRepository {
    async fn load(
        &self,
        id: &SessionId,
    ) -> Result<FormSession, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, current_step, created_at, updated_at FROM form_session WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?
        .ok_or(RepositoryError::NotFound(*id))?;

        let mut session = row_to_session_header(&row)?;
        session.accumulator = self.load_fields(id).await?;
        Ok(session)
    }

    async fn save(
        &self,
        session: &FormSession,
    ) -> Result<(), RepositoryError> {
        let id = session.id.to_string();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        sqlx::query(
            "INSERT INTO form_session (id, current_step, created_at, updated_at)
             VALUES (?, ?, ?, ?)
             ON CONFLICT (id) DO UPDATE SET
                current_step = excluded.current_step,
                updated_at = excluded.updated_at",
        )
        .bind(&id)
        .bind(session.current_step.as_str())
        .bind(session.created_at)
        .bind(session.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        sqlx::query("DELETE FROM form_field WHERE session_id = ?")
            .bind(&id)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        for (name, value) in session.accumulator.iter() {
            let (kind, stored) = encode_value(value);
            sqlx::query("INSERT INTO form_field (session_id, name, kind, value) VALUES (?, ?, ?, ?)")
                .bind(&id)
                .bind(name)
                .bind(kind)
                .bind(stored)
                .execute(&mut *tx)
                .await
                .map_err(|e| RepositoryError::Database(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;
        Ok(())
    }

    async fn delete(
        &self,
        id: &SessionId,
    ) -> Result<(), RepositoryError> {
        let id = id.to_string();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        sqlx::query("DELETE FROM form_field WHERE session_id = ?")
            .bind(&id)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;
        sqlx::query("DELETE FROM form_session WHERE id = ?")
            .bind(&id)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;
        Ok(())
    }

    async fn list_sessions(&self) -> Result<Vec<SessionId>, RepositoryError> {
        let rows = sqlx::query("SELECT id FROM form_session")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        let mut ids = rows
            .iter()
            .map(|row| {
                let id: String = row
                    .try_get("id")
                    .map_err(|e| RepositoryError::Database(e.to_string()))?;
                parse_id(&id)
            })
            .collect::<Result<Vec<_>, _>>()?;
        ids.sort_unstable();
        Ok(ids)
    }

    async fn purge_expired(
        &self,
        older_than: DateTime<Utc>,
    ) -> Result<u64, RepositoryError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        sqlx::query(
            "DELETE FROM form_field WHERE session_id IN
                (SELECT id FROM form_session WHERE updated_at < ?)",
        )
        .bind(older_than)
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;
        let result = sqlx::query("DELETE FROM form_session WHERE updated_at < ?")
            .bind(older_than)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        debug!(removed = result.rows_affected(), "purged expired sessions");
        Ok(result.rows_affected())
    }
}
