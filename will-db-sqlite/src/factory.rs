use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use will_core::{RepositoryError, SessionRepository, SessionStoreConfig, SessionStoreFactory};

use crate::repository::SqliteSessionRepository;

/// Maps a connection string to a sqlx URL.
///
/// * `:memory:` becomes `sqlite::memory:`.
/// * Anything already starting with `sqlite:` is passed through.
/// * A bare path is opened read-write and created when missing.
fn database_url(connection_string: &str) -> String {
    match connection_string.trim() {
        "" | ":memory:" => "sqlite::memory:".to_string(),
        url if url.starts_with("sqlite:") => url.to_string(),
        path => format!("sqlite:{}?mode=rwc", path),
    }
}

/// [`SessionStoreFactory`] for SQLite.
///
/// ```rust,no_run
/// use will_core::SessionStoreRegistry;
/// use will_db_sqlite::SqliteSessionStoreFactory;
///
/// let mut registry = SessionStoreRegistry::with_memory();
/// registry.register(Box::new(SqliteSessionStoreFactory));
/// ```
pub struct SqliteSessionStoreFactory;

impl SqliteSessionStoreFactory {
    pub const NAME: &'static str = "sqlite";
}

#[async_trait]
impl SessionStoreFactory for SqliteSessionStoreFactory {
    fn backend_name(&self) -> &'static str {
        Self::NAME
    }

    /// Opens the database and applies pending migrations.
    async fn create(
        &self,
        config: &SessionStoreConfig,
    ) -> Result<Box<dyn SessionRepository>, RepositoryError> {
        let url = database_url(&config.connection_string);
        let repo = if url == "sqlite::memory:" {
            // every pooled connection would otherwise see its own empty database
            let pool = SqlitePoolOptions::new()
                .max_connections(1)
                .connect(&url)
                .await
                .map_err(|e| RepositoryError::Connection(format!("{}: {}", url, e)))?;
            SqliteSessionRepository::new_with_pool(pool).await
        } else {
            SqliteSessionRepository::connect(&url).await?
        };
        repo.run_migrations().await?;
        Ok(Box::new(repo))
    }
}
