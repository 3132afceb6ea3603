use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;

use super::memory::MemorySessionRepository;
use super::repository::{RepositoryError, SessionRepository};

/// Which session store to open and how to reach it.
///
/// `backend` must match the [`SessionStoreFactory::backend_name`] of a
/// registered factory. `connection_string` is handed to that factory as-is.
///
/// | backend  | connection_string examples             |
/// |----------|----------------------------------------|
/// | `memory` | ignored                                |
/// | `sqlite` | `sessions.db`, `:memory:`              |
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SessionStoreConfig {
    pub backend: String,
    pub connection_string: String,
}

impl Default for SessionStoreConfig {
    fn default() -> Self {
        Self {
            backend: MemorySessionStoreFactory::NAME.to_string(),
            connection_string: String::new(),
        }
    }
}

/// One per storage backend, registered with a [`SessionStoreRegistry`] at
/// startup.
#[async_trait]
pub trait SessionStoreFactory: Send + Sync {
    /// Unique, lowercase identifier for this backend.
    fn backend_name(&self) -> &'static str;

    /// Opens the store. Implementations may run migrations here.
    async fn create(
        &self,
        config: &SessionStoreConfig,
    ) -> Result<Box<dyn SessionRepository>, RepositoryError>;
}

/// Session store factories keyed by backend name.
pub struct SessionStoreRegistry {
    factories: HashMap<&'static str, Box<dyn SessionStoreFactory>>,
}

impl SessionStoreRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registry with the in-process `memory` backend already present.
    pub fn with_memory() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(MemorySessionStoreFactory));
        registry
    }

    /// Adds `factory`, replacing any factory with the same backend name.
    pub fn register(
        &mut self,
        factory: Box<dyn SessionStoreFactory>,
    ) {
        self.factories.insert(factory.backend_name(), factory);
    }

    /// Registered backend names, sorted.
    pub fn available_backends(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Opens the store named by `config.backend`.
    ///
    /// # Errors
    /// * [`RepositoryError::Configuration`] when no factory has that name.
    /// * Whatever the chosen factory returns.
    pub async fn create(
        &self,
        config: &SessionStoreConfig,
    ) -> Result<Box<dyn SessionRepository>, RepositoryError> {
        let factory = self
            .factories
            .get(config.backend.as_str())
            .ok_or_else(|| {
                RepositoryError::Configuration(format!(
                    "unknown backend '{}'; available: {:?}",
                    config.backend,
                    self.available_backends()
                ))
            })?;

        factory.create(config).await
    }
}

impl Default for SessionStoreRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Factory for [`MemorySessionRepository`].
pub struct MemorySessionStoreFactory;

impl MemorySessionStoreFactory {
    pub const NAME: &'static str = "memory";
}

#[async_trait]
impl SessionStoreFactory for MemorySessionStoreFactory {
    fn backend_name(&self) -> &'static str {
        Self::NAME
    }

    async fn create(
        &self,
        _config: &SessionStoreConfig,
    ) -> Result<Box<dyn SessionRepository>, RepositoryError> {
        Ok(Box::new(MemorySessionRepository::new()))
    }
}
