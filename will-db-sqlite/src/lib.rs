mod factory;
mod repository;
mod value;

pub use factory::SqliteSessionStoreFactory;
pub use repository::SqliteSessionRepository;
