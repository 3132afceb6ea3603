pub mod app;
pub mod config;
pub mod csv_log;
pub mod intake;
pub mod logging;
pub mod renderer;

pub use config::{ConfigError, WillConfig};
pub use csv_log::CsvSubmissionLog;
pub use intake::{IntakeError, IntakeLoader, IntakeRecord};
pub use renderer::TeraDocumentRenderer;
