pub mod autofill;
pub mod context;
pub mod document;
pub mod formatting;
pub mod mirror;
pub mod models;
pub mod service;
pub mod session;
pub mod steps;
pub mod submission_log;
pub mod validation;

pub use document::{DocumentError, DocumentKind, DocumentRenderer, RenderError, RenderRequest};
pub use models::*;
pub use service::{SubmissionError, SubmissionOutcome, WillService};
pub use session::{
    RepositoryError, SessionId, SessionRepository, SessionStoreConfig, SessionStoreFactory,
    SessionStoreRegistry,
};
pub use steps::FormSession;
pub use submission_log::{LogError, SubmissionLog, SubmissionRow};
pub use validation::ValidationError;
