//! Wiring shared by the binaries: stores, renderer, log and the batch run.

use anyhow::{Context, Result};
use tracing::{info, warn};
use will_core::{SessionStoreRegistry, SubmissionError, SubmissionOutcome, WillService};
use will_db_sqlite::SqliteSessionStoreFactory;

use crate::config::WillConfig;
use crate::csv_log::CsvSubmissionLog;
use crate::intake::IntakeRecord;
use crate::renderer::TeraDocumentRenderer;

/// Every session store this build knows about.
pub fn build_registry() -> SessionStoreRegistry {
    let mut registry = SessionStoreRegistry::with_memory();
    registry.register(Box::new(SqliteSessionStoreFactory));
    registry
}

pub async fn build_service(config: &WillConfig) -> Result<WillService> {
    let store = config.sessions.store();
    let sessions = build_registry()
        .create(&store)
        .await
        .with_context(|| format!("cannot open '{}' session store", store.backend))?;
    let renderer = TeraDocumentRenderer::new(
        &config.storage.documents_dir,
        config.storage.template_dir.as_deref(),
    )
    .context("cannot load document templates")?;
    let log = CsvSubmissionLog::new(&config.storage.submission_log);

    Ok(WillService::new(sessions, Box::new(renderer), Box::new(log)))
}

/// Walks one record through all five steps and the final submission.
pub async fn submit_record(
    service: &WillService,
    record: &IntakeRecord,
) -> Result<SubmissionOutcome, SubmissionError> {
    let session = service.start().await?;
    for (number, payload) in record.payloads() {
        service
            .submit_step(&session.id, number, payload.clone())
            .await?;
    }
    service.finalize(&session.id, Default::default()).await
}

#[derive(Debug, Default)]
pub struct BatchSummary {
    pub generated: usize,
    pub mirrors: usize,
    pub failed: Vec<(usize, String)>,
}

/// Submits `records` in order. Stops at the first failure unless
/// `keep_going` is set.
pub async fn run_batch(
    service: &WillService,
    records: &[IntakeRecord],
    keep_going: bool,
) -> BatchSummary {
    let mut summary = BatchSummary::default();
    for record in records {
        match submit_record(service, record).await {
            Ok(outcome) => {
                info!(row = record.row, "{}", outcome.message());
                summary.generated += 1;
                if outcome.mirror_path.is_some() {
                    summary.mirrors += 1;
                }
            }
            Err(e) => {
                warn!(row = record.row, "submission failed: {}", e);
                summary.failed.push((record.row, e.to_string()));
                if !keep_going {
                    break;
                }
            }
        }
    }
    summary
}
