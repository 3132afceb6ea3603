//! End-to-end submission flow over the three storage/output seams.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDateTime, TimeDelta, Utc};
use thiserror::Error;
use tracing::{info, warn};

use crate::autofill::{AutofillSuggestions, suggestions};
use crate::context::build_will_context;
use crate::document::{DocumentError, DocumentKind, DocumentRenderer, generate_document};
use crate::mirror::{EligibilityError, derive_mirror};
use crate::models::{FormAccumulator, FormFields, StepPosition, fields};
use crate::session::{RepositoryError, SessionId, SessionRepository};
use crate::steps::FormSession;
use crate::submission_log::{LogEntry, LogError, SubmissionLog, SubmissionRow};
use crate::validation::{ValidationError, validate_complete_form};

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Log(#[from] LogError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl SubmissionError {
    /// Validation failures are the user's to fix; everything else is a
    /// system error.
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// What a successful submission produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionOutcome {
    pub document_path: PathBuf,
    pub mirror_path: Option<PathBuf>,
    /// Set when a mirror will was requested but could not be derived.
    pub mirror_skipped: Option<EligibilityError>,
}

impl SubmissionOutcome {
    pub fn message(&self) -> String {
        let mut message = String::from("Will generated successfully!");
        if self.mirror_path.is_some() {
            message.push_str(" Mirror Will created successfully.");
        } else if self.mirror_skipped.is_some() {
            message.push_str(" Mirror Will was not created (spouse must be primary executor).");
        }
        message
    }
}

/// Sessions, renderer and submission log wired together.
pub struct WillService {
    sessions: Box<dyn SessionRepository>,
    renderer: Box<dyn DocumentRenderer>,
    log: Box<dyn SubmissionLog>,
}

impl WillService {
    pub fn new(
        sessions: Box<dyn SessionRepository>,
        renderer: Box<dyn DocumentRenderer>,
        log: Box<dyn SubmissionLog>,
    ) -> Self {
        Self {
            sessions,
            renderer,
            log,
        }
    }

    /// Opens a new session at step 1.
    pub async fn start(&self) -> Result<FormSession, SubmissionError> {
        let session = self.sessions.create().await?;
        info!(session = %session.id, "session started");
        Ok(session)
    }

    /// Validates and stores one step; returns where the session now stands.
    ///
    /// A rejected step leaves the stored session untouched.
    pub async fn submit_step(
        &self,
        id: &SessionId,
        step_number: u8,
        data: FormFields,
    ) -> Result<StepPosition, SubmissionError> {
        let mut session = self.sessions.load(id).await?;
        let position = session.submit_number(step_number, data)?;
        self.sessions.save(&session).await?;
        Ok(position)
    }

    /// Everything accepted so far.
    pub async fn form_data(
        &self,
        id: &SessionId,
    ) -> Result<FormAccumulator, SubmissionError> {
        Ok(self.sessions.load(id).await?.accumulator)
    }

    /// People already entered who can be copied into later slots.
    pub async fn autofill_suggestions(
        &self,
        id: &SessionId,
    ) -> Result<AutofillSuggestions, SubmissionError> {
        let accumulator = self.form_data(id).await?;
        Ok(suggestions(&accumulator))
    }

    /// Drops sessions idle for longer than `ttl`.
    pub async fn purge_expired(
        &self,
        ttl: TimeDelta,
    ) -> Result<u64, SubmissionError> {
        let cutoff: DateTime<Utc> = Utc::now() - ttl;
        Ok(self.sessions.purge_expired(cutoff).await?)
    }

    /// Final submission.
    ///
    /// Validation failures change nothing and keep the session for a retry.
    /// Once validation passes the session is discarded whether or not the
    /// documents could be produced.
    pub async fn finalize(
        &self,
        id: &SessionId,
        final_data: FormFields,
    ) -> Result<SubmissionOutcome, SubmissionError> {
        let session = self.sessions.load(id).await?;
        if !session.is_complete() {
            return Err(ValidationError::Incomplete {
                current: session.current_step,
            }
            .into());
        }

        let mut form = session.accumulator;
        form.merge(final_data);
        validate_complete_form(&form)?;

        let result = self.produce(&form, Local::now().naive_local());

        if let Err(e) = self.sessions.delete(id).await {
            warn!(session = %id, "could not discard session: {}", e);
        }
        if let Err(e) = &result {
            warn!(session = %id, "submission failed: {}", e);
        }
        result
    }

    fn produce(
        &self,
        form: &FormFields,
        at: NaiveDateTime,
    ) -> Result<SubmissionOutcome, SubmissionError> {
        let context = build_will_context(form);

        let document_path =
            generate_document(self.renderer.as_ref(), &context, DocumentKind::Main, at)?;
        self.record(form, DocumentKind::Main, &document_path, at)?;

        let mut outcome = SubmissionOutcome {
            document_path,
            mirror_path: None,
            mirror_skipped: None,
        };
        if !form.flag(fields::MIRROR_WILL) {
            return Ok(outcome);
        }

        match derive_mirror(&context) {
            Ok(mirror) => {
                let path = generate_document(
                    self.renderer.as_ref(),
                    mirror.context(),
                    DocumentKind::Mirror,
                    at,
                )?;
                self.record(form, DocumentKind::Mirror, &path, at)?;
                outcome.mirror_path = Some(path);
            }
            Err(e) => {
                warn!("Mirror will generation skipped: {}", e);
                outcome.mirror_skipped = Some(e);
            }
        }
        Ok(outcome)
    }

    fn record(
        &self,
        form: &FormFields,
        kind: DocumentKind,
        document_path: &Path,
        logged_at: NaiveDateTime,
    ) -> Result<(), LogError> {
        let entry = LogEntry {
            kind,
            document_path,
            logged_at,
        };
        self.log.append(&SubmissionRow::from_fields(form, &entry))?;
        info!(path = %document_path.display(), "{} logged", kind);
        Ok(())
    }
}
