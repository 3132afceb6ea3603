//! The five-step intake state machine.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::mirror::is_spouse_relation;
use crate::models::fields::{self, PoaTrack};
use crate::models::{BeneficiarySlot, FormAccumulator, FormFields, FormStep, StepPosition};
use crate::session::SessionId;
use crate::validation::{ValidationError, validate_share_total};

/// Address subfields an attorney must supply. The regional municipality is
/// optional here even though the applicant must give one.
const ATTORNEY_ADDRESS: [&str; 5] = [
    fields::STREET_NUMBER,
    fields::STREET_NAME,
    fields::CITY,
    fields::PROVINCE,
    fields::POSTAL_CODE,
];

/// One in-progress submission: where the user is and everything accepted so
/// far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSession {
    pub id: SessionId,
    pub current_step: StepPosition,
    pub accumulator: FormAccumulator,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FormSession {
    /// Fresh session at step 1 with an empty accumulator.
    pub fn new() -> Self {
        Self::with_id(SessionId::new(), Utc::now())
    }

    pub fn with_id(
        id: SessionId,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            current_step: StepPosition::default(),
            accumulator: FormAccumulator::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.current_step.is_complete()
    }

    /// Untouched for longer than `ttl` as of `now`.
    pub fn is_expired(
        &self,
        ttl: TimeDelta,
        now: DateTime<Utc>,
    ) -> bool {
        now - self.updated_at > ttl
    }

    /// Validates and accepts one step.
    ///
    /// Steps ahead of the cursor are refused with
    /// [`ValidationError::StepOutOfOrder`], a deliberate tightening over
    /// accepting any step number: no step's validation can be skipped.
    /// Earlier steps may be submitted again and never move the cursor
    /// backwards. On error nothing changes.
    pub fn submit(
        &mut self,
        step: FormStep,
        data: FormFields,
    ) -> Result<StepPosition, ValidationError> {
        if StepPosition::Step(step) > self.current_step {
            return Err(ValidationError::StepOutOfOrder {
                requested: step,
                current: self.current_step,
            });
        }

        validate_step(step, &data, &self.accumulator)?;

        let previous = self.current_step;
        self.accumulator.merge(data);
        self.current_step = self.current_step.max(step.next());
        self.updated_at = Utc::now();

        debug!(
            session = %self.id,
            "accepted {}: {} -> {}",
            step,
            previous,
            self.current_step
        );
        Ok(self.current_step)
    }

    /// [`submit`](Self::submit) with a raw 1-based step number.
    pub fn submit_number(
        &mut self,
        step_number: u8,
        data: FormFields,
    ) -> Result<StepPosition, ValidationError> {
        let step = FormStep::from_number(step_number)
            .ok_or(ValidationError::InvalidStep(step_number))?;
        self.submit(step, data)
    }
}

impl Default for FormSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Checks `data` against the rules of `step`, stopping at the first problem.
///
/// `accumulator` holds the previously accepted steps; only the review step
/// looks at it.
pub fn validate_step(
    step: FormStep,
    data: &FormFields,
    accumulator: &FormAccumulator,
) -> Result<(), ValidationError> {
    match step {
        FormStep::Personal => validate_personal(data),
        FormStep::Executors => validate_executors(data),
        FormStep::Beneficiaries => validate_beneficiaries(data),
        FormStep::PowerOfAttorney => validate_power_of_attorney(data),
        FormStep::Review => validate_review(data, accumulator),
    }
}

fn validate_personal(data: &FormFields) -> Result<(), ValidationError> {
    if let Some(field) = fields::PERSONAL_REQUIRED
        .iter()
        .find(|f| !data.is_present(f))
    {
        return Err(ValidationError::MissingField(field.to_string()));
    }
    if let Some(field) = fields::ADDRESS_PARTS.iter().find(|f| !data.is_present(f)) {
        return Err(ValidationError::MissingAddressField(field.to_string()));
    }

    if !data.text(fields::EMAIL).contains('@') {
        return Err(ValidationError::InvalidEmail);
    }
    if data.trimmed(fields::PHONE).replace('-', "").chars().count() < 10 {
        return Err(ValidationError::PhoneTooShort);
    }
    if data.trimmed(fields::POSTAL_CODE).replace(' ', "").chars().count() < 6 {
        return Err(ValidationError::PostalCodeTooShort);
    }
    Ok(())
}

fn validate_executors(data: &FormFields) -> Result<(), ValidationError> {
    require_executor(
        data,
        "First",
        [fields::EXEC1_NAME, fields::EXEC1_RELATION, fields::EXEC1_DOB],
    )?;
    if data.flag(fields::INCLUDE_SECOND_EXECUTOR) {
        require_executor(
            data,
            "Second",
            [fields::EXEC2_NAME, fields::EXEC2_RELATION, fields::EXEC2_DOB],
        )?;
    }
    Ok(())
}

fn require_executor(
    data: &FormFields,
    executor: &'static str,
    [name, relation, dob]: [&str; 3],
) -> Result<(), ValidationError> {
    for (key, field) in [(name, "name"), (relation, "relation"), (dob, "date of birth")] {
        if !data.is_present(key) {
            return Err(ValidationError::MissingExecutorField { executor, field });
        }
    }
    Ok(())
}

fn validate_beneficiaries(data: &FormFields) -> Result<(), ValidationError> {
    let any_named = (1..=fields::FORM_BENEFICIARY_SLOTS)
        .any(|slot| BeneficiarySlot::read(data, slot).is_named());
    if !any_named {
        return Err(ValidationError::NoBeneficiaries);
    }
    validate_share_total(data)
}

fn validate_power_of_attorney(data: &FormFields) -> Result<(), ValidationError> {
    for track in PoaTrack::ALL {
        if !data.flag(track.include_key()) {
            continue;
        }
        let slot = track.primary_slot();
        let required = ["name", "relation", "dob"]
            .into_iter()
            .chain(ATTORNEY_ADDRESS);
        for attribute in required {
            if !data.is_present(&slot.key(attribute)) {
                let field = match attribute {
                    "dob" => "date of birth".to_string(),
                    other => other.replace('_', " "),
                };
                return Err(ValidationError::MissingAttorneyField { track, field });
            }
        }
    }
    Ok(())
}

fn validate_review(
    data: &FormFields,
    accumulator: &FormAccumulator,
) -> Result<(), ValidationError> {
    if !data.flag(fields::TERMS_AGREEMENT) {
        return Err(ValidationError::TermsNotAccepted);
    }
    if data.flag(fields::MIRROR_WILL) {
        let relation = if data.is_present(fields::EXEC1_RELATION) {
            data.text(fields::EXEC1_RELATION)
        } else {
            accumulator.text(fields::EXEC1_RELATION)
        };
        if !is_spouse_relation(&relation) {
            return Err(ValidationError::MirrorRequiresSpouse);
        }
    }
    Ok(())
}
