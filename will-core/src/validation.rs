//! User-correctable input errors and the checks that produce them.

use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::formatting::{parse_decimal, round_half_up};
use crate::models::fields::{self, BeneficiaryPart, PoaTrack, beneficiary_key};
use crate::models::{BeneficiarySlot, FormFields, FormStep, StepPosition};

static ISO_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap_or_else(|e| panic!("invalid date pattern: {e}"))
});

/// Accepted distance between the share total and 100.
pub const SHARE_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Date fields checked for ISO format on final submission.
const DATE_FIELDS: [&str; 3] = [fields::DOB, fields::EXEC1_DOB, fields::EXEC2_DOB];

/// Why a step or the final submission was rejected.
///
/// Display strings are shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid step number: {0}")]
    InvalidStep(u8),

    #[error("Cannot submit {requested} while the form is at {current}")]
    StepOutOfOrder {
        requested: FormStep,
        current: StepPosition,
    },

    #[error("Form is not complete (currently at {current})")]
    Incomplete { current: StepPosition },

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Missing required address field: {0}")]
    MissingAddressField(String),

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("Phone number must be at least 10 digits")]
    PhoneTooShort,

    #[error("Postal code must be at least 6 characters")]
    PostalCodeTooShort,

    #[error("{executor} executor {field} is required")]
    MissingExecutorField {
        executor: &'static str,
        field: &'static str,
    },

    #[error("At least one beneficiary is required")]
    NoBeneficiaries,

    #[error("Beneficiary {slot}: invalid share value")]
    InvalidShare { slot: usize },

    #[error("Beneficiary shares must total 100% (currently {total}%)")]
    ShareTotal { total: Decimal },

    #[error("{track} attorney {field} is required")]
    MissingAttorneyField { track: PoaTrack, field: String },

    #[error("You must accept the terms and conditions")]
    TermsNotAccepted,

    #[error("Mirror will requires spouse to be primary executor")]
    MirrorRequiresSpouse,

    #[error("Invalid date format for {field}")]
    InvalidDate { field: String },

    #[error("Invalid wassiyat percentage: {value}")]
    InvalidPercentage { value: String },

    #[error("{}", join_messages(.0))]
    Multiple(Vec<ValidationError>),
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" | ")
}

impl ValidationError {
    fn share_total(total: Decimal) -> Self {
        let mut total = round_half_up(total);
        total.rescale(2);
        Self::ShareTotal { total }
    }
}

/// `YYYY-MM-DD` shape check; calendar validity is not checked.
pub fn is_iso_date(s: &str) -> bool {
    ISO_DATE.is_match(s)
}

/// Parses as a number within `0..=100`.
pub fn validate_percentage(s: &str) -> bool {
    if s.trim().is_empty() {
        return false;
    }
    parse_decimal(s).is_ok_and(|p| (Decimal::ZERO..=Decimal::ONE_HUNDRED).contains(&p))
}

/// Sum of the shares of every named beneficiary among the slots the form
/// renders. Blank shares count as zero.
pub fn beneficiary_share_total(fields: &FormFields) -> Result<Decimal, ValidationError> {
    let mut total = Decimal::ZERO;
    for slot in 1..=fields::FORM_BENEFICIARY_SLOTS {
        if !BeneficiarySlot::read(fields, slot).is_named() {
            continue;
        }
        let share = fields
            .decimal(&beneficiary_key(slot, BeneficiaryPart::Share))
            .map_err(|_| ValidationError::InvalidShare { slot })?;
        total += share;
    }
    Ok(total)
}

/// Shares must add up to 100 ± [`SHARE_TOLERANCE`] unless equal shares are
/// requested.
pub fn validate_share_total(fields: &FormFields) -> Result<(), ValidationError> {
    if fields.flag(fields::EQUAL_SHARES) {
        return Ok(());
    }
    let total = beneficiary_share_total(fields)?;
    if (total - Decimal::ONE_HUNDRED).abs() > SHARE_TOLERANCE {
        return Err(ValidationError::share_total(total));
    }
    Ok(())
}

/// Whole-form check run before documents are generated.
///
/// Unlike the per-step checks every problem is collected; more than one is
/// reported as [`ValidationError::Multiple`].
pub fn validate_complete_form(fields: &FormFields) -> Result<(), ValidationError> {
    let mut errors = Vec::new();

    for field in fields::PERSONAL_REQUIRED
        .iter()
        .chain(fields::ADDRESS_PARTS.iter())
    {
        if !fields.is_present(field) {
            errors.push(ValidationError::MissingField((*field).to_string()));
        }
    }

    if let Err(e) = validate_share_total(fields) {
        errors.push(e);
    }

    for field in DATE_FIELDS {
        let value = fields.trimmed(field);
        if !value.is_empty() && !is_iso_date(&value) {
            errors.push(ValidationError::InvalidDate {
                field: field.to_string(),
            });
        }
    }

    if fields.flag(fields::WASSIYAT_INCLUDE) {
        let value = fields.trimmed(fields::WASSIYAT_PERCENTAGE);
        if !value.is_empty() && !validate_percentage(&value) {
            errors.push(ValidationError::InvalidPercentage { value });
        }
    }

    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(ValidationError::Multiple(errors)),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> FormFields {
        pairs.iter().copied().collect()
    }

    fn beneficiaries(shares: &[&str]) -> FormFields {
        let mut f = FormFields::new();
        for (i, share) in shares.iter().enumerate() {
            let slot = i + 1;
            f.insert(beneficiary_key(slot, BeneficiaryPart::Name), format!("Person {slot}"));
            f.insert(beneficiary_key(slot, BeneficiaryPart::Relation), "Child");
            f.insert(beneficiary_key(slot, BeneficiaryPart::Share), *share);
        }
        f
    }

    fn complete_personal() -> FormFields {
        fields(&[
            ("name", "Jane Doe"),
            ("gender", "Female"),
            ("dob", "1980-05-01"),
            ("phone", "416-555-0100"),
            ("email", "jane@example.com"),
            ("street_number", "1"),
            ("street_name", "Main St"),
            ("city", "Springfield"),
            ("regional_municipality", "Metro County"),
            ("province", "ON"),
            ("postal_code", "A1A 1A1"),
        ])
    }

    // =========================================================================
    // primitives
    // =========================================================================

    #[test]
    fn iso_date_shape() {
        assert!(is_iso_date("1990-02-01"));
        assert!(!is_iso_date("01 Feb 1990"));
        assert!(!is_iso_date("1990-2-1"));
        assert!(!is_iso_date("1990-02-01 00:00:00"));
    }

    #[test]
    fn percentage_bounds() {
        assert!(validate_percentage("0"));
        assert!(validate_percentage("33.3"));
        assert!(validate_percentage("100"));
        assert!(!validate_percentage("100.01"));
        assert!(!validate_percentage("-1"));
        assert!(!validate_percentage("a third"));
        assert!(!validate_percentage(""));
    }

    // =========================================================================
    // share totals
    // =========================================================================

    #[test]
    fn share_total_ignores_unnamed_slots() {
        let mut f = beneficiaries(&["60", "40"]);
        f.insert("beneficiary_3_name", "Orphan");
        f.insert("beneficiary_3_share", "25");

        assert_eq!(beneficiary_share_total(&f).unwrap(), dec!(100));
    }

    #[test]
    fn share_total_only_counts_rendered_slots() {
        let mut f = beneficiaries(&["100"]);
        f.insert("beneficiary_11_name", "Extra");
        f.insert("beneficiary_11_relation", "Friend");
        f.insert("beneficiary_11_share", "50");

        assert_eq!(beneficiary_share_total(&f).unwrap(), dec!(100));
    }

    #[test]
    fn share_total_rejects_garbage_share() {
        let f = beneficiaries(&["50", "half"]);

        assert_eq!(
            beneficiary_share_total(&f),
            Err(ValidationError::InvalidShare { slot: 2 })
        );
    }

    #[test]
    fn share_total_rejects_off_by_more_than_tolerance() {
        for shares in [&["99.0"][..], &["50", "50.5"][..]] {
            assert!(validate_share_total(&beneficiaries(shares)).is_err(), "{shares:?}");
        }
    }

    #[test]
    fn share_total_accepts_within_tolerance() {
        for shares in [&["99.995"][..], &["100.005"][..], &["33.33", "33.33", "33.33"][..]] {
            assert_eq!(validate_share_total(&beneficiaries(shares)), Ok(()), "{shares:?}");
        }
    }

    #[test]
    fn share_total_error_reports_two_decimals() {
        let err = validate_share_total(&beneficiaries(&["99"])).unwrap_err();

        assert_eq!(
            err.to_string(),
            "Beneficiary shares must total 100% (currently 99.00%)"
        );
    }

    #[test]
    fn equal_shares_skips_total() {
        let mut f = beneficiaries(&["1", "1"]);
        f.insert("equal_shares", "True");

        assert_eq!(validate_share_total(&f), Ok(()));
    }

    // =========================================================================
    // complete form
    // =========================================================================

    #[test]
    fn complete_form_accepts_valid_data() {
        let mut f = complete_personal();
        f.merge(beneficiaries(&["100"]));
        f.insert("exec1_dob", "1979-01-01");

        assert_eq!(validate_complete_form(&f), Ok(()));
    }

    #[test]
    fn complete_form_collects_every_error() {
        let mut f = complete_personal();
        f.remove("email");
        f.insert("dob", "05/01/1980");
        f.merge(beneficiaries(&["90"]));

        let err = validate_complete_form(&f).unwrap_err();

        assert_eq!(
            err.to_string(),
            "Missing required field: email | \
             Beneficiary shares must total 100% (currently 90.00%) | \
             Invalid date format for dob"
        );
    }

    #[test]
    fn complete_form_single_error_is_not_wrapped() {
        let mut f = complete_personal();
        f.merge(beneficiaries(&["100"]));
        f.insert("exec2_dob", "tomorrow");

        assert_eq!(
            validate_complete_form(&f),
            Err(ValidationError::InvalidDate {
                field: "exec2_dob".into()
            })
        );
    }

    #[test]
    fn complete_form_checks_wassiyat_percentage() {
        let mut f = complete_personal();
        f.merge(beneficiaries(&["100"]));
        f.insert("wassiyat_include", "true");
        f.insert("wassiyat_percentage", "150");

        assert_eq!(
            validate_complete_form(&f),
            Err(ValidationError::InvalidPercentage {
                value: "150".into()
            })
        );
    }

    #[test]
    fn attorney_field_message_names_track() {
        let err = ValidationError::MissingAttorneyField {
            track: PoaTrack::PersonalCare,
            field: "street name".into(),
        };

        assert_eq!(
            err.to_string(),
            "Personal care POA attorney street name is required"
        );
    }
}
