//! Copying people already entered into beneficiary and attorney slots.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::formatting::display_address;
use crate::models::fields::{self, BeneficiaryPart, beneficiary_key};
use crate::models::{AddressParts, Applicant, AttorneySlot, ExecutorSet, FormFields};

/// A person whose details can be copied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AutofillSource {
    #[serde(rename = "self")]
    Applicant,
    #[serde(rename = "executor1")]
    PrimaryExecutor,
    #[serde(rename = "executor2")]
    SecondaryExecutor,
}

impl AutofillSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Applicant => "self",
            Self::PrimaryExecutor => "executor1",
            Self::SecondaryExecutor => "executor2",
        }
    }
}

impl fmt::Display for AutofillSource {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown autofill source '{0}'; expected self, executor1 or executor2")]
pub struct UnknownSourceError(pub String);

impl FromStr for AutofillSource {
    type Err = UnknownSourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "self" => Ok(Self::Applicant),
            "executor1" => Ok(Self::PrimaryExecutor),
            "executor2" => Ok(Self::SecondaryExecutor),
            other => Err(UnknownSourceError(other.to_string())),
        }
    }
}

/// Copyable details of one person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartyDetails {
    pub source: AutofillSource,
    pub name: String,
    pub relation: String,
    pub dob: String,
    /// Only filled for attorney autofill.
    pub address: Option<AddressParts>,
}

impl PartyDetails {
    /// Single-line address for display next to the suggestion.
    pub fn display_address(&self) -> String {
        self.address.as_ref().map(display_address).unwrap_or_default()
    }

    /// Form fields that drop these details into beneficiary `slot`.
    pub fn beneficiary_fields(
        &self,
        slot: usize,
    ) -> FormFields {
        [
            (beneficiary_key(slot, BeneficiaryPart::Name), self.name.clone()),
            (beneficiary_key(slot, BeneficiaryPart::Relation), self.relation.clone()),
            (beneficiary_key(slot, BeneficiaryPart::Dob), self.dob.clone()),
        ]
        .into_iter()
        .collect()
    }

    /// Form fields that drop these details, address included, into an
    /// attorney slot.
    pub fn attorney_fields(
        &self,
        slot: AttorneySlot,
    ) -> FormFields {
        let mut out: FormFields = [
            (slot.key("name"), self.name.clone()),
            (slot.key("relation"), self.relation.clone()),
            (slot.key("dob"), self.dob.clone()),
        ]
        .into_iter()
        .collect();
        if let Some(address) = &self.address {
            for (part, value) in fields::ADDRESS_PARTS.iter().zip(address.parts()) {
                out.insert(slot.key(part), value);
            }
        }
        out
    }
}

/// Everyone already entered who can be copied elsewhere.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AutofillSuggestions {
    pub applicant: Option<PartyDetails>,
    pub executors: Vec<PartyDetails>,
}

fn party(
    fields: &FormFields,
    source: AutofillSource,
) -> PartyDetails {
    let applicant = Applicant::from_fields(fields);
    match source {
        AutofillSource::Applicant => PartyDetails {
            source,
            name: applicant.name,
            relation: "Self".to_string(),
            dob: applicant.dob,
            address: Some(applicant.address),
        },
        AutofillSource::PrimaryExecutor => {
            let executor = ExecutorSet::from_fields(fields).primary;
            let address = if executor.address.is_empty() {
                applicant.address
            } else {
                executor.address
            };
            PartyDetails {
                source,
                name: executor.name,
                relation: executor.relation,
                dob: executor.dob,
                address: Some(address),
            }
        }
        AutofillSource::SecondaryExecutor => PartyDetails {
            source,
            name: fields.trimmed(fields::EXEC2_NAME),
            relation: fields.trimmed(fields::EXEC2_RELATION),
            dob: fields.trimmed(fields::EXEC2_DOB),
            address: Some(applicant.address),
        },
    }
}

/// The applicant and whichever executors have a name so far.
pub fn suggestions(fields: &FormFields) -> AutofillSuggestions {
    let named = |key: &str, source| fields.is_present(key).then(|| party(fields, source));

    AutofillSuggestions {
        applicant: named(fields::NAME, AutofillSource::Applicant),
        executors: [
            named(fields::EXEC1_NAME, AutofillSource::PrimaryExecutor),
            named(fields::EXEC2_NAME, AutofillSource::SecondaryExecutor),
        ]
        .into_iter()
        .flatten()
        .collect(),
    }
}

/// Name, relation and date of birth of `source` for a beneficiary slot.
pub fn autofill_beneficiary(
    fields: &FormFields,
    source: AutofillSource,
) -> PartyDetails {
    PartyDetails {
        address: None,
        ..party(fields, source)
    }
}

/// Name, relation, date of birth and address of `source` for an attorney
/// slot. Executors without an address of their own get the applicant's.
pub fn autofill_attorney(
    fields: &FormFields,
    source: AutofillSource,
) -> PartyDetails {
    party(fields, source)
}
