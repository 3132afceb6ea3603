use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::fields::{self, AttorneySlot, BeneficiaryPart, PoaTrack, beneficiary_key};
use super::form::FormFields;

/// The six address subfields collected for the applicant, the primary
/// executor, and each attorney.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressParts {
    pub street_number: String,
    pub street_name: String,
    pub city: String,
    pub regional_municipality: String,
    pub province: String,
    pub postal_code: String,
}

impl AddressParts {
    /// Reads `{prefix}{part}{suffix}` for every subfield, e.g. prefix
    /// `"exec1_"` yields `exec1_street_number`.
    pub fn from_fields(
        fields: &FormFields,
        prefix: &str,
        suffix: &str,
    ) -> Self {
        let read = |part: &str| fields.trimmed(&format!("{prefix}{part}{suffix}"));
        Self {
            street_number: read(fields::STREET_NUMBER),
            street_name: read(fields::STREET_NAME),
            city: read(fields::CITY),
            regional_municipality: read(fields::REGIONAL_MUNICIPALITY),
            province: read(fields::PROVINCE),
            postal_code: read(fields::POSTAL_CODE),
        }
    }

    /// Address of an attorney slot (`poa_street_number_one`, ...).
    pub fn for_attorney(
        fields: &FormFields,
        slot: AttorneySlot,
    ) -> Self {
        Self::from_fields(fields, "poa_", &format!("_{}", slot.suffix()))
    }

    /// Subfields in canonical order.
    pub fn parts(&self) -> [&str; 6] {
        [
            &self.street_number,
            &self.street_name,
            &self.city,
            &self.regional_municipality,
            &self.province,
            &self.postal_code,
        ]
    }

    pub fn is_empty(&self) -> bool {
        self.parts().iter().all(|p| p.trim().is_empty())
    }
}

/// The testator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Applicant {
    pub name: String,
    pub gender: String,
    pub dob: String,
    pub phone: String,
    pub email: String,
    pub address: AddressParts,
}

impl Applicant {
    pub fn from_fields(fields: &FormFields) -> Self {
        Self {
            name: fields.trimmed(fields::NAME),
            gender: fields.trimmed(fields::GENDER),
            dob: fields.trimmed(fields::DOB),
            phone: fields.trimmed(fields::PHONE),
            email: fields.trimmed(fields::EMAIL),
            address: AddressParts::from_fields(fields, "", ""),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Executor {
    pub name: String,
    pub relation: String,
    pub dob: String,
    /// Only collected for the primary executor; empty otherwise.
    pub address: AddressParts,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutorSet {
    pub primary: Executor,
    pub secondary: Option<Executor>,
    pub wassiyat_percentage: Option<String>,
    pub specific_gift: Option<String>,
}

impl ExecutorSet {
    pub fn from_fields(fields: &FormFields) -> Self {
        let primary = Executor {
            name: fields.trimmed(fields::EXEC1_NAME),
            relation: fields.trimmed(fields::EXEC1_RELATION),
            dob: fields.trimmed(fields::EXEC1_DOB),
            address: AddressParts::from_fields(fields, fields::EXEC1_ADDRESS_PREFIX, ""),
        };

        let secondary = fields
            .flag(fields::INCLUDE_SECOND_EXECUTOR)
            .then(|| Executor {
                name: fields.trimmed(fields::EXEC2_NAME),
                relation: fields.trimmed(fields::EXEC2_RELATION),
                dob: fields.trimmed(fields::EXEC2_DOB),
                address: AddressParts::default(),
            });

        Self {
            primary,
            secondary,
            wassiyat_percentage: fields
                .flag(fields::WASSIYAT_INCLUDE)
                .then(|| fields.trimmed(fields::WASSIYAT_PERCENTAGE)),
            specific_gift: fields
                .flag(fields::SPECIFIC_GIFT_INCLUDE)
                .then(|| fields.trimmed(fields::SPECIFIC_GIFT_TEXT)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attorney {
    pub name: String,
    pub relation: String,
    pub dob: String,
    pub address: AddressParts,
}

impl Attorney {
    pub fn from_fields(
        fields: &FormFields,
        slot: AttorneySlot,
    ) -> Self {
        Self {
            name: fields.trimmed(&slot.key("name")),
            relation: fields.trimmed(&slot.key("relation")),
            dob: fields.trimmed(&slot.key("dob")),
            address: AddressParts::for_attorney(fields, slot),
        }
    }
}

/// One POA track: the attorney plus an optional alternate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoaDesignation {
    pub track: PoaTrack,
    pub attorney: Attorney,
    pub alternate: Option<Attorney>,
}

impl PoaDesignation {
    /// `None` unless the track's include checkbox is set.
    pub fn from_fields(
        fields: &FormFields,
        track: PoaTrack,
    ) -> Option<Self> {
        if !fields.flag(track.include_key()) {
            return None;
        }
        Some(Self {
            track,
            attorney: Attorney::from_fields(fields, track.primary_slot()),
            alternate: fields
                .flag(track.alternate_key())
                .then(|| Attorney::from_fields(fields, track.alternate_slot())),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerOfAttorney {
    pub general: Option<PoaDesignation>,
    pub personal_care: Option<PoaDesignation>,
}

impl PowerOfAttorney {
    pub fn from_fields(fields: &FormFields) -> Self {
        Self {
            general: PoaDesignation::from_fields(fields, PoaTrack::General),
            personal_care: PoaDesignation::from_fields(fields, PoaTrack::PersonalCare),
        }
    }

    pub fn designations(&self) -> impl Iterator<Item = &PoaDesignation> {
        self.general.iter().chain(self.personal_care.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Beneficiary {
    pub slot: usize,
    pub relation: String,
    pub name: String,
    pub dob: String,
    pub share: Decimal,
}

/// Raw text of one beneficiary slot before any presence rule is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BeneficiarySlot {
    pub slot: usize,
    pub name: String,
    pub relation: String,
    pub dob: String,
    pub share: String,
}

impl BeneficiarySlot {
    pub fn read(
        fields: &FormFields,
        slot: usize,
    ) -> Self {
        Self {
            slot,
            name: fields.trimmed(&beneficiary_key(slot, BeneficiaryPart::Name)),
            relation: fields.trimmed(&beneficiary_key(slot, BeneficiaryPart::Relation)),
            dob: fields.trimmed(&beneficiary_key(slot, BeneficiaryPart::Dob)),
            share: fields.trimmed(&beneficiary_key(slot, BeneficiaryPart::Share)),
        }
    }

    /// Presence rule used by step validation: name and relation.
    pub fn is_named(&self) -> bool {
        !self.name.is_empty() && !self.relation.is_empty()
    }

    /// Presence rule used when building the document: name, relation and
    /// date of birth.
    pub fn is_complete(&self) -> bool {
        self.is_named() && !self.dob.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> FormFields {
        pairs.iter().copied().collect()
    }

    #[test]
    fn executor_address_uses_prefix() {
        let f = fields(&[("exec1_street_number", "12"), ("exec1_city", "Ajax")]);

        let set = ExecutorSet::from_fields(&f);

        assert_eq!(set.primary.address.street_number, "12");
        assert_eq!(set.primary.address.city, "Ajax");
        assert!(set.secondary.is_none());
    }

    #[test]
    fn secondary_executor_requires_flag() {
        let f = fields(&[("exec2_name", "Sam"), ("include_second_executor", "true")]);

        let set = ExecutorSet::from_fields(&f);

        assert_eq!(set.secondary.map(|e| e.name), Some("Sam".to_string()));
    }

    #[test]
    fn poa_track_absent_without_checkbox() {
        let f = fields(&[("poa_name_one", "Ann")]);

        assert_eq!(PowerOfAttorney::from_fields(&f), PowerOfAttorney::default());
    }

    #[test]
    fn poa_alternate_reads_even_slot() {
        let f = fields(&[
            ("include_poa_personal_care", "1"),
            ("poa_name_three", "Ann"),
            ("second_poa_personal_care", "on"),
            ("poa_name_four", "Ben"),
            ("poa_city_four", "Milton"),
        ]);

        let poa = PowerOfAttorney::from_fields(&f);
        let care = poa.personal_care.expect("personal care track");

        assert_eq!(care.attorney.name, "Ann");
        let alternate = care.alternate.expect("alternate attorney");
        assert_eq!(alternate.name, "Ben");
        assert_eq!(alternate.address.city, "Milton");
        assert!(poa.general.is_none());
    }

    #[test]
    fn slot_presence_rules_differ_on_dob() {
        let f = fields(&[("beneficiary_1_name", "Zed"), ("beneficiary_1_relation", "Son")]);

        let slot = BeneficiarySlot::read(&f, 1);

        assert!(slot.is_named());
        assert!(!slot.is_complete());
    }

    #[test]
    fn blank_address_is_empty() {
        assert!(AddressParts::default().is_empty());
    }
}
