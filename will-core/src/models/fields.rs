//! Form field names posted by the intake pages.
//!
//! Indexed and suffixed families (`beneficiary_{i}_name`,
//! `poa_name_one`, ...) are built with the helpers at the bottom.

use std::fmt;

use serde::{Deserialize, Serialize};

// ── step 1 ──────────────────────────────────────────────────────────────────
pub const NAME: &str = "name";
pub const GENDER: &str = "gender";
pub const DOB: &str = "dob";
pub const PHONE: &str = "phone";
pub const EMAIL: &str = "email";

pub const STREET_NUMBER: &str = "street_number";
pub const STREET_NAME: &str = "street_name";
pub const CITY: &str = "city";
pub const REGIONAL_MUNICIPALITY: &str = "regional_municipality";
pub const PROVINCE: &str = "province";
pub const POSTAL_CODE: &str = "postal_code";

pub const PERSONAL_REQUIRED: [&str; 5] = [NAME, GENDER, DOB, PHONE, EMAIL];
pub const ADDRESS_PARTS: [&str; 6] = [
    STREET_NUMBER,
    STREET_NAME,
    CITY,
    REGIONAL_MUNICIPALITY,
    PROVINCE,
    POSTAL_CODE,
];

// ── step 2 ──────────────────────────────────────────────────────────────────
pub const EXEC1_NAME: &str = "exec1_name";
pub const EXEC1_RELATION: &str = "exec1_relation";
pub const EXEC1_DOB: &str = "exec1_dob";
pub const INCLUDE_SECOND_EXECUTOR: &str = "include_second_executor";
pub const EXEC2_NAME: &str = "exec2_name";
pub const EXEC2_RELATION: &str = "exec2_relation";
pub const EXEC2_DOB: &str = "exec2_dob";
pub const EXEC1_ADDRESS_PREFIX: &str = "exec1_";
pub const WASSIYAT_INCLUDE: &str = "wassiyat_include";
pub const WASSIYAT_PERCENTAGE: &str = "wassiyat_percentage";
pub const SPECIFIC_GIFT_INCLUDE: &str = "specific_gift_include";
pub const SPECIFIC_GIFT_TEXT: &str = "specific_gift_text";

// ── step 3 ──────────────────────────────────────────────────────────────────
pub const EQUAL_SHARES: &str = "equal_shares";

/// Slots the intake page renders.
pub const FORM_BENEFICIARY_SLOTS: usize = 10;
/// Slots the context builder and the submission log understand.
pub const MAX_BENEFICIARY_SLOTS: usize = 50;

// ── step 5 ──────────────────────────────────────────────────────────────────
pub const TERMS_AGREEMENT: &str = "terms_agreement";
pub const MIRROR_WILL: &str = "mirror_will";
pub const MIRROR_POA: &str = "mirror_poa";
pub const MIRROR_POA_CARE: &str = "mirror_poa_care";
pub const MIRROR_NOTES: &str = "mirror_notes";

/// Attribute of a numbered beneficiary slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeneficiaryPart {
    Name,
    Relation,
    Dob,
    Share,
}

impl BeneficiaryPart {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Relation => "relation",
            Self::Dob => "dob",
            Self::Share => "share",
        }
    }
}

/// `beneficiary_{slot}_{part}`; slots are 1-based.
pub fn beneficiary_key(
    slot: usize,
    part: BeneficiaryPart,
) -> String {
    format!("beneficiary_{slot}_{}", part.as_str())
}

/// One of the four attorney positions on the POA page.
///
/// `One`/`Two` belong to the general (financial) track, `Three`/`Four` to
/// personal care; the even slot is the alternate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttorneySlot {
    One,
    Two,
    Three,
    Four,
}

impl AttorneySlot {
    pub const ALL: [AttorneySlot; 4] = [Self::One, Self::Two, Self::Three, Self::Four];

    pub fn suffix(&self) -> &'static str {
        match self {
            Self::One => "one",
            Self::Two => "two",
            Self::Three => "three",
            Self::Four => "four",
        }
    }

    /// `poa_{attribute}_{suffix}`, e.g. `poa_street_name_three`.
    pub fn key(
        &self,
        attribute: &str,
    ) -> String {
        format!("poa_{attribute}_{}", self.suffix())
    }
}

/// The two independent power-of-attorney designations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PoaTrack {
    General,
    PersonalCare,
}

impl PoaTrack {
    pub const ALL: [PoaTrack; 2] = [Self::General, Self::PersonalCare];

    /// Checkbox that switches the track on.
    pub fn include_key(&self) -> &'static str {
        match self {
            Self::General => "include_poa",
            Self::PersonalCare => "include_poa_personal_care",
        }
    }

    /// Checkbox that adds the alternate attorney.
    pub fn alternate_key(&self) -> &'static str {
        match self {
            Self::General => "second_poa",
            Self::PersonalCare => "second_poa_personal_care",
        }
    }

    pub fn primary_slot(&self) -> AttorneySlot {
        match self {
            Self::General => AttorneySlot::One,
            Self::PersonalCare => AttorneySlot::Three,
        }
    }

    pub fn alternate_slot(&self) -> AttorneySlot {
        match self {
            Self::General => AttorneySlot::Two,
            Self::PersonalCare => AttorneySlot::Four,
        }
    }
}

impl fmt::Display for PoaTrack {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::General => f.write_str("General POA"),
            Self::PersonalCare => f.write_str("Personal care POA"),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn beneficiary_keys_are_one_based() {
        assert_eq!(beneficiary_key(1, BeneficiaryPart::Name), "beneficiary_1_name");
        assert_eq!(beneficiary_key(12, BeneficiaryPart::Share), "beneficiary_12_share");
    }

    #[test]
    fn attorney_keys_use_word_suffixes() {
        assert_eq!(AttorneySlot::Three.key("postal_code"), "poa_postal_code_three");
        assert_eq!(PoaTrack::PersonalCare.alternate_slot(), AttorneySlot::Four);
    }
}
