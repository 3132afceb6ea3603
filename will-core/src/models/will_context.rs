use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::formatting::parse_loose_boolean;
use crate::models::FormValue;

/// Nested mapping handed to the document template.
pub type ContextMap = BTreeMap<String, ContextValue>;

/// A template-facing value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ContextValue {
    Bool(bool),
    Number(Decimal),
    Text(String),
    Date(NaiveDate),
    List(Vec<ContextValue>),
    Map(ContextMap),
}

impl ContextValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for ContextValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ContextValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for ContextValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Decimal> for ContextValue {
    fn from(value: Decimal) -> Self {
        Self::Number(value)
    }
}

impl From<NaiveDate> for ContextValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<ContextMap> for ContextValue {
    fn from(value: ContextMap) -> Self {
        Self::Map(value)
    }
}

impl From<&FormValue> for ContextValue {
    fn from(value: &FormValue) -> Self {
        match value {
            FormValue::Bool(b) => Self::Bool(*b),
            FormValue::Text(s) => Self::Text(s.clone()),
            FormValue::Number(n) => Self::Number(*n),
        }
    }
}

/// Context keys read by the will template and by the mirror transform.
pub mod keys {
    pub const NAME: &str = "name";
    pub const NAME_DISPLAY: &str = "name_display";
    pub const GENDER: &str = "gender";
    pub const PRONOUN: &str = "pronoun";
    pub const DOB: &str = "dob";
    pub const PHONE: &str = "phone";
    pub const EMAIL: &str = "email";
    pub const ADDRESS: &str = "address";
    /// Second name for the composed address; older templates read this one.
    pub const ADDRESS_ALIAS: &str = "full_address";

    pub const STREET_NUMBER: &str = "street_number";
    pub const STREET_NAME: &str = "street_name";
    pub const CITY: &str = "city";
    pub const REGIONAL_MUNICIPALITY: &str = "regional_municipality";
    pub const PROVINCE: &str = "province";
    pub const POSTAL_CODE: &str = "postal_code";

    pub const APPLICANT_ADDRESS: [&str; 6] = [
        STREET_NUMBER,
        STREET_NAME,
        CITY,
        REGIONAL_MUNICIPALITY,
        PROVINCE,
        POSTAL_CODE,
    ];
    pub const EXECUTOR_ADDRESS: [&str; 6] = [
        "exec1_street_number",
        "exec1_street_name",
        "exec1_city",
        "exec1_regional_municipality",
        "exec1_province",
        "exec1_postal_code",
    ];

    pub const EXECUTOR_NAME_ONE: &str = "executor_name_one";
    pub const EXECUTOR_DOB_ONE: &str = "executor_dob_one";
    pub const RELATION_EXECUTOR_ONE: &str = "relation_executor_one";
    pub const INCLUDE_SECOND_EXECUTOR: &str = "include_second_executor";
    pub const EXECUTOR_NAME_SECOND: &str = "executor_name_second";
    pub const EXECUTOR_DOB_SECOND: &str = "executor_dob_second";
    pub const RELATION_EXECUTOR_SECOND: &str = "relation_executor_second";
    pub const WASSIYAT_PERCENTAGE: &str = "wassiyat_percentage_placeholder";
    pub const SPECIFIC_GIFT: &str = "specific_gift";

    pub const BENEFICIARIES: &str = "beneficiaries";
    pub const HAS_BENEFICIARIES: &str = "has_beneficiaries";
    pub const EQUAL_SHARES: &str = "equal_shares";
    pub const EQUAL_SHARE_PERCENTAGE: &str = "equal_share_percentage";

    pub const MIRROR_WILL: &str = "mirror_will";
    pub const MIRROR_POA: &str = "mirror_poa";
    pub const MIRROR_NOTES: &str = "mirror_notes";
    pub const IS_MIRROR: &str = "is_mirror";

    /// Per-attorney keys emitted for every included POA slot.
    pub const ATTORNEY_PARTS: [&str; 4] = ["name", "relation", "dob", "address"];

    /// Keys that builders leave out when their section is not selected.
    /// Templates see these as blank rather than undefined.
    pub fn optional() -> Vec<String> {
        use crate::models::{AttorneySlot, PoaTrack};

        let mut out: Vec<String> = [
            NAME_DISPLAY,
            EXECUTOR_NAME_SECOND,
            EXECUTOR_DOB_SECOND,
            RELATION_EXECUTOR_SECOND,
            WASSIYAT_PERCENTAGE,
            SPECIFIC_GIFT,
            EQUAL_SHARE_PERCENTAGE,
            MIRROR_NOTES,
            IS_MIRROR,
        ]
        .into_iter()
        .map(String::from)
        .collect();
        for track in PoaTrack::ALL {
            out.push(track.include_key().to_string());
            out.push(track.alternate_key().to_string());
        }
        for slot in AttorneySlot::ALL {
            out.extend(ATTORNEY_PARTS.iter().map(|part| slot.key(part)));
        }
        out
    }
}

/// Fully assembled template context for one will document.
///
/// Rebuilt from the accumulator for every generation; transforms return new
/// values instead of editing a shared one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct WillContext(ContextMap);

impl WillContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(
        &self,
        key: &str,
    ) -> Option<&ContextValue> {
        self.0.get(key)
    }

    /// Text at `key`; empty for missing or non-text values.
    pub fn text(
        &self,
        key: &str,
    ) -> &str {
        self.0
            .get(key)
            .and_then(ContextValue::as_text)
            .unwrap_or("")
    }

    /// Truthiness of `key`, accepting booleans and loose text booleans.
    pub fn flag(
        &self,
        key: &str,
    ) -> bool {
        match self.0.get(key) {
            Some(ContextValue::Bool(b)) => *b,
            Some(ContextValue::Text(s)) => parse_loose_boolean(&FormValue::Text(s.clone())),
            Some(ContextValue::Number(n)) => parse_loose_boolean(&FormValue::Number(*n)),
            _ => false,
        }
    }

    pub fn contains_key(
        &self,
        key: &str,
    ) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<ContextValue>,
    ) -> Option<ContextValue> {
        self.0.insert(key.into(), value.into())
    }

    /// Mapping-merge: every key of `partial` overwrites `self`.
    pub fn extend(
        &mut self,
        partial: ContextMap,
    ) {
        self.0.extend(partial);
    }

    pub fn as_map(&self) -> &ContextMap {
        &self.0
    }

    pub fn as_map_mut(&mut self) -> &mut ContextMap {
        &mut self.0
    }

    pub fn into_map(self) -> ContextMap {
        self.0
    }
}

impl From<ContextMap> for WillContext {
    fn from(value: ContextMap) -> Self {
        Self(value)
    }
}

/// A [`WillContext`] with applicant and spouse roles exchanged.
///
/// Only produced by [`crate::mirror::derive_mirror`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MirrorWillContext(WillContext);

impl MirrorWillContext {
    pub(crate) fn new(context: WillContext) -> Self {
        Self(context)
    }

    pub fn context(&self) -> &WillContext {
        &self.0
    }

    pub fn into_inner(self) -> WillContext {
        self.0
    }
}
