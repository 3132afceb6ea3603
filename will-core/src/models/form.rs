use std::borrow::Cow;
use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::formatting::{ParseDecimalError, parse_decimal, parse_loose_boolean};

/// A single submitted form value.
///
/// Browsers post strings, JSON clients post booleans and numbers; all three
/// shapes are accepted and coerced at the point of use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormValue {
    Bool(bool),
    Text(String),
    Number(Decimal),
}

impl FormValue {
    /// Textual view of the value. Booleans render as `true`/`false`.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Self::Text(s) => Cow::Borrowed(s.as_str()),
            Self::Bool(b) => Cow::Owned(b.to_string()),
            Self::Number(n) => Cow::Owned(n.to_string()),
        }
    }

    /// `true` when the value would satisfy a "required" check: non-blank
    /// text, `true`, or any number.
    pub fn is_present(&self) -> bool {
        match self {
            Self::Text(s) => !s.trim().is_empty(),
            Self::Bool(b) => *b,
            Self::Number(_) => true,
        }
    }
}

impl From<&str> for FormValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FormValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for FormValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Decimal> for FormValue {
    fn from(value: Decimal) -> Self {
        Self::Number(value)
    }
}

/// Flat `field name -> value` mapping.
///
/// Used both for a single step's payload and for the per-session
/// accumulator that collects every accepted step. Keys share one namespace;
/// merging overwrites on collision.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormFields(BTreeMap<String, FormValue>);

/// The per-session accumulator is just the merged field map.
pub type FormAccumulator = FormFields;

impl FormFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(
        &self,
        key: &str,
    ) -> Option<&FormValue> {
        self.0.get(key)
    }

    /// Text of `key`, or an empty string when the field is absent.
    pub fn text(
        &self,
        key: &str,
    ) -> Cow<'_, str> {
        self.0
            .get(key)
            .map(FormValue::as_text)
            .unwrap_or(Cow::Borrowed(""))
    }

    /// Trimmed, owned text of `key`.
    pub fn trimmed(
        &self,
        key: &str,
    ) -> String {
        self.text(key).trim().to_string()
    }

    pub fn is_present(
        &self,
        key: &str,
    ) -> bool {
        self.0.get(key).is_some_and(FormValue::is_present)
    }

    /// Checkbox-style lookup through [`parse_loose_boolean`].
    pub fn flag(
        &self,
        key: &str,
    ) -> bool {
        self.0.get(key).is_some_and(parse_loose_boolean)
    }

    /// Numeric lookup. Missing or blank fields read as zero.
    pub fn decimal(
        &self,
        key: &str,
    ) -> Result<Decimal, ParseDecimalError> {
        match self.0.get(key) {
            Some(FormValue::Number(n)) => Ok(*n),
            Some(other) => parse_decimal(&other.as_text()),
            None => Ok(Decimal::ZERO),
        }
    }

    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<FormValue>,
    ) -> Option<FormValue> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(
        &mut self,
        key: &str,
    ) -> Option<FormValue> {
        self.0.remove(key)
    }

    /// Writes every key of `other` into `self`, overwriting existing keys.
    pub fn merge(
        &mut self,
        other: FormFields,
    ) {
        self.0.extend(other.0);
    }

    /// Keeps only the fields for which `keep` returns `true`.
    pub fn filtered(
        &self,
        mut keep: impl FnMut(&str) -> bool,
    ) -> FormFields {
        self.0
            .iter()
            .filter(|(k, _)| keep(k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FormValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for FormFields
where
    K: Into<String>,
    V: Into<FormValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl IntoIterator for FormFields {
    type Item = (String, FormValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, FormValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn merge_overwrites_colliding_keys() {
        let mut acc: FormFields = [("name", "Alice"), ("city", "Ottawa")].into_iter().collect();
        let step: FormFields = [("city", "Toronto"), ("exec1_name", "Bob")]
            .into_iter()
            .collect();

        acc.merge(step);

        assert_eq!(acc.len(), 3);
        assert_eq!(acc.text("city"), "Toronto");
        assert_eq!(acc.text("name"), "Alice");
    }

    #[test]
    fn text_of_missing_field_is_empty() {
        assert_eq!(FormFields::new().text("nope"), "");
    }

    #[test]
    fn blank_text_is_not_present() {
        let fields: FormFields = [("name", "   ")].into_iter().collect();

        assert!(!fields.is_present("name"));
    }

    #[test]
    fn false_bool_is_not_present() {
        let mut fields = FormFields::new();
        fields.insert("include_poa", false);

        assert!(!fields.is_present("include_poa"));
    }

    #[test]
    fn flag_uses_loose_boolean() {
        let mut fields = FormFields::new();
        fields.insert("a", "True");
        fields.insert("b", "false");
        fields.insert("c", true);

        assert!(fields.flag("a"));
        assert!(!fields.flag("b"));
        assert!(fields.flag("c"));
        assert!(!fields.flag("missing"));
    }

    #[test]
    fn decimal_reads_text_and_numbers() {
        let mut fields = FormFields::new();
        fields.insert("text", "33.5");
        fields.insert("number", dec!(12.25));
        fields.insert("blank", "");

        assert_eq!(fields.decimal("text").unwrap(), dec!(33.5));
        assert_eq!(fields.decimal("number").unwrap(), dec!(12.25));
        assert_eq!(fields.decimal("blank").unwrap(), Decimal::ZERO);
        assert_eq!(fields.decimal("missing").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn decimal_rejects_garbage() {
        let fields: FormFields = [("share", "lots")].into_iter().collect();

        assert!(fields.decimal("share").is_err());
    }

    #[test]
    fn filtered_keeps_matching_keys() {
        let fields: FormFields = [("poa_name_one", "A"), ("name", "B")].into_iter().collect();

        let poa = fields.filtered(|k| k.starts_with("poa_"));

        assert_eq!(poa.len(), 1);
        assert_eq!(poa.text("poa_name_one"), "A");
    }
}
