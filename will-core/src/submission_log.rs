//! Append-only audit trail: one fixed-schema row per generated document.

use std::path::Path;
use std::sync::LazyLock;

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::document::DocumentKind;
use crate::models::fields::{
    self, AttorneySlot, BeneficiaryPart, MAX_BENEFICIARY_SLOTS, beneficiary_key,
};
use crate::models::{FormFields, FormValue};

/// Bumped whenever columns are added, removed or reordered.
///
/// Version 2 appended `document_path` and `logged_at`.
pub const LOG_SCHEMA_VERSION: u32 = 2;

const LOGGED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Checkbox columns; written as `yes`/`no` and `no` when absent.
pub const CHECKBOX_COLUMNS: [&str; 11] = [
    "include_exec2",
    "wassiyat_include",
    "specific_gift_include",
    "equal_shares",
    "include_poa",
    "second_poa",
    "include_poa_personal_care",
    "second_poa_personal_care",
    "mirror_will",
    "mirror_poa",
    "mirror_poa_care",
];

/// Log columns whose value is read from a differently named form field.
const RENAMED_COLUMNS: [(&str, &str); 2] = [
    ("include_exec2", fields::INCLUDE_SECOND_EXECUTOR),
    ("mirror_will_notes", fields::MIRROR_NOTES),
];

const ATTORNEY_COLUMNS: [&str; 9] = [
    "name",
    "relation",
    "dob",
    "street_number",
    "street_name",
    "city",
    "regional_municipality",
    "province",
    "postal_code",
];

static LOG_COLUMNS: LazyLock<Vec<String>> = LazyLock::new(|| {
    let mut columns: Vec<String> = [
        "name",
        "phone",
        "email",
        "gender",
        "dob",
        "street_number",
        "street_name",
        "city",
        "regional_municipality",
        "province",
        "postal_code",
        "exec1_name",
        "exec1_relation",
        "exec1_dob",
        "include_exec2",
        "exec2_name",
        "exec2_relation",
        "exec2_dob",
        "wassiyat_include",
        "wassiyat_percentage",
        "specific_gift_include",
        "specific_gift_text",
        "equal_shares",
    ]
    .into_iter()
    .map(String::from)
    .collect();

    for i in 1..=MAX_BENEFICIARY_SLOTS {
        columns.extend([
            format!("relation{i}"),
            format!("name{i}"),
            format!("dob{i}"),
            format!("share{i}"),
        ]);
    }

    let include_keys = [
        "include_poa",
        "second_poa",
        "include_poa_personal_care",
        "second_poa_personal_care",
    ];
    for (slot, include) in AttorneySlot::ALL.into_iter().zip(include_keys) {
        columns.push(include.to_string());
        columns.extend(ATTORNEY_COLUMNS.iter().map(|attr| slot.key(attr)));
    }

    columns.extend(
        [
            "mirror_will",
            "mirror_will_notes",
            "mirror_poa",
            "mirror_poa_care",
            "document_path",
            "logged_at",
        ]
        .into_iter()
        .map(String::from),
    );
    columns
});

/// Column names in write order.
pub fn log_columns() -> &'static [String] {
    &LOG_COLUMNS
}

/// What a row records besides the form itself.
#[derive(Debug, Clone, Copy)]
pub struct LogEntry<'a> {
    pub kind: DocumentKind,
    pub document_path: &'a Path,
    pub logged_at: NaiveDateTime,
}

/// One flattened submission, values aligned with [`log_columns`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRow {
    values: Vec<String>,
}

impl SubmissionRow {
    pub fn from_fields(
        fields: &FormFields,
        entry: &LogEntry<'_>,
    ) -> Self {
        let values = log_columns()
            .iter()
            .map(|column| cell(fields, entry, column))
            .collect();
        Self { values }
    }

    pub fn columns(&self) -> &'static [String] {
        log_columns()
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Value of `column`, if it is part of the schema.
    pub fn get(
        &self,
        column: &str,
    ) -> Option<&str> {
        log_columns()
            .iter()
            .position(|c| c == column)
            .map(|i| self.values[i].as_str())
    }
}

fn yes_no(flag: bool) -> String {
    let text = if flag { "yes" } else { "no" };
    text.to_string()
}

fn source_field(column: &str) -> &str {
    RENAMED_COLUMNS
        .iter()
        .find(|(c, _)| *c == column)
        .map(|(_, field)| *field)
        .unwrap_or(column)
}

fn cell(
    fields: &FormFields,
    entry: &LogEntry<'_>,
    column: &str,
) -> String {
    match column {
        "mirror_will" => return yes_no(entry.kind == DocumentKind::Mirror),
        "document_path" => return entry.document_path.display().to_string(),
        "logged_at" => return entry.logged_at.format(LOGGED_AT_FORMAT).to_string(),
        _ => {}
    }
    if let Some(value) = beneficiary_cell(fields, column) {
        return value;
    }

    let field = source_field(column);
    if CHECKBOX_COLUMNS.contains(&column) {
        return yes_no(fields.flag(field));
    }
    match fields.get(field) {
        Some(FormValue::Bool(b)) => yes_no(*b),
        Some(value) => value.as_text().into_owned(),
        None => String::new(),
    }
}

/// `relation{i}`/`name{i}`/`dob{i}`/`share{i}`, filled when the slot has a
/// name or a relation.
fn beneficiary_cell(
    fields: &FormFields,
    column: &str,
) -> Option<String> {
    let (part, index) = [
        ("relation", BeneficiaryPart::Relation),
        ("name", BeneficiaryPart::Name),
        ("dob", BeneficiaryPart::Dob),
        ("share", BeneficiaryPart::Share),
    ]
    .into_iter()
    .find_map(|(prefix, part)| {
        let index = column.strip_prefix(prefix)?;
        (!index.is_empty() && index.bytes().all(|b| b.is_ascii_digit())).then_some((part, index))
    })?;
    let slot: usize = index.parse().ok()?;

    let occupied = fields.is_present(&beneficiary_key(slot, BeneficiaryPart::Name))
        || fields.is_present(&beneficiary_key(slot, BeneficiaryPart::Relation));
    if !occupied {
        return Some(String::new());
    }
    Some(fields.text(&beneficiary_key(slot, part)).into_owned())
}

#[derive(Debug, Error)]
pub enum LogError {
    #[error("submission log I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("submission log write failed: {0}")]
    Write(String),
}

/// Append-only tabular store for [`SubmissionRow`]s.
pub trait SubmissionLog: Send + Sync {
    /// Appends `row`, writing the header first when the log is empty.
    fn append(
        &self,
        row: &SubmissionRow,
    ) -> Result<(), LogError>;
}
