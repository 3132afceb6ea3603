use std::io::Read;

use thiserror::Error;
use will_core::{FormFields, FormStep};

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("row {row}: column '{column}' does not belong to any form step")]
    UnknownColumn { row: usize, column: String },
}

impl From<csv::Error> for IntakeError {
    fn from(err: csv::Error) -> Self {
        IntakeError::CsvParse(err.to_string())
    }
}

/// One applicant's answers, already split into per-step payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeRecord {
    /// 1-based data row number, for reporting.
    pub row: usize,
    pub steps: [FormFields; 5],
}

impl IntakeRecord {
    /// `(step number, payload)` in submission order.
    pub fn payloads(&self) -> impl Iterator<Item = (u8, &FormFields)> {
        FormStep::ALL
            .iter()
            .zip(self.steps.iter())
            .map(|(step, payload)| (step.number(), payload))
    }
}

/// Splits a flat record into the five step payloads by field ownership.
///
/// Returns the first column no step claims, if any.
pub fn split_steps(fields: FormFields) -> Result<[FormFields; 5], String> {
    let mut steps: [FormFields; 5] = Default::default();
    for (key, value) in fields {
        let index = FormStep::ALL
            .iter()
            .position(|step| step.owns_field(&key))
            .ok_or_else(|| key.clone())?;
        steps[index].insert(key, value);
    }
    Ok(steps)
}

/// Batch intake: a CSV whose headers are form field names, one applicant per
/// row. Empty cells are left out so optional fields stay absent.
pub struct IntakeLoader;

impl IntakeLoader {
    pub fn parse<R: Read>(reader: R) -> Result<Vec<IntakeRecord>, IntakeError> {
        let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let headers = csv_reader.headers()?.clone();
        let mut records = Vec::new();

        for (i, result) in csv_reader.records().enumerate() {
            let record = result?;
            let row = i + 1;
            let fields: FormFields = headers
                .iter()
                .zip(record.iter())
                .filter(|(_, value)| !value.is_empty())
                .collect();
            let steps =
                split_steps(fields).map_err(|column| IntakeError::UnknownColumn { row, column })?;
            records.push(IntakeRecord { row, steps });
        }

        Ok(records)
    }
}
