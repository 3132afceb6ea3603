use std::str::FromStr;

use rust_decimal::Decimal;
use sqlx::Row;
use will_core::{FormValue, RepositoryError};

/// `(kind, value)` column pair for a stored form field.
pub fn encode_value(value: &FormValue) -> (&'static str, String) {
    match value {
        FormValue::Text(s) => ("text", s.clone()),
        FormValue::Bool(b) => ("bool", if *b { "1" } else { "0" }.to_string()),
        FormValue::Number(n) => ("number", n.to_string()),
    }
}

/// Reads the `kind`/`value` columns of a `form_field` row back into a
/// [`FormValue`].
pub fn get_form_value(row: &sqlx::sqlite::SqliteRow) -> Result<FormValue, RepositoryError> {
    let kind: String = row
        .try_get("kind")
        .map_err(|e| RepositoryError::Database(format!("Failed to get kind: {}", e)))?;
    let value: String = row
        .try_get("value")
        .map_err(|e| RepositoryError::Database(format!("Failed to get value: {}", e)))?;
    decode_value(&kind, value)
}

fn decode_value(
    kind: &str,
    value: String,
) -> Result<FormValue, RepositoryError> {
    match kind {
        "text" => Ok(FormValue::Text(value)),
        "bool" => Ok(FormValue::Bool(value == "1")),
        "number" => Decimal::from_str(&value)
            .map(FormValue::Number)
            .map_err(|e| {
                RepositoryError::Database(format!(
                    "Failed to convert '{}' to Decimal: {}",
                    value, e
                ))
            }),
        other => Err(RepositoryError::Database(format!(
            "Unexpected field kind '{}'",
            other
        ))),
    }
}
