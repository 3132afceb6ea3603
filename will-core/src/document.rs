//! Final shaping of a [`WillContext`] and the hand-off to a renderer.

use std::fmt;
use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{error, info};

use crate::formatting::{
    DISPLAY_DATE_FORMAT, ISO_DATE_FORMAT, compose_address, format_share, parse_loose_boolean,
};
use crate::models::{AddressParts, ContextMap, ContextValue, FormValue, WillContext, keys};

/// Template every will is rendered from.
pub const WILL_TEMPLATE_ID: &str = "universal_will";

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const FILE_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Which of the two documents a submission can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Main,
    Mirror,
}

impl DocumentKind {
    /// File-name prefix placed before `Will_`.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Main => "",
            Self::Mirror => "Mirror_",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Main => f.write_str("will"),
            Self::Mirror => f.write_str("mirror will"),
        }
    }
}

/// Everything a renderer needs to produce one document.
#[derive(Debug, Clone, Copy)]
pub struct RenderRequest<'a> {
    pub template_id: &'a str,
    /// Output file name without directory or extension.
    pub file_stem: &'a str,
    pub context: &'a WillContext,
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template '{0}' not found")]
    TemplateNotFound(String),

    #[error("template rendering failed: {0}")]
    Render(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Turns a prepared context into a document on disk.
pub trait DocumentRenderer: Send + Sync {
    /// Renders `request` and returns the path of the written file.
    fn render(
        &self,
        request: &RenderRequest<'_>,
    ) -> Result<PathBuf, RenderError>;
}

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Document generation failed: {source}")]
    Generation {
        #[source]
        source: RenderError,
    },
}

/// Upper-cases every text value, descending into lists and maps.
pub fn uppercase_all(context: &WillContext) -> WillContext {
    context
        .as_map()
        .iter()
        .map(|(k, v)| (k.clone(), uppercase_value(v)))
        .collect::<ContextMap>()
        .into()
}

fn uppercase_value(value: &ContextValue) -> ContextValue {
    match value {
        ContextValue::Text(s) => ContextValue::Text(s.to_uppercase()),
        ContextValue::List(items) => {
            ContextValue::List(items.iter().map(uppercase_value).collect())
        }
        ContextValue::Map(map) => ContextValue::Map(
            map.iter()
                .map(|(k, v)| (k.clone(), uppercase_value(v)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Rewrites date values and display-format date strings as `YYYY-MM-DD`,
/// descending into lists and maps. Anything else is left alone.
pub fn normalize_dates(context: &WillContext) -> WillContext {
    context
        .as_map()
        .iter()
        .map(|(k, v)| (k.clone(), normalize_value(v)))
        .collect::<ContextMap>()
        .into()
}

fn normalize_value(value: &ContextValue) -> ContextValue {
    match value {
        ContextValue::Date(d) => ContextValue::Text(d.format(ISO_DATE_FORMAT).to_string()),
        ContextValue::Text(s) => match parse_date_like(s) {
            Some(d) => ContextValue::Text(d.format(ISO_DATE_FORMAT).to_string()),
            None => value.clone(),
        },
        ContextValue::List(items) => {
            ContextValue::List(items.iter().map(normalize_value).collect())
        }
        ContextValue::Map(map) => ContextValue::Map(
            map.iter()
                .map(|(k, v)| (k.clone(), normalize_value(v)))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn parse_date_like(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, DISPLAY_DATE_FORMAT)
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)
                .ok()
                .map(|dt| dt.date())
        })
}

/// Applies the render-time rules to a copy of `context`:
/// upper-casing, the composed address under both address keys, date
/// normalisation, a default `beneficiaries` list, and the strict
/// `equal_shares` flag with its display percentage.
pub fn prepare_context(context: &WillContext) -> WillContext {
    let mut ctx = uppercase_all(context);

    let parts = AddressParts {
        street_number: ctx.text(keys::STREET_NUMBER).to_string(),
        street_name: ctx.text(keys::STREET_NAME).to_string(),
        city: ctx.text(keys::CITY).to_string(),
        regional_municipality: ctx.text(keys::REGIONAL_MUNICIPALITY).to_string(),
        province: ctx.text(keys::PROVINCE).to_string(),
        postal_code: ctx.text(keys::POSTAL_CODE).to_string(),
    };
    let address = compose_address(&parts);
    ctx.insert(keys::ADDRESS, address.clone());
    ctx.insert(keys::ADDRESS_ALIAS, address);

    let mut ctx = normalize_dates(&ctx);

    if !ctx.contains_key(keys::BENEFICIARIES) {
        ctx.insert(keys::BENEFICIARIES, ContextValue::List(Vec::new()));
    }

    let equal_shares = match ctx.get(keys::EQUAL_SHARES) {
        Some(ContextValue::Bool(b)) => *b,
        Some(ContextValue::Text(s)) => parse_loose_boolean(&FormValue::Text(s.clone())),
        Some(ContextValue::Number(n)) => parse_loose_boolean(&FormValue::Number(*n)),
        _ => false,
    };
    ctx.insert(keys::EQUAL_SHARES, equal_shares);

    let count = match ctx.get(keys::BENEFICIARIES) {
        Some(ContextValue::List(items)) => items.len(),
        _ => 0,
    };
    if equal_shares && count > 0 {
        let percentage = Decimal::ONE_HUNDRED / Decimal::from(count);
        ctx.insert(keys::EQUAL_SHARE_PERCENTAGE, format_share(percentage));
    }

    ctx
}

/// Keeps letters, digits, space, `-` and `_`; falls back to `Unknown`.
pub fn safe_file_name(name: &str) -> String {
    let kept: String = name
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect();
    match kept.trim() {
        "" => "Unknown".to_string(),
        trimmed => trimmed.to_string(),
    }
}

/// `[Mirror_]Will_{name}_{YYYYmmdd_HHMMSS}`.
pub fn document_file_stem(
    name: &str,
    kind: DocumentKind,
    at: NaiveDateTime,
) -> String {
    format!(
        "{}Will_{}_{}",
        kind.prefix(),
        safe_file_name(name),
        at.format(FILE_TIMESTAMP_FORMAT)
    )
}

/// Prepares `context`, names the output file and renders it.
///
/// A context flagged `is_mirror` is always named as a mirror document.
pub fn generate_document(
    renderer: &dyn DocumentRenderer,
    context: &WillContext,
    kind: DocumentKind,
    at: NaiveDateTime,
) -> Result<PathBuf, DocumentError> {
    let prepared = prepare_context(context);
    let kind = if prepared.flag(keys::IS_MIRROR) {
        DocumentKind::Mirror
    } else {
        kind
    };
    let file_stem = document_file_stem(prepared.text(keys::NAME), kind, at);

    let request = RenderRequest {
        template_id: WILL_TEMPLATE_ID,
        file_stem: &file_stem,
        context: &prepared,
    };
    let path = renderer.render(&request).map_err(|source| {
        error!(file = %file_stem, "{} generation failed: {}", kind, source);
        DocumentError::Generation { source }
    })?;

    info!(path = %path.display(), "{} written", kind);
    Ok(path)
}
