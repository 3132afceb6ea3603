//! String, date, address and number normalisation shared by the validators,
//! the context builders and the submission log.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

use crate::models::{AddressParts, FormValue};

/// Display format used for dates inside the assembled context.
pub const DISPLAY_DATE_FORMAT: &str = "%d %b %Y";
/// Canonical date format of form input and rendered documents.
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Error returned when a string cannot be parsed as a [`Decimal`].
#[derive(Debug, Error)]
#[error("invalid decimal '{input}': {source}")]
pub struct ParseDecimalError {
    input: String,
    #[source]
    source: rust_decimal::Error,
}

/// Capitalises every whitespace-separated word and collapses runs of
/// whitespace.
///
/// ```
/// use will_core::formatting::title_case;
///
/// assert_eq!(title_case("  mary   ann SMITH "), "Mary Ann Smith");
/// assert_eq!(title_case(""), "");
/// ```
pub fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Turns `YYYY-MM-DD` (optionally followed by a time) into `01 Feb 1990`.
///
/// Empty input gives an empty string; anything unparseable is returned
/// unchanged.
///
/// ```
/// use will_core::formatting::format_date;
///
/// assert_eq!(format_date("1990-02-01"), "01 Feb 1990");
/// assert_eq!(format_date("1990-02-01 00:00:00"), "01 Feb 1990");
/// assert_eq!(format_date("sometime"), "sometime");
/// ```
pub fn format_date(s: &str) -> String {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    let date_part = trimmed.split(' ').next().unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, ISO_DATE_FORMAT)
        .map(|d| d.format(DISPLAY_DATE_FORMAT).to_string())
        .unwrap_or_else(|_| s.to_string())
}

/// Human-friendly single-line address: title-cased street, city, region and
/// province, upper-cased postal code, blanks skipped.
pub fn display_address(parts: &AddressParts) -> String {
    let mut items = Vec::new();

    let street = format!("{} {}", parts.street_number.trim(), parts.street_name.trim());
    if !street.trim().is_empty() {
        items.push(title_case(&street));
    }
    for part in [&parts.city, &parts.regional_municipality, &parts.province] {
        if !part.trim().is_empty() {
            items.push(title_case(part));
        }
    }
    if !parts.postal_code.trim().is_empty() {
        items.push(parts.postal_code.trim().to_uppercase());
    }

    items.join(", ")
}

/// Composite address printed on the will:
/// `"{number} {street}, {city}, {province} {postal}"`, upper-cased.
///
/// The regional municipality is never part of it.
///
/// ```
/// use will_core::formatting::compose_address;
/// use will_core::models::AddressParts;
///
/// let parts = AddressParts {
///     street_number: "1".into(),
///     street_name: "Main St".into(),
///     city: "Springfield".into(),
///     regional_municipality: "Metro County".into(),
///     province: "ON".into(),
///     postal_code: "A1A1A1".into(),
/// };
/// assert_eq!(compose_address(&parts), "1 MAIN ST, SPRINGFIELD, ON A1A1A1");
/// ```
pub fn compose_address(parts: &AddressParts) -> String {
    let mut segments = Vec::new();

    let street = format!("{} {}", parts.street_number.trim(), parts.street_name.trim());
    if !street.trim().is_empty() {
        segments.push(street.trim().to_string());
    }
    if !parts.city.trim().is_empty() {
        segments.push(parts.city.trim().to_string());
    }
    let province_postal = format!("{} {}", parts.province.trim(), parts.postal_code.trim());
    if !province_postal.trim().is_empty() {
        segments.push(province_postal.trim().to_string());
    }

    segments.join(", ").to_uppercase()
}

/// Checkbox coercion applied wherever form input is read.
///
/// `true`, `1`, and the texts `true`/`1`/`yes`/`on` (any case) are true;
/// everything else is false.
pub fn parse_loose_boolean(value: &FormValue) -> bool {
    match value {
        FormValue::Bool(b) => *b,
        FormValue::Number(n) => *n == Decimal::ONE,
        FormValue::Text(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "1" | "yes" | "on"
        ),
    }
}

/// Normalizes input for decimal parsing: trims whitespace and removes commas (thousands separator).
fn normalize_decimal_input(s: &str) -> String {
    s.trim().replace(',', "")
}

/// Parses a string into a [`Decimal`].
///
/// Handles comma as thousands separator (e.g. `"1,234.56"`) and a trailing
/// percent sign. Empty or whitespace-only input is treated as 0.
pub fn parse_decimal(s: &str) -> Result<Decimal, ParseDecimalError> {
    let normalized = normalize_decimal_input(s);
    let normalized = normalized.trim_end_matches('%').trim_end();
    if normalized.is_empty() {
        return Ok(Decimal::ZERO);
    }
    normalized.parse().map_err(|e| ParseDecimalError {
        input: s.to_string(),
        source: e,
    })
}

/// Lenient share parsing for the context builder: garbage reads as zero.
pub fn parse_share_or_zero(s: &str) -> Decimal {
    parse_decimal(s).unwrap_or_else(|e| {
        tracing::warn!(input = %s, "invalid share, using 0: {}", e);
        Decimal::ZERO
    })
}

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// Values at exactly 0.005 are rounded up to 0.01 (away from zero).
///
/// ```
/// use rust_decimal_macros::dec;
/// use will_core::formatting::round_half_up;
///
/// assert_eq!(round_half_up(dec!(33.3333)), dec!(33.33));
/// assert_eq!(round_half_up(dec!(16.665)), dec!(16.67));
/// assert_eq!(round_half_up(dec!(-12.455)), dec!(-12.46)); // Away from zero
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Percentage each of `count` beneficiaries receives under equal shares.
///
/// # Panics
///
/// Never; a zero count yields zero.
pub fn equal_share(count: usize) -> Decimal {
    if count == 0 {
        return Decimal::ZERO;
    }
    round_half_up(Decimal::ONE_HUNDRED / Decimal::from(count))
}

/// Fixed two-decimal display string, e.g. `"33.33"`, `"50.00"`.
pub fn format_share(value: Decimal) -> String {
    let mut rounded = round_half_up(value);
    rounded.rescale(2);
    rounded.to_string()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn address(
        number: &str,
        street: &str,
        city: &str,
        region: &str,
        province: &str,
        postal: &str,
    ) -> AddressParts {
        AddressParts {
            street_number: number.into(),
            street_name: street.into(),
            city: city.into(),
            regional_municipality: region.into(),
            province: province.into(),
            postal_code: postal.into(),
        }
    }

    // =========================================================================
    // title_case / format_date
    // =========================================================================

    #[test]
    fn title_case_lowercases_tail() {
        assert_eq!(title_case("mcDONALD"), "Mcdonald");
    }

    #[test]
    fn format_date_empty_is_empty() {
        assert_eq!(format_date("   "), "");
    }

    #[test]
    fn format_date_rejects_impossible_dates() {
        assert_eq!(format_date("1990-02-30"), "1990-02-30");
    }

    // =========================================================================
    // addresses
    // =========================================================================

    #[test]
    fn compose_address_omits_region() {
        let parts = address("1", "Main St", "Springfield", "Metro County", "ON", "A1A1A1");

        assert_eq!(compose_address(&parts), "1 MAIN ST, SPRINGFIELD, ON A1A1A1");
    }

    #[test]
    fn compose_address_skips_blank_segments() {
        let parts = address("", "", "Ajax", "", "ON", "");

        assert_eq!(compose_address(&parts), "AJAX, ON");
    }

    #[test]
    fn compose_address_of_nothing_is_empty() {
        assert_eq!(compose_address(&AddressParts::default()), "");
    }

    #[test]
    fn display_address_keeps_region_and_title_cases() {
        let parts = address("12", "oak street", "whitby", "durham region", "on", "l1n 2b3");

        assert_eq!(
            display_address(&parts),
            "12 Oak Street, Whitby, Durham Region, On, L1N 2B3"
        );
    }

    // =========================================================================
    // parse_loose_boolean
    // =========================================================================

    #[test]
    fn loose_boolean_truthy_variants() {
        for text in ["true", "True", "1", "yes", "Yes", "on", "On", " TRUE "] {
            assert!(parse_loose_boolean(&FormValue::Text(text.into())), "{text}");
        }
        assert!(parse_loose_boolean(&FormValue::Bool(true)));
        assert!(parse_loose_boolean(&FormValue::Number(dec!(1))));
    }

    #[test]
    fn loose_boolean_falsy_variants() {
        for text in ["false", "0", "no", "", "off", "maybe"] {
            assert!(!parse_loose_boolean(&FormValue::Text(text.into())), "{text}");
        }
        assert!(!parse_loose_boolean(&FormValue::Bool(false)));
        assert!(!parse_loose_boolean(&FormValue::Number(dec!(2))));
    }

    // =========================================================================
    // decimals
    // =========================================================================

    #[test]
    fn parse_decimal_accepts_comma_and_percent() {
        assert_eq!(parse_decimal("1,234.56").unwrap(), dec!(1234.56));
        assert_eq!(parse_decimal(" 25 %").unwrap(), dec!(25));
    }

    #[test]
    fn parse_decimal_empty_treated_as_zero() {
        assert_eq!(parse_decimal("").unwrap(), Decimal::ZERO);
        assert_eq!(parse_decimal("   ").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn parse_decimal_invalid_returns_error() {
        assert!(parse_decimal("abc").is_err());
    }

    #[test]
    fn parse_share_or_zero_swallows_garbage() {
        assert_eq!(parse_share_or_zero("half"), Decimal::ZERO);
        assert_eq!(parse_share_or_zero("12.5"), dec!(12.5));
    }

    #[test]
    fn round_half_up_rounds_up_at_midpoint() {
        assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
    }

    #[test]
    fn equal_share_values() {
        assert_eq!(equal_share(1), dec!(100));
        assert_eq!(equal_share(3), dec!(33.33));
        assert_eq!(equal_share(6), dec!(16.67));
        assert_eq!(equal_share(0), Decimal::ZERO);
    }

    #[test]
    fn format_share_pads_to_two_places() {
        assert_eq!(format_share(dec!(50)), "50.00");
        assert_eq!(format_share(dec!(12.5)), "12.50");
        assert_eq!(format_share(dec!(33.333)), "33.33");
    }
}
