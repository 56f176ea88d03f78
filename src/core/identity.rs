//! Identity and format validators: CUIT/CUIL checksum, DNI, numeric dates,
//! sales points and amounts.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use thiserror::Error;

/// Maximum distance in days between a voucher date and the submission date.
pub const DATE_WINDOW_DAYS: i64 = 10;

/// Highest sales point number the authority assigns.
pub const MAX_SALES_POINT: u32 = 9999;

/// Largest amount the authority's 13+2 digit amount fields can carry.
pub const MAX_AMOUNT: Decimal = dec!(9999999999999.99);

const TAX_ID_WEIGHTS: [u32; 10] = [5, 4, 3, 2, 7, 6, 5, 4, 3, 2];

/// Error returned when an identifier, date or amount fails validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid value '{value}': {reason}")]
pub struct IdentityError {
    /// The rejected input value.
    pub value: String,
    /// Why the value failed validation.
    pub reason: String,
}

impl IdentityError {
    fn new(value: impl ToString, reason: impl Into<String>) -> Self {
        Self {
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Compute the mod-11 check digit for the first 10 digits of a CUIT/CUIL.
///
/// Returns `None` unless `prefix` is exactly 10 ASCII digits.
pub fn tax_id_check_digit(prefix: &str) -> Option<u32> {
    if prefix.len() != 10 || !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let sum: u32 = prefix
        .bytes()
        .zip(TAX_ID_WEIGHTS)
        .map(|(b, w)| u32::from(b - b'0') * w)
        .sum();
    let digit = match 11 - (sum % 11) {
        11 => 0,
        10 => 9,
        d => d,
    };
    Some(digit)
}

/// Validate a CUIT/CUIL/CDI (11 digits, mod-11 check digit).
///
/// Separators (`-`, `.`, `/`, spaces) are stripped first.
/// Returns the cleaned 11-digit string on success.
pub fn validate_tax_id(id: &str) -> Result<String, IdentityError> {
    let cleaned: String = id
        .chars()
        .filter(|c| !matches!(c, '-' | '.' | '/' | ' '))
        .collect();

    if cleaned.is_empty() {
        return Err(IdentityError::new(id, "tax id (CUIT) must not be empty"));
    }
    if !cleaned.bytes().all(|b| b.is_ascii_digit()) {
        return Err(IdentityError::new(id, "tax id (CUIT) must contain only digits"));
    }
    if cleaned.len() != 11 {
        return Err(IdentityError::new(
            id,
            format!("tax id (CUIT) must have exactly 11 digits, got {}", cleaned.len()),
        ));
    }

    let expected = tax_id_check_digit(&cleaned[..10]).unwrap_or(u32::MAX);
    let actual = u32::from(cleaned.as_bytes()[10] - b'0');
    if expected != actual {
        return Err(IdentityError::new(
            id,
            format!("tax id (CUIT) check digit is {actual}, expected {expected}"),
        ));
    }

    Ok(cleaned)
}

/// Validate a DNI: 7 or 8 digits after removing thousands dots.
pub fn validate_national_id(id: &str) -> Result<String, IdentityError> {
    let cleaned: String = id.chars().filter(|c| *c != '.' && *c != ' ').collect();

    if !cleaned.bytes().all(|b| b.is_ascii_digit()) {
        return Err(IdentityError::new(id, "national id (DNI) must contain only digits"));
    }
    if !(7..=8).contains(&cleaned.len()) {
        return Err(IdentityError::new(
            id,
            format!("national id (DNI) must have 7 or 8 digits, got {}", cleaned.len()),
        ));
    }
    Ok(cleaned)
}

/// Convert a calendar date to the numeric `YYYYMMDD` form the authority uses.
pub fn numeric_date(date: NaiveDate) -> u32 {
    let year = u32::try_from(date.year()).unwrap_or(0);
    year * 10_000 + date.month() * 100 + date.day()
}

/// Parse a numeric `YYYYMMDD` date. Returns `None` for impossible dates.
pub fn parse_numeric_date(value: u32) -> Option<NaiveDate> {
    let year = i32::try_from(value / 10_000).ok()?;
    NaiveDate::from_ymd_opt(year, (value / 100) % 100, value % 100)
}

/// Validate a numeric `YYYYMMDD` date against the default ±10-day window.
pub fn validate_date(yyyymmdd: u32, today: NaiveDate) -> Result<NaiveDate, IdentityError> {
    validate_date_within(yyyymmdd, today, DATE_WINDOW_DAYS)
}

/// Validate a numeric `YYYYMMDD` date that must fall within `window_days`
/// of `today` (in either direction).
pub fn validate_date_within(
    yyyymmdd: u32,
    today: NaiveDate,
    window_days: i64,
) -> Result<NaiveDate, IdentityError> {
    if !(10_000_000..=99_999_999).contains(&yyyymmdd) {
        return Err(IdentityError::new(yyyymmdd, "date must have 8 digits (YYYYMMDD)"));
    }

    let month = (yyyymmdd / 100) % 100;
    if !(1..=12).contains(&month) {
        return Err(IdentityError::new(
            yyyymmdd,
            format!("month must be between 1 and 12, got {month}"),
        ));
    }

    let day = yyyymmdd % 100;
    if !(1..=31).contains(&day) {
        return Err(IdentityError::new(
            yyyymmdd,
            format!("day must be between 1 and 31, got {day}"),
        ));
    }

    let Some(date) = parse_numeric_date(yyyymmdd) else {
        return Err(IdentityError::new(yyyymmdd, "not a valid calendar date"));
    };

    let distance = (date - today).num_days();
    if distance.abs() > window_days {
        return Err(IdentityError::new(
            yyyymmdd,
            format!(
                "date must be within {window_days} days of {} (submission window), it is {} days {}",
                today.format("%Y-%m-%d"),
                distance.abs(),
                if distance < 0 { "earlier" } else { "later" }
            ),
        ));
    }

    Ok(date)
}

/// Validate a sales point (punto de venta) number.
pub fn validate_sales_point(sales_point: u32) -> Result<(), IdentityError> {
    if !(1..=MAX_SALES_POINT).contains(&sales_point) {
        return Err(IdentityError::new(
            sales_point,
            format!("sales point must be between 1 and {MAX_SALES_POINT}"),
        ));
    }
    Ok(())
}

/// Validate a monetary amount: non-negative, at most [`MAX_AMOUNT`] and with
/// at most two decimal places.
pub fn validate_amount(amount: Decimal, label: &str) -> Result<(), IdentityError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(IdentityError::new(amount, format!("{label} must not be negative")));
    }
    if amount > MAX_AMOUNT {
        return Err(IdentityError::new(
            amount,
            format!("{label} must not exceed {MAX_AMOUNT}"),
        ));
    }
    if amount.normalize().scale() > 2 {
        return Err(IdentityError::new(
            amount,
            format!("{label} must have at most two decimal places"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // --- Tax id ---

    #[test]
    fn well_known_test_cuit() {
        assert_eq!(validate_tax_id("20409378472").unwrap(), "20409378472");
    }

    #[test]
    fn separators_stripped() {
        assert_eq!(validate_tax_id("20-40937847-2").unwrap(), "20409378472");
    }

    #[test]
    fn corrupted_check_digit() {
        let err = validate_tax_id("20409378471").unwrap_err();
        assert!(err.reason.contains("check digit"));
    }

    #[test]
    fn remainder_one_maps_to_nine() {
        // 11 - 1 = 10 maps to 9
        let prefix = (0..10_000_000_000u64)
            .step_by(7_919)
            .map(|n| format!("{n:010}"))
            .find(|p| {
                let sum: u32 = p
                    .bytes()
                    .zip(TAX_ID_WEIGHTS)
                    .map(|(b, w)| u32::from(b - b'0') * w)
                    .sum();
                sum % 11 == 1
            })
            .unwrap();
        assert_eq!(tax_id_check_digit(&prefix), Some(9));
        assert!(validate_tax_id(&format!("{prefix}9")).is_ok());
    }

    #[test]
    fn wrong_length_and_letters() {
        assert!(validate_tax_id("2040937847").is_err());
        assert!(validate_tax_id("204093784721").is_err());
        assert!(validate_tax_id("2040937847A").is_err());
        assert!(validate_tax_id("").is_err());
    }

    // --- DNI ---

    #[test]
    fn dni_with_dots() {
        assert_eq!(validate_national_id("40.937.847").unwrap(), "40937847");
        assert_eq!(validate_national_id("1234567").unwrap(), "1234567");
    }

    #[test]
    fn dni_bad_length() {
        assert!(validate_national_id("123456").is_err());
        assert!(validate_national_id("123456789").is_err());
        assert!(validate_national_id("12A45678").is_err());
    }

    // --- Dates ---

    #[test]
    fn numeric_date_conversion() {
        assert_eq!(numeric_date(date(2026, 3, 7)), 20260307);
        assert_eq!(parse_numeric_date(20260307), Some(date(2026, 3, 7)));
        assert_eq!(parse_numeric_date(20260230), None);
    }

    #[test]
    fn date_inside_window() {
        let today = date(2026, 10, 19);
        assert!(validate_date(20261019, today).is_ok());
        assert!(validate_date(20261009, today).is_ok());
        assert!(validate_date(20261029, today).is_ok());
    }

    #[test]
    fn date_outside_window() {
        let today = date(2026, 10, 19);
        let err = validate_date(20261008, today).unwrap_err();
        assert!(err.reason.contains("within 10 days"));
        assert!(validate_date(20261030, today).is_err());
    }

    #[test]
    fn malformed_dates() {
        let today = date(2026, 10, 19);
        assert!(validate_date(2026101, today).is_err());
        assert!(validate_date(20261319, today).unwrap_err().reason.contains("month"));
        assert!(validate_date(20261000, today).unwrap_err().reason.contains("day"));
        assert!(validate_date(20260231, today).unwrap_err().reason.contains("calendar"));
    }

    // --- Sales point / amounts ---

    #[test]
    fn sales_point_range() {
        assert!(validate_sales_point(1).is_ok());
        assert!(validate_sales_point(9999).is_ok());
        assert!(validate_sales_point(0).is_err());
        assert!(validate_sales_point(10_000).is_err());
    }

    #[test]
    fn amount_rules() {
        assert!(validate_amount(dec!(0), "ImpNeto").is_ok());
        assert!(validate_amount(dec!(302.50), "ImpTotal").is_ok());
        assert!(validate_amount(dec!(1.500), "ImpTotal").is_ok());
        let err = validate_amount(dec!(-1), "ImpIVA").unwrap_err();
        assert_eq!(err.reason, "ImpIVA must not be negative");
        assert!(validate_amount(dec!(1.005), "ImpIVA").is_err());
        assert!(validate_amount(MAX_AMOUNT, "ImpTotal").is_ok());
        let err = validate_amount(dec!(10000000000000), "ImpTotal").unwrap_err();
        assert_eq!(err.reason, "ImpTotal must not exceed 9999999999999.99");
    }
}
