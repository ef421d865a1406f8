//! Internal helpers for input validation.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation so every operation rejects the same inputs the same way.

use chrono::NaiveDate;

use crate::{EngineError, ResultEngine};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Largest magnitude accepted for an amount or an opening balance, in minor
/// units. Keeps every fold far away from `i64` overflow.
pub const MAX_AMOUNT: i64 = 1_000_000_000_000_000;

pub(crate) fn normalize_required_text(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::validation(format!("{label} must not be empty")));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

pub(crate) fn require_id(value: &str, label: &str) -> ResultEngine<String> {
    normalize_required_text(value, &format!("{label} id"))
}

/// Parse a strict `YYYY-MM-DD` calendar date.
pub(crate) fn parse_date(value: &str) -> ResultEngine<NaiveDate> {
    let invalid = || EngineError::validation(format!("invalid date: {value}"));
    let date = NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| invalid())?;
    // chrono accepts unpadded fields; the stored form is always zero padded.
    if date.format(DATE_FORMAT).to_string() != value {
        return Err(invalid());
    }
    Ok(date)
}

fn too_large(label: &str) -> EngineError {
    EngineError::validation(format!("{label} must not exceed {MAX_AMOUNT}"))
}

pub(crate) fn require_positive_amount(amount: i64) -> ResultEngine<i64> {
    if amount <= 0 {
        return Err(EngineError::validation("amount must be > 0"));
    }
    if amount > MAX_AMOUNT {
        return Err(too_large("amount"));
    }
    Ok(amount)
}

pub(crate) fn require_non_zero_amount(amount: i64) -> ResultEngine<i64> {
    if amount == 0 {
        return Err(EngineError::validation("amount must not be 0"));
    }
    if amount.unsigned_abs() > MAX_AMOUNT.unsigned_abs() {
        return Err(too_large("amount"));
    }
    Ok(amount)
}

pub(crate) fn require_balance_in_range(balance: i64) -> ResultEngine<i64> {
    if balance.unsigned_abs() > MAX_AMOUNT.unsigned_abs() {
        return Err(too_large("initial balance"));
    }
    Ok(balance)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dates_must_be_iso_calendar_days() {
        assert_eq!(
            parse_date("2026-02-21").unwrap(),
            NaiveDate::from_ymd_opt(2026, 2, 21).unwrap()
        );
        assert!(parse_date("2026-02-30").is_err());
        assert!(parse_date("2026-2-1").is_err());
        assert!(parse_date("21/02/2026").is_err());
        assert!(parse_date("").is_err());
        assert!(parse_date("2026-02-21T10:00:00Z").is_err());
    }

    #[test]
    fn text_is_trimmed() {
        assert_eq!(normalize_required_text("  Cash ", "name").unwrap(), "Cash");
        assert_eq!(
            normalize_required_text("   ", "name").unwrap_err(),
            EngineError::Validation("name must not be empty".to_string())
        );
        assert_eq!(normalize_optional_text(Some("  ")), None);
        assert_eq!(normalize_optional_text(Some(" hi ")), Some("hi".to_string()));
    }

    #[test]
    fn amount_rules() {
        assert!(require_positive_amount(1).is_ok());
        assert!(require_positive_amount(0).is_err());
        assert!(require_positive_amount(-5).is_err());
        assert!(require_non_zero_amount(-5).is_ok());
        assert!(require_non_zero_amount(0).is_err());
    }

    #[test]
    fn amounts_and_balances_are_bounded() {
        assert_eq!(require_positive_amount(MAX_AMOUNT).unwrap(), MAX_AMOUNT);
        assert_eq!(
            require_positive_amount(MAX_AMOUNT + 1).unwrap_err(),
            EngineError::Validation(format!("amount must not exceed {MAX_AMOUNT}"))
        );
        assert!(require_positive_amount(i64::MAX).is_err());
        assert!(require_non_zero_amount(-MAX_AMOUNT).is_ok());
        assert!(require_non_zero_amount(i64::MIN).is_err());
        assert!(require_non_zero_amount(i64::MAX).is_err());
        assert!(require_balance_in_range(0).is_ok());
        assert!(require_balance_in_range(-MAX_AMOUNT).is_ok());
        assert!(require_balance_in_range(i64::MAX).is_err());
        assert!(require_balance_in_range(i64::MIN).is_err());
    }
}
