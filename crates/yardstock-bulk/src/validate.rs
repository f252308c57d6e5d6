//! Free-text price and quantity validation.
//!
//! Both validators are pure and cheap; they run once per row during
//! normalization and again on every edit to drive inline field errors.

use std::num::IntErrorKind;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::error::FieldError;

/// Currency symbols stripped from price input before parsing.
const CURRENCY_SYMBOLS: &[char] = &['₦', '$', '€', '£', '¥'];

/// Cleans and parses a price such as `"₦1,500.00"`.
///
/// After currency symbols and commas are removed only digits and a decimal
/// point may remain, so exponents and `_` separators are refused.
///
/// # Errors
///
/// [`FieldError::PriceRequired`] for blank input, [`FieldError::PriceInvalid`]
/// when the cleaned text is not a plain decimal or is not strictly positive.
pub fn validate_price(raw: &str) -> Result<Decimal, FieldError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FieldError::PriceRequired);
    }

    let cleaned: String = trimmed
        .chars()
        .filter(|c| *c != ',' && !CURRENCY_SYMBOLS.contains(c))
        .collect();
    let cleaned = cleaned.trim();
    if !cleaned.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return Err(FieldError::PriceInvalid);
    }

    let value = Decimal::from_str(cleaned).map_err(|_| FieldError::PriceInvalid)?;
    if value <= Decimal::ZERO {
        return Err(FieldError::PriceInvalid);
    }

    Ok(value.normalize())
}

/// Cleans and parses a whole-number quantity such as `"1,000"`.
///
/// Only thousands separators are stripped; currency symbols are rejected.
///
/// # Errors
///
/// - [`FieldError::QuantityRequired`] for blank input.
/// - [`FieldError::QuantityTooLarge`] above `u32::MAX`.
/// - [`FieldError::QuantityInvalid`] for anything else that is not a positive integer.
pub fn validate_quantity(raw: &str) -> Result<u32, FieldError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FieldError::QuantityRequired);
    }

    let cleaned: String = trimmed.chars().filter(|c| *c != ',').collect();
    let cleaned = cleaned.trim();
    if !cleaned.chars().all(|c| c.is_ascii_digit()) {
        return Err(FieldError::QuantityInvalid);
    }

    let value = cleaned.parse::<u32>().map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow => FieldError::QuantityTooLarge { max: u32::MAX },
        _ => FieldError::QuantityInvalid,
    })?;
    if value == 0 {
        return Err(FieldError::QuantityInvalid);
    }

    Ok(value)
}
