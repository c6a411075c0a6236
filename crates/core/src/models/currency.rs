use crate::errors::CoreError;

/// The currency every cross rate is composed through.
pub const PIVOT_CURRENCY: &str = "USD";

/// Check that `code` looks like an ISO-4217 code: exactly three ASCII letters.
pub fn validate_code(code: &str) -> Result<(), CoreError> {
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Currency must be a three-letter code, got '{code}'"
        )))
    }
}

/// Validate and upper-case a currency code so later comparisons can be exact.
pub fn normalize_code(code: &str) -> Result<String, CoreError> {
    let trimmed = code.trim();
    validate_code(trimmed)?;
    Ok(trimmed.to_ascii_uppercase())
}

/// Key under which the snapshot stores "units of `currency` per 1 USD".
pub fn pivot_pair(currency: &str) -> String {
    format!("{PIVOT_CURRENCY}{currency}")
}
