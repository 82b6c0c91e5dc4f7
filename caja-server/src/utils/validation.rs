//! Input validation helpers
//!
//! Centralized text length constants and validation functions.
//! SQLite TEXT has no built-in length enforcement, so limits are applied
//! here before any write.

use shared::cash::DenominationCount;

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Operator and branch display names
pub const MAX_NAME_LEN: usize = 200;

/// Notes (shift note, day-close note)
pub const MAX_NOTE_LEN: usize = 500;

/// Short identifiers: branch IDs, operator IDs
pub const MAX_SHORT_TEXT_LEN: usize = 100;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: Option<&str>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

/// Validate a cash amount is finite and non-negative
pub fn validate_cash(value: f64, field: &str) -> Result<(), AppError> {
    if !value.is_finite() {
        return Err(AppError::validation(format!(
            "{field} must be a finite number"
        )));
    }
    if value < 0.0 {
        return Err(AppError::validation(format!(
            "{field} must be non-negative, got {value}"
        )));
    }
    Ok(())
}

/// Validate denomination counts are non-negative.
///
/// Non-integer counts never reach this point; serde rejects them at
/// deserialization.
pub fn validate_counts(counts: &DenominationCount) -> Result<(), AppError> {
    if let Some((value, count)) = counts.first_negative() {
        return Err(AppError::validation(format!(
            "Denomination count for {value} must be non-negative, got {count}"
        )));
    }
    Ok(())
}
