//! Shift Model
//!
//! One cashier working session from open to close. Status transitions are
//! monotonic: OPEN -> CLOSED -> DAY_CLOSE, never backwards.

use serde::{Deserialize, Serialize};

use crate::cash::DenominationCount;

/// Shift status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShiftStatus {
    Open,
    Closed,
    DayClose,
}

impl Default for ShiftStatus {
    fn default() -> Self {
        Self::Open
    }
}

impl ShiftStatus {
    /// Stored TEXT representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Closed => "CLOSED",
            Self::DayClose => "DAY_CLOSE",
        }
    }
}

/// Shift record - one operator working session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Shift {
    pub id: i64,
    /// Sequential number, scoped per branch + business date
    pub shift_number: i64,
    /// Branch identifier (trusted from the caller)
    pub branch_id: String,
    /// Business date (YYYY-MM-DD) frozen at open time
    pub business_date: String,
    /// Shift status
    pub status: ShiftStatus,
    /// Shift start time (Unix millis)
    pub start_time: i64,
    /// Shift end time (Unix millis), null while open
    pub end_time: Option<i64>,
    /// Operator logout time (Unix millis), caller-supplied
    pub logout_time: Option<i64>,
    /// Opening operator ID
    pub opened_by: String,
    /// Opening operator display name snapshot
    pub opened_by_name: String,
    /// Closing operator ID, null while open
    pub closed_by: Option<String>,
    /// Closing operator display name snapshot
    pub closed_by_name: Option<String>,
    /// Notes; day-close appends its note
    pub note: Option<String>,
    /// Note counts per denomination
    #[serde(flatten)]
    #[cfg_attr(feature = "db", sqlx(flatten))]
    pub denominations: DenominationCount,
    /// Derived: dot product of counts and face values
    pub total_cash: f64,
    /// Accumulated cash-method sales recorded during the shift
    pub expected_cash: f64,
    /// Counted minus expected, set at close
    pub cash_variance: Option<f64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Start shift payload (open)
///
/// All fields optional; shift number defaults to max + 1 for the branch
/// and business date, start time defaults to now.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShiftStart {
    pub shift_number: Option<i64>,
    /// Override start date (YYYY-MM-DD, business timezone)
    pub login_date: Option<String>,
    /// Override start time of day (HH:MM)
    pub login_time: Option<String>,
    /// Scheduled logout date (YYYY-MM-DD)
    pub logout_date: Option<String>,
    /// Scheduled logout time of day (HH:MM)
    pub logout_time: Option<String>,
    /// Display name override for the opening operator
    pub login_name: Option<String>,
    pub note: Option<String>,
}

/// Close shift payload: the counted drawer breakdown
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShiftClose {
    #[serde(flatten)]
    pub denominations: DenominationCount,
    pub note: Option<String>,
}

/// Dry-run reconcile payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconcileRequest {
    #[serde(flatten)]
    pub denominations: DenominationCount,
    /// Expected cash override; defaults to the open shift's recorded value
    pub expected_cash: Option<f64>,
}

/// List query parameters for shifts
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShiftListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    /// Business date filter (YYYY-MM-DD)
    pub date: Option<String>,
    pub status: Option<ShiftStatus>,
    pub shift_number: Option<i64>,
}

/// Per-calendar-day rollup of shifts (read-only projection)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DayGroup {
    pub business_date: String,
    pub shift_count: i64,
    pub open_count: i64,
    pub closed_count: i64,
    pub day_close_count: i64,
    /// Sum of counted cash across the day's shifts
    pub total_cash: f64,
    pub expected_cash: f64,
    pub first_shift_time: Option<i64>,
    pub last_shift_time: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_serde() {
        let json = serde_json::to_string(&ShiftStatus::DayClose).unwrap();
        assert_eq!(json, "\"DAY_CLOSE\"");
        let back: ShiftStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ShiftStatus::DayClose);
    }

    #[test]
    fn close_payload_flattens_denominations() {
        let payload: ShiftClose =
            serde_json::from_str(r#"{"note_500": 2, "note_100": 3, "note": "ok"}"#).unwrap();
        assert_eq!(payload.denominations.note_500, 2);
        assert_eq!(payload.denominations.total_cash(), 1300.0);
        assert_eq!(payload.note.as_deref(), Some("ok"));
    }

    #[test]
    fn non_integer_counts_are_rejected_at_deserialization() {
        let result = serde_json::from_str::<ShiftClose>(r#"{"note_500": 2.5}"#);
        assert!(result.is_err());
    }
}
