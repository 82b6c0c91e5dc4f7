//! Day Report Model
//!
//! The persisted end-of-day record plus the derived day-wise / shift-wise
//! sales views. The shift-wise entries are never stored; they are a pure
//! function of the shift and sale rows and are recomputed on demand so the
//! aggregation stays reproducible byte-for-byte.

use serde::{Deserialize, Serialize};

use crate::cash::DenominationOverride;
use crate::models::shift::Shift;

/// Persisted day-close record, one per branch + business date
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DayReport {
    pub id: i64,
    pub branch_id: String,
    /// Business date (YYYY-MM-DD)
    pub business_date: String,
    pub total_orders: i64,
    pub total_sales: f64,
    pub cash_amount: f64,
    pub card_amount: f64,
    pub online_amount: f64,
    /// Counted cash across the day's shifts
    pub total_cash: f64,
    pub shift_count: i64,
    pub first_shift_time: Option<i64>,
    pub last_shift_time: Option<i64>,
    pub day_close_time: i64,
    pub closed_by: String,
    pub closed_by_name: String,
    pub note: Option<String>,
    pub created_at: i64,
}

/// Day-wise totals: all completed orders for the calendar day,
/// regardless of owning shift
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DayWiseSales {
    pub order_count: i64,
    pub total_sales: f64,
    pub cash_amount: f64,
    pub card_amount: f64,
    pub online_amount: f64,
}

/// Shift-wise totals: completed orders grouped by owning shift
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ShiftSales {
    pub shift_id: i64,
    pub shift_number: i64,
    pub operator_name: String,
    pub order_count: i64,
    pub total_sales: f64,
    pub cash_amount: f64,
    pub card_amount: f64,
    pub online_amount: f64,
    /// Counted cash at shift close
    pub total_cash: f64,
    /// Counted minus expected at shift close
    pub cash_variance: Option<f64>,
}

/// The two aggregation views over the same sales data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    pub day_wise: DayWiseSales,
    pub shift_wise: Vec<ShiftSales>,
}

/// Day close payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DayCloseRequest {
    pub note: Option<String>,
    /// Business date override (defaults to the current business date)
    pub business_date: Option<String>,
    /// Partial overrides applied to the most recently closed shift
    pub denominations: Option<DenominationOverride>,
}

/// Day close result: the finalized shift set plus the sales snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayCloseOutcome {
    pub shifts: Vec<Shift>,
    pub closed_count: i64,
    pub day_close_time: i64,
    pub closed_by: String,
    pub closed_by_name: String,
    pub summary: DaySummary,
    pub report: DayReport,
}
