//! Domain models
//!
//! Plain serde structs shared across server and client. `FromRow` derives
//! are gated behind the `db` feature so the client stays free of sqlx.

pub mod day_report;
pub mod order;
pub mod shift;

pub use day_report::{
    DayCloseOutcome, DayCloseRequest, DayReport, DaySummary, DayWiseSales, ShiftSales,
};
pub use order::{OrderStatus, PaymentMethod, SaleOrder, SaleOrderCreate};
pub use shift::{
    DayGroup, ReconcileRequest, Shift, ShiftClose, ShiftListQuery, ShiftStart, ShiftStatus,
};
