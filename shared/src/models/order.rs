//! Sale Order Model
//!
//! Minimal sales record: the source of expected cash and of day-wise /
//! shift-wise aggregation. Order management itself lives outside this
//! core; the server only records completed sales against the open shift.

use serde::{Deserialize, Serialize};

/// Payment method for a sale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Cash,
    Card,
    Online,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "CASH",
            Self::Card => "CARD",
            Self::Online => "ONLINE",
        }
    }
}

/// Order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Completed,
    Void,
}

/// Sale order record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct SaleOrder {
    pub id: i64,
    pub branch_id: String,
    /// Owning shift
    pub shift_id: i64,
    /// Business date inherited from the owning shift
    pub business_date: String,
    pub status: OrderStatus,
    pub total_amount: f64,
    pub payment_method: PaymentMethod,
    pub created_at: i64,
}

/// Record sale payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleOrderCreate {
    pub total_amount: f64,
    pub payment_method: PaymentMethod,
}
