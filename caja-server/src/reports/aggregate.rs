//! Sales Aggregation
//!
//! Day-wise and shift-wise views over the same completed orders. Both are
//! pure functions of the `shift` and `sale_order` rows: given the same
//! rows they produce the same output, so the summary can be recomputed at
//! any time instead of being persisted. Every function takes a
//! `SqliteConnection` so the day-close transaction can aggregate inside
//! itself and see its own uncommitted writes.

use sqlx::SqliteConnection;

use shared::models::{DaySummary, DayWiseSales, ShiftSales};

/// Totals over all completed orders for the branch + business date,
/// regardless of which shift owns them
pub async fn day_wise(
    conn: &mut SqliteConnection,
    branch_id: &str,
    business_date: &str,
) -> Result<DayWiseSales, sqlx::Error> {
    sqlx::query_as::<_, DayWiseSales>(
        "SELECT COUNT(id) AS order_count, \
            COALESCE(SUM(total_amount), 0.0) AS total_sales, \
            COALESCE(SUM(CASE WHEN payment_method = 'CASH' THEN total_amount ELSE 0.0 END), 0.0) AS cash_amount, \
            COALESCE(SUM(CASE WHEN payment_method = 'CARD' THEN total_amount ELSE 0.0 END), 0.0) AS card_amount, \
            COALESCE(SUM(CASE WHEN payment_method = 'ONLINE' THEN total_amount ELSE 0.0 END), 0.0) AS online_amount \
         FROM sale_order \
         WHERE branch_id = ? AND business_date = ? AND status = 'COMPLETED'",
    )
    .bind(branch_id)
    .bind(business_date)
    .fetch_one(conn)
    .await
}

/// Completed orders grouped by owning shift, closed shifts only, in
/// shift-number order. Shifts with zero orders still appear.
pub async fn shift_wise(
    conn: &mut SqliteConnection,
    branch_id: &str,
    business_date: &str,
) -> Result<Vec<ShiftSales>, sqlx::Error> {
    sqlx::query_as::<_, ShiftSales>(
        "SELECT s.id AS shift_id, \
            s.shift_number, \
            COALESCE(s.closed_by_name, s.opened_by_name) AS operator_name, \
            COUNT(o.id) AS order_count, \
            COALESCE(SUM(o.total_amount), 0.0) AS total_sales, \
            COALESCE(SUM(CASE WHEN o.payment_method = 'CASH' THEN o.total_amount ELSE 0.0 END), 0.0) AS cash_amount, \
            COALESCE(SUM(CASE WHEN o.payment_method = 'CARD' THEN o.total_amount ELSE 0.0 END), 0.0) AS card_amount, \
            COALESCE(SUM(CASE WHEN o.payment_method = 'ONLINE' THEN o.total_amount ELSE 0.0 END), 0.0) AS online_amount, \
            s.total_cash, \
            s.cash_variance \
         FROM shift s \
         LEFT JOIN sale_order o ON o.shift_id = s.id AND o.status = 'COMPLETED' \
         WHERE s.branch_id = ? AND s.business_date = ? AND s.status IN ('CLOSED', 'DAY_CLOSE') \
         GROUP BY s.id \
         ORDER BY s.shift_number, s.id",
    )
    .bind(branch_id)
    .bind(business_date)
    .fetch_all(conn)
    .await
}

/// Both views over the same rows
pub async fn summary(
    conn: &mut SqliteConnection,
    branch_id: &str,
    business_date: &str,
) -> Result<DaySummary, sqlx::Error> {
    let day_wise = day_wise(conn, branch_id, business_date).await?;
    let shift_wise = shift_wise(conn, branch_id, business_date).await?;
    Ok(DaySummary {
        day_wise,
        shift_wise,
    })
}
