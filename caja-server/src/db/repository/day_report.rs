//! Day Report Repository
//!
//! End-of-day close and the persisted day report. The close is a single
//! transaction: finalize every closed shift, aggregate the day's sales,
//! insert the report. Either all of it commits or none of it does, so a
//! conflict mid-close leaves every shift in its prior status.

use sqlx::SqlitePool;

use shared::cash::{DenominationOverride, reconcile};
use shared::models::{DayCloseOutcome, DayReport, DaySummary, Shift};

use super::shift::SHIFT_SELECT;
use super::{RepoError, RepoResult};
use crate::reports::aggregate;

const DAY_REPORT_SELECT: &str = "SELECT id, branch_id, business_date, total_orders, total_sales, cash_amount, card_amount, online_amount, total_cash, shift_count, first_shift_time, last_shift_time, day_close_time, closed_by, closed_by_name, note, created_at FROM day_report";

/// Close the business day for a branch.
///
/// Preconditions checked inside the transaction: no shift still open for
/// the date, no report already filed, at least one closed shift. The
/// optional denomination overrides correct the most recently closed
/// shift's count before aggregation, recomputing its total and variance.
pub async fn generate(
    pool: &SqlitePool,
    branch_id: &str,
    business_date: &str,
    note: Option<&str>,
    overrides: Option<&DenominationOverride>,
    closed_by: &str,
    closed_by_name: &str,
) -> RepoResult<DayCloseOutcome> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    let open_count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM shift WHERE branch_id = ? AND business_date = ? AND status = 'OPEN'",
    )
    .bind(branch_id)
    .bind(business_date)
    .fetch_one(&mut *tx)
    .await?;
    if open_count > 0 {
        return Err(RepoError::Conflict(format!(
            "{open_count} shift(s) still open for {business_date}; close them first"
        )));
    }

    let existing: Option<i64> =
        sqlx::query_scalar("SELECT id FROM day_report WHERE branch_id = ? AND business_date = ?")
            .bind(branch_id)
            .bind(business_date)
            .fetch_optional(&mut *tx)
            .await?;
    if existing.is_some() {
        return Err(RepoError::Conflict(format!(
            "Day {business_date} is already closed"
        )));
    }

    let closed_sql = format!(
        "{SHIFT_SELECT} WHERE branch_id = ? AND business_date = ? AND status = 'CLOSED' ORDER BY shift_number, id"
    );
    let closed: Vec<Shift> = sqlx::query_as(&closed_sql)
        .bind(branch_id)
        .bind(business_date)
        .fetch_all(&mut *tx)
        .await?;
    if closed.is_empty() {
        return Err(RepoError::NotFound(format!(
            "No closed shifts for {business_date}"
        )));
    }

    // The correction targets the last shift to finish counting
    if let Some(overrides) = overrides
        && !overrides.is_empty()
        && let Some(target) = closed.iter().max_by_key(|s| (s.end_time, s.id))
    {
        let counts = target.denominations.merged(overrides);
        let reconciliation = reconcile(&counts, Some(target.expected_cash));

        sqlx::query(
            "UPDATE shift SET note_1000 = ?, note_500 = ?, note_200 = ?, note_100 = ?, note_50 = ?, note_20 = ?, note_10 = ?, note_5 = ?, note_2 = ?, note_1 = ?, total_cash = ?, cash_variance = ?, updated_at = ? WHERE id = ?",
        )
        .bind(counts.note_1000)
        .bind(counts.note_500)
        .bind(counts.note_200)
        .bind(counts.note_100)
        .bind(counts.note_50)
        .bind(counts.note_20)
        .bind(counts.note_10)
        .bind(counts.note_5)
        .bind(counts.note_2)
        .bind(counts.note_1)
        .bind(reconciliation.total_cash)
        .bind(reconciliation.variance)
        .bind(now)
        .bind(target.id)
        .execute(&mut *tx)
        .await?;
    }

    let finalized = sqlx::query(
        "UPDATE shift SET status = 'DAY_CLOSE', updated_at = ?1, note = CASE WHEN ?2 IS NULL THEN note WHEN note IS NULL OR note = '' THEN ?2 ELSE note || ' | ' || ?2 END WHERE branch_id = ?3 AND business_date = ?4 AND status = 'CLOSED'",
    )
    .bind(now)
    .bind(note)
    .bind(branch_id)
    .bind(business_date)
    .execute(&mut *tx)
    .await?;
    let closed_count = finalized.rows_affected() as i64;

    let summary = aggregate::summary(&mut *tx, branch_id, business_date).await?;

    let shifts: Vec<Shift> = sqlx::query_as(&format!(
        "{SHIFT_SELECT} WHERE branch_id = ? AND business_date = ? ORDER BY shift_number, id"
    ))
    .bind(branch_id)
    .bind(business_date)
    .fetch_all(&mut *tx)
    .await?;

    let total_cash: f64 = shifts.iter().map(|s| s.total_cash).sum();
    let first_shift_time = shifts.iter().map(|s| s.start_time).min();
    let last_shift_time = shifts.iter().filter_map(|s| s.end_time).max();

    let report_id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO day_report (id, branch_id, business_date, total_orders, total_sales, cash_amount, card_amount, online_amount, total_cash, shift_count, first_shift_time, last_shift_time, day_close_time, closed_by, closed_by_name, note, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(report_id)
    .bind(branch_id)
    .bind(business_date)
    .bind(summary.day_wise.order_count)
    .bind(summary.day_wise.total_sales)
    .bind(summary.day_wise.cash_amount)
    .bind(summary.day_wise.card_amount)
    .bind(summary.day_wise.online_amount)
    .bind(total_cash)
    .bind(shifts.len() as i64)
    .bind(first_shift_time)
    .bind(last_shift_time)
    .bind(now)
    .bind(closed_by)
    .bind(closed_by_name)
    .bind(note)
    .bind(now)
    .execute(&mut *tx)
    .await
    .map_err(|e| match RepoError::from(e) {
        RepoError::Conflict(_) => {
            RepoError::Conflict(format!("Day {business_date} is already closed"))
        }
        other => other,
    })?;

    tx.commit().await?;

    let report = find_by_id(pool, report_id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create day report".into()))?;

    Ok(DayCloseOutcome {
        shifts,
        closed_count,
        day_close_time: now,
        closed_by: closed_by.to_string(),
        closed_by_name: closed_by_name.to_string(),
        summary,
        report,
    })
}

/// Recompute the sales summary for a branch + date from current rows
pub async fn summary(
    pool: &SqlitePool,
    branch_id: &str,
    business_date: &str,
) -> RepoResult<DaySummary> {
    let mut conn = pool.acquire().await?;
    Ok(aggregate::summary(&mut conn, branch_id, business_date).await?)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<DayReport>> {
    let sql = format!("{DAY_REPORT_SELECT} WHERE id = ?");
    let report = sqlx::query_as::<_, DayReport>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(report)
}

pub async fn find_by_date(
    pool: &SqlitePool,
    branch_id: &str,
    business_date: &str,
) -> RepoResult<Option<DayReport>> {
    let sql = format!("{DAY_REPORT_SELECT} WHERE branch_id = ? AND business_date = ?");
    let report = sqlx::query_as::<_, DayReport>(&sql)
        .bind(branch_id)
        .bind(business_date)
        .fetch_optional(pool)
        .await?;
    Ok(report)
}

/// All reports for a branch within an inclusive date range, oldest first
pub async fn find_range(
    pool: &SqlitePool,
    branch_id: &str,
    start_date: &str,
    end_date: &str,
) -> RepoResult<Vec<DayReport>> {
    let sql = format!(
        "{DAY_REPORT_SELECT} WHERE branch_id = ? AND business_date >= ? AND business_date <= ? ORDER BY business_date"
    );
    let reports = sqlx::query_as::<_, DayReport>(&sql)
        .bind(branch_id)
        .bind(start_date)
        .bind(end_date)
        .fetch_all(pool)
        .await?;
    Ok(reports)
}

/// Paginated report history for a branch, optionally bounded by date
pub async fn list(
    pool: &SqlitePool,
    branch_id: &str,
    start_date: Option<&str>,
    end_date: Option<&str>,
    limit: i64,
    offset: i64,
) -> RepoResult<(Vec<DayReport>, i64)> {
    let mut where_sql = String::from(" WHERE branch_id = ?");
    if start_date.is_some() {
        where_sql.push_str(" AND business_date >= ?");
    }
    if end_date.is_some() {
        where_sql.push_str(" AND business_date <= ?");
    }

    let count_sql = format!("SELECT COUNT(*) FROM day_report{where_sql}");
    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql).bind(branch_id);
    if let Some(start) = start_date {
        count_query = count_query.bind(start);
    }
    if let Some(end) = end_date {
        count_query = count_query.bind(end);
    }
    let total = count_query.fetch_one(pool).await?;

    let page_sql =
        format!("{DAY_REPORT_SELECT}{where_sql} ORDER BY business_date DESC LIMIT ? OFFSET ?");
    let mut page_query = sqlx::query_as::<_, DayReport>(&page_sql).bind(branch_id);
    if let Some(start) = start_date {
        page_query = page_query.bind(start);
    }
    if let Some(end) = end_date {
        page_query = page_query.bind(end);
    }
    let reports = page_query.bind(limit).bind(offset).fetch_all(pool).await?;

    Ok((reports, total))
}

pub async fn delete_by_id(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    let rows = sqlx::query("DELETE FROM day_report WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Day report {id} not found")));
    }
    Ok(())
}

pub async fn delete_by_date(
    pool: &SqlitePool,
    branch_id: &str,
    business_date: &str,
) -> RepoResult<()> {
    let rows = sqlx::query("DELETE FROM day_report WHERE branch_id = ? AND business_date = ?")
        .bind(branch_id)
        .bind(business_date)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!(
            "No day report for {business_date}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::test_pool;
    use crate::db::repository::{order, shift};
    use shared::cash::DenominationCount;
    use shared::models::{PaymentMethod, SaleOrderCreate, ShiftStatus};

    const DATE: &str = "2026-03-14";

    async fn open_shift(pool: &SqlitePool) -> Shift {
        shift::create(
            pool,
            shift::NewShift {
                branch_id: "main".into(),
                business_date: DATE.into(),
                shift_number: None,
                start_time: shared::util::now_millis(),
                logout_time: None,
                opened_by: "op-1".into(),
                opened_by_name: "Ana".into(),
                note: None,
            },
        )
        .await
        .unwrap()
    }

    async fn record(pool: &SqlitePool, amount: f64, method: PaymentMethod) {
        order::create(
            pool,
            "main",
            &SaleOrderCreate {
                total_amount: amount,
                payment_method: method,
            },
        )
        .await
        .unwrap();
    }

    async fn close_shift(pool: &SqlitePool, counts: DenominationCount) {
        shift::close(pool, "main", &counts, None, "op-1", "Ana", 0.01)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn day_close_finalizes_shifts_and_files_report() {
        let pool = test_pool().await;
        open_shift(&pool).await;
        record(&pool, 300.0, PaymentMethod::Cash).await;
        close_shift(
            &pool,
            DenominationCount {
                note_100: 3,
                ..Default::default()
            },
        )
        .await;

        open_shift(&pool).await;
        record(&pool, 450.0, PaymentMethod::Card).await;
        close_shift(&pool, DenominationCount::default()).await;

        let outcome = generate(&pool, "main", DATE, Some("eod"), None, "mgr-1", "Marta")
            .await
            .unwrap();

        assert_eq!(outcome.closed_count, 2);
        assert!(
            outcome
                .shifts
                .iter()
                .all(|s| s.status == ShiftStatus::DayClose)
        );
        assert_eq!(outcome.report.total_orders, 2);
        assert_eq!(outcome.report.total_sales, 750.0);
        assert_eq!(outcome.report.cash_amount, 300.0);
        assert_eq!(outcome.report.card_amount, 450.0);
        assert_eq!(outcome.report.total_cash, 300.0);
        assert_eq!(outcome.report.shift_count, 2);
        assert_eq!(outcome.report.closed_by_name, "Marta");
        assert_eq!(outcome.summary.shift_wise.len(), 2);

        // Note appended to every finalized shift
        let shifts = shift::find_by_branch_date(&pool, "main", DATE).await.unwrap();
        assert!(shifts.iter().all(|s| s.note.as_deref() == Some("eod")));
    }

    #[tokio::test]
    async fn open_shift_blocks_day_close_and_nothing_changes() {
        let pool = test_pool().await;
        open_shift(&pool).await;
        close_shift(&pool, DenominationCount::default()).await;
        let still_open = open_shift(&pool).await;

        let err = generate(&pool, "main", DATE, None, None, "mgr-1", "Marta")
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Conflict(_)), "got {err:?}");

        // All-or-nothing: the closed shift was not finalized
        let shifts = shift::find_by_branch_date(&pool, "main", DATE).await.unwrap();
        assert!(shifts.iter().any(|s| s.status == ShiftStatus::Closed));
        assert_eq!(
            shifts.iter().find(|s| s.id == still_open.id).unwrap().status,
            ShiftStatus::Open
        );
        assert!(find_by_date(&pool, "main", DATE).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn second_day_close_conflicts() {
        let pool = test_pool().await;
        open_shift(&pool).await;
        close_shift(&pool, DenominationCount::default()).await;

        generate(&pool, "main", DATE, None, None, "mgr-1", "Marta")
            .await
            .unwrap();
        let err = generate(&pool, "main", DATE, None, None, "mgr-1", "Marta")
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Conflict(_)));
    }

    #[tokio::test]
    async fn day_close_without_shifts_is_not_found() {
        let pool = test_pool().await;
        let err = generate(&pool, "main", DATE, None, None, "mgr-1", "Marta")
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
    }

    #[tokio::test]
    async fn denomination_override_corrects_last_closed_shift() {
        let pool = test_pool().await;
        let first = open_shift(&pool).await;
        record(&pool, 500.0, PaymentMethod::Cash).await;
        close_shift(
            &pool,
            DenominationCount {
                note_500: 1,
                ..Default::default()
            },
        )
        .await;

        let overrides = DenominationOverride {
            note_500: Some(0),
            note_100: Some(5),
            ..Default::default()
        };
        let outcome = generate(&pool, "main", DATE, None, Some(&overrides), "mgr-1", "Marta")
            .await
            .unwrap();

        let corrected = outcome.shifts.iter().find(|s| s.id == first.id).unwrap();
        assert_eq!(corrected.denominations.note_500, 0);
        assert_eq!(corrected.denominations.note_100, 5);
        assert_eq!(corrected.total_cash, 500.0);
        assert_eq!(corrected.cash_variance, Some(0.0));
        assert_eq!(outcome.report.total_cash, 500.0);
    }

    #[tokio::test]
    async fn delete_then_summary_still_recomputes() {
        let pool = test_pool().await;
        open_shift(&pool).await;
        record(&pool, 120.0, PaymentMethod::Online).await;
        close_shift(&pool, DenominationCount::default()).await;

        let outcome = generate(&pool, "main", DATE, None, None, "mgr-1", "Marta")
            .await
            .unwrap();
        delete_by_id(&pool, outcome.report.id).await.unwrap();
        assert!(find_by_date(&pool, "main", DATE).await.unwrap().is_none());

        // The summary is derived, not stored, so it survives the delete
        let recomputed = summary(&pool, "main", DATE).await.unwrap();
        assert_eq!(recomputed.day_wise.online_amount, 120.0);
        assert_eq!(recomputed, outcome.summary);

        let err = delete_by_id(&pool, outcome.report.id).await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
    }

    #[tokio::test]
    async fn list_is_paginated_and_date_bounded() {
        let pool = test_pool().await;
        open_shift(&pool).await;
        close_shift(&pool, DenominationCount::default()).await;
        generate(&pool, "main", DATE, None, None, "mgr-1", "Marta")
            .await
            .unwrap();

        let (reports, total) = list(&pool, "main", None, None, 10, 0).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(reports[0].business_date, DATE);

        let (empty, none) = list(&pool, "main", Some("2026-04-01"), None, 10, 0)
            .await
            .unwrap();
        assert_eq!(none, 0);
        assert!(empty.is_empty());
    }
}
