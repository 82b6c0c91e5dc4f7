//! Shift Repository
//!
//! Owns the shift state machine at the storage level. The
//! one-open-shift-per-branch invariant is enforced by the partial unique
//! index on `(branch_id) WHERE status = 'OPEN'`, so concurrent starts are
//! serialized by SQLite rather than by an application-level read.

use sqlx::SqlitePool;

use shared::cash::{DenominationCount, reconcile};
use shared::models::{Shift, ShiftStatus};

use super::{RepoError, RepoResult};

pub const SHIFT_SELECT: &str = "SELECT id, shift_number, branch_id, business_date, status, start_time, end_time, logout_time, opened_by, opened_by_name, closed_by, closed_by_name, note, note_1000, note_500, note_200, note_100, note_50, note_20, note_10, note_5, note_2, note_1, total_cash, expected_cash, cash_variance, created_at, updated_at FROM shift";

/// Resolved start-shift arguments (handler layer has already converted
/// dates to millis and frozen the business date)
#[derive(Debug, Clone)]
pub struct NewShift {
    pub branch_id: String,
    pub business_date: String,
    pub shift_number: Option<i64>,
    pub start_time: i64,
    pub logout_time: Option<i64>,
    pub opened_by: String,
    pub opened_by_name: String,
    pub note: Option<String>,
}

/// List filter; all fields optional and combined with AND
#[derive(Debug, Clone, Default)]
pub struct ShiftFilter {
    pub branch_id: Option<String>,
    pub date: Option<String>,
    pub status: Option<ShiftStatus>,
    pub shift_number: Option<i64>,
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Shift>> {
    let sql = format!("{SHIFT_SELECT} WHERE id = ?");
    let shift = sqlx::query_as::<_, Shift>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(shift)
}

/// The branch's current open shift, if any. Derived query, never cached.
pub async fn find_open(pool: &SqlitePool, branch_id: &str) -> RepoResult<Option<Shift>> {
    let sql = format!("{SHIFT_SELECT} WHERE branch_id = ? AND status = 'OPEN' LIMIT 1");
    let shift = sqlx::query_as::<_, Shift>(&sql)
        .bind(branch_id)
        .fetch_optional(pool)
        .await?;
    Ok(shift)
}

/// Next sequential shift number for a branch + business date
pub async fn next_shift_number(
    pool: &SqlitePool,
    branch_id: &str,
    business_date: &str,
) -> RepoResult<i64> {
    let next: i64 = sqlx::query_scalar(
        "SELECT COALESCE(MAX(shift_number), 0) + 1 FROM shift WHERE branch_id = ? AND business_date = ?",
    )
    .bind(branch_id)
    .bind(business_date)
    .fetch_one(pool)
    .await?;
    Ok(next)
}

/// Open a new shift.
///
/// Fails with a conflict when the branch already has an open shift: the
/// INSERT races on the partial unique index, so the second concurrent
/// starter observes the conflict rather than a silent duplicate.
pub async fn create(pool: &SqlitePool, data: NewShift) -> RepoResult<Shift> {
    let shift_number = match data.shift_number {
        Some(n) => n,
        None => next_shift_number(pool, &data.branch_id, &data.business_date).await?,
    };

    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();

    sqlx::query(
        "INSERT INTO shift (id, shift_number, branch_id, business_date, status, start_time, logout_time, opened_by, opened_by_name, note, created_at, updated_at) VALUES (?, ?, ?, ?, 'OPEN', ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(shift_number)
    .bind(&data.branch_id)
    .bind(&data.business_date)
    .bind(data.start_time)
    .bind(data.logout_time)
    .bind(&data.opened_by)
    .bind(&data.opened_by_name)
    .bind(&data.note)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| match RepoError::from(e) {
        RepoError::Conflict(_) => RepoError::Conflict(format!(
            "A shift is already open for branch {}",
            data.branch_id
        )),
        other => other,
    })?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create shift".into()))
}

/// Close the branch's open shift with the counted drawer breakdown.
///
/// Computes `total_cash` from the counts and `cash_variance` against the
/// accumulated expected cash. Returns the updated shift plus a warning
/// when the variance is material; the variance never blocks the close.
pub async fn close(
    pool: &SqlitePool,
    branch_id: &str,
    counts: &DenominationCount,
    note: Option<&str>,
    closed_by: &str,
    closed_by_name: &str,
    warn_threshold: f64,
) -> RepoResult<(Shift, Option<String>)> {
    let open = find_open(pool, branch_id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("No open shift for branch {branch_id}")))?;

    let reconciliation = reconcile(counts, Some(open.expected_cash));
    let warning = reconciliation.warning(warn_threshold);
    let now = shared::util::now_millis();

    // Conditional on status so a racing close observes NotFound instead of
    // overwriting a finished shift.
    let rows = sqlx::query(
        "UPDATE shift SET status = 'CLOSED', end_time = ?, note_1000 = ?, note_500 = ?, note_200 = ?, note_100 = ?, note_50 = ?, note_20 = ?, note_10 = ?, note_5 = ?, note_2 = ?, note_1 = ?, total_cash = ?, cash_variance = ?, closed_by = ?, closed_by_name = ?, note = COALESCE(?, note), updated_at = ? WHERE id = ? AND status = 'OPEN'",
    )
    .bind(now)
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
    .bind(closed_by)
    .bind(closed_by_name)
    .bind(note)
    .bind(now)
    .bind(open.id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!(
            "No open shift for branch {branch_id}"
        )));
    }

    let shift = find_by_id(pool, open.id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Shift {} not found", open.id)))?;
    Ok((shift, warning))
}

/// Record a cash sale against the branch's open shift (bumps expected cash)
pub async fn add_cash_payment(pool: &SqlitePool, shift_id: i64, amount: f64) -> RepoResult<()> {
    let now = shared::util::now_millis();
    sqlx::query(
        "UPDATE shift SET expected_cash = expected_cash + ?, updated_at = ? WHERE id = ? AND status = 'OPEN'",
    )
    .bind(amount)
    .bind(now)
    .bind(shift_id)
    .execute(pool)
    .await?;
    Ok(())
}

/// All shifts for a branch + business date, ordered by shift number
pub async fn find_by_branch_date(
    pool: &SqlitePool,
    branch_id: &str,
    business_date: &str,
) -> RepoResult<Vec<Shift>> {
    let sql = format!(
        "{SHIFT_SELECT} WHERE branch_id = ? AND business_date = ? ORDER BY shift_number, id"
    );
    let shifts = sqlx::query_as::<_, Shift>(&sql)
        .bind(branch_id)
        .bind(business_date)
        .fetch_all(pool)
        .await?;
    Ok(shifts)
}

/// Paginated filtered listing; returns the page plus the total row count
pub async fn list(
    pool: &SqlitePool,
    filter: &ShiftFilter,
    limit: i64,
    offset: i64,
) -> RepoResult<(Vec<Shift>, i64)> {
    let mut conditions = Vec::new();
    if filter.branch_id.is_some() {
        conditions.push("branch_id = ?");
    }
    if filter.date.is_some() {
        conditions.push("business_date = ?");
    }
    if filter.status.is_some() {
        conditions.push("status = ?");
    }
    if filter.shift_number.is_some() {
        conditions.push("shift_number = ?");
    }
    let where_sql = if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    };

    let count_sql = format!("SELECT COUNT(*) FROM shift{where_sql}");
    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    if let Some(branch_id) = &filter.branch_id {
        count_query = count_query.bind(branch_id);
    }
    if let Some(date) = &filter.date {
        count_query = count_query.bind(date);
    }
    if let Some(status) = filter.status {
        count_query = count_query.bind(status.as_str());
    }
    if let Some(number) = filter.shift_number {
        count_query = count_query.bind(number);
    }
    let total = count_query.fetch_one(pool).await?;

    let page_sql =
        format!("{SHIFT_SELECT}{where_sql} ORDER BY start_time DESC, id DESC LIMIT ? OFFSET ?");
    let mut page_query = sqlx::query_as::<_, Shift>(&page_sql);
    if let Some(branch_id) = &filter.branch_id {
        page_query = page_query.bind(branch_id);
    }
    if let Some(date) = &filter.date {
        page_query = page_query.bind(date);
    }
    if let Some(status) = filter.status {
        page_query = page_query.bind(status.as_str());
    }
    if let Some(number) = filter.shift_number {
        page_query = page_query.bind(number);
    }
    let shifts = page_query.bind(limit).bind(offset).fetch_all(pool).await?;

    Ok((shifts, total))
}

/// Per-day rollup of shifts over a date range (read-only projection)
pub async fn grouped_by_day(
    pool: &SqlitePool,
    branch_id: &str,
    start_date: &str,
    end_date: &str,
) -> RepoResult<Vec<shared::models::DayGroup>> {
    let groups = sqlx::query_as::<_, shared::models::DayGroup>(
        "SELECT business_date, \
            COUNT(*) AS shift_count, \
            SUM(CASE WHEN status = 'OPEN' THEN 1 ELSE 0 END) AS open_count, \
            SUM(CASE WHEN status = 'CLOSED' THEN 1 ELSE 0 END) AS closed_count, \
            SUM(CASE WHEN status = 'DAY_CLOSE' THEN 1 ELSE 0 END) AS day_close_count, \
            COALESCE(SUM(total_cash), 0) AS total_cash, \
            COALESCE(SUM(expected_cash), 0) AS expected_cash, \
            MIN(start_time) AS first_shift_time, \
            MAX(COALESCE(end_time, start_time)) AS last_shift_time \
         FROM shift \
         WHERE branch_id = ? AND business_date >= ? AND business_date <= ? \
         GROUP BY business_date \
         ORDER BY business_date DESC",
    )
    .bind(branch_id)
    .bind(start_date)
    .bind(end_date)
    .fetch_all(pool)
    .await?;
    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::test_pool;

    fn new_shift(branch: &str) -> NewShift {
        NewShift {
            branch_id: branch.to_string(),
            business_date: "2026-03-14".to_string(),
            shift_number: None,
            start_time: shared::util::now_millis(),
            logout_time: None,
            opened_by: "op-1".to_string(),
            opened_by_name: "Ana".to_string(),
            note: None,
        }
    }

    #[tokio::test]
    async fn second_start_for_same_branch_conflicts() {
        let pool = test_pool().await;
        create(&pool, new_shift("main")).await.unwrap();

        let err = create(&pool, new_shift("main")).await.unwrap_err();
        assert!(matches!(err, RepoError::Conflict(_)), "got {err:?}");

        // Different branch is unaffected
        create(&pool, new_shift("terrace")).await.unwrap();
    }

    #[tokio::test]
    async fn shift_numbers_are_sequential_per_branch_date() {
        let pool = test_pool().await;
        let first = create(&pool, new_shift("main")).await.unwrap();
        assert_eq!(first.shift_number, 1);

        close(
            &pool,
            "main",
            &DenominationCount::default(),
            None,
            "op-1",
            "Ana",
            0.01,
        )
        .await
        .unwrap();

        let second = create(&pool, new_shift("main")).await.unwrap();
        assert_eq!(second.shift_number, 2);
    }

    #[tokio::test]
    async fn close_computes_total_and_variance() {
        let pool = test_pool().await;
        let shift = create(&pool, new_shift("main")).await.unwrap();
        add_cash_payment(&pool, shift.id, 1320.0).await.unwrap();

        let counts = DenominationCount {
            note_500: 2,
            note_100: 3,
            ..Default::default()
        };
        let (closed, warning) = close(&pool, "main", &counts, None, "op-2", "Luis", 0.01)
            .await
            .unwrap();

        assert_eq!(closed.status, ShiftStatus::Closed);
        assert_eq!(closed.total_cash, 1300.0);
        assert_eq!(closed.expected_cash, 1320.0);
        assert_eq!(closed.cash_variance, Some(-20.0));
        assert_eq!(closed.closed_by.as_deref(), Some("op-2"));
        assert!(closed.end_time.is_some());
        assert!(warning.is_some(), "a 20 unit shortfall must warn");
    }

    #[tokio::test]
    async fn double_close_reports_not_found() {
        let pool = test_pool().await;
        create(&pool, new_shift("main")).await.unwrap();
        let counts = DenominationCount::default();
        close(&pool, "main", &counts, None, "op-1", "Ana", 0.01)
            .await
            .unwrap();

        let err = close(&pool, "main", &counts, None, "op-1", "Ana", 0.01)
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn balanced_close_has_no_warning() {
        let pool = test_pool().await;
        let shift = create(&pool, new_shift("main")).await.unwrap();
        add_cash_payment(&pool, shift.id, 1300.0).await.unwrap();

        let counts = DenominationCount {
            note_500: 2,
            note_100: 3,
            ..Default::default()
        };
        let (_, warning) = close(&pool, "main", &counts, None, "op-1", "Ana", 0.01)
            .await
            .unwrap();
        assert!(warning.is_none());
    }

    #[tokio::test]
    async fn list_filters_and_paginates() {
        let pool = test_pool().await;
        create(&pool, new_shift("main")).await.unwrap();
        close(
            &pool,
            "main",
            &DenominationCount::default(),
            None,
            "op-1",
            "Ana",
            0.01,
        )
        .await
        .unwrap();
        create(&pool, new_shift("main")).await.unwrap();

        let filter = ShiftFilter {
            branch_id: Some("main".into()),
            ..Default::default()
        };
        let (page, total) = list(&pool, &filter, 1, 0).await.unwrap();
        assert_eq!(total, 2);
        assert_eq!(page.len(), 1);

        let filter = ShiftFilter {
            branch_id: Some("main".into()),
            status: Some(ShiftStatus::Open),
            ..Default::default()
        };
        let (open_page, open_total) = list(&pool, &filter, 10, 0).await.unwrap();
        assert_eq!(open_total, 1);
        assert_eq!(open_page[0].status, ShiftStatus::Open);
    }

    #[tokio::test]
    async fn grouped_by_day_counts_statuses() {
        let pool = test_pool().await;
        create(&pool, new_shift("main")).await.unwrap();
        close(
            &pool,
            "main",
            &DenominationCount {
                note_100: 2,
                ..Default::default()
            },
            None,
            "op-1",
            "Ana",
            0.01,
        )
        .await
        .unwrap();
        create(&pool, new_shift("main")).await.unwrap();

        let groups = grouped_by_day(&pool, "main", "2026-03-01", "2026-03-31")
            .await
            .unwrap();
        assert_eq!(groups.len(), 1);
        let group = &groups[0];
        assert_eq!(group.business_date, "2026-03-14");
        assert_eq!(group.shift_count, 2);
        assert_eq!(group.open_count, 1);
        assert_eq!(group.closed_count, 1);
        assert_eq!(group.day_close_count, 0);
        assert_eq!(group.total_cash, 200.0);
        assert!(group.first_shift_time.is_some());
    }
}
