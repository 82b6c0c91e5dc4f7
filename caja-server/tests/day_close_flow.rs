//! End-to-end lifecycle: open shifts, record sales, close with a counted
//! drawer, finalize the day and verify the report and both aggregation
//! views agree.

use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

use caja_server::db::repository::{day_report, order, shift};
use shared::cash::DenominationCount;
use shared::models::{PaymentMethod, SaleOrderCreate, ShiftStatus};

const BRANCH: &str = "main";
const DATE: &str = "2026-03-14";
const WARN_THRESHOLD: f64 = 0.01;

async fn pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();
    pool
}

async fn open_shift(pool: &SqlitePool, operator: &str) -> shared::models::Shift {
    shift::create(
        pool,
        shift::NewShift {
            branch_id: BRANCH.into(),
            business_date: DATE.into(),
            shift_number: None,
            start_time: shared::util::now_millis(),
            logout_time: None,
            opened_by: operator.into(),
            opened_by_name: operator.into(),
            note: None,
        },
    )
    .await
    .unwrap()
}

async fn record(pool: &SqlitePool, amount: f64, method: PaymentMethod) {
    order::create(
        pool,
        BRANCH,
        &SaleOrderCreate {
            total_amount: amount,
            payment_method: method,
        },
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn full_day_lifecycle() {
    let pool = pool().await;

    // Morning shift: 300 cash + 450 card, drawer balances
    let morning = open_shift(&pool, "ana").await;
    assert_eq!(morning.shift_number, 1);
    record(&pool, 300.0, PaymentMethod::Cash).await;
    record(&pool, 450.0, PaymentMethod::Card).await;

    let counts = DenominationCount {
        note_200: 1,
        note_100: 1,
        ..Default::default()
    };
    let (closed, warning) = shift::close(&pool, BRANCH, &counts, None, "ana", "ana", WARN_THRESHOLD)
        .await
        .unwrap();
    assert_eq!(closed.status, ShiftStatus::Closed);
    assert_eq!(closed.total_cash, 300.0);
    assert_eq!(closed.cash_variance, Some(0.0));
    assert!(warning.is_none());

    // Evening shift: 120 online, empty drawer
    let evening = open_shift(&pool, "luis").await;
    assert_eq!(evening.shift_number, 2);
    record(&pool, 120.0, PaymentMethod::Online).await;
    shift::close(
        &pool,
        BRANCH,
        &DenominationCount::default(),
        None,
        "luis",
        "luis",
        WARN_THRESHOLD,
    )
    .await
    .unwrap();

    // Day close finalizes both shifts and files the report
    let outcome = day_report::generate(&pool, BRANCH, DATE, Some("closing"), None, "mgr", "mgr")
        .await
        .unwrap();
    assert_eq!(outcome.closed_count, 2);
    assert_eq!(outcome.report.total_orders, 3);
    assert_eq!(outcome.report.total_sales, 870.0);
    assert_eq!(outcome.report.cash_amount, 300.0);
    assert_eq!(outcome.report.card_amount, 450.0);
    assert_eq!(outcome.report.online_amount, 120.0);
    assert_eq!(outcome.report.total_cash, 300.0);
    assert_eq!(outcome.report.shift_count, 2);

    let shifts = shift::find_by_branch_date(&pool, BRANCH, DATE).await.unwrap();
    assert!(shifts.iter().all(|s| s.status == ShiftStatus::DayClose));

    // Both views describe the same sales
    let shift_total: f64 = outcome
        .summary
        .shift_wise
        .iter()
        .map(|s| s.total_sales)
        .sum();
    assert_eq!(shift_total, outcome.summary.day_wise.total_sales);

    // The summary recomputes identically after the close
    let recomputed = day_report::summary(&pool, BRANCH, DATE).await.unwrap();
    assert_eq!(recomputed, outcome.summary);

    // A rerun of the day close must conflict, and after the conflict the
    // next business day can start fresh
    let err = day_report::generate(&pool, BRANCH, DATE, None, None, "mgr", "mgr")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        caja_server::db::repository::RepoError::Conflict(_)
    ));
    open_shift(&pool, "ana").await;
}
