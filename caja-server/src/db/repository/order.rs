//! Sale Order Repository
//!
//! Minimal sales capture so aggregation has something to aggregate. Every
//! order is attached to the branch's open shift and stamped with that
//! shift's frozen business date. Cash orders bump the shift's expected
//! cash in the same transaction as the insert.

use sqlx::SqlitePool;

use shared::models::{PaymentMethod, SaleOrder, SaleOrderCreate};

use super::{RepoError, RepoResult, shift};

const ORDER_SELECT: &str = "SELECT id, branch_id, shift_id, business_date, status, total_amount, payment_method, created_at FROM sale_order";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<SaleOrder>> {
    let sql = format!("{ORDER_SELECT} WHERE id = ?");
    let order = sqlx::query_as::<_, SaleOrder>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(order)
}

pub async fn find_by_shift(pool: &SqlitePool, shift_id: i64) -> RepoResult<Vec<SaleOrder>> {
    let sql = format!("{ORDER_SELECT} WHERE shift_id = ? ORDER BY created_at, id");
    let orders = sqlx::query_as::<_, SaleOrder>(&sql)
        .bind(shift_id)
        .fetch_all(pool)
        .await?;
    Ok(orders)
}

/// Record a completed sale against the branch's open shift.
///
/// The order insert and the expected-cash bump commit together; a shift
/// closed by a racing operator fails the bump and rolls back the insert.
pub async fn create(
    pool: &SqlitePool,
    branch_id: &str,
    data: &SaleOrderCreate,
) -> RepoResult<SaleOrder> {
    let open = shift::find_open(pool, branch_id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("No open shift for branch {branch_id}")))?;

    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();

    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO sale_order (id, branch_id, shift_id, business_date, status, total_amount, payment_method, created_at) VALUES (?, ?, ?, ?, 'COMPLETED', ?, ?, ?)",
    )
    .bind(id)
    .bind(branch_id)
    .bind(open.id)
    .bind(&open.business_date)
    .bind(data.total_amount)
    .bind(data.payment_method.as_str())
    .bind(now)
    .execute(&mut *tx)
    .await?;

    if data.payment_method == PaymentMethod::Cash {
        let rows = sqlx::query(
            "UPDATE shift SET expected_cash = expected_cash + ?, updated_at = ? WHERE id = ? AND status = 'OPEN'",
        )
        .bind(data.total_amount)
        .bind(now)
        .bind(open.id)
        .execute(&mut *tx)
        .await?;
        if rows.rows_affected() == 0 {
            return Err(RepoError::Conflict(format!(
                "Shift {} closed while recording the sale",
                open.id
            )));
        }
    }

    tx.commit().await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create order".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::test_pool;
    use crate::db::repository::shift::NewShift;

    async fn open_shift(pool: &SqlitePool, branch: &str) -> shared::models::Shift {
        shift::create(
            pool,
            NewShift {
                branch_id: branch.to_string(),
                business_date: "2026-03-14".to_string(),
                shift_number: None,
                start_time: shared::util::now_millis(),
                logout_time: None,
                opened_by: "op-1".to_string(),
                opened_by_name: "Ana".to_string(),
                note: None,
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn cash_order_bumps_expected_cash() {
        let pool = test_pool().await;
        let opened = open_shift(&pool, "main").await;

        let order = create(
            &pool,
            "main",
            &SaleOrderCreate {
                total_amount: 300.0,
                payment_method: PaymentMethod::Cash,
            },
        )
        .await
        .unwrap();
        assert_eq!(order.shift_id, opened.id);
        assert_eq!(order.business_date, "2026-03-14");

        let shift = shift::find_by_id(&pool, opened.id).await.unwrap().unwrap();
        assert_eq!(shift.expected_cash, 300.0);
    }

    #[tokio::test]
    async fn card_order_leaves_expected_cash_alone() {
        let pool = test_pool().await;
        let opened = open_shift(&pool, "main").await;

        create(
            &pool,
            "main",
            &SaleOrderCreate {
                total_amount: 450.0,
                payment_method: PaymentMethod::Card,
            },
        )
        .await
        .unwrap();

        let shift = shift::find_by_id(&pool, opened.id).await.unwrap().unwrap();
        assert_eq!(shift.expected_cash, 0.0);
        assert_eq!(find_by_shift(&pool, opened.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn order_without_open_shift_is_not_found() {
        let pool = test_pool().await;
        let err = create(
            &pool,
            "main",
            &SaleOrderCreate {
                total_amount: 10.0,
                payment_method: PaymentMethod::Cash,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
    }
}
