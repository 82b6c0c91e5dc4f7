//! Order API Handlers

use axum::{Json, extract::State};

use shared::models::{SaleOrder, SaleOrderCreate};
use shared::response::ApiResponse;

use crate::api::Operator;
use crate::core::ServerState;
use crate::db::repository::order;
use crate::utils::validation::validate_cash;
use crate::utils::{AppResult, ok_with_message};

/// POST /api/orders - record a completed sale against the open shift
pub async fn create(
    State(state): State<ServerState>,
    operator: Operator,
    Json(payload): Json<SaleOrderCreate>,
) -> AppResult<Json<ApiResponse<SaleOrder>>> {
    validate_cash(payload.total_amount, "total_amount")?;

    let order = order::create(&state.pool, &operator.branch_id, &payload).await?;
    Ok(ok_with_message(order, "Sale recorded"))
}
