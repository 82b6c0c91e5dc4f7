//! Shift API Handlers
//!
//! Handlers own request validation and date/time resolution; the
//! repository layer owns the state machine. Times arrive as local
//! date + HH:MM pairs and are stored as Unix millis; the business date
//! is frozen at open time using the configured timezone and cutoff.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::Days;
use serde::Deserialize;

use shared::cash::reconcile;
use shared::models::{
    DayCloseOutcome, DayCloseRequest, DayGroup, ReconcileRequest, Shift, ShiftClose,
    ShiftListQuery, ShiftStart,
};
use shared::response::{ApiResponse, PageMeta};

use crate::api::Operator;
use crate::core::ServerState;
use crate::db::repository::{day_report, shift};
use crate::utils::validation::{MAX_NAME_LEN, MAX_NOTE_LEN, validate_cash, validate_counts, validate_optional_text};
use crate::utils::{AppError, AppResult, ok, ok_paged, ok_with_message, time};

/// POST /api/shifts - open a shift
pub async fn start(
    State(state): State<ServerState>,
    operator: Operator,
    Json(payload): Json<ShiftStart>,
) -> AppResult<Json<ApiResponse<Shift>>> {
    validate_optional_text(payload.login_name.as_deref(), "login_name", MAX_NAME_LEN)?;
    validate_optional_text(payload.note.as_deref(), "note", MAX_NOTE_LEN)?;
    if let Some(number) = payload.shift_number
        && number < 1
    {
        return Err(AppError::validation(format!(
            "shift_number must be positive, got {number}"
        )));
    }

    let tz = state.config.timezone;
    let cutoff = state.config.business_day_cutoff;

    let start_time = match (&payload.login_date, &payload.login_time) {
        (Some(date), Some(time_of_day)) => {
            let date = time::parse_date(date)?;
            time::validate_not_future(date, tz)?;
            let time_of_day = time::parse_time(time_of_day)?;
            time::date_time_to_millis(date, time_of_day, tz)
        }
        (None, None) => shared::util::now_millis(),
        _ => {
            return Err(AppError::validation(
                "login_date and login_time must be provided together",
            ));
        }
    };

    let logout_time = match (&payload.logout_date, &payload.logout_time) {
        (Some(date), Some(time_of_day)) => {
            let date = time::parse_date(date)?;
            let time_of_day = time::parse_time(time_of_day)?;
            Some(time::date_time_to_millis(date, time_of_day, tz))
        }
        (None, None) => None,
        _ => {
            return Err(AppError::validation(
                "logout_date and logout_time must be provided together",
            ));
        }
    };

    let business_date = time::business_date_at(start_time, cutoff, tz)
        .format("%Y-%m-%d")
        .to_string();
    let opened_by_name = payload.login_name.unwrap_or_else(|| operator.name.clone());

    let shift = shift::create(
        &state.pool,
        shift::NewShift {
            branch_id: operator.branch_id,
            business_date,
            shift_number: payload.shift_number,
            start_time,
            logout_time,
            opened_by: operator.id,
            opened_by_name,
            note: payload.note,
        },
    )
    .await?;

    Ok(ok_with_message(shift, "Shift opened"))
}

/// POST /api/shifts/close - close the current shift with the counted drawer
pub async fn close(
    State(state): State<ServerState>,
    operator: Operator,
    Json(payload): Json<ShiftClose>,
) -> AppResult<Json<ApiResponse<Shift>>> {
    validate_counts(&payload.denominations)?;
    validate_optional_text(payload.note.as_deref(), "note", MAX_NOTE_LEN)?;

    let (shift, warning) = shift::close(
        &state.pool,
        &operator.branch_id,
        &payload.denominations,
        payload.note.as_deref(),
        &operator.id,
        &operator.name,
        state.config.cash_variance_warn_threshold,
    )
    .await?;

    Ok(Json(
        ApiResponse::ok_with_message(shift, "Shift closed").with_warning(warning),
    ))
}

/// POST /api/shifts/day-close - finalize the business day
pub async fn day_close(
    State(state): State<ServerState>,
    operator: Operator,
    Json(payload): Json<DayCloseRequest>,
) -> AppResult<Json<ApiResponse<DayCloseOutcome>>> {
    validate_optional_text(payload.note.as_deref(), "note", MAX_NOTE_LEN)?;
    if let Some(ref overrides) = payload.denominations
        && let Some((value, count)) = overrides.first_negative()
    {
        return Err(AppError::validation(format!(
            "note_{value} override must be non-negative, got {count}"
        )));
    }

    let business_date = match payload.business_date {
        Some(ref date) => time::parse_date(date)?.format("%Y-%m-%d").to_string(),
        None => time::current_business_date(state.config.business_day_cutoff, state.config.timezone)
            .format("%Y-%m-%d")
            .to_string(),
    };

    let outcome = day_report::generate(
        &state.pool,
        &operator.branch_id,
        &business_date,
        payload.note.as_deref(),
        payload.denominations.as_ref(),
        &operator.id,
        &operator.name,
    )
    .await?;

    Ok(ok_with_message(outcome, "Day closed"))
}

/// POST /api/shifts/reconcile - dry-run count check, no state change
pub async fn reconcile_preview(
    State(state): State<ServerState>,
    operator: Operator,
    Json(payload): Json<ReconcileRequest>,
) -> AppResult<Json<ApiResponse<shared::cash::Reconciliation>>> {
    validate_counts(&payload.denominations)?;
    if let Some(expected) = payload.expected_cash {
        validate_cash(expected, "expected_cash")?;
    }

    let expected = match payload.expected_cash {
        Some(value) => value,
        None => {
            shift::find_open(&state.pool, &operator.branch_id)
                .await?
                .ok_or_else(|| {
                    AppError::not_found(format!(
                        "No open shift for branch {}",
                        operator.branch_id
                    ))
                })?
                .expected_cash
        }
    };

    let result = reconcile(&payload.denominations, Some(expected));
    let warning = result.warning(state.config.cash_variance_warn_threshold);
    Ok(Json(ApiResponse::ok(result).with_warning(warning)))
}

/// GET /api/shifts/current - the branch's open shift, if any
pub async fn get_current(
    State(state): State<ServerState>,
    operator: Operator,
) -> AppResult<Json<ApiResponse<Option<Shift>>>> {
    let current = shift::find_open(&state.pool, &operator.branch_id).await?;
    Ok(ok(current))
}

/// GET /api/shifts - paginated filtered listing
pub async fn list(
    State(state): State<ServerState>,
    operator: Operator,
    Query(query): Query<ShiftListQuery>,
) -> AppResult<Json<ApiResponse<Vec<Shift>>>> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20).clamp(1, 100);
    if let Some(ref date) = query.date {
        time::parse_date(date)?;
    }

    let filter = shift::ShiftFilter {
        branch_id: Some(operator.branch_id),
        date: query.date,
        status: query.status,
        shift_number: query.shift_number,
    };
    let (shifts, total) = shift::list(&state.pool, &filter, limit, (page - 1) * limit).await?;

    Ok(ok_paged(shifts, PageMeta::new(page, limit, total)))
}

/// Query params for the by-day rollup
#[derive(Debug, Deserialize)]
pub struct ByDayQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// GET /api/shifts/by-day - per-day rollup, defaults to the last 30 days
pub async fn list_by_day(
    State(state): State<ServerState>,
    operator: Operator,
    Query(query): Query<ByDayQuery>,
) -> AppResult<Json<ApiResponse<Vec<DayGroup>>>> {
    let today =
        time::current_business_date(state.config.business_day_cutoff, state.config.timezone);
    let end = match query.end_date {
        Some(ref date) => time::parse_date(date)?,
        None => today,
    };
    let start = match query.start_date {
        Some(ref date) => time::parse_date(date)?,
        None => end.checked_sub_days(Days::new(30)).unwrap_or(end),
    };
    if start > end {
        return Err(AppError::validation(format!(
            "start_date {start} is after end_date {end}"
        )));
    }

    let groups = shift::grouped_by_day(
        &state.pool,
        &operator.branch_id,
        &start.format("%Y-%m-%d").to_string(),
        &end.format("%Y-%m-%d").to_string(),
    )
    .await?;
    Ok(ok(groups))
}

/// GET /api/shifts/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Shift>>> {
    let shift = shift::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Shift {id} not found")))?;
    Ok(ok(shift))
}
