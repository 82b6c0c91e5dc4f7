//! Day Report API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use shared::models::{DayReport, DaySummary};
use shared::response::{ApiResponse, PageMeta};

use crate::api::Operator;
use crate::core::ServerState;
use crate::db::repository::day_report;
use crate::reports::{DayReportRenderer, ExportFormat, export};
use crate::utils::{AppError, AppResult, ok, ok_paged, time};

/// Query params for listing reports
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// GET /api/reports - paginated report history for the branch
pub async fn list(
    State(state): State<ServerState>,
    operator: Operator,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<ApiResponse<Vec<DayReport>>>> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20).clamp(1, 100);
    if let Some(ref date) = query.start_date {
        time::parse_date(date)?;
    }
    if let Some(ref date) = query.end_date {
        time::parse_date(date)?;
    }

    let (reports, total) = day_report::list(
        &state.pool,
        &operator.branch_id,
        query.start_date.as_deref(),
        query.end_date.as_deref(),
        limit,
        (page - 1) * limit,
    )
    .await?;

    Ok(ok_paged(reports, PageMeta::new(page, limit, total)))
}

/// Query params for the on-demand summary
#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub date: Option<String>,
}

/// GET /api/reports/summary - recompute day-wise and shift-wise sales
/// for a date, no day-close required
pub async fn summary(
    State(state): State<ServerState>,
    operator: Operator,
    Query(query): Query<SummaryQuery>,
) -> AppResult<Json<ApiResponse<DaySummary>>> {
    let date = match query.date {
        Some(ref date) => time::parse_date(date)?,
        None => {
            time::current_business_date(state.config.business_day_cutoff, state.config.timezone)
        }
    };
    let summary = day_report::summary(
        &state.pool,
        &operator.branch_id,
        &date.format("%Y-%m-%d").to_string(),
    )
    .await?;
    Ok(ok(summary))
}

/// GET /api/reports/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<DayReport>>> {
    let report = find_report(&state, id).await?;
    Ok(ok(report))
}

/// Query params for download: one of `date`, `start_date` + `end_date`
/// or `report_ids` (comma-separated) selects the report set
#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    pub format: Option<String>,
    pub date: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub report_ids: Option<String>,
}

/// GET /api/reports/download?format=csv|excel|pdf
pub async fn download(
    State(state): State<ServerState>,
    operator: Operator,
    Query(query): Query<DownloadQuery>,
) -> AppResult<Response> {
    let format = match query.format.as_deref() {
        None => ExportFormat::Csv,
        Some(raw) => ExportFormat::parse(raw)
            .ok_or_else(|| AppError::invalid(format!("Unsupported format: {raw}")))?,
    };

    let reports = select_reports(&state, &operator, &query).await?;
    if reports.is_empty() {
        return Err(AppError::not_found("No day reports match the selection"));
    }

    let mut bundle = Vec::with_capacity(reports.len());
    for report in reports {
        let summary =
            day_report::summary(&state.pool, &report.branch_id, &report.business_date).await?;
        bundle.push((report, summary));
    }

    let bytes = match format {
        ExportFormat::Csv => export::to_csv(&bundle)?,
        ExportFormat::Excel => export::to_xlsx(&bundle)?,
        ExportFormat::Pdf => export::to_pdf(&bundle)?,
    };

    let stem = match bundle.as_slice() {
        [(report, _)] => format!("day-report-{}", report.business_date),
        [(first, _), .., (last, _)] => format!(
            "day-reports-{}-{}",
            first.business_date, last.business_date
        ),
        [] => String::from("day-reports"),
    };
    let filename = format!("{stem}.{}", format.extension());
    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}

async fn select_reports(
    state: &ServerState,
    operator: &Operator,
    query: &DownloadQuery,
) -> AppResult<Vec<DayReport>> {
    if let Some(ref raw_ids) = query.report_ids {
        let mut reports = Vec::new();
        for raw in raw_ids.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let id: i64 = raw
                .parse()
                .map_err(|_| AppError::validation(format!("Invalid report id: {raw}")))?;
            reports.push(find_report(state, id).await?);
        }
        if reports.is_empty() {
            return Err(AppError::validation("report_ids is empty"));
        }
        return Ok(reports);
    }

    if let Some(ref date) = query.date {
        time::parse_date(date)?;
        let report = day_report::find_by_date(&state.pool, &operator.branch_id, date)
            .await?
            .ok_or_else(|| AppError::not_found(format!("No day report for {date}")))?;
        return Ok(vec![report]);
    }

    match (&query.start_date, &query.end_date) {
        (Some(start), Some(end)) => {
            time::parse_date(start)?;
            time::parse_date(end)?;
            Ok(day_report::find_range(&state.pool, &operator.branch_id, start, end).await?)
        }
        _ => Err(AppError::validation(
            "Provide date, start_date + end_date or report_ids",
        )),
    }
}

/// GET /api/reports/:id/receipt - fixed-width text for the printer
pub async fn receipt(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    let report = find_report(&state, id).await?;
    let summary =
        day_report::summary(&state.pool, &report.branch_id, &report.business_date).await?;

    let renderer = DayReportRenderer::new(48, state.config.timezone);
    let text = renderer.render(&report, &summary);
    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        text,
    )
        .into_response())
}

/// DELETE /api/reports/:id
///
/// Removes only the filed report; finalized shifts stay finalized and the
/// summary stays recomputable.
pub async fn delete_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    day_report::delete_by_id(&state.pool, id).await?;
    Ok(ok(()))
}

/// DELETE /api/reports/date/:date
pub async fn delete_by_date(
    State(state): State<ServerState>,
    operator: Operator,
    Path(date): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    let date = time::parse_date(&date)?;
    day_report::delete_by_date(
        &state.pool,
        &operator.branch_id,
        &date.format("%Y-%m-%d").to_string(),
    )
    .await?;
    Ok(ok(()))
}

async fn find_report(state: &ServerState, id: i64) -> AppResult<DayReport> {
    day_report::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Day report {id} not found")))
}
