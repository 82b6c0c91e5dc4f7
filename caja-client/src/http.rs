//! HTTP client for the Caja server API

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use shared::cash::Reconciliation;
use shared::models::{
    DayCloseOutcome, DayCloseRequest, DayGroup, DayReport, DaySummary, ReconcileRequest,
    SaleOrder, SaleOrderCreate, Shift, ShiftClose, ShiftListQuery, ShiftStart,
};
use shared::response::{ApiResponse, PageMeta};

use crate::{ClientConfig, ClientError, ClientResult};

/// HTTP client for making requests to the Caja server
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    config: ClientConfig,
}

impl HttpClient {
    /// Create a new HTTP client from configuration
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()?;
        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn with_identity(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let request = request
            .header("X-Operator-Id", &self.config.operator_id)
            .header("X-Branch-Id", &self.config.branch_id);
        match &self.config.operator_name {
            Some(name) => request.header("X-Operator-Name", name),
            None => request,
        }
    }

    /// Make a GET request, expecting the response envelope
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<ApiResponse<T>> {
        let request = self.with_identity(self.client.get(self.url(path)));
        Self::handle_response(request.send().await?).await
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<ApiResponse<T>> {
        let request = self.with_identity(self.client.post(self.url(path)).json(body));
        Self::handle_response(request.send().await?).await
    }

    /// Make a DELETE request
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ClientResult<ApiResponse<T>> {
        let request = self.with_identity(self.client.delete(self.url(path)));
        Self::handle_response(request.send().await?).await
    }

    /// Make a GET request returning raw bytes (downloads)
    pub async fn get_bytes(&self, path: &str) -> ClientResult<Vec<u8>> {
        let request = self.with_identity(self.client.get(self.url(path)));
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await?;
            return Err(Self::map_error(status, text));
        }
        Ok(response.bytes().await?.to_vec())
    }

    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> ClientResult<ApiResponse<T>> {
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await?;
            return Err(Self::map_error(status, text));
        }

        response.json().await.map_err(Into::into)
    }

    fn map_error(status: StatusCode, body: String) -> ClientError {
        // The server wraps errors in the response envelope; fall back to
        // the raw body when it is not one
        let message = serde_json::from_str::<ApiResponse<()>>(&body)
            .map(|r| r.message)
            .unwrap_or(body);

        match status {
            StatusCode::NOT_FOUND => ClientError::NotFound(message),
            StatusCode::CONFLICT => ClientError::Conflict(message),
            StatusCode::BAD_REQUEST => ClientError::Validation(message),
            StatusCode::UNPROCESSABLE_ENTITY => ClientError::BusinessRule(message),
            _ => ClientError::Internal(message),
        }
    }

    fn expect_data<T>(response: ApiResponse<T>, what: &str) -> ClientResult<T> {
        response
            .data
            .ok_or_else(|| ClientError::InvalidResponse(format!("Missing {what} data")))
    }

    // ========== Shift API ==========

    /// Open a shift
    pub async fn start_shift(&self, payload: &ShiftStart) -> ClientResult<Shift> {
        let response = self.post::<Shift, _>("/api/shifts", payload).await?;
        Self::expect_data(response, "shift")
    }

    /// Close the current shift; returns the shift and any variance warning
    pub async fn close_shift(
        &self,
        payload: &ShiftClose,
    ) -> ClientResult<(Shift, Option<String>)> {
        let response = self.post::<Shift, _>("/api/shifts/close", payload).await?;
        let warning = response.warning.clone();
        Ok((Self::expect_data(response, "shift")?, warning))
    }

    /// Finalize the business day
    pub async fn day_close(&self, payload: &DayCloseRequest) -> ClientResult<DayCloseOutcome> {
        let response = self
            .post::<DayCloseOutcome, _>("/api/shifts/day-close", payload)
            .await?;
        Self::expect_data(response, "day close outcome")
    }

    /// Dry-run drawer count check, no state change
    pub async fn reconcile(
        &self,
        payload: &ReconcileRequest,
    ) -> ClientResult<(Reconciliation, Option<String>)> {
        let response = self
            .post::<Reconciliation, _>("/api/shifts/reconcile", payload)
            .await?;
        let warning = response.warning.clone();
        Ok((Self::expect_data(response, "reconciliation")?, warning))
    }

    /// The branch's current open shift, if any
    pub async fn current_shift(&self) -> ClientResult<Option<Shift>> {
        let response = self.get::<Option<Shift>>("/api/shifts/current").await?;
        Ok(response.data.flatten())
    }

    /// Paginated shift listing
    pub async fn list_shifts(
        &self,
        query: &ShiftListQuery,
    ) -> ClientResult<(Vec<Shift>, Option<PageMeta>)> {
        let mut params = Vec::new();
        if let Some(page) = query.page {
            params.push(format!("page={page}"));
        }
        if let Some(limit) = query.limit {
            params.push(format!("limit={limit}"));
        }
        if let Some(ref date) = query.date {
            params.push(format!("date={date}"));
        }
        if let Some(status) = query.status {
            params.push(format!("status={}", status.as_str()));
        }
        if let Some(number) = query.shift_number {
            params.push(format!("shift_number={number}"));
        }
        let path = if params.is_empty() {
            "/api/shifts".to_string()
        } else {
            format!("/api/shifts?{}", params.join("&"))
        };

        let response = self.get::<Vec<Shift>>(&path).await?;
        let meta = response.meta.clone();
        Ok((Self::expect_data(response, "shifts")?, meta))
    }

    /// Per-day shift rollup over a date range
    pub async fn shifts_by_day(
        &self,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> ClientResult<Vec<DayGroup>> {
        let mut params = Vec::new();
        if let Some(start) = start_date {
            params.push(format!("start_date={start}"));
        }
        if let Some(end) = end_date {
            params.push(format!("end_date={end}"));
        }
        let path = if params.is_empty() {
            "/api/shifts/by-day".to_string()
        } else {
            format!("/api/shifts/by-day?{}", params.join("&"))
        };

        let response = self.get::<Vec<DayGroup>>(&path).await?;
        Self::expect_data(response, "day groups")
    }

    /// Fetch a single shift
    pub async fn get_shift(&self, id: i64) -> ClientResult<Shift> {
        let response = self.get::<Shift>(&format!("/api/shifts/{id}")).await?;
        Self::expect_data(response, "shift")
    }

    // ========== Order API ==========

    /// Record a completed sale against the open shift
    pub async fn create_order(&self, payload: &SaleOrderCreate) -> ClientResult<SaleOrder> {
        let response = self.post::<SaleOrder, _>("/api/orders", payload).await?;
        Self::expect_data(response, "order")
    }

    // ========== Report API ==========

    /// Paginated day report history
    pub async fn list_reports(
        &self,
        page: Option<i64>,
        limit: Option<i64>,
    ) -> ClientResult<(Vec<DayReport>, Option<PageMeta>)> {
        let mut params = Vec::new();
        if let Some(page) = page {
            params.push(format!("page={page}"));
        }
        if let Some(limit) = limit {
            params.push(format!("limit={limit}"));
        }
        let path = if params.is_empty() {
            "/api/reports".to_string()
        } else {
            format!("/api/reports?{}", params.join("&"))
        };

        let response = self.get::<Vec<DayReport>>(&path).await?;
        let meta = response.meta.clone();
        Ok((Self::expect_data(response, "reports")?, meta))
    }

    /// Fetch a single day report
    pub async fn get_report(&self, id: i64) -> ClientResult<DayReport> {
        let response = self.get::<DayReport>(&format!("/api/reports/{id}")).await?;
        Self::expect_data(response, "report")
    }

    /// Recomputed day-wise / shift-wise summary for a date
    pub async fn day_summary(&self, date: Option<&str>) -> ClientResult<DaySummary> {
        let path = match date {
            Some(date) => format!("/api/reports/summary?date={date}"),
            None => "/api/reports/summary".to_string(),
        };
        let response = self.get::<DaySummary>(&path).await?;
        Self::expect_data(response, "summary")
    }

    /// Download one day's report as csv, excel or pdf bytes
    pub async fn download_report_by_date(&self, date: &str, format: &str) -> ClientResult<Vec<u8>> {
        self.get_bytes(&format!("/api/reports/download?format={format}&date={date}"))
            .await
    }

    /// Download all reports in an inclusive date range as one artifact
    pub async fn download_reports_range(
        &self,
        start_date: &str,
        end_date: &str,
        format: &str,
    ) -> ClientResult<Vec<u8>> {
        self.get_bytes(&format!(
            "/api/reports/download?format={format}&start_date={start_date}&end_date={end_date}"
        ))
        .await
    }

    /// Download specific reports by ID as one artifact
    pub async fn download_reports_by_ids(
        &self,
        ids: &[i64],
        format: &str,
    ) -> ClientResult<Vec<u8>> {
        let ids = ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        self.get_bytes(&format!(
            "/api/reports/download?format={format}&report_ids={ids}"
        ))
        .await
    }

    /// Receipt-style text rendering of a report
    pub async fn report_receipt(&self, id: i64) -> ClientResult<String> {
        let bytes = self.get_bytes(&format!("/api/reports/{id}/receipt")).await?;
        String::from_utf8(bytes)
            .map_err(|e| ClientError::InvalidResponse(format!("Receipt is not UTF-8: {e}")))
    }

    /// Delete a filed report by ID
    pub async fn delete_report(&self, id: i64) -> ClientResult<()> {
        self.delete::<()>(&format!("/api/reports/{id}")).await?;
        Ok(())
    }

    /// Delete a filed report by business date
    pub async fn delete_report_by_date(&self, date: &str) -> ClientResult<()> {
        self.delete::<()>(&format!("/api/reports/date/{date}"))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_without_double_slash() {
        let config = ClientConfig::new("http://localhost:3000/", "op-1", "main");
        let client = HttpClient::new(config).unwrap();
        assert_eq!(client.url("/api/shifts"), "http://localhost:3000/api/shifts");
        assert_eq!(client.url("api/shifts"), "http://localhost:3000/api/shifts");
    }

    #[test]
    fn error_mapping_prefers_envelope_message() {
        let body = r#"{"code":"E0004","message":"A shift is already open","data":null}"#;
        let err = HttpClient::map_error(StatusCode::CONFLICT, body.to_string());
        match err {
            ClientError::Conflict(msg) => assert_eq!(msg, "A shift is already open"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn error_mapping_falls_back_to_raw_body() {
        let err = HttpClient::map_error(StatusCode::BAD_REQUEST, "nope".to_string());
        match err {
            ClientError::Validation(msg) => assert_eq!(msg, "nope"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
