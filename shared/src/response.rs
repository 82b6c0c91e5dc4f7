//! API Response types
//!
//! Standardized API response structures shared by server and client.

use serde::{Deserialize, Serialize};

/// Standard API response code
pub const API_CODE_SUCCESS: &str = "E0000";

/// Pagination metadata attached to list responses
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PageMeta {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
}

impl PageMeta {
    /// Build metadata from a page/limit pair and a total row count
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        let pages = if limit > 0 {
            (total + limit - 1) / limit
        } else {
            0
        };
        Self {
            page,
            limit,
            total,
            pages,
        }
    }
}

/// Unified API response structure
///
/// All API responses follow this format:
/// ```json
/// {
///     "code": "E0000",
///     "message": "Success",
///     "data": { ... }
/// }
/// ```
///
/// `warning` carries non-blocking domain facts (cash variance at shift
/// close); `meta` carries pagination info on list endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Response code (E0000 = success, others = error codes)
    pub code: String,
    /// Human-readable message
    pub message: String,
    /// Response data (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Non-blocking warning (cash variance, etc.)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    /// Pagination metadata (list endpoints only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<PageMeta>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response
    pub fn ok(data: T) -> Self {
        Self {
            code: API_CODE_SUCCESS.to_string(),
            message: "Success".to_string(),
            data: Some(data),
            warning: None,
            meta: None,
        }
    }

    /// Create a successful response with custom message
    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            code: API_CODE_SUCCESS.to_string(),
            message: message.into(),
            data: Some(data),
            warning: None,
            meta: None,
        }
    }

    /// Create an error response
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            data: None,
            warning: None,
            meta: None,
        }
    }

    /// Attach a non-blocking warning
    pub fn with_warning(mut self, warning: Option<String>) -> Self {
        self.warning = warning;
        self
    }

    /// Attach pagination metadata
    pub fn with_meta(mut self, meta: PageMeta) -> Self {
        self.meta = Some(meta);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_meta_rounds_up() {
        let meta = PageMeta::new(1, 20, 41);
        assert_eq!(meta.pages, 3);
        assert_eq!(PageMeta::new(1, 20, 40).pages, 2);
        assert_eq!(PageMeta::new(1, 20, 0).pages, 0);
    }

    #[test]
    fn warning_is_omitted_when_absent() {
        let json = serde_json::to_string(&ApiResponse::ok(1)).unwrap();
        assert!(!json.contains("warning"));
        let json = serde_json::to_string(
            &ApiResponse::ok(1).with_warning(Some("cash variance".into())),
        )
        .unwrap();
        assert!(json.contains("warning"));
    }
}
