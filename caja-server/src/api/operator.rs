//! Operator identity extractor
//!
//! Identity is trusted from upstream headers; authentication happens at
//! the gateway in front of this service. `X-Operator-Id` and `X-Branch-Id`
//! are required, `X-Operator-Name` falls back to the operator ID.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::utils::AppError;

pub const OPERATOR_ID_HEADER: &str = "x-operator-id";
pub const OPERATOR_NAME_HEADER: &str = "x-operator-name";
pub const BRANCH_ID_HEADER: &str = "x-branch-id";

/// The calling operator, as asserted by the gateway
#[derive(Debug, Clone)]
pub struct Operator {
    pub id: String,
    pub name: String,
    pub branch_id: String,
}

impl<S> FromRequestParts<S> for Operator
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = header_value(parts, OPERATOR_ID_HEADER)?
            .ok_or_else(|| AppError::invalid("Missing X-Operator-Id header"))?;
        let branch_id = header_value(parts, BRANCH_ID_HEADER)?
            .ok_or_else(|| AppError::invalid("Missing X-Branch-Id header"))?;
        let name = header_value(parts, OPERATOR_NAME_HEADER)?.unwrap_or_else(|| id.clone());

        Ok(Operator {
            id,
            name,
            branch_id,
        })
    }
}

fn header_value(parts: &Parts, name: &str) -> Result<Option<String>, AppError> {
    match parts.headers.get(name) {
        None => Ok(None),
        Some(value) => {
            let s = value
                .to_str()
                .map_err(|_| AppError::invalid(format!("Header {name} is not valid UTF-8")))?
                .trim();
            if s.is_empty() {
                Ok(None)
            } else {
                Ok(Some(s.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(req: Request<()>) -> Result<Operator, AppError> {
        let (mut parts, _) = req.into_parts();
        Operator::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn full_headers_are_read() {
        let req = Request::builder()
            .header("X-Operator-Id", "op-1")
            .header("X-Operator-Name", "Ana")
            .header("X-Branch-Id", "main")
            .body(())
            .unwrap();
        let op = extract(req).await.unwrap();
        assert_eq!(op.id, "op-1");
        assert_eq!(op.name, "Ana");
        assert_eq!(op.branch_id, "main");
    }

    #[tokio::test]
    async fn name_defaults_to_id() {
        let req = Request::builder()
            .header("X-Operator-Id", "op-1")
            .header("X-Branch-Id", "main")
            .body(())
            .unwrap();
        let op = extract(req).await.unwrap();
        assert_eq!(op.name, "op-1");
    }

    #[tokio::test]
    async fn missing_branch_is_rejected() {
        let req = Request::builder()
            .header("X-Operator-Id", "op-1")
            .body(())
            .unwrap();
        let err = extract(req).await.unwrap_err();
        assert!(matches!(err, AppError::Invalid(_)));
    }
}
