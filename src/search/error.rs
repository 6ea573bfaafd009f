//! Query pipeline errors / 查询错误
//!
//! Only `public_message` may reach an untrusted caller; the engine cause stays in
//! the source chain for logging.

use axum::http::StatusCode;
use thiserror::Error;

/// Message returned when a cursor is combined with permission filtering.
pub const PAGINATION_NOT_SUPPORTED: &str = "Pagination of search results is not supported.";

/// Generic message returned for engine failures.
pub const QUERY_FAILED: &str = "There was a problem performing the search query.";

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Page cursor requested while results are filtered per identity.
    #[error("{}", PAGINATION_NOT_SUPPORTED)]
    InvalidPaginationRequest,

    /// The search engine call failed.
    #[error("{} {source}", QUERY_FAILED)]
    EngineQueryFailed {
        #[source]
        source: anyhow::Error,
    },
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::InvalidPaginationRequest => StatusCode::BAD_REQUEST,
            ServiceError::EngineQueryFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Caller-safe message / 可返回给调用方的信息
    pub fn public_message(&self) -> &'static str {
        match self {
            ServiceError::InvalidPaginationRequest => PAGINATION_NOT_SUPPORTED,
            ServiceError::EngineQueryFailed { .. } => QUERY_FAILED,
        }
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ServiceError::InvalidPaginationRequest.status_code(),
            StatusCode::BAD_REQUEST
        );
        let err = ServiceError::EngineQueryFailed {
            source: anyhow::anyhow!("index unavailable"),
        };
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_engine_failure_hides_cause_publicly() {
        let err = ServiceError::EngineQueryFailed {
            source: anyhow::anyhow!("connection refused to 10.0.0.3:9200"),
        };

        assert_eq!(err.public_message(), QUERY_FAILED);
        assert!(!err.public_message().contains("10.0.0.3"));
        // cause is kept for diagnostics
        assert!(err.to_string().contains("connection refused"));
        assert!(err.source().is_some());
    }
}
