//! HTTP error mapping

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use desk_core::Error;
use serde::Serialize;
use thiserror::Error as ThisError;
use tracing::error;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Anything a handler can fail with
#[derive(ThisError, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] Error),

    #[error("{0}")]
    NotFound(String),

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),
}

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Core(e) => match e {
                Error::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
                Error::AnalysisInProgress => StatusCode::CONFLICT,
                Error::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                Error::SessionNotFound(_) => StatusCode::NOT_FOUND,
                Error::DataFetchFailed { .. } => StatusCode::BAD_GATEWAY,
                Error::AnalysisFailed(_) | Error::Json(_) | Error::Io(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (Error::invalid("Please provide a ticker symbol"), StatusCode::UNPROCESSABLE_ENTITY),
            (Error::AnalysisInProgress, StatusCode::CONFLICT),
            (Error::Unavailable("missing".to_string()), StatusCode::SERVICE_UNAVAILABLE),
            (Error::SessionNotFound("abc".to_string()), StatusCode::NOT_FOUND),
            (Error::AnalysisFailed("boom".to_string()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, status) in cases {
            assert_eq!(ApiError::from(error).status(), status);
        }
        assert_eq!(
            ApiError::NotFound("nothing".to_string()).status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_into_response_status() {
        let response = ApiError::from(Error::AnalysisInProgress).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
