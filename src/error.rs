use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use std::fmt;

use crate::core::classifier::{AnalysisError, MIN_RUNNERS};
use crate::core::stake::StakeError;
use crate::history::HistoryError;
use crate::models::ErrorResponse;

/// Application error types
#[derive(Debug)]
pub enum AppError {
    /// Invalid request data
    ValidationError(String),
    /// Unknown bet id
    NotFound(String),
    /// Request conflicts with stored state
    Conflict(String),
    /// Internal server error
    InternalError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let (error_code, message) = match self {
            AppError::ValidationError(msg) => ("validation_error", msg.clone()),
            AppError::NotFound(msg) => ("not_found", msg.clone()),
            AppError::Conflict(msg) => ("conflict", msg.clone()),
            AppError::InternalError(msg) => ("internal_error", msg.clone()),
        };

        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: error_code.to_string(),
            message,
        })
    }
}

impl From<AnalysisError> for AppError {
    fn from(e: AnalysisError) -> Self {
        AppError::ValidationError(e.to_string())
    }
}

impl From<StakeError> for AppError {
    fn from(e: StakeError) -> Self {
        AppError::ValidationError(e.to_string())
    }
}

impl From<HistoryError> for AppError {
    fn from(e: HistoryError) -> Self {
        match e {
            HistoryError::NotFound(_) => AppError::NotFound(e.to_string()),
            HistoryError::AlreadySettled(_) => AppError::Conflict(e.to_string()),
            HistoryError::InvalidResult(_)
            | HistoryError::EmptyBreakdown
            | HistoryError::MissingDividend { .. } => {
                AppError::ValidationError(e.to_string())
            }
            HistoryError::Io(_) | HistoryError::Json(_) => AppError::InternalError(e.to_string()),
        }
    }
}

/// Validation functions
pub fn validate_runner_count(count: usize) -> Result<(), AppError> {
    if count < MIN_RUNNERS {
        return Err(AppError::ValidationError(format!(
            "At least {} runner entries required, got {}",
            MIN_RUNNERS, count
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::combinations::BetType;

    #[test]
    fn test_validate_runner_count() {
        assert!(validate_runner_count(MIN_RUNNERS).is_ok());
        assert!(validate_runner_count(12).is_ok());
        assert!(validate_runner_count(1).is_err());
        assert!(validate_runner_count(0).is_err());
    }

    #[test]
    fn test_error_display() {
        let err = AppError::ValidationError("test error".to_string());
        assert!(err.to_string().contains("Validation error"));
    }

    #[test]
    fn test_domain_errors_map_to_status() {
        let err: AppError = AnalysisError::TooFewRunners(1).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err: AppError = StakeError::UnknownStrategy("budget_99".into()).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("budget_99"));

        let err: AppError = HistoryError::NotFound(4).into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let err: AppError = HistoryError::EmptyBreakdown.into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err: AppError = HistoryError::AlreadySettled(4).into();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);

        let err: AppError = HistoryError::MissingDividend {
            id: 4,
            bet_type: BetType::Trifecta,
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        assert_eq!(
            AppError::InternalError("".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
