use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Why a submission was rejected before touching storage.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("missing required field")]
    MissingField { field: &'static str },

    #[error("invalid phone length")]
    InvalidPhoneLength,

    #[error("invalid phone prefix")]
    InvalidPhonePrefix,

    #[error("invalid date format")]
    InvalidDateFormat,

    #[error("date in the past")]
    DateInPast,

    #[error("invalid time format")]
    InvalidTimeFormat,

    #[error("invalid guest count")]
    InvalidGuestCount,

    #[error("invalid status")]
    InvalidStatus,

    #[error("missing phone")]
    MissingPhone,
}

/// A write that would break the phone/date or phone/name invariants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConflictError {
    #[error("date already booked for this phone")]
    DateAlreadyBooked,

    #[error("phone registered under different name")]
    PhoneNameMismatch,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Conflict(#[from] ConflictError),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("unauthorized")]
    Unauthorized,

    #[error("configuration error: {0}")]
    Config(String),
}

impl AppError {
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation",
            AppError::Conflict(_) => "conflict",
            AppError::NotFound(_) => "not_found",
            AppError::Database(_) => "storage",
            AppError::Unauthorized => "unauthorized",
            AppError::Config(_) => "config",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn booking_not_found(id: i64) -> Self {
        AppError::NotFound(format!("booking {id}"))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, kind = self.kind(), "request failed");
        }

        let body = serde_json::json!({ "error": self.to_string(), "kind": self.kind() });
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_map_to_http_status() {
        let cases = [
            (AppError::from(ValidationError::InvalidPhoneLength), StatusCode::BAD_REQUEST, "validation"),
            (AppError::from(ConflictError::DateAlreadyBooked), StatusCode::CONFLICT, "conflict"),
            (AppError::booking_not_found(999), StatusCode::NOT_FOUND, "not_found"),
            (AppError::Unauthorized, StatusCode::UNAUTHORIZED, "unauthorized"),
        ];
        for (err, status, kind) in cases {
            assert_eq!(err.status_code(), status);
            assert_eq!(err.kind(), kind);
        }
    }

    #[test]
    fn test_reason_strings() {
        assert_eq!(
            AppError::from(ValidationError::MissingField { field: "name" }).to_string(),
            "missing required field"
        );
        assert_eq!(
            AppError::from(ConflictError::PhoneNameMismatch).to_string(),
            "phone registered under different name"
        );
        assert_eq!(AppError::booking_not_found(7).to_string(), "not found: booking 7");
    }
}
