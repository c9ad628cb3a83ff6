/// Error types for Persona Service
///
/// Every handler returns `Result<T>`; failures render as the JSON envelope
/// `{ success: false, statusCode, message }`. Outside production a `detail`
/// field carries the source error chain.
use crate::db::StoreError;
use crate::media::MediaError;
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde::Serialize;
use std::error::Error as StdError;
use std::sync::atomic::{AtomicBool, Ordering};

static EXPOSE_DETAIL: AtomicBool = AtomicBool::new(true);

/// Toggle the `detail` field of error bodies; `main` turns it off in production
pub fn set_expose_detail(expose: bool) {
    EXPOSE_DETAIL.store(expose, Ordering::Relaxed);
}

/// Result type for persona-service operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Request failed a field-level validation rule
    #[error("{0}")]
    ValidationError(String),

    /// Request is well-formed but violates a business rule
    #[error("{0}")]
    BadRequest(String),

    /// Missing credentials, bad credentials or ownership mismatch
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    /// Media host rejected or failed an upload/destroy
    #[error("{message}")]
    Media {
        message: String,
        #[source]
        source: MediaError,
    },

    /// Store operation failed
    #[error("Server Error")]
    DatabaseError(#[source] StoreError),

    #[error("{0}")]
    Internal(String),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    success: bool,
    status_code: u16,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

impl AppError {
    pub fn media(message: impl Into<String>, source: MediaError) -> Self {
        AppError::Media {
            message: message.into(),
            source,
        }
    }

    /// Source chain rendered as `outer: inner: ...`, if any
    fn detail(&self) -> Option<String> {
        let mut source = self.source();
        let mut parts = Vec::new();
        while let Some(err) = source {
            parts.push(err.to_string());
            source = err.source();
        }
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(": "))
        }
    }

    fn body(&self, expose_detail: bool) -> ErrorBody {
        let status = self.status_code();
        ErrorBody {
            success: false,
            status_code: status.as_u16(),
            message: self.to_string(),
            detail: if expose_detail { self.detail() } else { None },
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Media { .. } | AppError::DatabaseError(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, detail = ?self.detail(), "request failed");
        }

        HttpResponse::build(status).json(self.body(EXPOSE_DETAIL.load(Ordering::Relaxed)))
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(field) => AppError::BadRequest(duplicate_message(field)),
            other => AppError::DatabaseError(other),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<(String, String)> = errors
            .field_errors()
            .into_iter()
            .filter_map(|(field, errs)| {
                errs.first().map(|e| {
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value for {}", field));
                    (field.to_string(), message)
                })
            })
            .collect();
        fields.sort();

        match fields.into_iter().next() {
            Some((_, message)) => AppError::ValidationError(message),
            None => AppError::ValidationError("Invalid request".to_string()),
        }
    }
}

fn duplicate_message(field: &str) -> String {
    match field {
        "email" => "Email already registered".to_string(),
        "username" => "Username already taken".to_string(),
        other => format!("Duplicate value for {}", other),
    }
}
