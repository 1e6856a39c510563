//! # Error Handling
//!
//! Every operation of the facade returns [`ApiError`]. The variants split into
//! two groups:
//!
//! - **Client-input faults** (`UnknownType`, `UnknownField`, `TypeMismatch`,
//!   `MissingOperator`, `BadRequest`): the filter tree or payload is malformed.
//!   These are raised while compiling a query, before anything reaches the store.
//! - **Store faults** (`Database`): the underlying execution failed. The source
//!   `DbErr` is kept so callers can decide whether to retry; the HTTP response
//!   only carries a generic message and the details go to `tracing`.
//!
//! `NotFound` only exists for the transport layer: `find_by_id` itself reports an
//! absent record as `Ok(None)`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::Serialize;
use std::fmt;

#[derive(Debug)]
pub enum ApiError {
    /// No type with this identifier was registered
    UnknownType { name: String },

    /// A field path segment does not exist on its entity
    UnknownField {
        /// Type the failing segment was looked up on
        entity: String,
        /// Full dotted path as written in the request
        path: String,
    },

    /// Comparison value incompatible with the operator or the field's domain
    TypeMismatch { field: String, message: String },

    /// A filter condition without a boolean operator
    MissingOperator,

    /// Any other invalid input (pagination, undecodable record)
    BadRequest { message: String },

    /// Record lookup by identifier found nothing
    NotFound { entity: String, id: i64 },

    /// Underlying store failure. Details are logged, never exposed.
    Database { internal: DbErr },
}

impl ApiError {
    pub fn unknown_type(name: impl Into<String>) -> Self {
        Self::UnknownType { name: name.into() }
    }

    pub fn unknown_field(entity: impl Into<String>, path: impl Into<String>) -> Self {
        Self::UnknownField {
            entity: entity.into(),
            path: path.into(),
        }
    }

    pub fn type_mismatch(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TypeMismatch {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn not_found(entity: impl Into<String>, id: i64) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id,
        }
    }

    pub fn database(err: DbErr) -> Self {
        Self::Database { internal: err }
    }

    /// True for faults caused by the caller's input rather than the store
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Database { .. } | Self::NotFound { .. })
    }

    pub(crate) fn status_code(&self) -> StatusCode {
        match self {
            Self::UnknownType { .. } | Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::UnknownField { .. }
            | Self::TypeMismatch { .. }
            | Self::MissingOperator
            | Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Database { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn user_message(&self) -> String {
        match self {
            Self::UnknownType { name } => format!("Unknown entity type '{name}'"),
            Self::UnknownField { entity, path } => {
                format!("Unknown field '{path}' on entity '{entity}'")
            }
            Self::TypeMismatch { field, message } => {
                format!("Invalid value for field '{field}': {message}")
            }
            Self::MissingOperator => {
                "Boolean operator for filter condition is required".to_string()
            }
            Self::BadRequest { message } => message.clone(),
            Self::NotFound { entity, id } => format!("{entity} with ID '{id}' not found"),
            Self::Database { .. } => "A database error occurred".to_string(),
        }
    }

    fn log_internal(&self) {
        match self {
            Self::Database { internal } => {
                tracing::error!(error = ?internal, "Database error occurred");
            }
            Self::NotFound { .. } => {
                tracing::debug!(error = %self.user_message(), "Record not found");
            }
            _ => {
                tracing::warn!(
                    error = %self.user_message(),
                    status = %self.status_code(),
                    "Rejected client input"
                );
            }
        }
    }
}

/// Error body sent to clients, shaped like the success/message envelope
/// returned by mutations.
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log_internal();
        let body = ErrorResponse {
            success: false,
            message: self.user_message(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Keep the store detail for programmatic callers; only the HTTP body hides it.
            Self::Database { internal } => write!(f, "store error: {internal}"),
            _ => write!(f, "{}", self.user_message()),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Database { internal } => Some(internal),
            _ => None,
        }
    }
}

impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        Self::database(err)
    }
}
