use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use quotedex_core::error::CoreError;
use quotedex_search::SearchError;
use serde_json::json;

/// Failures of the two public auth endpoints.
///
/// All of them answer 403; the code tells the client which one happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthFailure {
    #[error("user does not exist")]
    UserNotFound,
    #[error("bad credentials")]
    BadCredentials,
    #[error("username already taken")]
    UsernameTaken,
}

impl AuthFailure {
    pub fn code(self) -> &'static str {
        match self {
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::BadCredentials => "BAD_CREDENTIALS",
            Self::UsernameTaken => "USERNAME_TAKEN",
        }
    }
}

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce `{error, code}` JSON bodies.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `quotedex_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    #[error(transparent)]
    Auth(#[from] AuthFailure),

    /// Malformed path, query or body.
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn not_found(entity: &'static str, id: quotedex_core::types::DbId) -> Self {
        Self::Core(CoreError::NotFound { entity, id })
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Core(CoreError::Unauthorized(msg.into()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => match core {
                CoreError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND", core.to_string()),
                CoreError::DanglingReference { .. } => (
                    StatusCode::BAD_REQUEST,
                    "DANGLING_REFERENCE",
                    core.to_string(),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
            },

            AppError::Database(err) => classify_sqlx_error(err),

            AppError::Search(err) => {
                tracing::error!(error = %err, "Search error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "SEARCH_ERROR",
                    "The search service is unavailable".to_string(),
                )
            }

            AppError::Auth(failure) => (StatusCode::FORBIDDEN, failure.code(), failure.to_string()),

            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),

            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

/// Whether `err` is a unique violation of the named constraint.
pub fn is_unique_violation(err: &sqlx::Error, constraint: &str) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.code().as_deref() == Some("23505") && db_err.constraint() == Some(constraint)
        }
        _ => false,
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`) map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if constraint.starts_with("uq_") {
                    return (
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        format!("Duplicate value violates unique constraint: {constraint}"),
                    );
                }
            }
            tracing::error!(error = %db_err, "Database error");
            internal()
        }
        other => {
            tracing::error!(error = %other, "Database error");
            internal()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn core_errors_map_to_http_statuses() {
        assert_eq!(status_of(AppError::not_found("Quote", 1)), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(CoreError::validation("bad").into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(
                CoreError::DanglingReference {
                    entity: "Source",
                    id: 9
                }
                .into()
            ),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_of(AppError::unauthorized("no")), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn core_errors_are_client_errors() {
        let all = [
            CoreError::NotFound {
                entity: "Quote",
                id: 1,
            },
            CoreError::DanglingReference {
                entity: "Character",
                id: 2,
            },
            CoreError::validation("bad"),
            CoreError::Unauthorized("no".into()),
        ];
        for err in all {
            let status = status_of(err.into());
            assert!(status.is_client_error(), "got {status}");
        }
    }

    #[test]
    fn auth_failures_are_forbidden_with_distinct_codes() {
        for failure in [
            AuthFailure::UserNotFound,
            AuthFailure::BadCredentials,
            AuthFailure::UsernameTaken,
        ] {
            assert_eq!(status_of(failure.into()), StatusCode::FORBIDDEN);
        }
        assert_ne!(
            AuthFailure::UserNotFound.code(),
            AuthFailure::BadCredentials.code()
        );
    }

    #[test]
    fn row_not_found_is_404() {
        assert_eq!(
            status_of(AppError::Database(sqlx::Error::RowNotFound)),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn search_timeouts_are_sanitized_500s() {
        let err = AppError::Search(SearchError::Timeout { elapsed_ms: 2000 });
        assert_eq!(status_of(err), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn non_database_errors_are_not_unique_violations() {
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound, "uq_users_username"));
    }
}
