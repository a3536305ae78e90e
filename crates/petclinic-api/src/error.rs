//! # Application Error
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Every variant renders a small HTML error page with the matching status.
//! Internal error details are logged and never shown to the browser.
//!
//! Form validation failures are not errors at this level: they re-render the
//! form with a 200 and never reach this type.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use thiserror::Error;

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Request could not be parsed (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        if matches!(&self, Self::Internal(_)) {
            tracing::error!(error = %self, "internal server error");
        }

        let title = status.canonical_reason().unwrap_or("Error");
        let body = format!(
            "<!DOCTYPE html>\n<html>\n<head><title>{title}</title></head>\n<body>\n\
             <h2>Something happened...</h2>\n<p>{}</p>\n</body>\n</html>\n",
            tera::escape_html(&message)
        );

        (status, Html(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        Self::Internal(format!("database: {err}"))
    }
}

impl From<crate::repository::RepositoryError> for AppError {
    fn from(err: crate::repository::RepositoryError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<tera::Error> for AppError {
    fn from(err: tera::Error) -> Self {
        Self::Internal(format!("template: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn response_parts(err: AppError) -> (StatusCode, String) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[test]
    fn status_codes() {
        assert_eq!(AppError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::BadRequest("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::Internal("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn error_display_messages() {
        assert_eq!(
            AppError::NotFound("owner 9".into()).to_string(),
            "not found: owner 9"
        );
        assert!(AppError::BadRequest("z".into()).to_string().contains('z'));
    }

    #[tokio::test]
    async fn into_response_not_found_is_html() {
        let (status, body) = response_parts(AppError::NotFound("owner 9".into())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("<h2>Something happened...</h2>"));
        assert!(body.contains("not found: owner 9"));
    }

    #[tokio::test]
    async fn into_response_escapes_message() {
        let (_, body) = response_parts(AppError::BadRequest("<script>".into())).await;
        assert!(!body.contains("<script>"));
        assert!(body.contains("&lt;script&gt;"));
    }

    #[tokio::test]
    async fn into_response_internal_hides_details() {
        let (status, body) =
            response_parts(AppError::Internal("db connection failed".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(
            !body.contains("db connection"),
            "internal error details must not leak: {body}"
        );
        assert!(body.contains("An internal error occurred"));
    }

    #[test]
    fn repository_error_converts_to_internal() {
        let err = AppError::from(crate::repository::RepositoryError::IdsExhausted);
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[test]
    fn sqlx_error_converts_to_internal() {
        let err = AppError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, AppError::Internal(_)));
    }
}
