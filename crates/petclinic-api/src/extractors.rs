//! # Custom Extractors
//!
//! Helpers that map axum's form, query, and path rejections onto
//! [`AppError::BadRequest`], plus the [`RequestLocale`] extractor that
//! negotiates the message locale from `Accept-Language`.

use std::convert::Infallible;

use axum::extract::rejection::{FormRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequestParts, Path, Query};
use axum::http::header::ACCEPT_LANGUAGE;
use axum::http::request::Parts;
use axum::Form;
use petclinic_core::Locale;

use crate::error::AppError;
use crate::state::AppState;

/// Extract a url-encoded form body, mapping rejections to [`AppError::BadRequest`].
///
/// ```ignore
/// async fn handler(body: Result<Form<T>, FormRejection>) -> Result<..., AppError> {
///     let form = extract_form(body)?;
/// }
/// ```
pub fn extract_form<T>(result: Result<Form<T>, FormRejection>) -> Result<T, AppError> {
    result
        .map(|Form(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

/// Extract query parameters, mapping rejections to [`AppError::BadRequest`].
pub fn extract_query<T>(result: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    result
        .map(|Query(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

/// Extract path parameters, mapping rejections (e.g. a non-numeric id)
/// to [`AppError::BadRequest`].
pub fn extract_path<T>(result: Result<Path<T>, PathRejection>) -> Result<T, AppError> {
    result
        .map(|Path(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

/// The locale used to render messages for this request.
///
/// Taken from the `Accept-Language` header when it names a supported
/// language, otherwise the configured default. Never rejects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestLocale(pub Locale);

#[axum::async_trait]
impl FromRequestParts<AppState> for RequestLocale {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let locale = parts
            .headers
            .get(ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok())
            .and_then(Locale::from_accept_language)
            .unwrap_or(state.config.default_locale);
        Ok(RequestLocale(locale))
    }
}
