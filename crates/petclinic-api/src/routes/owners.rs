//! # Owner Pages
//!
//! Server-rendered create, search, edit, and detail pages for clinic owners.
//!
//! Validation failures are not errors: the form is re-rendered with a 200,
//! the submitted values kept, and each failing field annotated. Successful
//! writes answer with a redirect to the owner's detail page.

use axum::extract::rejection::{FormRejection, PathRejection, QueryRejection};
use axum::extract::{Form, Path, Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::Router;
use petclinic_core::{OwnerForm, OwnerId};
use serde::Deserialize;

use crate::error::AppError;
use crate::extractors::{extract_form, extract_path, extract_query, RequestLocale};
use crate::state::AppState;

/// Query string of the owner search.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FindOwnersQuery {
    pub last_name: String,
}

/// Build the owner router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/owners", get(process_find_form))
        .route(
            "/owners/new",
            get(init_creation_form).post(process_creation_form),
        )
        .route("/owners/find", get(init_find_form))
        .route("/owners/:owner_id", get(show_owner))
        .route(
            "/owners/:owner_id/edit",
            get(init_update_form).post(process_update_form),
        )
}

fn owner_location(id: OwnerId) -> String {
    format!("/owners/{id}")
}

/// GET /owners/new — empty creation form.
async fn init_creation_form(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
) -> Result<Response, AppError> {
    let page = state
        .views
        .owner_form(&OwnerForm::default(), None, true, locale)?;
    Ok(page.into_response())
}

/// POST /owners/new — validate and store a new owner.
async fn process_creation_form(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    body: Result<Form<OwnerForm>, FormRejection>,
) -> Result<Response, AppError> {
    let form = extract_form(body)?;

    let fields = match form.validate() {
        Ok(fields) => fields,
        Err(errors) => {
            tracing::debug!(invalid = errors.len(), "owner creation form rejected");
            let page = state.views.owner_form(&form, Some(&errors), true, locale)?;
            return Ok(page.into_response());
        }
    };

    let owner = state.owners.create(fields).await?;
    tracing::info!(owner_id = %owner.id, "owner created");
    Ok(Redirect::to(&owner_location(owner.id)).into_response())
}

/// GET /owners/find — empty search form.
async fn init_find_form(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
) -> Result<Response, AppError> {
    let page = state.views.find_form("", false, locale)?;
    Ok(page.into_response())
}

/// GET /owners?lastName= — search by last-name prefix.
///
/// No match re-renders the search form with a field error, a single match
/// redirects to that owner, several matches render the list.
async fn process_find_form(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    query: Result<Query<FindOwnersQuery>, QueryRejection>,
) -> Result<Response, AppError> {
    let FindOwnersQuery { last_name } = extract_query(query)?;
    let mut results = state.owners.find_by_last_name(&last_name);

    match results.len() {
        0 => {
            let page = state.views.find_form(&last_name, true, locale)?;
            Ok(page.into_response())
        }
        1 => {
            let owner = results.remove(0);
            Ok(Redirect::to(&owner_location(owner.id)).into_response())
        }
        _ => {
            let page = state.views.owners_list(&results, locale)?;
            Ok(page.into_response())
        }
    }
}

/// GET /owners/:owner_id/edit — form pre-filled with the stored owner.
async fn init_update_form(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    path: Result<Path<OwnerId>, PathRejection>,
) -> Result<Response, AppError> {
    let id = extract_path(path)?;
    let owner = state
        .owners
        .find_by_id(id)
        .ok_or_else(|| owner_not_found(id))?;

    let page = state
        .views
        .owner_form(&owner.to_form(), None, false, locale)?;
    Ok(page.into_response())
}

/// POST /owners/:owner_id/edit — validate and replace the stored owner.
async fn process_update_form(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    path: Result<Path<OwnerId>, PathRejection>,
    body: Result<Form<OwnerForm>, FormRejection>,
) -> Result<Response, AppError> {
    let id = extract_path(path)?;
    if state.owners.find_by_id(id).is_none() {
        return Err(owner_not_found(id));
    }
    let form = extract_form(body)?;

    let fields = match form.validate() {
        Ok(fields) => fields,
        Err(errors) => {
            tracing::debug!(owner_id = %id, invalid = errors.len(), "owner update form rejected");
            let page = state.views.owner_form(&form, Some(&errors), false, locale)?;
            return Ok(page.into_response());
        }
    };

    let owner = state
        .owners
        .update(id, fields)
        .await?
        .ok_or_else(|| owner_not_found(id))?;
    tracing::info!(owner_id = %owner.id, "owner updated");
    Ok(Redirect::to(&owner_location(owner.id)).into_response())
}

/// GET /owners/:owner_id — owner detail page.
async fn show_owner(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    path: Result<Path<OwnerId>, PathRejection>,
) -> Result<Response, AppError> {
    let id = extract_path(path)?;
    let owner = state
        .owners
        .find_by_id(id)
        .ok_or_else(|| owner_not_found(id))?;

    let page = state.views.owner_details(&owner, locale)?;
    Ok(page.into_response())
}

fn owner_not_found(id: OwnerId) -> AppError {
    AppError::NotFound(format!("owner {id} does not exist"))
}
