//! # Views
//!
//! Server-side rendering with Tera. Templates are embedded at compile time
//! so the binary is self-contained. Every template name ends in `.html`,
//! which keeps Tera's autoescaping on for all of them.

use std::sync::Arc;

use axum::response::Html;
use petclinic_core::messages::{self, Message};
use petclinic_core::{Locale, Owner, OwnerForm, ValidationErrors};
use serde::Serialize;
use tera::{Context, Tera};

use crate::error::AppError;

const TPL_BASE: &str = include_str!("templates/base.html");
const TPL_OWNER_FORM: &str = include_str!("templates/owners/create_or_update_owner_form.html");
const TPL_FIND_OWNERS: &str = include_str!("templates/owners/find_owners.html");
const TPL_OWNERS_LIST: &str = include_str!("templates/owners/owners_list.html");
const TPL_OWNER_DETAILS: &str = include_str!("templates/owners/owner_details.html");

/// One labelled text input with its validation messages.
#[derive(Debug, Serialize)]
struct FormField<'a> {
    label: &'static str,
    name: &'static str,
    value: &'a str,
    errors: Vec<String>,
}

fn label_for(field: &str) -> &'static str {
    match field {
        "firstName" => "First Name",
        "lastName" => "Last Name",
        "address" => "Address",
        "city" => "City",
        "telephone" => "Telephone",
        _ => "",
    }
}

fn messages_for(errors: Option<&ValidationErrors>, field: &str, locale: Locale) -> Vec<String> {
    errors
        .map(|e| {
            e.for_field(field)
                .map(|v| messages::render(locale, Message::Violation(v)))
                .collect()
        })
        .unwrap_or_default()
}

/// Compiled template set.
#[derive(Debug, Clone)]
pub struct Views {
    templates: Arc<Tera>,
}

impl Views {
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            ("base.html", TPL_BASE),
            ("owners/create_or_update_owner_form.html", TPL_OWNER_FORM),
            ("owners/find_owners.html", TPL_FIND_OWNERS),
            ("owners/owners_list.html", TPL_OWNERS_LIST),
            ("owners/owner_details.html", TPL_OWNER_DETAILS),
        ])?;

        Ok(Self {
            templates: Arc::new(tera),
        })
    }

    fn render(&self, name: &str, locale: Locale, mut context: Context) -> Result<Html<String>, AppError> {
        context.insert("lang", locale.as_str());
        let html = self.templates.render(name, &context)?;
        Ok(Html(html))
    }

    /// Create or edit form, with inline messages when `errors` is present.
    pub fn owner_form(
        &self,
        form: &OwnerForm,
        errors: Option<&ValidationErrors>,
        is_new: bool,
        locale: Locale,
    ) -> Result<Html<String>, AppError> {
        let fields: Vec<FormField<'_>> = OwnerForm::FIELDS
            .iter()
            .map(|&name| FormField {
                label: label_for(name),
                name,
                value: form.value(name),
                errors: messages_for(errors, name, locale),
            })
            .collect();

        let mut context = Context::new();
        context.insert("fields", &fields);
        context.insert("is_new", &is_new);
        self.render("owners/create_or_update_owner_form.html", locale, context)
    }

    /// Last-name search form. `not_found` adds the search-miss message.
    pub fn find_form(
        &self,
        last_name: &str,
        not_found: bool,
        locale: Locale,
    ) -> Result<Html<String>, AppError> {
        let errors: Vec<String> = if not_found {
            vec![messages::render(locale, Message::NotFound)]
        } else {
            Vec::new()
        };

        let mut context = Context::new();
        context.insert("last_name", last_name);
        context.insert("errors", &errors);
        self.render("owners/find_owners.html", locale, context)
    }

    pub fn owners_list(&self, owners: &[Owner], locale: Locale) -> Result<Html<String>, AppError> {
        let mut context = Context::new();
        context.insert("owners", owners);
        self.render("owners/owners_list.html", locale, context)
    }

    pub fn owner_details(&self, owner: &Owner, locale: Locale) -> Result<Html<String>, AppError> {
        let mut context = Context::new();
        context.insert("owner", owner);
        self.render("owners/owner_details.html", locale, context)
    }
}
