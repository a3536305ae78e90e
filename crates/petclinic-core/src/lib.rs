//! # petclinic-core — Domain Types for the Owners Service
//!
//! Defines the owner record, the form that creates or edits it, the
//! validation rules that guard persistence, and the message catalog used
//! to render validation feedback.
//!
//! ## Key Design Principles
//!
//! 1. **Validated writes only.** The repository accepts [`OwnerFields`], which
//!    can only be obtained from [`OwnerForm::validate`]. An unvalidated form
//!    cannot reach storage.
//!
//! 2. **Violations, not strings.** Validation produces [`Violation`] values;
//!    turning them into text is a separate, locale-aware step
//!    ([`messages::render`](crate::messages::render)).
//!
//! ## Crate Policy
//!
//! - No I/O, no async, no web framework types.
//! - No `.unwrap()` outside tests.

pub mod messages;
pub mod owner;
pub mod validation;

pub use messages::{Locale, Message};
pub use owner::{Owner, OwnerFields, OwnerForm, OwnerId};
pub use validation::{FieldError, ValidationErrors, Violation};
