//! # Route Modules
//!
//! - `owners` — owner creation, search, edit, and detail pages.

pub mod owners;
