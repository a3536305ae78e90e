//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor.
//!
//! ## Architecture
//!
//! - **Owners**: the [`OwnerRepository`], authoritative for reads, with
//!   optional Postgres write-through.
//! - **Views**: compiled Tera templates.
//! - **Metrics**: the Prometheus registry scraped at `/metrics`.
//! - **Configuration**: environment-derived [`AppConfig`].

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use petclinic_core::messages::UnknownLocale;
use petclinic_core::Locale;
use sqlx::PgPool;
use thiserror::Error;

use crate::middleware::metrics::ApiMetrics;
use crate::repository::OwnerRepository;
use crate::views::Views;

// -- Generic In-Memory Store --------------------------------------------------

/// Thread-safe, cloneable in-memory ordered map.
///
/// The lock is `parking_lot` and is never held across `.await` points.
/// Iteration follows key order, so listings are stable.
#[derive(Debug)]
pub struct Store<K: Ord + Copy, T: Clone> {
    data: Arc<RwLock<BTreeMap<K, T>>>,
}

impl<K: Ord + Copy, T: Clone> Clone for Store<K, T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}

impl<K: Ord + Copy, T: Clone> Store<K, T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    /// Insert a record, returning the previous value if the key existed.
    pub fn insert(&self, id: K, value: T) -> Option<T> {
        self.data.write().insert(id, value)
    }

    /// Retrieve a record by key.
    pub fn get(&self, id: &K) -> Option<T> {
        self.data.read().get(id).cloned()
    }

    /// Records matching `predicate`, in key order.
    pub fn filter(&self, predicate: impl Fn(&T) -> bool) -> Vec<T> {
        self.data
            .read()
            .values()
            .filter(|v| predicate(*v))
            .cloned()
            .collect()
    }

    /// Replace an existing record. Returns `false` (and stores nothing) if
    /// the key is absent.
    pub fn replace(&self, id: &K, value: T) -> bool {
        match self.data.write().get_mut(id) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Check if a record exists.
    pub fn contains(&self, id: &K) -> bool {
        self.data.read().contains_key(id)
    }

    /// Return the number of records.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K: Ord + Copy, T: Clone> Default for Store<K, T> {
    fn default() -> Self {
        Self::new()
    }
}

// -- Configuration ------------------------------------------------------------

/// Error assembling the application at startup.
#[derive(Error, Debug)]
pub enum StartupError {
    /// `PORT` is set but is not a valid port number.
    #[error("PORT must be a port number, got {0:?}")]
    InvalidPort(String),

    /// `PETCLINIC_LOCALE` names an unsupported language.
    #[error("PETCLINIC_LOCALE: {0}")]
    Locale(#[from] UnknownLocale),

    /// An embedded template failed to compile.
    #[error("template compilation failed: {0}")]
    Templates(#[from] tera::Error),

    /// The metrics registry rejected a collector.
    #[error("metrics registration failed: {0}")]
    Metrics(#[from] prometheus::Error),

    /// Loading persisted owners failed.
    #[error("database hydration failed: {0}")]
    Hydration(#[from] sqlx::Error),
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Language used when `Accept-Language` names nothing supported.
    pub default_locale: Locale,
    /// Whether request metrics are recorded and `/metrics` is mounted.
    pub metrics_enabled: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            default_locale: Locale::En,
            metrics_enabled: true,
        }
    }
}

impl AppConfig {
    /// Build configuration from `PORT`, `PETCLINIC_LOCALE` and
    /// `PETCLINIC_METRICS_ENABLED`. Absent variables keep their defaults.
    pub fn from_env() -> Result<Self, StartupError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, StartupError> {
        let mut config = Self::default();

        if let Some(port) = lookup("PORT") {
            config.port = port
                .trim()
                .parse()
                .map_err(|_| StartupError::InvalidPort(port))?;
        }
        if let Some(locale) = lookup("PETCLINIC_LOCALE") {
            config.default_locale = locale.parse()?;
        }
        if let Some(enabled) = lookup("PETCLINIC_METRICS_ENABLED") {
            config.metrics_enabled = enabled.to_lowercase() != "false";
        }

        Ok(config)
    }
}

// -- Application State --------------------------------------------------------

/// Shared application state accessible to all route handlers.
///
/// Clone-friendly: every field is reference-counted internally.
#[derive(Debug, Clone)]
pub struct AppState {
    pub owners: OwnerRepository,
    pub views: Views,
    pub metrics: ApiMetrics,

    /// PostgreSQL connection pool. `None` means in-memory-only mode.
    pub db_pool: Option<PgPool>,

    pub config: AppConfig,
}

impl AppState {
    /// Default configuration, in-memory only.
    pub fn new() -> Result<Self, StartupError> {
        Self::with_config(AppConfig::default(), None)
    }

    /// Assemble state from explicit configuration and an optional pool.
    pub fn with_config(config: AppConfig, db_pool: Option<PgPool>) -> Result<Self, StartupError> {
        Ok(Self {
            owners: OwnerRepository::new(db_pool.clone()),
            views: Views::new()?,
            metrics: ApiMetrics::new()?,
            db_pool,
            config,
        })
    }

    /// Load persisted owners into the in-memory repository.
    ///
    /// No-op in in-memory-only mode.
    pub async fn hydrate_from_db(&self) -> Result<(), StartupError> {
        let count = self.owners.hydrate().await?;
        if self.db_pool.is_some() {
            tracing::info!(owners = count, "Hydrated in-memory store from database");
        }
        Ok(())
    }
}
