//! # Owner Repository
//!
//! The persistence collaborator behind the owner routes. Reads are served
//! from the in-memory [`Store`]. When a Postgres pool is configured, writes
//! go to the `owners` table first and the database assigns identifiers;
//! otherwise identifiers come from an in-process sequence starting at 1.
//!
//! The sequence is held as an `i64` so advancing past `i32::MAX` cannot
//! overflow; handing out an id beyond the `i32` range is an error.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use petclinic_core::{Owner, OwnerFields, OwnerId};
use sqlx::PgPool;
use thiserror::Error;

use crate::db;
use crate::state::Store;

/// Failure to persist an owner.
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("database: {0}")]
    Database(#[from] sqlx::Error),

    /// Every id in the `i32` range has been handed out.
    #[error("owner id sequence exhausted")]
    IdsExhausted,
}

#[derive(Debug, Clone)]
pub struct OwnerRepository {
    store: Store<OwnerId, Owner>,
    next_id: Arc<AtomicI64>,
    db_pool: Option<PgPool>,
}

impl OwnerRepository {
    pub fn new(db_pool: Option<PgPool>) -> Self {
        Self {
            store: Store::new(),
            next_id: Arc::new(AtomicI64::new(1)),
            db_pool,
        }
    }

    pub fn find_by_id(&self, id: OwnerId) -> Option<Owner> {
        self.store.get(&id)
    }

    /// Owners whose last name starts with `prefix` (case-sensitive), ordered
    /// by id. An empty prefix matches every owner.
    pub fn find_by_last_name(&self, prefix: &str) -> Vec<Owner> {
        self.store.filter(|o| o.last_name.starts_with(prefix))
    }

    /// Persist a new owner and return it with its assigned id.
    pub async fn create(&self, fields: OwnerFields) -> Result<Owner, RepositoryError> {
        let id = match &self.db_pool {
            Some(pool) => {
                let id = db::owners::insert(pool, &fields).await?;
                self.advance_past(id);
                id
            }
            None => self.allocate_id()?,
        };

        let owner = fields.into_owner(id);
        self.store.insert(id, owner.clone());
        Ok(owner)
    }

    /// Overwrite the descriptive fields of an existing owner.
    ///
    /// Returns `Ok(None)` when no owner has `id`, in memory or (when a pool
    /// is configured) in the database. Memory is then left untouched.
    pub async fn update(
        &self,
        id: OwnerId,
        fields: OwnerFields,
    ) -> Result<Option<Owner>, sqlx::Error> {
        if !self.store.contains(&id) {
            return Ok(None);
        }

        if let Some(pool) = &self.db_pool {
            if !db::owners::update(pool, id, &fields).await? {
                tracing::warn!(
                    owner_id = %id,
                    "owner present in memory but missing from database, update rejected"
                );
                return Ok(None);
            }
        }

        let owner = fields.into_owner(id);
        if !self.store.replace(&id, owner.clone()) {
            return Ok(None);
        }
        Ok(Some(owner))
    }

    pub fn count(&self) -> usize {
        self.store.len()
    }

    /// Load every persisted owner into memory and advance the id sequence
    /// past the highest loaded id. Returns the number of owners loaded.
    pub async fn hydrate(&self) -> Result<usize, sqlx::Error> {
        let Some(pool) = &self.db_pool else {
            return Ok(0);
        };

        let owners = db::owners::load_all(pool).await?;
        let count = owners.len();
        for owner in owners {
            self.advance_past(owner.id);
            self.store.insert(owner.id, owner);
        }
        Ok(count)
    }

    fn allocate_id(&self) -> Result<OwnerId, RepositoryError> {
        let next = self.next_id.fetch_add(1, Ordering::Relaxed);
        i32::try_from(next)
            .map(OwnerId)
            .map_err(|_| RepositoryError::IdsExhausted)
    }

    /// Ensure the in-process sequence never hands out `id` or anything below.
    fn advance_past(&self, id: OwnerId) {
        self.next_id
            .fetch_max(i64::from(id.get()) + 1, Ordering::Relaxed);
    }
}
