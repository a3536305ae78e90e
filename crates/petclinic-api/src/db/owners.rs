//! Owner persistence operations.
//!
//! All functions take a `&PgPool` and operate on the `owners` table.

use petclinic_core::{Owner, OwnerFields, OwnerId};
use sqlx::PgPool;

/// Insert a new owner and return the id assigned by the database.
pub async fn insert(pool: &PgPool, fields: &OwnerFields) -> Result<OwnerId, sqlx::Error> {
    let id: i32 = sqlx::query_scalar(
        "INSERT INTO owners (first_name, last_name, address, city, telephone)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING id",
    )
    .bind(fields.first_name())
    .bind(fields.last_name())
    .bind(fields.address())
    .bind(fields.city())
    .bind(fields.telephone())
    .fetch_one(pool)
    .await?;

    Ok(OwnerId(id))
}

/// Overwrite an owner's descriptive fields. Returns `false` if no row matched.
pub async fn update(pool: &PgPool, id: OwnerId, fields: &OwnerFields) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE owners
         SET first_name = $1, last_name = $2, address = $3, city = $4, telephone = $5
         WHERE id = $6",
    )
    .bind(fields.first_name())
    .bind(fields.last_name())
    .bind(fields.address())
    .bind(fields.city())
    .bind(fields.telephone())
    .bind(id.get())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Load all owners, ordered by id.
pub async fn load_all(pool: &PgPool) -> Result<Vec<Owner>, sqlx::Error> {
    let rows = sqlx::query_as::<_, OwnerRow>(
        "SELECT id, first_name, last_name, address, city, telephone
         FROM owners ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(OwnerRow::into_owner).collect())
}

#[derive(sqlx::FromRow)]
struct OwnerRow {
    id: i32,
    first_name: String,
    last_name: String,
    address: String,
    city: String,
    telephone: String,
}

impl OwnerRow {
    fn into_owner(self) -> Owner {
        Owner {
            id: OwnerId(self.id),
            first_name: self.first_name,
            last_name: self.last_name,
            address: self.address,
            city: self.city,
            telephone: self.telephone,
        }
    }
}
