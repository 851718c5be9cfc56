//! # Address Repository
//!
//! Shipping address CRUD plus the checkout-time resolver.
//!
//! ## Ownership
//! Every read and write is scoped by `user_id`. An address that exists but
//! belongs to someone else is indistinguishable from one that doesn't exist:
//! both surface as [`DbError::NotFound`].
//!
//! ## Default Flips
//! At most one address per user is the default. Setting a default clears the
//! user's other defaults in the same transaction, so no interleaving can
//! observe two defaults.

use chrono::Utc;
use pharma_core::{Address, AddressInput};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};

// =============================================================================
// Checkout-Time Resolution
// =============================================================================

/// Finds the user's address matching the submitted street + postcode, or
/// inserts a new non-default address from the submission.
///
/// Idempotent per (user, street, postcode): resubmitting the same address
/// reuses the existing row unmodified, even if other fields (phone, name)
/// differ in the submission.
///
/// Takes a `&mut SqliteConnection` so checkout can run it inside its
/// transaction (`&mut *tx`).
pub async fn resolve(
    conn: &mut SqliteConnection,
    user_id: &str,
    submitted: &AddressInput,
) -> DbResult<Address> {
    let existing = sqlx::query_as::<_, Address>(
        "SELECT * FROM addresses WHERE user_id = ?1 AND street = ?2 AND postcode = ?3",
    )
    .bind(user_id)
    .bind(&submitted.street)
    .bind(&submitted.postcode)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(address) = existing {
        debug!(address_id = %address.id, "Resolved to existing address");
        return Ok(address);
    }

    let now = Utc::now();
    let address = Address {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        name: submitted.name.clone(),
        street: submitted.street.clone(),
        city: submitted.city.clone(),
        postcode: submitted.postcode.clone(),
        country: submitted.country_or_default().to_string(),
        phone: submitted.phone.clone(),
        is_default: false,
        created_at: now,
        updated_at: now,
    };

    insert_row(conn, &address).await?;

    debug!(address_id = %address.id, "Created address during checkout");
    Ok(address)
}

async fn insert_row(conn: &mut SqliteConnection, address: &Address) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO addresses (
            id, user_id, name, street, city, postcode, country, phone,
            is_default, created_at, updated_at
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        "#,
    )
    .bind(&address.id)
    .bind(&address.user_id)
    .bind(&address.name)
    .bind(&address.street)
    .bind(&address.city)
    .bind(&address.postcode)
    .bind(&address.country)
    .bind(&address.phone)
    .bind(address.is_default)
    .bind(address.created_at)
    .bind(address.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

async fn clear_defaults(conn: &mut SqliteConnection, user_id: &str) -> DbResult<()> {
    sqlx::query("UPDATE addresses SET is_default = 0, updated_at = ?2 WHERE user_id = ?1")
        .bind(user_id)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;
    Ok(())
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for the address endpoints.
#[derive(Debug, Clone)]
pub struct AddressRepository {
    pool: SqlitePool,
}

impl AddressRepository {
    pub fn new(pool: SqlitePool) -> Self {
        AddressRepository { pool }
    }

    /// All of the user's addresses, default first, then newest first.
    pub async fn list_for_user(&self, user_id: &str) -> DbResult<Vec<Address>> {
        let addresses = sqlx::query_as::<_, Address>(
            "SELECT * FROM addresses WHERE user_id = ?1 \
             ORDER BY is_default DESC, created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(addresses)
    }

    /// One address, scoped to the user.
    pub async fn get_for_user(&self, user_id: &str, address_id: &str) -> DbResult<Address> {
        sqlx::query_as::<_, Address>("SELECT * FROM addresses WHERE id = ?1 AND user_id = ?2")
            .bind(address_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Address", address_id))
    }

    /// Creates an address. When the submission asks for default, the user's
    /// other defaults are cleared in the same transaction.
    pub async fn create(&self, user_id: &str, input: &AddressInput) -> DbResult<Address> {
        let is_default = input.is_default.unwrap_or(false);
        let now = Utc::now();
        let address = Address {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            name: input.name.clone(),
            street: input.street.clone(),
            city: input.city.clone(),
            postcode: input.postcode.clone(),
            country: input.country_or_default().to_string(),
            phone: input.phone.clone(),
            is_default,
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.pool.begin().await?;
        if is_default {
            clear_defaults(&mut tx, user_id).await?;
        }
        insert_row(&mut tx, &address).await?;
        tx.commit().await?;

        debug!(address_id = %address.id, is_default, "Address created");
        Ok(address)
    }

    /// Updates an address owned by the user; 404 otherwise.
    pub async fn update(
        &self,
        user_id: &str,
        address_id: &str,
        input: &AddressInput,
    ) -> DbResult<Address> {
        let mut tx = self.pool.begin().await?;

        let owned: Option<String> =
            sqlx::query_scalar("SELECT id FROM addresses WHERE id = ?1 AND user_id = ?2")
                .bind(address_id)
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?;
        if owned.is_none() {
            return Err(DbError::not_found("Address", address_id));
        }

        let is_default = input.is_default.unwrap_or(false);
        if is_default {
            clear_defaults(&mut tx, user_id).await?;
        }

        sqlx::query(
            r#"
            UPDATE addresses
            SET name = ?3, street = ?4, city = ?5, postcode = ?6, country = ?7,
                phone = ?8, is_default = ?9, updated_at = ?10
            WHERE id = ?1 AND user_id = ?2
            "#,
        )
        .bind(address_id)
        .bind(user_id)
        .bind(&input.name)
        .bind(&input.street)
        .bind(&input.city)
        .bind(&input.postcode)
        .bind(input.country_or_default())
        .bind(&input.phone)
        .bind(is_default)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        let address =
            sqlx::query_as::<_, Address>("SELECT * FROM addresses WHERE id = ?1")
                .bind(address_id)
                .fetch_one(&mut *tx)
                .await?;

        tx.commit().await?;

        debug!(address_id, "Address updated");
        Ok(address)
    }

    /// Deletes an address owned by the user; 404 otherwise. Orders keep
    /// their address reference as a plain id, so history is unaffected.
    pub async fn delete(&self, user_id: &str, address_id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM addresses WHERE id = ?1 AND user_id = ?2")
            .bind(address_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Address", address_id));
        }

        debug!(address_id, "Address deleted");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn input(street: &str, postcode: &str) -> AddressInput {
        AddressInput {
            name: "Alex Morgan".into(),
            street: street.into(),
            city: "London".into(),
            postcode: postcode.into(),
            country: None,
            phone: "07700900123".into(),
            is_default: None,
        }
    }

    #[tokio::test]
    async fn test_resolve_is_idempotent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.pool().acquire().await.unwrap();

        let first = resolve(&mut conn, "user-1", &input("12 High Street", "SW1A 1AA"))
            .await
            .unwrap();
        assert!(!first.is_default);
        assert_eq!(first.country, "United Kingdom");

        // same street+postcode resolves to the same row, other fields ignored
        let mut changed = input("12 High Street", "SW1A 1AA");
        changed.phone = "07700900999".into();
        let second = resolve(&mut conn, "user-1", &changed).await.unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(second.phone, "07700900123");

        // a different user gets their own row
        let other = resolve(&mut conn, "user-2", &input("12 High Street", "SW1A 1AA"))
            .await
            .unwrap();
        assert_ne!(other.id, first.id);
    }

    #[tokio::test]
    async fn test_default_flip_is_exclusive() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.addresses();

        let mut a = input("1 First Road", "N1 1AA");
        a.is_default = Some(true);
        let first = repo.create("user-1", &a).await.unwrap();
        assert!(first.is_default);

        let mut b = input("2 Second Road", "N2 2BB");
        b.is_default = Some(true);
        let second = repo.create("user-1", &b).await.unwrap();
        assert!(second.is_default);

        let all = repo.list_for_user("user-1").await.unwrap();
        let defaults: Vec<_> = all.iter().filter(|addr| addr.is_default).collect();
        assert_eq!(defaults.len(), 1);
        assert_eq!(defaults[0].id, second.id);
        // default first in the listing
        assert_eq!(all[0].id, second.id);
    }

    #[tokio::test]
    async fn test_update_requires_ownership() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.addresses();

        let created = repo.create("user-1", &input("1 First Road", "N1 1AA")).await.unwrap();

        let err = repo
            .update("user-2", &created.id, &input("1 First Road", "N1 1AA"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        let mut updated_input = input("1 First Road", "N1 1AA");
        updated_input.city = "Manchester".into();
        let updated = repo.update("user-1", &created.id, &updated_input).await.unwrap();
        assert_eq!(updated.city, "Manchester");
    }

    #[tokio::test]
    async fn test_delete_requires_ownership() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.addresses();

        let created = repo.create("user-1", &input("1 First Road", "N1 1AA")).await.unwrap();

        let err = repo.delete("user-2", &created.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        repo.delete("user-1", &created.id).await.unwrap();
        assert!(repo.list_for_user("user-1").await.unwrap().is_empty());
    }
}
