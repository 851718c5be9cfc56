//! # Inventory Ledger
//!
//! Stock availability checks and the conditional stock decrement.
//!
//! ## The Decrement Rule
//! Stock is never decremented blindly. The only mutation checkout performs is
//!
//! ```sql
//! UPDATE product_variants
//! SET stock = stock - ?
//! WHERE id = ? AND stock >= ?
//! ```
//!
//! and the caller inspects `rows_affected`. Combined with the `CHECK
//! (stock >= 0)` column constraint this makes overselling impossible even
//! when two checkouts race for the last unit: exactly one UPDATE matches.
//!
//! All functions take `&mut SqliteConnection` so they compose into the
//! checkout transaction (`&mut *tx`) as well as standalone pool connections.

use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::{DbError, DbResult};

// =============================================================================
// Checkout Variant Row
// =============================================================================

/// A variant joined with the product fields checkout snapshots from.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CheckoutVariant {
    pub id: String,
    pub product_id: String,
    pub variant_name: String,
    pub price_cents: i64,
    pub stock: i64,
    pub product_name: String,
    /// JSON array of image URLs (same encoding as `products.images`).
    pub product_images: String,
}

impl CheckoutVariant {
    /// First product image, if any. Malformed JSON means no image.
    pub fn first_image(&self) -> Option<String> {
        serde_json::from_str::<Vec<String>>(&self.product_images)
            .ok()
            .and_then(|urls| urls.into_iter().next())
    }
}

/// Result of an availability check: the variant row plus whether the
/// requested quantity is currently coverable.
#[derive(Debug)]
pub struct Availability {
    pub variant: CheckoutVariant,
    pub available: bool,
}

// =============================================================================
// Operations
// =============================================================================

/// Looks up a variant (with its product) and reports whether `quantity`
/// can be fulfilled from current stock.
///
/// A missing variant is a [`DbError::NotFound`] naming the id.
pub async fn availability(
    conn: &mut SqliteConnection,
    variant_id: &str,
    quantity: i64,
) -> DbResult<Availability> {
    let variant = sqlx::query_as::<_, CheckoutVariant>(
        r#"
        SELECT
            v.id,
            v.product_id,
            v.name AS variant_name,
            v.price_cents,
            v.stock,
            p.name AS product_name,
            p.images AS product_images
        FROM product_variants v
        JOIN products p ON p.id = v.product_id
        WHERE v.id = ?1
        "#,
    )
    .bind(variant_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| DbError::not_found("ProductVariant", variant_id))?;

    let available = variant.stock >= quantity;

    debug!(
        variant_id,
        stock = variant.stock,
        requested = quantity,
        available,
        "Availability check"
    );

    Ok(Availability { variant, available })
}

/// Atomically reserves `quantity` units by decrementing stock, but only if
/// enough stock remains. Returns whether the reservation took.
///
/// This is the race-closing statement: the stock condition and the
/// decrement are one UPDATE, so no interleaving can drive stock negative.
pub async fn reserve(
    conn: &mut SqliteConnection,
    variant_id: &str,
    quantity: i64,
) -> DbResult<bool> {
    let result = sqlx::query(
        r#"
        UPDATE product_variants
        SET stock = stock - ?2, updated_at = ?3
        WHERE id = ?1 AND stock >= ?2
        "#,
    )
    .bind(variant_id)
    .bind(quantity)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;

    let reserved = result.rows_affected() == 1;

    debug!(variant_id, quantity, reserved, "Stock reservation");

    Ok(reserved)
}

/// Adds `quantity` units back to stock (restocking, cancellations).
///
/// A missing variant is a [`DbError::NotFound`] naming the id.
pub async fn restock(
    conn: &mut SqliteConnection,
    variant_id: &str,
    quantity: i64,
) -> DbResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE product_variants
        SET stock = stock + ?2, updated_at = ?3
        WHERE id = ?1
        "#,
    )
    .bind(variant_id)
    .bind(quantity)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("ProductVariant", variant_id));
    }

    debug!(variant_id, quantity, "Restocked");
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::catalog::{CatalogRepository, NewCategory, NewProduct, NewVariant};

    async fn setup() -> (Database, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let catalog = db.catalog();

        let category = catalog
            .insert_category(NewCategory {
                name: "Pain Relief".into(),
                slug: "pain-relief".into(),
                description: None,
                image: None,
                sort_order: 1,
            })
            .await
            .unwrap();

        let product = catalog
            .insert_product(NewProduct {
                category_id: category.id,
                name: "Ibuprofen".into(),
                slug: "ibuprofen".into(),
                description: "Anti-inflammatory pain relief".into(),
                short_description: None,
                images: vec![],
                base_price_cents: 399,
                featured: false,
            })
            .await
            .unwrap();

        let variant = catalog
            .insert_variant(NewVariant {
                product_id: product.id,
                name: "16 tablets".into(),
                strength: Some("200mg".into()),
                pack_size: 16,
                price_cents: 399,
                compare_at_price_cents: None,
                stock: 5,
                sku: None,
            })
            .await
            .unwrap();

        (db, variant.id)
    }

    #[tokio::test]
    async fn test_availability_reports_stock() {
        let (db, variant_id) = setup().await;
        let mut conn = db.pool().acquire().await.unwrap();

        let avail = availability(&mut conn, &variant_id, 5).await.unwrap();
        assert!(avail.available);
        assert_eq!(avail.variant.stock, 5);
        assert_eq!(avail.variant.product_name, "Ibuprofen");

        let avail = availability(&mut conn, &variant_id, 6).await.unwrap();
        assert!(!avail.available);
    }

    #[tokio::test]
    async fn test_availability_missing_variant() {
        let (db, _) = setup().await;
        let mut conn = db.pool().acquire().await.unwrap();

        let err = availability(&mut conn, "v-missing", 1).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
        assert!(err.to_string().contains("v-missing"));
    }

    #[tokio::test]
    async fn test_reserve_decrements_conditionally() {
        let (db, variant_id) = setup().await;
        let mut conn = db.pool().acquire().await.unwrap();

        assert!(reserve(&mut conn, &variant_id, 3).await.unwrap());
        let avail = availability(&mut conn, &variant_id, 1).await.unwrap();
        assert_eq!(avail.variant.stock, 2);

        // more than remaining: the UPDATE matches no row, stock untouched
        assert!(!reserve(&mut conn, &variant_id, 3).await.unwrap());
        let avail = availability(&mut conn, &variant_id, 1).await.unwrap();
        assert_eq!(avail.variant.stock, 2);

        // exactly the remainder is fine
        assert!(reserve(&mut conn, &variant_id, 2).await.unwrap());
        let avail = availability(&mut conn, &variant_id, 1).await.unwrap();
        assert_eq!(avail.variant.stock, 0);
    }

    #[tokio::test]
    async fn test_restock() {
        let (db, variant_id) = setup().await;
        let mut conn = db.pool().acquire().await.unwrap();

        restock(&mut conn, &variant_id, 10).await.unwrap();
        let avail = availability(&mut conn, &variant_id, 15).await.unwrap();
        assert_eq!(avail.variant.stock, 15);

        let err = restock(&mut conn, "v-missing", 1).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
