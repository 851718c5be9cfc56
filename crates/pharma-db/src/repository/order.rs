//! # Order Repository
//!
//! Order persistence, history reads and status transitions.
//!
//! ## Order Numbers
//! Human-facing numbers look like `PH-7K2M-9QX4`: two groups of four
//! characters from an alphabet without ambiguous glyphs (no 0/O, 1/I/L).
//! Uniqueness is enforced by the database index; the checkout transaction
//! retries generation on collision.
//!
//! ## Snapshots
//! `order_items` rows carry copied product data. Reads never join back to
//! the catalog, so later edits or deletions cannot rewrite history.

use chrono::Utc;
use pharma_core::{CoreError, Order, OrderItem, OrderStatus};
use rand::Rng;
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult, StoreResult};

/// Alphabet for order numbers. Excludes 0/O, 1/I/L to keep the numbers
/// readable over the phone.
const ORDER_NUMBER_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";

/// Generates a candidate order number (`PH-XXXX-XXXX`).
///
/// Purely random; the caller owns collision handling against the unique
/// index on `orders.order_number`.
pub fn generate_order_number() -> String {
    let mut rng = rand::rng();
    let mut group = || -> String {
        (0..4)
            .map(|_| {
                let idx = rng.random_range(0..ORDER_NUMBER_ALPHABET.len());
                ORDER_NUMBER_ALPHABET[idx] as char
            })
            .collect()
    };
    let first = group();
    let second = group();
    format!("PH-{}-{}", first, second)
}

// =============================================================================
// Write Side (checkout transaction)
// =============================================================================

/// Frozen line-item data captured before the order insert.
#[derive(Debug, Clone)]
pub struct ItemSnapshot {
    pub product_id: String,
    pub variant_id: String,
    pub product_name: String,
    pub product_image: Option<String>,
    pub variant_name: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
}

/// Inserts the order row. Fails with a unique violation on an order-number
/// collision, which the checkout retry loop catches.
pub async fn insert_order_row(conn: &mut SqliteConnection, order: &Order) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO orders (
            id, order_number, user_id, address_id,
            subtotal_cents, shipping_cents, total_cents,
            payment_method, status, created_at, updated_at
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        "#,
    )
    .bind(&order.id)
    .bind(&order.order_number)
    .bind(&order.user_id)
    .bind(&order.address_id)
    .bind(order.subtotal_cents)
    .bind(order.shipping_cents)
    .bind(order.total_cents)
    .bind(order.payment_method.as_str())
    .bind(order.status.as_str())
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Inserts the frozen line items for an order.
pub async fn insert_order_items(
    conn: &mut SqliteConnection,
    order_id: &str,
    snapshots: &[ItemSnapshot],
) -> DbResult<Vec<OrderItem>> {
    let mut items = Vec::with_capacity(snapshots.len());

    for snapshot in snapshots {
        let item = OrderItem {
            id: Uuid::new_v4().to_string(),
            order_id: order_id.to_string(),
            product_id: snapshot.product_id.clone(),
            variant_id: snapshot.variant_id.clone(),
            product_name: snapshot.product_name.clone(),
            product_image: snapshot.product_image.clone(),
            variant_name: snapshot.variant_name.clone(),
            quantity: snapshot.quantity,
            unit_price_cents: snapshot.unit_price_cents,
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO order_items (
                id, order_id, product_id, variant_id, product_name,
                product_image, variant_name, quantity, unit_price_cents, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&item.id)
        .bind(&item.order_id)
        .bind(&item.product_id)
        .bind(&item.variant_id)
        .bind(&item.product_name)
        .bind(&item.product_image)
        .bind(&item.variant_name)
        .bind(item.quantity)
        .bind(item.unit_price_cents)
        .bind(item.created_at)
        .execute(&mut *conn)
        .await?;

        items.push(item);
    }

    Ok(items)
}

// =============================================================================
// Read Side
// =============================================================================

/// An order with its frozen line items, the shape order history renders.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Repository for order history and status management.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// The user's order history, newest first, items included.
    pub async fn list_for_user(&self, user_id: &str) -> DbResult<Vec<OrderWithItems>> {
        let orders = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE user_id = ?1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut result = Vec::with_capacity(orders.len());
        for order in orders {
            let items = self.items_for_order(&order.id).await?;
            result.push(OrderWithItems { order, items });
        }
        Ok(result)
    }

    /// One order, scoped to the user. An order belonging to someone else is
    /// indistinguishable from a missing one.
    pub async fn get_for_user(&self, user_id: &str, order_id: &str) -> DbResult<OrderWithItems> {
        let order = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE id = ?1 AND user_id = ?2",
        )
        .bind(order_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Order", order_id))?;

        let items = self.items_for_order(&order.id).await?;
        Ok(OrderWithItems { order, items })
    }

    /// Looks an order up by its human-facing number (the tracking page).
    pub async fn find_by_number(&self, order_number: &str) -> DbResult<OrderWithItems> {
        let order =
            sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE order_number = ?1")
                .bind(order_number)
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| DbError::not_found("Order", order_number))?;

        let items = self.items_for_order(&order.id).await?;
        Ok(OrderWithItems { order, items })
    }

    /// Moves an order to a new status, enforcing the state machine.
    /// Illegal transitions (skipping a step, leaving a terminal state)
    /// are rejected without touching the row.
    pub async fn update_status(
        &self,
        order_id: &str,
        next: OrderStatus,
    ) -> StoreResult<Order> {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = ?1")
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DbError::from)?
            .ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()))?;

        if !order.status.can_transition_to(next) {
            return Err(CoreError::InvalidStatusTransition {
                order_id: order_id.to_string(),
                from: order.status.to_string(),
                to: next.to_string(),
            }
            .into());
        }

        sqlx::query("UPDATE orders SET status = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(order_id)
            .bind(next.as_str())
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?;

        debug!(order_id, from = %order.status, to = %next, "Order status updated");

        Ok(Order {
            status: next,
            updated_at: Utc::now(),
            ..order
        })
    }

    async fn items_for_order(&self, order_id: &str) -> DbResult<Vec<OrderItem>> {
        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT * FROM order_items WHERE order_id = ?1 ORDER BY created_at ASC",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
