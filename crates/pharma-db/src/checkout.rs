//! # Checkout Service (Order Assembler)
//!
//! Turns a validated cart submission into a persisted order. The whole
//! flow runs inside one write transaction:
//!
//! ```text
//! validate ─► BEGIN IMMEDIATE ─► look up variants ─► snapshot ─► price
//!     ─► resolve address ─► generate order number ─► insert order + items
//!     ─► reserve stock ─► COMMIT
//! ```
//!
//! Any failure at any step rolls everything back: no partial orders, no
//! partial stock decrements, no orphaned addresses.
//!
//! ## Write Transaction
//! The transaction starts with `BEGIN IMMEDIATE`, taking SQLite's writer
//! lock before the first read. Concurrent checkouts serialize here: each
//! one reads stock after the previous commit, so two requests racing for
//! the last unit end as one order plus one `InsufficientStock`, never a
//! busy/locked storage error from a stale read snapshot.
//!
//! ## Pricing Authority
//! Client-supplied prices are never read. Unit prices come from the variant
//! rows inside the transaction; subtotal, shipping and total are computed
//! server-side by [`pharma_core::pricing`].

use pharma_core::{pricing, validation, CoreError, Order, OrderStatus, PaymentMethod};
use pharma_core::{CheckoutRequest, Money};
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{DbError, StoreResult};
use crate::repository::{address, inventory, order};

/// Attempts at generating a unique order number before giving up.
/// The space is 31^8; two collisions in a row already mean something is
/// wrong with the random source.
const ORDER_NUMBER_ATTEMPTS: u32 = 3;

/// What the client gets back from a successful checkout.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutOutcome {
    pub order_id: String,
    pub order_number: String,
    pub total_cents: i64,
}

/// The checkout service. Cheap to clone; holds only the pool handle.
#[derive(Debug, Clone)]
pub struct CheckoutService {
    pool: SqlitePool,
}

impl CheckoutService {
    pub fn new(pool: SqlitePool) -> Self {
        CheckoutService { pool }
    }

    /// Places an order for the given user.
    ///
    /// ## Failure Modes
    /// - [`CoreError::Validation`] - malformed cart, address or payment method
    /// - [`CoreError::VariantNotFound`] - a cart line names a missing variant
    /// - [`CoreError::InsufficientStock`] - stock cannot cover a line
    /// - [`DbError`] - storage failures
    ///
    /// All of them leave the database exactly as it was.
    pub async fn place_order(
        &self,
        user_id: &str,
        request: &CheckoutRequest,
    ) -> StoreResult<CheckoutOutcome> {
        // Pure validation first: no database work for garbage input.
        validation::validate_cart(&request.items)?;
        validation::validate_address(&request.address)?;
        let payment_method: PaymentMethod = request.payment_method.parse()?;

        let mut conn = self.pool.acquire().await.map_err(DbError::from)?;

        // A checkout cancelled mid-flight returns its connection to the
        // pool with the transaction still open; clear any such leftover
        // before starting ours. Errors ("no transaction is active") are
        // the normal case and ignored.
        let _ = sqlx::query("ROLLBACK").execute(&mut *conn).await;

        // Writer lock up front - see the module docs.
        sqlx::query("BEGIN IMMEDIATE")
            .execute(&mut *conn)
            .await
            .map_err(DbError::from)?;

        match assemble_order(&mut conn, user_id, request, payment_method).await {
            Ok(outcome) => {
                sqlx::query("COMMIT")
                    .execute(&mut *conn)
                    .await
                    .map_err(DbError::from)?;

                info!(
                    order_id = %outcome.order_id,
                    order_number = %outcome.order_number,
                    user_id,
                    total_cents = outcome.total_cents,
                    lines = request.items.len(),
                    "Order placed"
                );

                Ok(outcome)
            }
            Err(err) => {
                let _ = sqlx::query("ROLLBACK").execute(&mut *conn).await;
                Err(err)
            }
        }
    }
}

/// The transactional body of checkout. Runs entirely on one connection
/// holding the writer lock; the caller owns commit and rollback.
async fn assemble_order(
    conn: &mut SqliteConnection,
    user_id: &str,
    request: &CheckoutRequest,
    payment_method: PaymentMethod,
) -> StoreResult<CheckoutOutcome> {
    // Look up every line and freeze its snapshot. First error wins.
    let mut snapshots = Vec::with_capacity(request.items.len());
    let mut priced = Vec::with_capacity(request.items.len());
    for line in &request.items {
        let avail = match inventory::availability(&mut *conn, &line.variant_id, line.quantity)
            .await
        {
            Ok(avail) => avail,
            Err(DbError::NotFound { .. }) => {
                return Err(CoreError::VariantNotFound(line.variant_id.clone()).into());
            }
            Err(err) => return Err(err.into()),
        };

        if !avail.available {
            return Err(CoreError::InsufficientStock {
                product: avail.variant.product_name,
                available: avail.variant.stock,
                requested: line.quantity,
            }
            .into());
        }

        priced.push(pricing::PricedLine {
            unit_price: Money::from_pence(avail.variant.price_cents),
            quantity: line.quantity,
        });

        // The image read borrows the variant, so it happens before the
        // field moves below.
        let product_image = avail.variant.first_image();
        snapshots.push(order::ItemSnapshot {
            product_id: avail.variant.product_id,
            variant_id: line.variant_id.clone(),
            product_name: avail.variant.product_name,
            product_image,
            variant_name: avail.variant.variant_name,
            quantity: line.quantity,
            unit_price_cents: avail.variant.price_cents,
        });
    }

    let subtotal = pricing::subtotal(&priced);
    let shipping = pricing::shipping_fee(subtotal);
    let total = pricing::order_total(subtotal, shipping);

    let shipping_address = address::resolve(&mut *conn, user_id, &request.address).await?;

    // Insert the order row, regenerating the number on collision.
    let now = chrono::Utc::now();
    let mut new_order = Order {
        id: Uuid::new_v4().to_string(),
        order_number: order::generate_order_number(),
        user_id: user_id.to_string(),
        address_id: shipping_address.id,
        subtotal_cents: subtotal.pence(),
        shipping_cents: shipping.pence(),
        total_cents: total.pence(),
        payment_method,
        status: OrderStatus::Pending,
        created_at: now,
        updated_at: now,
    };

    let mut attempt = 1;
    loop {
        match order::insert_order_row(&mut *conn, &new_order).await {
            Ok(()) => break,
            Err(err)
                if err.is_unique_violation_on("order_number")
                    && attempt < ORDER_NUMBER_ATTEMPTS =>
            {
                warn!(
                    order_number = %new_order.order_number,
                    attempt,
                    "Order number collision, regenerating"
                );
                new_order.order_number = order::generate_order_number();
                attempt += 1;
            }
            Err(err) => return Err(err.into()),
        }
    }

    order::insert_order_items(&mut *conn, &new_order.id, &snapshots).await?;

    // Reserve stock last, conditionally. Within this transaction the only
    // way a reservation can fail after the availability check is an
    // earlier line of the same cart consuming the stock; the re-read sees
    // that decrement and reports the true remainder.
    for (line, snapshot) in request.items.iter().zip(&snapshots) {
        if !inventory::reserve(&mut *conn, &line.variant_id, line.quantity).await? {
            let avail =
                inventory::availability(&mut *conn, &line.variant_id, line.quantity).await?;
            return Err(CoreError::InsufficientStock {
                product: snapshot.product_name.clone(),
                available: avail.variant.stock,
                requested: line.quantity,
            }
            .into());
        }
    }

    Ok(CheckoutOutcome {
        order_id: new_order.id,
        order_number: new_order.order_number,
        total_cents: new_order.total_cents,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
