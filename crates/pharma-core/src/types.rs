//! # Domain Types
//!
//! Core domain types for the pharma storefront.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  Catalog (read side)            Checkout (write side)               │
//! │                                                                     │
//! │  Category ──► Product ──► ProductVariant      CartLine (ephemeral)  │
//! │                               │ price_cents        │                │
//! │                               │ stock              ▼                │
//! │                               └─────────────► Order ──► OrderItem   │
//! │                                               Address   (snapshot)  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! `OrderItem` copies the product name, image, variant name and unit price
//! at purchase time. Later catalog edits never alter order history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Category
// =============================================================================

/// A catalog category (e.g. "Pain Relief", "Sleeping Aids").
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Category {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name.
    pub name: String,

    /// URL slug - business identifier.
    pub slug: String,

    /// Optional description shown on category pages.
    pub description: Option<String>,

    /// Optional hero image URL.
    pub image: Option<String>,

    /// Position within category listings.
    pub sort_order: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Product
// =============================================================================

/// A product in the catalog. Purchasable units are its [`ProductVariant`]s.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Owning category.
    pub category_id: String,

    /// Display name shown in listings and on order snapshots.
    pub name: String,

    /// URL slug - business identifier.
    pub slug: String,

    /// Full description.
    pub description: String,

    /// One-line description for cards and search results.
    pub short_description: Option<String>,

    /// JSON array of image URLs. The first entry is the snapshot image.
    pub images: String,

    /// Lowest variant price in pence, for "from £x" display.
    pub base_price_cents: i64,

    /// Whether the product is listed at all (soft availability flag).
    pub in_stock: bool,

    /// Featured on the storefront home page.
    pub featured: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the base price as a Money type.
    #[inline]
    pub fn base_price(&self) -> Money {
        Money::from_pence(self.base_price_cents)
    }

    /// First image URL, if any.
    ///
    /// Images are stored as a JSON array; a malformed value is treated as
    /// having no images rather than failing the caller.
    pub fn first_image(&self) -> Option<String> {
        serde_json::from_str::<Vec<String>>(&self.images)
            .ok()
            .and_then(|urls| urls.into_iter().next())
    }
}

// =============================================================================
// Product Variant
// =============================================================================

/// A purchasable configuration of a product (strength / pack size) with its
/// own price and stock.
///
/// ## Invariant
/// `stock >= 0` at all times; mutated only by the checkout decrement or by
/// restocking.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductVariant {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Owning product.
    pub product_id: String,

    /// Display name (e.g. "28 tablets").
    pub name: String,

    /// Optional strength label (e.g. "10mg").
    pub strength: Option<String>,

    /// Units per pack.
    pub pack_size: i64,

    /// Unit price in pence.
    pub price_cents: i64,

    /// Optional strikethrough price in pence.
    pub compare_at_price_cents: Option<i64>,

    /// Current stock level.
    pub stock: i64,

    /// Optional stock keeping unit.
    pub sku: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl ProductVariant {
    /// Returns the unit price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_pence(self.price_cents)
    }

    /// Checks whether the requested quantity can be fulfilled from stock.
    #[inline]
    pub fn can_fulfill(&self, quantity: i64) -> bool {
        self.stock >= quantity
    }
}

// =============================================================================
// Cart Line
// =============================================================================

/// A client-supplied cart line. Ephemeral: never persisted until an order is
/// placed, and never trusted for pricing - the checkout re-reads the
/// authoritative price and stock.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartLine {
    pub product_id: String,
    pub variant_id: String,
    pub quantity: i64,
}

// =============================================================================
// Checkout Request
// =============================================================================

/// The full checkout submission: cart lines, shipping address and a payment
/// method selector. Everything in here is client-supplied and untrusted;
/// prices and stock are re-read server-side.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CheckoutRequest {
    pub items: Vec<CartLine>,
    pub address: AddressInput,
    /// Parsed into [`PaymentMethod`]; kept as a string here so an unknown
    /// value surfaces as a validation error, not a deserialization failure.
    pub payment_method: String,
}

// =============================================================================
// Address
// =============================================================================

/// Client-submitted address fields, used both by the address endpoints and
/// by checkout. Validated by [`crate::validation::validate_address`] before
/// any persistence work.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AddressInput {
    pub name: String,
    pub street: String,
    pub city: String,
    pub postcode: String,
    /// Defaults to "United Kingdom" when omitted.
    #[serde(default)]
    pub country: Option<String>,
    pub phone: String,
    /// Only honored by the explicit address-create/update endpoints;
    /// checkout leaves new addresses non-default.
    #[serde(default)]
    pub is_default: Option<bool>,
}

impl AddressInput {
    /// Country with the storefront default applied.
    pub fn country_or_default(&self) -> &str {
        self.country.as_deref().unwrap_or("United Kingdom")
    }
}

/// A shipping address owned by exactly one user.
///
/// ## Invariant
/// At most one address per user has `is_default` set; flipping the default
/// clears the previous one atomically.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Address {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub street: String,
    pub city: String,
    pub postcode: String,
    pub country: String,
    pub phone: String,
    pub is_default: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Order Status
// =============================================================================

/// The fulfillment status of an order.
///
/// ## State Machine
/// ```text
/// pending ──► processing ──► shipped ──► delivered
///    │             │
///    └──────┬──────┘
///           ▼
///       cancelled (terminal)
/// ```
/// The happy path never skips a step. `cancelled` is terminal and excluded
/// from the tracker step sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Order placed, awaiting fulfillment.
    Pending,
    /// Order accepted and being prepared.
    Processing,
    /// Order handed to the carrier.
    Shipped,
    /// Order received by the customer.
    Delivered,
    /// Order cancelled from pending or processing.
    Cancelled,
}

impl OrderStatus {
    /// Whether a transition from `self` to `next` is legal.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Processing)
                | (Processing, Shipped)
                | (Shipped, Delivered)
                | (Pending, Cancelled)
                | (Processing, Cancelled)
        )
    }

    /// The ordered step sequence for the order tracker UI.
    /// `cancelled` never appears here.
    pub const fn tracker_steps() -> [OrderStatus; 4] {
        [
            OrderStatus::Pending,
            OrderStatus::Processing,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
        ]
    }

    /// Lowercase wire representation, matching the database encoding.
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// Payment method selector. A closed set: the actual gateway integration is
/// an external collaborator, only the tag is recorded on the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Card payment.
    Card,
    /// PayPal payment.
    Paypal,
}

impl PaymentMethod {
    /// All accepted selectors, for validation error messages.
    pub const ALLOWED: [&'static str; 2] = ["card", "paypal"];

    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "card",
            PaymentMethod::Paypal => "paypal",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = crate::error::ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "card" => Ok(PaymentMethod::Card),
            "paypal" => Ok(PaymentMethod::Paypal),
            _ => Err(crate::error::ValidationError::NotAllowed {
                field: "paymentMethod".to_string(),
                allowed: Self::ALLOWED.iter().map(|s| s.to_string()).collect(),
            }),
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Order
// =============================================================================

/// A placed order.
///
/// ## Invariant
/// `total_cents = subtotal_cents + shipping_cents`, computed at creation and
/// never recomputed. Orders are immutable once created except for status
/// transitions.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Order {
    pub id: String,

    /// Human-readable unique order number (e.g. `PH-7K2M-9QX4`).
    pub order_number: String,

    pub user_id: String,

    /// Shipping address used at checkout. Kept as a plain id: deleting the
    /// address later does not touch the order.
    pub address_id: String,

    pub subtotal_cents: i64,
    pub shipping_cents: i64,
    pub total_cents: i64,

    pub payment_method: PaymentMethod,
    pub status: OrderStatus,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Order {
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_pence(self.subtotal_cents)
    }

    #[inline]
    pub fn shipping(&self) -> Money {
        Money::from_pence(self.shipping_cents)
    }

    #[inline]
    pub fn total(&self) -> Money {
        Money::from_pence(self.total_cents)
    }
}

// =============================================================================
// Order Item
// =============================================================================

/// A line item in an order.
/// Uses the snapshot pattern to freeze product data at purchase time.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    pub variant_id: String,
    /// Product name at purchase time (frozen).
    pub product_name: String,
    /// First product image at purchase time (frozen).
    pub product_image: Option<String>,
    /// Variant name at purchase time (frozen).
    pub variant_name: String,
    /// Quantity purchased.
    pub quantity: i64,
    /// Unit price in pence at purchase time (frozen).
    pub unit_price_cents: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl OrderItem {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_pence(self.unit_price_cents)
    }

    /// Line total (unit price × quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_happy_path() {
        use OrderStatus::*;
        assert!(Pending.can_transition_to(Processing));
        assert!(Processing.can_transition_to(Shipped));
        assert!(Shipped.can_transition_to(Delivered));
    }

    #[test]
    fn test_order_status_no_skipping() {
        use OrderStatus::*;
        assert!(!Pending.can_transition_to(Shipped));
        assert!(!Pending.can_transition_to(Delivered));
        assert!(!Processing.can_transition_to(Delivered));
    }

    #[test]
    fn test_order_status_cancellation() {
        use OrderStatus::*;
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Processing.can_transition_to(Cancelled));
        assert!(!Shipped.can_transition_to(Cancelled));
        assert!(!Delivered.can_transition_to(Cancelled));
        // cancelled is terminal
        assert!(!Cancelled.can_transition_to(Pending));
        assert!(!Cancelled.can_transition_to(Processing));
    }

    #[test]
    fn test_tracker_steps_exclude_cancelled() {
        let steps = OrderStatus::tracker_steps();
        assert_eq!(steps.len(), 4);
        assert!(!steps.contains(&OrderStatus::Cancelled));
        assert_eq!(steps[0], OrderStatus::Pending);
        assert_eq!(steps[3], OrderStatus::Delivered);
    }

    #[test]
    fn test_payment_method_parsing() {
        assert_eq!("card".parse::<PaymentMethod>().unwrap(), PaymentMethod::Card);
        assert_eq!(
            "paypal".parse::<PaymentMethod>().unwrap(),
            PaymentMethod::Paypal
        );
        assert!("bitcoin".parse::<PaymentMethod>().is_err());
        // case sensitive on purpose: wire values are lowercase
        assert!("Card".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_product_first_image() {
        let mut product = sample_product();
        assert_eq!(
            product.first_image().as_deref(),
            Some("https://cdn.example.com/a.jpg")
        );

        product.images = "[]".to_string();
        assert_eq!(product.first_image(), None);

        product.images = "not json".to_string();
        assert_eq!(product.first_image(), None);
    }

    #[test]
    fn test_variant_can_fulfill() {
        let variant = sample_variant(3);
        assert!(variant.can_fulfill(3));
        assert!(!variant.can_fulfill(4));
    }

    #[test]
    fn test_order_item_line_total() {
        let item = OrderItem {
            id: "i1".to_string(),
            order_id: "o1".to_string(),
            product_id: "p1".to_string(),
            variant_id: "v1".to_string(),
            product_name: "Serenix 10mg".to_string(),
            product_image: None,
            variant_name: "28 tablets".to_string(),
            quantity: 2,
            unit_price_cents: 1000,
            created_at: Utc::now(),
        };
        assert_eq!(item.line_total().pence(), 2000);
    }

    fn sample_product() -> Product {
        Product {
            id: "p1".to_string(),
            category_id: "c1".to_string(),
            name: "Serenix 10mg".to_string(),
            slug: "serenix-10mg".to_string(),
            description: "desc".to_string(),
            short_description: None,
            images: r#"["https://cdn.example.com/a.jpg","https://cdn.example.com/b.jpg"]"#
                .to_string(),
            base_price_cents: 2999,
            in_stock: true,
            featured: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn sample_variant(stock: i64) -> ProductVariant {
        ProductVariant {
            id: "v1".to_string(),
            product_id: "p1".to_string(),
            name: "28 tablets".to_string(),
            strength: Some("10mg".to_string()),
            pack_size: 28,
            price_cents: 2999,
            compare_at_price_cents: None,
            stock,
            sku: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}
