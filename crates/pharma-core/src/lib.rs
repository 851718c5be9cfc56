//! # pharma-core: Pure Business Logic for the Pharma Storefront
//!
//! This crate is the heart of the storefront backend. It contains all
//! business logic as pure functions and types with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  Storefront frontend (TypeScript)                                   │
//! │      │  JSON over HTTP                                              │
//! │      ▼                                                              │
//! │  apps/storefront-api (axum handlers)                                │
//! │      │                                                              │
//! │      ▼                                                              │
//! │  ★ pharma-core (THIS CRATE) ★                                       │
//! │    types • money • pricing • validation • errors                    │
//! │    NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS               │
//! │      │                                                              │
//! │      ▼                                                              │
//! │  pharma-db (SQLite repositories, checkout transaction)              │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, ProductVariant, Order, Address, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`pricing`] - Subtotal / flat-rate shipping / total computation
//! - [`error`] - Domain error types
//! - [`validation`] - Cart and address validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: deterministic - same input = same output
//! 2. **No I/O**: database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: all monetary values are pence (i64), never floats
//! 4. **Explicit Errors**: all errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use pharma_core::Money` instead of
// `use pharma_core::money::Money`

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines allowed in a single submitted cart.
///
/// ## Business Reason
/// Prevents runaway carts and keeps checkout transactions bounded.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity of a single line.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g. typing 1000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 999;
