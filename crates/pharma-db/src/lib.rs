//! # pharma-db: Database Layer for the Pharma Storefront
//!
//! SQLite persistence via sqlx. Owns the schema, the repositories and the
//! checkout transaction.
//!
//! ## Architecture Position
//! ```text
//! apps/storefront-api (axum handlers)
//!      │
//!      ▼
//! ★ pharma-db (THIS CRATE) ★
//!   pool • migrations • repositories • checkout transaction
//!      │
//!      ▼
//! SQLite (WAL mode, foreign keys on, CHECK(stock >= 0))
//! ```
//!
//! ## Modules
//! - [`pool`]       - [`Database`] handle and [`DbConfig`]
//! - [`migrations`] - embedded schema migrations
//! - [`repository`] - catalog, inventory, address, order access
//! - [`checkout`]   - the one multi-step commit-or-rollback unit
//! - [`error`]      - [`DbError`] and the service-level [`StoreError`]

pub mod checkout;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use checkout::{CheckoutOutcome, CheckoutService};
pub use error::{DbError, DbResult, StoreError, StoreResult};
pub use pool::{Database, DbConfig};
