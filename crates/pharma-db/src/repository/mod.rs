//! # Repository Layer
//!
//! Data access organized by aggregate:
//!
//! - [`catalog`]   - categories, products, variants (read side + seed inserts)
//! - [`inventory`] - stock checks and the conditional decrement
//! - [`address`]   - shipping addresses, find-or-create resolution
//! - [`order`]     - order persistence, history, status transitions
//!
//! Functions that must run inside the checkout transaction take a
//! `&mut SqliteConnection` so the same code serves both pooled and
//! transactional callers.

pub mod address;
pub mod catalog;
pub mod inventory;
pub mod order;
