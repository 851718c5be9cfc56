//! Shared application state.

use std::sync::Arc;

use pharma_db::Database;

use crate::auth::TokenValidator;

/// State shared by all handlers. Cheap to clone: the database holds a pool
/// handle and the validator is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub tokens: Arc<TokenValidator>,
}

impl AppState {
    pub fn new(db: Database, tokens: TokenValidator) -> Self {
        AppState {
            db,
            tokens: Arc::new(tokens),
        }
    }
}
