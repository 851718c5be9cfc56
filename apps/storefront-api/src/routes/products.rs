//! Product listing endpoint.
//!
//! `GET /api/products` - public, returns in-stock products with variants
//! and category attached. Filters combine freely:
//!
//! ```text
//! /api/products?category=pain-relief
//! /api/products?search=ibuprofen
//! /api/products?featured=true&limit=4
//! ```

use axum::extract::{Query, State};
use axum::Json;
use pharma_db::repository::catalog::{ProductFilters, ProductListing};
use serde::Deserialize;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ProductQuery {
    /// Category slug
    pub category: Option<String>,
    /// Substring match on name or description
    pub search: Option<String>,
    /// Only featured products
    pub featured: Option<bool>,
    /// Cap on results
    pub limit: Option<i64>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Vec<ProductListing>>, ApiError> {
    let filters = ProductFilters {
        category_slug: query.category,
        search: query.search,
        featured: query.featured.unwrap_or(false),
        limit: query.limit,
    };

    let listings = state.db.catalog().list_products(&filters).await?;
    Ok(Json(listings))
}
