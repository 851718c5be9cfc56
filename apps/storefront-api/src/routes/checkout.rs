//! Checkout endpoint.
//!
//! `POST /api/checkout` - places an order for the authenticated user.
//! The handler is a thin shim: all validation, pricing and persistence
//! live in [`pharma_db::CheckoutService`].

use axum::extract::State;
use axum::Json;
use pharma_core::CheckoutRequest;
use pharma_db::CheckoutOutcome;
use tracing::info;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

pub async fn place_order(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<CheckoutOutcome>, ApiError> {
    info!(
        user_id = %user.user_id,
        lines = request.items.len(),
        "Checkout requested"
    );

    let outcome = state
        .db
        .checkout()
        .place_order(&user.user_id, &request)
        .await?;

    Ok(Json(outcome))
}
