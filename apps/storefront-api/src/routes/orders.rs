//! Order history and tracking endpoints.
//!
//! History routes are authenticated and scoped to the caller. Tracking is
//! public: order numbers are unguessable capability tokens, the same model
//! as a courier tracking number.

use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use pharma_core::OrderStatus;
use pharma_db::repository::order::OrderWithItems;
use serde::Serialize;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// `GET /api/orders` - the caller's order history, newest first.
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<OrderWithItems>>, ApiError> {
    let orders = state.db.orders().list_for_user(&user.user_id).await?;
    Ok(Json(orders))
}

/// `GET /api/orders/{id}` - one order, 404 unless owned by the caller.
pub async fn get(
    State(state): State<AppState>,
    user: AuthUser,
    Path(order_id): Path<String>,
) -> Result<Json<OrderWithItems>, ApiError> {
    let order = state
        .db
        .orders()
        .get_for_user(&user.user_id, &order_id)
        .await?;
    Ok(Json(order))
}

// =============================================================================
// Tracking
// =============================================================================

/// One step of the tracking timeline.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerStep {
    pub status: OrderStatus,
    pub reached: bool,
}

/// The tracking page payload: current status plus the fixed step sequence.
/// A cancelled order reports `cancelled: true` with only the initial step
/// reached; `cancelled` itself never appears as a step.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingResponse {
    pub order_number: String,
    pub status: OrderStatus,
    pub cancelled: bool,
    pub placed_at: DateTime<Utc>,
    pub steps: Vec<TrackerStep>,
}

impl TrackingResponse {
    fn from_order(order_number: String, status: OrderStatus, placed_at: DateTime<Utc>) -> Self {
        let sequence = OrderStatus::tracker_steps();
        let reached_index = sequence.iter().position(|step| *step == status);

        let steps = sequence
            .iter()
            .enumerate()
            .map(|(index, step)| TrackerStep {
                status: *step,
                // cancelled orders only ever reached the initial step
                reached: match reached_index {
                    Some(current) => index <= current,
                    None => index == 0,
                },
            })
            .collect();

        TrackingResponse {
            order_number,
            status,
            cancelled: status == OrderStatus::Cancelled,
            placed_at,
            steps,
        }
    }
}

/// `GET /api/orders/track/{orderNumber}` - public tracking by order number.
pub async fn track(
    State(state): State<AppState>,
    Path(order_number): Path<String>,
) -> Result<Json<TrackingResponse>, ApiError> {
    let found = state.db.orders().find_by_number(&order_number).await?;
    Ok(Json(TrackingResponse::from_order(
        found.order.order_number,
        found.order.status,
        found.order.created_at,
    )))
}
