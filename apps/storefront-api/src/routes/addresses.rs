//! Address endpoints.
//!
//! All routes are authenticated and scoped to the caller; an address owned
//! by someone else reads as 404. Input is validated before any storage
//! work, mirroring what checkout does with its embedded address.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use pharma_core::{validation, Address, AddressInput};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// `GET /api/addresses` - the caller's addresses, default first.
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<Address>>, ApiError> {
    let addresses = state.db.addresses().list_for_user(&user.user_id).await?;
    Ok(Json(addresses))
}

/// `POST /api/addresses` - creates an address, optionally as the default.
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<AddressInput>,
) -> Result<(StatusCode, Json<Address>), ApiError> {
    validation::validate_address(&input)?;
    let address = state.db.addresses().create(&user.user_id, &input).await?;
    Ok((StatusCode::CREATED, Json(address)))
}

/// `PUT /api/addresses/{id}` - full update of an owned address.
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(address_id): Path<String>,
    Json(input): Json<AddressInput>,
) -> Result<Json<Address>, ApiError> {
    validation::validate_address(&input)?;
    let address = state
        .db
        .addresses()
        .update(&user.user_id, &address_id, &input)
        .await?;
    Ok(Json(address))
}

/// `DELETE /api/addresses/{id}` - removes an owned address. Order history
/// keeps its address reference as a plain id and is unaffected.
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(address_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .db
        .addresses()
        .delete(&user.user_id, &address_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
