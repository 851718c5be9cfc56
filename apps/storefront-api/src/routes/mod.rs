//! # Route Wiring
//!
//! One router for the whole API:
//!
//! ```text
//! GET    /health                          liveness + database check
//! GET    /api/products                    public catalog listing
//! POST   /api/checkout                    auth  place an order
//! GET    /api/addresses                   auth  list addresses
//! POST   /api/addresses                   auth  create address
//! PUT    /api/addresses/{id}              auth  update address
//! DELETE /api/addresses/{id}              auth  delete address
//! GET    /api/orders                      auth  order history
//! GET    /api/orders/{id}                 auth  one order
//! GET    /api/orders/track/{orderNumber}  public tracking
//! ```

pub mod addresses;
pub mod checkout;
pub mod orders;
pub mod products;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::json;

use crate::state::AppState;

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/products", get(products::list))
        .route("/api/checkout", post(checkout::place_order))
        .route(
            "/api/addresses",
            get(addresses::list).post(addresses::create),
        )
        .route(
            "/api/addresses/{id}",
            put(addresses::update).delete(addresses::delete),
        )
        .route("/api/orders", get(orders::list))
        .route("/api/orders/{id}", get(orders::get))
        .route("/api/orders/track/{order_number}", get(orders::track))
        .with_state(state)
}

/// Liveness probe. Degrades to 503 when the database stops answering.
async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let database = state.db.health_check().await;
    let status = if database {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        status,
        Json(json!({
            "status": if database { "ok" } else { "degraded" },
            "database": database,
        })),
    )
}

// =============================================================================
// Router-Level Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Claims, TokenValidator};
    use axum::body::Body;
    use axum::http::{header, Request};
    use chrono::Utc;
    use http_body_util::BodyExt;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use pharma_db::repository::catalog::{NewCategory, NewProduct, NewVariant};
    use pharma_db::{Database, DbConfig};
    use serde_json::Value;
    use tower::ServiceExt;

    const TEST_SECRET: &str = "test-secret";

    async fn test_app() -> (Router, Database, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let catalog = db.catalog();
        let category = catalog
            .insert_category(NewCategory {
                name: "Pain Relief".into(),
                slug: "pain-relief".into(),
                description: None,
                image: None,
                sort_order: 1,
            })
            .await
            .unwrap();
        let product = catalog
            .insert_product(NewProduct {
                category_id: category.id,
                name: "Ibuprofen".into(),
                slug: "ibuprofen".into(),
                description: "Anti-inflammatory pain relief".into(),
                short_description: None,
                images: vec![],
                base_price_cents: 1000,
                featured: false,
            })
            .await
            .unwrap();
        let variant = catalog
            .insert_variant(NewVariant {
                product_id: product.id,
                name: "16 tablets".into(),
                strength: Some("200mg".into()),
                pack_size: 16,
                price_cents: 1000,
                compare_at_price_cents: None,
                stock: 10,
                sku: None,
            })
            .await
            .unwrap();

        let state = AppState::new(db.clone(), TokenValidator::new(TEST_SECRET));
        (router(state), db, variant.id)
    }

    fn token_for(user_id: &str) -> String {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now,
            exp: now + 3600,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .unwrap()
    }

    fn checkout_body(variant_id: &str, quantity: i64) -> String {
        json!({
            "items": [{
                "productId": "ignored",
                "variantId": variant_id,
                "quantity": quantity,
            }],
            "address": {
                "name": "Alex Morgan",
                "street": "12 High Street",
                "city": "London",
                "postcode": "SW1A 1AA",
                "phone": "07700900123",
            },
            "paymentMethod": "card",
        })
        .to_string()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _db, _variant) = test_app().await;

        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["database"], true);
    }

    #[tokio::test]
    async fn test_checkout_requires_auth() {
        let (app, _db, variant_id) = test_app().await;

        let response = app
            .oneshot(
                Request::post("/api/checkout")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(checkout_body(&variant_id, 1)))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = json_body(response).await;
        assert_eq!(body["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_checkout_end_to_end() {
        let (app, _db, variant_id) = test_app().await;
        let token = token_for("user-1");

        let response = app
            .clone()
            .oneshot(
                Request::post("/api/checkout")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(checkout_body(&variant_id, 2)))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["totalCents"], 2499);
        let order_number = body["orderNumber"].as_str().unwrap().to_string();
        assert!(order_number.starts_with("PH-"));

        // the order shows up in history
        let response = app
            .clone()
            .oneshot(
                Request::get("/api/orders")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let history = json_body(response).await;
        assert_eq!(history.as_array().unwrap().len(), 1);
        assert_eq!(history[0]["orderNumber"], order_number.as_str());
        assert_eq!(history[0]["items"][0]["productName"], "Ibuprofen");

        // and tracks publicly by number
        let response = app
            .oneshot(
                Request::get(format!("/api/orders/track/{order_number}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let tracking = json_body(response).await;
        assert_eq!(tracking["status"], "pending");
        assert_eq!(tracking["cancelled"], false);
        assert_eq!(tracking["steps"].as_array().unwrap().len(), 4);
        assert_eq!(tracking["steps"][0]["reached"], true);
        assert_eq!(tracking["steps"][1]["reached"], false);
    }

    #[tokio::test]
    async fn test_checkout_insufficient_stock_is_400() {
        let (app, _db, variant_id) = test_app().await;
        let token = token_for("user-1");

        let response = app
            .oneshot(
                Request::post("/api/checkout")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(checkout_body(&variant_id, 11)))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["code"], "INSUFFICIENT_STOCK");
        assert!(body["message"].as_str().unwrap().contains("Ibuprofen"));
    }

    #[tokio::test]
    async fn test_products_listing() {
        let (app, _db, _variant) = test_app().await;

        let response = app
            .oneshot(
                Request::get("/api/products?category=pain-relief")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        let products = body.as_array().unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0]["slug"], "ibuprofen");
        assert_eq!(products[0]["basePriceCents"], 1000);
        assert_eq!(products[0]["variants"][0]["priceCents"], 1000);
        assert_eq!(products[0]["category"]["slug"], "pain-relief");
    }

    #[tokio::test]
    async fn test_address_crud_flow() {
        let (app, _db, _variant) = test_app().await;
        let token = token_for("user-1");

        let create_body = json!({
            "name": "Alex Morgan",
            "street": "12 High Street",
            "city": "London",
            "postcode": "SW1A 1AA",
            "phone": "07700900123",
            "isDefault": true,
        })
        .to_string();

        let response = app
            .clone()
            .oneshot(
                Request::post("/api/addresses")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(create_body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = json_body(response).await;
        assert_eq!(created["isDefault"], true);
        assert_eq!(created["country"], "United Kingdom");
        let id = created["id"].as_str().unwrap().to_string();

        // someone else cannot delete it
        let other_token = token_for("user-2");
        let response = app
            .clone()
            .oneshot(
                Request::delete(format!("/api/addresses/{id}"))
                    .header(header::AUTHORIZATION, format!("Bearer {other_token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        // the owner can
        let response = app
            .oneshot(
                Request::delete(format!("/api/addresses/{id}"))
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_validation_error_is_400() {
        let (app, _db, _variant) = test_app().await;
        let token = token_for("user-1");

        let bad_address = json!({
            "name": "A",
            "street": "12 High Street",
            "city": "London",
            "postcode": "SW1A 1AA",
            "phone": "07700900123",
        })
        .to_string();

        let response = app
            .oneshot(
                Request::post("/api/addresses")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(bad_address))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }
}
