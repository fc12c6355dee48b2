//! End-to-end API tests: the real router over an in-memory SQLite
//! database, driven with `tower::ServiceExt::oneshot`. Tokens are minted
//! locally with the test secret, standing in for the identity provider.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt;

use dukan_db::{Database, DbConfig};
use dukan_server::auth::Claims;
use dukan_server::config::ServerConfig;
use dukan_server::{build_router, AppState};

const TEST_SECRET: &str = "test-secret";

async fn test_app() -> (Router, Arc<AppState>) {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let state = Arc::new(AppState {
        db,
        config: ServerConfig {
            port: 0,
            database_path: ":memory:".to_string(),
            jwt_secret: TEST_SECRET.to_string(),
            deduct_stock_on_sale: false,
        },
    });
    (build_router(state.clone()), state)
}

fn mint_token(user_id: &str) -> String {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user_id.to_string(),
        name: Some("Test User".to_string()),
        email: None,
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

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Creates a shop for the user and returns its id.
async fn create_shop(app: &Router, token: &str, name: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/shop",
        Some(token),
        Some(json!({ "shopName": name })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

async fn create_product(app: &Router, token: &str, name: &str, price: i64) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/products",
        Some(token),
        Some(json!({
            "name": name,
            "sellingPriceCents": price,
            "costPriceCents": price / 2,
            "currentStock": 50,
            "minimumStock": 5
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

async fn create_customer(app: &Router, token: &str, name: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/customers",
        Some(token),
        Some(json!({ "name": name })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

// =============================================================================
// Auth & health
// =============================================================================

#[tokio::test]
async fn health_needs_no_token() {
    let (app, _) = test_app().await;
    let (status, body) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], true);
}

#[tokio::test]
async fn protected_routes_reject_missing_and_bad_tokens() {
    let (app, _) = test_app().await;

    let (status, body) = send(&app, "GET", "/api/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, _) = send(&app, "GET", "/api/shop", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn me_returns_token_identity() {
    let (app, _) = test_app().await;
    let token = mint_token("user-1");

    let (status, body) = send(&app, "GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["userId"], "user-1");
    assert_eq!(body["name"], "Test User");

    let (status, body) = send(&app, "POST", "/api/auth/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

// =============================================================================
// Shop
// =============================================================================

#[tokio::test]
async fn shop_lifecycle_and_duplicate_conflict() {
    let (app, _) = test_app().await;
    let token = mint_token("user-1");

    // No shop yet
    let (status, _) = send(&app, "GET", "/api/shop", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    create_shop(&app, &token, "Test Shop").await;

    let (status, body) = send(&app, "GET", "/api/shop", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Test Shop");

    // Second create conflicts and leaves the first shop untouched
    let (status, body) = send(
        &app,
        "POST",
        "/api/shop",
        Some(&token),
        Some(json!({ "shopName": "Another Shop" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");

    let (_, body) = send(&app, "GET", "/api/shop", Some(&token), None).await;
    assert_eq!(body["name"], "Test Shop");

    // Partial update
    let (status, body) = send(
        &app,
        "PATCH",
        "/api/shop",
        Some(&token),
        Some(json!({ "shopPhone": "0300-0000000" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Test Shop");
    assert_eq!(body["phone"], "0300-0000000");
}

// =============================================================================
// Products & ownership
// =============================================================================

#[tokio::test]
async fn product_create_validates_input() {
    let (app, _) = test_app().await;
    let token = mint_token("user-1");
    create_shop(&app, &token, "Test Shop").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/products",
        Some(&token),
        Some(json!({ "name": "", "sellingPriceCents": 100 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, _) = send(
        &app,
        "POST",
        "/api/products",
        Some(&token),
        Some(json!({ "name": "Sugar", "sellingPriceCents": -1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn cross_shop_access_is_forbidden() {
    let (app, _) = test_app().await;
    let token_a = mint_token("user-a");
    let token_b = mint_token("user-b");

    create_shop(&app, &token_a, "Shop A").await;
    let product_a = create_product(&app, &token_a, "Sugar", 15000).await;
    let customer_a = create_customer(&app, &token_a, "Customer A").await;

    create_shop(&app, &token_b, "Shop B").await;

    // Reads and writes on foreign ids both fail FORBIDDEN
    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/products/{product_a}"),
        Some(&token_b),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");

    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/api/products/{product_a}"),
        Some(&token_b),
        Some(json!({ "currentStock": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/api/customers/{customer_a}"),
        Some(&token_b),
        Some(json!({ "name": "Hijacked" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

// =============================================================================
// Sales
// =============================================================================

#[tokio::test]
async fn cash_sale_scenario() {
    let (app, _) = test_app().await;
    let token = mint_token("user-1");
    create_shop(&app, &token, "Test Shop").await;
    create_customer(&app, &token, "Test Customer").await;
    let product = create_product(&app, &token, "Test Product", 15000).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/sales",
        Some(&token),
        Some(json!({
            "paymentMethod": "cash",
            "totalCents": 15000,
            "paidCents": 15000,
            "debtCents": 0,
            "items": [{
                "productId": product,
                "quantity": 1,
                "unitPriceCents": 15000,
                "lineTotalCents": 15000
            }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["totalCents"], 15000);
    assert_eq!(body["paymentMethod"], "cash");
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    let sale_id = body["id"].as_str().unwrap().to_string();

    // The sale appears in the subsequent list
    let (status, body) = send(&app, "GET", "/api/sales", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body
        .as_array()
        .unwrap()
        .iter()
        .any(|s| s["id"] == sale_id.as_str()));

    // And reads back with its items
    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/sales/{sale_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"][0]["lineTotalCents"], 15000);
}

#[tokio::test]
async fn credit_sale_scenario_grows_customer_debt() {
    let (app, _) = test_app().await;
    let token = mint_token("user-1");
    create_shop(&app, &token, "Test Shop").await;
    let customer = create_customer(&app, &token, "Test Customer").await;
    let product = create_product(&app, &token, "Test Product", 15000).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/sales",
        Some(&token),
        Some(json!({
            "customerId": customer,
            "paymentMethod": "credit",
            "totalCents": 30000,
            "paidCents": 0,
            "debtCents": 30000,
            "items": [{
                "productId": product,
                "quantity": 2,
                "unitPriceCents": 15000,
                "lineTotalCents": 30000
            }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["debtCents"], 30000);

    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/customers/{customer}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body["totalDebtCents"], 30000);
}

#[tokio::test]
async fn sale_invariants_are_enforced() {
    let (app, _) = test_app().await;
    let token = mint_token("user-1");
    create_shop(&app, &token, "Test Shop").await;
    let product = create_product(&app, &token, "Test Product", 15000).await;

    // paid + debt != total
    let (status, body) = send(
        &app,
        "POST",
        "/api/sales",
        Some(&token),
        Some(json!({
            "paymentMethod": "cash",
            "totalCents": 15000,
            "paidCents": 10000,
            "debtCents": 0,
            "items": [{
                "productId": product,
                "quantity": 1,
                "unitPriceCents": 15000,
                "lineTotalCents": 15000
            }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    // Empty item list
    let (status, _) = send(
        &app,
        "POST",
        "/api/sales",
        Some(&token),
        Some(json!({
            "paymentMethod": "cash",
            "totalCents": 0,
            "paidCents": 0,
            "debtCents": 0,
            "items": []
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn sale_create_is_idempotent_by_client_ref() {
    let (app, _) = test_app().await;
    let token = mint_token("user-1");
    create_shop(&app, &token, "Test Shop").await;
    let product = create_product(&app, &token, "Test Product", 15000).await;

    let payload = json!({
        "paymentMethod": "cash",
        "totalCents": 15000,
        "paidCents": 15000,
        "debtCents": 0,
        "clientRef": "pos-7f3a",
        "items": [{
            "productId": product,
            "quantity": 1,
            "unitPriceCents": 15000,
            "lineTotalCents": 15000
        }]
    });

    let (_, first) = send(&app, "POST", "/api/sales", Some(&token), Some(payload.clone())).await;
    let (status, second) = send(&app, "POST", "/api/sales", Some(&token), Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["id"], second["id"]);

    let (_, body) = send(&app, "GET", "/api/sales", Some(&token), None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

// =============================================================================
// Dashboard
// =============================================================================

#[tokio::test]
async fn dashboard_stats_sum_todays_sales() {
    let (app, _) = test_app().await;
    let token = mint_token("user-1");
    create_shop(&app, &token, "Test Shop").await;
    let customer = create_customer(&app, &token, "Test Customer").await;
    let product = create_product(&app, &token, "Test Product", 15000).await;

    for (method, total, paid, debt, customer_id) in [
        ("cash", 15000, 15000, 0, None),
        ("credit", 30000, 0, 30000, Some(customer.as_str())),
        ("transfer", 5000, 5000, 0, None),
    ] {
        let quantity = total / 5000;
        let mut payload = json!({
            "paymentMethod": method,
            "totalCents": total,
            "paidCents": paid,
            "debtCents": debt,
            "items": [{
                "productId": product,
                "quantity": quantity,
                "unitPriceCents": 5000,
                "lineTotalCents": total
            }]
        });
        if let Some(id) = customer_id {
            payload["customerId"] = json!(id);
        }
        let (status, _) = send(&app, "POST", "/api/sales", Some(&token), Some(payload)).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(&app, "GET", "/api/dashboard/stats", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["today"]["cashCents"], 15000);
    assert_eq!(body["today"]["creditCents"], 30000);
    // The transfer bucket is its own figure, never folded into cash
    assert_eq!(body["today"]["transferCents"], 5000);
    assert_eq!(body["today"]["totalCents"], 50000);
    assert_eq!(body["today"]["transactions"], 3);
    assert_eq!(body["monthlySalesCents"], 50000);

    // A date with no sales reports zeros
    let (status, body) = send(
        &app,
        "GET",
        "/api/dashboard/stats?date=2020-01-15",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["today"]["totalCents"], 0);
    assert_eq!(body["monthlySalesCents"], 0);
}

#[tokio::test]
async fn dashboard_degrades_to_zeros_when_store_is_down() {
    let (app, state) = test_app().await;
    let token = mint_token("user-1");
    create_shop(&app, &token, "Test Shop").await;

    state.db.close().await;

    let (status, body) = send(&app, "GET", "/api/dashboard/stats", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["today"]["totalCents"], 0);
    assert_eq!(body["today"]["transactions"], 0);
    assert_eq!(body["monthlySalesCents"], 0);

    let (status, body) = send(&app, "GET", "/api/dashboard/insights", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["lowStock"].as_array().unwrap().len(), 0);

    // Lists degrade to empty as well
    let (status, body) = send(&app, "GET", "/api/products", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn sub_resource_lists_degrade_when_store_is_down() {
    let (app, state) = test_app().await;
    let token = mint_token("user-1");
    create_shop(&app, &token, "Test Shop").await;
    let product = create_product(&app, &token, "Sugar", 15000).await;
    let customer = create_customer(&app, &token, "Test Customer").await;

    state.db.close().await;

    for uri in [
        format!("/api/products/{product}/price-history"),
        format!("/api/customers/{customer}/debt-payments"),
        "/api/daily-close/history".to_string(),
    ] {
        let (status, body) = send(&app, "GET", &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(body.as_array().unwrap().len(), 0, "{uri}");
    }
}

#[tokio::test]
async fn dashboard_insights_rank_stock_debt_and_sellers() {
    let (app, _) = test_app().await;
    let token = mint_token("user-1");
    create_shop(&app, &token, "Test Shop").await;
    let customer = create_customer(&app, &token, "Big Debtor").await;
    let product = create_product(&app, &token, "Tea", 5000).await;

    // Push the product to the low-stock threshold (minimum is 5)
    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/api/products/{product}"),
        Some(&token),
        Some(json!({ "currentStock": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // A credit sale makes the customer a debtor and the product a seller
    let (status, _) = send(
        &app,
        "POST",
        "/api/sales",
        Some(&token),
        Some(json!({
            "customerId": customer,
            "paymentMethod": "credit",
            "totalCents": 20000,
            "paidCents": 0,
            "debtCents": 20000,
            "items": [{
                "productId": product,
                "quantity": 4,
                "unitPriceCents": 5000,
                "lineTotalCents": 20000
            }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, "GET", "/api/dashboard/insights", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["lowStock"][0]["product"]["name"], "Tea");
    assert_eq!(body["lowStock"][0]["level"], "critical");
    assert_eq!(body["topDebtors"][0]["name"], "Big Debtor");
    assert_eq!(body["topSelling"][0]["productName"], "Tea");
    assert_eq!(body["topSelling"][0]["quantitySold"], 4);
}

// =============================================================================
// Price history
// =============================================================================

#[tokio::test]
async fn price_change_is_atomic_and_stale_changes_conflict() {
    let (app, _) = test_app().await;
    let token = mint_token("user-1");
    create_shop(&app, &token, "Test Shop").await;
    let product = create_product(&app, &token, "Sugar", 15000).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/products/{product}/price-history"),
        Some(&token),
        Some(json!({ "oldPriceCents": 15000, "newPriceCents": 16000 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["changedBy"], "user-1");

    // The product's live price moved with the history
    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/products/{product}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body["sellingPriceCents"], 16000);

    // Replaying the old figure is a stale change
    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/products/{product}/price-history"),
        Some(&token),
        Some(json!({ "oldPriceCents": 15000, "newPriceCents": 17000 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");

    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/products/{product}/price-history"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

// =============================================================================
// Debt payments
// =============================================================================

#[tokio::test]
async fn debt_payment_flow_and_overpay_rejection() {
    let (app, _) = test_app().await;
    let token = mint_token("user-1");
    create_shop(&app, &token, "Test Shop").await;
    let customer = create_customer(&app, &token, "Test Customer").await;
    let product = create_product(&app, &token, "Test Product", 15000).await;

    // Credit sale: 30000 of debt
    let (status, _) = send(
        &app,
        "POST",
        "/api/sales",
        Some(&token),
        Some(json!({
            "customerId": customer,
            "paymentMethod": "credit",
            "totalCents": 30000,
            "paidCents": 0,
            "debtCents": 30000,
            "items": [{
                "productId": product,
                "quantity": 2,
                "unitPriceCents": 15000,
                "lineTotalCents": 30000
            }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Overpay is rejected
    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/customers/{customer}/debt-payments"),
        Some(&token),
        Some(json!({ "paidCents": 50000 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    // A partial settlement moves the ledger
    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/customers/{customer}/debt-payments"),
        Some(&token),
        Some(json!({ "paidCents": 10000, "method": "cash" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["paidCents"], 10000);
    assert_eq!(body["debtCents"], 20000);

    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/customers/{customer}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body["totalDebtCents"], 20000);
    assert_eq!(body["totalPaidCents"], 10000);

    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/customers/{customer}/debt-payments"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn debt_payment_rejects_foreign_sale_reference() {
    let (app, _) = test_app().await;
    let token_a = mint_token("user-a");
    let token_b = mint_token("user-b");

    // Shop A records a cash sale
    create_shop(&app, &token_a, "Shop A").await;
    let product_a = create_product(&app, &token_a, "Sugar", 15000).await;
    let (status, sale_a) = send(
        &app,
        "POST",
        "/api/sales",
        Some(&token_a),
        Some(json!({
            "paymentMethod": "cash",
            "totalCents": 15000,
            "paidCents": 15000,
            "debtCents": 0,
            "items": [{
                "productId": product_a,
                "quantity": 1,
                "unitPriceCents": 15000,
                "lineTotalCents": 15000
            }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Shop B's customer carries debt from a credit sale
    create_shop(&app, &token_b, "Shop B").await;
    let customer_b = create_customer(&app, &token_b, "Customer B").await;
    let product_b = create_product(&app, &token_b, "Tea", 10000).await;
    let (status, _) = send(
        &app,
        "POST",
        "/api/sales",
        Some(&token_b),
        Some(json!({
            "customerId": customer_b,
            "paymentMethod": "credit",
            "totalCents": 10000,
            "paidCents": 0,
            "debtCents": 10000,
            "items": [{
                "productId": product_b,
                "quantity": 1,
                "unitPriceCents": 10000,
                "lineTotalCents": 10000
            }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Settling against shop A's sale is forbidden
    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/customers/{customer_b}/debt-payments"),
        Some(&token_b),
        Some(json!({ "paidCents": 5000, "saleId": sale_a["id"] })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");

    // A sale id that does not exist is 404
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/customers/{customer_b}/debt-payments"),
        Some(&token_b),
        Some(json!({ "paidCents": 5000, "saleId": "no-such-sale" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // And the customer's debt is untouched by the failed attempts
    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/customers/{customer_b}"),
        Some(&token_b),
        None,
    )
    .await;
    assert_eq!(body["totalDebtCents"], 10000);
}

// =============================================================================
// Daily close
// =============================================================================

#[tokio::test]
async fn daily_close_once_per_day() {
    let (app, _) = test_app().await;
    let token = mint_token("user-1");
    create_shop(&app, &token, "Test Shop").await;

    let payload = json!({
        "totalSalesCents": 52000,
        "totalCashCents": 20000,
        "totalCreditCents": 30000,
        "transactionCount": 4,
        "notes": "drawer balanced"
    });

    let (status, body) = send(&app, "POST", "/api/daily-close", Some(&token), Some(payload.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["closedBy"], "user-1");

    // Same calendar day: conflict
    let (status, body) = send(&app, "POST", "/api/daily-close", Some(&token), Some(payload)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");

    // Today's close is found by the day window
    let (status, body) = send(&app, "GET", "/api/daily-close", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalSalesCents"], 52000);

    // A day with no close is 404
    let (status, _) = send(
        &app,
        "GET",
        "/api/daily-close?date=2020-01-15",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(&app, "GET", "/api/daily-close/history", Some(&token), None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}
