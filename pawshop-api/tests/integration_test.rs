/// Integration tests for the pawshop API
///
/// These drive the full router against a real PostgreSQL database:
/// - cart upsert accumulation and idempotent removal
/// - order placement row counts, price snapshots, and cart drain
/// - login error uniformity and session issuance
/// - password-reset anti-enumeration and token expiry
/// - payment verification terminality
///
/// Every test is `#[ignore]`d because it needs `DATABASE_URL`; run with
/// `cargo test -- --ignored` against a disposable database.

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use common::TestContext;
use serde_json::{json, Value};
use tower::Service as _;

use pawshop_shared::auth::reset_token::hash_reset_token;
use pawshop_shared::models::cart_item::CartItem;
use pawshop_shared::models::payment::{Payment, PaymentStatus};
use pawshop_shared::models::reset_token::PasswordResetToken;
use pawshop_shared::models::user::User;

async fn send(ctx: &TestContext, request: Request<Body>) -> (StatusCode, Value) {
    let response = ctx.app.clone().call(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn json_request(ctx: &TestContext, method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::COOKIE, &ctx.session_cookie)
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn test_cart_add_twice_accumulates() {
    let ctx = TestContext::new().await.unwrap();
    let (_, product_id) = common::seed_product(&ctx.db, "10.00").await.unwrap();

    let (status, _) = send(
        &ctx,
        json_request(&ctx, "POST", "/api/cart", json!({ "product_id": product_id, "quantity": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(
        &ctx,
        json_request(&ctx, "POST", "/api/cart", json!({ "product_id": product_id, "quantity": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let lines = CartItem::list(&ctx.db, ctx.user.user_id).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].quantity, 5);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn test_cart_set_missing_pair_is_404_and_bad_quantity_is_400() {
    let ctx = TestContext::new().await.unwrap();
    let (_, product_id) = common::seed_product(&ctx.db, "10.00").await.unwrap();

    let (status, _) = send(
        &ctx,
        json_request(&ctx, "PUT", "/api/cart", json!({ "product_id": product_id, "quantity": 4 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    for quantity in [json!(0), json!(-3), json!("2")] {
        let (status, _) = send(
            &ctx,
            json_request(
                &ctx,
                "PUT",
                "/api/cart",
                json!({ "product_id": product_id, "quantity": quantity }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn test_cart_remove_is_idempotent() {
    let ctx = TestContext::new().await.unwrap();
    let (_, product_id) = common::seed_product(&ctx.db, "10.00").await.unwrap();

    send(
        &ctx,
        json_request(&ctx, "POST", "/api/cart", json!({ "product_id": product_id, "quantity": 1 })),
    )
    .await;

    for _ in 0..2 {
        let (status, body) = send(
            &ctx,
            json_request(&ctx, "DELETE", "/api/cart", json!({ "product_id": product_id })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], json!(true));
    }

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn test_cart_requires_session_with_403() {
    let ctx = TestContext::new().await.unwrap();

    let request = Request::builder()
        .method("GET")
        .uri("/api/cart")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(&ctx, request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], json!(false));

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn test_place_order_snapshots_prices_and_drains_cart() {
    let ctx = TestContext::new().await.unwrap();
    let (_, product_id) = common::seed_product(&ctx.db, "10.00").await.unwrap();

    send(
        &ctx,
        json_request(&ctx, "POST", "/api/cart", json!({ "product_id": product_id, "quantity": 5 })),
    )
    .await;

    // The client-supplied price is ignored; the catalog price wins.
    let (status, body) = send(
        &ctx,
        json_request(
            &ctx,
            "POST",
            "/api/order/place-order",
            json!({
                "user_id": ctx.user.user_id,
                "address": { "line1": "12 Bark Street", "city": "Dogville" },
                "payment_method": "COD",
                "currency": "INR",
                "cart_items": [{ "product_id": product_id, "quantity": 5, "price": "0.01" }],
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));

    let payment_id = body["payment_id"].as_i64().unwrap();
    let payment = Payment::find_by_id(&ctx.db, payment_id).await.unwrap().unwrap();
    assert_eq!(payment.payment_status, PaymentStatus::Pending);
    assert_eq!(payment.amount.to_string(), "50.00");

    let items = Payment::order_items(&ctx.db, payment_id).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, 5);
    assert_eq!(items[0].price.to_string(), "10.00");

    let remaining = CartItem::list(&ctx.db, ctx.user.user_id).await.unwrap();
    assert!(remaining.is_empty());

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn test_place_order_rejects_unknown_product() {
    let ctx = TestContext::new().await.unwrap();

    let (status, _) = send(
        &ctx,
        json_request(
            &ctx,
            "POST",
            "/api/order/place-order",
            json!({
                "user_id": ctx.user.user_id,
                "address": {},
                "payment_method": "COD",
                "currency": "INR",
                "cart_items": [{ "product_id": 999_999_999, "quantity": 1 }],
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn test_login_error_shape_is_uniform() {
    let ctx = TestContext::new().await.unwrap();

    let (wrong_pw_status, wrong_pw_body) = send(
        &ctx,
        json_request(
            &ctx,
            "POST",
            "/api/auth/login",
            json!({ "email": ctx.user.email, "password": "wrong" }),
        ),
    )
    .await;

    let (unknown_status, unknown_body) = send(
        &ctx,
        json_request(
            &ctx,
            "POST",
            "/api/auth/login",
            json!({ "email": "nobody@example.com", "password": "wrong" }),
        ),
    )
    .await;

    assert_eq!(wrong_pw_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_pw_body, unknown_body);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn test_login_success_returns_role_and_cookie() {
    let ctx = TestContext::new().await.unwrap();

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "email": ctx.user.email, "password": common::TEST_PASSWORD }).to_string(),
        ))
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("login must set the session cookie")
        .to_str()
        .unwrap()
        .to_string();
    assert!(set_cookie.contains("pawshop_session="));
    assert!(set_cookie.contains("HttpOnly"));

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["user"]["role"], json!("user"));

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn test_request_reset_does_not_reveal_unknown_emails() {
    let ctx = TestContext::new().await.unwrap();

    let unknown = common::unique_email();
    let (status, body) = send(
        &ctx,
        json_request(&ctx, "POST", "/api/request-reset", json!({ "email": unknown })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));

    // No token row may be written for an unknown address.
    let (count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM password_reset_tokens t
         JOIN users u ON u.user_id = t.user_id WHERE u.email = $1",
    )
    .bind(&unknown)
    .fetch_one(&ctx.db)
    .await
    .unwrap();
    assert_eq!(count, 0);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn test_reset_with_expired_token_never_mutates_password() {
    let ctx = TestContext::new().await.unwrap();

    // Plant an already-expired token row directly.
    let token = "aa".repeat(32);
    PasswordResetToken::upsert(&ctx.db, ctx.user.user_id, &hash_reset_token(&token), 0)
        .await
        .unwrap();

    let (status, _) = send(
        &ctx,
        json_request(
            &ctx,
            "POST",
            "/api/reset-password",
            json!({ "token": token, "new_password": "brand-new-password" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let user = User::find_by_id(&ctx.db, ctx.user.user_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.password_hash, ctx.user.password_hash);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn test_verify_payment_mismatch_marks_failed_with_http_200() {
    let ctx = TestContext::new().await.unwrap();

    let gateway_order_id = format!("order_{:08x}", rand::random::<u32>());
    Payment::create_for_gateway(
        &ctx.db,
        ctx.user.user_id,
        "500.00".parse().unwrap(),
        "INR",
        &gateway_order_id,
    )
    .await
    .unwrap();

    let (status, body) = send(
        &ctx,
        json_request(
            &ctx,
            "POST",
            "/api/payment/verify",
            json!({
                "order_id": gateway_order_id,
                "payment_id": "pay_123",
                "signature": "00".repeat(32),
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(false));

    let payment = Payment::find_by_gateway_order_id(&ctx.db, &gateway_order_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(payment.payment_status, PaymentStatus::Failed);

    // Terminal: a later valid-looking callback must not resurrect it.
    let changed = Payment::mark_paid(&ctx.db, &gateway_order_id, "pay_123", "sig")
        .await
        .unwrap();
    assert!(!changed);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn test_verify_payment_match_marks_paid() {
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    let ctx = TestContext::new().await.unwrap();

    let gateway_order_id = format!("order_{:08x}", rand::random::<u32>());
    Payment::create_for_gateway(
        &ctx.db,
        ctx.user.user_id,
        "500.00".parse().unwrap(),
        "INR",
        &gateway_order_id,
    )
    .await
    .unwrap();

    let mut mac = Hmac::<Sha256>::new_from_slice(common::GATEWAY_SECRET.as_bytes()).unwrap();
    mac.update(format!("{}|pay_456", gateway_order_id).as_bytes());
    let signature = hex::encode(mac.finalize().into_bytes());

    let (status, body) = send(
        &ctx,
        json_request(
            &ctx,
            "POST",
            "/api/payment/verify",
            json!({
                "order_id": gateway_order_id,
                "payment_id": "pay_456",
                "signature": signature,
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));

    let payment = Payment::find_by_gateway_order_id(&ctx.db, &gateway_order_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(payment.payment_status, PaymentStatus::Paid);
    assert_eq!(payment.gateway_payment_id.as_deref(), Some("pay_456"));

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn test_signup_conflict_on_duplicate_email() {
    let ctx = TestContext::new().await.unwrap();
    let email = common::unique_email();

    let body = json!({ "username": "dup", "email": email, "password": "pw123456" });

    let (first, _) = send(&ctx, json_request(&ctx, "POST", "/api/auth/signup", body.clone())).await;
    assert_eq!(first, StatusCode::CREATED);

    let (second, _) = send(&ctx, json_request(&ctx, "POST", "/api/auth/signup", body)).await;
    assert_eq!(second, StatusCode::CONFLICT);

    sqlx::query("DELETE FROM users WHERE email = $1")
        .bind(&email)
        .execute(&ctx.db)
        .await
        .unwrap();
    ctx.cleanup().await.unwrap();
}
