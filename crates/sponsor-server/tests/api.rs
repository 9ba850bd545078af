//! Route tests against the in-memory backend

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sponsor_server::storage::MemoryStorage;
use sponsor_server::{build_router, AppState, ServerConfig};
use std::sync::Arc;
use tower::ServiceExt;

fn app_with(config: ServerConfig) -> Router {
    let state = AppState::new(Arc::new(MemoryStorage::new()), &config);
    build_router(state, None)
}

fn app() -> Router {
    app_with(ServerConfig {
        admin_telegram_id: Some("42".to_string()),
        ..Default::default()
    })
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn login(app: &Router, telegram_id: &str, username: &str) -> Value {
    let (status, user) = send(
        app,
        Method::POST,
        "/api/auth/telegram",
        Some(json!({
            "telegramId": telegram_id,
            "username": username,
            "firstName": "Test",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    user
}

fn listing(title: &str) -> Value {
    json!({
        "title": title,
        "description": "Promote our app",
        "budgetMin": 15000,
        "budgetMax": 30000,
        "minFollowers": 5000,
        "category": "Fitness",
        "deadline": (Utc::now() + Duration::days(7)).to_rfc3339(),
    })
}

async fn create_listing(app: &Router, title: &str) -> Value {
    let (status, body) = send(app, Method::POST, "/api/sponsorships", Some(listing(title))).await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send(&app(), Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["storage"], "memory");
}

#[tokio::test]
async fn test_telegram_login_is_idempotent() {
    let app = app();
    let first = login(&app, "111", "alice").await;
    let second = login(&app, "111", "alice").await;

    assert_eq!(first["id"], second["id"]);
    assert_eq!(first["isAdmin"], false);

    let admin = login(&app, "42", "boss").await;
    assert_eq!(admin["isAdmin"], true);
    assert_ne!(admin["id"], first["id"]);
}

#[tokio::test]
async fn test_login_rejects_missing_fields() {
    let (status, body) = send(
        &app(),
        Method::POST,
        "/api/auth/telegram",
        Some(json!({"telegramId": "111"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["message"].is_string());

    let (status, body) = send(
        &app(),
        Method::POST,
        "/api/auth/telegram",
        Some(json!({"telegramId": "", "username": "a", "firstName": "A"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("telegramId"));
}

#[tokio::test]
async fn test_user_get_and_patch() {
    let app = app();
    let user = login(&app, "111", "alice").await;
    let uri = format!("/api/user/{}", user["id"]);

    let (status, body) = send(
        &app,
        Method::PATCH,
        &uri,
        Some(json!({"email": "alice@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "alice@example.com");
    assert_eq!(body["username"], "alice");

    let (status, fetched) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, body);

    // immutable and unknown fields are refused
    let (status, _) = send(&app, Method::PATCH, &uri, Some(json!({"isAdmin": true}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = send(&app, Method::GET, "/api/user/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User not found");
}

#[tokio::test]
async fn test_bad_path_ids() {
    let app = app();
    let (status, _) = send(&app, Method::GET, "/api/user/0", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, Method::GET, "/api/user/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_closed_listing_leaves_browse_list() {
    let app = app();
    let created = create_listing(&app, "FitTrack").await;
    assert_eq!(created["isActive"], true);

    let (_, active) = send(&app, Method::GET, "/api/sponsorships", None).await;
    assert_eq!(active.as_array().unwrap().len(), 1);

    let (status, closed) = send(
        &app,
        Method::PATCH,
        &format!("/api/sponsorships/{}", created["id"]),
        Some(json!({"isActive": false})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(closed["isActive"], false);
    assert_eq!(closed["title"], created["title"]);

    let (_, active) = send(&app, Method::GET, "/api/sponsorships", None).await;
    assert!(active.as_array().unwrap().is_empty());

    // still reachable directly
    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/api/sponsorship/{}", created["id"]),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_listing_budget_rules() {
    let app = app();
    let mut inverted = listing("Bad");
    inverted["budgetMin"] = json!(50000);
    let (status, body) = send(&app, Method::POST, "/api/sponsorships", Some(inverted)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("budgetMax"));

    // a patch may not invert the stored bounds either
    let created = create_listing(&app, "Good").await;
    let (status, _) = send(
        &app,
        Method::PATCH,
        &format!("/api/sponsorships/{}", created["id"]),
        Some(json!({"budgetMax": 100})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, unchanged) = send(
        &app,
        Method::GET,
        &format!("/api/sponsorship/{}", created["id"]),
        None,
    )
    .await;
    assert_eq!(unchanged["budgetMax"], 30000);
}

#[tokio::test]
async fn test_platform_verification_flow() {
    let app = app();
    let user = login(&app, "111", "alice").await;

    let (status, link) = send(
        &app,
        Method::POST,
        "/api/platforms",
        Some(json!({
            "userId": user["id"],
            "platformType": "youtube",
            "username": "x",
            "followerCount": 1000,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(link["isVerified"], false);
    let code = link["verificationCode"].as_str().unwrap();
    assert_eq!(code.len(), 8);
    assert!(code
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));

    let (_, pending) = send(&app, Method::GET, "/api/platforms/pending", None).await;
    assert_eq!(pending.as_array().unwrap().len(), 1);

    let (status, verified) = send(
        &app,
        Method::PATCH,
        &format!("/api/platforms/{}", link["id"]),
        Some(json!({"isVerified": true})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(verified["isVerified"], true);
    assert_eq!(verified["verificationCode"], link["verificationCode"]);

    let (_, pending) = send(&app, Method::GET, "/api/platforms/pending", None).await;
    assert!(pending.as_array().unwrap().is_empty());

    let (_, mine) = send(
        &app,
        Method::GET,
        &format!("/api/platforms/user/{}", user["id"]),
        None,
    )
    .await;
    assert_eq!(mine.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_platform_code_cannot_be_supplied() {
    let app = app();
    let user = login(&app, "111", "alice").await;
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/platforms",
        Some(json!({
            "userId": user["id"],
            "platformType": "instagram",
            "username": "x",
            "followerCount": 1,
            "verificationCode": "AAAAAAAA",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/platforms",
        Some(json!({
            "userId": 999,
            "platformType": "instagram",
            "username": "x",
            "followerCount": 1,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_application_review() {
    let app = app();
    let user = login(&app, "111", "alice").await;
    let listing = create_listing(&app, "FitTrack").await;

    let (status, application) = send(
        &app,
        Method::POST,
        "/api/applications",
        Some(json!({
            "userId": user["id"],
            "sponsorshipId": listing["id"],
            "platformType": "instagram",
            "platformUsername": "alice_ig",
            "followerCount": 8000,
            "category": "Fitness",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(application["status"], "pending");

    let (_, pending) = send(&app, Method::GET, "/api/applications/pending", None).await;
    assert_eq!(pending.as_array().unwrap().len(), 1);

    let uri = format!("/api/applications/{}", application["id"]);
    let (status, approved) = send(&app, Method::PATCH, &uri, Some(json!({"status": "approved"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approved["status"], "approved");

    let (_, pending) = send(&app, Method::GET, "/api/applications/pending", None).await;
    assert!(pending.as_array().unwrap().is_empty());

    // decisions are final
    let (status, _) = send(&app, Method::PATCH, &uri, Some(json!({"status": "rejected"}))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, mine) = send(
        &app,
        Method::GET,
        &format!("/api/applications/user/{}", user["id"]),
        None,
    )
    .await;
    assert_eq!(mine[0]["status"], "approved");
}

#[tokio::test]
async fn test_quick_apply() {
    let app = app();
    let user = login(&app, "111", "alice").await;
    let listing = create_listing(&app, "GlowUp").await;

    let form = json!({
        "userId": user["id"],
        "sponsorshipId": listing["id"],
        "platform": "youtube",
        "username": "alice_yt",
        "followerCount": 12000,
        "category": "Beauty",
        "message": "",
    });
    let (status, body) = send(&app, Method::POST, "/api/apply", Some(form.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["application"]["platformType"], "youtube");
    assert_eq!(body["application"]["platformUsername"], "alice_yt");
    assert!(body["application"]["message"].is_null());

    // closed listings stop taking applications
    send(
        &app,
        Method::PATCH,
        &format!("/api/sponsorships/{}", listing["id"]),
        Some(json!({"isActive": false})),
    )
    .await;
    let (status, _) = send(&app, Method::POST, "/api/apply", Some(form.clone())).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let mut unknown = form;
    unknown["sponsorshipId"] = json!(999);
    let (status, body) = send(&app, Method::POST, "/api/apply", Some(unknown)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Sponsorship not found");
}

/// Two reviewers deciding at once: one wins, the other sees the decision
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_reviews_and_budget_edits() {
    let app = app();
    let user = login(&app, "111", "alice").await;

    for _ in 0..10 {
        let listing = create_listing(&app, "FitTrack").await;
        let (_, application) = send(
            &app,
            Method::POST,
            "/api/apply",
            Some(json!({
                "userId": user["id"],
                "sponsorshipId": listing["id"],
                "platform": "youtube",
                "username": "alice_yt",
                "followerCount": 12000,
                "category": "Fitness",
            })),
        )
        .await;
        let app_uri = format!("/api/applications/{}", application["application"]["id"]);
        let listing_uri = format!("/api/sponsorships/{}", listing["id"]);

        let patch = |uri: String, body: Value| {
            let app = app.clone();
            tokio::spawn(async move { send(&app, Method::PATCH, &uri, Some(body)).await })
        };
        let approve = patch(app_uri.clone(), json!({"status": "approved"}));
        let reject = patch(app_uri.clone(), json!({"status": "rejected"}));
        let raise_min = patch(listing_uri.clone(), json!({"budgetMin": 25000}));
        let lower_max = patch(listing_uri.clone(), json!({"budgetMax": 20000}));

        let mut review = [approve.await.unwrap().0, reject.await.unwrap().0];
        review.sort();
        assert_eq!(review, [StatusCode::OK, StatusCode::CONFLICT]);

        let mut budget = [raise_min.await.unwrap().0, lower_max.await.unwrap().0];
        budget.sort();
        assert_eq!(budget, [StatusCode::OK, StatusCode::BAD_REQUEST]);

        let stored_uri = format!("/api/sponsorship/{}", listing["id"]);
        let (_, stored) = send(&app, Method::GET, &stored_uri, None).await;
        let (min, max) = (stored["budgetMin"].as_i64(), stored["budgetMax"].as_i64());
        assert!(min.unwrap() <= max.unwrap(), "{}", stored);
        assert_eq!(stored["title"], listing["title"]);
    }
}

#[tokio::test]
async fn test_payment_methods() {
    let app = app();
    let user = login(&app, "111", "alice").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/payment-methods",
        Some(json!({
            "userId": user["id"],
            "type": "bank",
            "upiId": "alice@okbank",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());

    let (status, upi) = send(
        &app,
        Method::POST,
        "/api/payment-methods",
        Some(json!({
            "userId": user["id"],
            "type": "upi_id",
            "upiId": "alice@okbank",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(upi["type"], "upi_id");
    assert_eq!(upi["isActive"], true);

    let uri = format!("/api/payment-methods/{}", upi["id"]);
    // clearing the only field its type needs is refused
    let (status, _) = send(&app, Method::PATCH, &uri, Some(json!({"upiId": null}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, retired) = send(&app, Method::PATCH, &uri, Some(json!({"isActive": false}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(retired["isActive"], false);

    let (_, mine) = send(
        &app,
        Method::GET,
        &format!("/api/payment-methods/user/{}", user["id"]),
        None,
    )
    .await;
    assert!(mine.as_array().unwrap().is_empty());

    let (status, phone) = send(
        &app,
        Method::POST,
        "/api/payment-methods",
        Some(json!({
            "userId": user["id"],
            "type": "upi_number",
            "upiNumber": "+91 98765 43210",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(phone["upiNumber"], "+91 98765 43210");

    let (_, all) = send(&app, Method::GET, "/api/payment-methods", None).await;
    assert_eq!(all.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_upload_without_image_host() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/upload/profile-photo")
        .header(header::CONTENT_TYPE, "multipart/form-data; boundary=X")
        .body(Body::from("--X--\r\n"))
        .unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

fn photo_upload(field: &str, content_type: &str, data: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--X\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"me.png\"\r\n\
             Content-Type: {}\r\n\r\n",
            field, content_type
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(b"\r\n--X--\r\n");

    Request::builder()
        .method(Method::POST)
        .uri("/api/upload/profile-photo")
        .header(header::CONTENT_TYPE, "multipart/form-data; boundary=X")
        .body(Body::from(body))
        .unwrap()
}

async fn spawn_image_host() -> String {
    let host = Router::new().route(
        "/upload",
        axum::routing::post(|| async {
            axum::Json(json!({"data": {"url": "https://i.example/me.png"}}))
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, host).await.unwrap();
    });
    format!("http://{}/upload", addr)
}

#[tokio::test]
async fn test_upload_profile_photo() {
    let app = app_with(ServerConfig {
        image_host_url: Some(spawn_image_host().await),
        max_upload_bytes: 1024,
        ..Default::default()
    });

    let response = app
        .clone()
        .oneshot(photo_upload("photo", "image/png", b"\x89PNG"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["url"], "https://i.example/me.png");

    let response = app
        .clone()
        .oneshot(photo_upload("photo", "text/plain", b"hello"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(photo_upload("file", "image/jpeg", &[0u8; 2048]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
