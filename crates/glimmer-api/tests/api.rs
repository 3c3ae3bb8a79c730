use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use glimmer_api::auth::AppStateInner;
use glimmer_api::router;
use glimmer_db::{MemoryStore, Repository, SqliteStore};
use tempfile::TempDir;

/// A router over a fresh store. The temp dir keeps an SQLite file alive for
/// the test's duration.
struct TestApp {
    router: axum::Router,
    _dir: Option<TempDir>,
}

impl std::ops::Deref for TestApp {
    type Target = axum::Router;

    fn deref(&self) -> &axum::Router {
        &self.router
    }
}

fn test_app(store: Arc<dyn Repository>, dir: Option<TempDir>) -> TestApp {
    TestApp {
        router: router(AppStateInner::new(store)),
        _dir: dir,
    }
}

/// One app per store implementation.
fn backends() -> Vec<TestApp> {
    let dir = tempfile::tempdir().unwrap();
    let sqlite = SqliteStore::open(&dir.path().join("glimmer.db")).unwrap();
    vec![
        test_app(Arc::new(MemoryStore::new()), None),
        test_app(Arc::new(sqlite), Some(dir)),
    ]
}

/// Send a request to `app` and return (status, parsed JSON body).
async fn send(app: &axum::Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn login(app: &axum::Router, phone: &str) -> Value {
    let (status, body) = send(app, "POST", "/api/auth/login", Some(json!({ "phone": phone }))).await;
    assert_eq!(status, StatusCode::OK);
    body["user"].clone()
}

#[tokio::test]
async fn login_creates_user_with_welcome_bonus_once() {
    for app in backends() {
        let user = login(&app, "9998887776").await;
        assert_eq!(user["coinBalance"], 100);
        assert_eq!(user["username"], "User7776");
        assert_eq!(user["isVip"], false);

        let id = user["id"].as_i64().unwrap();
        let (status, _) = send(&app, "POST", &format!("/api/user/{id}/coins"), Some(json!({ "amount": -40 }))).await;
        assert_eq!(status, StatusCode::OK);

        let again = login(&app, "9998887776").await;
        assert_eq!(again["id"], user["id"]);
        assert_eq!(again["coinBalance"], 60);
    }
}

#[tokio::test]
async fn login_requires_phone() {
    for app in backends() {
        let (status, body) = send(&app, "POST", "/api/auth/login", Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Phone number is required");

        let (status, _) = send(&app, "POST", "/api/auth/login", Some(json!({ "phone": "" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn get_user_returns_record_or_404() {
    for app in backends() {
        let user = login(&app, "5551234567").await;

        let (status, body) = send(&app, "GET", "/api/user/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, user);

        let (status, body) = send(&app, "GET", "/api/user/999", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "User not found");

        let (status, body) = send(&app, "GET", "/api/user/abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid id");
    }
}

#[tokio::test]
async fn debit_past_zero_goes_negative_and_logs_zero_amount() {
    for app in backends() {
        login(&app, "1112223333").await;

        let (status, body) = send(&app, "POST", "/api/user/1/coins", Some(json!({ "amount": -9999 }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["coinBalance"], -9899);

        let (status, body) = send(&app, "GET", "/api/user/1/transactions", None).await;
        assert_eq!(status, StatusCode::OK);
        let txs = body.as_array().unwrap();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0]["coinAmount"], -9999);
        assert_eq!(txs[0]["amount"], 0);
        assert_eq!(txs[0]["type"], "purchase");
        assert_eq!(txs[0]["description"], "Coin deduction");
    }
}

#[tokio::test]
async fn coin_adjustments_log_newest_first() {
    for app in backends() {
        login(&app, "2223334444").await;

        let (status, _) = send(&app, "POST", "/api/user/1/coins", Some(json!({ "amount": 330 }))).await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = send(
            &app,
            "POST",
            "/api/user/1/coins",
            Some(json!({ "amount": -25, "transactionType": "gift" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["coinBalance"], 405);

        let (_, body) = send(&app, "GET", "/api/user/1/transactions", None).await;
        let kinds: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["type"].as_str().unwrap())
            .collect();
        assert_eq!(kinds, vec!["gift", "purchase"]);
        assert_eq!(body[1]["amount"], 330);
        assert_eq!(body[1]["description"], "Coin purchase");
    }
}

#[tokio::test]
async fn coin_adjustment_validation() {
    for app in backends() {
        login(&app, "3334445555").await;

        let (status, body) = send(&app, "POST", "/api/user/1/coins", Some(json!({ "transactionType": "gift" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Amount is required");

        let (status, _) = send(
            &app,
            "POST",
            "/api/user/1/coins",
            Some(json!({ "amount": 5, "transactionType": "refund" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(&app, "POST", "/api/user/42/coins", Some(json!({ "amount": 5 }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "User not found");

        let (_, body) = send(&app, "GET", "/api/user/42/transactions", None).await;
        assert_eq!(body, json!([]));
    }
}

#[tokio::test]
async fn hosts_filter_by_online_flag() {
    for app in backends() {
        let (status, all) = send(&app, "GET", "/api/hosts", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(all.as_array().unwrap().len(), 9);
        assert!(all.as_array().unwrap().iter().any(|h| h["isOnline"] == false));

        let (_, online) = send(&app, "GET", "/api/hosts?online=true", None).await;
        let online = online.as_array().unwrap();
        assert_eq!(online.len(), 7);
        assert!(online.iter().all(|h| h["isOnline"] == true));

        let (_, offline) = send(&app, "GET", "/api/hosts?online=false", None).await;
        assert_eq!(offline.as_array().unwrap().len(), 2);

        let (_, unfiltered) = send(&app, "GET", "/api/hosts?online=maybe", None).await;
        assert_eq!(unfiltered, all);
    }
}

#[tokio::test]
async fn host_lookup_and_status() {
    for app in backends() {
        let (status, host) = send(&app, "GET", "/api/host/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(host["name"], "Emma");
        assert_eq!(host["coinRate"], 35);

        let (status, _) = send(&app, "GET", "/api/host/50", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, host) = send(&app, "POST", "/api/host/1/status", Some(json!({ "isOnline": false }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(host["isOnline"], false);

        let (_, online) = send(&app, "GET", "/api/hosts?online=true", None).await;
        assert_eq!(online.as_array().unwrap().len(), 6);

        let (status, body) = send(&app, "POST", "/api/host/1/status", Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "isOnline is required");

        let (status, body) = send(&app, "POST", "/api/host/50/status", Some(json!({ "isOnline": true }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Host not found");
    }
}

#[tokio::test]
async fn create_host_defaults_and_validation() {
    for app in backends() {
        let (status, host) = send(&app, "POST", "/api/hosts", Some(json!({ "name": "Rin", "bio": "Night owl" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(host["id"], 10);
        assert_eq!(host["rating"], "0.00");
        assert_eq!(host["coinRate"], 50);
        assert_eq!(host["totalEarnings"], 0);
        assert_eq!(host["userId"], Value::Null);

        let (status, body) = send(&app, "POST", "/api/hosts", Some(json!({ "bio": "nameless" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Host name is required");
    }
}

#[tokio::test]
async fn gift_catalog() {
    for app in backends() {
        let (status, gifts) = send(&app, "GET", "/api/gifts", None).await;
        assert_eq!(status, StatusCode::OK);
        let gifts = gifts.as_array().unwrap();
        assert_eq!(gifts.len(), 8);
        assert_eq!(gifts[0]["name"], "Coffee");
        assert_eq!(gifts[0]["coinCost"], 15);
        assert_eq!(gifts[0]["animation"], "float");

        let (status, gift) = send(&app, "GET", "/api/gifts/8", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(gift["name"], "Surprise gift");

        let (status, body) = send(&app, "GET", "/api/gifts/9", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Gift not found");
    }
}

#[tokio::test]
async fn calls_are_validated_and_listed() {
    for app in backends() {
        let (status, first) = send(
            &app,
            "POST",
            "/api/calls",
            Some(json!({ "userId": 1, "hostId": 3, "duration": 180, "coinCost": 126, "status": "ended" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["id"], 1);
        assert_eq!(first["status"], "ended");

        let (status, _) = send(
            &app,
            "POST",
            "/api/calls",
            Some(json!({ "userId": 1, "hostId": 4, "status": "declined" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(&app, "POST", "/api/calls", Some(json!({ "userId": 1, "status": "ringing" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid call data");

        let (status, body) = send(&app, "POST", "/api/calls", Some(json!({ "userId": 1 }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid call data");

        let (_, calls) = send(&app, "GET", "/api/user/1/calls", None).await;
        let statuses: Vec<&str> = calls
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["status"].as_str().unwrap())
            .collect();
        assert_eq!(statuses, vec!["declined", "ended"]);

        let (_, host_calls) = send(&app, "GET", "/api/host/3/calls", None).await;
        assert_eq!(host_calls.as_array().unwrap().len(), 1);
        assert_eq!(host_calls[0]["duration"], 180);
    }
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    for app in backends() {
        let req = Request::builder()
            .method("POST")
            .uri("/api/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{ not json"))
            .unwrap();
        let resp = app.router.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["message"].is_string());
    }
}

#[tokio::test]
async fn coin_packages_and_health() {
    for app in backends() {
        let (status, packages) = send(&app, "GET", "/api/coin-packages", None).await;
        assert_eq!(status, StatusCode::OK);
        let packages = packages.as_array().unwrap();
        assert_eq!(packages.len(), 4);
        assert_eq!(packages[1]["popular"], true);
        assert_eq!(packages[1]["totalCoins"], 330);

        let (status, body) = send(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }
}

#[tokio::test]
async fn overflowing_amount_is_rejected_without_damage() {
    for app in backends() {
        login(&app, "4445556666").await;

        let (status, body) = send(&app, "POST", "/api/user/1/coins", Some(json!({ "amount": i64::MAX }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Amount out of range");

        let (status, user) = send(&app, "GET", "/api/user/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(user["coinBalance"], 100);

        let (_, txs) = send(&app, "GET", "/api/user/1/transactions", None).await;
        assert_eq!(txs, json!([]));

        let other = login(&app, "7778889999").await;
        assert_eq!(other["id"], 2);

        let (status, user) = send(&app, "POST", "/api/user/1/coins", Some(json!({ "amount": -100 }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(user["coinBalance"], 0);
    }
}
