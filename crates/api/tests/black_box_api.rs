use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::json;

use khata_api::app::services::AppServices;
use khata_api::app::build_app;
use khata_auth::Hs256SessionSigner;
use khata_notify::{Notifier, NotifyError};
use khata_store::InMemoryStore;

const ADMIN_PASSWORD: &str = "test-admin";

/// Test transport: captures codes instead of sending them.
#[derive(Debug, Default)]
struct CapturingNotifier {
    sent: Mutex<Vec<(String, String)>>,
}

impl CapturingNotifier {
    fn last_code_for(&self, email: &str) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(to, _)| to == email)
            .map(|(_, code)| code.clone())
    }
}

#[async_trait]
impl Notifier for CapturingNotifier {
    async fn send_code(&self, email: &str, code: &str) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .unwrap()
            .push((email.to_string(), code.to_string()));
        Ok(())
    }
}

/// Test transport that always fails, for the delivery-is-non-fatal path.
#[derive(Debug, Default)]
struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn send_code(&self, _email: &str, _code: &str) -> Result<(), NotifyError> {
        Err(NotifyError::Delivery("smtp unreachable".to_string()))
    }
}

struct TestServer {
    base_url: String,
    notifier: Arc<CapturingNotifier>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        Self::spawn_with(None).await
    }

    /// Same router as prod, in-memory store, ephemeral port.
    async fn spawn_with(override_notifier: Option<Arc<dyn Notifier>>) -> Self {
        let notifier = Arc::new(CapturingNotifier::default());
        let services = Arc::new(AppServices::new(
            Arc::new(InMemoryStore::new()),
            override_notifier.unwrap_or_else(|| Arc::clone(&notifier) as Arc<dyn Notifier>),
            Arc::new(Hs256SessionSigner::new(b"test-secret")),
            ADMIN_PASSWORD.to_string(),
        ));
        let app = build_app(services);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            notifier,
            handle,
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Bootstrap an owner and walk the OTP flow; returns the session token.
async fn owner_token(client: &reqwest::Client, server: &TestServer, email: &str, shop: &str) -> String {
    let res = client
        .post(format!("{}/admin/owners", server.base_url))
        .json(&json!({ "admin_password": ADMIN_PASSWORD, "email": email, "shop_code": shop }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client
        .post(format!("{}/owner/login", server.base_url))
        .json(&json!({ "email": email }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::ACCEPTED);

    let code = server.notifier.last_code_for(email).expect("no code sent");
    let res = client
        .post(format!("{}/owner/verify", server.base_url))
        .json(&json!({ "email": email, "otp": code }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    body["token"].as_str().unwrap().to_string()
}

async fn create_customer(
    client: &reqwest::Client,
    server: &TestServer,
    token: &str,
    name: &str,
    password: &str,
) -> String {
    let res = client
        .post(format!("{}/owner/customers", server.base_url))
        .bearer_auth(token)
        .json(&json!({ "name": name, "password": password }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: serde_json::Value = res.json().await.unwrap();
    body["customer_code"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_is_public() {
    let server = TestServer::spawn().await;
    let res = reqwest::get(format!("{}/health", server.base_url))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn admin_gate_reports_not_found_on_bad_password() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/admin/owners", server.base_url))
        .json(&json!({ "admin_password": "wrong", "email": "a@b.c", "shop_code": "SHOP" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn duplicate_owner_email_conflicts() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    owner_token(&client, &server, "shop@example.com", "CHAI").await;
    let res = client
        .post(format!("{}/admin/owners", server.base_url))
        .json(&json!({ "admin_password": ADMIN_PASSWORD, "email": "shop@example.com", "shop_code": "OTHER" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn owner_login_flow() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    // Unknown email never gets a code.
    let res = client
        .post(format!("{}/owner/login", server.base_url))
        .json(&json!({ "email": "nobody@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let token = owner_token(&client, &server, "shop@example.com", "CHAI").await;

    // Codes are single-use: the verified code is gone.
    let code = server.notifier.last_code_for("shop@example.com").unwrap();
    let res = client
        .post(format!("{}/owner/verify", server.base_url))
        .json(&json!({ "email": "shop@example.com", "otp": code }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .get(format!("{}/owner/info", server.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["email"], "shop@example.com");
    assert_eq!(body["shop_code"], "CHAI");
}

#[tokio::test]
async fn wrong_otp_is_unauthorized() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    owner_token(&client, &server, "shop@example.com", "CHAI").await;

    let res = client
        .post(format!("{}/owner/login", server.base_url))
        .json(&json!({ "email": "shop@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::ACCEPTED);

    let res = client
        .post(format!("{}/owner/verify", server.base_url))
        .json(&json!({ "email": "shop@example.com", "otp": "000000" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn failed_code_delivery_does_not_fail_login_request() {
    let server = TestServer::spawn_with(Some(Arc::new(FailingNotifier))).await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/admin/owners", server.base_url))
        .json(&json!({ "admin_password": ADMIN_PASSWORD, "email": "shop@example.com", "shop_code": "CHAI" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client
        .post(format!("{}/owner/login", server.base_url))
        .json(&json!({ "email": "shop@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::ACCEPTED);
}

#[tokio::test]
async fn owner_ledger_flow() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = owner_token(&client, &server, "shop@example.com", "CHAI").await;

    let c1 = create_customer(&client, &server, &token, "Asha", "pass1234").await;
    let c2 = create_customer(&client, &server, &token, "Bilal", "pass1234").await;
    let c3 = create_customer(&client, &server, &token, "Chandra", "pass1234").await;
    assert_eq!([c1.as_str(), c2.as_str(), c3.as_str()], ["C001", "C002", "C003"]);

    for (amount, note) in [(500i64, "tea"), (-200, "payment"), (50, "biscuits")] {
        let res = client
            .post(format!("{}/owner/transactions", server.base_url))
            .bearer_auth(&token)
            .json(&json!({ "customer_code": c2, "amount": amount, "note": note }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    // Zero amounts never enter the ledger.
    let res = client
        .post(format!("{}/owner/transactions", server.base_url))
        .bearer_auth(&token)
        .json(&json!({ "customer_code": c2, "amount": 0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Unknown code within the owner's scope.
    let res = client
        .post(format!("{}/owner/transactions", server.base_url))
        .bearer_auth(&token)
        .json(&json!({ "customer_code": "C999", "amount": 10 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .get(format!("{}/owner/customers/{}/transactions", server.base_url, c2))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["customer_name"], "Bilal");
    assert_eq!(body["balance"], 350);
    let amounts: Vec<i64> = body["entries"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["amount"].as_i64().unwrap())
        .collect();
    assert_eq!(amounts, [50, -200, 500]);

    let res = client
        .get(format!("{}/owner/customers", server.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["items"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn customer_login_and_data() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = owner_token(&client, &server, "shop@example.com", "CHAI").await;
    let code = create_customer(&client, &server, &token, "Asha", "pass1234").await;

    let res = client
        .post(format!("{}/owner/transactions", server.base_url))
        .bearer_auth(&token)
        .json(&json!({ "customer_code": code, "amount": 120, "note": "tea" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    // Bad password, unknown code, unknown shop: all the same 401.
    for body in [
        json!({ "shop_code": "CHAI", "customer_code": code, "password": "wrong-pass" }),
        json!({ "shop_code": "CHAI", "customer_code": "C999", "password": "pass1234" }),
        json!({ "shop_code": "NOSHOP", "customer_code": code, "password": "pass1234" }),
    ] {
        let res = client
            .post(format!("{}/customer/login", server.base_url))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    let res = client
        .post(format!("{}/customer/login", server.base_url))
        .json(&json!({ "shop_code": "CHAI", "customer_code": code, "password": "pass1234" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    let customer_token = body["token"].as_str().unwrap().to_string();

    let res = client
        .get(format!("{}/customer/data", server.base_url))
        .bearer_auth(&customer_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["name"], "Asha");
    assert_eq!(body["customer_code"], "C001");
    assert_eq!(body["shop_code"], "CHAI");
    assert_eq!(body["balance"], 120);
    assert_eq!(body["transactions"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn customer_change_password_flow() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = owner_token(&client, &server, "shop@example.com", "CHAI").await;
    let code = create_customer(&client, &server, &token, "Asha", "pass1234").await;

    let res = client
        .post(format!("{}/customer/login", server.base_url))
        .json(&json!({ "shop_code": "CHAI", "customer_code": code, "password": "pass1234" }))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    let customer_token = body["token"].as_str().unwrap().to_string();

    // Wrong current password.
    let res = client
        .post(format!("{}/customer/change-password", server.base_url))
        .bearer_auth(&customer_token)
        .json(&json!({ "current_password": "wrong", "new_password": "newpass" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Too-short replacement.
    let res = client
        .post(format!("{}/customer/change-password", server.base_url))
        .bearer_auth(&customer_token)
        .json(&json!({ "current_password": "pass1234", "new_password": "abc" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .post(format!("{}/customer/change-password", server.base_url))
        .bearer_auth(&customer_token)
        .json(&json!({ "current_password": "pass1234", "new_password": "newpass" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // Old password out, new password in.
    let res = client
        .post(format!("{}/customer/login", server.base_url))
        .json(&json!({ "shop_code": "CHAI", "customer_code": code, "password": "pass1234" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .post(format!("{}/customer/login", server.base_url))
        .json(&json!({ "shop_code": "CHAI", "customer_code": code, "password": "newpass" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn token_kinds_do_not_cross_surfaces() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = owner_token(&client, &server, "shop@example.com", "CHAI").await;
    let code = create_customer(&client, &server, &token, "Asha", "pass1234").await;

    let res = client
        .post(format!("{}/customer/login", server.base_url))
        .json(&json!({ "shop_code": "CHAI", "customer_code": code, "password": "pass1234" }))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    let customer_token = body["token"].as_str().unwrap().to_string();

    // Owner token on a customer route.
    let res = client
        .get(format!("{}/customer/data", server.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Customer token on an owner route.
    let res = client
        .get(format!("{}/owner/customers", server.base_url))
        .bearer_auth(&customer_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // No token at all.
    let res = client
        .get(format!("{}/owner/customers", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn owners_never_see_each_others_customers() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token_a = owner_token(&client, &server, "a@example.com", "SHOP-A").await;
    let token_b = owner_token(&client, &server, "b@example.com", "SHOP-B").await;

    let code = create_customer(&client, &server, &token_b, "B1", "pass1234").await;

    let res = client
        .get(format!("{}/owner/customers", server.base_url))
        .bearer_auth(&token_a)
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["items"].as_array().unwrap().is_empty());

    // B's (valid) code means nothing inside A's scope.
    let res = client
        .get(format!("{}/owner/customers/{}/transactions", server.base_url, code))
        .bearer_auth(&token_a)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
