//! End-to-end tests for users, chirps, sessions and the billing webhook

mod helpers;

use helpers::{spawn_app, TestApp, POLKA_KEY};
use serde_json::{json, Value};

async fn register(app: &TestApp, email: &str, password: &str) -> Value {
    let response = reqwest::Client::new()
        .post(&format!("{}/api/users", app.address))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(201, response.status().as_u16());
    response.json().await.expect("Failed to parse response")
}

async fn login(app: &TestApp, email: &str, password: &str) -> Value {
    let response = reqwest::Client::new()
        .post(&format!("{}/api/login", app.address))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(200, response.status().as_u16());
    response.json().await.expect("Failed to parse response")
}

fn field(value: &Value, name: &str) -> String {
    value[name].as_str().expect("missing string field").to_string()
}

// --- Users ---

#[tokio::test]
async fn register_returns_public_view() {
    let app = spawn_app();

    let user = register(&app, "alice@x.com", "secret123").await;

    assert_eq!(user["id"], 1);
    assert_eq!(user["email"], "alice@x.com");
    assert_eq!(user["is_chirpy_red"], false);
    assert!(user.get("password_hash").is_none());
    assert!(user.get("password").is_none());
}

#[tokio::test]
async fn register_rejects_duplicate_email() {
    let app = spawn_app();
    register(&app, "alice@x.com", "secret123").await;

    let response = reqwest::Client::new()
        .post(&format!("{}/api/users", app.address))
        .json(&json!({ "email": "alice@x.com", "password": "other" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(409, response.status().as_u16());
}

#[tokio::test]
async fn register_returns_400_for_invalid_input() {
    let app = spawn_app();
    let test_cases = vec![
        (json!({ "email": "not-an-email", "password": "secret123" }), "bad email"),
        (json!({ "email": "bob@x.com", "password": "" }), "empty password"),
        (json!({ "email": "bob@x.com" }), "missing password"),
    ];

    for (body, description) in test_cases {
        let response = reqwest::Client::new()
            .post(&format!("{}/api/users", app.address))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 Bad Request for {}.",
            description
        );
    }
}

#[tokio::test]
async fn update_user_changes_credentials() {
    let app = spawn_app();
    register(&app, "alice@x.com", "secret123").await;
    let session = login(&app, "alice@x.com", "secret123").await;

    let response = reqwest::Client::new()
        .put(&format!("{}/api/users", app.address))
        .bearer_auth(field(&session, "token"))
        .json(&json!({ "email": "alice@y.com", "password": "newpass" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["email"], "alice@y.com");

    login(&app, "alice@y.com", "newpass").await;

    let old = reqwest::Client::new()
        .post(&format!("{}/api/login", app.address))
        .json(&json!({ "email": "alice@x.com", "password": "secret123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(401, old.status().as_u16());
}

#[tokio::test]
async fn update_user_requires_access_token() {
    let app = spawn_app();

    let response = reqwest::Client::new()
        .put(&format!("{}/api/users", app.address))
        .json(&json!({ "email": "alice@y.com", "password": "newpass" }))
        .send()
        .await
        .unwrap();

    assert_eq!(401, response.status().as_u16());
}

// --- Login ---

#[tokio::test]
async fn login_returns_tokens_and_user() {
    let app = spawn_app();
    register(&app, "alice@x.com", "secret123").await;

    let session = login(&app, "alice@x.com", "secret123").await;

    assert_eq!(session["id"], 1);
    assert_eq!(session["email"], "alice@x.com");
    assert_eq!(field(&session, "token").split('.').count(), 3);
    let refresh_token = field(&session, "refresh_token");
    assert_eq!(refresh_token.len(), 64);
    assert!(refresh_token.chars().all(|c| c.is_ascii_hexdigit()));
}

#[tokio::test]
async fn login_does_not_reveal_which_credential_was_wrong() {
    let app = spawn_app();
    register(&app, "alice@x.com", "secret123").await;
    let client = reqwest::Client::new();

    let wrong_password = client
        .post(&format!("{}/api/login", app.address))
        .json(&json!({ "email": "alice@x.com", "password": "nope" }))
        .send()
        .await
        .unwrap();
    let unknown_email = client
        .post(&format!("{}/api/login", app.address))
        .json(&json!({ "email": "nobody@x.com", "password": "secret123" }))
        .send()
        .await
        .unwrap();

    assert_eq!(401, wrong_password.status().as_u16());
    assert_eq!(401, unknown_email.status().as_u16());

    let a: Value = wrong_password.json().await.unwrap();
    let b: Value = unknown_email.json().await.unwrap();
    assert_eq!(a["message"], b["message"]);
    assert_eq!(a["code"], b["code"]);
}

// --- Chirps ---

#[tokio::test]
async fn chirp_lifecycle_masks_profanity_and_enforces_authorship() {
    let app = spawn_app();
    let client = reqwest::Client::new();
    register(&app, "alice@x.com", "secret123").await;
    register(&app, "bob@x.com", "hunter22").await;
    let alice = login(&app, "alice@x.com", "secret123").await;
    let bob = login(&app, "bob@x.com", "hunter22").await;

    let created = client
        .post(&format!("{}/api/chirps", app.address))
        .bearer_auth(field(&alice, "token"))
        .json(&json!({ "body": "this is a kerfuffle" }))
        .send()
        .await
        .unwrap();
    assert_eq!(201, created.status().as_u16());
    let chirp: Value = created.json().await.unwrap();
    assert_eq!(chirp["body"], "this is a ****");
    assert_eq!(chirp["author_id"], alice["id"]);
    let chirp_url = format!("{}/api/chirps/{}", app.address, chirp["id"]);

    let forbidden = client
        .delete(&chirp_url)
        .bearer_auth(field(&bob, "token"))
        .send()
        .await
        .unwrap();
    assert_eq!(403, forbidden.status().as_u16());

    let deleted = client
        .delete(&chirp_url)
        .bearer_auth(field(&alice, "token"))
        .send()
        .await
        .unwrap();
    assert_eq!(204, deleted.status().as_u16());

    let gone = client.get(&chirp_url).send().await.unwrap();
    assert_eq!(404, gone.status().as_u16());

    let all: Value = client
        .get(&format!("{}/api/chirps", app.address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(all, json!([]));
}

#[tokio::test]
async fn chirps_are_listed_in_id_order() {
    let app = spawn_app();
    let client = reqwest::Client::new();
    register(&app, "alice@x.com", "secret123").await;
    let alice = login(&app, "alice@x.com", "secret123").await;

    for body in ["first", "second", "third"] {
        let response = client
            .post(&format!("{}/api/chirps", app.address))
            .bearer_auth(field(&alice, "token"))
            .json(&json!({ "body": body }))
            .send()
            .await
            .unwrap();
        assert_eq!(201, response.status().as_u16());
    }

    let all: Vec<Value> = client
        .get(&format!("{}/api/chirps", app.address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let ids: Vec<u64> = all.iter().map(|c| c["id"].as_u64().unwrap()).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(all[1]["body"], "second");
}

#[tokio::test]
async fn create_chirp_validates_body_and_token() {
    let app = spawn_app();
    let client = reqwest::Client::new();
    register(&app, "alice@x.com", "secret123").await;
    let alice = login(&app, "alice@x.com", "secret123").await;

    let too_long = client
        .post(&format!("{}/api/chirps", app.address))
        .bearer_auth(field(&alice, "token"))
        .json(&json!({ "body": "x".repeat(141) }))
        .send()
        .await
        .unwrap();
    assert_eq!(400, too_long.status().as_u16());

    let no_token = client
        .post(&format!("{}/api/chirps", app.address))
        .json(&json!({ "body": "hello" }))
        .send()
        .await
        .unwrap();
    assert_eq!(401, no_token.status().as_u16());

    let refresh_as_access = client
        .post(&format!("{}/api/chirps", app.address))
        .bearer_auth(field(&alice, "refresh_token"))
        .json(&json!({ "body": "hello" }))
        .send()
        .await
        .unwrap();
    assert_eq!(401, refresh_as_access.status().as_u16());
}

// --- Sessions ---

#[tokio::test]
async fn refresh_rotates_the_token() {
    let app = spawn_app();
    let client = reqwest::Client::new();
    register(&app, "alice@x.com", "secret123").await;
    let session = login(&app, "alice@x.com", "secret123").await;
    let old_token = field(&session, "refresh_token");

    let rotated = client
        .post(&format!("{}/api/refresh", app.address))
        .bearer_auth(&old_token)
        .send()
        .await
        .unwrap();
    assert_eq!(200, rotated.status().as_u16());
    let rotated: Value = rotated.json().await.unwrap();
    let new_token = field(&rotated, "refresh_token");
    assert_ne!(new_token, old_token);
    assert!(rotated.get("token").is_some());

    let replay = client
        .post(&format!("{}/api/refresh", app.address))
        .bearer_auth(&old_token)
        .send()
        .await
        .unwrap();
    assert_eq!(401, replay.status().as_u16());

    let again = client
        .post(&format!("{}/api/refresh", app.address))
        .bearer_auth(&new_token)
        .send()
        .await
        .unwrap();
    assert_eq!(200, again.status().as_u16());
}

#[tokio::test]
async fn refresh_with_unknown_token_is_unauthorized() {
    let app = spawn_app();

    let response = reqwest::Client::new()
        .post(&format!("{}/api/refresh", app.address))
        .bearer_auth("0".repeat(64))
        .send()
        .await
        .unwrap();

    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn logout_revokes_and_is_idempotent() {
    let app = spawn_app();
    let client = reqwest::Client::new();
    register(&app, "alice@x.com", "secret123").await;
    let session = login(&app, "alice@x.com", "secret123").await;
    let token = field(&session, "refresh_token");

    for _ in 0..2 {
        let response = client
            .delete(&format!("{}/api/refresh", app.address))
            .bearer_auth(&token)
            .send()
            .await
            .unwrap();
        assert_eq!(204, response.status().as_u16());
    }

    let refreshed = client
        .post(&format!("{}/api/refresh", app.address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(401, refreshed.status().as_u16());
}

#[tokio::test]
async fn sessions_are_persisted_to_the_store_file() {
    let app = spawn_app();
    register(&app, "alice@x.com", "secret123").await;
    let session = login(&app, "alice@x.com", "secret123").await;

    let raw = std::fs::read_to_string(&app.store_path).expect("store file should exist");
    let document: Value = serde_json::from_str(&raw).unwrap();

    assert!(document["sessions"]
        .get(field(&session, "refresh_token"))
        .is_some());
    assert!(!raw.contains("secret123"));
}

// --- Billing webhook ---

#[tokio::test]
async fn polka_upgrade_promotes_user() {
    let app = spawn_app();
    let client = reqwest::Client::new();
    register(&app, "alice@x.com", "secret123").await;

    let response = client
        .post(&format!("{}/api/polka/webhooks", app.address))
        .header("Authorization", format!("ApiKey {}", POLKA_KEY))
        .json(&json!({ "event": "user.upgraded", "data": { "user_id": 1 } }))
        .send()
        .await
        .unwrap();
    assert_eq!(204, response.status().as_u16());

    let session = login(&app, "alice@x.com", "secret123").await;
    assert_eq!(session["is_chirpy_red"], true);
}

#[tokio::test]
async fn polka_webhook_checks_key_and_user() {
    let app = spawn_app();
    let client = reqwest::Client::new();
    let url = format!("{}/api/polka/webhooks", app.address);

    let wrong_key = client
        .post(&url)
        .header("Authorization", "ApiKey wrong")
        .json(&json!({ "event": "user.upgraded", "data": { "user_id": 1 } }))
        .send()
        .await
        .unwrap();
    assert_eq!(401, wrong_key.status().as_u16());

    let unknown_user = client
        .post(&url)
        .header("Authorization", format!("ApiKey {}", POLKA_KEY))
        .json(&json!({ "event": "user.upgraded", "data": { "user_id": 99 } }))
        .send()
        .await
        .unwrap();
    assert_eq!(404, unknown_user.status().as_u16());

    let ignored = client
        .post(&url)
        .header("Authorization", format!("ApiKey {}", POLKA_KEY))
        .json(&json!({ "event": "user.payment_failed", "data": { "user_id": 99 } }))
        .send()
        .await
        .unwrap();
    assert_eq!(204, ignored.status().as_u16());
}
