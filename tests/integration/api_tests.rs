//! API integration tests
//!
//! These run against a live server with a migrated database:
//! `cargo test -- --ignored`

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Helper to get an authenticated admin token
async fn get_auth_token(client: &Client) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": "admin@biblioflow.local",
            "password": "admin"
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

async fn create_book(client: &Client, token: &str, title: &str, quantity: i32) -> i64 {
    let response = client
        .post(format!("{}/books", BASE_URL))
        .bearer_auth(token)
        .json(&json!({ "title": title, "quantity": quantity }))
        .send()
        .await
        .expect("Failed to create book");
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse book response");
    body["id"].as_i64().expect("No id in response")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_login() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": "admin@biblioflow.local",
            "password": "admin"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["token"].is_string());
    assert_eq!(body["token_type"], "Bearer");
}

#[tokio::test]
#[ignore]
async fn test_login_wrong_password_rejected() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": "admin@biblioflow.local",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_stock_receive_and_remove() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let book_id = create_book(&client, &token, "Stock test book", 2).await;

    let response = client
        .post(format!("{}/books/{}/stock/receive", BASE_URL, book_id))
        .bearer_auth(&token)
        .json(&json!({ "amount": 3 }))
        .send()
        .await
        .expect("Failed to receive stock");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["quantity"], 5);
    assert_eq!(body["available"], 5);

    // removing more than owned must fail
    let response = client
        .post(format!("{}/books/{}/stock/remove", BASE_URL, book_id))
        .bearer_auth(&token)
        .json(&json!({ "amount": 99 }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 422);
}

#[tokio::test]
#[ignore]
async fn test_reservation_roundtrip() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let book_id = create_book(&client, &token, "Reservation test book", 1).await;

    let response = client
        .post(format!("{}/reservations", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({ "book_ids": [book_id] }))
        .send()
        .await
        .expect("Failed to create reservation");
    assert_eq!(response.status(), 201);

    let reservation: Value = response.json().await.expect("Failed to parse response");
    let reservation_id = reservation["id"].as_i64().unwrap();
    assert_eq!(reservation["lines"].as_array().unwrap().len(), 1);

    // the only copy is now checked out
    let response = client
        .post(format!("{}/reservations", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({ "book_ids": [book_id] }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 422);

    // return everything
    let response = client
        .post(format!("{}/reservations/{}/return", BASE_URL, reservation_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to return reservation");
    assert!(response.status().is_success());

    // a second full return reports a conflict
    let response = client
        .post(format!("{}/reservations/{}/return", BASE_URL, reservation_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_extension_is_one_shot() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let book_id = create_book(&client, &token, "Extension test book", 1).await;

    let response = client
        .post(format!("{}/reservations", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({ "book_ids": [book_id] }))
        .send()
        .await
        .expect("Failed to create reservation");
    let reservation: Value = response.json().await.unwrap();
    let reservation_id = reservation["id"].as_i64().unwrap();

    let response = client
        .post(format!("{}/reservations/{}/extend", BASE_URL, reservation_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to extend");
    assert!(response.status().is_success());

    let response = client
        .post(format!("{}/reservations/{}/extend", BASE_URL, reservation_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);

    // cleanup
    client
        .post(format!("{}/reservations/{}/return", BASE_URL, reservation_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to return");
}

#[tokio::test]
#[ignore]
async fn test_concurrent_extensions_only_one_wins() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let book_id = create_book(&client, &token, "Concurrent extension book", 1).await;

    let response = client
        .post(format!("{}/reservations", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({ "book_ids": [book_id] }))
        .send()
        .await
        .expect("Failed to create reservation");
    let reservation: Value = response.json().await.unwrap();
    let reservation_id = reservation["id"].as_i64().unwrap();

    // both requests validate against the same un-extended lines; the
    // conditional update lets only one of them land
    let url = format!("{}/reservations/{}/extend", BASE_URL, reservation_id);
    let first = client.post(&url).bearer_auth(&token).send();
    let second = client.post(&url).bearer_auth(&token).send();
    let (first, second) = tokio::join!(first, second);

    let statuses = [
        first.expect("Failed to extend").status(),
        second.expect("Failed to extend").status(),
    ];
    assert_eq!(statuses.iter().filter(|s| s.is_success()).count(), 1);
    assert!(statuses.contains(&reqwest::StatusCode::CONFLICT));

    // cleanup
    client
        .post(format!("{}/reservations/{}/return", BASE_URL, reservation_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to return");
}

#[tokio::test]
#[ignore]
async fn test_concurrent_reservations_respect_holding_limit() {
    let client = Client::new();
    let admin_token = get_auth_token(&client).await;

    // dedicated patron so other tests cannot disturb the count
    let stamp = chrono::Utc::now().timestamp_millis();
    let email = format!("quota{}@biblioflow.local", stamp);
    let response = client
        .post(format!("{}/users", BASE_URL))
        .bearer_auth(&admin_token)
        .json(&json!({ "name": "Quota patron", "email": email, "password": "quotapass" }))
        .send()
        .await
        .expect("Failed to create user");
    assert_eq!(response.status(), 201);

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": email, "password": "quotapass" }))
        .send()
        .await
        .expect("Failed to log in");
    let body: Value = response.json().await.expect("Failed to parse login response");
    let token = body["token"].as_str().expect("No token in response").to_string();

    let book_a = create_book(&client, &admin_token, &format!("Quota book A {stamp}"), 1).await;
    let book_b = create_book(&client, &admin_token, &format!("Quota book B {stamp}"), 1).await;
    let book_c = create_book(&client, &admin_token, &format!("Quota book C {stamp}"), 1).await;
    let book_d = create_book(&client, &admin_token, &format!("Quota book D {stamp}"), 1).await;

    // two items held, one slot left under the three-item cap
    let response = client
        .post(format!("{}/reservations", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({ "book_ids": [book_a, book_b] }))
        .send()
        .await
        .expect("Failed to create reservation");
    assert_eq!(response.status(), 201);

    // both requests see two held items before their transactions; the
    // user row lock serializes them and the recount stops the loser
    let first = client
        .post(format!("{}/reservations", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({ "book_ids": [book_c] }))
        .send();
    let second = client
        .post(format!("{}/reservations", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({ "book_ids": [book_d] }))
        .send();
    let (first, second) = tokio::join!(first, second);

    let statuses = [
        first.expect("Failed to reserve").status(),
        second.expect("Failed to reserve").status(),
    ];
    assert_eq!(statuses.iter().filter(|s| s.is_success()).count(), 1);
    assert!(statuses.contains(&reqwest::StatusCode::UNPROCESSABLE_ENTITY));
}

#[tokio::test]
#[ignore]
async fn test_schedule_finish_creates_reservation() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let book_id = create_book(&client, &token, "Schedule test book", 1).await;

    // book a pickup for tomorrow (skip if tomorrow is a Sunday)
    let pickup = chrono::Utc::now() + chrono::Duration::days(1);
    if pickup.date_naive().format("%u").to_string() == "7" {
        return;
    }

    let response = client
        .post(format!("{}/schedules", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({ "book_ids": [book_id], "pickup_date": pickup.to_rfc3339() }))
        .send()
        .await
        .expect("Failed to create schedule");
    assert_eq!(response.status(), 201);

    let schedule: Value = response.json().await.unwrap();
    let schedule_id = schedule["id"].as_i64().unwrap();
    assert_eq!(schedule["status"], "pending");

    let response = client
        .post(format!("{}/schedules/{}/status", BASE_URL, schedule_id))
        .bearer_auth(&token)
        .json(&json!({ "status": "finished" }))
        .send()
        .await
        .expect("Failed to change status");
    assert!(response.status().is_success());

    let schedule: Value = response.json().await.unwrap();
    assert_eq!(schedule["status"], "finished");

    // terminal: a second transition is rejected
    let response = client
        .post(format!("{}/schedules/{}/status", BASE_URL, schedule_id))
        .bearer_auth(&token)
        .json(&json!({ "status": "canceled" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);
}
