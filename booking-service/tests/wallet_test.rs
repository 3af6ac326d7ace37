mod common;

use common::{decimal, TestApp, ACTOR_HEADER};
use rust_decimal::Decimal;
use serde_json::json;

#[tokio::test]
async fn deposit_increases_balance_and_logs_an_entry() {
    let app = TestApp::spawn().await;
    let user = app.login("0821000001", None).await;
    let user_id = user["id"].as_str().unwrap();

    let updated = app.deposit("0821000001", user_id, 200).await;
    assert_eq!(decimal(&updated["balance"]), Decimal::from(200));

    let entries = app.wallet_entries("0821000001", user_id).await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["direction"], "credit");
    assert_eq!(decimal(&entries[0]["amount"]), Decimal::from(200));
    assert_eq!(decimal(&entries[0]["balance_after"]), Decimal::from(200));
}

#[tokio::test]
async fn insufficient_balance_blocks_the_booking() {
    let app = TestApp::spawn().await;
    let user = app.login("0821000002", None).await;
    let user_id = user["id"].as_str().unwrap().to_string();

    let response = app
        .create_booking(
            "0821000002",
            json!({ "description": "Grocery run", "price": 50 }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 402);

    // Balance untouched, no booking persisted.
    let user = app.get_user("0821000002", &user_id).await;
    assert_eq!(decimal(&user["balance"]), Decimal::ZERO);
    assert!(app.list_bookings("0821000002").await.is_empty());
}

#[tokio::test]
async fn non_positive_deposit_is_rejected() {
    let app = TestApp::spawn().await;
    let user = app.login("0821000003", None).await;
    let user_id = user["id"].as_str().unwrap();

    let response = app
        .client
        .post(format!("{}/users/{}/deposit", app.address, user_id))
        .header(ACTOR_HEADER, "0821000003")
        .json(&json!({ "amount": 0 }))
        .send()
        .await
        .expect("deposit request failed");
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn audit_log_is_newest_first_and_capped_at_100() {
    let app = TestApp::spawn().await;
    let user = app.login("0821000004", None).await;
    let user_id = user["id"].as_str().unwrap().to_string();

    for i in 1..=105 {
        app.deposit("0821000004", &user_id, i).await;
    }

    let entries = app.wallet_entries("0821000004", &user_id).await;
    assert_eq!(entries.len(), 100);
    // The newest entry is the 105th deposit.
    assert_eq!(decimal(&entries[0]["amount"]), Decimal::from(105));
    assert_eq!(
        decimal(&entries[0]["balance_after"]),
        Decimal::from((1..=105).sum::<i64>())
    );
}

#[tokio::test]
async fn actors_cannot_read_someone_elses_wallet() {
    let app = TestApp::spawn().await;
    let owner = app.login("0821000005", None).await;
    app.login("0821000006", None).await;
    let owner_id = owner["id"].as_str().unwrap();

    let response = app
        .client
        .get(format!("{}/users/{}/wallet", app.address, owner_id))
        .header(ACTOR_HEADER, "0821000006")
        .send()
        .await
        .expect("wallet request failed");
    assert_eq!(response.status().as_u16(), 403);
}
