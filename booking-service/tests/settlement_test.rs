mod common;

use common::{decimal, TestApp, ACTOR_HEADER, OPERATOR_PHONE};
use rust_decimal::Decimal;
use serde_json::{json, Value};

const CUSTOMER: &str = "0841000001";
const PROVIDER: &str = "0841000077";
const LODGE: &str = "0841000088";

struct Fixture {
    customer_id: String,
    provider_id: String,
    booking_id: String,
}

/// Funded customer, a provider, and a default-priced booking the
/// provider has accepted.
async fn accepted_booking(app: &TestApp) -> Fixture {
    let customer = app.login(CUSTOMER, None).await;
    let customer_id = customer["id"].as_str().unwrap().to_string();
    app.deposit(CUSTOMER, &customer_id, 1000).await;

    let provider = app.login(PROVIDER, None).await;
    let provider_id = provider["id"].as_str().unwrap().to_string();

    let booking: Value = app
        .create_booking(CUSTOMER, json!({ "description": "Border run" }))
        .await
        .json()
        .await
        .unwrap();
    let booking_id = booking["id"].as_str().unwrap().to_string();

    let response = app.set_status(PROVIDER, &booking_id, "accepted").await;
    assert!(response.status().is_success());

    Fixture {
        customer_id,
        provider_id,
        booking_id,
    }
}

#[tokio::test]
async fn completing_a_booking_settles_the_money() {
    let app = TestApp::spawn().await;
    let operator = app.login(OPERATOR_PHONE, None).await;
    let fixture = accepted_booking(&app).await;

    for status in ["on_trip", "delivered", "completed"] {
        let response = app
            .set_status(PROVIDER, &fixture.booking_id, status)
            .await;
        assert!(
            response.status().is_success(),
            "transition to {} failed with {}",
            status,
            response.status()
        );
    }

    let booking: Value = app
        .client
        .get(format!(
            "{}/bookings/{}",
            app.address, fixture.booking_id
        ))
        .header(ACTOR_HEADER, PROVIDER)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(booking["status"], "completed");
    assert_eq!(booking["is_paid"], true);

    // Provider keeps 90% of the price.
    let provider = app.get_user(PROVIDER, &fixture.provider_id).await;
    assert_eq!(decimal(&provider["balance"]), Decimal::from(45));
    assert_eq!(decimal(&provider["earnings"]), Decimal::from(45));

    // The operator collects the 10% commission.
    let operator = app
        .get_user(OPERATOR_PHONE, operator["id"].as_str().unwrap())
        .await;
    assert_eq!(decimal(&operator["balance"]), Decimal::new(500, 2));

    // The customer already paid at creation time.
    let customer = app.get_user(CUSTOMER, &fixture.customer_id).await;
    assert_eq!(decimal(&customer["balance"]), Decimal::from(950));
}

#[tokio::test]
async fn settlement_runs_exactly_once() {
    let app = TestApp::spawn().await;
    app.login(OPERATOR_PHONE, None).await;
    let fixture = accepted_booking(&app).await;

    for status in ["on_trip", "delivered", "completed"] {
        app.set_status(PROVIDER, &fixture.booking_id, status).await;
    }

    // Re-settling a paid booking is a no-op, not an error.
    let response = app
        .client
        .post(format!(
            "{}/bookings/{}/settle",
            app.address, fixture.booking_id
        ))
        .header(ACTOR_HEADER, OPERATOR_PHONE)
        .send()
        .await
        .expect("settle request failed");
    assert!(response.status().is_success());

    // Transitioning a completed booking again is rejected outright.
    let response = app
        .set_status(OPERATOR_PHONE, &fixture.booking_id, "completed")
        .await;
    assert_eq!(response.status().as_u16(), 409);

    let provider = app.get_user(PROVIDER, &fixture.provider_id).await;
    assert_eq!(decimal(&provider["balance"]), Decimal::from(45));
}

#[tokio::test]
async fn settle_endpoint_is_admin_only() {
    let app = TestApp::spawn().await;
    let fixture = accepted_booking(&app).await;

    let response = app
        .client
        .post(format!(
            "{}/bookings/{}/settle",
            app.address, fixture.booking_id
        ))
        .header(ACTOR_HEADER, PROVIDER)
        .send()
        .await
        .expect("settle request failed");
    assert_eq!(response.status().as_u16(), 403);
}

#[tokio::test]
async fn unassigned_completion_moves_no_money() {
    let app = TestApp::spawn().await;
    let operator = app.login(OPERATOR_PHONE, None).await;
    let operator_id = operator["id"].as_str().unwrap().to_string();

    let customer = app.login(CUSTOMER, None).await;
    let customer_id = customer["id"].as_str().unwrap().to_string();
    app.deposit(CUSTOMER, &customer_id, 1000).await;

    let booking: Value = app
        .create_booking(CUSTOMER, json!({ "description": "Orphaned job" }))
        .await
        .json()
        .await
        .unwrap();
    let booking_id = booking["id"].as_str().unwrap();

    // The operator forces a pending booking straight to completed.
    let response = app
        .set_status(OPERATOR_PHONE, booking_id, "completed")
        .await;
    assert!(response.status().is_success());
    let completed: Value = response.json().await.unwrap();
    assert_eq!(completed["status"], "completed");
    assert_eq!(completed["is_paid"], true);

    // With nobody to pay, no wallet moves.
    let operator = app.get_user(OPERATOR_PHONE, &operator_id).await;
    assert_eq!(decimal(&operator["balance"]), Decimal::ZERO);
    let customer = app.get_user(CUSTOMER, &customer_id).await;
    assert_eq!(decimal(&customer["balance"]), Decimal::from(950));
}

#[tokio::test]
async fn lodging_settlement_tracks_hospitality_cashflow() {
    let app = TestApp::spawn().await;
    app.login(OPERATOR_PHONE, None).await;

    let customer = app.login(CUSTOMER, None).await;
    let customer_id = customer["id"].as_str().unwrap().to_string();
    app.deposit(CUSTOMER, &customer_id, 1000).await;

    let lodge = app.login(LODGE, None).await;
    let lodge_id = lodge["id"].as_str().unwrap().to_string();

    let booking: Value = app
        .create_booking(
            CUSTOMER,
            json!({
                "description": "Two nights at the border",
                "category": "lodging",
                "price": 100
            }),
        )
        .await
        .json()
        .await
        .unwrap();
    let booking_id = booking["id"].as_str().unwrap();

    for status in ["accepted", "room_assigned", "completed"] {
        let response = app.set_status(LODGE, booking_id, status).await;
        assert!(
            response.status().is_success(),
            "transition to {} failed with {}",
            status,
            response.status()
        );
    }

    let lodge = app.get_user(LODGE, &lodge_id).await;
    assert_eq!(decimal(&lodge["balance"]), Decimal::from(90));
    assert_eq!(decimal(&lodge["earnings"]), Decimal::from(90));
    // Cashflow tracks the gross price, not the payout.
    assert_eq!(
        decimal(&lodge["hospitality_cashflow"]),
        Decimal::from(100)
    );
}

#[tokio::test]
async fn settlement_shows_up_in_the_admin_report() {
    let app = TestApp::spawn().await;
    app.login(OPERATOR_PHONE, None).await;
    let fixture = accepted_booking(&app).await;

    for status in ["on_trip", "delivered", "completed"] {
        app.set_status(PROVIDER, &fixture.booking_id, status).await;
    }

    let report: Value = app
        .client
        .get(format!("{}/admin/report", app.address))
        .header(ACTOR_HEADER, OPERATOR_PHONE)
        .send()
        .await
        .expect("report request failed")
        .json()
        .await
        .expect("report was not json");

    assert_eq!(report["total_bookings"], 1);
    assert_eq!(report["completed_bookings"], 1);
    assert_eq!(decimal(&report["gross_volume"]), Decimal::from(50));
    assert_eq!(
        decimal(&report["commission_collected"]),
        Decimal::new(500, 2)
    );
}
