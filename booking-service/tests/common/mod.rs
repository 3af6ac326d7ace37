#![allow(dead_code)]

use booking_service::config::{Config, PlatformConfig, ServerConfig, StoreConfig};
use booking_service::startup::Application;
use reqwest::Client;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::path::PathBuf;
use tempfile::TempDir;

pub const TEST_CODE: &str = "123456";
pub const OPERATOR_PHONE: &str = "0770000001";
pub const ACTOR_HEADER: &str = "x-actor-phone";

pub struct TestApp {
    pub address: String,
    pub client: Client,
    // Kept alive so the on-disk store outlives the server.
    _data_dir: Option<TempDir>,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let data_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let mut app = Self::spawn_at(data_dir.path().join("swensi.json")).await;
        app._data_dir = Some(data_dir);
        app
    }

    /// Spawn against a caller-owned snapshot path, so tests can restart the
    /// service over the same data.
    pub async fn spawn_at(data_path: PathBuf) -> Self {
        let config = Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0, // Random port
            },
            store: StoreConfig { data_path },
            platform: PlatformConfig {
                operator_phone: OPERATOR_PHONE.to_string(),
                confirmation_code: TEST_CODE.to_string(),
            },
            service_name: "booking-service-test".to_string(),
        };

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");
        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to come up by polling the health endpoint.
        let client = Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            client,
            _data_dir: None,
        }
    }

    /// Log in (creating the user when unseen) and return the profile.
    pub async fn login(&self, phone: &str, role: Option<&str>) -> Value {
        let mut body = json!({ "phone": phone, "code": TEST_CODE });
        if let Some(role) = role {
            body["role"] = json!(role);
        }

        let response = self
            .client
            .post(format!("{}/auth/login", self.address))
            .json(&body)
            .send()
            .await
            .expect("login request failed");
        assert!(
            response.status().is_success(),
            "login failed with {}",
            response.status()
        );
        response.json().await.expect("login response was not json")
    }

    pub async fn deposit(&self, phone: &str, user_id: &str, amount: i64) -> Value {
        let response = self
            .client
            .post(format!("{}/users/{}/deposit", self.address, user_id))
            .header(ACTOR_HEADER, phone)
            .json(&json!({ "amount": amount }))
            .send()
            .await
            .expect("deposit request failed");
        assert!(
            response.status().is_success(),
            "deposit failed with {}",
            response.status()
        );
        response.json().await.expect("deposit response was not json")
    }

    pub async fn create_booking(&self, phone: &str, body: Value) -> reqwest::Response {
        self.client
            .post(format!("{}/bookings", self.address))
            .header(ACTOR_HEADER, phone)
            .json(&body)
            .send()
            .await
            .expect("create booking request failed")
    }

    pub async fn set_status(
        &self,
        phone: &str,
        booking_id: &str,
        status: &str,
    ) -> reqwest::Response {
        self.client
            .patch(format!("{}/bookings/{}/status", self.address, booking_id))
            .header(ACTOR_HEADER, phone)
            .json(&json!({ "status": status }))
            .send()
            .await
            .expect("status update request failed")
    }

    pub async fn list_bookings(&self, phone: &str) -> Vec<Value> {
        let response = self
            .client
            .get(format!("{}/bookings", self.address))
            .header(ACTOR_HEADER, phone)
            .send()
            .await
            .expect("list bookings request failed");
        assert!(response.status().is_success());
        response.json().await.expect("list response was not json")
    }

    pub async fn get_user(&self, actor_phone: &str, user_id: &str) -> Value {
        let response = self
            .client
            .get(format!("{}/users/{}", self.address, user_id))
            .header(ACTOR_HEADER, actor_phone)
            .send()
            .await
            .expect("get user request failed");
        assert!(
            response.status().is_success(),
            "get user failed with {}",
            response.status()
        );
        response.json().await.expect("user response was not json")
    }

    pub async fn wallet_entries(&self, phone: &str, user_id: &str) -> Vec<Value> {
        let response = self
            .client
            .get(format!("{}/users/{}/wallet", self.address, user_id))
            .header(ACTOR_HEADER, phone)
            .send()
            .await
            .expect("wallet request failed");
        assert!(response.status().is_success());
        response.json().await.expect("wallet response was not json")
    }
}

/// Amounts serialize as decimal strings; parse them for comparison.
pub fn decimal(value: &Value) -> Decimal {
    value
        .as_str()
        .unwrap_or_else(|| panic!("expected decimal string, got {}", value))
        .parse()
        .expect("invalid decimal")
}
