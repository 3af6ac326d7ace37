use anyhow::Result;
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub platform: PlatformConfig,
    pub service_name: String,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Clone, Debug)]
pub struct StoreConfig {
    pub data_path: PathBuf,
}

#[derive(Clone, Debug)]
pub struct PlatformConfig {
    /// Phone number of the platform operator (super-admin) account that
    /// collects the commission at settlement.
    pub operator_phone: String,
    /// The simulated OTP accepted at login. The prototype has no real SMS
    /// delivery; every actor uses the same code.
    pub confirmation_code: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let host = env::var("SWENSI_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("SWENSI_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()?;

        let data_path = env::var("SWENSI_DATA_PATH")
            .unwrap_or_else(|_| "data/swensi.json".to_string())
            .into();

        let operator_phone =
            env::var("SWENSI_OPERATOR_PHONE").unwrap_or_else(|_| "0770000001".to_string());
        let confirmation_code =
            env::var("SWENSI_CONFIRMATION_CODE").unwrap_or_else(|_| "123456".to_string());

        Ok(Self {
            server: ServerConfig { host, port },
            store: StoreConfig { data_path },
            platform: PlatformConfig {
                operator_phone,
                confirmation_code,
            },
            service_name: "booking-service".to_string(),
        })
    }
}
