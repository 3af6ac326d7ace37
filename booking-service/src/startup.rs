//! Application startup and lifecycle management.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::anyhow;
use axum::middleware::from_fn;
use axum::{
    routing::{get, patch, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{http_request_span, request_id_middleware};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::handlers;
use crate::models::{Role, User};
use crate::services::{BookingService, JsonFileStore, MarketplaceRepository, WalletService};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub repository: MarketplaceRepository,
    pub wallet: WalletService,
    pub bookings: BookingService,
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application with the given configuration. Fails when the
    /// snapshot on disk is malformed; there is no fallback store.
    pub async fn build(config: Config) -> Result<Self, AppError> {
        let store = Arc::new(JsonFileStore::new(&config.store.data_path));
        let repository = MarketplaceRepository::open(store).await?;

        seed_operator_account(&repository, &config.platform.operator_phone).await?;

        let wallet = WalletService::new(repository.clone());
        let bookings =
            BookingService::new(repository.clone(), config.platform.operator_phone.clone());

        let state = AppState {
            config: config.clone(),
            repository,
            wallet,
            bookings,
        };

        let router = Router::new()
            .route("/health", get(handlers::health_check))
            .route("/auth/login", post(handlers::auth::login))
            .route(
                "/users/:id",
                get(handlers::users::get_user).patch(handlers::users::update_profile),
            )
            .route("/users/:id/deposit", post(handlers::users::deposit))
            .route(
                "/users/:id/become-provider",
                post(handlers::users::become_provider),
            )
            .route("/users/:id/verify", post(handlers::users::verify_user))
            .route("/users/:id/wallet", get(handlers::users::wallet_entries))
            .route(
                "/bookings",
                post(handlers::bookings::create_booking).get(handlers::bookings::list_bookings),
            )
            .route("/bookings/:id", get(handlers::bookings::get_booking))
            .route(
                "/bookings/:id/status",
                patch(handlers::bookings::update_booking_status),
            )
            .route(
                "/bookings/:id/settle",
                post(handlers::bookings::settle_booking),
            )
            .route("/admin/report", get(handlers::admin::report))
            .layer(from_fn(request_id_middleware))
            .layer(TraceLayer::new_for_http().make_span_with(http_request_span))
            .layer(CorsLayer::permissive())
            .with_state(state);

        let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
            .parse()
            .map_err(|e| AppError::ConfigError(anyhow!("invalid listen address: {}", e)))?;
        let listener = TcpListener::bind(addr).await?;
        let port = listener.local_addr()?.port();

        tracing::info!("Booking service listening on port {}", port);

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router).await
    }
}

/// The operator (super-admin) account collects the commission at
/// settlement; make sure it exists before the first request.
async fn seed_operator_account(
    repository: &MarketplaceRepository,
    operator_phone: &str,
) -> Result<(), AppError> {
    let exists = repository
        .read(|s| s.user_by_phone(operator_phone).is_some())
        .await;
    if exists {
        return Ok(());
    }

    let mut operator = User::new(operator_phone, Role::Admin);
    operator.name = Some("Swensi Operations".to_string());
    operator.is_verified = true;

    tracing::info!(phone = %operator_phone, "seeding operator account");
    repository.mutate(move |s| s.insert_user(operator)).await
}
