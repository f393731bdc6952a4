use std::net::SocketAddr;
use std::sync::Arc;

use envia_api::{
    app,
    state::{AppState, AuthSettings},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "envia_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = envia_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Envia API on port {}", config.server.port);

    let db = envia_store::DbClient::new(&config.database.url)
        .await
        .expect("Failed to connect to database");

    let orders: Arc<dyn envia_core::OrderRepository> =
        Arc::new(envia_store::StoreOrderRepository::new(db.pool.clone()));
    let shipments: Arc<dyn envia_core::ShipmentRepository> =
        Arc::new(envia_store::StoreShipmentRepository::new(db.pool.clone()));

    let carrier =
        envia_carrier::GlsClient::new(config.carrier.clone()).expect("Failed to build carrier client");
    let registrar = Arc::new(envia_order::ShipmentRegistrar::new(
        orders.clone(),
        shipments.clone(),
        Arc::new(carrier),
    ));

    let app_state = AppState {
        db,
        orders,
        shipments,
        registrar,
        auth: AuthSettings {
            secret: config.auth.jwt_secret.clone(),
            access_token_minutes: config.auth.access_token_minutes,
            refresh_token_days: config.auth.refresh_token_days,
            username: config.auth.username.clone(),
            password: config.auth.password.clone(),
        },
        cors_origins: config.cors.allowed_origins.clone(),
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
