use std::sync::Arc;

use envia_core::{OrderRepository, ShipmentRepository};
use envia_order::ShipmentRegistrar;
use envia_store::DbClient;

#[derive(Clone)]
pub struct AuthSettings {
    pub secret: String,
    pub access_token_minutes: i64,
    pub refresh_token_days: i64,
    pub username: String,
    pub password: String,
}

#[derive(Clone)]
pub struct AppState {
    pub db: DbClient,
    pub orders: Arc<dyn OrderRepository>,
    pub shipments: Arc<dyn ShipmentRepository>,
    pub registrar: Arc<ShipmentRegistrar>,
    pub auth: AuthSettings,
    pub cors_origins: Vec<String>,
}
