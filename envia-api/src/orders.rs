use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use envia_core::grouping::group_order_rows;
use envia_core::models::{DeadlineWindow, Order};

use crate::error::AppError;
use crate::response::{self, ApiResponse};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/order/{order_id}", get(get_order))
        .route(
            "/orderspending",
            get(get_orders_pending).patch(update_stock_flag),
        )
        .route("/orderspending/untiltoday", get(get_orders_pending_until_today))
        .route("/orderspending/delayed", get(get_orders_pending_delayed))
        .route(
            "/ordersoutofstock",
            get(get_orders_out_of_stock).patch(update_fake_flag),
        )
        .route(
            "/ordersoutofstock/untiltoday",
            get(get_orders_out_of_stock_until_today),
        )
        .route(
            "/ordersoutofstock/delayed",
            get(get_orders_out_of_stock_delayed),
        )
        .route("/ordersshipfake", get(get_orders_ship_fake))
}

fn repo_error(e: envia_core::RepoError) -> AppError {
    AppError::InternalServerError(e.to_string())
}

// ============================================================================
// Order Detail
// ============================================================================

/// GET /order/{order_id}
async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<Order>>>, AppError> {
    tracing::info!(order_id, "fetching order");

    let rows = state
        .orders
        .order_detail(&order_id)
        .await
        .map_err(repo_error)?;

    if rows.is_empty() {
        return Ok(Json(response::empty()));
    }

    Ok(Json(response::success(group_order_rows(rows))))
}

// ============================================================================
// Pending Orders
// ============================================================================

/// GET /orderspending
async fn get_orders_pending(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Order>>>, AppError> {
    let rows = state
        .orders
        .pending_detail(DeadlineWindow::All)
        .await
        .map_err(repo_error)?;
    Ok(Json(response::listing(group_order_rows(rows), "orderspending")))
}

/// GET /orderspending/untiltoday
async fn get_orders_pending_until_today(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Order>>>, AppError> {
    let rows = state
        .orders
        .pending_detail(DeadlineWindow::UntilToday)
        .await
        .map_err(repo_error)?;
    Ok(Json(response::listing(
        group_order_rows(rows),
        "orderspending/untiltoday",
    )))
}

/// GET /orderspending/delayed
async fn get_orders_pending_delayed(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Order>>>, AppError> {
    let rows = state
        .orders
        .pending_detail(DeadlineWindow::Delayed)
        .await
        .map_err(repo_error)?;
    Ok(Json(response::listing(
        group_order_rows(rows),
        "orderspending/delayed",
    )))
}

#[derive(Debug, Deserialize)]
struct UpdateStockFlag {
    withoutstock: i32,
    #[serde(rename = "idOrder")]
    order_id: String,
}

/// PATCH /orderspending
async fn update_stock_flag(
    State(state): State<AppState>,
    Json(data): Json<UpdateStockFlag>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    validate_flag(data.withoutstock)?;
    validate_order_id(&data.order_id)?;

    tracing::info!(order_id = %data.order_id, "updating stock flag");

    let rows = state
        .orders
        .set_pending_without_stock(&data.order_id, data.withoutstock)
        .await
        .map_err(repo_error)?;

    Ok(Json(response::updated(rows)))
}

// ============================================================================
// Out-of-stock Orders
// ============================================================================

/// GET /ordersoutofstock
async fn get_orders_out_of_stock(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Order>>>, AppError> {
    let rows = state
        .orders
        .out_of_stock_detail(DeadlineWindow::All)
        .await
        .map_err(repo_error)?;
    Ok(Json(response::listing(
        group_order_rows(rows),
        "ordersoutofstock",
    )))
}

/// GET /ordersoutofstock/untiltoday
async fn get_orders_out_of_stock_until_today(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Order>>>, AppError> {
    let rows = state
        .orders
        .out_of_stock_detail(DeadlineWindow::UntilToday)
        .await
        .map_err(repo_error)?;
    Ok(Json(response::listing(
        group_order_rows(rows),
        "ordersoutofstock/untiltoday",
    )))
}

/// GET /ordersoutofstock/delayed
async fn get_orders_out_of_stock_delayed(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Order>>>, AppError> {
    let rows = state
        .orders
        .out_of_stock_detail(DeadlineWindow::Delayed)
        .await
        .map_err(repo_error)?;
    Ok(Json(response::listing(
        group_order_rows(rows),
        "ordersoutofstock/delayed",
    )))
}

#[derive(Debug, Deserialize)]
struct UpdateFakeFlag {
    #[serde(rename = "isFake")]
    is_fake: i32,
    #[serde(rename = "idOrder")]
    order_id: String,
}

/// PATCH /ordersoutofstock
async fn update_fake_flag(
    State(state): State<AppState>,
    Json(data): Json<UpdateFakeFlag>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    validate_flag(data.is_fake)?;
    validate_order_id(&data.order_id)?;

    tracing::info!(order_id = %data.order_id, "updating fake flag");

    let rows = state
        .orders
        .set_ship_fake(&data.order_id, data.is_fake)
        .await
        .map_err(repo_error)?;

    Ok(Json(response::updated(rows)))
}

// ============================================================================
// Fake Shipments
// ============================================================================

/// GET /ordersshipfake
async fn get_orders_ship_fake(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Order>>>, AppError> {
    let rows = state
        .orders
        .fake_shipment_detail()
        .await
        .map_err(repo_error)?;
    Ok(Json(response::listing(
        group_order_rows(rows),
        "ordersshipfake",
    )))
}

fn validate_flag(value: i32) -> Result<(), AppError> {
    if value != 0 && value != 1 {
        return Err(AppError::ValidationError(
            "flag value must be 0 or 1".to_string(),
        ));
    }
    Ok(())
}

fn validate_order_id(order_id: &str) -> Result<(), AppError> {
    if order_id.trim().is_empty() {
        return Err(AppError::ValidationError("idOrder is required".to_string()));
    }
    Ok(())
}
