use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use envia_core::models::{NewSelectedShipment, RegistrationMode, SelectedShipment, ShipmentColumn};
use envia_order::{RegistrationError, RegistrationOutcome};

use crate::error::AppError;
use crate::response::{self, ApiResponse};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/ordersreadytoship",
            get(get_orders_ready_to_ship)
                .post(create_order_ready_to_ship)
                .patch(update_order_ready_to_ship)
                .delete(delete_order_ready_to_ship),
        )
        .route("/ordershistory", get(get_orders_history))
        .route("/ordershistory/{filename}", get(get_shipments_by_filename))
        .route("/registershipment", patch(register_shipment))
}

fn repo_error(e: envia_core::RepoError) -> AppError {
    AppError::InternalServerError(e.to_string())
}

// ============================================================================
// Shipment Queue
// ============================================================================

/// GET /ordersreadytoship
async fn get_orders_ready_to_ship(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<SelectedShipment>>>, AppError> {
    let shipments = state.shipments.selected().await.map_err(repo_error)?;
    Ok(Json(response::success(shipments)))
}

/// GET /ordershistory
async fn get_orders_history(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<SelectedShipment>>>, AppError> {
    let shipments = state.shipments.history().await.map_err(repo_error)?;
    Ok(Json(response::success(shipments)))
}

/// GET /ordershistory/{filename}
async fn get_shipments_by_filename(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Json<ApiResponse<Vec<SelectedShipment>>>, AppError> {
    let shipments = state
        .shipments
        .by_file(&filename)
        .await
        .map_err(repo_error)?;
    Ok(Json(response::success(shipments)))
}

#[derive(Debug, Deserialize)]
struct CreateShipmentRequest {
    #[serde(flatten)]
    shipment: NewSelectedShipment,
    #[serde(rename = "shipmentType")]
    mode: RegistrationMode,
    #[serde(default = "default_flag_on")]
    value: i32,
}

fn default_flag_on() -> i32 {
    1
}

impl CreateShipmentRequest {
    fn validate(&self) -> Result<(), AppError> {
        let s = &self.shipment;
        let checks: [(&str, bool); 10] = [
            ("idOrder is required", !s.order_id.trim().is_empty()),
            ("servicio is required", !s.service_code.trim().is_empty()),
            ("horario is required", !s.schedule_code.trim().is_empty()),
            (
                "destinatario must have at least three characters",
                s.recipient_name.trim().len() >= 3,
            ),
            (
                "direccion must have at least three characters",
                s.address.trim().len() >= 3,
            ),
            (
                "poblacion must have at least three characters",
                s.city.trim().len() >= 3,
            ),
            (
                "cp must have at least four characters",
                s.postal_code.trim().len() >= 4,
            ),
            ("telefono is required", !s.phone.trim().is_empty()),
            ("email must contain @", s.email.contains('@')),
            ("bultos must be at least 1", s.packages >= 1),
        ];

        for (message, passed) in checks {
            if !passed {
                return Err(AppError::ValidationError(message.to_string()));
            }
        }

        if self.shipment.process.trim().is_empty() {
            return Err(AppError::ValidationError("process is required".to_string()));
        }

        Ok(())
    }
}

/// POST /ordersreadytoship
/// Adds an order to the shipment queue after checking it exists and has
/// not shipped yet.
async fn create_order_ready_to_ship(
    State(state): State<AppState>,
    Json(data): Json<CreateShipmentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<()>>), AppError> {
    data.validate()?;

    let order_id = data.shipment.order_id.clone();
    tracing::info!(order_id, "creating shipment");

    if !state.orders.exists(&order_id).await.map_err(repo_error)? {
        return Ok((
            StatusCode::CREATED,
            Json(response::created_with_message(0, "order does not exist")),
        ));
    }

    if !state
        .orders
        .is_not_shipped(&order_id)
        .await
        .map_err(repo_error)?
    {
        return Ok((
            StatusCode::CREATED,
            Json(response::created_with_message(0, "order already shipped")),
        ));
    }

    match data.mode {
        RegistrationMode::BulkFile => state
            .shipments
            .set_mark_shipment(&order_id, data.value)
            .await
            .map_err(repo_error)?,
        RegistrationMode::SingleService => state
            .shipments
            .set_selected_shipment(&order_id, data.value)
            .await
            .map_err(repo_error)?,
    };

    let rows = state
        .shipments
        .insert_selected(&data.shipment)
        .await
        .map_err(repo_error)?;

    tracing::info!(order_id, "shipment created");

    Ok((StatusCode::CREATED, Json(response::created(rows))))
}

#[derive(Debug, Deserialize)]
struct UpdateShipmentRequest {
    #[serde(rename = "columnName")]
    column: ShipmentColumn,
    #[serde(rename = "columnValue")]
    value: String,
    #[serde(rename = "idOrder")]
    order_id: String,
}

/// PATCH /ordersreadytoship
/// Single-column update, restricted to the allowlisted columns and only
/// while no manifest file has been generated for the record.
async fn update_order_ready_to_ship(
    State(state): State<AppState>,
    Json(data): Json<UpdateShipmentRequest>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    if data.value.trim().is_empty() {
        return Err(AppError::ValidationError(
            "columnValue is required".to_string(),
        ));
    }
    if data.order_id.trim().is_empty() {
        return Err(AppError::ValidationError("idOrder is required".to_string()));
    }

    tracing::info!(
        order_id = %data.order_id,
        column = data.column.as_column(),
        "updating shipment"
    );

    let rows = state
        .shipments
        .update_selected_field(&data.order_id, data.column, &data.value)
        .await
        .map_err(repo_error)?;

    Ok(Json(response::updated(rows)))
}

#[derive(Debug, Deserialize)]
struct DeleteShipmentRequest {
    #[serde(rename = "idOrder")]
    order_id: String,
    #[serde(rename = "shipmentType")]
    mode: RegistrationMode,
    #[serde(default)]
    value: i32,
}

/// DELETE /ordersreadytoship
/// Removes an order from the shipment queue and resets its selection flag.
async fn delete_order_ready_to_ship(
    State(state): State<AppState>,
    Json(data): Json<DeleteShipmentRequest>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    if data.order_id.trim().is_empty() {
        return Err(AppError::ValidationError("idOrder is required".to_string()));
    }

    tracing::info!(order_id = %data.order_id, "deleting shipment");

    if !state
        .orders
        .exists(&data.order_id)
        .await
        .map_err(repo_error)?
    {
        return Ok(Json(response::deleted_with_message(0, "order does not exist")));
    }

    let rows = state
        .shipments
        .delete_selected(&data.order_id)
        .await
        .map_err(repo_error)?;

    if rows > 0 {
        match data.mode {
            RegistrationMode::BulkFile => state
                .shipments
                .set_mark_shipment(&data.order_id, data.value)
                .await
                .map_err(repo_error)?,
            RegistrationMode::SingleService => state
                .shipments
                .set_selected_shipment(&data.order_id, data.value)
                .await
                .map_err(repo_error)?,
        };

        tracing::info!(order_id = %data.order_id, "shipment deleted");
    }

    Ok(Json(response::deleted(rows)))
}

// ============================================================================
// Shipment Registration
// ============================================================================

#[derive(Debug, Deserialize)]
struct RegisterShipmentRequest {
    #[serde(rename = "shipmentType")]
    mode: RegistrationMode,
    #[serde(rename = "idOrder")]
    order_id: Option<String>,
}

/// PATCH /registershipment
/// Bulk mode batches every eligible order into one manifest file; single
/// mode registers one order against the carrier web service.
async fn register_shipment(
    State(state): State<AppState>,
    Json(data): Json<RegisterShipmentRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    tracing::info!(mode = ?data.mode, "registering shipment");

    let outcome = state
        .registrar
        .register(data.mode, data.order_id.as_deref())
        .await;

    match outcome {
        Ok(RegistrationOutcome::Empty) => {
            Ok(Json(response::success_with(json!([]), 0, None)))
        }
        Ok(RegistrationOutcome::Rejected(message)) => Ok(Json(response::success_with(
            json!([]),
            0,
            Some(message.to_string()),
        ))),
        Ok(RegistrationOutcome::File { file_name, records }) => {
            tracing::info!(file = %file_name, count = records.len(), "file shipment registered");
            Ok(Json(response::success_with(
                serde_json::to_value(records)?,
                1,
                None,
            )))
        }
        Ok(RegistrationOutcome::WebService(outcome)) => Ok(Json(response::success_with(
            serde_json::to_value(*outcome)?,
            1,
            None,
        ))),
        Err(RegistrationError::MissingOrderId) => Err(AppError::ValidationError(
            "idOrder is required for shipmentType=single-service".to_string(),
        )),
        Err(RegistrationError::Repository(e)) => {
            Err(AppError::InternalServerError(e.to_string()))
        }
    }
}
