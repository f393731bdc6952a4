use async_trait::async_trait;

use crate::models::{
    DeadlineWindow, NewSelectedShipment, OrderDetailRecord, SelectedShipment, ShipmentColumn,
    ShipmentFields,
};

pub type RepoError = Box<dyn std::error::Error + Send + Sync>;

/// Read/flag access to orders and their detail rows.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Unshipped detail rows for a single order.
    async fn order_detail(&self, order_id: &str) -> Result<Vec<OrderDetailRecord>, RepoError>;

    /// Unshipped detail rows, optionally narrowed by deadline.
    async fn pending_detail(
        &self,
        window: DeadlineWindow,
    ) -> Result<Vec<OrderDetailRecord>, RepoError>;

    /// Unshipped rows flagged as lacking stock, optionally narrowed by deadline.
    async fn out_of_stock_detail(
        &self,
        window: DeadlineWindow,
    ) -> Result<Vec<OrderDetailRecord>, RepoError>;

    /// Unshipped rows marked for fake shipment.
    async fn fake_shipment_detail(&self) -> Result<Vec<OrderDetailRecord>, RepoError>;

    async fn exists(&self, order_id: &str) -> Result<bool, RepoError>;

    /// True while the order has not been registered with the carrier yet.
    async fn is_not_shipped(&self, order_id: &str) -> Result<bool, RepoError>;

    async fn set_pending_without_stock(&self, order_id: &str, flag: i32)
        -> Result<u64, RepoError>;

    async fn set_ship_fake(&self, order_id: &str, flag: i32) -> Result<u64, RepoError>;
}

/// Access to the shipment queue and the carrier-result write path.
#[async_trait]
pub trait ShipmentRepository: Send + Sync {
    async fn selected(&self) -> Result<Vec<SelectedShipment>, RepoError>;

    async fn history(&self) -> Result<Vec<SelectedShipment>, RepoError>;

    async fn by_file(&self, filename: &str) -> Result<Vec<SelectedShipment>, RepoError>;

    async fn insert_selected(&self, shipment: &NewSelectedShipment) -> Result<u64, RepoError>;

    /// Single-column update, restricted by `ShipmentColumn` and only while
    /// no manifest file has been generated for the record.
    async fn update_selected_field(
        &self,
        order_id: &str,
        column: ShipmentColumn,
        value: &str,
    ) -> Result<u64, RepoError>;

    async fn delete_selected(&self, order_id: &str) -> Result<u64, RepoError>;

    async fn set_mark_shipment(&self, order_id: &str, value: i32) -> Result<u64, RepoError>;

    async fn set_selected_shipment(&self, order_id: &str, value: i32) -> Result<u64, RepoError>;

    /// Queue records not yet assigned to a manifest file.
    async fn bulk_candidates(&self) -> Result<Vec<SelectedShipment>, RepoError>;

    /// Field data for one order's web-service registration.
    async fn fields_for_order(&self, order_id: &str)
        -> Result<Option<ShipmentFields>, RepoError>;

    /// Stamp every unassigned queue record with the manifest file name.
    /// One statement regardless of how many records match.
    async fn assign_shipment_file(&self, file_name: &str) -> Result<u64, RepoError>;

    /// Propagate the shipped-via-file status onto the order-detail rows.
    async fn mark_order_detail_file_shipped(&self) -> Result<u64, RepoError>;

    async fn write_carrier_identifiers(
        &self,
        order_id: &str,
        expedition_uid: &str,
        tracking_code: &str,
        barcode: &str,
    ) -> Result<u64, RepoError>;

    async fn mark_shipment_completed_ws(&self, order_id: &str) -> Result<u64, RepoError>;

    async fn write_order_tracking(
        &self,
        order_id: &str,
        tracking_code: &str,
    ) -> Result<u64, RepoError>;
}
