use serde::{Deserialize, Serialize};

/// How a shipment gets registered with the carrier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum RegistrationMode {
    /// Batch eligible orders into one exportable manifest file.
    BulkFile,
    /// Register a single order synchronously against the carrier web service.
    SingleService,
}

/// Deadline filter applied to the pending/out-of-stock order listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadlineWindow {
    All,
    UntilToday,
    Delayed,
}

/// One flat row of the order-detail result set: order columns plus the
/// columns of a single item. The grouping pass folds these into `Order`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetailRecord {
    pub amazon_order_id: String,
    pub purchase_date: String,
    pub last_update_date: String,
    pub order_status: String,
    pub fulfillment_channel: String,
    pub sales_channel: String,
    pub ship_service_level: String,
    pub shipping_address_name: String,
    pub shipping_address_address_line1: String,
    pub shipping_address_city: String,
    pub shipping_address_state_or_region: Option<String>,
    pub shipping_address_postal_code: String,
    pub shipping_address_country_code: String,
    pub number_of_items_shipped: i32,
    pub number_of_items_unshipped: i32,
    pub payment_method: String,
    pub marketplace: String,
    pub shipment_service_level_category: String,
    pub order_total: f64,
    pub is_premium_order: bool,
    pub is_prime: bool,
    pub is_business_order: bool,
    pub latest_ship_date: String,
    pub latest_delivery_date: String,
    pub order_item_id: String,
    pub sku: String,
    pub product_name: String,
    pub quantity_purchased: i32,
    pub item_price: f64,
    pub item_tax: f64,
    pub shipping_price: f64,
    pub shipping_tax: f64,
    pub vat_exclusive_item_price: Option<f64>,
    pub vat_exclusive_shipping_price: Option<f64>,
    pub asin: Option<String>,
    #[serde(rename = "referenciaProv")]
    pub referencia_prov: Option<String>,
}

/// A customer order with its nested items, as served to the frontend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub amazon_order_id: String,
    pub purchase_date: String,
    pub last_update_date: String,
    pub order_status: String,
    pub fulfillment_channel: String,
    pub sales_channel: String,
    pub ship_service_level: String,
    pub shipping_address_name: String,
    pub shipping_address_address_line1: String,
    pub shipping_address_city: String,
    pub shipping_address_state_or_region: Option<String>,
    pub shipping_address_postal_code: String,
    pub shipping_address_country_code: String,
    pub number_of_items_shipped: i32,
    pub number_of_items_unshipped: i32,
    pub payment_method: String,
    pub marketplace: String,
    pub shipment_service_level_category: String,
    pub order_total: f64,
    pub is_premium_order: bool,
    pub is_prime: bool,
    pub is_business_order: bool,
    pub latest_ship_date: String,
    pub latest_delivery_date: String,
    pub items: Vec<OrderItem>,
}

/// An individual product line within an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub order_item_id: String,
    pub sku: String,
    pub product_name: String,
    pub quantity_purchased: i32,
    pub item_price: f64,
    pub item_tax: f64,
    pub shipping_price: f64,
    pub shipping_tax: f64,
    pub vat_exclusive_item_price: Option<f64>,
    pub vat_exclusive_shipping_price: Option<f64>,
    pub asin: Option<String>,
    #[serde(rename = "referenciaProv")]
    pub referencia_prov: Option<String>,
}

/// A shipment-queue record. Wire names are the frontend contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectedShipment {
    #[serde(rename = "idOrder")]
    pub order_id: String,
    #[serde(rename = "servicio")]
    pub service_code: String,
    #[serde(rename = "horario")]
    pub schedule_code: String,
    #[serde(rename = "destinatario")]
    pub recipient_name: String,
    #[serde(rename = "direccion")]
    pub address: String,
    #[serde(rename = "poblacion")]
    pub city: String,
    #[serde(rename = "pais")]
    pub country: String,
    #[serde(rename = "cp")]
    pub postal_code: String,
    #[serde(rename = "telefono")]
    pub phone: String,
    #[serde(rename = "movil")]
    pub mobile: String,
    pub email: String,
    #[serde(rename = "departamento")]
    pub department: String,
    #[serde(rename = "contacto")]
    pub contact: String,
    #[serde(rename = "observaciones")]
    pub notes: String,
    #[serde(rename = "bultos")]
    pub packages: i32,
    #[serde(rename = "peso")]
    pub weight_kg: f64,
    #[serde(rename = "refC")]
    pub reference: String,
    pub process: String,
    #[serde(rename = "fileGenerateName")]
    pub file_generate_name: Option<String>,
}

/// The field data the carrier request is built from, fetched per order
/// from the data layer right before the web-service call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShipmentFields {
    pub order_id: String,
    pub service_code: String,
    pub schedule_code: String,
    pub packages: i32,
    pub weight_kg: f64,
    pub recipient_name: String,
    pub address: String,
    pub city: String,
    pub country: String,
    pub postal_code: String,
    pub phone: String,
    pub mobile: String,
    pub email: String,
    pub department: String,
    pub notes: String,
    pub reference: String,
}

/// Columns of the shipment queue that the single-field PATCH may touch.
/// Anything not in this enum cannot reach the store layer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ShipmentColumn {
    #[serde(rename = "servicio")]
    Service,
    #[serde(rename = "horario")]
    Schedule,
    #[serde(rename = "destinatario")]
    Recipient,
    #[serde(rename = "direccion")]
    Address,
    #[serde(rename = "pais")]
    Country,
    #[serde(rename = "cp")]
    PostalCode,
    #[serde(rename = "poblacion")]
    City,
    #[serde(rename = "telefono")]
    Phone,
    #[serde(rename = "email")]
    Email,
    #[serde(rename = "departamento")]
    Department,
    #[serde(rename = "contacto")]
    Contact,
    #[serde(rename = "observaciones")]
    Notes,
    #[serde(rename = "bultos")]
    Packages,
    #[serde(rename = "movil")]
    Mobile,
    #[serde(rename = "refC")]
    Reference,
}

impl ShipmentColumn {
    /// Column name as it exists in the shipment queue table.
    pub fn as_column(&self) -> &'static str {
        match self {
            ShipmentColumn::Service => "servicio",
            ShipmentColumn::Schedule => "horario",
            ShipmentColumn::Recipient => "destinatario",
            ShipmentColumn::Address => "direccion",
            ShipmentColumn::Country => "pais",
            ShipmentColumn::PostalCode => "cp",
            ShipmentColumn::City => "poblacion",
            ShipmentColumn::Phone => "telefono",
            ShipmentColumn::Email => "email",
            ShipmentColumn::Department => "departamento",
            ShipmentColumn::Contact => "contacto",
            ShipmentColumn::Notes => "observaciones",
            ShipmentColumn::Packages => "bultos",
            ShipmentColumn::Mobile => "movil",
            ShipmentColumn::Reference => "refC",
        }
    }
}

/// Payload for inserting a new shipment-queue record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSelectedShipment {
    #[serde(rename = "idOrder")]
    pub order_id: String,
    #[serde(rename = "servicio")]
    pub service_code: String,
    #[serde(rename = "horario")]
    pub schedule_code: String,
    #[serde(rename = "destinatario")]
    pub recipient_name: String,
    #[serde(rename = "direccion")]
    pub address: String,
    #[serde(rename = "pais")]
    pub country: String,
    #[serde(rename = "cp")]
    pub postal_code: String,
    #[serde(rename = "poblacion")]
    pub city: String,
    #[serde(rename = "telefono")]
    pub phone: String,
    pub email: String,
    #[serde(rename = "departamento")]
    pub department: String,
    #[serde(rename = "contacto")]
    pub contact: String,
    #[serde(rename = "observaciones")]
    pub notes: String,
    #[serde(rename = "bultos")]
    pub packages: i32,
    #[serde(rename = "movil")]
    pub mobile: String,
    #[serde(rename = "refC")]
    pub reference: String,
    pub process: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_mode_uses_kebab_case_on_the_wire() {
        let mode: RegistrationMode = serde_json::from_str("\"single-service\"").unwrap();
        assert_eq!(mode, RegistrationMode::SingleService);

        let mode: RegistrationMode = serde_json::from_str("\"bulk-file\"").unwrap();
        assert_eq!(mode, RegistrationMode::BulkFile);

        assert!(serde_json::from_str::<RegistrationMode>("\"usingWS\"").is_err());
    }

    #[test]
    fn shipment_column_rejects_unknown_names() {
        let col: ShipmentColumn = serde_json::from_str("\"refC\"").unwrap();
        assert_eq!(col.as_column(), "refC");

        assert!(serde_json::from_str::<ShipmentColumn>("\"fileGenerateName\"").is_err());
        assert!(serde_json::from_str::<ShipmentColumn>("\"idOrder\"").is_err());
    }
}
