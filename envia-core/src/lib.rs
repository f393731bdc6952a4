pub mod carrier;
pub mod grouping;
pub mod models;
pub mod outcome;
pub mod repository;

pub use carrier::CarrierGateway;
pub use models::{
    DeadlineWindow, NewSelectedShipment, Order, OrderDetailRecord, OrderItem, RegistrationMode,
    SelectedShipment, ShipmentColumn, ShipmentFields,
};
pub use outcome::{ShipmentOutcome, ShipmentReference, CARRIER_FAILURE_CODE, CARRIER_SUCCESS_CODE};
pub use repository::{OrderRepository, RepoError, ShipmentRepository};
