pub mod registration;

pub use registration::{
    batch_file_name, RegistrationError, RegistrationOutcome, ShipmentRegistrar,
};
