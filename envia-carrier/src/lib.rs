pub mod client;
pub mod config;
pub mod request;
pub mod response;

pub use client::GlsClient;
pub use config::CarrierConfig;
pub use request::build_request;
pub use response::{error_message, parse_response};

#[derive(Debug, thiserror::Error)]
pub enum CarrierError {
    #[error("missing required shipment field: {0}")]
    MissingField(&'static str),

    #[error("failed to encode carrier request: {0}")]
    Encode(String),

    #[error("carrier transport failure: {0}")]
    Transport(String),
}
