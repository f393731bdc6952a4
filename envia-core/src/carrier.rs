use async_trait::async_trait;

use crate::models::ShipmentFields;
use crate::outcome::ShipmentOutcome;

/// Seam between the registration orchestrator and the carrier integration.
///
/// An `Ok` value is any parsed carrier response, success or business-level
/// failure — the outcome's result code carries that distinction. `Err` means
/// the exchange never produced a document to parse; the orchestrator
/// converts it into a synthetic failure outcome and must not mutate state.
#[async_trait]
pub trait CarrierGateway: Send + Sync {
    async fn register(
        &self,
        fields: &ShipmentFields,
    ) -> Result<ShipmentOutcome, Box<dyn std::error::Error + Send + Sync>>;
}
