use serde::Deserialize;

/// Static carrier account configuration. Built once from app config at
/// startup and passed by reference into the request builder — never read
/// from the environment at call time.
#[derive(Debug, Clone, Deserialize)]
pub struct CarrierConfig {
    /// Client uid the carrier issued for this account.
    pub client_uid: String,
    /// Web-service endpoint the registration document is posted to.
    pub endpoint: String,
    /// Charge mode flag (`Portes`), e.g. "P" for prepaid.
    pub charges: String,
    /// Cash-on-delivery amount (`Reembolso`), usually "0".
    pub cash_on_delivery: String,
    pub sender_name: String,
    pub sender_address: String,
    pub sender_city: String,
    pub sender_country: String,
    pub sender_postal_code: String,
}
