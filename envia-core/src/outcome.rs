use serde::{Deserialize, Serialize};

/// The single result code the carrier defines as success. Comparison is an
/// exact string match: `"00"`, `"0 "` or any signed form are failures.
pub const CARRIER_SUCCESS_CODE: &str = "0";

/// Synthetic code used when no parseable carrier response exists at all
/// (transport failure, malformed document, missing nodes).
pub const CARRIER_FAILURE_CODE: &str = "-1";

/// A typed reference echoed back by the carrier for a registered shipment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShipmentReference {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

/// Normalized result of one carrier web-service call. Built fresh per
/// attempt by the response parser; never persisted directly — on success
/// the orchestrator copies the carrier identifiers into the data layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShipmentOutcome {
    /// Carrier-native result code in string form.
    #[serde(rename = "codResponseWS")]
    pub result_code: String,
    /// Raw error text extracted from the carrier response, empty on success.
    #[serde(rename = "responseWS")]
    pub carrier_message: String,
    /// Human-readable summary of what happened.
    #[serde(rename = "messageWS")]
    pub message: String,
    #[serde(rename = "idOrder")]
    pub order_id: String,
    /// Carrier-assigned expedition id.
    #[serde(rename = "uidExp", default, skip_serializing_if = "String::is_empty")]
    pub expedition_uid: String,
    /// Carrier-assigned expedition/tracking code.
    #[serde(rename = "exp", default, skip_serializing_if = "String::is_empty")]
    pub tracking_code: String,
    #[serde(rename = "codBar", default, skip_serializing_if = "String::is_empty")]
    pub barcode: String,
    #[serde(rename = "refs", default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<ShipmentReference>,
    /// Base64-encoded PDF label, when the carrier returned one inline.
    #[serde(rename = "LabelBase64", default, skip_serializing_if = "Option::is_none")]
    pub label_base64: Option<String>,
}

impl ShipmentOutcome {
    /// Successful registration with the identifiers the carrier assigned.
    pub fn success(
        order_id: impl Into<String>,
        expedition_uid: impl Into<String>,
        tracking_code: impl Into<String>,
        barcode: impl Into<String>,
        references: Vec<ShipmentReference>,
        label_base64: Option<String>,
    ) -> Self {
        Self {
            result_code: CARRIER_SUCCESS_CODE.to_string(),
            carrier_message: String::new(),
            message: "shipment inserted ok".to_string(),
            order_id: order_id.into(),
            expedition_uid: expedition_uid.into(),
            tracking_code: tracking_code.into(),
            barcode: barcode.into(),
            references,
            label_base64,
        }
    }

    /// Business-level failure reported by the carrier. No identifiers are
    /// ever populated on this path.
    pub fn failure(
        result_code: impl Into<String>,
        carrier_message: impl Into<String>,
        message: impl Into<String>,
        order_id: impl Into<String>,
    ) -> Self {
        Self {
            result_code: result_code.into(),
            carrier_message: carrier_message.into(),
            message: message.into(),
            order_id: order_id.into(),
            expedition_uid: String::new(),
            tracking_code: String::new(),
            barcode: String::new(),
            references: Vec::new(),
            label_base64: None,
        }
    }

    /// Synthetic failure for attempts that never produced a parseable
    /// carrier response.
    pub fn request_failed(order_id: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::failure(
            CARRIER_FAILURE_CODE,
            detail,
            "carrier request failed",
            order_id,
        )
    }

    pub fn is_success(&self) -> bool {
        self.result_code == CARRIER_SUCCESS_CODE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_is_exact_string_match() {
        let ok = ShipmentOutcome::success("A1", "u", "e", "b", vec![], None);
        assert!(ok.is_success());

        let padded = ShipmentOutcome::failure("00", "", "looks like zero", "A1");
        assert!(!padded.is_success());
    }

    #[test]
    fn request_failed_carries_the_synthetic_code() {
        let outcome = ShipmentOutcome::request_failed("A1", "connection refused");
        assert_eq!(outcome.result_code, CARRIER_FAILURE_CODE);
        assert_eq!(outcome.carrier_message, "connection refused");
        assert!(outcome.expedition_uid.is_empty());
        assert!(outcome.barcode.is_empty());
    }
}
