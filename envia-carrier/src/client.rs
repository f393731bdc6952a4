use std::time::Duration;

use async_trait::async_trait;

use envia_core::{CarrierGateway, ShipmentFields, ShipmentOutcome};

use crate::config::CarrierConfig;
use crate::request::build_request;
use crate::response::parse_response;
use crate::CarrierError;

/// One POST per registration; no retries, no idempotency key.
const CARRIER_TIMEOUT: Duration = Duration::from_secs(30);

/// GLS web-service client: builds the request document, posts it and
/// parses the reply.
pub struct GlsClient {
    http: reqwest::Client,
    config: CarrierConfig,
}

impl GlsClient {
    /// The carrier endpoint presents a certificate chain our trust store
    /// rejects, so verification is disabled for this client only. Every
    /// other outbound channel in the process verifies normally.
    pub fn new(config: CarrierConfig) -> Result<Self, CarrierError> {
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(CARRIER_TIMEOUT)
            .build()
            .map_err(|e| CarrierError::Transport(e.to_string()))?;

        tracing::warn!(
            endpoint = %config.endpoint,
            "carrier channel configured with TLS verification disabled"
        );

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &CarrierConfig {
        &self.config
    }

    /// POST the request document and return the raw response body.
    async fn post(&self, document: String) -> Result<String, CarrierError> {
        let response = self
            .http
            .post(&self.config.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "text/xml; charset=UTF-8")
            .body(document)
            .send()
            .await
            .map_err(|e| CarrierError::Transport(e.to_string()))?;

        tracing::info!(status = %response.status(), "carrier web service responded");

        response
            .text()
            .await
            .map_err(|e| CarrierError::Transport(e.to_string()))
    }
}

#[async_trait]
impl CarrierGateway for GlsClient {
    async fn register(
        &self,
        fields: &ShipmentFields,
    ) -> Result<ShipmentOutcome, Box<dyn std::error::Error + Send + Sync>> {
        let document = build_request(fields, &self.config)?;
        let body = self.post(document).await?;
        Ok(parse_response(&body, &fields.order_id))
    }
}
