use std::sync::Arc;

use chrono::{DateTime, Local};

use envia_core::{
    CarrierGateway, OrderRepository, RegistrationMode, RepoError, SelectedShipment,
    ShipmentOutcome, ShipmentRepository,
};

/// Drives one shipment registration request end to end: mode selection,
/// precondition checks, carrier interaction and the dependent database
/// updates.
pub struct ShipmentRegistrar {
    orders: Arc<dyn OrderRepository>,
    shipments: Arc<dyn ShipmentRepository>,
    carrier: Arc<dyn CarrierGateway>,
}

/// What a registration request produced.
#[derive(Debug)]
pub enum RegistrationOutcome {
    /// Nothing to do: no bulk candidates, or no field data for the order.
    Empty,
    /// A precondition failed; nothing was mutated.
    Rejected(&'static str),
    /// Bulk path: the manifest file name and the records assigned to it.
    File {
        file_name: String,
        records: Vec<SelectedShipment>,
    },
    /// Single-service path: the normalized carrier outcome, success or not.
    WebService(Box<ShipmentOutcome>),
}

#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error("order id is required for single-service registration")]
    MissingOrderId,

    #[error("data layer failure: {0}")]
    Repository(RepoError),
}

impl ShipmentRegistrar {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        shipments: Arc<dyn ShipmentRepository>,
        carrier: Arc<dyn CarrierGateway>,
    ) -> Self {
        Self {
            orders,
            shipments,
            carrier,
        }
    }

    /// Entry point; one call per registration request.
    pub async fn register(
        &self,
        mode: RegistrationMode,
        order_id: Option<&str>,
    ) -> Result<RegistrationOutcome, RegistrationError> {
        match mode {
            RegistrationMode::BulkFile => self.register_bulk().await,
            RegistrationMode::SingleService => {
                let order_id = order_id
                    .filter(|id| !id.trim().is_empty())
                    .ok_or(RegistrationError::MissingOrderId)?;
                self.register_single(order_id).await
            }
        }
    }

    /// Batch every unassigned queue record into one manifest file.
    ///
    /// Exactly two mutations regardless of how many records are selected:
    /// stamping the file name onto the queue, then propagating the
    /// shipped-via-file status onto the order detail. Each commits
    /// independently; a failure between them leaves filed-but-unflagged
    /// records behind for the next reconciliation pass.
    async fn register_bulk(&self) -> Result<RegistrationOutcome, RegistrationError> {
        let mut records = self
            .shipments
            .bulk_candidates()
            .await
            .map_err(RegistrationError::Repository)?;

        if records.is_empty() {
            return Ok(RegistrationOutcome::Empty);
        }

        let file_name = batch_file_name(Local::now());
        for record in &mut records {
            record.file_generate_name = Some(file_name.clone());
        }

        let stamped = self
            .shipments
            .assign_shipment_file(&file_name)
            .await
            .map_err(RegistrationError::Repository)?;
        let flagged = self
            .shipments
            .mark_order_detail_file_shipped()
            .await
            .map_err(RegistrationError::Repository)?;

        tracing::info!(file = %file_name, stamped, flagged, "bulk shipment file registered");

        Ok(RegistrationOutcome::File { file_name, records })
    }

    /// Register one order against the carrier web service.
    async fn register_single(
        &self,
        order_id: &str,
    ) -> Result<RegistrationOutcome, RegistrationError> {
        if !self
            .orders
            .exists(order_id)
            .await
            .map_err(RegistrationError::Repository)?
        {
            return Ok(RegistrationOutcome::Rejected("order does not exist"));
        }

        if !self
            .orders
            .is_not_shipped(order_id)
            .await
            .map_err(RegistrationError::Repository)?
        {
            return Ok(RegistrationOutcome::Rejected("order already shipped"));
        }

        let Some(fields) = self
            .shipments
            .fields_for_order(order_id)
            .await
            .map_err(RegistrationError::Repository)?
        else {
            return Ok(RegistrationOutcome::Empty);
        };

        // A transport-level failure is not a parsed carrier rejection; it
        // becomes a synthetic outcome and must leave the database alone.
        let outcome = match self.carrier.register(&fields).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(order_id, error = %e, "carrier exchange failed");
                ShipmentOutcome::request_failed(order_id, e.to_string())
            }
        };

        if outcome.is_success() {
            // Three sequential updates, each committed on its own. A
            // failure mid-sequence leaves the earlier writes in place.
            self.shipments
                .write_carrier_identifiers(
                    &outcome.order_id,
                    &outcome.expedition_uid,
                    &outcome.tracking_code,
                    &outcome.barcode,
                )
                .await
                .map_err(RegistrationError::Repository)?;
            self.shipments
                .mark_shipment_completed_ws(order_id)
                .await
                .map_err(RegistrationError::Repository)?;
            self.shipments
                .write_order_tracking(order_id, &outcome.tracking_code)
                .await
                .map_err(RegistrationError::Repository)?;

            tracing::info!(order_id, tracking = %outcome.tracking_code, "web-service shipment registered");
        }

        Ok(RegistrationOutcome::WebService(Box::new(outcome)))
    }
}

/// Manifest file name for one bulk registration pass.
pub fn batch_file_name(stamp: DateTime<Local>) -> String {
    format!("Envios_{}.xlsx", stamp.format("%d%m%Y_%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::TimeZone;

    use envia_core::{
        DeadlineWindow, NewSelectedShipment, OrderDetailRecord, ShipmentColumn, ShipmentFields,
    };

    fn shipment_fields(order_id: &str) -> ShipmentFields {
        ShipmentFields {
            order_id: order_id.to_string(),
            service_code: "1".to_string(),
            schedule_code: "3".to_string(),
            packages: 1,
            weight_kg: 2.0,
            recipient_name: "Ana Perez".to_string(),
            address: "Calle Mayor 1".to_string(),
            city: "Madrid".to_string(),
            country: "ES".to_string(),
            postal_code: "28001".to_string(),
            phone: "910000000".to_string(),
            mobile: "600000000".to_string(),
            email: "ana@example.test".to_string(),
            department: String::new(),
            notes: String::new(),
            reference: order_id.to_string(),
        }
    }

    fn queue_record(order_id: &str) -> SelectedShipment {
        SelectedShipment {
            order_id: order_id.to_string(),
            service_code: "1".to_string(),
            schedule_code: "3".to_string(),
            recipient_name: "Ana Perez".to_string(),
            address: "Calle Mayor 1".to_string(),
            city: "Madrid".to_string(),
            country: "ES".to_string(),
            postal_code: "28001".to_string(),
            phone: "910000000".to_string(),
            mobile: "600000000".to_string(),
            email: "ana@example.test".to_string(),
            department: String::new(),
            contact: String::new(),
            notes: String::new(),
            packages: 1,
            weight_kg: 2.0,
            reference: order_id.to_string(),
            process: "WS".to_string(),
            file_generate_name: None,
        }
    }

    struct StubOrders {
        exists: bool,
        not_shipped: bool,
    }

    #[async_trait]
    impl OrderRepository for StubOrders {
        async fn order_detail(&self, _: &str) -> Result<Vec<OrderDetailRecord>, RepoError> {
            Ok(Vec::new())
        }
        async fn pending_detail(
            &self,
            _: DeadlineWindow,
        ) -> Result<Vec<OrderDetailRecord>, RepoError> {
            Ok(Vec::new())
        }
        async fn out_of_stock_detail(
            &self,
            _: DeadlineWindow,
        ) -> Result<Vec<OrderDetailRecord>, RepoError> {
            Ok(Vec::new())
        }
        async fn fake_shipment_detail(&self) -> Result<Vec<OrderDetailRecord>, RepoError> {
            Ok(Vec::new())
        }
        async fn exists(&self, _: &str) -> Result<bool, RepoError> {
            Ok(self.exists)
        }
        async fn is_not_shipped(&self, _: &str) -> Result<bool, RepoError> {
            Ok(self.not_shipped)
        }
        async fn set_pending_without_stock(&self, _: &str, _: i32) -> Result<u64, RepoError> {
            Ok(1)
        }
        async fn set_ship_fake(&self, _: &str, _: i32) -> Result<u64, RepoError> {
            Ok(1)
        }
    }

    /// Records every mutation so tests can assert on count and order.
    #[derive(Default)]
    struct RecordingShipments {
        candidates: Vec<SelectedShipment>,
        fields: Option<ShipmentFields>,
        mutations: Mutex<Vec<String>>,
    }

    impl RecordingShipments {
        fn mutations(&self) -> Vec<String> {
            self.mutations.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ShipmentRepository for RecordingShipments {
        async fn selected(&self) -> Result<Vec<SelectedShipment>, RepoError> {
            Ok(Vec::new())
        }
        async fn history(&self) -> Result<Vec<SelectedShipment>, RepoError> {
            Ok(Vec::new())
        }
        async fn by_file(&self, _: &str) -> Result<Vec<SelectedShipment>, RepoError> {
            Ok(Vec::new())
        }
        async fn insert_selected(&self, _: &NewSelectedShipment) -> Result<u64, RepoError> {
            Ok(1)
        }
        async fn update_selected_field(
            &self,
            _: &str,
            _: ShipmentColumn,
            _: &str,
        ) -> Result<u64, RepoError> {
            Ok(1)
        }
        async fn delete_selected(&self, _: &str) -> Result<u64, RepoError> {
            Ok(1)
        }
        async fn set_mark_shipment(&self, _: &str, _: i32) -> Result<u64, RepoError> {
            Ok(1)
        }
        async fn set_selected_shipment(&self, _: &str, _: i32) -> Result<u64, RepoError> {
            Ok(1)
        }
        async fn bulk_candidates(&self) -> Result<Vec<SelectedShipment>, RepoError> {
            Ok(self.candidates.clone())
        }
        async fn fields_for_order(&self, _: &str) -> Result<Option<ShipmentFields>, RepoError> {
            Ok(self.fields.clone())
        }
        async fn assign_shipment_file(&self, file_name: &str) -> Result<u64, RepoError> {
            self.mutations
                .lock()
                .unwrap()
                .push(format!("assign_shipment_file {file_name}"));
            Ok(self.candidates.len() as u64)
        }
        async fn mark_order_detail_file_shipped(&self) -> Result<u64, RepoError> {
            self.mutations
                .lock()
                .unwrap()
                .push("mark_order_detail_file_shipped".to_string());
            Ok(self.candidates.len() as u64)
        }
        async fn write_carrier_identifiers(
            &self,
            order_id: &str,
            expedition_uid: &str,
            tracking_code: &str,
            barcode: &str,
        ) -> Result<u64, RepoError> {
            self.mutations.lock().unwrap().push(format!(
                "write_carrier_identifiers {order_id} {expedition_uid} {tracking_code} {barcode}"
            ));
            Ok(1)
        }
        async fn mark_shipment_completed_ws(&self, order_id: &str) -> Result<u64, RepoError> {
            self.mutations
                .lock()
                .unwrap()
                .push(format!("mark_shipment_completed_ws {order_id}"));
            Ok(1)
        }
        async fn write_order_tracking(
            &self,
            order_id: &str,
            tracking_code: &str,
        ) -> Result<u64, RepoError> {
            self.mutations
                .lock()
                .unwrap()
                .push(format!("write_order_tracking {order_id} {tracking_code}"));
            Ok(1)
        }
    }

    enum CarrierBehavior {
        Reply(ShipmentOutcome),
        TransportFailure(&'static str),
    }

    struct StubCarrier {
        behavior: CarrierBehavior,
        calls: AtomicUsize,
    }

    impl StubCarrier {
        fn replying(outcome: ShipmentOutcome) -> Self {
            Self {
                behavior: CarrierBehavior::Reply(outcome),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing(message: &'static str) -> Self {
            Self {
                behavior: CarrierBehavior::TransportFailure(message),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CarrierGateway for StubCarrier {
        async fn register(
            &self,
            _fields: &ShipmentFields,
        ) -> Result<ShipmentOutcome, Box<dyn std::error::Error + Send + Sync>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.behavior {
                CarrierBehavior::Reply(outcome) => Ok(outcome.clone()),
                CarrierBehavior::TransportFailure(message) => Err((*message).into()),
            }
        }
    }

    fn registrar(
        orders: StubOrders,
        shipments: Arc<RecordingShipments>,
        carrier: Arc<StubCarrier>,
    ) -> ShipmentRegistrar {
        ShipmentRegistrar::new(Arc::new(orders), shipments, carrier)
    }

    #[tokio::test]
    async fn bulk_with_no_candidates_is_empty_and_touches_nothing() {
        let shipments = Arc::new(RecordingShipments::default());
        let carrier = Arc::new(StubCarrier::failing("unused"));
        let registrar = registrar(
            StubOrders {
                exists: true,
                not_shipped: true,
            },
            shipments.clone(),
            carrier.clone(),
        );

        let outcome = registrar
            .register(RegistrationMode::BulkFile, None)
            .await
            .unwrap();

        assert!(matches!(outcome, RegistrationOutcome::Empty));
        assert!(shipments.mutations().is_empty());
        assert_eq!(carrier.calls(), 0);
    }

    #[tokio::test]
    async fn bulk_shares_one_file_name_and_issues_exactly_two_mutations() {
        let shipments = Arc::new(RecordingShipments {
            candidates: vec![queue_record("A-1"), queue_record("A-2"), queue_record("A-3")],
            ..Default::default()
        });
        let carrier = Arc::new(StubCarrier::failing("unused"));
        let registrar = registrar(
            StubOrders {
                exists: true,
                not_shipped: true,
            },
            shipments.clone(),
            carrier.clone(),
        );

        let outcome = registrar
            .register(RegistrationMode::BulkFile, None)
            .await
            .unwrap();

        let RegistrationOutcome::File { file_name, records } = outcome else {
            panic!("expected the file outcome");
        };
        assert!(file_name.starts_with("Envios_"));
        assert!(file_name.ends_with(".xlsx"));
        assert_eq!(records.len(), 3);
        for record in &records {
            assert_eq!(record.file_generate_name.as_deref(), Some(file_name.as_str()));
        }

        let mutations = shipments.mutations();
        assert_eq!(mutations.len(), 2);
        assert_eq!(mutations[0], format!("assign_shipment_file {file_name}"));
        assert_eq!(mutations[1], "mark_order_detail_file_shipped");
        assert_eq!(carrier.calls(), 0);
    }

    #[tokio::test]
    async fn single_requires_an_order_id() {
        let shipments = Arc::new(RecordingShipments::default());
        let carrier = Arc::new(StubCarrier::failing("unused"));
        let registrar = registrar(
            StubOrders {
                exists: true,
                not_shipped: true,
            },
            shipments,
            carrier,
        );

        let err = registrar
            .register(RegistrationMode::SingleService, None)
            .await
            .unwrap_err();
        assert!(matches!(err, RegistrationError::MissingOrderId));

        let err = registrar
            .register(RegistrationMode::SingleService, Some("  "))
            .await
            .unwrap_err();
        assert!(matches!(err, RegistrationError::MissingOrderId));
    }

    #[tokio::test]
    async fn single_unknown_order_never_reaches_the_carrier() {
        let shipments = Arc::new(RecordingShipments::default());
        let carrier = Arc::new(StubCarrier::failing("unused"));
        let registrar = registrar(
            StubOrders {
                exists: false,
                not_shipped: true,
            },
            shipments.clone(),
            carrier.clone(),
        );

        let outcome = registrar
            .register(RegistrationMode::SingleService, Some("X1"))
            .await
            .unwrap();

        assert!(matches!(
            outcome,
            RegistrationOutcome::Rejected("order does not exist")
        ));
        assert_eq!(carrier.calls(), 0);
        assert!(shipments.mutations().is_empty());
    }

    #[tokio::test]
    async fn single_already_shipped_order_is_rejected() {
        let shipments = Arc::new(RecordingShipments::default());
        let carrier = Arc::new(StubCarrier::failing("unused"));
        let registrar = registrar(
            StubOrders {
                exists: true,
                not_shipped: false,
            },
            shipments.clone(),
            carrier.clone(),
        );

        let outcome = registrar
            .register(RegistrationMode::SingleService, Some("X1"))
            .await
            .unwrap();

        assert!(matches!(
            outcome,
            RegistrationOutcome::Rejected("order already shipped")
        ));
        assert_eq!(carrier.calls(), 0);
    }

    #[tokio::test]
    async fn single_without_field_data_is_empty() {
        let shipments = Arc::new(RecordingShipments::default());
        let carrier = Arc::new(StubCarrier::failing("unused"));
        let registrar = registrar(
            StubOrders {
                exists: true,
                not_shipped: true,
            },
            shipments.clone(),
            carrier.clone(),
        );

        let outcome = registrar
            .register(RegistrationMode::SingleService, Some("X1"))
            .await
            .unwrap();

        assert!(matches!(outcome, RegistrationOutcome::Empty));
        assert_eq!(carrier.calls(), 0);
    }

    #[tokio::test]
    async fn transport_failure_becomes_a_synthetic_outcome_with_no_writes() {
        let shipments = Arc::new(RecordingShipments {
            fields: Some(shipment_fields("X1")),
            ..Default::default()
        });
        let carrier = Arc::new(StubCarrier::failing("connection refused"));
        let registrar = registrar(
            StubOrders {
                exists: true,
                not_shipped: true,
            },
            shipments.clone(),
            carrier.clone(),
        );

        let outcome = registrar
            .register(RegistrationMode::SingleService, Some("X1"))
            .await
            .unwrap();

        let RegistrationOutcome::WebService(outcome) = outcome else {
            panic!("expected a web-service outcome");
        };
        assert_eq!(outcome.result_code, "-1");
        assert_eq!(outcome.message, "carrier request failed");
        assert!(outcome.carrier_message.contains("connection refused"));
        assert_eq!(carrier.calls(), 1);
        assert!(shipments.mutations().is_empty());
    }

    #[tokio::test]
    async fn carrier_success_drives_the_three_update_sequence() {
        let shipments = Arc::new(RecordingShipments {
            fields: Some(shipment_fields("X1")),
            ..Default::default()
        });
        let carrier = Arc::new(StubCarrier::replying(ShipmentOutcome::success(
            "X1",
            "UID-9F",
            "EXP1",
            "84300012345",
            vec![],
            None,
        )));
        let registrar = registrar(
            StubOrders {
                exists: true,
                not_shipped: true,
            },
            shipments.clone(),
            carrier.clone(),
        );

        let outcome = registrar
            .register(RegistrationMode::SingleService, Some("X1"))
            .await
            .unwrap();

        let RegistrationOutcome::WebService(outcome) = outcome else {
            panic!("expected a web-service outcome");
        };
        assert!(outcome.is_success());

        let mutations = shipments.mutations();
        assert_eq!(
            mutations,
            vec![
                "write_carrier_identifiers X1 UID-9F EXP1 84300012345".to_string(),
                "mark_shipment_completed_ws X1".to_string(),
                "write_order_tracking X1 EXP1".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn carrier_business_failure_writes_nothing() {
        let shipments = Arc::new(RecordingShipments {
            fields: Some(shipment_fields("X1")),
            ..Default::default()
        });
        let carrier = Arc::new(StubCarrier::replying(ShipmentOutcome::failure(
            "-3",
            "duplicated barcode",
            "Error, El código de barras del envío ya existe.",
            "X1",
        )));
        let registrar = registrar(
            StubOrders {
                exists: true,
                not_shipped: true,
            },
            shipments.clone(),
            carrier.clone(),
        );

        let outcome = registrar
            .register(RegistrationMode::SingleService, Some("X1"))
            .await
            .unwrap();

        let RegistrationOutcome::WebService(outcome) = outcome else {
            panic!("expected a web-service outcome");
        };
        assert_eq!(outcome.result_code, "-3");
        assert_eq!(outcome.message, "Error, El código de barras del envío ya existe.");
        assert!(shipments.mutations().is_empty());
        assert_eq!(carrier.calls(), 1);
    }

    #[test]
    fn batch_file_name_embeds_the_timestamp() {
        let stamp = Local.with_ymd_and_hms(2025, 3, 7, 14, 5, 9).unwrap();
        assert_eq!(batch_file_name(stamp), "Envios_07032025_140509.xlsx");
    }

    // End-to-end through the real response parser: the stub gateway replies
    // with whatever the parser makes of a canned carrier document.

    fn carrier_document(envio_attrs: &str, envio_children: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="utf-8"?>
<soap:Envelope xmlns:soap="http://www.w3.org/2003/05/soap-envelope">
  <soap:Body>
    <GrabaServiciosResponse xmlns="http://www.asmred.com/">
      <GrabaServiciosResult>
        <Servicios>
          <Envio {envio_attrs}>{envio_children}</Envio>
        </Servicios>
      </GrabaServiciosResult>
    </GrabaServiciosResponse>
  </soap:Body>
</soap:Envelope>"#
        )
    }

    #[tokio::test]
    async fn parsed_success_document_ends_in_three_writes_for_the_order() {
        let document = carrier_document(
            r#"codbarras="843001" uid="UID-9F" codexp="EXP1""#,
            r#"<Resultado return="0"/><Referencias><Referencia tipo="C">X1</Referencia></Referencias>"#,
        );
        let shipments = Arc::new(RecordingShipments {
            fields: Some(shipment_fields("X1")),
            ..Default::default()
        });
        let carrier = Arc::new(StubCarrier::replying(envia_carrier::parse_response(
            &document, "X1",
        )));
        let registrar = registrar(
            StubOrders {
                exists: true,
                not_shipped: true,
            },
            shipments.clone(),
            carrier,
        );

        registrar
            .register(RegistrationMode::SingleService, Some("X1"))
            .await
            .unwrap();

        let mutations = shipments.mutations();
        assert_eq!(mutations.len(), 3);
        assert!(mutations[0].contains("X1") && mutations[0].contains("EXP1"));
        assert_eq!(mutations[1], "mark_shipment_completed_ws X1");
        assert_eq!(mutations[2], "write_order_tracking X1 EXP1");
    }

    #[tokio::test]
    async fn parsed_error_document_surfaces_the_table_message_and_writes_nothing() {
        let document = carrier_document(
            "",
            r#"<Resultado return="-3"/><Errores><Error>dup</Error></Errores>"#,
        );
        let shipments = Arc::new(RecordingShipments {
            fields: Some(shipment_fields("X1")),
            ..Default::default()
        });
        let carrier = Arc::new(StubCarrier::replying(envia_carrier::parse_response(
            &document, "X1",
        )));
        let registrar = registrar(
            StubOrders {
                exists: true,
                not_shipped: true,
            },
            shipments.clone(),
            carrier,
        );

        let outcome = registrar
            .register(RegistrationMode::SingleService, Some("X1"))
            .await
            .unwrap();

        let RegistrationOutcome::WebService(outcome) = outcome else {
            panic!("expected a web-service outcome");
        };
        assert_eq!(outcome.result_code, "-3");
        assert_eq!(
            outcome.message,
            envia_carrier::error_message("-3").unwrap()
        );
        assert!(shipments.mutations().is_empty());
    }
}
