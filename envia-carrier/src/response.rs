use envia_core::{ShipmentOutcome, ShipmentReference, CARRIER_FAILURE_CODE};

/// Parse a carrier response document into a normalized outcome.
///
/// Never fails: malformed or structurally incomplete documents resolve to
/// a failure outcome with code `"-1"` and a message naming the first
/// missing piece. Success requires the result code to equal `"0"` exactly;
/// codes like `"00"` are carrier failures and keep every identifier empty.
pub fn parse_response(document: &str, order_id: &str) -> ShipmentOutcome {
    let doc = match roxmltree::Document::parse(document) {
        Ok(doc) => doc,
        Err(e) => {
            tracing::warn!(order_id, error = %e, "carrier response is not parseable XML");
            return ShipmentOutcome::failure(
                CARRIER_FAILURE_CODE,
                e.to_string(),
                "invalid response document",
                order_id,
            );
        }
    };

    let Some(result_node) = doc
        .descendants()
        .find(|n| n.is_element() && n.tag_name().name() == "GrabaServiciosResult")
    else {
        return ShipmentOutcome::failure(
            CARRIER_FAILURE_CODE,
            String::new(),
            "invalid response structure",
            order_id,
        );
    };

    let Some(shipment) = result_node
        .descendants()
        .find(|n| n.is_element() && n.tag_name().name() == "Envio")
    else {
        return ShipmentOutcome::failure(
            CARRIER_FAILURE_CODE,
            String::new(),
            "shipment node not found",
            order_id,
        );
    };

    let Some(result) = shipment
        .descendants()
        .find(|n| n.is_element() && n.tag_name().name() == "Resultado")
    else {
        return ShipmentOutcome::failure(
            CARRIER_FAILURE_CODE,
            String::new(),
            "result node not found",
            order_id,
        );
    };

    let code = result.attribute("return").unwrap_or(CARRIER_FAILURE_CODE);

    if code == envia_core::CARRIER_SUCCESS_CODE {
        let barcode = shipment.attribute("codbarras").unwrap_or("");
        let expedition_uid = shipment.attribute("uid").unwrap_or("");
        let tracking_code = shipment.attribute("codexp").unwrap_or("");

        let references: Vec<ShipmentReference> = shipment
            .descendants()
            .filter(|n| {
                n.is_element()
                    && n.tag_name().name() == "Referencia"
                    && n.parent()
                        .is_some_and(|p| p.tag_name().name() == "Referencias")
            })
            .map(|n| ShipmentReference {
                kind: n.attribute("tipo").unwrap_or("").to_string(),
                value: n.text().unwrap_or("").to_string(),
            })
            .collect();

        let label_base64 = shipment
            .descendants()
            .find(|n| {
                n.is_element()
                    && n.tag_name().name() == "Etiqueta"
                    && n.parent()
                        .is_some_and(|p| p.tag_name().name() == "Etiquetas")
            })
            .and_then(|n| n.text())
            .map(str::to_string);

        return ShipmentOutcome::success(
            order_id,
            expedition_uid,
            tracking_code,
            barcode,
            references,
            label_base64,
        );
    }

    let carrier_text = shipment
        .descendants()
        .find(|n| {
            n.is_element()
                && n.tag_name().name() == "Error"
                && n.parent()
                    .is_some_and(|p| p.tag_name().name() == "Errores")
        })
        .and_then(|n| n.text())
        .unwrap_or("unknown error");

    let message = error_message(code).unwrap_or(carrier_text);
    ShipmentOutcome::failure(code, carrier_text, message, order_id)
}

/// Human-readable translation of the carrier's published result codes.
/// The texts are the carrier's own (Spanish); unknown codes fall back to
/// the raw error element.
pub fn error_message(code: &str) -> Option<&'static str> {
    let message = match code {
        "+38" => "Error, Número de teléfono del destinatario no válido.",
        "36" => "Error, Código postal del destinatario, formato incorrecto.",
        "-1" => "Tiempo de espera expirado.",
        "-3" => "Error, El código de barras del envío ya existe.",
        "-33" => "Cp destino no existe o no es de esa plaza",
        "-48" => "Error, servicio EuroEstandar/EBP: El número de paquetes debe ser siempre 1.",
        "-49" => "Error, servicio EuroEstandar/EBP: El peso debe ser <= 31,5 kgs.",
        "-70" => "Error, El número de pedido ya existe",
        "-99" => "Advertencia, los servicios web están temporalmente fuera de servicio.",
        "-128" => "Error, Nombre del destinatario debe tener al menos tres caracteres.",
        "-129" => "Error, la dirección del destinatario debe tener al menos tres caracteres.",
        "-130" => "Error, La Ciudad del Destinatario debe tener al menos tres caracteres.",
        "-131" => "Error, Consignee Zipcode debe tener al menos cuatro caracteres.",
        _ => return None,
    };
    Some(message)
}
