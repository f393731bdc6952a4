use std::io::{Cursor, Write};

use chrono::Local;
use quick_xml::events::{BytesDecl, BytesText, Event};
use quick_xml::Writer;

use envia_core::ShipmentFields;

use crate::config::CarrierConfig;
use crate::CarrierError;

const SOAP12_NS: &str = "http://www.w3.org/2003/05/soap-envelope";
const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema";

/// Namespace the carrier uses for its registration service.
pub const CARRIER_NS: &str = "http://www.asmred.com/";

/// Build the SOAP 1.2 registration document for one shipment.
///
/// Pure transform apart from the shipment date, which is the local date at
/// build time (`dd/MM/yyyy`). Business validation belongs to the
/// orchestrator; this only refuses fields the document template cannot do
/// without.
pub fn build_request(
    fields: &ShipmentFields,
    config: &CarrierConfig,
) -> Result<String, CarrierError> {
    require(&config.client_uid, "client_uid")?;
    require(&fields.order_id, "order_id")?;
    require(&fields.service_code, "service_code")?;
    require(&fields.schedule_code, "schedule_code")?;
    require(&fields.recipient_name, "recipient_name")?;
    require(&fields.address, "address")?;
    require(&fields.city, "city")?;
    require(&fields.country, "country")?;
    require(&fields.postal_code, "postal_code")?;

    let date = Local::now().format("%d/%m/%Y").to_string();

    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
    write_document(&mut writer, fields, config, &date)
        .map_err(|e| CarrierError::Encode(e.to_string()))?;

    let bytes = writer.into_inner().into_inner();
    String::from_utf8(bytes).map_err(|e| CarrierError::Encode(e.to_string()))
}

fn require(value: &str, name: &'static str) -> Result<(), CarrierError> {
    if value.trim().is_empty() {
        return Err(CarrierError::MissingField(name));
    }
    Ok(())
}

fn write_document<W: Write>(
    writer: &mut Writer<W>,
    fields: &ShipmentFields,
    config: &CarrierConfig,
    date: &str,
) -> Result<(), quick_xml::Error> {
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    writer
        .create_element("soap12:Envelope")
        .with_attributes([
            ("xmlns:xsi", XSI_NS),
            ("xmlns:xsd", XSD_NS),
            ("xmlns:soap12", SOAP12_NS),
        ])
        .write_inner_content(|w| {
            w.create_element("soap12:Body").write_inner_content(|w| {
                w.create_element("GrabaServicios")
                    .with_attribute(("xmlns", CARRIER_NS))
                    .write_inner_content(|w| {
                        w.create_element("docIn").write_inner_content(|w| {
                            w.create_element("Servicios")
                                .with_attributes([
                                    ("uidcliente", config.client_uid.as_str()),
                                    ("xmlns", CARRIER_NS),
                                ])
                                .write_inner_content(|w| write_shipment(w, fields, config, date))?;
                            Ok::<(), quick_xml::Error>(())
                        })?;
                        Ok::<(), quick_xml::Error>(())
                    })?;
                Ok::<(), quick_xml::Error>(())
            })?;
            Ok::<(), quick_xml::Error>(())
        })?;
    Ok(())
}

fn write_shipment<W: Write>(
    writer: &mut Writer<W>,
    fields: &ShipmentFields,
    config: &CarrierConfig,
    date: &str,
) -> Result<(), quick_xml::Error> {
    writer.create_element("Envio").write_inner_content(|w| {
        text(w, "Fecha", date)?;
        text(w, "Servicio", &fields.service_code)?;
        text(w, "Horario", &fields.schedule_code)?;
        text(w, "Bultos", &fields.packages.to_string())?;
        text(w, "Peso", &fields.weight_kg.to_string())?;
        text(w, "Portes", &config.charges)?;

        w.create_element("Importes").write_inner_content(|w| {
            text(w, "Reembolso", &config.cash_on_delivery)
        })?;

        w.create_element("Remite").write_inner_content(|w| {
            text(w, "Nombre", &config.sender_name)?;
            text(w, "Direccion", &config.sender_address)?;
            text(w, "Poblacion", &config.sender_city)?;
            text(w, "Pais", &config.sender_country)?;
            text(w, "CP", &config.sender_postal_code)
        })?;

        w.create_element("Destinatario").write_inner_content(|w| {
            text(w, "Nombre", &fields.recipient_name)?;
            text(w, "Direccion", &fields.address)?;
            text(w, "Poblacion", &fields.city)?;
            text(w, "Pais", &fields.country)?;
            text(w, "CP", &fields.postal_code)?;
            text(w, "Telefono", &fields.phone)?;
            text(w, "Movil", &fields.mobile)?;
            text(w, "Email", &fields.email)?;
            text(w, "Departamento", &fields.department)?;
            text(w, "Observaciones", &fields.notes)
        })?;

        // One caller reference of type "C"; the carrier echoes it back.
        w.create_element("Referencias").write_inner_content(|w| {
            w.create_element("Referencia")
                .with_attribute(("tipo", "C"))
                .write_text_content(BytesText::new(&fields.reference))?;
            Ok::<(), quick_xml::Error>(())
        })?;

        // Ask for the label inline, PDF format.
        w.create_element("DevuelveAdicionales").write_inner_content(|w| {
            w.create_element("Etiqueta")
                .with_attribute(("tipo", "PDF"))
                .write_empty()?;
            Ok::<(), quick_xml::Error>(())
        })?;

        Ok::<(), quick_xml::Error>(())
    })?;
    Ok(())
}

fn text<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    value: &str,
) -> Result<(), quick_xml::Error> {
    writer
        .create_element(name)
        .write_text_content(BytesText::new(value))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> CarrierConfig {
        CarrierConfig {
            client_uid: "11111111-2222-3333-4444-555555555555".to_string(),
            endpoint: "https://wsclientes.example.test/b2b.asmx".to_string(),
            charges: "P".to_string(),
            cash_on_delivery: "0".to_string(),
            sender_name: "Envia Warehouse".to_string(),
            sender_address: "Poligono Industrial 7".to_string(),
            sender_city: "Zaragoza".to_string(),
            sender_country: "ES".to_string(),
            sender_postal_code: "50014".to_string(),
        }
    }

    fn fields() -> ShipmentFields {
        ShipmentFields {
            order_id: "402-5558123-0001".to_string(),
            service_code: "1".to_string(),
            schedule_code: "3".to_string(),
            packages: 2,
            weight_kg: 4.5,
            recipient_name: "Ana Perez".to_string(),
            address: "Calle Mayor 1, 2B".to_string(),
            city: "Madrid".to_string(),
            country: "ES".to_string(),
            postal_code: "28001".to_string(),
            phone: "910000000".to_string(),
            mobile: "600000000".to_string(),
            email: "ana@example.test".to_string(),
            department: "".to_string(),
            notes: "leave with concierge".to_string(),
            reference: "402-5558123-0001".to_string(),
        }
    }

    #[test]
    fn builds_a_well_formed_envelope() {
        let xml = build_request(&fields(), &config()).unwrap();
        let doc = roxmltree::Document::parse(&xml).unwrap();

        let servicios = doc
            .descendants()
            .find(|n| n.tag_name().name() == "Servicios")
            .unwrap();
        assert_eq!(
            servicios.attribute("uidcliente"),
            Some("11111111-2222-3333-4444-555555555555")
        );

        let envio = doc
            .descendants()
            .find(|n| n.tag_name().name() == "Envio")
            .unwrap();
        let child_text = |name: &str| {
            envio
                .descendants()
                .find(|n| n.tag_name().name() == name)
                .and_then(|n| n.text())
                .map(str::to_string)
        };
        assert_eq!(child_text("Servicio").as_deref(), Some("1"));
        assert_eq!(child_text("Bultos").as_deref(), Some("2"));
        assert_eq!(child_text("Peso").as_deref(), Some("4.5"));
        assert_eq!(child_text("Portes").as_deref(), Some("P"));
        assert_eq!(child_text("CP").as_deref(), Some("50014"));

        let referencia = doc
            .descendants()
            .find(|n| n.tag_name().name() == "Referencia")
            .unwrap();
        assert_eq!(referencia.attribute("tipo"), Some("C"));
        assert_eq!(referencia.text(), Some("402-5558123-0001"));

        let etiqueta = doc
            .descendants()
            .find(|n| n.tag_name().name() == "Etiqueta")
            .unwrap();
        assert_eq!(etiqueta.attribute("tipo"), Some("PDF"));
    }

    #[test]
    fn escapes_markup_in_field_values() {
        let mut f = fields();
        f.recipient_name = "Bricolage & Sons <SL>".to_string();
        let xml = build_request(&f, &config()).unwrap();

        // Must stay parseable and round-trip the raw value.
        let doc = roxmltree::Document::parse(&xml).unwrap();
        let nombre = doc
            .descendants()
            .filter(|n| n.tag_name().name() == "Nombre")
            .nth(1)
            .unwrap();
        assert_eq!(nombre.text(), Some("Bricolage & Sons <SL>"));
    }

    #[test]
    fn refuses_missing_required_fields() {
        let mut f = fields();
        f.postal_code = "".to_string();
        match build_request(&f, &config()) {
            Err(CarrierError::MissingField(name)) => assert_eq!(name, "postal_code"),
            other => panic!("expected MissingField, got {other:?}"),
        }

        let mut c = config();
        c.client_uid = "  ".to_string();
        match build_request(&fields(), &c) {
            Err(CarrierError::MissingField(name)) => assert_eq!(name, "client_uid"),
            other => panic!("expected MissingField, got {other:?}"),
        }
    }

    #[test]
    fn embeds_the_build_date_as_day_month_year() {
        let xml = build_request(&fields(), &config()).unwrap();
        let doc = roxmltree::Document::parse(&xml).unwrap();
        let fecha = doc
            .descendants()
            .find(|n| n.tag_name().name() == "Fecha")
            .and_then(|n| n.text())
            .unwrap();
        let expected = Local::now().format("%d/%m/%Y").to_string();
        assert_eq!(fecha, expected);
    }
}
