use async_trait::async_trait;
use sqlx::{MySql, Pool};

use envia_core::models::{
    NewSelectedShipment, SelectedShipment, ShipmentColumn, ShipmentFields,
};
use envia_core::repository::{RepoError, ShipmentRepository};

pub struct StoreShipmentRepository {
    pool: Pool<MySql>,
}

impl StoreShipmentRepository {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    async fn fetch_queue(&self, sql: &str) -> Result<Vec<SelectedShipment>, RepoError> {
        let rows: Vec<SelectedShipmentRow> = sqlx::query_as(sql).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(SelectedShipment::from).collect())
    }
}

#[derive(sqlx::FromRow)]
struct SelectedShipmentRow {
    #[sqlx(rename = "idOrder")]
    order_id: String,
    servicio: String,
    horario: String,
    destinatario: String,
    direccion: String,
    poblacion: String,
    pais: String,
    cp: String,
    telefono: String,
    movil: String,
    email: String,
    departamento: String,
    contacto: String,
    observaciones: String,
    bultos: i32,
    peso: f64,
    #[sqlx(rename = "refC")]
    ref_c: String,
    process: String,
    #[sqlx(rename = "fileGenerateName")]
    file_generate_name: Option<String>,
}

impl From<SelectedShipmentRow> for SelectedShipment {
    fn from(row: SelectedShipmentRow) -> Self {
        SelectedShipment {
            order_id: row.order_id,
            service_code: row.servicio,
            schedule_code: row.horario,
            recipient_name: row.destinatario,
            address: row.direccion,
            city: row.poblacion,
            country: row.pais,
            postal_code: row.cp,
            phone: row.telefono,
            mobile: row.movil,
            email: row.email,
            department: row.departamento,
            contact: row.contacto,
            notes: row.observaciones,
            packages: row.bultos,
            weight_kg: row.peso,
            reference: row.ref_c,
            process: row.process,
            file_generate_name: row.file_generate_name,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ShipmentFieldsRow {
    #[sqlx(rename = "idOrder")]
    order_id: String,
    servicio: String,
    horario: String,
    bultos: i32,
    peso: f64,
    destinatario: String,
    direccion: String,
    poblacion: String,
    pais: String,
    cp: String,
    telefono: String,
    movil: String,
    email: String,
    departamento: String,
    observaciones: String,
    #[sqlx(rename = "refC")]
    ref_c: String,
}

impl From<ShipmentFieldsRow> for ShipmentFields {
    fn from(row: ShipmentFieldsRow) -> Self {
        ShipmentFields {
            order_id: row.order_id,
            service_code: row.servicio,
            schedule_code: row.horario,
            packages: row.bultos,
            weight_kg: row.peso,
            recipient_name: row.destinatario,
            address: row.direccion,
            city: row.poblacion,
            country: row.pais,
            postal_code: row.cp,
            phone: row.telefono,
            mobile: row.movil,
            email: row.email,
            department: row.departamento,
            notes: row.observaciones,
            reference: row.ref_c,
        }
    }
}

#[async_trait]
impl ShipmentRepository for StoreShipmentRepository {
    async fn selected(&self) -> Result<Vec<SelectedShipment>, RepoError> {
        self.fetch_queue("CALL uSp_getOrdersSelectedShipment()").await
    }

    async fn history(&self) -> Result<Vec<SelectedShipment>, RepoError> {
        self.fetch_queue("CALL uSp_getHistoryShipment()").await
    }

    async fn by_file(&self, filename: &str) -> Result<Vec<SelectedShipment>, RepoError> {
        let rows: Vec<SelectedShipmentRow> =
            sqlx::query_as("CALL uSp_getShipmentsGeneratedByFileName(?)")
                .bind(filename)
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(SelectedShipment::from).collect())
    }

    async fn insert_selected(&self, shipment: &NewSelectedShipment) -> Result<u64, RepoError> {
        let result = sqlx::query(
            "CALL uSp_insertSelectedshipment(?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&shipment.service_code)
        .bind(&shipment.schedule_code)
        .bind(&shipment.recipient_name)
        .bind(&shipment.address)
        .bind(&shipment.country)
        .bind(&shipment.postal_code)
        .bind(&shipment.city)
        .bind(&shipment.phone)
        .bind(&shipment.email)
        .bind(&shipment.department)
        .bind(&shipment.contact)
        .bind(&shipment.notes)
        .bind(shipment.packages)
        .bind(&shipment.mobile)
        .bind(&shipment.reference)
        .bind(&shipment.order_id)
        .bind(&shipment.process)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn update_selected_field(
        &self,
        order_id: &str,
        column: ShipmentColumn,
        value: &str,
    ) -> Result<u64, RepoError> {
        // The column name comes from the enum, never from the caller, and
        // records already exported to a file stay frozen.
        let sql = format!(
            "UPDATE selectedShipment SET {} = ? WHERE idOrder = ? AND fileGenerateName IS NULL",
            column.as_column()
        );
        let result = sqlx::query(&sql)
            .bind(value)
            .bind(order_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_selected(&self, order_id: &str) -> Result<u64, RepoError> {
        let result = sqlx::query("DELETE FROM selectedShipment WHERE idOrder = ?")
            .bind(order_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn set_mark_shipment(&self, order_id: &str, value: i32) -> Result<u64, RepoError> {
        let result = sqlx::query("CALL uSp_updateMarkShipment(?, ?)")
            .bind(value)
            .bind(order_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn set_selected_shipment(&self, order_id: &str, value: i32) -> Result<u64, RepoError> {
        let result = sqlx::query("CALL uSp_updateSelectedShipment(?, ?)")
            .bind(value)
            .bind(order_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn bulk_candidates(&self) -> Result<Vec<SelectedShipment>, RepoError> {
        self.fetch_queue("CALL uSp_getOrdersForShipmentFile()").await
    }

    async fn fields_for_order(
        &self,
        order_id: &str,
    ) -> Result<Option<ShipmentFields>, RepoError> {
        let row: Option<ShipmentFieldsRow> = sqlx::query_as("CALL uSp_getOrdersForShipmentWS(?)")
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(ShipmentFields::from))
    }

    async fn assign_shipment_file(&self, file_name: &str) -> Result<u64, RepoError> {
        let result = sqlx::query("CALL uSp_updateShipmentFile(?)")
            .bind(file_name)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn mark_order_detail_file_shipped(&self) -> Result<u64, RepoError> {
        let result = sqlx::query("CALL uSp_updateOrdersDetailFile()")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn write_carrier_identifiers(
        &self,
        order_id: &str,
        expedition_uid: &str,
        tracking_code: &str,
        barcode: &str,
    ) -> Result<u64, RepoError> {
        let result = sqlx::query("CALL uSp_updateOrdersDetailWS(?, ?, ?, ?)")
            .bind(order_id)
            .bind(expedition_uid)
            .bind(tracking_code)
            .bind(barcode)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn mark_shipment_completed_ws(&self, order_id: &str) -> Result<u64, RepoError> {
        let result = sqlx::query("CALL uSp_updateShipmentWS(?)")
            .bind(order_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn write_order_tracking(
        &self,
        order_id: &str,
        tracking_code: &str,
    ) -> Result<u64, RepoError> {
        let result = sqlx::query("CALL uSp_updateOrdersWS(?, ?)")
            .bind(order_id)
            .bind(tracking_code)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
