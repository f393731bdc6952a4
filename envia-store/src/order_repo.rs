use async_trait::async_trait;
use sqlx::{MySql, Pool};

use envia_core::models::{DeadlineWindow, OrderDetailRecord};
use envia_core::repository::{OrderRepository, RepoError};

pub struct StoreOrderRepository {
    pool: Pool<MySql>,
}

impl StoreOrderRepository {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    async fn fetch_detail(&self, sql: &str) -> Result<Vec<OrderDetailRecord>, RepoError> {
        let rows: Vec<OrderDetailRow> = sqlx::query_as(sql).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(OrderDetailRecord::from).collect())
    }
}

// Internal struct for type-safe querying; column names follow the
// marketplace report schema the procedures select from.
#[derive(sqlx::FromRow)]
#[sqlx(rename_all = "camelCase")]
struct OrderDetailRow {
    amazon_order_id: String,
    purchase_date: String,
    last_update_date: String,
    order_status: String,
    fulfillment_channel: String,
    sales_channel: String,
    ship_service_level: String,
    shipping_address_name: String,
    shipping_address_address_line1: String,
    shipping_address_city: String,
    shipping_address_state_or_region: Option<String>,
    shipping_address_postal_code: String,
    shipping_address_country_code: String,
    number_of_items_shipped: i32,
    number_of_items_unshipped: i32,
    payment_method: String,
    marketplace: String,
    shipment_service_level_category: String,
    order_total: f64,
    is_premium_order: bool,
    is_prime: bool,
    is_business_order: bool,
    latest_ship_date: String,
    latest_delivery_date: String,
    order_item_id: String,
    sku: String,
    product_name: String,
    quantity_purchased: i32,
    item_price: f64,
    item_tax: f64,
    shipping_price: f64,
    shipping_tax: f64,
    vat_exclusive_item_price: Option<f64>,
    vat_exclusive_shipping_price: Option<f64>,
    asin: Option<String>,
    referencia_prov: Option<String>,
}

impl From<OrderDetailRow> for OrderDetailRecord {
    fn from(row: OrderDetailRow) -> Self {
        OrderDetailRecord {
            amazon_order_id: row.amazon_order_id,
            purchase_date: row.purchase_date,
            last_update_date: row.last_update_date,
            order_status: row.order_status,
            fulfillment_channel: row.fulfillment_channel,
            sales_channel: row.sales_channel,
            ship_service_level: row.ship_service_level,
            shipping_address_name: row.shipping_address_name,
            shipping_address_address_line1: row.shipping_address_address_line1,
            shipping_address_city: row.shipping_address_city,
            shipping_address_state_or_region: row.shipping_address_state_or_region,
            shipping_address_postal_code: row.shipping_address_postal_code,
            shipping_address_country_code: row.shipping_address_country_code,
            number_of_items_shipped: row.number_of_items_shipped,
            number_of_items_unshipped: row.number_of_items_unshipped,
            payment_method: row.payment_method,
            marketplace: row.marketplace,
            shipment_service_level_category: row.shipment_service_level_category,
            order_total: row.order_total,
            is_premium_order: row.is_premium_order,
            is_prime: row.is_prime,
            is_business_order: row.is_business_order,
            latest_ship_date: row.latest_ship_date,
            latest_delivery_date: row.latest_delivery_date,
            order_item_id: row.order_item_id,
            sku: row.sku,
            product_name: row.product_name,
            quantity_purchased: row.quantity_purchased,
            item_price: row.item_price,
            item_tax: row.item_tax,
            shipping_price: row.shipping_price,
            shipping_tax: row.shipping_tax,
            vat_exclusive_item_price: row.vat_exclusive_item_price,
            vat_exclusive_shipping_price: row.vat_exclusive_shipping_price,
            asin: row.asin,
            referencia_prov: row.referencia_prov,
        }
    }
}

#[async_trait]
impl OrderRepository for StoreOrderRepository {
    async fn order_detail(&self, order_id: &str) -> Result<Vec<OrderDetailRecord>, RepoError> {
        let rows: Vec<OrderDetailRow> =
            sqlx::query_as("CALL uSp_getOrdersDetailUnshippedByOrderId(?)")
                .bind(order_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(OrderDetailRecord::from).collect())
    }

    async fn pending_detail(
        &self,
        window: DeadlineWindow,
    ) -> Result<Vec<OrderDetailRecord>, RepoError> {
        let sql = match window {
            DeadlineWindow::All => "CALL uSp_getOrdersDetailUnshipped()",
            DeadlineWindow::UntilToday => "CALL uSp_getOrdersDetailUnshippedExpireToday()",
            DeadlineWindow::Delayed => "CALL uSp_getOrdersDetailUnshippedDelayed()",
        };
        self.fetch_detail(sql).await
    }

    async fn out_of_stock_detail(
        &self,
        window: DeadlineWindow,
    ) -> Result<Vec<OrderDetailRecord>, RepoError> {
        let sql = match window {
            DeadlineWindow::All => "CALL uSp_getOrdersDetailUnshippedWithOutStock()",
            DeadlineWindow::UntilToday => {
                "CALL uSp_getOrdersDetailUnshippedWithOutStockExpireToday()"
            }
            DeadlineWindow::Delayed => "CALL uSp_getOrdersDetailUnshippedWithOutStockDelayed()",
        };
        self.fetch_detail(sql).await
    }

    async fn fake_shipment_detail(&self) -> Result<Vec<OrderDetailRecord>, RepoError> {
        self.fetch_detail("CALL uSp_getOrdersDetailUnshippedFake()")
            .await
    }

    async fn exists(&self, order_id: &str) -> Result<bool, RepoError> {
        let rows = sqlx::query("CALL uSp_isExistOrder(?)")
            .bind(order_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(!rows.is_empty())
    }

    async fn is_not_shipped(&self, order_id: &str) -> Result<bool, RepoError> {
        let rows = sqlx::query("CALL uSp_isOrderNotShipped(?)")
            .bind(order_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(!rows.is_empty())
    }

    async fn set_pending_without_stock(
        &self,
        order_id: &str,
        flag: i32,
    ) -> Result<u64, RepoError> {
        let result = sqlx::query("UPDATE ordersdetail SET pendingWithoutStock = ? WHERE orderId = ?")
            .bind(flag)
            .bind(order_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn set_ship_fake(&self, order_id: &str, flag: i32) -> Result<u64, RepoError> {
        let result = sqlx::query("UPDATE ordersdetail SET isShipFake = ? WHERE orderId = ?")
            .bind(flag)
            .bind(order_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
