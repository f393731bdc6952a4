use std::collections::HashMap;

use crate::models::{Order, OrderDetailRecord, OrderItem};

/// Fold flat order-detail rows into orders with nested items.
///
/// Rows arrive one-per-item with the order columns repeated; orders keep
/// the position of their first row, later rows for the same order id only
/// append to its `items`.
pub fn group_order_rows(rows: Vec<OrderDetailRecord>) -> Vec<Order> {
    let mut orders: Vec<Order> = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let item = OrderItem {
            order_item_id: row.order_item_id.clone(),
            sku: row.sku.clone(),
            product_name: row.product_name.clone(),
            quantity_purchased: row.quantity_purchased,
            item_price: row.item_price,
            item_tax: row.item_tax,
            shipping_price: row.shipping_price,
            shipping_tax: row.shipping_tax,
            vat_exclusive_item_price: row.vat_exclusive_item_price,
            vat_exclusive_shipping_price: row.vat_exclusive_shipping_price,
            asin: row.asin.clone(),
            referencia_prov: row.referencia_prov.clone(),
        };

        match seen.get(&row.amazon_order_id) {
            Some(&index) => orders[index].items.push(item),
            None => {
                seen.insert(row.amazon_order_id.clone(), orders.len());
                orders.push(Order {
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
                    items: vec![item],
                });
            }
        }
    }

    orders
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(order_id: &str, item_id: &str) -> OrderDetailRecord {
        OrderDetailRecord {
            amazon_order_id: order_id.to_string(),
            purchase_date: "2025-03-01T10:00:00Z".to_string(),
            last_update_date: "2025-03-01T10:00:00Z".to_string(),
            order_status: "Unshipped".to_string(),
            fulfillment_channel: "MFN".to_string(),
            sales_channel: "Amazon.es".to_string(),
            ship_service_level: "Std ES Dom".to_string(),
            shipping_address_name: "Ana Perez".to_string(),
            shipping_address_address_line1: "Calle Mayor 1".to_string(),
            shipping_address_city: "Madrid".to_string(),
            shipping_address_state_or_region: None,
            shipping_address_postal_code: "28001".to_string(),
            shipping_address_country_code: "ES".to_string(),
            number_of_items_shipped: 0,
            number_of_items_unshipped: 1,
            payment_method: "Other".to_string(),
            marketplace: "Amazon.es".to_string(),
            shipment_service_level_category: "Standard".to_string(),
            order_total: 49.99,
            is_premium_order: false,
            is_prime: false,
            is_business_order: false,
            latest_ship_date: "2025-03-03".to_string(),
            latest_delivery_date: "2025-03-06".to_string(),
            order_item_id: item_id.to_string(),
            sku: format!("SKU-{item_id}"),
            product_name: "Cordless drill".to_string(),
            quantity_purchased: 1,
            item_price: 49.99,
            item_tax: 8.67,
            shipping_price: 0.0,
            shipping_tax: 0.0,
            vat_exclusive_item_price: Some(41.32),
            vat_exclusive_shipping_price: Some(0.0),
            asin: Some("B000TEST01".to_string()),
            referencia_prov: None,
        }
    }

    #[test]
    fn groups_rows_of_the_same_order_into_items() {
        let rows = vec![row("A-1", "i-1"), row("A-1", "i-2"), row("A-2", "i-3")];
        let orders = group_order_rows(rows);

        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].amazon_order_id, "A-1");
        assert_eq!(orders[0].items.len(), 2);
        assert_eq!(orders[0].items[1].order_item_id, "i-2");
        assert_eq!(orders[1].items.len(), 1);
    }

    #[test]
    fn preserves_first_seen_ordering_for_interleaved_rows() {
        let rows = vec![row("A-2", "i-1"), row("A-1", "i-2"), row("A-2", "i-3")];
        let orders = group_order_rows(rows);

        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].amazon_order_id, "A-2");
        assert_eq!(orders[0].items.len(), 2);
        assert_eq!(orders[1].amazon_order_id, "A-1");
    }

    #[test]
    fn empty_input_yields_no_orders() {
        assert!(group_order_rows(Vec::new()).is_empty());
    }
}
