use std::time::Duration;

use crate::config::ToolsConfig;
use crate::prelude::*;

/// Input for fetching an order's invoice
#[derive(Debug, Deserialize, JsonSchema)]
pub struct InvoiceInput {
    /// The ID of the order
    pub order_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: String,
    pub name: String,
    pub quantity: u32,
    /// Unit price in cents
    pub price: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Everything the `Invoice` component renders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub order_id: String,
    pub line_items: Vec<LineItem>,
    pub shipping_address: ShippingAddress,
    pub customer: Customer,
    /// Sum of `price * quantity` over the line items, in cents
    pub total: u64,
}

const CATALOG: &[(&str, &str, u64)] = &[
    ("SKU-1001", "Ergonomic Keyboard", 12_999),
    ("SKU-1002", "Wireless Mouse", 4_999),
    ("SKU-1003", "27\" Monitor", 32_900),
    ("SKU-1004", "USB-C Hub", 3_450),
    ("SKU-1005", "Laptop Stand", 5_900),
    ("SKU-1006", "Noise Cancelling Headphones", 24_999),
];

const CUSTOMERS: &[(&str, &str, &str, &str, &str, &str)] = &[
    ("Ada Lovelace", "ada@example.com", "555-0101", "12 Analytical Way", "Portland", "OR"),
    ("Grace Hopper", "grace@example.com", "555-0102", "1 Compiler Ct", "Arlington", "VA"),
    ("Alan Turing", "alan@example.com", "555-0103", "42 Enigma Rd", "Austin", "TX"),
];

/// FNV-1a of the order id. Must stay stable across platforms and releases.
fn order_seed(order_id: &str) -> u64 {
    order_id.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0000_0100_0000_01b3)
    })
}

/// Catalog entry for the `item`-th line of an order.
fn catalog_index(seed: u64, item: usize) -> usize {
    (seed.wrapping_add(item as u64 * 2) % CATALOG.len() as u64) as usize
}

/// Build the invoice for `order_id`.
pub fn invoice_for(order_id: &str) -> Invoice {
    let seed = order_seed(order_id);
    let item_count = 1 + (seed % 3) as usize;

    let line_items: Vec<LineItem> = (0..item_count)
        .map(|i| {
            let (id, name, price) = CATALOG[catalog_index(seed, i)];
            LineItem {
                id: id.to_string(),
                name: name.to_string(),
                quantity: 1 + ((seed >> (8 * i)) % 3) as u32,
                price,
            }
        })
        .collect();

    let total = line_items
        .iter()
        .map(|item| item.price * u64::from(item.quantity))
        .sum();

    let (name, email, phone, street, city, state) =
        CUSTOMERS[((seed >> 32) % CUSTOMERS.len() as u64) as usize];

    Invoice {
        order_id: order_id.to_string(),
        line_items,
        shipping_address: ShippingAddress {
            name: name.to_string(),
            street: street.to_string(),
            city: city.to_string(),
            state: state.to_string(),
            zip: format!("{:05}", seed % 100_000),
        },
        customer: Customer {
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
        },
        total,
    }
}

/// Renders the invoice for an order
pub struct InvoiceTool {
    loading_delay: Duration,
}

impl InvoiceTool {
    pub fn new(config: &ToolsConfig) -> Self {
        Self {
            loading_delay: config.loading_delay,
        }
    }
}

impl Default for InvoiceTool {
    fn default() -> Self {
        Self::new(&ToolsConfig::default())
    }
}

impl Tool for InvoiceTool {
    type Input = InvoiceInput;

    fn name(&self) -> &str {
        "get_order_invoice"
    }

    fn description(&self) -> &str {
        "A tool to fetch the invoice from an order. Requires an order id."
    }

    async fn execute(&self, input: Self::Input, ui: &ToolUi) -> Result<ToolOutput, ToolError> {
        ui.update(Fragment::bare("InvoiceLoading"))?;

        let order_id = input.order_id.trim();
        if order_id.is_empty() {
            return Err(ToolError::InvalidInput("order_id must not be empty".to_string()));
        }
        let invoice = invoice_for(order_id);

        if !self.loading_delay.is_zero() {
            tokio::time::sleep(self.loading_delay).await;
        }

        ui.done(Fragment::component("Invoice", serde_json::to_value(&invoice)?))?;
        Ok(ToolOutput::json(&invoice)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_index_wraps_large_seeds() {
        let len = CATALOG.len() as u64;
        assert_eq!(catalog_index(u64::MAX, 0), (u64::MAX % len) as usize);
        assert_eq!(catalog_index(u64::MAX, 2), (3 % len) as usize);
        assert_eq!(catalog_index(u64::MAX - 1, 1), 0);
    }
    use futures::StreamExt;
    use serde_json::json;
    use tapedeck_core::{box_tool, classify, run_tool, ClassifiedAction, EventSink};

    #[test]
    fn test_invoice_is_deterministic() {
        assert_eq!(invoice_for("ORD-123"), invoice_for("ORD-123"));
    }

    #[test]
    fn test_total_matches_line_items() {
        for order_id in ["A1", "ORD-123", "99999", "order with spaces"] {
            let invoice = invoice_for(order_id);
            assert!(!invoice.line_items.is_empty());
            assert!(invoice.line_items.len() <= 3);
            let expected: u64 = invoice
                .line_items
                .iter()
                .map(|item| item.price * u64::from(item.quantity))
                .sum();
            assert_eq!(invoice.total, expected, "Failed for order_id={}", order_id);
            assert_eq!(invoice.order_id, order_id);
            assert_eq!(invoice.shipping_address.zip.len(), 5);
        }
    }

    #[tokio::test]
    async fn test_execute_renders_loading_then_invoice() {
        let (sink, events) = EventSink::channel();
        let ui = ToolUi::new("invoice-run", sink);

        let output = InvoiceTool::default()
            .execute(
                InvoiceInput {
                    order_id: "ORD-123".to_string(),
                },
                &ui,
            )
            .await
            .unwrap();
        drop(ui);

        let returned: Invoice = serde_json::from_str(&output.as_text()).unwrap();
        assert_eq!(returned, invoice_for("ORD-123"));

        let fragments: Vec<Fragment> = events
            .filter_map(|item| async move {
                match classify(&item.ok()?) {
                    ClassifiedAction::Render { fragment, .. } => Some(fragment),
                    _ => None,
                }
            })
            .collect()
            .await;
        assert_eq!(fragments[0], Fragment::bare("InvoiceLoading"));
        assert!(matches!(
            &fragments[1],
            Fragment::Component { name, props } if name == "Invoice" && props["order_id"] == "ORD-123"
        ));
    }

    #[tokio::test]
    async fn test_blank_order_id_renders_error() {
        let (sink, _events) = EventSink::channel();
        let tool = box_tool(InvoiceTool::default());

        let message = run_tool(tool.as_ref(), json!({"order_id": "  "}), &sink).await;
        assert!(message.starts_with("Error running get_order_invoice"));
        assert!(message.contains("order_id must not be empty"));
    }
}
