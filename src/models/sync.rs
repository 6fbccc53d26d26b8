use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Shipping fields derived from one export row, written onto the sales order
/// and cascaded to its invoice and delivery notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingInfo {
    pub customer_name: String,
    pub address: String,
    pub phone: String,
}

/// Outcome of one enrichment run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncOutcome {
    pub updated: u32,
    pub skipped: u32,
    pub errors: Vec<String>,
}

/// Sales order candidate for enrichment: internal name plus external order id.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct OrderRef {
    pub name: String,
    pub shop_order_id: String,
}
