use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Delivery note joined to its originating sales order and the city /
/// shipping-company display lookups. One row per delivery note.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DeliveryNoteRow {
    pub delivery_note: String,
    pub posting_date: NaiveDate,
    pub sales_order: Option<String>,
    pub shipping_customer_name: Option<String>,
    pub shipping_phone: Option<String>,
    pub shipping_address: Option<String>,
    pub city_display: Option<String>,
    pub shipping_company_display: Option<String>,
    pub tracking_no: Option<String>,
    pub shipping_status: Option<String>,
    pub is_return: bool,
    pub grand_total: BigDecimal,
    pub currency: Option<String>,
}

/// Base row for settlement analytics: a submitted delivery note carrying a
/// shipping company. `cod_amount` is the note's grand total.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SettlementNote {
    pub delivery_note: String,
    pub posting_date: NaiveDate,
    pub customer: Option<String>,
    pub status: Option<String>,
    pub shipping_company: String,
    pub shipping_status: Option<String>,
    pub cod_amount: BigDecimal,
}

/// Flat listing row for the shipping company summary report.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SummaryNote {
    pub delivery_note: String,
    pub posting_date: NaiveDate,
    pub customer: Option<String>,
    pub shipping_company: String,
    pub shipping_status: Option<String>,
    pub grand_total: BigDecimal,
    pub company: Option<String>,
}
