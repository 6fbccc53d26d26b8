use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::Serialize;

use super::PaymentStatus;

/// Column descriptor consumed by the reporting UI.
#[derive(Debug, Clone, Serialize)]
pub struct Column {
    pub fieldname: &'static str,
    pub label: &'static str,
    pub fieldtype: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<&'static str>,
    pub width: u32,
}

impl Column {
    pub fn new(fieldname: &'static str, label: &'static str, fieldtype: &'static str, width: u32) -> Self {
        Self {
            fieldname,
            label,
            fieldtype,
            options: None,
            width,
        }
    }

    /// Link column pointing at another record type.
    pub fn link(
        fieldname: &'static str,
        label: &'static str,
        options: &'static str,
        width: u32,
    ) -> Self {
        Self {
            fieldname,
            label,
            fieldtype: "Link",
            options: Some(options),
            width,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartDataset {
    pub name: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<ChartDataset>,
}

/// Chart descriptor (bar/pie/donut); rendering is the UI's concern.
#[derive(Debug, Clone, Serialize)]
pub struct Chart {
    pub data: ChartData,
    #[serde(rename = "type")]
    pub chart_type: &'static str,
    pub colors: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

/// KPI ribbon card.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryCard {
    pub label: &'static str,
    pub value: f64,
    pub datatype: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    pub indicator: &'static str,
}

/// Complete report payload: column descriptors, rows, optional chart, KPI cards.
#[derive(Debug, Clone, Serialize)]
pub struct Report<T> {
    pub columns: Vec<Column>,
    pub data: Vec<T>,
    pub chart: Option<Chart>,
    pub report_summary: Vec<SummaryCard>,
}

/// One row of the Shipping Company Orders report.
#[derive(Debug, Clone, Serialize)]
pub struct OrdersReportRow {
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
    pub payment_status: PaymentStatus,
    pub grand_total: BigDecimal,
    pub total_invoice_amount: BigDecimal,
    pub paid_amount: BigDecimal,
    pub open_amount: BigDecimal,
    pub currency: Option<String>,
}

/// One row of the Settlement Analytics report.
#[derive(Debug, Clone, Serialize)]
pub struct SettlementRow {
    pub delivery_note: String,
    pub posting_date: NaiveDate,
    pub customer: Option<String>,
    pub status: Option<String>,
    pub shipping_status: Option<String>,
    pub cod_amount: BigDecimal,
    pub amount_received: BigDecimal,
    pub advance_offset: BigDecimal,
    pub outstanding_balance: BigDecimal,
    /// Days since posting, only for delivered-but-unpaid notes.
    pub aging: i64,
    pub shipping_company: String,
}

/// One row of the Shipping Company Summary report; the trailing total row
/// carries `bold = true` and no posting date.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryRow {
    pub delivery_note: String,
    pub posting_date: Option<NaiveDate>,
    pub customer: Option<String>,
    pub shipping_company: Option<String>,
    pub shipping_status: Option<String>,
    pub grand_total: BigDecimal,
    pub company: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub bold: bool,
}
