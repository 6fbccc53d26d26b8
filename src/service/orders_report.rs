use crate::db::queries;
use crate::error::AppError;
use crate::models::{
    Chart, ChartData, ChartDataset, Column, DeliveryNoteRow, InvoiceTotals, OrdersReportFilters,
    OrdersReportRow, PaymentStatus, Report, SummaryCard,
};
use bigdecimal::{BigDecimal, ToPrimitive, Zero};
use indexmap::IndexMap;
use sqlx::PgPool;
use tracing::info;

const BAR_COLORS: &[&str] = &["#5e64ff", "#26a69a", "#f0932b", "#eb4d4b", "#95a5a6"];
const PIE_COLORS: &[&str] = &["#26a69a", "#f0932b", "#eb4d4b", "#95a5a6", "#5e64ff"];

/// Shipping Company Orders report: one row per delivery note with a payment
/// status computed from the submitted invoices of its originating order.
pub struct OrdersReportService {
    pool: PgPool,
    default_currency: String,
}

/// Computed payment block of one report row.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentBlock {
    pub status: PaymentStatus,
    pub total_invoice_amount: BigDecimal,
    pub paid_amount: BigDecimal,
    pub open_amount: BigDecimal,
}

impl PaymentBlock {
    fn zeroed(status: PaymentStatus) -> Self {
        Self {
            status,
            total_invoice_amount: BigDecimal::zero(),
            paid_amount: BigDecimal::zero(),
            open_amount: BigDecimal::zero(),
        }
    }
}

impl OrdersReportService {
    pub fn new(pool: PgPool, default_currency: String) -> Self {
        Self {
            pool,
            default_currency,
        }
    }

    pub async fn run(
        &self,
        filters: &OrdersReportFilters,
    ) -> Result<Report<OrdersReportRow>, AppError> {
        let notes = queries::list_delivery_note_rows(&self.pool, filters).await?;
        info!("Orders report: {} delivery notes", notes.len());

        let mut data = Vec::with_capacity(notes.len());
        for note in notes {
            // Returned notes and notes without an order never need invoices.
            let invoices = match (&note.sales_order, note.is_return) {
                (Some(sales_order), false) => {
                    queries::invoice_totals_for_order(&self.pool, sales_order).await?
                }
                _ => Vec::new(),
            };
            data.push(assemble_row(note, &invoices));
        }

        let report_summary = build_summary(&data, &self.default_currency);
        let chart = build_chart(&data, filters.chart_type.as_deref());
        Ok(Report {
            columns: columns(),
            data,
            chart,
            report_summary,
        })
    }

    /// The same rows rendered as CSV text for the export endpoint.
    pub async fn export_csv(&self, filters: &OrdersReportFilters) -> Result<String, AppError> {
        let report = self.run(filters).await?;
        render_csv(&report.data)
    }
}

/// Classify the aggregated submitted invoices of one sales order.
///
/// Boundary rules: no invoices means not invoiced; a non-positive invoice
/// total or non-positive outstanding means fully paid; outstanding at or
/// above the total means not paid; anything in between is partially paid.
pub fn classify_payment(invoices: &[InvoiceTotals]) -> PaymentBlock {
    if invoices.is_empty() {
        return PaymentBlock::zeroed(PaymentStatus::NotInvoiced);
    }

    let total_grand = invoices
        .iter()
        .fold(BigDecimal::zero(), |acc, inv| acc + &inv.grand_total);
    let total_outstanding = invoices
        .iter()
        .fold(BigDecimal::zero(), |acc, inv| acc + &inv.outstanding_amount);
    let paid_amount = &total_grand - &total_outstanding;
    let zero = BigDecimal::zero();

    if total_grand <= zero || total_outstanding <= zero {
        return PaymentBlock {
            status: PaymentStatus::FullyPaid,
            total_invoice_amount: total_grand,
            paid_amount,
            open_amount: BigDecimal::zero(),
        };
    }
    let status = if total_outstanding >= total_grand {
        PaymentStatus::NotPaid
    } else {
        PaymentStatus::PartiallyPaid
    };
    PaymentBlock {
        status,
        total_invoice_amount: total_grand,
        paid_amount,
        open_amount: total_outstanding,
    }
}

/// Build one report row. Returned notes short-circuit to a negated amount
/// with zero invoice/paid/open figures regardless of linked invoice data.
pub fn assemble_row(note: DeliveryNoteRow, invoices: &[InvoiceTotals]) -> OrdersReportRow {
    let (payment, grand_total) = if note.is_return {
        (PaymentBlock::zeroed(PaymentStatus::Returned), -&note.grand_total)
    } else if note.sales_order.is_none() {
        (PaymentBlock::zeroed(PaymentStatus::Empty), note.grand_total.clone())
    } else {
        (classify_payment(invoices), note.grand_total.clone())
    };

    OrdersReportRow {
        delivery_note: note.delivery_note,
        posting_date: note.posting_date,
        sales_order: note.sales_order,
        shipping_customer_name: note.shipping_customer_name,
        shipping_phone: note.shipping_phone,
        shipping_address: note.shipping_address,
        city_display: note.city_display,
        shipping_company_display: note.shipping_company_display,
        tracking_no: note.tracking_no,
        shipping_status: note.shipping_status,
        payment_status: payment.status,
        grand_total,
        total_invoice_amount: payment.total_invoice_amount,
        paid_amount: payment.paid_amount,
        open_amount: payment.open_amount,
        currency: note.currency,
    }
}

fn columns() -> Vec<Column> {
    vec![
        Column::link("delivery_note", "Delivery Note", "Delivery Note", 120),
        Column::new("posting_date", "Date", "Date", 100),
        Column::link("sales_order", "Sales Order", "Sales Order", 120),
        Column::new("shipping_customer_name", "Shipping Name", "Data", 110),
        Column::new("shipping_phone", "Shipping Phone", "Data", 110),
        Column::new("shipping_address", "Shipping Address", "Data", 140),
        Column::new("city_display", "City", "Data", 100),
        Column::new("shipping_company_display", "Shipping Company", "Data", 130),
        Column::new("tracking_no", "Tracking No", "Data", 130),
        Column::new("shipping_status", "Shipping Status", "Data", 110),
        Column::new("payment_status", "Payment Status", "Data", 110),
        Column::new("grand_total", "DN Amount", "Currency", 110),
        Column::new("total_invoice_amount", "Invoiced Amount", "Currency", 110),
        Column::new("paid_amount", "Paid Amount", "Currency", 110),
        Column::new("open_amount", "Outstanding", "Currency", 110),
    ]
}

/// KPI cards for the report ribbon. Empty data yields no cards.
pub fn build_summary(data: &[OrdersReportRow], default_currency: &str) -> Vec<SummaryCard> {
    if data.is_empty() {
        return Vec::new();
    }

    let sum_f64 = |pick: fn(&OrdersReportRow) -> &BigDecimal| -> f64 {
        data.iter()
            .fold(BigDecimal::zero(), |acc, row| acc + pick(row))
            .to_f64()
            .unwrap_or_default()
    };
    let count_status = |status: PaymentStatus| -> f64 {
        data.iter().filter(|r| r.payment_status == status).count() as f64
    };

    let open_amount = sum_f64(|r| &r.open_amount);
    let currency = data
        .iter()
        .find_map(|r| r.currency.clone())
        .unwrap_or_else(|| default_currency.to_string());

    vec![
        SummaryCard {
            label: "Total Delivery Notes",
            value: data.len() as f64,
            datatype: "Int",
            currency: None,
            indicator: "Blue",
        },
        SummaryCard {
            label: "Total DN Amount",
            value: sum_f64(|r| &r.grand_total),
            datatype: "Currency",
            currency: Some(currency.clone()),
            indicator: "Green",
        },
        SummaryCard {
            label: "Total Invoice Amount",
            value: sum_f64(|r| &r.total_invoice_amount),
            datatype: "Currency",
            currency: Some(currency.clone()),
            indicator: "Blue",
        },
        SummaryCard {
            label: "Paid Amount",
            value: sum_f64(|r| &r.paid_amount),
            datatype: "Currency",
            currency: Some(currency.clone()),
            indicator: "Green",
        },
        SummaryCard {
            label: "Open Amount",
            value: open_amount,
            datatype: "Currency",
            currency: Some(currency),
            indicator: if open_amount != 0.0 { "Red" } else { "Green" },
        },
        SummaryCard {
            label: "Fully Paid",
            value: count_status(PaymentStatus::FullyPaid),
            datatype: "Int",
            currency: None,
            indicator: "Green",
        },
        SummaryCard {
            label: "Partially Paid",
            value: count_status(PaymentStatus::PartiallyPaid),
            datatype: "Int",
            currency: None,
            indicator: "Orange",
        },
        SummaryCard {
            label: "Not Paid",
            value: count_status(PaymentStatus::NotPaid),
            datatype: "Int",
            currency: None,
            indicator: "Red",
        },
        SummaryCard {
            label: "Not Invoiced",
            value: count_status(PaymentStatus::NotInvoiced),
            datatype: "Int",
            currency: None,
            indicator: "Gray",
        },
    ]
}

/// Chart for the selected display mode. Returns nothing when there is no
/// data to plot.
pub fn build_chart(data: &[OrdersReportRow], chart_type: Option<&str>) -> Option<Chart> {
    if data.is_empty() {
        return None;
    }

    match chart_type.unwrap_or("shipping_company") {
        "payment_status" => {
            let mut counts: IndexMap<String, f64> = IndexMap::new();
            for row in data {
                let label = match row.payment_status.as_str() {
                    "" => "Unknown".to_string(),
                    s => s.to_string(),
                };
                *counts.entry(label).or_insert(0.0) += 1.0;
            }
            Some(pie_chart("Payment Status", counts))
        }
        "return_vs_sales" => {
            let returns = data
                .iter()
                .filter(|r| r.payment_status == PaymentStatus::Returned)
                .count() as f64;
            let mut counts = IndexMap::new();
            counts.insert("Sales".to_string(), data.len() as f64 - returns);
            counts.insert("Returns".to_string(), returns);
            Some(pie_chart("Return vs Sales", counts))
        }
        "amount_by_company" => {
            let mut amounts: IndexMap<String, BigDecimal> = IndexMap::new();
            for row in data {
                let company = company_label(row);
                let entry = amounts.entry(company).or_insert_with(BigDecimal::zero);
                *entry = &*entry + &row.grand_total;
            }
            let counts = amounts
                .into_iter()
                .take(10)
                .map(|(label, amount)| (label, amount.to_f64().unwrap_or_default()))
                .collect();
            Some(bar_chart("Amount by Shipping Company", counts))
        }
        // Orders per shipping company (default)
        _ => {
            let mut counts: IndexMap<String, f64> = IndexMap::new();
            for row in data {
                *counts.entry(company_label(row)).or_insert(0.0) += 1.0;
            }
            let counts = counts.into_iter().take(10).collect();
            Some(bar_chart("Orders by Shipping Company", counts))
        }
    }
}

fn company_label(row: &OrdersReportRow) -> String {
    row.shipping_company_display
        .clone()
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| "Unknown".to_string())
}

fn pie_chart(name: &str, counts: IndexMap<String, f64>) -> Chart {
    let (labels, values) = split_counts(counts);
    Chart {
        data: ChartData {
            labels,
            datasets: vec![ChartDataset {
                name: name.to_string(),
                values,
            }],
        },
        chart_type: "pie",
        colors: PIE_COLORS.to_vec(),
        height: Some(300),
    }
}

fn bar_chart(name: &str, counts: IndexMap<String, f64>) -> Chart {
    let (labels, values) = split_counts(counts);
    Chart {
        data: ChartData {
            labels,
            datasets: vec![ChartDataset {
                name: name.to_string(),
                values,
            }],
        },
        chart_type: "bar",
        colors: BAR_COLORS.to_vec(),
        height: Some(300),
    }
}

fn split_counts(counts: IndexMap<String, f64>) -> (Vec<String>, Vec<f64>) {
    let mut labels = Vec::with_capacity(counts.len());
    let mut values = Vec::with_capacity(counts.len());
    for (label, value) in counts {
        labels.push(label);
        values.push(value);
    }
    (labels, values)
}

/// Render report rows as CSV text (header plus one record per row).
pub fn render_csv(data: &[OrdersReportRow]) -> Result<String, AppError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "Delivery Note",
        "Date",
        "Sales Order",
        "Shipping Name",
        "Shipping Phone",
        "Shipping Address",
        "City",
        "Shipping Company",
        "Tracking No",
        "Shipping Status",
        "Payment Status",
        "DN Amount",
        "Invoiced Amount",
        "Paid Amount",
        "Outstanding",
    ])?;
    for row in data {
        writer.write_record([
            row.delivery_note.clone(),
            row.posting_date.to_string(),
            row.sales_order.clone().unwrap_or_default(),
            row.shipping_customer_name.clone().unwrap_or_default(),
            row.shipping_phone.clone().unwrap_or_default(),
            row.shipping_address.clone().unwrap_or_default(),
            row.city_display.clone().unwrap_or_default(),
            row.shipping_company_display.clone().unwrap_or_default(),
            row.tracking_no.clone().unwrap_or_default(),
            row.shipping_status.clone().unwrap_or_default(),
            row.payment_status.to_string(),
            row.grand_total.to_string(),
            row.total_invoice_amount.to_string(),
            row.paid_amount.to_string(),
            row.open_amount.to_string(),
        ])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn dec(value: &str) -> BigDecimal {
        BigDecimal::from_str(value).unwrap()
    }

    fn invoice(grand: &str, outstanding: &str) -> InvoiceTotals {
        InvoiceTotals {
            name: "SI-001".to_string(),
            grand_total: dec(grand),
            outstanding_amount: dec(outstanding),
        }
    }

    fn note(is_return: bool, sales_order: Option<&str>, grand_total: &str) -> DeliveryNoteRow {
        DeliveryNoteRow {
            delivery_note: "DN-001".to_string(),
            posting_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            sales_order: sales_order.map(str::to_string),
            shipping_customer_name: None,
            shipping_phone: None,
            shipping_address: None,
            city_display: None,
            shipping_company_display: Some("Aramex".to_string()),
            tracking_no: None,
            shipping_status: Some("Delivered".to_string()),
            is_return,
            grand_total: dec(grand_total),
            currency: Some("SAR".to_string()),
        }
    }

    #[test]
    fn classification_boundaries() {
        assert_eq!(
            classify_payment(&[invoice("100", "0")]).status,
            PaymentStatus::FullyPaid
        );
        assert_eq!(
            classify_payment(&[invoice("100", "100")]).status,
            PaymentStatus::NotPaid
        );
        assert_eq!(
            classify_payment(&[invoice("100", "60")]).status,
            PaymentStatus::PartiallyPaid
        );
        assert_eq!(classify_payment(&[]).status, PaymentStatus::NotInvoiced);
    }

    #[test]
    fn classification_amounts() {
        let block = classify_payment(&[invoice("100", "60")]);
        assert_eq!(block.total_invoice_amount, dec("100"));
        assert_eq!(block.paid_amount, dec("40"));
        assert_eq!(block.open_amount, dec("60"));
    }

    #[test]
    fn fully_paid_clamps_open_amount_to_zero() {
        // Over-allocation can drive outstanding negative.
        let block = classify_payment(&[invoice("100", "-5")]);
        assert_eq!(block.status, PaymentStatus::FullyPaid);
        assert_eq!(block.open_amount, BigDecimal::zero());
        assert_eq!(block.paid_amount, dec("105"));
    }

    #[test]
    fn multiple_invoices_aggregate() {
        let block = classify_payment(&[invoice("60", "10"), invoice("40", "30")]);
        assert_eq!(block.status, PaymentStatus::PartiallyPaid);
        assert_eq!(block.total_invoice_amount, dec("100"));
        assert_eq!(block.open_amount, dec("40"));
    }

    #[test]
    fn returned_note_short_circuits() {
        let row = assemble_row(note(true, Some("SO-001"), "250"), &[invoice("250", "0")]);
        assert_eq!(row.payment_status, PaymentStatus::Returned);
        assert_eq!(row.grand_total, dec("-250"));
        assert_eq!(row.total_invoice_amount, BigDecimal::zero());
        assert_eq!(row.paid_amount, BigDecimal::zero());
        assert_eq!(row.open_amount, BigDecimal::zero());
    }

    #[test]
    fn note_without_order_has_empty_status() {
        let row = assemble_row(note(false, None, "90"), &[]);
        assert_eq!(row.payment_status, PaymentStatus::Empty);
        assert_eq!(row.grand_total, dec("90"));
    }

    #[test]
    fn summary_counts_statuses_and_sums_amounts() {
        let rows = vec![
            assemble_row(note(false, Some("SO-1"), "100"), &[invoice("100", "0")]),
            assemble_row(note(false, Some("SO-2"), "100"), &[invoice("100", "40")]),
            assemble_row(note(false, Some("SO-3"), "100"), &[]),
        ];
        let summary = build_summary(&rows, "USD");
        let card = |label: &str| summary.iter().find(|c| c.label == label).unwrap().value;
        assert_eq!(card("Total Delivery Notes"), 3.0);
        assert_eq!(card("Fully Paid"), 1.0);
        assert_eq!(card("Partially Paid"), 1.0);
        assert_eq!(card("Not Invoiced"), 1.0);
        assert_eq!(card("Open Amount"), 40.0);
        assert_eq!(card("Total Invoice Amount"), 200.0);
        // Currency comes from the first row, not the default.
        assert_eq!(
            summary
                .iter()
                .find(|c| c.label == "Total DN Amount")
                .unwrap()
                .currency
                .as_deref(),
            Some("SAR")
        );
    }

    #[test]
    fn chart_and_summary_empty_on_no_data() {
        assert!(build_chart(&[], None).is_none());
        assert!(build_summary(&[], "USD").is_empty());
    }

    #[test]
    fn chart_variants() {
        let rows = vec![
            assemble_row(note(false, Some("SO-1"), "100"), &[invoice("100", "0")]),
            assemble_row(note(true, Some("SO-2"), "50"), &[]),
        ];

        let by_company = build_chart(&rows, None).unwrap();
        assert_eq!(by_company.chart_type, "bar");
        assert_eq!(by_company.data.labels, vec!["Aramex".to_string()]);
        assert_eq!(by_company.data.datasets[0].values, vec![2.0]);

        let by_status = build_chart(&rows, Some("payment_status")).unwrap();
        assert_eq!(by_status.chart_type, "pie");
        assert!(by_status.data.labels.contains(&"Returned".to_string()));

        let returns = build_chart(&rows, Some("return_vs_sales")).unwrap();
        assert_eq!(returns.data.labels, vec!["Sales".to_string(), "Returns".to_string()]);
        assert_eq!(returns.data.datasets[0].values, vec![1.0, 1.0]);

        let amounts = build_chart(&rows, Some("amount_by_company")).unwrap();
        // 100 + (-50) from the negated return
        assert_eq!(amounts.data.datasets[0].values, vec![50.0]);
    }

    #[test]
    fn csv_export_has_header_and_rows() {
        let rows = vec![assemble_row(
            note(false, Some("SO-1"), "100"),
            &[invoice("100", "40")],
        )];
        let text = render_csv(&rows).unwrap();
        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("Delivery Note,Date"));
        let record = lines.next().unwrap();
        assert!(record.contains("DN-001"));
        assert!(record.contains("Partially Paid"));
        assert_eq!(lines.next(), None);
    }
}
