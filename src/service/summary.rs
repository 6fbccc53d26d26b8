use crate::db::queries;
use crate::error::AppError;
use crate::models::{
    Chart, ChartData, ChartDataset, Column, Report, SummaryFilters, SummaryNote, SummaryRow,
};
use bigdecimal::{BigDecimal, Zero};
use indexmap::IndexMap;
use sqlx::PgPool;

const STATUS_COLORS: &[&str] = &["#7cd6fd", "#743ee2", "#ffa00a", "#5e64ff", "#28a745", "#dc3545"];

/// Flat per-company delivery note listing with a trailing total row.
pub struct SummaryReport {
    pool: PgPool,
}

impl SummaryReport {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn run(&self, filters: &SummaryFilters) -> Result<Report<SummaryRow>, AppError> {
        let notes = queries::list_summary_notes(&self.pool, filters).await?;
        let data = build_rows(notes);
        let chart = build_chart(&data);
        Ok(Report {
            columns: columns(),
            data,
            chart,
            report_summary: Vec::new(),
        })
    }
}

fn columns() -> Vec<Column> {
    vec![
        Column::link("delivery_note", "Delivery Note", "Delivery Note", 150),
        Column::new("posting_date", "Posting Date", "Date", 120),
        Column::link("customer", "Customer", "Customer", 150),
        Column::link("shipping_company", "Shipping Company", "Shipping Company", 180),
        Column::new("shipping_status", "Shipping Status", "Data", 130),
        Column::new("grand_total", "Grand Total", "Currency", 120),
        Column::link("company", "Company", "Company", 120),
    ]
}

/// Convert the raw notes and append the bold total row (absent when there is
/// no data at all).
pub fn build_rows(notes: Vec<SummaryNote>) -> Vec<SummaryRow> {
    if notes.is_empty() {
        return Vec::new();
    }

    let total = notes
        .iter()
        .fold(BigDecimal::zero(), |acc, n| acc + &n.grand_total);
    let mut rows: Vec<SummaryRow> = notes
        .into_iter()
        .map(|note| SummaryRow {
            delivery_note: note.delivery_note,
            posting_date: Some(note.posting_date),
            customer: note.customer,
            shipping_company: Some(note.shipping_company),
            shipping_status: note.shipping_status,
            grand_total: note.grand_total,
            company: note.company,
            bold: false,
        })
        .collect();

    rows.push(SummaryRow {
        delivery_note: "Total".to_string(),
        posting_date: None,
        customer: None,
        shipping_company: None,
        shipping_status: None,
        grand_total: total,
        company: None,
        bold: true,
    });
    rows
}

/// Pie of delivery-note counts by shipping status; the total row is ignored.
pub fn build_chart(data: &[SummaryRow]) -> Option<Chart> {
    let mut counts: IndexMap<String, f64> = IndexMap::new();
    for row in data.iter().filter(|r| !r.bold) {
        let status = row
            .shipping_status
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "Not Set".to_string());
        *counts.entry(status).or_insert(0.0) += 1.0;
    }
    if counts.is_empty() {
        return None;
    }

    let mut labels = Vec::with_capacity(counts.len());
    let mut values = Vec::with_capacity(counts.len());
    for (label, value) in counts {
        labels.push(label);
        values.push(value);
    }

    Some(Chart {
        data: ChartData {
            labels,
            datasets: vec![ChartDataset {
                name: "Delivery Notes by Status".to_string(),
                values,
            }],
        },
        chart_type: "pie",
        colors: STATUS_COLORS.to_vec(),
        height: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn dec(value: &str) -> BigDecimal {
        BigDecimal::from_str(value).unwrap()
    }

    fn note(dn: &str, status: &str, total: &str) -> SummaryNote {
        SummaryNote {
            delivery_note: dn.to_string(),
            posting_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            customer: None,
            shipping_company: "Aramex".to_string(),
            shipping_status: Some(status.to_string()),
            grand_total: dec(total),
            company: None,
        }
    }

    #[test]
    fn total_row_is_appended_and_bold() {
        let rows = build_rows(vec![note("DN-1", "Delivered", "100"), note("DN-2", "Lost", "50")]);
        assert_eq!(rows.len(), 3);
        let total = rows.last().unwrap();
        assert!(total.bold);
        assert_eq!(total.delivery_note, "Total");
        assert_eq!(total.grand_total, dec("150"));
        assert!(total.posting_date.is_none());
    }

    #[test]
    fn no_rows_means_no_total_row() {
        assert!(build_rows(Vec::new()).is_empty());
    }

    #[test]
    fn chart_counts_by_status_and_skips_total() {
        let rows = build_rows(vec![
            note("DN-1", "Delivered", "100"),
            note("DN-2", "Delivered", "50"),
            note("DN-3", "Returned", "25"),
        ]);
        let chart = build_chart(&rows).unwrap();
        assert_eq!(chart.chart_type, "pie");
        assert_eq!(chart.data.labels, vec!["Delivered".to_string(), "Returned".to_string()]);
        assert_eq!(chart.data.datasets[0].values, vec![2.0, 1.0]);
    }

    #[test]
    fn chart_is_none_on_empty_data() {
        assert!(build_chart(&[]).is_none());
    }
}
