use crate::db::queries_settlement;
use crate::error::AppError;
use crate::models::{
    AdvanceOffset, AnalyticsFilters, Chart, ChartData, ChartDataset, Column, DnInvoiceShare,
    InvoiceAllocation, Report, SettlementNote, SettlementRow, SummaryCard, WalletAccount,
};
use bigdecimal::{BigDecimal, ToPrimitive, Zero};
use chrono::{Local, NaiveDate};
use indexmap::{IndexMap, IndexSet};
use sqlx::PgPool;
use std::collections::HashMap;
use tracing::info;

const DELIVERED: &str = "Delivered";

/// Settlement analytics: per delivery note, the cash actually received
/// (apportioned from invoice payments), the wallet advance offset, the
/// outstanding balance, and aging.
pub struct SettlementAnalytics {
    pool: PgPool,
}

impl SettlementAnalytics {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn run(&self, filters: &AnalyticsFilters) -> Result<Report<SettlementRow>, AppError> {
        let notes = queries_settlement::list_settlement_notes(&self.pool, filters).await?;
        info!("Settlement analytics: {} delivery notes", notes.len());
        if notes.is_empty() {
            return Ok(Report {
                columns: columns(),
                data: Vec::new(),
                chart: None,
                report_summary: Vec::new(),
            });
        }

        let dn_names: Vec<String> = notes.iter().map(|n| n.delivery_note.clone()).collect();
        let companies: Vec<String> = notes
            .iter()
            .map(|n| n.shipping_company.clone())
            .collect::<IndexSet<_>>()
            .into_iter()
            .collect();

        // DN -> SI shares, then SI -> receive allocations.
        let shares = queries_settlement::dn_invoice_shares(&self.pool, &dn_names).await?;
        let invoice_names: Vec<String> = shares
            .iter()
            .map(|s| s.sales_invoice.clone())
            .collect::<IndexSet<_>>()
            .into_iter()
            .collect();
        let allocations = if invoice_names.is_empty() {
            Vec::new()
        } else {
            queries_settlement::receive_allocations(&self.pool, &invoice_names).await?
        };
        let received_map = apportion_received(&shares, &allocations);

        // Shipping company -> wallet advance totals.
        let wallets = queries_settlement::wallet_accounts(&self.pool, &companies).await?;
        let accounts: Vec<String> = wallets.iter().filter_map(|w| w.account.clone()).collect();
        let offsets = if accounts.is_empty() {
            Vec::new()
        } else {
            queries_settlement::advance_offsets(&self.pool, &accounts).await?
        };
        let advance_map = advances_by_company(&wallets, &offsets);

        let today = Local::now().date_naive();
        let data: Vec<SettlementRow> = notes
            .into_iter()
            .map(|note| build_row(note, &received_map, &advance_map, today))
            .filter(|row| {
                !excluded_by_settlement_status(
                    filters.settlement_status_filter(),
                    &row.amount_received,
                    &row.cod_amount,
                    &row.outstanding_balance,
                )
            })
            .collect();

        let wallet_balance = self.wallet_balance(filters, &accounts).await?;
        let report_summary = build_summary(&data, &wallet_balance);
        let chart = build_chart(&data);
        Ok(Report {
            columns: columns(),
            data,
            chart,
            report_summary,
        })
    }

    /// Summary-only KPI: the ledger balance of the filtered company's wallet
    /// account, or of every configured wallet when unfiltered.
    async fn wallet_balance(
        &self,
        filters: &AnalyticsFilters,
        selected_accounts: &[String],
    ) -> Result<BigDecimal, AppError> {
        let accounts = if filters.shipping_company_filter().is_some() {
            selected_accounts.to_vec()
        } else {
            queries_settlement::all_wallet_accounts(&self.pool).await?
        };
        if accounts.is_empty() {
            return Ok(BigDecimal::zero());
        }
        Ok(queries_settlement::wallet_balance(&self.pool, &accounts).await?)
    }
}

/// Distribute each invoice's receive payments over its delivery notes in
/// proportion to the note's line share of the invoice total. Invoices with a
/// zero total or no payments contribute nothing.
pub fn apportion_received(
    shares: &[DnInvoiceShare],
    allocations: &[InvoiceAllocation],
) -> HashMap<String, BigDecimal> {
    let allocation_map: HashMap<&str, &BigDecimal> = allocations
        .iter()
        .map(|a| (a.sales_invoice.as_str(), &a.total_allocated))
        .collect();

    let zero = BigDecimal::zero();
    let mut received: HashMap<String, BigDecimal> = HashMap::new();
    for share in shares {
        let Some(allocated) = allocation_map.get(share.sales_invoice.as_str()) else {
            continue;
        };
        if share.si_total == zero {
            continue;
        }
        // Multiply before dividing to keep the share exact.
        let portion = (*allocated * &share.dn_share_amount) / &share.si_total;
        let entry = received
            .entry(share.delivery_note.clone())
            .or_insert_with(BigDecimal::zero);
        *entry = &*entry + portion;
    }
    received
}

/// Re-key internal-transfer totals from wallet account to shipping company.
pub fn advances_by_company(
    wallets: &[WalletAccount],
    offsets: &[AdvanceOffset],
) -> HashMap<String, BigDecimal> {
    let company_by_account: HashMap<&str, &str> = wallets
        .iter()
        .filter_map(|w| {
            w.account
                .as_deref()
                .map(|account| (account, w.shipping_company.as_str()))
        })
        .collect();

    offsets
        .iter()
        .filter_map(|offset| {
            company_by_account
                .get(offset.wallet_account.as_str())
                .map(|company| (company.to_string(), offset.total_advance.clone()))
        })
        .collect()
}

fn build_row(
    note: SettlementNote,
    received_map: &HashMap<String, BigDecimal>,
    advance_map: &HashMap<String, BigDecimal>,
    today: NaiveDate,
) -> SettlementRow {
    let amount_received = received_map
        .get(&note.delivery_note)
        .cloned()
        .unwrap_or_else(BigDecimal::zero);
    let advance_offset = advance_map
        .get(&note.shipping_company)
        .cloned()
        .unwrap_or_else(BigDecimal::zero);
    let outstanding_balance = &note.cod_amount - &amount_received;
    let aging = aging_days(
        note.shipping_status.as_deref(),
        &outstanding_balance,
        note.posting_date,
        today,
    );

    SettlementRow {
        delivery_note: note.delivery_note,
        posting_date: note.posting_date,
        customer: note.customer,
        status: note.status,
        shipping_status: note.shipping_status,
        cod_amount: note.cod_amount,
        amount_received,
        advance_offset,
        outstanding_balance,
        aging,
        shipping_company: note.shipping_company,
    }
}

/// Days since posting, counted only for delivered-but-unpaid notes.
pub fn aging_days(
    shipping_status: Option<&str>,
    outstanding: &BigDecimal,
    posting_date: NaiveDate,
    today: NaiveDate,
) -> i64 {
    if shipping_status == Some(DELIVERED) && *outstanding > BigDecimal::zero() {
        (today - posting_date).num_days()
    } else {
        0
    }
}

/// Post-computation settlement-status filter: true when the row must be
/// dropped from the result.
pub fn excluded_by_settlement_status(
    filter: Option<&str>,
    amount_received: &BigDecimal,
    cod_amount: &BigDecimal,
    outstanding: &BigDecimal,
) -> bool {
    let zero = BigDecimal::zero();
    match filter {
        Some("Pending") => *amount_received > zero,
        Some("Partially Paid") => !(*amount_received > zero && amount_received < cod_amount),
        Some("Fully Paid") => *outstanding > zero,
        _ => false,
    }
}

fn columns() -> Vec<Column> {
    vec![
        Column::link("delivery_note", "Delivery Note", "Delivery Note", 180),
        Column::new("posting_date", "Posting Date", "Date", 110),
        Column::link("customer", "Customer", "Customer", 150),
        Column::new("status", "Status", "Data", 100),
        Column::new("shipping_status", "Shipping Status", "Data", 120),
        Column::new("cod_amount", "COD Amount", "Currency", 130),
        Column::new("amount_received", "Amount Received", "Currency", 140),
        Column::new("advance_offset", "Advance Offset", "Currency", 140),
        Column::new("outstanding_balance", "Outstanding Balance", "Currency", 150),
        Column::new("aging", "Aging (Days)", "Int", 100),
    ]
}

/// KPI ribbon: exposure, wallet balance, delivery success rate, pending
/// remittance. Empty data yields no cards.
pub fn build_summary(data: &[SettlementRow], wallet_balance: &BigDecimal) -> Vec<SummaryCard> {
    if data.is_empty() {
        return Vec::new();
    }

    let zero = BigDecimal::zero();
    let total_notes = data.len();
    let delivered_notes = data
        .iter()
        .filter(|d| d.shipping_status.as_deref() == Some(DELIVERED))
        .count();
    let success_rate = delivered_notes as f64 / total_notes as f64 * 100.0;
    let success_rate = (success_rate * 10.0).round() / 10.0;

    let total_exposure = data
        .iter()
        .filter(|d| d.outstanding_balance > zero)
        .fold(BigDecimal::zero(), |acc, d| acc + &d.cod_amount)
        .to_f64()
        .unwrap_or_default();

    let pending_remittance = data
        .iter()
        .filter(|d| {
            d.shipping_status.as_deref() == Some(DELIVERED) && d.outstanding_balance > zero
        })
        .fold(BigDecimal::zero(), |acc, d| acc + &d.outstanding_balance)
        .to_f64()
        .unwrap_or_default();

    vec![
        SummaryCard {
            label: "Total Exposure",
            value: total_exposure,
            datatype: "Currency",
            currency: None,
            indicator: if total_exposure > 0.0 { "Red" } else { "Green" },
        },
        SummaryCard {
            label: "Wallet Balance",
            value: wallet_balance.to_f64().unwrap_or_default(),
            datatype: "Currency",
            currency: None,
            indicator: "Blue",
        },
        SummaryCard {
            label: "Success Rate %",
            value: success_rate,
            datatype: "Percent",
            currency: None,
            indicator: if success_rate >= 80.0 { "Green" } else { "Orange" },
        },
        SummaryCard {
            label: "Pending Remittance",
            value: pending_remittance,
            datatype: "Currency",
            currency: None,
            indicator: if pending_remittance > 0.0 { "Orange" } else { "Green" },
        },
    ]
}

/// Outstanding balance grouped by shipping status.
pub fn build_chart(data: &[SettlementRow]) -> Option<Chart> {
    if data.is_empty() {
        return None;
    }

    let mut by_status: IndexMap<String, BigDecimal> = IndexMap::new();
    for row in data {
        let status = row
            .shipping_status
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "Not Set".to_string());
        let entry = by_status.entry(status).or_insert_with(BigDecimal::zero);
        *entry = &*entry + &row.outstanding_balance;
    }

    let mut labels = Vec::with_capacity(by_status.len());
    let mut values = Vec::with_capacity(by_status.len());
    for (label, amount) in by_status {
        labels.push(label);
        values.push(amount.to_f64().unwrap_or_default());
    }

    Some(Chart {
        data: ChartData {
            labels,
            datasets: vec![ChartDataset {
                name: "Outstanding Balance".to_string(),
                values,
            }],
        },
        chart_type: "bar",
        colors: vec!["#fc4f51"],
        height: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(value: &str) -> BigDecimal {
        BigDecimal::from_str(value).unwrap()
    }

    fn share(dn: &str, si: &str, dn_amount: &str, si_total: &str) -> DnInvoiceShare {
        DnInvoiceShare {
            delivery_note: dn.to_string(),
            sales_invoice: si.to_string(),
            dn_share_amount: dec(dn_amount),
            si_total: dec(si_total),
        }
    }

    fn allocation(si: &str, amount: &str) -> InvoiceAllocation {
        InvoiceAllocation {
            sales_invoice: si.to_string(),
            total_allocated: dec(amount),
        }
    }

    fn note(dn: &str, company: &str, shipping_status: &str, cod: &str) -> SettlementNote {
        SettlementNote {
            delivery_note: dn.to_string(),
            posting_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            customer: Some("CUST-1".to_string()),
            status: Some("Completed".to_string()),
            shipping_company: company.to_string(),
            shipping_status: Some(shipping_status.to_string()),
            cod_amount: dec(cod),
        }
    }

    #[test]
    fn apportionment_splits_by_line_share() {
        // Invoice of 200 covers two notes with shares 150 and 50; a payment
        // of 100 apportions 75 / 25.
        let shares = vec![
            share("DN-A", "SI-1", "150", "200"),
            share("DN-B", "SI-1", "50", "200"),
        ];
        let received = apportion_received(&shares, &[allocation("SI-1", "100")]);
        assert_eq!(received["DN-A"], dec("75"));
        assert_eq!(received["DN-B"], dec("25"));
    }

    #[test]
    fn apportionment_sums_across_invoices() {
        let shares = vec![
            share("DN-A", "SI-1", "100", "100"),
            share("DN-A", "SI-2", "40", "80"),
        ];
        let received = apportion_received(
            &shares,
            &[allocation("SI-1", "100"), allocation("SI-2", "80")],
        );
        assert_eq!(received["DN-A"], dec("140"));
    }

    #[test]
    fn apportionment_skips_unpaid_and_zero_total_invoices() {
        let shares = vec![
            share("DN-A", "SI-1", "100", "100"),
            share("DN-B", "SI-2", "50", "0"),
        ];
        let received = apportion_received(&shares, &[allocation("SI-2", "50")]);
        assert!(received.get("DN-A").is_none());
        assert!(received.get("DN-B").is_none());
    }

    #[test]
    fn outstanding_is_cod_minus_received() {
        let mut received = HashMap::new();
        received.insert("DN-A".to_string(), dec("40"));
        let row = build_row(
            note("DN-A", "Aramex", "Delivered", "100"),
            &received,
            &HashMap::new(),
            NaiveDate::from_ymd_opt(2024, 3, 11).unwrap(),
        );
        assert_eq!(row.outstanding_balance, dec("60"));
        assert_eq!(row.aging, 10);
    }

    #[test]
    fn aging_only_for_delivered_unpaid_notes() {
        let posting = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(aging_days(Some("Delivered"), &dec("10"), posting, today), 14);
        assert_eq!(aging_days(Some("Delivered"), &dec("0"), posting, today), 0);
        assert_eq!(aging_days(Some("In Transit"), &dec("10"), posting, today), 0);
        assert_eq!(aging_days(None, &dec("10"), posting, today), 0);
    }

    #[test]
    fn settlement_status_exclusion_rules() {
        let pending = Some("Pending");
        assert!(!excluded_by_settlement_status(pending, &dec("0"), &dec("100"), &dec("100")));
        assert!(excluded_by_settlement_status(pending, &dec("10"), &dec("100"), &dec("90")));

        let partial = Some("Partially Paid");
        assert!(!excluded_by_settlement_status(partial, &dec("40"), &dec("100"), &dec("60")));
        assert!(excluded_by_settlement_status(partial, &dec("0"), &dec("100"), &dec("100")));
        assert!(excluded_by_settlement_status(partial, &dec("100"), &dec("100"), &dec("0")));

        let full = Some("Fully Paid");
        assert!(!excluded_by_settlement_status(full, &dec("100"), &dec("100"), &dec("0")));
        assert!(excluded_by_settlement_status(full, &dec("40"), &dec("100"), &dec("60")));

        assert!(!excluded_by_settlement_status(None, &dec("0"), &dec("100"), &dec("100")));
    }

    #[test]
    fn advances_rekey_from_account_to_company() {
        let wallets = vec![
            WalletAccount {
                shipping_company: "Aramex".to_string(),
                account: Some("1210 - Aramex Wallet".to_string()),
            },
            WalletAccount {
                shipping_company: "SMSA".to_string(),
                account: None,
            },
        ];
        let offsets = vec![AdvanceOffset {
            wallet_account: "1210 - Aramex Wallet".to_string(),
            total_advance: dec("500"),
        }];
        let advances = advances_by_company(&wallets, &offsets);
        assert_eq!(advances["Aramex"], dec("500"));
        assert!(advances.get("SMSA").is_none());
    }

    #[test]
    fn summary_kpis() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let mut received = HashMap::new();
        received.insert("DN-PAID".to_string(), dec("100"));
        let rows = vec![
            build_row(note("DN-PAID", "Aramex", "Delivered", "100"), &received, &HashMap::new(), today),
            build_row(note("DN-OPEN", "Aramex", "Delivered", "200"), &received, &HashMap::new(), today),
            build_row(note("DN-LOST", "Aramex", "Lost", "50"), &received, &HashMap::new(), today),
        ];
        let summary = build_summary(&rows, &dec("750"));
        let card = |label: &str| summary.iter().find(|c| c.label == label).unwrap();
        // Exposure counts COD of every row still outstanding.
        assert_eq!(card("Total Exposure").value, 250.0);
        assert_eq!(card("Wallet Balance").value, 750.0);
        assert_eq!(card("Success Rate %").value, 66.7);
        // Pending remittance only counts delivered rows.
        assert_eq!(card("Pending Remittance").value, 200.0);
        assert_eq!(card("Total Exposure").indicator, "Red");
    }

    #[test]
    fn summary_and_chart_empty_on_no_rows() {
        assert!(build_summary(&[], &BigDecimal::zero()).is_empty());
        assert!(build_chart(&[]).is_none());
    }

    #[test]
    fn chart_groups_outstanding_by_status() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let rows = vec![
            build_row(note("DN-1", "Aramex", "Delivered", "100"), &HashMap::new(), &HashMap::new(), today),
            build_row(note("DN-2", "Aramex", "Delivered", "50"), &HashMap::new(), &HashMap::new(), today),
            build_row(note("DN-3", "Aramex", "Lost", "30"), &HashMap::new(), &HashMap::new(), today),
        ];
        let chart = build_chart(&rows).unwrap();
        assert_eq!(chart.data.labels, vec!["Delivered".to_string(), "Lost".to_string()]);
        assert_eq!(chart.data.datasets[0].values, vec![150.0, 30.0]);
    }
}
