use crate::models::{
    AdvanceOffset, AnalyticsFilters, DnInvoiceShare, InvoiceAllocation, SettlementNote,
    WalletAccount,
};
use bigdecimal::BigDecimal;
use sqlx::PgPool;

/// Submitted delivery notes with a non-empty shipping company, matching the
/// analytics filters.
pub async fn list_settlement_notes(
    pool: &PgPool,
    filters: &AnalyticsFilters,
) -> Result<Vec<SettlementNote>, sqlx::Error> {
    sqlx::query_as::<_, SettlementNote>(
        r#"
        SELECT dn.name AS delivery_note,
               dn.posting_date,
               dn.customer,
               dn.status,
               dn.shipping_company,
               dn.shipping_status,
               dn.grand_total AS cod_amount
        FROM delivery_note dn
        WHERE dn.docstatus = 1
          AND coalesce(dn.shipping_company, '') != ''
          AND ($1::date IS NULL OR dn.posting_date >= $1)
          AND ($2::date IS NULL OR dn.posting_date <= $2)
          AND ($3::text IS NULL OR dn.shipping_company = $3)
          AND ($4::text IS NULL OR dn.shipping_status = $4)
          AND ($5::text IS NULL OR dn.company = $5)
          AND ($6::text IS NULL OR dn.customer = $6)
        ORDER BY dn.posting_date DESC
        "#,
    )
    .bind(filters.from_date)
    .bind(filters.to_date)
    .bind(filters.shipping_company_filter())
    .bind(filters.shipping_status_filter())
    .bind(filters.company_filter())
    .bind(filters.customer_filter())
    .fetch_all(pool)
    .await
}

/// Per (delivery note, invoice) line shares with the invoice grand total.
/// Submitted invoices only.
pub async fn dn_invoice_shares(
    pool: &PgPool,
    dn_names: &[String],
) -> Result<Vec<DnInvoiceShare>, sqlx::Error> {
    sqlx::query_as::<_, DnInvoiceShare>(
        r#"
        SELECT sii.delivery_note,
               sii.parent AS sales_invoice,
               sum(sii.amount) AS dn_share_amount,
               si.grand_total AS si_total
        FROM sales_invoice_item sii
        INNER JOIN sales_invoice si ON si.name = sii.parent
        WHERE sii.delivery_note = ANY($1)
          AND si.docstatus = 1
        GROUP BY sii.delivery_note, sii.parent, si.grand_total
        "#,
    )
    .bind(dn_names)
    .fetch_all(pool)
    .await
}

/// Total submitted Receive-payment allocations per invoice.
pub async fn receive_allocations(
    pool: &PgPool,
    invoice_names: &[String],
) -> Result<Vec<InvoiceAllocation>, sqlx::Error> {
    sqlx::query_as::<_, InvoiceAllocation>(
        r#"
        SELECT per.reference_name AS sales_invoice,
               sum(per.allocated_amount) AS total_allocated
        FROM payment_entry_reference per
        INNER JOIN payment_entry pe ON pe.name = per.parent
        WHERE pe.docstatus = 1
          AND pe.payment_type = 'Receive'
          AND per.reference_type = 'Sales Invoice'
          AND per.reference_name = ANY($1)
        GROUP BY per.reference_name
        "#,
    )
    .bind(invoice_names)
    .fetch_all(pool)
    .await
}

/// Wallet ledger account per shipping company.
pub async fn wallet_accounts(
    pool: &PgPool,
    companies: &[String],
) -> Result<Vec<WalletAccount>, sqlx::Error> {
    sqlx::query_as::<_, WalletAccount>(
        r#"
        SELECT name AS shipping_company, account
        FROM shipping_company
        WHERE name = ANY($1)
        "#,
    )
    .bind(companies)
    .fetch_all(pool)
    .await
}

/// Every configured wallet account across all shipping companies.
pub async fn all_wallet_accounts(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        r#"
        SELECT account
        FROM shipping_company
        WHERE coalesce(account, '') != ''
        "#,
    )
    .fetch_all(pool)
    .await
}

/// Submitted internal-transfer totals debiting each wallet account.
pub async fn advance_offsets(
    pool: &PgPool,
    accounts: &[String],
) -> Result<Vec<AdvanceOffset>, sqlx::Error> {
    sqlx::query_as::<_, AdvanceOffset>(
        r#"
        SELECT pe.paid_from AS wallet_account,
               sum(pe.paid_amount) AS total_advance
        FROM payment_entry pe
        WHERE pe.docstatus = 1
          AND pe.payment_type = 'Internal Transfer'
          AND pe.paid_from = ANY($1)
        GROUP BY pe.paid_from
        "#,
    )
    .bind(accounts)
    .fetch_all(pool)
    .await
}

/// Running ledger balance (debit - credit) over non-cancelled entries for
/// the given wallet accounts.
pub async fn wallet_balance(
    pool: &PgPool,
    accounts: &[String],
) -> Result<BigDecimal, sqlx::Error> {
    sqlx::query_scalar::<_, BigDecimal>(
        r#"
        SELECT coalesce(sum(debit - credit), 0) AS balance
        FROM gl_entry
        WHERE account = ANY($1)
          AND is_cancelled = false
        "#,
    )
    .bind(accounts)
    .fetch_one(pool)
    .await
}
