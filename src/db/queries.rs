use crate::models::{
    DeliveryNoteRow, InvoiceTotals, OrderRef, OrdersReportFilters, ShippingInfo, SummaryFilters,
    SummaryNote,
};
use chrono::NaiveDate;
use sqlx::PgPool;

/// Sales orders carrying an external order id, created on/after `date_from`.
pub async fn list_orders_with_external_id(
    pool: &PgPool,
    date_from: NaiveDate,
) -> Result<Vec<OrderRef>, sqlx::Error> {
    sqlx::query_as::<_, OrderRef>(
        r#"
        SELECT name, shop_order_id
        FROM sales_order
        WHERE creation >= $1
          AND coalesce(shop_order_id, '') != ''
        "#,
    )
    .bind(date_from)
    .fetch_all(pool)
    .await
}

/// Overwrite the shipping fields on a sales order.
pub async fn update_order_shipping(
    pool: &PgPool,
    order_name: &str,
    info: &ShippingInfo,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE sales_order
        SET shipping_customer_name = $2,
            shipping_address = $3,
            shipping_phone = $4
        WHERE name = $1
        "#,
    )
    .bind(order_name)
    .bind(&info.customer_name)
    .bind(&info.address)
    .bind(&info.phone)
    .execute(pool)
    .await?;
    Ok(())
}

/// Cascade shipping fields to the invoice carrying the same external order
/// id. Zero rows affected simply means there is no invoice yet.
pub async fn update_invoice_shipping(
    pool: &PgPool,
    shop_order_id: &str,
    info: &ShippingInfo,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE sales_invoice
        SET shipping_customer_name = $2,
            shipping_address = $3,
            shipping_phone = $4
        WHERE shop_order_id = $1
        "#,
    )
    .bind(shop_order_id)
    .bind(&info.customer_name)
    .bind(&info.address)
    .bind(&info.phone)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

/// Cascade shipping fields to every delivery note for the external order id.
pub async fn update_delivery_notes_shipping(
    pool: &PgPool,
    shop_order_id: &str,
    info: &ShippingInfo,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE delivery_note
        SET shipping_customer_name = $2,
            shipping_address = $3,
            shipping_phone = $4
        WHERE shop_order_id = $1
        "#,
    )
    .bind(shop_order_id)
    .bind(&info.customer_name)
    .bind(&info.address)
    .bind(&info.phone)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

/// Delivery notes for the orders report, joined to the originating sales
/// order and the city / shipping-company display names. NULL-bound filters
/// are no-ops.
pub async fn list_delivery_note_rows(
    pool: &PgPool,
    filters: &OrdersReportFilters,
) -> Result<Vec<DeliveryNoteRow>, sqlx::Error> {
    sqlx::query_as::<_, DeliveryNoteRow>(
        r#"
        SELECT DISTINCT
               dn.name AS delivery_note,
               dn.posting_date,
               dni.against_sales_order AS sales_order,
               dn.shipping_customer_name,
               dn.shipping_phone,
               dn.shipping_address,
               city.city_name AS city_display,
               sc.shipping_name AS shipping_company_display,
               dn.tracking_no,
               dn.shipping_status,
               dn.is_return,
               dn.grand_total,
               dn.currency
        FROM delivery_note dn
        LEFT JOIN delivery_note_item dni ON dni.parent = dn.name
        LEFT JOIN city ON city.name = dn.city
        LEFT JOIN shipping_company sc ON sc.name = dn.shipping_company
        WHERE ($1::date IS NULL OR dn.posting_date >= $1)
          AND ($2::date IS NULL OR dn.posting_date <= $2)
          AND ($3::text IS NULL OR dn.city = $3)
          AND ($4::text IS NULL OR dn.shipping_company = $4)
          AND ($5::text IS NULL OR dn.status = $5)
          AND ($6::bool IS NULL OR dn.is_return = $6)
        ORDER BY dn.posting_date DESC
        "#,
    )
    .bind(filters.from_date)
    .bind(filters.to_date)
    .bind(filters.city_filter())
    .bind(filters.shipping_company_filter())
    .bind(filters.status_filter())
    .bind(filters.return_filter())
    .fetch_all(pool)
    .await
}

/// Totals of every submitted invoice with at least one line against the
/// sales order.
pub async fn invoice_totals_for_order(
    pool: &PgPool,
    sales_order: &str,
) -> Result<Vec<InvoiceTotals>, sqlx::Error> {
    sqlx::query_as::<_, InvoiceTotals>(
        r#"
        SELECT si.name, si.grand_total, si.outstanding_amount
        FROM sales_invoice si
        WHERE si.docstatus = 1
          AND EXISTS (
              SELECT 1
              FROM sales_invoice_item sii
              WHERE sii.parent = si.name
                AND sii.sales_order = $1
          )
        "#,
    )
    .bind(sales_order)
    .fetch_all(pool)
    .await
}

/// Submitted delivery notes with a shipping company, for the summary report.
pub async fn list_summary_notes(
    pool: &PgPool,
    filters: &SummaryFilters,
) -> Result<Vec<SummaryNote>, sqlx::Error> {
    sqlx::query_as::<_, SummaryNote>(
        r#"
        SELECT dn.name AS delivery_note,
               dn.posting_date,
               dn.customer,
               dn.shipping_company,
               dn.shipping_status,
               dn.grand_total,
               dn.company
        FROM delivery_note dn
        WHERE dn.docstatus = 1
          AND coalesce(dn.shipping_company, '') != ''
          AND ($1::date IS NULL OR dn.posting_date >= $1)
          AND ($2::date IS NULL OR dn.posting_date <= $2)
          AND ($3::text IS NULL OR dn.shipping_company = $3)
          AND ($4::text IS NULL OR dn.shipping_status = $4)
          AND ($5::text IS NULL OR dn.company = $5)
          AND ($6::text IS NULL OR dn.customer = $6)
        ORDER BY dn.posting_date DESC, dn.shipping_company
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
