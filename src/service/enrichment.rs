use crate::db::queries;
use crate::error::AppError;
use crate::models::{OrderRef, ShippingInfo, SyncOutcome};
use crate::sheet::{self, SheetRow};
use sqlx::PgPool;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

// Header contract of the export file.
const ID_COLUMN: &str = "Id";
const SHIPPING_NAME_COLUMN: &str = "Shipping Name";
const EMAIL_COLUMN: &str = "Email";
const PHONE_COLUMN: &str = "Phone";
const CREATED_AT_COLUMN: &str = "Created at";
const ADDRESS_COLUMNS: &[&str] = &[
    "Shipping Street",
    "Shipping Address1",
    "Shipping City",
    "Shipping Province",
    "Shipping Zip",
];
const COUNTRY_COLUMN: &str = "Shipping Country";

/// ISO country codes seen in export files, mapped to display names. Unknown
/// values pass through unchanged.
const COUNTRY_NAMES: &[(&str, &str)] = &[
    ("SA", "Saudi Arabia"),
    ("AE", "United Arab Emirates"),
    ("KW", "Kuwait"),
    ("QA", "Qatar"),
    ("BH", "Bahrain"),
    ("OM", "Oman"),
    ("EG", "Egypt"),
    ("JO", "Jordan"),
    ("IQ", "Iraq"),
    ("US", "United States"),
    ("GB", "United Kingdom"),
];

/// Enrichment job: matches export rows to sales orders by external order id
/// and writes the derived shipping fields onto the order, its invoice and
/// its delivery notes.
pub struct CustomerSyncService {
    pool: PgPool,
    files_dir: PathBuf,
}

impl CustomerSyncService {
    pub fn new(pool: PgPool, files_dir: PathBuf) -> Self {
        Self { pool, files_dir }
    }

    /// Run one enrichment pass over the given export file.
    ///
    /// File-level failures abort before any row is touched. Per-row failures
    /// are collected into the outcome and never stop the batch. Re-running
    /// with the same file is idempotent: every write is an overwrite keyed by
    /// record name.
    pub async fn sync_from_file(&self, file_path: &str) -> Result<SyncOutcome, AppError> {
        let path = self.resolve_path(file_path)?;
        let rows = sheet::read_rows(&path)?;

        let date_from = sheet::earliest_date(&rows, CREATED_AT_COLUMN);
        let row_index = index_rows(&rows);

        let orders = queries::list_orders_with_external_id(&self.pool, date_from).await?;
        info!(
            "Sync from {:?}: {} file rows, {} candidate orders since {}",
            path,
            rows.len(),
            orders.len(),
            date_from
        );

        let (matched, skipped) = match_orders(&orders, &row_index);
        let mut outcome = SyncOutcome {
            skipped,
            ..SyncOutcome::default()
        };
        for (order, row) in matched {
            let shipping_info = extract_shipping_info(row);
            match self.apply_shipping_info(order, &shipping_info).await {
                Ok(()) => outcome.updated += 1,
                Err(e) => {
                    warn!("Order {} update failed: {}", order.name, e);
                    outcome.errors.push(format!("{}: {}", order.name, e));
                }
            }
        }

        info!(
            "Sync complete: {} updated, {} skipped, {} errors",
            outcome.updated,
            outcome.skipped,
            outcome.errors.len()
        );
        Ok(outcome)
    }

    /// Write the derived fields to the order and cascade to the invoice and
    /// delivery notes sharing its external order id. Zero affected rows on
    /// the cascades means nothing to update, not an error.
    async fn apply_shipping_info(
        &self,
        order: &OrderRef,
        info: &ShippingInfo,
    ) -> Result<(), sqlx::Error> {
        queries::update_order_shipping(&self.pool, &order.name, info).await?;
        queries::update_invoice_shipping(&self.pool, &order.shop_order_id, info).await?;
        queries::update_delivery_notes_shipping(&self.pool, &order.shop_order_id, info).await?;
        Ok(())
    }

    /// Resolve a request path against the files directory. A bare file name
    /// is also tried directly under the files directory, matching how upload
    /// URLs are usually passed around.
    fn resolve_path(&self, file_path: &str) -> Result<PathBuf, AppError> {
        let raw = Path::new(file_path);
        let candidate = if raw.is_absolute() {
            raw.to_path_buf()
        } else {
            self.files_dir.join(raw)
        };
        if candidate.exists() {
            return Ok(candidate);
        }
        if let Some(file_name) = raw.file_name() {
            let fallback = self.files_dir.join(file_name);
            if fallback.exists() {
                return Ok(fallback);
            }
        }
        Err(AppError::FileNotFound(candidate))
    }
}

/// Index file rows by their trimmed order id; rows without an id can never
/// match and are left out.
pub fn index_rows(rows: &[SheetRow]) -> HashMap<&str, &SheetRow> {
    rows.iter()
        .filter_map(|row| {
            let id = sheet::cell(row, ID_COLUMN);
            (!id.is_empty()).then_some((id, row))
        })
        .collect()
}

/// Partition candidate orders into (order, row) pairs to update and a count
/// of orders without a matching file row. Unmatched orders produce no pair,
/// so nothing is ever written for them.
pub fn match_orders<'o, 'r>(
    orders: &'o [OrderRef],
    row_index: &HashMap<&str, &'r SheetRow>,
) -> (Vec<(&'o OrderRef, &'r SheetRow)>, u32) {
    let mut matched = Vec::new();
    let mut skipped = 0;
    for order in orders {
        match row_index.get(order.shop_order_id.trim()) {
            Some(row) => matched.push((order, *row)),
            None => skipped += 1,
        }
    }
    (matched, skipped)
}

/// Derive the shipping fields from one export row: name falls back to email,
/// the address is the comma-joined non-empty address parts with the country
/// code mapped to a display name.
pub fn extract_shipping_info(row: &SheetRow) -> ShippingInfo {
    let mut address_parts: Vec<String> = ADDRESS_COLUMNS
        .iter()
        .map(|column| sheet::cell(row, column).to_string())
        .filter(|part| !part.is_empty())
        .collect();

    let country = sheet::cell(row, COUNTRY_COLUMN);
    if !country.is_empty() {
        address_parts.push(map_country(country));
    }

    let mut customer_name = sheet::cell(row, SHIPPING_NAME_COLUMN).to_string();
    if customer_name.is_empty() {
        customer_name = sheet::cell(row, EMAIL_COLUMN).to_string();
    }

    ShippingInfo {
        customer_name,
        address: address_parts.join(", "),
        phone: sheet::cell(row, PHONE_COLUMN).to_string(),
    }
}

/// Map an ISO country code to its display name; anything unrecognized is
/// returned as-is.
pub fn map_country(raw: &str) -> String {
    let code = raw.trim().to_ascii_uppercase();
    COUNTRY_NAMES
        .iter()
        .find(|(iso, _)| *iso == code)
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| raw.trim().to_string())
}
