use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Totals of one submitted invoice with at least one line against a sales order.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct InvoiceTotals {
    pub name: String,
    pub grand_total: BigDecimal,
    pub outstanding_amount: BigDecimal,
}

/// Per (delivery note, invoice) line share used for payment apportionment.
/// `dn_share_amount` is the sum of the invoice lines referencing the note,
/// `si_total` the invoice grand total.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DnInvoiceShare {
    pub delivery_note: String,
    pub sales_invoice: String,
    pub dn_share_amount: BigDecimal,
    pub si_total: BigDecimal,
}

/// Total submitted Receive-payment allocation against one invoice.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct InvoiceAllocation {
    pub sales_invoice: String,
    pub total_allocated: BigDecimal,
}

/// Shipping company together with its wallet ledger account, if configured.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct WalletAccount {
    pub shipping_company: String,
    pub account: Option<String>,
}

/// Internal-transfer total debited from one wallet account.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AdvanceOffset {
    pub wallet_account: String,
    pub total_advance: BigDecimal,
}

/// Payment settlement state of a delivery note's originating order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentStatus {
    #[serde(rename = "Fully Paid")]
    FullyPaid,
    #[serde(rename = "Not Paid")]
    NotPaid,
    #[serde(rename = "Partially Paid")]
    PartiallyPaid,
    #[serde(rename = "Not Invoiced")]
    NotInvoiced,
    Returned,
    /// Delivery note has no originating sales order.
    #[serde(rename = "")]
    Empty,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::FullyPaid => "Fully Paid",
            PaymentStatus::NotPaid => "Not Paid",
            PaymentStatus::PartiallyPaid => "Partially Paid",
            PaymentStatus::NotInvoiced => "Not Invoiced",
            PaymentStatus::Returned => "Returned",
            PaymentStatus::Empty => "",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
