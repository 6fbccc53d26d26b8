pub mod delivery;
pub mod filters;
pub mod invoice;
pub mod report;
pub mod sync;

pub use delivery::{DeliveryNoteRow, SettlementNote, SummaryNote};
pub use filters::{AnalyticsFilters, OrdersReportFilters, SummaryFilters};
pub use invoice::{
    AdvanceOffset, DnInvoiceShare, InvoiceAllocation, InvoiceTotals, PaymentStatus, WalletAccount,
};
pub use report::{
    Chart, ChartData, ChartDataset, Column, OrdersReportRow, Report, SettlementRow, SummaryCard,
    SummaryRow,
};
pub use sync::{OrderRef, ShippingInfo, SyncOutcome};
