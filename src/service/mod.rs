pub mod enrichment;
pub mod orders_report;
pub mod settlement;
pub mod summary;

pub use enrichment::CustomerSyncService;
pub use orders_report::OrdersReportService;
pub use settlement::SettlementAnalytics;
pub use summary::SummaryReport;
