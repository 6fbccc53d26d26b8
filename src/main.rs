use axum::{
    routing::{get, post},
    Router,
};
use shipping_settlement_rust::{
    api, create_pool, AppConfig, CustomerSyncService, OrdersReportService, SettlementAnalytics,
    SummaryReport,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Local-time log format
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    let config = AppConfig::from_env();
    info!("Starting server with config: {:?}", config);

    let pool = create_pool(&config.database.url).await?;
    info!("Database pool created");

    let sync_service = Arc::new(CustomerSyncService::new(
        pool.clone(),
        config.storage.files_dir.clone(),
    ));
    let orders_report = Arc::new(OrdersReportService::new(
        pool.clone(),
        config.report.default_currency.clone(),
    ));
    let settlement = Arc::new(SettlementAnalytics::new(pool.clone()));
    let summary = Arc::new(SummaryReport::new(pool));

    let sync_routes = Router::new()
        .route("/api/sync/customers", post(api::sync_customers))
        .with_state(sync_service);

    let orders_routes = Router::new()
        .route(
            "/api/reports/shipping-company-orders",
            post(api::shipping_company_orders),
        )
        .route(
            "/api/reports/shipping-company-orders/export",
            post(api::shipping_company_orders_csv),
        )
        .with_state(orders_report);

    let analytics_routes = Router::new()
        .route(
            "/api/reports/shipping-company-analytics",
            post(api::shipping_company_analytics),
        )
        .with_state(settlement);

    let summary_routes = Router::new()
        .route(
            "/api/reports/shipping-company-summary",
            post(api::shipping_company_summary),
        )
        .with_state(summary);

    let app = Router::new()
        .route("/health", get(api::health_check))
        .merge(sync_routes)
        .merge(orders_routes)
        .merge(analytics_routes)
        .merge(summary_routes)
        .layer(ServiceBuilder::new());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  POST /api/sync/customers                          - customer enrichment from export file");
    info!("  POST /api/reports/shipping-company-orders         - orders report");
    info!("  POST /api/reports/shipping-company-orders/export  - orders report as CSV");
    info!("  POST /api/reports/shipping-company-analytics      - settlement analytics");
    info!("  POST /api/reports/shipping-company-summary        - per-company summary");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
