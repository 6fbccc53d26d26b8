use crate::error::AppError;
use crate::models::{AnalyticsFilters, OrdersReportFilters, SummaryFilters, SyncOutcome};
use crate::service::{CustomerSyncService, OrdersReportService, SettlementAnalytics, SummaryReport};
use axum::{
    extract::{Json, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Request body: spreadsheet export to sync from.
#[derive(Debug, Deserialize)]
pub struct SyncRequest {
    pub file_path: String,
}

/// Response body of the sync endpoint.
#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub success: bool,
    pub message: String,
    pub result: Option<SyncOutcome>,
}

/// Error envelope shared by all endpoints.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

fn error_response(status: StatusCode, error: AppError) -> Response {
    let body = ErrorResponse {
        success: false,
        message: format!("Error: {}", error),
    };
    (status, Json(body)).into_response()
}

/// Health check
pub async fn health_check() -> &'static str {
    "OK"
}

/// Customer enrichment: update orders/invoices/delivery notes from an export file.
pub async fn sync_customers(
    State(service): State<Arc<CustomerSyncService>>,
    Json(req): Json<SyncRequest>,
) -> Response {
    match service.sync_from_file(&req.file_path).await {
        Ok(outcome) => {
            let response = SyncResponse {
                success: true,
                message: format!(
                    "Sync complete: {} updated, {} skipped, {} errors",
                    outcome.updated,
                    outcome.skipped,
                    outcome.errors.len()
                ),
                result: Some(outcome),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e @ AppError::FileNotFound(_)) => error_response(StatusCode::BAD_REQUEST, e),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}

/// Shipping Company Orders report.
pub async fn shipping_company_orders(
    State(service): State<Arc<OrdersReportService>>,
    Json(filters): Json<OrdersReportFilters>,
) -> Response {
    match service.run(&filters).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}

/// Shipping Company Orders report rendered as CSV text.
pub async fn shipping_company_orders_csv(
    State(service): State<Arc<OrdersReportService>>,
    Json(filters): Json<OrdersReportFilters>,
) -> Response {
    match service.export_csv(&filters).await {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}

/// Settlement Analytics report.
pub async fn shipping_company_analytics(
    State(service): State<Arc<SettlementAnalytics>>,
    Json(filters): Json<AnalyticsFilters>,
) -> Response {
    match service.run(&filters).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}

/// Shipping Company Summary report.
pub async fn shipping_company_summary(
    State(service): State<Arc<SummaryReport>>,
    Json(filters): Json<SummaryFilters>,
) -> Response {
    match service.run(&filters).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}
