//! Dashboard statistics routes: combined read and per-category refreshes.

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::rbac::RequireAdmin;
use crate::models::stats::{
    CustomerSnapshot, DashboardStats, MonthlySalesRecord, ProductSnapshot, RefreshAllOutcome,
    SalesSnapshot,
};
use crate::services::stats::{self, MonthlyRefresh};
use crate::AppState;

/// GET /api/dashboard-stats: every stored snapshot plus monthly history.
pub async fn get_all(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<ApiResponse<DashboardStats>>, AppError> {
    let stats = stats::get_dashboard_stats(&state.db, Utc::now()).await?;
    Ok(ApiResponse::success(stats))
}

/// POST /api/dashboard-stats/sales
pub async fn refresh_sales(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<ApiResponse<SalesSnapshot>>, AppError> {
    let snapshot = stats::refresh_sales(&state.db, Utc::now()).await?;
    Ok(ApiResponse::success(snapshot))
}

/// POST /api/dashboard-stats/products
pub async fn refresh_products(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<ApiResponse<ProductSnapshot>>, AppError> {
    let snapshot = stats::refresh_products(&state.db, Utc::now()).await?;
    Ok(ApiResponse::success(snapshot))
}

/// POST /api/dashboard-stats/customers
pub async fn refresh_customers(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<ApiResponse<CustomerSnapshot>>, AppError> {
    let snapshot = stats::refresh_customers(&state.db, Utc::now()).await?;
    Ok(ApiResponse::success(snapshot))
}

/// POST /api/dashboard-stats/monthly-sales: 201 when created, 200 when it already existed.
pub async fn refresh_monthly_sales(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<(StatusCode, Json<ApiResponse<MonthlySalesRecord>>), AppError> {
    let refresh = stats::refresh_monthly_sales(&state.db, Utc::now()).await?;
    let status = match refresh {
        MonthlyRefresh::Created(_) => StatusCode::CREATED,
        MonthlyRefresh::Existing(_) => StatusCode::OK,
    };
    Ok((status, ApiResponse::success(refresh.into_record())))
}

/// POST /api/dashboard-stats/update-all
pub async fn refresh_all(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<Json<ApiResponse<RefreshAllOutcome>>, AppError> {
    tracing::info!(admin_id = %admin.admin.id, "Refreshing all statistics");
    let outcome = stats::refresh_all(&state.db, Utc::now()).await?;
    Ok(ApiResponse::success(outcome))
}
