//! Live dashboard routes, computed on every request.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::rbac::RequireAdmin;
use crate::models::dashboard::{
    LimitQuery, LiveCustomerStats, LiveOrderStats, LiveProductStats, LiveSalesStats,
    RecentOrders, SalesRangeQuery, TopProducts,
};
use crate::services::dashboard as dashboard_service;
use crate::AppState;

/// GET /api/dashboard/sales?startDate&endDate
pub async fn sales(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<SalesRangeQuery>,
) -> Result<Json<ApiResponse<LiveSalesStats>>, AppError> {
    let range = dashboard_service::resolve_sales_range(&query, Utc::now())?;
    let stats = dashboard_service::sales_stats(&state.db, range).await?;
    Ok(ApiResponse::success(stats))
}

/// GET /api/dashboard/products
pub async fn products(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<ApiResponse<LiveProductStats>>, AppError> {
    let stats = dashboard_service::product_stats(&state.db).await?;
    Ok(ApiResponse::success(stats))
}

/// GET /api/dashboard/orders
pub async fn orders(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<ApiResponse<LiveOrderStats>>, AppError> {
    let stats = dashboard_service::order_stats(&state.db).await?;
    Ok(ApiResponse::success(stats))
}

/// GET /api/dashboard/customers
pub async fn customers(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<ApiResponse<LiveCustomerStats>>, AppError> {
    let stats = dashboard_service::customer_stats(&state.db, Utc::now()).await?;
    Ok(ApiResponse::success(stats))
}

/// GET /api/dashboard/recent-orders?limit
pub async fn recent_orders(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<LimitQuery>,
) -> Result<Json<ApiResponse<RecentOrders>>, AppError> {
    let limit = dashboard_service::list_limit(query.limit);
    let orders = dashboard_service::recent_orders(&state.db, limit).await?;
    Ok(ApiResponse::success(orders))
}

/// GET /api/dashboard/top-products?limit
pub async fn top_products(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<LimitQuery>,
) -> Result<Json<ApiResponse<TopProducts>>, AppError> {
    let limit = dashboard_service::list_limit(query.limit);
    let products = dashboard_service::top_products(&state.db, limit).await?;
    Ok(ApiResponse::success(products))
}
