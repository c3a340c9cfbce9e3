//! Order management routes.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::rbac::RequireAdmin;
use crate::middleware::validation::ValidatedJson;
use crate::models::order::{
    Order, OrderFilters, OrderSummary, OrderWithItems, UpdateOrder, UpdateOrderStatus,
};
use crate::models::pagination::{PagedResult, Pagination};
use crate::services::order as order_service;
use crate::AppState;

/// GET /api/orders
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(pagination): Query<Pagination>,
    Query(filters): Query<OrderFilters>,
) -> Result<Json<ApiResponse<PagedResult<OrderSummary>>>, AppError> {
    let result = order_service::list(&state.db, &filters, &pagination).await?;
    Ok(ApiResponse::success(result))
}

/// GET /api/orders/customer/{customer_id}
pub async fn list_for_customer(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(customer_id): Path<Uuid>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<ApiResponse<PagedResult<OrderSummary>>>, AppError> {
    let result = order_service::list_for_customer(&state.db, customer_id, &pagination).await?;
    Ok(ApiResponse::success(result))
}

/// GET /api/orders/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<OrderWithItems>>, AppError> {
    let order = order_service::find_with_items(&state.db, id).await?;
    Ok(ApiResponse::success(order))
}

/// PATCH /api/orders/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<Uuid>,
    ValidatedJson(body): ValidatedJson<UpdateOrder>,
) -> Result<Json<ApiResponse<Order>>, AppError> {
    let order = order_service::update(&state.db, id, &body).await?;
    Ok(ApiResponse::success(order))
}

/// PUT|PATCH /api/orders/{id}/status
pub async fn update_status(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<Uuid>,
    ValidatedJson(body): ValidatedJson<UpdateOrderStatus>,
) -> Result<Json<ApiResponse<Order>>, AppError> {
    let order = order_service::update_status(&state.db, id, body.status).await?;
    Ok(ApiResponse::success(order))
}

/// DELETE /api/orders/{id}: restores stock of every line.
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    order_service::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
