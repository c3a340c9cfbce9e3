//! Customer management routes.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::rbac::RequireAdmin;
use crate::middleware::validation::ValidatedJson;
use crate::models::customer::{Customer, CustomerFilters, CustomerSummary, UpdateCustomer};
use crate::models::order::OrderSummary;
use crate::models::pagination::{PagedResult, Pagination};
use crate::services::customer as customer_service;
use crate::AppState;

/// GET /api/customers
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(pagination): Query<Pagination>,
    Query(filters): Query<CustomerFilters>,
) -> Result<Json<ApiResponse<PagedResult<CustomerSummary>>>, AppError> {
    let result = customer_service::list(&state.db, &filters, &pagination).await?;
    Ok(ApiResponse::success(result))
}

/// GET /api/customers/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Customer>>, AppError> {
    let customer = customer_service::find_by_id(&state.db, id).await?;
    Ok(ApiResponse::success(customer))
}

/// PATCH /api/customers/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<Uuid>,
    ValidatedJson(body): ValidatedJson<UpdateCustomer>,
) -> Result<Json<ApiResponse<Customer>>, AppError> {
    let customer = customer_service::update(&state.db, id, &body).await?;
    Ok(ApiResponse::success(customer))
}

/// GET /api/customers/{id}/orders
pub async fn orders(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<Uuid>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<ApiResponse<PagedResult<OrderSummary>>>, AppError> {
    let result = customer_service::orders(&state.db, id, &pagination).await?;
    Ok(ApiResponse::success(result))
}
