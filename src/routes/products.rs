//! Product catalog routes.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::rbac::RequireAdmin;
use crate::middleware::validation::ValidatedJson;
use crate::models::pagination::{PagedResult, Pagination};
use crate::models::product::{
    CategoryCount, CreateProduct, ProductFilters, ProductResponse, UpdateProduct, UpdateStock,
};
use crate::services::product as product_service;
use crate::AppState;

/// GET /api/products
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(pagination): Query<Pagination>,
    Query(filters): Query<ProductFilters>,
) -> Result<Json<ApiResponse<PagedResult<ProductResponse>>>, AppError> {
    let result = product_service::list(&state.db, &filters, &pagination).await?;
    Ok(ApiResponse::success(result))
}

/// GET /api/products/categories
pub async fn categories(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<ApiResponse<Vec<CategoryCount>>>, AppError> {
    let categories = product_service::categories(&state.db).await?;
    Ok(ApiResponse::success(categories))
}

/// POST /api/products
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ValidatedJson(body): ValidatedJson<CreateProduct>,
) -> Result<(StatusCode, Json<ApiResponse<ProductResponse>>), AppError> {
    let product = product_service::create(&state.db, &body).await?;
    Ok((StatusCode::CREATED, ApiResponse::success(product.into())))
}

/// GET /api/products/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ProductResponse>>, AppError> {
    let product = product_service::find_by_id(&state.db, id).await?;
    Ok(ApiResponse::success(product.into()))
}

/// PATCH|PUT /api/products/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<Uuid>,
    ValidatedJson(body): ValidatedJson<UpdateProduct>,
) -> Result<Json<ApiResponse<ProductResponse>>, AppError> {
    let product = product_service::update(&state.db, id, &body).await?;
    Ok(ApiResponse::success(product.into()))
}

/// PATCH /api/products/{id}/stock
pub async fn update_stock(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<Uuid>,
    ValidatedJson(body): ValidatedJson<UpdateStock>,
) -> Result<Json<ApiResponse<ProductResponse>>, AppError> {
    let stock = body
        .stock
        .ok_or_else(|| AppError::Validation("Please provide stock quantity".to_string()))?;
    let product = product_service::update_stock(&state.db, id, stock).await?;
    Ok(ApiResponse::success(product.into()))
}

/// DELETE /api/products/{id}
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    product_service::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
