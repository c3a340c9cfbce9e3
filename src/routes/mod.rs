//! Route definitions for the back-office API.

pub mod auth;
pub mod customers;
pub mod dashboard;
pub mod dashboard_stats;
pub mod health;
pub mod orders;
pub mod products;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Uri},
    routing::{get, patch, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::errors::{self, AppError};
use crate::AppState;

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    errors::expose_internal_details(state.config.is_development());

    let auth_routes = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route("/auth/update-password", patch(auth::update_password));

    let stats_routes = Router::new()
        .route("/dashboard-stats", get(dashboard_stats::get_all))
        .route("/dashboard-stats/sales", post(dashboard_stats::refresh_sales))
        .route(
            "/dashboard-stats/products",
            post(dashboard_stats::refresh_products),
        )
        .route(
            "/dashboard-stats/customers",
            post(dashboard_stats::refresh_customers),
        )
        .route(
            "/dashboard-stats/monthly-sales",
            post(dashboard_stats::refresh_monthly_sales),
        )
        .route(
            "/dashboard-stats/update-all",
            post(dashboard_stats::refresh_all),
        );

    let live_dashboard_routes = Router::new()
        .route("/dashboard/sales", get(dashboard::sales))
        .route("/dashboard/products", get(dashboard::products))
        .route("/dashboard/orders", get(dashboard::orders))
        .route("/dashboard/customers", get(dashboard::customers))
        .route("/dashboard/recent-orders", get(dashboard::recent_orders))
        .route("/dashboard/top-products", get(dashboard::top_products));

    let product_routes = Router::new()
        .route("/products", get(products::list).post(products::create))
        .route("/products/categories", get(products::categories))
        .route(
            "/products/{id}",
            get(products::get_by_id)
                .patch(products::update)
                .put(products::update)
                .delete(products::delete),
        )
        .route("/products/{id}/stock", patch(products::update_stock));

    let order_routes = Router::new()
        .route("/orders", get(orders::list))
        .route(
            "/orders/customer/{customer_id}",
            get(orders::list_for_customer),
        )
        .route(
            "/orders/{id}",
            get(orders::get_by_id)
                .patch(orders::update)
                .delete(orders::delete),
        )
        .route(
            "/orders/{id}/status",
            patch(orders::update_status).put(orders::update_status),
        );

    let customer_routes = Router::new()
        .route("/customers", get(customers::list))
        .route(
            "/customers/{id}",
            get(customers::get_by_id).patch(customers::update),
        )
        .route("/customers/{id}/orders", get(customers::orders));

    let api = Router::new()
        .route("/health", get(health::status))
        .merge(auth_routes)
        .merge(stats_routes)
        .merge(live_dashboard_routes)
        .merge(product_routes)
        .merge(order_routes)
        .merge(customer_routes);

    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors_layer(&state.config.cors_origins));

    Router::new()
        .route("/health/live", get(health::live))
        .route("/health/ready", get(health::ready))
        .nest("/api", api)
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(state.config.max_body_bytes))
        .layer(middleware)
        .with_state(state)
}

/// CORS for the configured origins; any origin when none are configured.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if allowed.is_empty() {
        cors.allow_origin(Any)
    } else {
        cors.allow_origin(allowed)
    }
}

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("Can't find {} on this server!", uri.path()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header::CONTENT_TYPE, Request, StatusCode},
    };
    use tower::ServiceExt;

    use crate::config::{AppConfig, Environment};

    fn test_router(max_body_bytes: usize) -> Router {
        let db = sqlx::PgPool::connect_lazy("postgres://backoffice@localhost/unused").unwrap();
        let config = AppConfig {
            database_url: "postgres://backoffice@localhost/unused".to_string(),
            database_max_connections: 1,
            host: "127.0.0.1".to_string(),
            port: 0,
            jwt_secret: "router-test-secret".to_string(),
            jwt_access_token_expiry_secs: 900,
            jwt_refresh_token_expiry_secs: 3600,
            cors_origins: vec!["http://localhost:3000".to_string()],
            environment: Environment::Development,
            max_body_bytes,
        };
        router(AppState { db, config })
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn unknown_route_uses_fallback_envelope() {
        let response = test_router(1024)
            .oneshot(Request::get("/api/nowhere").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = json_body(response).await;
        assert_eq!(json["status"], "fail");
        assert_eq!(json["error"]["message"], "Can't find /api/nowhere on this server!");
    }

    #[tokio::test]
    async fn oversized_body_rejected_before_handler() {
        let password = "p".repeat(4096);
        let body = serde_json::json!({ "email": "ops@backoffice.test", "password": password });
        let request = Request::post("/api/auth/login")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = test_router(1024).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    }
}
