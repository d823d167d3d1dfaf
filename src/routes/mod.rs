mod admin;
mod health;
mod orders;
mod products;
mod settings;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    let admin_routes = Router::new()
        .route("/stats", get(admin::stats))
        .route("/recent-orders", get(admin::recent_orders))
        .route("/orders", get(admin::list_orders))
        .route("/orders/{id}", get(admin::get_order))
        .route("/orders/{id}/status", put(admin::update_order_status))
        .route("/products", post(admin::create_product))
        .route(
            "/products/{id}",
            put(admin::update_product).delete(admin::delete_product),
        )
        .route("/settings", get(admin::list_settings))
        .route("/settings/{key}", put(admin::update_setting))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::require_admin,
        ))
        .route("/login", post(admin::login));

    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/api/products", get(products::list_products))
        .route("/api/products/{id}", get(products::get_product))
        .route("/api/orders", post(orders::create_order))
        .route("/api/orders/{id}", get(orders::get_order))
        .route("/api/settings", get(settings::list_settings))
        .nest("/api/admin", admin_routes)
        .with_state(state)
}
