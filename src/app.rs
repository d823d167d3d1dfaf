use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
};
use tower_http::cors::CorsLayer;

use crate::{
    config::{AdminConfig, AppConfig, PricePolicy},
    error::Result,
    routes,
    store::Store,
};

/// Everything the handlers need, passed explicitly instead of living at
/// module scope.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub admin: AdminConfig,
    pub price_policy: PricePolicy,
}

pub async fn build(config: &AppConfig) -> Result<Router> {
    let store = Store::connect(&config.store).await?;

    let state = AppState {
        store,
        admin: config.admin.clone(),
        price_policy: config.checkout.price_policy,
    };

    let allowed_origins: Vec<HeaderValue> = config
        .cors
        .allowed_origins
        .iter()
        .map(|origin| {
            origin.parse::<HeaderValue>().map_err(|_| {
                crate::error::AppError::Config(format!("Invalid CORS origin: {}", origin))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([http::header::CONTENT_TYPE, http::header::AUTHORIZATION])
        .allow_origin(allowed_origins);

    let app = routes::create_router(state)
        .layer(DefaultBodyLimit::max(config.server.max_body_size))
        .layer(cors);

    Ok(app)
}
