use axum::{
    Json,
    extract::{Path, Query, State},
};
use http::StatusCode;
use rust_decimal::Decimal;
use serde_json::{Value, json};

use crate::{
    AppState,
    error::{AppError, Result},
    models::{
        AdminLoginRequest, AdminStats, Order, OrderFilter, Product, ProductFilter, ProductRequest,
        Setting, SettingUpdateRequest, StatusUpdateRequest,
    },
};

const RECENT_ORDERS_LIMIT: i64 = 5;

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<AdminLoginRequest>,
) -> Result<Json<Value>> {
    if payload.username != state.admin.username || payload.password != state.admin.password {
        return Err(AppError::Unauthorized(
            "Invalid username or password".to_string(),
        ));
    }

    Ok(Json(json!({ "success": true })))
}

pub async fn stats(State(state): State<AppState>) -> Result<Json<AdminStats>> {
    let products = state.store.list_products(&ProductFilter::default()).await?;
    let orders = state.store.list_orders(&OrderFilter::default()).await?;

    let total_revenue: Decimal = orders.iter().map(|o| o.total_amount).sum();

    Ok(Json(AdminStats {
        total_products: products.len() as i64,
        total_orders: orders.len() as i64,
        total_revenue,
    }))
}

pub async fn recent_orders(State(state): State<AppState>) -> Result<Json<Vec<Order>>> {
    let orders = state
        .store
        .list_orders(&OrderFilter {
            status: None,
            limit: Some(RECENT_ORDERS_LIMIT),
        })
        .await?;

    Ok(Json(orders))
}

pub async fn list_orders(
    State(state): State<AppState>,
    Query(filter): Query<OrderFilter>,
) -> Result<Json<Vec<Order>>> {
    let orders = state.store.list_orders(&filter).await?;

    Ok(Json(orders))
}

pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Order>> {
    let order = state
        .store
        .get_order(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

    Ok(Json(order))
}

pub async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<StatusUpdateRequest>,
) -> Result<Json<Value>> {
    let changes = state.store.update_order_status(&id, payload.status).await?;

    if changes == 0 {
        return Err(AppError::NotFound("Order not found".to_string()));
    }

    Ok(Json(json!({
        "success": true,
        "message": "Order status updated successfully"
    })))
}

pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<ProductRequest>,
) -> Result<(StatusCode, Json<Product>)> {
    let product = state.store.create_product(&payload).await?;

    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<ProductRequest>,
) -> Result<Json<Product>> {
    let changes = state.store.update_product(&id, &payload).await?;

    if changes == 0 {
        return Err(AppError::NotFound("Product not found".to_string()));
    }

    let product = state
        .store
        .get_product(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    Ok(Json(product))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let changes = state.store.delete_product(&id).await?;

    if changes == 0 {
        return Err(AppError::NotFound("Product not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_settings(State(state): State<AppState>) -> Result<Json<Vec<Setting>>> {
    let settings = state.store.list_settings().await?;

    Ok(Json(settings))
}

pub async fn update_setting(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(payload): Json<SettingUpdateRequest>,
) -> Result<Json<Value>> {
    let changes = state.store.update_setting(&key, &payload.value).await?;

    if changes == 0 {
        return Err(AppError::NotFound("Setting not found".to_string()));
    }

    Ok(Json(json!({
        "success": true,
        "message": "Setting updated successfully"
    })))
}
