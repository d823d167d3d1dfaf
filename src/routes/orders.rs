use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    AppState,
    cart::Cart,
    checkout::Checkout,
    error::{AppError, Result},
    models::{CheckoutRequest, CheckoutResponse, Order},
    services::email_service,
};

/// Runs the whole checkout flow server-side: cart reconstruction, field
/// validation, order assembly and persistence. Notification emails are
/// dispatched in the background and never affect the response.
pub async fn create_order(
    State(state): State<AppState>,
    Json(payload): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<CheckoutResponse>)> {
    for item in &payload.items {
        if item.quantity < 1 {
            return Err(AppError::Validation(format!(
                "Invalid quantity for product {}",
                item.id
            )));
        }
    }

    let cart = Cart::from_lines(payload.items);
    let mut checkout = Checkout::new(cart, payload.customer, state.price_policy);
    let order = checkout.submit(&state.store).await?;

    tokio::spawn(email_service::send_order_emails(
        state.store.clone(),
        order.clone(),
    ));

    Ok((
        StatusCode::CREATED,
        Json(CheckoutResponse {
            success: true,
            order_id: order.order_id,
            message: "Order created successfully".to_string(),
        }),
    ))
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
