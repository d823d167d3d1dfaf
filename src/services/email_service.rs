//! Order notification emails: a confirmation to the customer and an alert
//! to the owner, rendered from HTML templates and delivered over SMTP
//! using the `smtp_*` settings rows. Delivery is best-effort and never
//! fails order creation.

use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::header::ContentType,
    transport::smtp::authentication::Credentials,
};
use rust_decimal::Decimal;

use crate::error::{AppError, Result};
use crate::models::Order;
use crate::store::Store;

pub async fn send_order_emails(store: Store, order: Order) {
    if let Err(e) = dispatch(&store, &order).await {
        tracing::warn!(
            "Order notification emails for {} failed: {}",
            order.order_id,
            e
        );
    }
}

async fn dispatch(store: &Store, order: &Order) -> Result<()> {
    let business_name = setting_value(store, "business_name").await?;
    let business_email = setting_value(store, "business_email").await?;
    let owner_email = setting_value(store, "owner_email").await?;
    let smtp_host = setting_value(store, "smtp_host").await?;
    let smtp_port = setting_value(store, "smtp_port").await?;
    let smtp_user = setting_value(store, "smtp_user").await?;
    let smtp_pass = setting_value(store, "smtp_pass").await?;

    if smtp_host.is_empty() || smtp_user.is_empty() {
        tracing::info!("SMTP is not configured, skipping order notification emails");
        return Ok(());
    }

    let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp_host)
        .map_err(|e| AppError::Internal(format!("Failed to build SMTP transport: {}", e)))?
        .port(smtp_port.parse().unwrap_or(587))
        .credentials(Credentials::new(smtp_user, smtp_pass))
        .build();

    let confirmation = Message::builder()
        .from(parse_mailbox(&business_email)?)
        .to(parse_mailbox(&order.customer_email)?)
        .subject(format!(
            "Order Confirmation - {} - {}",
            order.order_id, business_name
        ))
        .header(ContentType::TEXT_HTML)
        .body(render_customer_email(order, &business_name, &business_email))
        .map_err(|e| AppError::Internal(format!("Failed to build customer email: {}", e)))?;

    mailer
        .send(confirmation)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to send customer email: {}", e)))?;

    let alert = Message::builder()
        .from(parse_mailbox(&owner_email)?)
        .to(parse_mailbox(&owner_email)?)
        .subject(format!(
            "New Order - {} - {}",
            order.order_id,
            format_inr(&order.total_amount)
        ))
        .header(ContentType::TEXT_HTML)
        .body(render_owner_email(order, &business_name)?)
        .map_err(|e| AppError::Internal(format!("Failed to build owner email: {}", e)))?;

    mailer
        .send(alert)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to send owner email: {}", e)))?;

    tracing::info!("Order notification emails sent for {}", order.order_id);
    Ok(())
}

async fn setting_value(store: &Store, key: &str) -> Result<String> {
    Ok(store
        .get_setting(key)
        .await?
        .map(|s| s.value)
        .unwrap_or_default())
}

fn parse_mailbox(address: &str) -> Result<lettre::message::Mailbox> {
    address
        .parse()
        .map_err(|e| AppError::Internal(format!("Invalid email address '{}': {}", address, e)))
}

fn render_customer_email(order: &Order, business_name: &str, business_email: &str) -> String {
    include_str!("customer_order.html")
        .replace("{{business_name}}", business_name)
        .replace("{{business_email}}", business_email)
        .replace("{{customer_name}}", &order.customer_name)
        .replace("{{order_id}}", &order.order_id)
        .replace("{{total_amount}}", &format_inr(&order.total_amount))
        .replace("{{total_sets}}", &order.total_sets.to_string())
        .replace("{{customer_address}}", &order.customer_address)
        .replace("{{customer_city}}", &order.customer_city)
        .replace("{{customer_state}}", &order.customer_state)
        .replace("{{customer_pincode}}", &order.customer_pincode)
}

fn render_owner_email(order: &Order, business_name: &str) -> Result<String> {
    let items = order.items()?;
    let rows: String = items
        .iter()
        .map(|item| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                item.name,
                item.category,
                item.quantity,
                item.pieces_per_set,
                format_inr(&item.price_per_set),
                format_inr(&(item.price_per_set * Decimal::from(item.quantity))),
            )
        })
        .collect();

    let message_block = if order.customer_message.is_empty() {
        String::new()
    } else {
        format!(
            "<p><strong>Message:</strong> {}</p>",
            order.customer_message
        )
    };

    Ok(include_str!("owner_order.html")
        .replace("{{business_name}}", business_name)
        .replace("{{order_id}}", &order.order_id)
        .replace("{{order_date}}", &order.order_date.format("%d %b %Y %H:%M").to_string())
        .replace("{{total_amount}}", &format_inr(&order.total_amount))
        .replace("{{total_sets}}", &order.total_sets.to_string())
        .replace("{{customer_name}}", &order.customer_name)
        .replace("{{customer_email}}", &order.customer_email)
        .replace("{{customer_phone}}", &order.customer_phone)
        .replace("{{customer_address}}", &order.customer_address)
        .replace("{{customer_city}}", &order.customer_city)
        .replace("{{customer_state}}", &order.customer_state)
        .replace("{{customer_pincode}}", &order.customer_pincode)
        .replace("{{message_block}}", &message_block)
        .replace("{{items_rows}}", &rows))
}

fn format_inr(amount: &Decimal) -> String {
    format!("₹{}", amount)
}
