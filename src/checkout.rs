//! Checkout orchestration: validates the customer's details, freezes the
//! cart into an order snapshot and submits it through the store. The cart
//! is cleared only after the store accepts the order.

use chrono::Utc;
use rand::Rng;

use crate::cart::Cart;
use crate::config::PricePolicy;
use crate::error::{AppError, Result};
use crate::models::{CustomerDetails, NewOrder, Order, OrderStatus};
use crate::store::Store;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutState {
    Editing,
    Validating,
    Submitting,
    Succeeded { order_id: String },
    Failed { message: String },
}

pub struct Checkout {
    cart: Cart,
    customer: CustomerDetails,
    policy: PricePolicy,
    state: CheckoutState,
}

impl Checkout {
    pub fn new(cart: Cart, customer: CustomerDetails, policy: PricePolicy) -> Self {
        Self {
            cart,
            customer,
            policy,
            state: CheckoutState::Editing,
        }
    }

    pub fn state(&self) -> &CheckoutState {
        &self.state
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn customer_mut(&mut self) -> &mut CustomerDetails {
        &mut self.customer
    }

    /// Drives one checkout attempt. Accepted only from `Editing` or
    /// `Failed`; a successful attempt is terminal. On a validation failure
    /// control returns to `Editing` with the cart untouched; on a store
    /// failure the state is `Failed` and the cart is likewise left intact
    /// so the customer can retry.
    pub async fn submit(&mut self, store: &Store) -> Result<Order> {
        match &self.state {
            CheckoutState::Editing | CheckoutState::Failed { .. } => {}
            CheckoutState::Succeeded { .. } => {
                return Err(AppError::Validation(
                    "This order has already been placed".to_string(),
                ));
            }
            CheckoutState::Validating | CheckoutState::Submitting => {
                return Err(AppError::Validation(
                    "A submission is already in progress".to_string(),
                ));
            }
        }

        self.state = CheckoutState::Validating;

        if self.cart.is_empty() {
            self.state = CheckoutState::Editing;
            return Err(AppError::Validation("Your cart is empty".to_string()));
        }

        if let Err(e) = validate_customer(&self.customer) {
            self.state = CheckoutState::Editing;
            return Err(e);
        }

        if self.policy == PricePolicy::Revalidate {
            if let Err(e) = self.reprice_from_catalog(store).await {
                self.state = CheckoutState::Editing;
                return Err(e);
            }
        }

        self.state = CheckoutState::Submitting;

        let new_order = self.assemble()?;
        match store.create_order(&new_order).await {
            Ok(order) => {
                self.cart.clear();
                self.state = CheckoutState::Succeeded {
                    order_id: order.order_id.clone(),
                };
                Ok(order)
            }
            Err(e) => {
                self.state = CheckoutState::Failed {
                    message: e.to_string(),
                };
                Err(e)
            }
        }
    }

    /// Re-reads every line's product and re-prices from the live catalog.
    /// Missing or out-of-stock products reject the whole submission.
    async fn reprice_from_catalog(&mut self, store: &Store) -> Result<()> {
        let mut current = Vec::with_capacity(self.cart.lines().len());
        for line in self.cart.lines() {
            let product = store.get_product(&line.id).await?.ok_or_else(|| {
                AppError::Validation(format!("{} is no longer available", line.name))
            })?;
            if !product.in_stock {
                return Err(AppError::Validation(format!(
                    "{} is out of stock",
                    product.name
                )));
            }
            current.push(product.price_per_set);
        }
        for (line, price) in self.cart.lines_mut().iter_mut().zip(current) {
            line.price_per_set = price;
        }
        Ok(())
    }

    fn assemble(&self) -> Result<NewOrder> {
        Ok(NewOrder {
            order_id: generate_order_id(),
            customer_name: self.customer.customer_name.trim().to_string(),
            customer_email: self.customer.customer_email.trim().to_string(),
            customer_phone: self.customer.customer_phone.trim().to_string(),
            customer_address: self.customer.customer_address.trim().to_string(),
            customer_city: self.customer.customer_city.trim().to_string(),
            customer_state: self.customer.customer_state.trim().to_string(),
            customer_pincode: self.customer.customer_pincode.trim().to_string(),
            customer_message: self.customer.customer_message.trim().to_string(),
            order_items: self.cart.to_json()?,
            total_sets: self.cart.total_sets(),
            total_amount: self.cart.total_amount(),
            order_status: OrderStatus::Pending,
        })
    }
}

/// Human-facing order identifier: `JSC` + unix millis + a random suffix.
pub fn generate_order_id() -> String {
    let timestamp = Utc::now().timestamp_millis();
    let random: u32 = rand::rng().random_range(0..10_000);
    format!("JSC{}{}", timestamp, random)
}

/// Checks every required field, returning a field-identifying message on
/// the first failure.
pub fn validate_customer(customer: &CustomerDetails) -> Result<()> {
    if customer.customer_name.trim().is_empty() {
        return Err(AppError::Validation("Please enter your name".to_string()));
    }

    if !is_valid_email(customer.customer_email.trim()) {
        return Err(AppError::Validation(
            "Please enter a valid email address".to_string(),
        ));
    }

    if !is_valid_phone(&customer.customer_phone) {
        return Err(AppError::Validation(
            "Please enter a valid 10-digit phone number".to_string(),
        ));
    }

    if customer.customer_address.trim().is_empty()
        || customer.customer_city.trim().is_empty()
        || customer.customer_state.trim().is_empty()
    {
        return Err(AppError::Validation(
            "Please fill in all address fields".to_string(),
        ));
    }

    if !is_valid_pincode(customer.customer_pincode.trim()) {
        return Err(AppError::Validation(
            "Please enter a valid 6-digit pincode".to_string(),
        ));
    }

    Ok(())
}

/// `local@domain` with a dotted domain; no whitespace or second `@`.
fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    let clean = |s: &str| !s.is_empty() && !s.contains(|c: char| c.is_whitespace() || c == '@');
    if !clean(local) || !clean(domain) {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((head, tail)) => !head.is_empty() && !tail.is_empty(),
        None => false,
    }
}

/// Exactly 10 digits once everything that is not a digit is stripped.
fn is_valid_phone(phone: &str) -> bool {
    phone.chars().filter(char::is_ascii_digit).count() == 10
}

fn is_valid_pincode(pincode: &str) -> bool {
    pincode.len() == 6 && pincode.chars().all(|c| c.is_ascii_digit())
}
