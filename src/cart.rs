//! The shopper's in-progress selection. Lines snapshot the product's display
//! fields at add time; the cart never reaches back into the store between
//! add-to-cart and checkout.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::Product;

/// One product entry in the cart, with a quantity measured in sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub id: String,
    pub name: String,
    pub category: String,
    pub pieces_per_set: i32,
    pub price_per_set: Decimal,
    #[serde(default)]
    pub image_url: String,
    pub quantity: i32,
}

#[derive(Debug, Clone, Default)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a cart from externally supplied lines, merging duplicate
    /// product ids by summing quantities and dropping non-positive ones.
    pub fn from_lines(lines: Vec<CartLine>) -> Self {
        let mut cart = Cart::new();
        for line in lines {
            if line.quantity < 1 {
                continue;
            }
            match cart.lines.iter_mut().find(|l| l.id == line.id) {
                Some(existing) => existing.quantity += line.quantity,
                None => cart.lines.push(line),
            }
        }
        cart
    }

    /// Restores a cart from its durable JSON form.
    pub fn from_json(json: &str) -> Result<Self> {
        let lines: Vec<CartLine> = serde_json::from_str(json)
            .map_err(|e| AppError::Validation(format!("Invalid cart data: {}", e)))?;
        Ok(Cart::from_lines(lines))
    }

    /// Serializes the lines for durable storage; this is also the exact
    /// snapshot embedded into an order at checkout.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(&self.lines)
            .map_err(|e| AppError::Internal(format!("Failed to encode cart: {}", e)))
    }

    /// Adds `quantity` sets of a product, merging into an existing line for
    /// the same product id. Non-positive quantities are ignored.
    pub fn add_line(&mut self, product: &Product, quantity: i32) {
        if quantity < 1 {
            return;
        }
        match self.lines.iter_mut().find(|l| l.id == product.id) {
            Some(line) => line.quantity += quantity,
            None => self.lines.push(CartLine {
                id: product.id.clone(),
                name: product.name.clone(),
                category: product.category.clone(),
                pieces_per_set: product.pieces_per_set,
                price_per_set: product.price_per_set,
                image_url: product.image_url.clone(),
                quantity,
            }),
        }
    }

    /// Overwrites a line's quantity; zero or negative removes the line.
    pub fn set_quantity(&mut self, product_id: &str, quantity: i32) {
        if quantity <= 0 {
            self.remove_line(product_id);
        } else if let Some(line) = self.lines.iter_mut().find(|l| l.id == product_id) {
            line.quantity = quantity;
        }
    }

    pub fn remove_line(&mut self, product_id: &str) {
        self.lines.retain(|l| l.id != product_id);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub(crate) fn lines_mut(&mut self) -> &mut [CartLine] {
        &mut self.lines
    }

    pub fn total_sets(&self) -> i32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    pub fn total_pieces(&self) -> i32 {
        self.lines.iter().map(|l| l.pieces_per_set * l.quantity).sum()
    }

    pub fn total_amount(&self) -> Decimal {
        self.lines
            .iter()
            .map(|l| l.price_per_set * Decimal::from(l.quantity))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::dec;

    fn product(id: &str, price: Decimal, pieces: i32) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            category: "Silk".to_string(),
            pieces_per_set: pieces,
            price_per_set: price,
            description: String::new(),
            image_url: String::new(),
            in_stock: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn add_line_merges_same_product_by_summing_quantities() {
        let mut cart = Cart::new();
        let p = product("prod_1", dec!(4500), 6);

        cart.add_line(&p, 2);
        cart.add_line(&p, 3);

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 5);
    }

    #[test]
    fn add_line_ignores_non_positive_quantities() {
        let mut cart = Cart::new();
        cart.add_line(&product("prod_1", dec!(100), 1), 0);
        cart.add_line(&product("prod_1", dec!(100), 1), -3);
        assert!(cart.is_empty());
    }

    #[test]
    fn totals_follow_any_sequence_of_operations() {
        let mut cart = Cart::new();
        cart.add_line(&product("prod_1", dec!(4500), 6), 2);
        cart.add_line(&product("prod_2", dec!(1200.50), 4), 1);
        cart.set_quantity("prod_2", 3);
        cart.add_line(&product("prod_3", dec!(999), 2), 1);
        cart.remove_line("prod_3");

        assert_eq!(cart.total_sets(), 5);
        assert_eq!(cart.total_pieces(), 2 * 6 + 3 * 4);
        assert_eq!(cart.total_amount(), dec!(4500) * dec!(2) + dec!(1200.50) * dec!(3));
    }

    #[test]
    fn set_quantity_zero_removes_the_line() {
        let mut cart = Cart::new();
        cart.add_line(&product("prod_1", dec!(4500), 6), 2);
        cart.set_quantity("prod_1", 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn clear_empties_the_cart() {
        let mut cart = Cart::new();
        cart.add_line(&product("prod_1", dec!(4500), 6), 2);
        cart.add_line(&product("prod_2", dec!(1200), 4), 1);
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total_amount(), Decimal::ZERO);
    }

    #[test]
    fn json_round_trip_preserves_lines() {
        let mut cart = Cart::new();
        cart.add_line(&product("prod_1", dec!(4500), 6), 2);

        let json = cart.to_json().unwrap();
        let restored = Cart::from_json(&json).unwrap();

        assert_eq!(restored.lines(), cart.lines());
    }

    #[test]
    fn from_lines_merges_duplicates_and_drops_invalid() {
        let line = |id: &str, qty: i32| CartLine {
            id: id.to_string(),
            name: "x".to_string(),
            category: "y".to_string(),
            pieces_per_set: 1,
            price_per_set: dec!(10),
            image_url: String::new(),
            quantity: qty,
        };

        let cart = Cart::from_lines(vec![line("a", 1), line("b", 0), line("a", 2)]);

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 3);
    }
}
