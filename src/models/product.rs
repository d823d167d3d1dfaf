use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A catalog product. The unit of sale is a "set" of `pieces_per_set`
/// physical items priced at `price_per_set`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub category: String,
    pub pieces_per_set: i32,
    pub price_per_set: Decimal,
    pub description: String,
    pub image_url: String,
    pub in_stock: bool,
    #[serde(rename = "created_at")]
    pub created_at: DateTime<Utc>,
}

/// Create/update payload. Everything is optional so that the gateway can
/// report exactly which required field is missing, and so updates only
/// touch the supplied fields.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    pub id: Option<String>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub pieces_per_set: Option<i32>,
    pub price_per_set: Option<Decimal>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub in_stock: Option<bool>,
}

/// A validated, normalized partial update. Produced by the gateway front so
/// the storage engines never re-implement field validation.
#[derive(Debug, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub pieces_per_set: Option<i32>,
    pub price_per_set: Option<Decimal>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub in_stock: Option<bool>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.pieces_per_set.is_none()
            && self.price_per_set.is_none()
            && self.description.is_none()
            && self.image_url.is_none()
            && self.in_stock.is_none()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ProductFilter {
    /// Case-insensitive substring match against name or category.
    pub search: Option<String>,
    /// Exact category match.
    pub category: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    pub data: Vec<Product>,
}
