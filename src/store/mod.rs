//! Persistence gateway: one operation set over three interchangeable
//! storage engines, selected by configuration. Required-field validation
//! and record assembly happen here, once, so the engines never diverge on
//! contract semantics; the engines own schema, queries and column naming.

mod memory;
mod postgres;
mod sqlite;

pub use memory::MemoryStore;

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{PgPool, SqlitePool, postgres::PgPoolOptions, sqlite::SqlitePoolOptions};
use uuid::Uuid;

use crate::config::{StoreBackend, StoreConfig};
use crate::error::{AppError, Result};
use crate::models::{
    NewOrder, Order, OrderFilter, OrderStatus, Product, ProductFilter, ProductPatch,
    ProductRequest, Setting,
};

/// Seeded once at first initialization, insert-if-absent. Existing values
/// are never overwritten by a re-seed.
pub const DEFAULT_SETTINGS: &[(&str, &str)] = &[
    ("business_name", "Jain Saree Center"),
    ("business_email", "info@jainsareecenter.com"),
    ("owner_email", "owner@jainsareecenter.com"),
    ("smtp_host", "smtp.gmail.com"),
    ("smtp_port", "587"),
    ("smtp_user", ""),
    ("smtp_pass", ""),
];

#[derive(Clone)]
pub enum Store {
    Memory(MemoryStore),
    Sqlite(SqlitePool),
    Postgres(PgPool),
}

impl Store {
    /// Connects the configured engine, creates the schema idempotently and
    /// seeds the default settings.
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        let store = match config.backend {
            StoreBackend::Memory => Store::Memory(MemoryStore::new()),
            StoreBackend::Sqlite => {
                let pool = SqlitePoolOptions::new()
                    .max_connections(config.max_connections)
                    .connect(&config.url)
                    .await
                    .map_err(|e| AppError::persistence("store", "connect", e))?;
                sqlite::init_schema(&pool).await?;
                Store::Sqlite(pool)
            }
            StoreBackend::Postgres => {
                let pool = PgPoolOptions::new()
                    .max_connections(config.max_connections)
                    .connect(&config.url)
                    .await
                    .map_err(|e| AppError::persistence("store", "connect", e))?;
                postgres::init_schema(&pool).await?;
                Store::Postgres(pool)
            }
        };

        store.seed_default_settings().await?;

        tracing::info!("Store ready ({} backend)", store.backend_name());
        Ok(store)
    }

    /// Insert-if-absent for every default setting; a re-seed never
    /// duplicates or overwrites an existing value.
    pub async fn seed_default_settings(&self) -> Result<()> {
        match self {
            Store::Memory(s) => {
                s.seed_default_settings();
                Ok(())
            }
            Store::Sqlite(pool) => sqlite::seed_default_settings(pool).await,
            Store::Postgres(pool) => postgres::seed_default_settings(pool).await,
        }
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            Store::Memory(_) => "memory",
            Store::Sqlite(_) => "sqlite",
            Store::Postgres(_) => "postgres",
        }
    }

    pub async fn check_health(&self) -> Result<()> {
        match self {
            Store::Memory(_) => Ok(()),
            Store::Sqlite(pool) => sqlx::query("SELECT 1")
                .fetch_one(pool)
                .await
                .map(|_| ())
                .map_err(|e| AppError::persistence("store", "health", e)),
            Store::Postgres(pool) => sqlx::query("SELECT 1")
                .fetch_one(pool)
                .await
                .map(|_| ())
                .map_err(|e| AppError::persistence("store", "health", e)),
        }
    }

    // --- products ---

    pub async fn create_product(&self, req: &ProductRequest) -> Result<Product> {
        let record = validate_new_product(req)?;
        if req.id.is_some() && self.get_product(&record.id).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Product with id {} already exists",
                record.id
            )));
        }
        match self {
            Store::Memory(s) => s.create_product(record),
            Store::Sqlite(pool) => sqlite::create_product(pool, record).await,
            Store::Postgres(pool) => postgres::create_product(pool, record).await,
        }
    }

    /// Newest-first; optional search/category filter and result-count limit.
    pub async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>> {
        match self {
            Store::Memory(s) => s.list_products(filter),
            Store::Sqlite(pool) => sqlite::list_products(pool, filter).await,
            Store::Postgres(pool) => postgres::list_products(pool, filter).await,
        }
    }

    pub async fn get_product(&self, id: &str) -> Result<Option<Product>> {
        match self {
            Store::Memory(s) => s.get_product(id),
            Store::Sqlite(pool) => sqlite::get_product(pool, id).await,
            Store::Postgres(pool) => postgres::get_product(pool, id).await,
        }
    }

    /// Applies only the supplied fields. A missing id yields zero changes,
    /// not an error; the caller decides whether that is a 404.
    pub async fn update_product(&self, id: &str, req: &ProductRequest) -> Result<u64> {
        let patch = validate_product_patch(req)?;
        match self {
            Store::Memory(s) => s.update_product(id, &patch),
            Store::Sqlite(pool) => sqlite::update_product(pool, id, &patch).await,
            Store::Postgres(pool) => postgres::update_product(pool, id, &patch).await,
        }
    }

    pub async fn delete_product(&self, id: &str) -> Result<u64> {
        match self {
            Store::Memory(s) => s.delete_product(id),
            Store::Sqlite(pool) => sqlite::delete_product(pool, id).await,
            Store::Postgres(pool) => postgres::delete_product(pool, id).await,
        }
    }

    // --- orders ---

    pub async fn create_order(&self, new: &NewOrder) -> Result<Order> {
        validate_new_order(new)?;
        let record = order_record(new);
        match self {
            Store::Memory(s) => s.create_order(record),
            Store::Sqlite(pool) => sqlite::create_order(pool, record).await,
            Store::Postgres(pool) => postgres::create_order(pool, record).await,
        }
    }

    pub async fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<Order>> {
        match self {
            Store::Memory(s) => s.list_orders(filter),
            Store::Sqlite(pool) => sqlite::list_orders(pool, filter).await,
            Store::Postgres(pool) => postgres::list_orders(pool, filter).await,
        }
    }

    pub async fn get_order(&self, id: &str) -> Result<Option<Order>> {
        match self {
            Store::Memory(s) => s.get_order(id),
            Store::Sqlite(pool) => sqlite::get_order(pool, id).await,
            Store::Postgres(pool) => postgres::get_order(pool, id).await,
        }
    }

    /// Any status may move to any other status; no ordering is enforced.
    pub async fn update_order_status(&self, id: &str, status: OrderStatus) -> Result<u64> {
        match self {
            Store::Memory(s) => s.update_order_status(id, status.as_str()),
            Store::Sqlite(pool) => sqlite::update_order_status(pool, id, status.as_str()).await,
            Store::Postgres(pool) => postgres::update_order_status(pool, id, status.as_str()).await,
        }
    }

    // --- settings ---

    pub async fn list_settings(&self) -> Result<Vec<Setting>> {
        match self {
            Store::Memory(s) => s.list_settings(),
            Store::Sqlite(pool) => sqlite::list_settings(pool).await,
            Store::Postgres(pool) => postgres::list_settings(pool).await,
        }
    }

    pub async fn get_setting(&self, key: &str) -> Result<Option<Setting>> {
        match self {
            Store::Memory(s) => s.get_setting(key),
            Store::Sqlite(pool) => sqlite::get_setting(pool, key).await,
            Store::Postgres(pool) => postgres::get_setting(pool, key).await,
        }
    }

    /// Keyed by `key`, update only — a missing key yields zero changes.
    pub async fn update_setting(&self, key: &str, value: &str) -> Result<u64> {
        match self {
            Store::Memory(s) => s.update_setting(key, value),
            Store::Sqlite(pool) => sqlite::update_setting(pool, key, value).await,
            Store::Postgres(pool) => postgres::update_setting(pool, key, value).await,
        }
    }
}

fn validate_new_product(req: &ProductRequest) -> Result<Product> {
    let name = req.name.as_deref().map(str::trim).unwrap_or_default();
    if name.is_empty() {
        return Err(AppError::Validation("name is required".to_string()));
    }

    let category = req.category.as_deref().map(str::trim).unwrap_or_default();
    if category.is_empty() {
        return Err(AppError::Validation("category is required".to_string()));
    }

    let pieces_per_set = req
        .pieces_per_set
        .ok_or_else(|| AppError::Validation("piecesPerSet is required".to_string()))?;
    if pieces_per_set < 1 {
        return Err(AppError::Validation(
            "piecesPerSet must be a positive integer".to_string(),
        ));
    }

    let price_per_set = req
        .price_per_set
        .ok_or_else(|| AppError::Validation("pricePerSet is required".to_string()))?;
    if price_per_set < Decimal::ZERO {
        return Err(AppError::Validation(
            "pricePerSet must not be negative".to_string(),
        ));
    }

    let id = match req.id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => format!("prod_{}", Uuid::new_v4().simple()),
    };

    Ok(Product {
        id,
        name: name.to_string(),
        category: category.to_string(),
        pieces_per_set,
        price_per_set: price_per_set.round_dp(2),
        description: req.description.clone().unwrap_or_default(),
        image_url: req.image_url.clone().unwrap_or_default(),
        in_stock: req.in_stock.unwrap_or(true),
        created_at: Utc::now(),
    })
}

fn validate_product_patch(req: &ProductRequest) -> Result<ProductPatch> {
    let mut patch = ProductPatch::default();

    if let Some(name) = &req.name {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("name must not be empty".to_string()));
        }
        patch.name = Some(name.to_string());
    }

    if let Some(category) = &req.category {
        let category = category.trim();
        if category.is_empty() {
            return Err(AppError::Validation("category must not be empty".to_string()));
        }
        patch.category = Some(category.to_string());
    }

    if let Some(pieces_per_set) = req.pieces_per_set {
        if pieces_per_set < 1 {
            return Err(AppError::Validation(
                "piecesPerSet must be a positive integer".to_string(),
            ));
        }
        patch.pieces_per_set = Some(pieces_per_set);
    }

    if let Some(price_per_set) = req.price_per_set {
        if price_per_set < Decimal::ZERO {
            return Err(AppError::Validation(
                "pricePerSet must not be negative".to_string(),
            ));
        }
        patch.price_per_set = Some(price_per_set.round_dp(2));
    }

    patch.description = req.description.clone();
    patch.image_url = req.image_url.clone();
    patch.in_stock = req.in_stock;

    if patch.is_empty() {
        return Err(AppError::Validation(
            "At least one field must be provided".to_string(),
        ));
    }

    Ok(patch)
}

fn validate_new_order(new: &NewOrder) -> Result<()> {
    let required = [
        ("orderId", &new.order_id),
        ("customerName", &new.customer_name),
        ("customerEmail", &new.customer_email),
        ("customerPhone", &new.customer_phone),
        ("customerAddress", &new.customer_address),
        ("customerCity", &new.customer_city),
        ("customerState", &new.customer_state),
        ("customerPincode", &new.customer_pincode),
        ("orderItems", &new.order_items),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(AppError::Validation(format!("{} is required", field)));
        }
    }
    Ok(())
}

fn order_record(new: &NewOrder) -> Order {
    Order {
        id: Uuid::new_v4().simple().to_string(),
        order_id: new.order_id.clone(),
        customer_name: new.customer_name.clone(),
        customer_email: new.customer_email.clone(),
        customer_phone: new.customer_phone.clone(),
        customer_address: new.customer_address.clone(),
        customer_city: new.customer_city.clone(),
        customer_state: new.customer_state.clone(),
        customer_pincode: new.customer_pincode.clone(),
        customer_message: new.customer_message.clone(),
        order_items: new.order_items.clone(),
        total_sets: new.total_sets,
        total_amount: new.total_amount.round_dp(2),
        order_status: new.order_status.to_string(),
        order_date: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::dec;

    fn memory_store() -> Store {
        let store = MemoryStore::new();
        store.seed_default_settings();
        Store::Memory(store)
    }

    fn product_request(name: Option<&str>, category: Option<&str>) -> ProductRequest {
        ProductRequest {
            id: None,
            name: name.map(str::to_string),
            category: category.map(str::to_string),
            pieces_per_set: Some(6),
            price_per_set: Some(dec!(4500)),
            description: None,
            image_url: None,
            in_stock: None,
        }
    }

    fn new_order(order_id: &str) -> NewOrder {
        NewOrder {
            order_id: order_id.to_string(),
            customer_name: "Asha Jain".to_string(),
            customer_email: "asha@example.com".to_string(),
            customer_phone: "9876543210".to_string(),
            customer_address: "14 MG Road".to_string(),
            customer_city: "Indore".to_string(),
            customer_state: "Madhya Pradesh".to_string(),
            customer_pincode: "452001".to_string(),
            customer_message: String::new(),
            order_items: r#"[{"id":"prod_1","name":"Silk","category":"Silk","piecesPerSet":6,"pricePerSet":"4500","quantity":2}]"#.to_string(),
            total_sets: 2,
            total_amount: dec!(9000),
            order_status: OrderStatus::Pending,
        }
    }

    #[tokio::test]
    async fn create_product_missing_category_fails_and_persists_nothing() {
        let store = memory_store();
        let before = store.list_products(&ProductFilter::default()).await.unwrap().len();

        let err = store
            .create_product(&product_request(Some("Banarasi"), None))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let after = store.list_products(&ProductFilter::default()).await.unwrap().len();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn create_product_defaults_and_generated_id() {
        let store = memory_store();
        let product = store
            .create_product(&product_request(Some("Banarasi"), Some("Silk")))
            .await
            .unwrap();

        assert!(product.id.starts_with("prod_"));
        assert!(product.in_stock);
        assert_eq!(product.description, "");
        assert_eq!(product.price_per_set, dec!(4500));
    }

    #[tokio::test]
    async fn create_product_duplicate_id_conflicts() {
        let store = memory_store();
        let mut req = product_request(Some("Banarasi"), Some("Silk"));
        req.id = Some("prod_fixed".to_string());

        store.create_product(&req).await.unwrap();
        let err = store.create_product(&req).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn update_nonexistent_product_returns_zero_changes() {
        let store = memory_store();
        let req = ProductRequest {
            name: Some("Renamed".to_string()),
            ..ProductRequest::default()
        };
        let changes = store.update_product("prod_missing", &req).await.unwrap();
        assert_eq!(changes, 0);
    }

    #[tokio::test]
    async fn update_applies_only_supplied_fields() {
        let store = memory_store();
        let created = store
            .create_product(&product_request(Some("Banarasi"), Some("Silk")))
            .await
            .unwrap();

        let req = ProductRequest {
            price_per_set: Some(dec!(4999.999)),
            ..ProductRequest::default()
        };
        let changes = store.update_product(&created.id, &req).await.unwrap();
        assert_eq!(changes, 1);

        let updated = store.get_product(&created.id).await.unwrap().unwrap();
        assert_eq!(updated.name, "Banarasi");
        assert_eq!(updated.price_per_set, dec!(5000.00));
    }

    #[tokio::test]
    async fn empty_update_is_a_validation_error() {
        let store = memory_store();
        let err = store
            .update_product("prod_x", &ProductRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn duplicate_order_id_conflicts() {
        let store = memory_store();
        store.create_order(&new_order("JSC17000000000001")).await.unwrap();
        let err = store
            .create_order(&new_order("JSC17000000000001"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn order_missing_customer_field_is_rejected() {
        let store = memory_store();
        let mut order = new_order("JSC17000000000002");
        order.customer_pincode = String::new();

        let err = store.create_order(&order).await.unwrap_err();
        match err {
            AppError::Validation(msg) => assert!(msg.contains("customerPincode")),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn status_may_move_from_completed_back_to_pending() {
        let store = memory_store();
        let order = store.create_order(&new_order("JSC17000000000003")).await.unwrap();

        store
            .update_order_status(&order.id, OrderStatus::Completed)
            .await
            .unwrap();
        let changes = store
            .update_order_status(&order.id, OrderStatus::Pending)
            .await
            .unwrap();
        assert_eq!(changes, 1);

        let reread = store.get_order(&order.id).await.unwrap().unwrap();
        assert_eq!(reread.order_status, "pending");
    }

    #[tokio::test]
    async fn update_status_of_missing_order_returns_zero_changes() {
        let store = memory_store();
        let changes = store
            .update_order_status("missing", OrderStatus::Cancelled)
            .await
            .unwrap();
        assert_eq!(changes, 0);
    }

    #[tokio::test]
    async fn setting_seed_is_idempotent() {
        let memory = MemoryStore::new();
        memory.seed_default_settings();
        let store = Store::Memory(memory.clone());

        store.update_setting("business_name", "Custom Name").await.unwrap();
        memory.seed_default_settings();

        let setting = store.get_setting("business_name").await.unwrap().unwrap();
        assert_eq!(setting.value, "Custom Name");
        assert_eq!(store.list_settings().await.unwrap().len(), DEFAULT_SETTINGS.len());
    }

    #[tokio::test]
    async fn setting_update_never_inserts() {
        let store = memory_store();
        let changes = store.update_setting("no_such_key", "x").await.unwrap();
        assert_eq!(changes, 0);
        assert!(store.get_setting("no_such_key").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn orders_list_newest_first_with_status_filter() {
        let store = memory_store();
        let first = store.create_order(&new_order("JSC1")).await.unwrap();
        let second = store.create_order(&new_order("JSC2")).await.unwrap();

        store
            .update_order_status(&first.id, OrderStatus::Processing)
            .await
            .unwrap();

        let all = store.list_orders(&OrderFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all[0].order_date >= all[1].order_date);
        assert_eq!(all[0].id, second.id);

        let processing = store
            .list_orders(&OrderFilter {
                status: Some(OrderStatus::Processing),
                limit: None,
            })
            .await
            .unwrap();
        assert_eq!(processing.len(), 1);
        assert_eq!(processing[0].id, first.id);
    }
}
