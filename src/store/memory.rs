use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;

use crate::error::{AppError, Result};
use crate::models::{Order, OrderFilter, Product, ProductFilter, ProductPatch, Setting};

use super::DEFAULT_SETTINGS;

/// In-process key-value engine. Fills the same role the browser's durable
/// key-value storage did for the storefront, and doubles as the fast test
/// double for the gateway contract.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Tables>>,
}

#[derive(Default)]
struct Tables {
    products: HashMap<String, Product>,
    orders: HashMap<String, Order>,
    settings: BTreeMap<String, Setting>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.inner.read().expect("memory store lock poisoned")
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.inner.write().expect("memory store lock poisoned")
    }

    pub fn seed_default_settings(&self) {
        let mut tables = self.write();
        let now = Utc::now();
        for (key, value) in DEFAULT_SETTINGS {
            tables.settings.entry(key.to_string()).or_insert_with(|| Setting {
                key: key.to_string(),
                value: value.to_string(),
                created_at: now,
                updated_at: now,
            });
        }
    }

    pub fn create_product(&self, product: Product) -> Result<Product> {
        let mut tables = self.write();
        if tables.products.contains_key(&product.id) {
            return Err(AppError::Conflict(format!(
                "Product with id {} already exists",
                product.id
            )));
        }
        tables.products.insert(product.id.clone(), product.clone());
        Ok(product)
    }

    pub fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>> {
        let tables = self.read();
        let search = filter.search.as_deref().map(str::to_lowercase);
        let mut products: Vec<Product> = tables
            .products
            .values()
            .filter(|p| match &search {
                Some(q) => {
                    p.name.to_lowercase().contains(q) || p.category.to_lowercase().contains(q)
                }
                None => true,
            })
            .filter(|p| filter.category.as_deref().is_none_or(|c| p.category == c))
            .cloned()
            .collect();

        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(limit) = filter.limit {
            products.truncate(limit.max(0) as usize);
        }
        Ok(products)
    }

    pub fn get_product(&self, id: &str) -> Result<Option<Product>> {
        Ok(self.read().products.get(id).cloned())
    }

    pub fn update_product(&self, id: &str, patch: &ProductPatch) -> Result<u64> {
        let mut tables = self.write();
        let Some(product) = tables.products.get_mut(id) else {
            return Ok(0);
        };
        if let Some(name) = &patch.name {
            product.name = name.clone();
        }
        if let Some(category) = &patch.category {
            product.category = category.clone();
        }
        if let Some(pieces_per_set) = patch.pieces_per_set {
            product.pieces_per_set = pieces_per_set;
        }
        if let Some(price_per_set) = patch.price_per_set {
            product.price_per_set = price_per_set;
        }
        if let Some(description) = &patch.description {
            product.description = description.clone();
        }
        if let Some(image_url) = &patch.image_url {
            product.image_url = image_url.clone();
        }
        if let Some(in_stock) = patch.in_stock {
            product.in_stock = in_stock;
        }
        Ok(1)
    }

    pub fn delete_product(&self, id: &str) -> Result<u64> {
        Ok(if self.write().products.remove(id).is_some() {
            1
        } else {
            0
        })
    }

    pub fn create_order(&self, order: Order) -> Result<Order> {
        let mut tables = self.write();
        if tables.orders.values().any(|o| o.order_id == order.order_id) {
            return Err(AppError::Conflict(format!(
                "Order {} already exists",
                order.order_id
            )));
        }
        tables.orders.insert(order.id.clone(), order.clone());
        Ok(order)
    }

    pub fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<Order>> {
        let tables = self.read();
        let mut orders: Vec<Order> = tables
            .orders
            .values()
            .filter(|o| filter.status.is_none_or(|s| o.order_status == s.as_str()))
            .cloned()
            .collect();

        orders.sort_by(|a, b| b.order_date.cmp(&a.order_date));
        if let Some(limit) = filter.limit {
            orders.truncate(limit.max(0) as usize);
        }
        Ok(orders)
    }

    pub fn get_order(&self, id: &str) -> Result<Option<Order>> {
        Ok(self.read().orders.get(id).cloned())
    }

    pub fn update_order_status(&self, id: &str, status: &str) -> Result<u64> {
        let mut tables = self.write();
        match tables.orders.get_mut(id) {
            Some(order) => {
                order.order_status = status.to_string();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    pub fn list_settings(&self) -> Result<Vec<Setting>> {
        Ok(self.read().settings.values().cloned().collect())
    }

    pub fn get_setting(&self, key: &str) -> Result<Option<Setting>> {
        Ok(self.read().settings.get(key).cloned())
    }

    pub fn update_setting(&self, key: &str, value: &str) -> Result<u64> {
        let mut tables = self.write();
        match tables.settings.get_mut(key) {
            Some(setting) => {
                setting.value = value.to_string();
                setting.updated_at = Utc::now();
                Ok(1)
            }
            None => Ok(0),
        }
    }
}
