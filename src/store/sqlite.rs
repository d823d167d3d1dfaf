//! Embedded relational engine. Sqlite has no decimal column type, so
//! monetary amounts are stored as TEXT and rows are mapped by hand; the
//! wire contract is unaffected.

use std::str::FromStr;

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool, sqlite::SqliteRow};

use crate::error::{AppError, Result};
use crate::models::{Order, OrderFilter, Product, ProductFilter, ProductPatch, Setting};

use super::DEFAULT_SETTINGS;

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS products (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        category TEXT NOT NULL,
        pieces_per_set INTEGER NOT NULL,
        price_per_set TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        image_url TEXT NOT NULL DEFAULT '',
        in_stock INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS orders (
        id TEXT PRIMARY KEY,
        order_id TEXT UNIQUE NOT NULL,
        customer_name TEXT NOT NULL,
        customer_email TEXT NOT NULL,
        customer_phone TEXT NOT NULL,
        customer_address TEXT NOT NULL,
        customer_city TEXT NOT NULL,
        customer_state TEXT NOT NULL,
        customer_pincode TEXT NOT NULL,
        customer_message TEXT NOT NULL DEFAULT '',
        order_items TEXT NOT NULL,
        total_sets INTEGER NOT NULL,
        total_amount TEXT NOT NULL,
        order_status TEXT NOT NULL DEFAULT 'pending',
        order_date TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS settings (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
];

pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| AppError::persistence("store", "init", e))?;
    }
    Ok(())
}

pub async fn seed_default_settings(pool: &SqlitePool) -> Result<()> {
    let now = Utc::now();
    for (key, value) in DEFAULT_SETTINGS {
        sqlx::query(
            "INSERT OR IGNORE INTO settings (key, value, created_at, updated_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(key)
        .bind(value)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await
        .map_err(|e| AppError::persistence("setting", "seed", e))?;
    }
    Ok(())
}

fn decimal_column(row: &SqliteRow, column: &str) -> std::result::Result<Decimal, sqlx::Error> {
    let text: String = row.try_get(column)?;
    Decimal::from_str(&text).map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

fn product_from_row(row: &SqliteRow) -> std::result::Result<Product, sqlx::Error> {
    Ok(Product {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        category: row.try_get("category")?,
        pieces_per_set: row.try_get("pieces_per_set")?,
        price_per_set: decimal_column(row, "price_per_set")?,
        description: row.try_get("description")?,
        image_url: row.try_get("image_url")?,
        in_stock: row.try_get("in_stock")?,
        created_at: row.try_get("created_at")?,
    })
}

fn order_from_row(row: &SqliteRow) -> std::result::Result<Order, sqlx::Error> {
    Ok(Order {
        id: row.try_get("id")?,
        order_id: row.try_get("order_id")?,
        customer_name: row.try_get("customer_name")?,
        customer_email: row.try_get("customer_email")?,
        customer_phone: row.try_get("customer_phone")?,
        customer_address: row.try_get("customer_address")?,
        customer_city: row.try_get("customer_city")?,
        customer_state: row.try_get("customer_state")?,
        customer_pincode: row.try_get("customer_pincode")?,
        customer_message: row.try_get("customer_message")?,
        order_items: row.try_get("order_items")?,
        total_sets: row.try_get("total_sets")?,
        total_amount: decimal_column(row, "total_amount")?,
        order_status: row.try_get("order_status")?,
        order_date: row.try_get("order_date")?,
    })
}

pub async fn create_product(pool: &SqlitePool, product: Product) -> Result<Product> {
    sqlx::query(
        "INSERT INTO products (id, name, category, pieces_per_set, price_per_set,
                               description, image_url, in_stock, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&product.id)
    .bind(&product.name)
    .bind(&product.category)
    .bind(product.pieces_per_set)
    .bind(product.price_per_set.to_string())
    .bind(&product.description)
    .bind(&product.image_url)
    .bind(product.in_stock)
    .bind(product.created_at)
    .execute(pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(db) if db.is_unique_violation() => AppError::Conflict(format!(
            "Product with id {} already exists",
            product.id
        )),
        e => AppError::persistence("product", "create", e),
    })?;

    Ok(product)
}

pub async fn list_products(pool: &SqlitePool, filter: &ProductFilter) -> Result<Vec<Product>> {
    let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(
        "SELECT id, name, category, pieces_per_set, price_per_set, description,
                image_url, in_stock, created_at
         FROM products WHERE 1=1",
    );

    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", search.to_lowercase());
        query.push(" AND (LOWER(name) LIKE ");
        query.push_bind(pattern.clone());
        query.push(" OR LOWER(category) LIKE ");
        query.push_bind(pattern);
        query.push(")");
    }

    if let Some(category) = &filter.category {
        query.push(" AND category = ");
        query.push_bind(category);
    }

    query.push(" ORDER BY created_at DESC");

    if let Some(limit) = filter.limit {
        query.push(" LIMIT ");
        query.push_bind(limit);
    }

    let rows = query
        .build()
        .fetch_all(pool)
        .await
        .map_err(|e| AppError::persistence("product", "getAll", e))?;

    rows.iter()
        .map(product_from_row)
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| AppError::persistence("product", "getAll", e))
}

pub async fn get_product(pool: &SqlitePool, id: &str) -> Result<Option<Product>> {
    let row = sqlx::query("SELECT * FROM products WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| AppError::persistence("product", "getById", e))?;

    row.as_ref()
        .map(product_from_row)
        .transpose()
        .map_err(|e| AppError::persistence("product", "getById", e))
}

pub async fn update_product(pool: &SqlitePool, id: &str, patch: &ProductPatch) -> Result<u64> {
    let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE products SET ");
    {
        let mut fields = query.separated(", ");
        if let Some(name) = &patch.name {
            fields.push("name = ");
            fields.push_bind_unseparated(name);
        }
        if let Some(category) = &patch.category {
            fields.push("category = ");
            fields.push_bind_unseparated(category);
        }
        if let Some(pieces_per_set) = patch.pieces_per_set {
            fields.push("pieces_per_set = ");
            fields.push_bind_unseparated(pieces_per_set);
        }
        if let Some(price_per_set) = patch.price_per_set {
            fields.push("price_per_set = ");
            fields.push_bind_unseparated(price_per_set.to_string());
        }
        if let Some(description) = &patch.description {
            fields.push("description = ");
            fields.push_bind_unseparated(description);
        }
        if let Some(image_url) = &patch.image_url {
            fields.push("image_url = ");
            fields.push_bind_unseparated(image_url);
        }
        if let Some(in_stock) = patch.in_stock {
            fields.push("in_stock = ");
            fields.push_bind_unseparated(in_stock);
        }
    }
    query.push(" WHERE id = ");
    query.push_bind(id);

    let result = query
        .build()
        .execute(pool)
        .await
        .map_err(|e| AppError::persistence("product", "update", e))?;

    Ok(result.rows_affected())
}

pub async fn delete_product(pool: &SqlitePool, id: &str) -> Result<u64> {
    let result = sqlx::query("DELETE FROM products WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| AppError::persistence("product", "delete", e))?;

    Ok(result.rows_affected())
}

pub async fn create_order(pool: &SqlitePool, order: Order) -> Result<Order> {
    sqlx::query(
        "INSERT INTO orders (id, order_id, customer_name, customer_email, customer_phone,
                             customer_address, customer_city, customer_state, customer_pincode,
                             customer_message, order_items, total_sets, total_amount,
                             order_status, order_date)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&order.id)
    .bind(&order.order_id)
    .bind(&order.customer_name)
    .bind(&order.customer_email)
    .bind(&order.customer_phone)
    .bind(&order.customer_address)
    .bind(&order.customer_city)
    .bind(&order.customer_state)
    .bind(&order.customer_pincode)
    .bind(&order.customer_message)
    .bind(&order.order_items)
    .bind(order.total_sets)
    .bind(order.total_amount.to_string())
    .bind(&order.order_status)
    .bind(order.order_date)
    .execute(pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::Conflict(format!("Order {} already exists", order.order_id))
        }
        e => AppError::persistence("order", "create", e),
    })?;

    Ok(order)
}

pub async fn list_orders(pool: &SqlitePool, filter: &OrderFilter) -> Result<Vec<Order>> {
    let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM orders WHERE 1=1");

    if let Some(status) = filter.status {
        query.push(" AND order_status = ");
        query.push_bind(status.as_str());
    }

    query.push(" ORDER BY order_date DESC");

    if let Some(limit) = filter.limit {
        query.push(" LIMIT ");
        query.push_bind(limit);
    }

    let rows = query
        .build()
        .fetch_all(pool)
        .await
        .map_err(|e| AppError::persistence("order", "getAll", e))?;

    rows.iter()
        .map(order_from_row)
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| AppError::persistence("order", "getAll", e))
}

pub async fn get_order(pool: &SqlitePool, id: &str) -> Result<Option<Order>> {
    let row = sqlx::query("SELECT * FROM orders WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| AppError::persistence("order", "getById", e))?;

    row.as_ref()
        .map(order_from_row)
        .transpose()
        .map_err(|e| AppError::persistence("order", "getById", e))
}

pub async fn update_order_status(pool: &SqlitePool, id: &str, status: &str) -> Result<u64> {
    let result = sqlx::query("UPDATE orders SET order_status = ? WHERE id = ?")
        .bind(status)
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| AppError::persistence("order", "updateStatus", e))?;

    Ok(result.rows_affected())
}

pub async fn list_settings(pool: &SqlitePool) -> Result<Vec<Setting>> {
    sqlx::query_as::<_, Setting>(
        "SELECT key, value, created_at, updated_at FROM settings ORDER BY key",
    )
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::persistence("setting", "getAll", e))
}

pub async fn get_setting(pool: &SqlitePool, key: &str) -> Result<Option<Setting>> {
    sqlx::query_as::<_, Setting>(
        "SELECT key, value, created_at, updated_at FROM settings WHERE key = ?",
    )
    .bind(key)
    .fetch_optional(pool)
    .await
    .map_err(|e| AppError::persistence("setting", "getByKey", e))
}

pub async fn update_setting(pool: &SqlitePool, key: &str, value: &str) -> Result<u64> {
    let result = sqlx::query("UPDATE settings SET value = ?, updated_at = ? WHERE key = ?")
        .bind(value)
        .bind(Utc::now())
        .bind(key)
        .execute(pool)
        .await
        .map_err(|e| AppError::persistence("setting", "update", e))?;

    Ok(result.rows_affected())
}
