//! Hosted relational engine.

use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::error::{AppError, Result};
use crate::models::{Order, OrderFilter, Product, ProductFilter, ProductPatch, Setting};

use super::DEFAULT_SETTINGS;

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS products (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        category TEXT NOT NULL,
        pieces_per_set INTEGER NOT NULL,
        price_per_set NUMERIC(12,2) NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        image_url TEXT NOT NULL DEFAULT '',
        in_stock BOOLEAN NOT NULL DEFAULT TRUE,
        created_at TIMESTAMPTZ NOT NULL
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
        total_amount NUMERIC(12,2) NOT NULL,
        order_status TEXT NOT NULL DEFAULT 'pending',
        order_date TIMESTAMPTZ NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS settings (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )",
];

pub async fn init_schema(pool: &PgPool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| AppError::persistence("store", "init", e))?;
    }
    Ok(())
}

pub async fn seed_default_settings(pool: &PgPool) -> Result<()> {
    let now = Utc::now();
    for (key, value) in DEFAULT_SETTINGS {
        sqlx::query(
            "INSERT INTO settings (key, value, created_at, updated_at)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (key) DO NOTHING",
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

pub async fn create_product(pool: &PgPool, product: Product) -> Result<Product> {
    sqlx::query_as::<_, Product>(
        "INSERT INTO products (id, name, category, pieces_per_set, price_per_set,
                               description, image_url, in_stock, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
         RETURNING *",
    )
    .bind(&product.id)
    .bind(&product.name)
    .bind(&product.category)
    .bind(product.pieces_per_set)
    .bind(product.price_per_set)
    .bind(&product.description)
    .bind(&product.image_url)
    .bind(product.in_stock)
    .bind(product.created_at)
    .fetch_one(pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(db) if db.is_unique_violation() => AppError::Conflict(format!(
            "Product with id {} already exists",
            product.id
        )),
        e => AppError::persistence("product", "create", e),
    })
}

pub async fn list_products(pool: &PgPool, filter: &ProductFilter) -> Result<Vec<Product>> {
    let mut query: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM products WHERE 1=1");

    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", search);
        query.push(" AND (name ILIKE ");
        query.push_bind(pattern.clone());
        query.push(" OR category ILIKE ");
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

    query
        .build_query_as::<Product>()
        .fetch_all(pool)
        .await
        .map_err(|e| AppError::persistence("product", "getAll", e))
}

pub async fn get_product(pool: &PgPool, id: &str) -> Result<Option<Product>> {
    sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| AppError::persistence("product", "getById", e))
}

pub async fn update_product(pool: &PgPool, id: &str, patch: &ProductPatch) -> Result<u64> {
    let mut query: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE products SET ");
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
            fields.push_bind_unseparated(price_per_set);
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

pub async fn delete_product(pool: &PgPool, id: &str) -> Result<u64> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| AppError::persistence("product", "delete", e))?;

    Ok(result.rows_affected())
}

pub async fn create_order(pool: &PgPool, order: Order) -> Result<Order> {
    sqlx::query_as::<_, Order>(
        "INSERT INTO orders (id, order_id, customer_name, customer_email, customer_phone,
                             customer_address, customer_city, customer_state, customer_pincode,
                             customer_message, order_items, total_sets, total_amount,
                             order_status, order_date)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
         RETURNING *",
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
    .bind(order.total_amount)
    .bind(&order.order_status)
    .bind(order.order_date)
    .fetch_one(pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::Conflict(format!("Order {} already exists", order.order_id))
        }
        e => AppError::persistence("order", "create", e),
    })
}

pub async fn list_orders(pool: &PgPool, filter: &OrderFilter) -> Result<Vec<Order>> {
    let mut query: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM orders WHERE 1=1");

    if let Some(status) = filter.status {
        query.push(" AND order_status = ");
        query.push_bind(status.as_str());
    }

    query.push(" ORDER BY order_date DESC");

    if let Some(limit) = filter.limit {
        query.push(" LIMIT ");
        query.push_bind(limit);
    }

    query
        .build_query_as::<Order>()
        .fetch_all(pool)
        .await
        .map_err(|e| AppError::persistence("order", "getAll", e))
}

pub async fn get_order(pool: &PgPool, id: &str) -> Result<Option<Order>> {
    sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| AppError::persistence("order", "getById", e))
}

pub async fn update_order_status(pool: &PgPool, id: &str, status: &str) -> Result<u64> {
    let result = sqlx::query("UPDATE orders SET order_status = $1 WHERE id = $2")
        .bind(status)
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| AppError::persistence("order", "updateStatus", e))?;

    Ok(result.rows_affected())
}

pub async fn list_settings(pool: &PgPool) -> Result<Vec<Setting>> {
    sqlx::query_as::<_, Setting>("SELECT * FROM settings ORDER BY key")
        .fetch_all(pool)
        .await
        .map_err(|e| AppError::persistence("setting", "getAll", e))
}

pub async fn get_setting(pool: &PgPool, key: &str) -> Result<Option<Setting>> {
    sqlx::query_as::<_, Setting>("SELECT * FROM settings WHERE key = $1")
        .bind(key)
        .fetch_optional(pool)
        .await
        .map_err(|e| AppError::persistence("setting", "getByKey", e))
}

pub async fn update_setting(pool: &PgPool, key: &str, value: &str) -> Result<u64> {
    let result = sqlx::query("UPDATE settings SET value = $1, updated_at = $2 WHERE key = $3")
        .bind(value)
        .bind(Utc::now())
        .bind(key)
        .execute(pool)
        .await
        .map_err(|e| AppError::persistence("setting", "update", e))?;

    Ok(result.rows_affected())
}
