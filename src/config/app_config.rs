use crate::error::{AppError, Result};
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub cors: CorsConfig,
    pub admin: AdminConfig,
    pub checkout: CheckoutConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_body_size: usize,
}

/// Which persistence engine backs the gateway. All three expose the same
/// operation set; the choice is purely deployment configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Sqlite,
    Postgres,
}

impl FromStr for StoreBackend {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "memory" => Ok(StoreBackend::Memory),
            "sqlite" => Ok(StoreBackend::Sqlite),
            "postgres" => Ok(StoreBackend::Postgres),
            other => Err(AppError::Config(format!(
                "Unknown STORE_BACKEND '{}' (expected memory, sqlite or postgres)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct AdminConfig {
    pub username: String,
    pub password: String,
}

/// How checkout treats prices that were snapshotted into the cart at
/// add-to-cart time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PricePolicy {
    /// Trust the snapshot. Prices may be stale against the live catalog.
    Snapshot,
    /// Re-read each product at submit time; reject lines whose product is
    /// gone or out of stock, and re-price from the catalog.
    Revalidate,
}

impl FromStr for PricePolicy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "snapshot" => Ok(PricePolicy::Snapshot),
            "revalidate" => Ok(PricePolicy::Revalidate),
            other => Err(AppError::Config(format!(
                "Unknown CART_PRICE_POLICY '{}' (expected snapshot or revalidate)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    pub price_policy: PricePolicy,
}

const DEFAULT_SQLITE_URL: &str = "sqlite://jain_saree_center.db?mode=rwc";

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let backend: StoreBackend = env::var("STORE_BACKEND")
            .unwrap_or_else(|_| "sqlite".to_string())
            .parse()?;

        let url = match backend {
            StoreBackend::Memory => String::new(),
            StoreBackend::Sqlite => {
                env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_SQLITE_URL.to_string())
            }
            StoreBackend::Postgres => env::var("DATABASE_URL").map_err(|_| {
                AppError::Config("DATABASE_URL is required for the postgres backend".to_string())
            })?,
        };

        Ok(Self {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("PORT")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()
                    .map_err(|_| AppError::Config("Invalid PORT value".to_string()))?,
                max_body_size: env::var("MAX_BODY_SIZE")
                    .unwrap_or_else(|_| "10485760".to_string())
                    .parse()
                    .map_err(|_| AppError::Config("Invalid MAX_BODY_SIZE value".to_string()))?,
            },
            store: StoreConfig {
                backend,
                url,
                max_connections: env::var("DB_MAX_CONNECTIONS")
                    .unwrap_or_else(|_| "20".to_string())
                    .parse()
                    .map_err(|_| {
                        AppError::Config("Invalid DB_MAX_CONNECTIONS value".to_string())
                    })?,
            },
            cors: CorsConfig {
                allowed_origins: env::var("FRONTEND_URL")
                    .unwrap_or_else(|_| "http://localhost:3000".to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .collect(),
            },
            admin: AdminConfig {
                username: env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string()),
                password: env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".to_string()),
            },
            checkout: CheckoutConfig {
                price_policy: env::var("CART_PRICE_POLICY")
                    .unwrap_or_else(|_| "snapshot".to_string())
                    .parse()?,
            },
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
