mod app_config;

pub use app_config::{
    AdminConfig, AppConfig, CheckoutConfig, CorsConfig, PricePolicy, ServerConfig, StoreBackend,
    StoreConfig,
};
