//! End-to-end storefront flow against the interchangeable backends:
//! catalog CRUD, cart assembly, checkout, order lifecycle and settings.

use jsc_back::cart::Cart;
use jsc_back::checkout::Checkout;
use jsc_back::config::{PricePolicy, StoreBackend, StoreConfig};
use jsc_back::error::AppError;
use jsc_back::models::{
    CustomerDetails, NewOrder, OrderFilter, OrderStatus, ProductFilter, ProductRequest,
};
use jsc_back::store::Store;
use rust_decimal::dec;

fn memory_config() -> StoreConfig {
    StoreConfig {
        backend: StoreBackend::Memory,
        url: String::new(),
        max_connections: 1,
    }
}

fn sqlite_config() -> StoreConfig {
    StoreConfig {
        backend: StoreBackend::Sqlite,
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
    }
}

fn product_request(id: &str, name: &str, category: &str) -> ProductRequest {
    ProductRequest {
        id: Some(id.to_string()),
        name: Some(name.to_string()),
        category: Some(category.to_string()),
        pieces_per_set: Some(6),
        price_per_set: Some(dec!(4500)),
        description: Some("Handwoven".to_string()),
        image_url: None,
        in_stock: None,
    }
}

fn customer() -> CustomerDetails {
    CustomerDetails {
        customer_name: "Asha Jain".to_string(),
        customer_email: "asha@example.com".to_string(),
        customer_phone: "9876543210".to_string(),
        customer_address: "14 MG Road".to_string(),
        customer_city: "Indore".to_string(),
        customer_state: "Madhya Pradesh".to_string(),
        customer_pincode: "452001".to_string(),
        customer_message: "Deliver after 6pm".to_string(),
    }
}

async fn run_full_flow(store: Store) {
    let banarasi = store
        .create_product(&product_request("prod_banarasi", "Banarasi Silk", "Silk"))
        .await
        .unwrap();
    store
        .create_product(&product_request("prod_cotton", "Summer Cotton", "Cotton"))
        .await
        .unwrap();

    // Shopper browses and builds a cart from catalog snapshots.
    let mut cart = Cart::new();
    cart.add_line(&banarasi, 1);
    cart.add_line(&banarasi, 1);
    assert_eq!(cart.total_sets(), 2);
    assert_eq!(cart.total_amount(), dec!(9000));

    let mut checkout = Checkout::new(cart, customer(), PricePolicy::Snapshot);
    let order = checkout.submit(&store).await.unwrap();

    assert!(order.order_id.starts_with("JSC"));
    assert_eq!(order.total_sets, 2);
    assert_eq!(order.total_amount, dec!(9000));
    assert!(checkout.cart().is_empty());

    // The order is visible to the admin, newest first.
    let orders = store.list_orders(&OrderFilter::default()).await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].order_id, order.order_id);
    assert_eq!(orders[0].order_status, "pending");

    // The embedded snapshot survives persistence byte-for-byte.
    let items = orders[0].items().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, "prod_banarasi");
    assert_eq!(items[0].quantity, 2);
    assert_eq!(items[0].price_per_set, dec!(4500));

    // Deleting the product never corrupts the historical order.
    assert_eq!(store.delete_product("prod_banarasi").await.unwrap(), 1);
    let reread = store.get_order(&order.id).await.unwrap().unwrap();
    assert_eq!(reread.items().unwrap()[0].name, "Banarasi Silk");

    // Status moves freely, including backwards.
    store
        .update_order_status(&order.id, OrderStatus::Completed)
        .await
        .unwrap();
    store
        .update_order_status(&order.id, OrderStatus::Pending)
        .await
        .unwrap();
    let reread = store.get_order(&order.id).await.unwrap().unwrap();
    assert_eq!(reread.order_status, "pending");
}

#[tokio::test]
async fn full_checkout_flow_on_the_memory_backend() {
    let store = Store::connect(&memory_config()).await.unwrap();
    run_full_flow(store).await;
}

#[tokio::test]
async fn full_checkout_flow_on_the_sqlite_backend() {
    let store = Store::connect(&sqlite_config()).await.unwrap();
    run_full_flow(store).await;
}

#[tokio::test]
async fn sqlite_backend_round_trips_decimals_and_timestamps() {
    let store = Store::connect(&sqlite_config()).await.unwrap();

    let mut req = product_request("prod_1", "Banarasi", "Silk");
    req.price_per_set = Some(dec!(1234.56));
    let created = store.create_product(&req).await.unwrap();

    let reread = store.get_product("prod_1").await.unwrap().unwrap();
    assert_eq!(reread.price_per_set, dec!(1234.56));
    assert_eq!(
        reread.created_at.timestamp_millis(),
        created.created_at.timestamp_millis()
    );
}

#[tokio::test]
async fn sqlite_backend_supports_filters_and_partial_updates() {
    let store = Store::connect(&sqlite_config()).await.unwrap();

    store
        .create_product(&product_request("prod_1", "Banarasi Silk", "Silk"))
        .await
        .unwrap();
    store
        .create_product(&product_request("prod_2", "Summer Cotton", "Cotton"))
        .await
        .unwrap();
    store
        .create_product(&product_request("prod_3", "Festive Silk", "Silk"))
        .await
        .unwrap();

    let silk = store
        .list_products(&ProductFilter {
            search: None,
            category: Some("Silk".to_string()),
            limit: None,
        })
        .await
        .unwrap();
    assert_eq!(silk.len(), 2);

    let matched = store
        .list_products(&ProductFilter {
            search: Some("cotton".to_string()),
            category: None,
            limit: None,
        })
        .await
        .unwrap();
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].id, "prod_2");

    let limited = store
        .list_products(&ProductFilter {
            search: None,
            category: None,
            limit: Some(2),
        })
        .await
        .unwrap();
    assert_eq!(limited.len(), 2);

    // Partial update touches only the supplied fields.
    let patch = ProductRequest {
        in_stock: Some(false),
        ..ProductRequest::default()
    };
    assert_eq!(store.update_product("prod_1", &patch).await.unwrap(), 1);
    let updated = store.get_product("prod_1").await.unwrap().unwrap();
    assert!(!updated.in_stock);
    assert_eq!(updated.name, "Banarasi Silk");
    assert_eq!(updated.price_per_set, dec!(4500));

    // A missing id is zero changes, not an error.
    assert_eq!(store.update_product("prod_none", &patch).await.unwrap(), 0);
}

#[tokio::test]
async fn sqlite_backend_rejects_duplicate_order_ids() {
    let store = Store::connect(&sqlite_config()).await.unwrap();

    let order = NewOrder {
        order_id: "JSC17000000000009".to_string(),
        customer_name: "Asha Jain".to_string(),
        customer_email: "asha@example.com".to_string(),
        customer_phone: "9876543210".to_string(),
        customer_address: "14 MG Road".to_string(),
        customer_city: "Indore".to_string(),
        customer_state: "Madhya Pradesh".to_string(),
        customer_pincode: "452001".to_string(),
        customer_message: String::new(),
        order_items: "[]".to_string(),
        total_sets: 0,
        total_amount: dec!(0),
        order_status: OrderStatus::Pending,
    };

    store.create_order(&order).await.unwrap();
    let err = store.create_order(&order).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn sqlite_setting_seed_is_idempotent() {
    let store = Store::connect(&sqlite_config()).await.unwrap();

    let seeded = store.list_settings().await.unwrap();
    assert_eq!(seeded.len(), 7);
    assert_eq!(
        store
            .get_setting("business_name")
            .await
            .unwrap()
            .unwrap()
            .value,
        "Jain Saree Center"
    );

    store
        .update_setting("business_name", "Custom Name")
        .await
        .unwrap();
    store.seed_default_settings().await.unwrap();

    let setting = store
        .get_setting("business_name")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(setting.value, "Custom Name");
    assert!(setting.updated_at >= setting.created_at);
    assert_eq!(store.list_settings().await.unwrap().len(), 7);

    // Update never inserts a new key.
    assert_eq!(store.update_setting("missing_key", "x").await.unwrap(), 0);
}
