mod database;
mod error;
mod handlers;
mod middleware;
mod models;
mod stock;
mod utils;

use axum::{
    routing::{get, post, put},
    Router,
};
use dotenvy::dotenv;
use std::env;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use database::{create_database_pool, Database};
use handlers::{
    activity, admin, auth, customer_orders, distributors, orders, products, sales, warehouses,
};

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    env_logger::init();

    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let db = create_database_pool(&database_url)
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .expect("Failed to run migrations");

    log::info!("Database connection successful");

    // Build the application router
    let app = create_router(db);

    // Get port from environment or use default
    let port = env::var("PORT").unwrap_or_else(|_| "3001".to_string());
    let addr = format!("0.0.0.0:{}", port);

    log::info!("Granary server starting on http://{}", addr);

    // Start the server
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

fn create_router(db: Database) -> Router {
    Router::new()
        .route("/", get(|| async { "Granary inventory backend running" }))
        .route("/api/healthcheck", get(handlers::healthcheck))
        .route("/login", post(auth::login))
        // Products
        .route("/api/products", get(products::list_products))
        .route("/api/product", post(products::create_product))
        .route(
            "/api/product/:id",
            put(products::update_product).delete(products::delete_product),
        )
        // Warehouses
        .route("/api/warehouses", get(warehouses::list_warehouses))
        .route("/api/warehouse", post(warehouses::create_warehouse))
        .route(
            "/api/warehouse/:id",
            put(warehouses::update_warehouse).delete(warehouses::delete_warehouse),
        )
        .route("/api/warehouse-id", get(warehouses::warehouse_id_by_email))
        .route("/api/warehouse/inventory", get(warehouses::warehouse_inventory))
        .route("/api/add-stock", post(warehouses::add_stock))
        // Incoming distributor orders, warehouse side
        .route(
            "/api/warehouse/incoming-orders",
            get(orders::warehouse_incoming_orders),
        )
        .route("/api/warehouse/dispatch", post(orders::dispatch))
        // Direct customer orders
        .route(
            "/api/warehouse/orders",
            post(customer_orders::create_customer_order)
                .get(customer_orders::list_customer_orders),
        )
        // Distributors
        .route("/api/distributors", get(distributors::list_distributors))
        .route("/api/add-distributor", post(distributors::create_distributor))
        .route(
            "/api/distributor/:id",
            put(distributors::update_distributor).delete(distributors::delete_distributor),
        )
        .route(
            "/api/distributor-id",
            get(distributors::distributor_id_by_email),
        )
        .route("/api/distributor/info", get(distributors::distributor_info))
        .route("/api/distributor/stock", get(distributors::distributor_stock))
        .route(
            "/api/distributor/products",
            get(distributors::distributor_products),
        )
        .route(
            "/api/distributor/orders",
            post(orders::place_order).get(orders::distributor_orders),
        )
        .route(
            "/api/distributor/confirm-delivery",
            post(orders::confirm_delivery),
        )
        .route(
            "/api/distributor/sales",
            post(sales::record_sale).get(sales::sales_history),
        )
        // Activity logs
        .route(
            "/api/activity-logs",
            get(activity::warehouse_logs).post(activity::create_log),
        )
        // Admin dashboard
        .route("/api/admin/summary", get(admin::summary))
        .route("/api/admin/activity-logs", get(admin::activity_logs))
        .route("/api/admin/order-status", get(admin::order_status_history))
        .route("/api/admin/orders/:id", put(admin::update_order_status))
        .route(
            "/api/admin/warehouse-overview/:id",
            get(admin::warehouse_overview),
        )
        .route(
            "/api/admin/distributor-overview/:id",
            get(admin::distributor_overview),
        )
        .route("/api/admin/distributor-sales", get(admin::distributor_sales))
        // Middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(db)
}
