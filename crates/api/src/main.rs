//! API server entry point.

use api::config::Config;
use common::{MenuItemId, VendorId};
use domain::{InMemoryCatalog, MenuItem, Money};
use metrics_exporter_prometheus::PrometheusHandle;
use order_store::{InMemoryOrderRepository, OrderRepository, PostgresOrderRepository};
use sqlx::PgPool;
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

/// Seeds a handful of menu items so a fresh instance is browsable.
fn seed_demo_menu(catalog: &InMemoryCatalog) {
    let stall = VendorId::new();
    for (name, cents) in [
        ("Chicken Rice", 450),
        ("Char Kway Teow", 500),
        ("Laksa", 550),
    ] {
        catalog.insert(MenuItem {
            id: MenuItemId::new(),
            vendor_id: stall,
            name: name.to_string(),
            price: Money::from_cents(cents),
            picture: None,
            is_available: true,
        });
    }
    tracing::info!(vendor_id = %stall, items = catalog.item_count(), "seeded demo menu");
}

async fn serve<R: OrderRepository + Clone + 'static>(
    orders: R,
    config: Config,
    metrics_handle: PrometheusHandle,
) {
    let (state, catalog) = api::create_default_state(orders, config.reconcile_interval);
    seed_demo_menu(&catalog);

    let app = api::create_app(state, metrics_handle);

    let addr = config.addr();
    tracing::info!(%addr, "starting API server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("server shut down gracefully");
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    let config = Config::from_env();

    match config.database_url.clone() {
        Some(url) => {
            let pool = PgPool::connect(&url)
                .await
                .expect("failed to connect to PostgreSQL");
            let repository = PostgresOrderRepository::new(pool);
            repository
                .run_migrations()
                .await
                .expect("failed to run migrations");
            tracing::info!("using PostgreSQL order repository");
            serve(repository, config, metrics_handle).await;
        }
        None => {
            tracing::info!("using in-memory order repository");
            serve(InMemoryOrderRepository::new(), config, metrics_handle).await;
        }
    }
}
