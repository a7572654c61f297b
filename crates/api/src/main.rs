use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use zeus_api::config::ServerConfig;
use zeus_api::engine::dispatcher::JobDispatcher;
use zeus_api::engine::reconciler::JobReconciler;
use zeus_api::router::build_app_router;
use zeus_api::state::AppState;
use zeus_api::{catalog, dev_seed};
use zeus_db::repositories::ScriptRepo;
use zeus_queue::http::HttpJobQueue;
use zeus_queue::JobQueue;
use zeus_worker::local::LocalJobQueue;
use zeus_worker::registry::ScriptRegistry;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "zeus_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = zeus_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    zeus_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    zeus_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Script registry + catalog sync ---
    let registry = Arc::new(ScriptRegistry::builtin());

    let report = catalog::sync(&pool, &registry.catalog(), config.catalog_grant_on_discovery)
        .await
        .expect("Catalog sync failed");
    tracing::info!(
        modules = report.modules,
        scripts = report.scripts,
        new_scripts = report.new_scripts,
        grants = report.grants,
        "Script catalog synced",
    );

    // Every persisted catalog entry must resolve to a handler; a stale
    // entry is a configuration error we refuse to boot with.
    let cataloged: Vec<_> = ScriptRepo::list(&pool)
        .await
        .expect("Failed to load script catalog")
        .iter()
        .map(catalog::script_metadata)
        .collect();
    registry
        .validate_against(&cataloged)
        .expect("Script registry validation failed");
    tracing::info!(scripts = cataloged.len(), "Script registry validated");

    // --- Dev seed ---
    if config.dev_seed {
        dev_seed::run(&pool).await.expect("Dev seed failed");
    }

    // --- Execution backend ---
    let queue: Arc<dyn JobQueue> = match &config.queue.url {
        Some(url) => {
            tracing::info!(%url, "Using remote job queue");
            Arc::new(
                HttpJobQueue::new(url.clone(), config.queue.request_timeout())
                    .expect("Failed to build queue client"),
            )
        }
        None => {
            tracing::info!("No QUEUE_URL configured, using in-process job queue");
            Arc::new(LocalJobQueue::new(Arc::clone(&registry)))
        }
    };

    // --- App state ---
    let state = AppState {
        pool: pool.clone(),
        config: Arc::new(config.clone()),
        dispatcher: Arc::new(JobDispatcher::new(pool.clone(), Arc::clone(&queue))),
        reconciler: Arc::new(JobReconciler::new(pool, queue)),
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
