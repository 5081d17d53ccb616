use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use complaints_cache::memory::MemoryCache;
use complaints_cache::redis::RedisCache;
use complaints_cache::{Cache, CacheAside};
use mockable::DefaultClock;
use tokio::sync::Notify;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use complaints_api::config::{LogFormat, ServerConfig};
use complaints_api::router::build_app_router;
use complaints_api::state::{AppState, Stores};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Configuration ---
    let config = ServerConfig::from_env().context("Failed to load configuration")?;

    // --- Tracing ---
    init_tracing(config.log_format);
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let pool = complaints_db::create_pool(
        &config.database.url,
        config.database.max_connections,
        config.database.acquire_timeout(),
    )
    .await
    .context("Failed to connect to database")?;
    tracing::info!("Database connection pool created");

    complaints_db::health_check(&pool)
        .await
        .context("Database health check failed")?;
    tracing::info!("Database health check passed");

    complaints_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    // --- Cache ---
    let backend: Arc<dyn Cache> = match &config.cache.redis_url {
        Some(url) => {
            let redis = RedisCache::new(url, config.cache.io_timeout())
                .context("Invalid REDIS_URL")?;
            tracing::info!(ttl_secs = config.cache.ttl_secs, "Using Redis cache");
            Arc::new(redis)
        }
        None => {
            tracing::info!(ttl_secs = config.cache.ttl_secs, "REDIS_URL unset, using in-process cache");
            Arc::new(MemoryCache::new())
        }
    };
    let cache = CacheAside::new(backend, config.cache.ttl());

    // --- App state ---
    let addr = SocketAddr::new(
        config.host.parse().context("Invalid HOST address")?,
        config.port,
    );
    let grace = Duration::from_secs(config.shutdown_timeout_secs);
    let bootstrap = config.admin_bootstrap.clone();

    let state = AppState::new(
        config.clone(),
        Stores::postgres(pool.clone()),
        cache,
        Arc::new(DefaultClock),
    );

    if let Some(seed) = &bootstrap {
        state
            .admins
            .bootstrap(seed)
            .await
            .context("Failed to seed bootstrap admin")?;
    }

    let app = build_app_router(state, &config);

    // --- Start server ---
    tracing::info!(%addr, "Starting server");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    let signalled = Arc::new(Notify::new());
    let server = axum::serve(listener, app)
        .with_graceful_shutdown({
            let signalled = Arc::clone(&signalled);
            async move {
                shutdown_signal().await;
                signalled.notify_one();
            }
        })
        .into_future();
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => result.context("Server error")?,
        () = signalled.notified() => {
            match tokio::time::timeout(grace, &mut server).await {
                Ok(result) => result.context("Server error")?,
                Err(_) => tracing::warn!(
                    grace_secs = grace.as_secs(),
                    "In-flight requests did not finish in time, forcing shutdown"
                ),
            }
        }
    }

    pool.close().await;
    tracing::info!("Graceful shutdown complete");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "complaints_api=debug,complaints_cache=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
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
