use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use count_cache::{CacheMetrics, CountCache, RedisCache};
use prometheus::Registry;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_actix_web::TracingLogger;

use social_service::app::{configure, AppState, Stores};
use social_service::config::Config;
use social_service::services::ChatHub;
use social_service::telemetry;

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = terminate.recv() => {},
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[actix_web::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;

    telemetry::init_tracing(config.app.json_logs);
    info!("Starting social-service");
    info!(
        env = %config.app.env,
        http_port = config.app.http_port,
        "Configuration loaded"
    );

    // Initialize database pool
    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;
    info!("Database pool created");

    // Run database migrations
    sqlx::migrate!("./migrations")
        .run(&pg_pool)
        .await
        .context("Failed to run database migrations")?;
    info!("Database migrations completed");

    // Count cache: Redis when configured, otherwise in-process
    let count_ttl = Duration::from_secs(config.cache.count_ttl_secs);
    let cache = match &config.cache.redis_url {
        Some(url) => {
            let redis = RedisCache::connect(url)
                .await
                .context("Failed to connect to Redis")?;
            redis
                .health_check()
                .await
                .context("Redis health check failed")?;
            info!("Redis count cache connected");
            CountCache::new(Arc::new(redis))
        }
        None => {
            warn!("REDIS_URL not set, caching counts in-process");
            CountCache::in_memory()
        }
    }
    .with_default_ttl(count_ttl);

    let registry = Registry::new();
    CacheMetrics::register(&registry).context("Failed to register cache metrics")?;

    let chat_hub = Arc::new(ChatHub::new(config.social.chat_channel_capacity));

    let app_state = AppState::new(
        Stores::postgres(pg_pool.clone()),
        cache,
        &config.social,
        chat_hub,
    )
    .with_pool(pg_pool)
    .with_registry(registry);
    let app_state = web::Data::new(app_state);
    info!("AppState created");

    let http_addr = format!("{}:{}", config.app.host, config.app.http_port);
    info!("Starting HTTP server on http://{}", http_addr);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(app_state.clone())
            .configure(configure)
    })
    .bind(&http_addr)
    .with_context(|| format!("Failed to bind HTTP server to {}", http_addr))?
    .run();

    let handle = server.handle();
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Shutdown signal received");
        handle.stop(true).await;
    });

    server.await.context("HTTP server error")?;
    info!("social-service stopped");
    Ok(())
}
