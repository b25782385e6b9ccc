use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::sync::watch;
use tracing::{error, info};

use ssg_api::{build_router, AppState, HandlebarsRenderer};
use ssg_core::services::{
    AccountService, AuthGate, PostService, SessionService, SessionSweeper, SiteGenerator,
};
use ssg_infrastructure::{create_pool, run_migrations, LocalHost, PgPostRepository, PgUserRepository};
use ssg_security::PasswordService;
use ssg_shared::{AppConfig, SystemClock};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().context("failed to load configuration")?;

    // Initialize telemetry; the guard flushes the file writer on exit
    let _log_guard = ssg_shared::telemetry::init_telemetry(&config.telemetry)?;

    info!("{} starting ({})...", config.app.name, config.app.env);

    // Connect to Database
    let pool = create_pool(&config.database)
        .await
        .context("failed to connect to database")?;
    info!("Database connection established.");

    if config.database.run_migrations {
        run_migrations(&pool).await?;
    }

    // Adapters
    let users = Arc::new(PgUserRepository::new(pool.clone()));
    let posts_repo = Arc::new(PgPostRepository::new(pool));
    let site_root = PathBuf::from(&config.site.output_dir);
    let pages = Arc::new(HandlebarsRenderer::new()?);

    // Services
    let sessions = Arc::new(SessionService::new(
        users.clone(),
        Arc::new(SystemClock),
        config.session.ttl(),
        config.session.store_timeout(),
    ));
    let passwords = Arc::new(PasswordService::new(config.security.bcrypt_cost)?);

    let state = AppState {
        accounts: Arc::new(AccountService::new(users.clone(), sessions.clone(), passwords)),
        gate: Arc::new(AuthGate::new(sessions.clone(), users)),
        posts: Arc::new(PostService::new(posts_repo.clone())),
        generator: Arc::new(SiteGenerator::new(
            posts_repo,
            pages.clone(),
            Arc::new(LocalHost::new(site_root.clone())),
        )),
        pages,
        site_root,
        request_timeout: Duration::from_secs(config.server.request_timeout_seconds),
    };

    // Background sweeper
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeper = match config.session.sweep_interval() {
        Some(interval) => Some(SessionSweeper::new(sessions, interval).spawn(shutdown_rx)),
        None => {
            info!("Session sweeper disabled");
            None
        }
    };

    // Bind address
    let host: std::net::IpAddr = config.app.host.parse()?;
    let addr = SocketAddr::from((host, config.app.port));
    info!("Listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Stop the sweeper
    let _ = shutdown_tx.send(true);
    if let Some(handle) = sweeper {
        if let Err(e) = handle.await {
            error!("Session sweeper ended abnormally: {}", e);
        }
    }

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal");
}
