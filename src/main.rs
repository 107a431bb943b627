// src/main.rs
use anyhow::Context;
use axum::{extract::Extension, middleware, Router};
use dotenv::dotenv;
use reqwest::Client;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::env;
use std::path::PathBuf;
use std::{net::SocketAddr, str::FromStr, sync::Arc};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

// ============================================================================
// MODULE IMPORTS
// ============================================================================

mod bot;
mod common;
mod logging_middleware;
mod notion;
mod services;
mod users;

use common::AppState;
use services::{monitoring, NotionService, TelegramService};

// ============================================================================
// MAIN APPLICATION ENTRY POINT
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // Guard must outlive the server so queued events get flushed.
    let _sentry_guard = monitoring::init();

    // ========================================================================
    // ENVIRONMENT CONFIGURATION
    // ========================================================================

    let database_url =
        env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://clipper.db".to_string());
    let secret_key = env::var("SECRET_KEY").context("SECRET_KEY must be set")?;
    let telegram_token = env::var("TELEGRAM_TOKEN").context("TELEGRAM_TOKEN must be set")?;
    let notion_client_id =
        env::var("NOTION_OAUTH_CLIENT_ID").context("NOTION_OAUTH_CLIENT_ID must be set")?;
    let notion_client_secret = env::var("NOTION_OAUTH_CLIENT_SECRET")
        .context("NOTION_OAUTH_CLIENT_SECRET must be set")?;
    let public_base_url =
        env::var("PUBLIC_BASE_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());

    // ========================================================================
    // DATABASE SETUP
    // ========================================================================

    if let Some(path_part) = database_url.strip_prefix("sqlite://") {
        let path_without_params = path_part.split('?').next().unwrap_or("");
        if !path_without_params.is_empty() && !path_without_params.starts_with(':') {
            let db_path = PathBuf::from(path_without_params);
            if let Some(parent) = db_path.parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
        }
    }

    let connect_options = SqliteConnectOptions::from_str(&database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .connect_with(connect_options)
        .await?;

    common::migrations::run_migrations(&pool).await?;

    // ========================================================================
    // SERVICE INITIALIZATION
    // ========================================================================

    let http_client = Client::builder().build()?;

    let telegram_service = Arc::new(TelegramService::new(http_client.clone(), telegram_token));
    info!("TelegramService initialized");

    let notion_service = Arc::new(NotionService::new(
        http_client.clone(),
        notion_client_id,
        notion_client_secret,
    ));
    info!("NotionService initialized");

    // ========================================================================
    // APPLICATION STATE
    // ========================================================================

    let app_state = AppState {
        db: pool,
        secret_key,
        public_base_url,
        telegram_service,
        notion_service,
    };

    let shared = Arc::new(RwLock::new(app_state));

    // ========================================================================
    // ROUTER COMPOSITION
    // ========================================================================

    let app = Router::new()
        .merge(bot::bot_routes())
        .merge(notion::notion_routes())
        .layer(middleware::from_fn(logging_middleware::log_request_body))
        .layer(Extension(shared))
        .layer(TraceLayer::new_for_http());

    // ========================================================================
    // SERVER STARTUP
    // ========================================================================

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
