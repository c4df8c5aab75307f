//! lumen-gateway server entry point.
//!
//! Starts the Axum HTTP server, registers the built-in pages and the
//! process's saveables, and runs the exit save on shutdown.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use lumen_gateway::api;
use lumen_gateway::app_state::AppState;
use lumen_gateway::config::{GatewayConfig, SettingsStore};
use lumen_gateway::domain::{ConfigGate, PageContext, RamLog, SaveHandler};
use lumen_gateway::pages;
use lumen_gateway::service::{SaveManager, SchemeDispatcher};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = GatewayConfig::from_env()?;
    tracing::info!(addr = %config.listen_addr, "starting lumen-gateway");

    let settings = Arc::new(SettingsStore::load(
        &config.settings_path,
        config.change_signal_capacity,
    )?);
    let ram_log = Arc::new(RamLog::new(config.ram_log_capacity));
    ram_log.record(tracing::Level::INFO, "gateway started");

    // Build the page dispatcher
    let context = Arc::new(PageContext {
        settings: Arc::clone(&settings),
        ram_log: Some(Arc::clone(&ram_log)),
        docs_dir: config.docs_dir.clone(),
        started_at: chrono::Utc::now(),
    });
    let dispatcher = Arc::new(SchemeDispatcher::new(pages::builtin_registry()?, context));

    // Build the save manager and register the process's saveables
    let save_manager = Arc::new(SaveManager::new(Arc::clone(&settings)));

    let settings_handler: SaveHandler = {
        let settings = Arc::clone(&settings);
        let path = config.settings_path.clone();
        Arc::new(move || settings.save_to(&path))
    };
    save_manager
        .register(
            "settings",
            settings_handler,
            Some(settings.changed()),
            Some(ConfigGate::new("general", "auto-save-config")),
        )
        .await?;

    // No change signal: the RAM log mutates constantly, so it is dumped
    // unconditionally at exit instead of tracked.
    let ram_log_handler: SaveHandler = {
        let ram_log = Arc::clone(&ram_log);
        let path = config.ram_log_path.clone();
        Arc::new(move || {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, ram_log.dump_plain())
        })
    };
    save_manager.register("ram-log", ram_log_handler, None, None).await?;

    let autosave_task = (config.autosave_interval_secs > 0).then(|| {
        Arc::clone(&save_manager)
            .spawn_autosave(Duration::from_secs(config.autosave_interval_secs))
    });

    // Build application state and router
    let app_state = AppState {
        dispatcher,
        save_manager: Arc::clone(&save_manager),
    };
    let app = Router::new()
        .merge(api::build_router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Exit save
    if let Some(task) = autosave_task {
        task.abort();
    }
    let report = save_manager.shutdown().await;
    for failure in &report.errors {
        tracing::error!(name = %failure.name, message = %failure.message, "exit save failure");
    }

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown requested");
}
