pub mod app;
pub mod config;
pub mod events;
pub mod inbox;
pub mod notification;
pub mod notifier;
pub mod push;
pub mod server;
pub mod shutdown;

use std::path::PathBuf;

use manager_db::Database;

use config::{AppConfig, SettingsManager};

/// Determine the data directory for the application.
/// Priority: MESSAGE_MANAGER_DATA_DIR env var > ~/.message-manager
fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("MESSAGE_MANAGER_DATA_DIR") {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".message-manager")
}

/// Load .env from multiple candidate paths.
fn load_dotenv() {
    let candidates = [".env", "../.env"];
    for path in &candidates {
        if dotenvy::from_filename(path).is_ok() {
            tracing::info!("Loaded .env from: {path}");
            return;
        }
    }
    tracing::info!("No .env file found, using system environment variables");
}

/// Initialize DB, migrate settings, load config.
pub fn init_foundation() -> Result<(Database, AppConfig, PathBuf), anyhow::Error> {
    load_dotenv();

    let dir = data_dir();
    std::fs::create_dir_all(&dir)?;
    let db_path = dir.join("local.db");

    tracing::info!("Opening database at {}", db_path.display());
    let db = Database::open(&db_path)?;

    let sm = SettingsManager::new(db.clone());

    // Migrate settings from environment variables (one-time)
    if let Err(e) = sm.migrate_from_env() {
        tracing::error!("Failed to migrate from env: {e}");
    }

    // Initialize default settings
    sm.initialize_defaults()?;

    // The device id stands in for the browser profile
    sm.ensure_device_id()?;

    // Load runtime config
    let config = AppConfig::load(&sm)?;

    // Log missing required settings so the operator can tell "can't"
    // from "won't"
    if let Ok(missing) = sm.missing_required() {
        if !missing.is_empty() {
            tracing::warn!("Missing required settings: {:?}", missing);
        }
    }

    tracing::info!("Settings loaded (port={})", config.server_port);
    Ok((db, config, dir))
}
