pub mod auth;
pub mod commands;
pub mod config;
pub mod database;
pub mod errors;
pub mod logger;
pub mod models;
pub mod rate_limiter;
pub mod validation;

use std::path::Path;
use std::sync::Mutex;

use auth::session::SessionStore;
use errors::AppError;

/// Shared application state handed to every command.
pub struct AppState {
    pub db: sqlx::SqlitePool,
    pub sessions: Mutex<SessionStore>,
}

impl AppState {
    pub fn new(db: sqlx::SqlitePool) -> Self {
        Self {
            db,
            sessions: Mutex::new(SessionStore::new()),
        }
    }
}

/// Boot the storefront core: config, logger, database pool + migrations.
/// The presentation layer calls this once at startup and keeps the state.
pub async fn init_app(app_data_dir: &Path) -> Result<AppState, AppError> {
    config::init_config();

    if let Err(e) = logger::init_global_logger(app_data_dir) {
        eprintln!("Warning: failed to initialize logger: {}", e);
    }

    log_info!(
        "APP",
        "Storefront core starting",
        serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "environment": config::get_config().environment.as_str(),
        })
    );

    let pool = database::connection::init_db(app_data_dir)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    database::connection::health_check(&pool).await?;

    log_info!(
        "DATABASE",
        "Connection pool ready",
        serde_json::json!({ "pool_size": pool.size() })
    );

    Ok(AppState::new(pool))
}
