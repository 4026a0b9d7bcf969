//! Application services shared by every screen

use std::sync::Arc;

use natter_core::{
    AppConfig, AuthProvider, Clock, Database, DocumentStore, LocalAuth, Result, SystemClock,
};
use tracing::info;

/// Backends and settings handed to each view
///
/// Holds no per-user state; the signed-in identity travels separately as a
/// [`crate::session::Session`].
pub struct AppContext {
    pub store: Arc<dyn DocumentStore>,
    pub auth: Arc<dyn AuthProvider>,
    pub clock: Arc<dyn Clock>,
    pub config: AppConfig,
}

impl AppContext {
    /// Open the local database named by the config
    pub fn open(config: AppConfig) -> Result<Self> {
        let db_path = config.database_path()?;

        // Ensure parent directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = Arc::new(Database::open(&db_path)?);
        info!(path = %db_path.display(), "Database ready");
        Ok(Self::with_database(db, config))
    }

    pub fn with_database(db: Arc<Database>, config: AppConfig) -> Self {
        let auth = LocalAuth::with_min_password_len(db.clone(), config.auth.min_password_len);
        Self {
            store: db,
            auth: Arc::new(auth),
            clock: Arc::new(SystemClock),
            config,
        }
    }
}
