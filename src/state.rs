use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tera::Tera;

use crate::config::{self, Config};
use crate::db::{self, Database};
use crate::render;
use crate::session::SessionStore;

/// Shared application state handed to every request handler.
pub struct AppState {
    pub db: Database,
    pub config: Config,
    pub sessions: SessionStore,
    pub templates: Tera,
}

impl AppState {
    pub async fn new(config: Config) -> Result<Arc<Self>> {
        let db = db::init(&config).await?;
        db.seed_company(&config::COMPANY_SEED).await?;

        let templates = render::templates()?;
        let sessions = SessionStore::new(Duration::from_secs(config.session_ttl_minutes * 60));

        Ok(Arc::new(Self {
            db,
            config,
            sessions,
            templates,
        }))
    }
}
