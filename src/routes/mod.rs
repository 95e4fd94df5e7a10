// Route exports
pub mod admin;
pub mod error;
pub mod public;

use actix_web::web;
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::{PairingSettings, Settings};
use crate::models::{Branding, Pairing, Signup};
use crate::services::{AdminAuth, CacheManager, Database, DatabaseError};

pub use error::{
    handle_json_payload_error, handle_path_error, handle_query_payload_error, ApiError, JsonError,
};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub cache: Arc<CacheManager>,
    pub auth: Arc<AdminAuth>,
    pub pairing: PairingSettings,
    pub branding: Branding,
}

impl AppState {
    pub fn new(db: Database, settings: &Settings) -> Self {
        Self {
            db: Arc::new(db),
            cache: Arc::new(CacheManager::new(settings.cache.capacity, settings.cache.ttl_secs)),
            auth: Arc::new(AdminAuth::from_settings(&settings.admin)),
            pairing: settings.pairing.clone(),
            branding: Branding::from(&settings.branding),
        }
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(public::configure)
            .configure(admin::configure),
    );
}

/// Install the JSON error handlers for body, query and path extraction
pub fn configure_extractors(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
        .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
        .app_data(web::PathConfig::default().error_handler(handle_path_error));
}

/// Signups referenced by `pairings`, keyed by id
async fn signups_for(
    db: &Database,
    pairings: &[Pairing],
) -> Result<HashMap<i64, Signup>, DatabaseError> {
    let ids: Vec<i64> = pairings
        .iter()
        .flat_map(|p| std::iter::once(p.a_signup_id).chain(p.b_signup_id))
        .collect();
    db.signups_by_ids(&ids).await
}
