use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::BookingRepository;
use crate::services::auth::SessionSigner;
use crate::services::booking::BookingService;

pub struct AppState {
    pub config: AppConfig,
    pub bookings: BookingService,
    pub sessions: SessionSigner,
}

impl AppState {
    pub fn new(config: AppConfig, repo: Arc<dyn BookingRepository>) -> Self {
        let sessions = SessionSigner::new(config.session_secret.clone(), config.session_ttl_minutes);
        Self {
            config,
            bookings: BookingService::new(repo),
            sessions,
        }
    }
}
