use chrono::{DateTime, Utc};

use crate::application::ScreeningService;
use crate::config::CorsOrigins;

/// Shared application state for API handlers
#[derive(Clone)]
pub struct AppState {
    /// Screening pipeline over the immutable model context
    pub service: ScreeningService,

    /// Browser origins allowed by the CORS layer
    pub cors_origins: CorsOrigins,

    /// Application start time
    pub start_time: DateTime<Utc>,
}

impl AppState {
    #[must_use]
    pub fn new(service: ScreeningService, cors_origins: CorsOrigins) -> Self {
        Self {
            service,
            cors_origins,
            start_time: Utc::now(),
        }
    }

    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.start_time).num_seconds()
    }
}
