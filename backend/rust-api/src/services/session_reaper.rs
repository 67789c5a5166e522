use std::{sync::Arc, time::Duration};

use tokio::time::sleep;
use tracing::info;

use crate::{config::SessionSettings, metrics::SESSION_REAPER_TICKS_TOTAL};

use super::quiz_service::QuizService;

/// Periodically drops sessions nobody has touched for `idle_ttl`.
pub struct SessionReaper {
    service: Arc<QuizService>,
    idle_ttl: Duration,
    interval: Duration,
}

impl SessionReaper {
    /// Returns `None` when idle expiry is switched off.
    pub fn from_settings(service: Arc<QuizService>, settings: &SessionSettings) -> Option<Self> {
        if settings.idle_ttl_secs == 0 {
            return None;
        }

        Some(Self {
            service,
            idle_ttl: Duration::from_secs(settings.idle_ttl_secs),
            interval: Duration::from_secs(settings.reap_interval_secs.max(1)),
        })
    }

    pub async fn run(self) {
        info!(
            "Starting session reaper loop (idle ttl {}s, interval {}s)",
            self.idle_ttl.as_secs(),
            self.interval.as_secs()
        );

        loop {
            sleep(self.interval).await;
            self.run_once();
        }
    }

    pub fn run_once(&self) -> usize {
        let reaped = self.service.reap_idle_sessions(self.idle_ttl);
        SESSION_REAPER_TICKS_TOTAL
            .with_label_values(&["success"])
            .inc();
        reaped
    }
}
