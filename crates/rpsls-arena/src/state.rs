//! Application state management.

use crate::config::ArenaConfig;
use chrono::{DateTime, Utc};
use rpsls_core::{Arena, InMemoryLedger};
use std::sync::{Arc, Mutex, PoisonError};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    arena: Arc<Arena<InMemoryLedger>>,
    config: Arc<ArenaConfig>,
    /// Simulated current time (for timeout testing)
    current_time: Arc<Mutex<Option<DateTime<Utc>>>>,
}

impl AppState {
    pub fn new(config: ArenaConfig) -> Self {
        Self {
            arena: Arc::new(Arena::new(InMemoryLedger::new())),
            config: Arc::new(config),
            current_time: Arc::new(Mutex::new(None)),
        }
    }

    pub fn arena(&self) -> &Arena<InMemoryLedger> {
        &self.arena
    }

    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    /// Get current time (real or simulated)
    pub fn now(&self) -> DateTime<Utc> {
        self.current_time
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .unwrap_or_else(Utc::now)
    }

    /// Advance simulated time by seconds; time stays frozen afterwards
    pub fn advance_time(&self, seconds: i64) -> DateTime<Utc> {
        let mut current_time = self
            .current_time
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let base = current_time.unwrap_or_else(Utc::now);
        let advanced = chrono::Duration::try_seconds(seconds)
            .and_then(|delta| base.checked_add_signed(delta))
            .unwrap_or(base);
        *current_time = Some(advanced);
        advanced
    }
}
