//! Cached SAST bearer credential
//!
//! One credential is shared by every scrape. It is refreshed under its own
//! lock when missing or older than the configured time-to-live, and can be
//! invalidated when the server starts answering with empty engine lists.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;

use crate::core::time::TimeProvider;
use crate::sast::client::SastApi;

/// Default credential lifetime in seconds
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 1400;

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    obtained_at: DateTime<Utc>,
}

/// Time-bounded cache around [`SastApi::logon`]
pub struct TokenManager {
    api: Arc<dyn SastApi>,
    clock: Arc<dyn TimeProvider>,
    ttl: Duration,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenManager {
    pub fn new(api: Arc<dyn SastApi>, clock: Arc<dyn TimeProvider>, ttl: Duration) -> Self {
        Self {
            api,
            clock,
            ttl,
            cached: Mutex::new(None),
        }
    }

    /// Return a usable credential, logging on again when needed
    ///
    /// `None` means logon failed; the failure has already been logged.
    pub async fn get_token(&self) -> Option<String> {
        let mut cached = self.cached.lock().await;
        let now = self.clock.now();

        match cached.as_ref() {
            Some(token) if now - token.obtained_at <= self.ttl => {
                return Some(token.value.clone());
            }
            Some(_) => log::debug!("Token is too old, calling logon"),
            None => log::debug!("Token is null, calling logon"),
        }

        match self.api.logon().await {
            Ok(value) => {
                *cached = Some(CachedToken {
                    value: value.clone(),
                    obtained_at: self.clock.now(),
                });
                Some(value)
            }
            Err(e) => {
                log::error!("Logon failed: {}", e);
                *cached = None;
                None
            }
        }
    }

    /// Forget the cached credential so the next call logs on again
    pub async fn invalidate(&self) {
        log::debug!("Invalidating cached token");
        *self.cached.lock().await = None;
    }
}
