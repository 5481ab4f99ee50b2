use std::collections::HashMap;
use std::sync::Mutex;

use time::{Duration, OffsetDateTime};
use tracing::{error, warn};

use crate::error::ApiError;

#[derive(Debug)]
struct Window {
    attempts: u32,
    first_attempt: OffsetDateTime,
}

/// Fixed-window rate limiter keyed by an arbitrary string, typically
/// `"<route>:<user id or address>"`. State is in-process only.
#[derive(Debug)]
pub struct RateLimiter {
    windows: Mutex<HashMap<String, Window>>,
    max_attempts: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_attempts: u32, window_minutes: i64) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            max_attempts,
            window: Duration::minutes(window_minutes),
        }
    }

    pub fn check(&self, key: &str) -> Result<(), ApiError> {
        let now = OffsetDateTime::now_utc();

        let mut windows = match self.windows.lock() {
            Ok(guard) => guard,
            Err(e) => {
                error!("Failed to acquire rate limit lock: {}", e);
                return Err(ApiError::Internal("Rate limiter unavailable".into()));
            }
        };

        // Stale entries never come back; drop them while we hold the lock.
        windows.retain(|_, w| now - w.first_attempt <= self.window * 2);

        match windows.get_mut(key) {
            Some(w) if now - w.first_attempt <= self.window => {
                if w.attempts >= self.max_attempts {
                    let minutes = (w.first_attempt + self.window - now).whole_minutes().max(1);
                    warn!("Rate limit triggered for key {}", key);
                    return Err(ApiError::RateLimited(minutes));
                }
                w.attempts += 1;
            }
            Some(w) => {
                *w = Window { attempts: 1, first_attempt: now };
            }
            None => {
                windows.insert(key.to_string(), Window { attempts: 1, first_attempt: now });
            }
        }
        Ok(())
    }
}
