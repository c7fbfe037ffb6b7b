use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Clone, Debug)]
struct RateLimitEntry {
    count: u32,
    window_start: DateTime<Utc>,
}

/// Sliding-window rate limiter keyed by a caller-chosen string
/// (username for login, user id for authenticated actions).
pub struct RateLimiter {
    entries: Mutex<HashMap<String, HashMap<String, RateLimitEntry>>>,
    max_requests: u32,
    window_seconds: i64,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window_seconds: i64) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            max_requests,
            window_seconds,
        }
    }

    /// Returns Ok(()) if allowed, Err(message) if the key is rate limited.
    pub fn check(&self, key: &str, action: &str) -> Result<(), String> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| "Failed to acquire rate limiter lock")?;

        let now = Utc::now();
        let window_duration = Duration::seconds(self.window_seconds);

        let key_entries = entries.entry(key.to_string()).or_default();

        let entry = key_entries
            .entry(action.to_string())
            .or_insert_with(|| RateLimitEntry {
                count: 0,
                window_start: now,
            });

        if now >= entry.window_start + window_duration {
            entry.count = 0;
            entry.window_start = now;
        }

        entry.count += 1;

        if entry.count > self.max_requests {
            let retry_after = (entry.window_start + window_duration - now).num_seconds();
            return Err(format!(
                "Too many attempts. Max {} per {} seconds. Try again in {} seconds.",
                self.max_requests,
                self.window_seconds,
                retry_after.max(0)
            ));
        }

        Ok(())
    }
}

lazy_static::lazy_static! {
    /// Login attempts: 5 per 15-minute window, per username.
    pub static ref LOGIN_LIMIT: RateLimiter = RateLimiter::new(5, 15 * 60);

    /// Account registration: 10 per hour (keyed by caller-supplied tag).
    pub static ref REGISTER_LIMIT: RateLimiter = RateLimiter::new(10, 60 * 60);
}
