//! In-process fixed-window rate limiter.
//!
//! One counter per user, keyed by window index. State lives in this
//! process only; horizontal scaling would move this behind a shared
//! store, which the current single-instance deployment does not need.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use uuid::Uuid;

use lumeo_domain::plan::Plan;

use crate::domain::repository::RateLimiterPort;
use crate::error::StudioServiceError;

#[derive(Debug, Clone, Copy)]
struct WindowCounter {
    window_index: u64,
    count: u32,
}

#[derive(Debug, Default)]
pub struct MemoryRateLimiter {
    windows: Mutex<HashMap<Uuid, WindowCounter>>,
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

impl MemoryRateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one hit at `now_ms` and decide admission. Separated from the
    /// port method so tests can drive the clock.
    fn check_at(&self, user_id: Uuid, plan: Plan, now_ms: u64) -> bool {
        let limit = plan.rate_limit();
        let window_ms = limit.window.as_millis() as u64;
        let window_index = now_ms / window_ms;

        let mut windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());
        let counter = windows.entry(user_id).or_insert(WindowCounter {
            window_index,
            count: 0,
        });
        if counter.window_index != window_index {
            counter.window_index = window_index;
            counter.count = 0;
        }
        counter.count += 1;
        counter.count <= limit.requests
    }

    /// Drop counters from past windows. Called periodically from the
    /// background sweep so idle users do not accumulate.
    pub fn sweep(&self) {
        let now = now_ms();
        let mut windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());
        windows.retain(|_, counter| {
            let window_ms = Plan::Free.rate_limit().window.as_millis() as u64;
            counter.window_index >= now / window_ms
        });
    }
}

impl RateLimiterPort for MemoryRateLimiter {
    async fn check(&self, user_id: Uuid, plan: Plan) -> Result<bool, StudioServiceError> {
        Ok(self.check_at(user_id, plan, now_ms()))
    }
}

impl<T: RateLimiterPort> RateLimiterPort for std::sync::Arc<T> {
    async fn check(&self, user_id: Uuid, plan: Plan) -> Result<bool, StudioServiceError> {
        T::check(self, user_id, plan).await
    }
}
