//! Per-user request quotas
//!
//! Token bucket from `governor`, keyed by user id. State is process-local.

use governor::clock::DefaultClock;
use governor::state::keyed::DefaultKeyedStateStore;
use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;
use uuid::Uuid;

pub struct UserRateLimiter {
    limiter: RateLimiter<Uuid, DefaultKeyedStateStore<Uuid>, DefaultClock>,
    per_minute: NonZeroU32,
}

impl UserRateLimiter {
    /// Allow `per_minute` requests per user per minute. Zero is raised to one.
    pub fn per_minute(per_minute: u32) -> Self {
        let per_minute = NonZeroU32::new(per_minute).unwrap_or(NonZeroU32::MIN);
        Self {
            limiter: RateLimiter::keyed(Quota::per_minute(per_minute)),
            per_minute,
        }
    }

    /// Consume one request for `user_id`; false when the quota is exhausted
    pub fn check(&self, user_id: Uuid) -> bool {
        self.limiter.check_key(&user_id).is_ok()
    }

    pub fn limit(&self) -> u32 {
        self.per_minute.get()
    }
}
