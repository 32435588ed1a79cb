use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// A cached token is refreshed once it is this close to expiry.
pub const REFRESH_GRACE_PERIOD: Duration = Duration::from_secs(120);

/// Bearer credential plus its absolute expiry. Replaced, never mutated, on refresh.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken {
    access_token: String,
    expires_at: Option<Instant>,
}

impl SessionToken {
    pub fn new(access_token: impl Into<String>, expires_at: Option<Instant>) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at,
        }
    }

    /// A token that is never refreshed.
    pub fn non_expiring(access_token: impl Into<String>) -> Self {
        Self::new(access_token, None)
    }

    pub fn expiring_in(access_token: impl Into<String>, expires_in: Duration, now: Instant) -> Self {
        Self::new(access_token, Some(now + expires_in))
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn expires_at(&self) -> Option<Instant> {
        self.expires_at
    }

    pub fn time_to_expiry(&self, now: Instant) -> Option<Duration> {
        self.expires_at.map(|at| at.saturating_duration_since(now))
    }

    /// True once `now >= expires_at - REFRESH_GRACE_PERIOD`.
    pub fn needs_refresh(&self, now: Instant) -> bool {
        match self.time_to_expiry(now) {
            Some(remaining) => remaining <= REFRESH_GRACE_PERIOD,
            None => false,
        }
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionToken")
            .field("access_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Monotonic time source used for token expiry.
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Manually advanced clock for deterministic expiry tests.
#[derive(Debug, Clone)]
pub struct TestClock {
    now: Arc<Mutex<Instant>>,
}

impl TestClock {
    pub fn new(start: Instant) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Default for TestClock {
    fn default() -> Self {
        Self::new(Instant::now())
    }
}

impl Clock for TestClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}
