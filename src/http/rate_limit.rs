//! Rate limiting implementation
//!
//! TheSeed wikis ask bots to keep a minimum spacing between requests
//! (NamuWiki: one per second). [`RateLimiter`] enforces that spacing.
//!
//! Two strategies are selected at construction:
//! - [`RateLimiter::Null`]: zero interval, `acquire` does nothing at all
//! - [`RateLimiter::Interval`]: each `acquire` waits until the interval has
//!   passed since the previous `acquire` completed

use crate::error::{Error, Result};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::trace;

// ============================================================================
// Clock
// ============================================================================

/// Monotonic time source used by the limiter
#[async_trait]
pub trait Clock: Send + Sync + fmt::Debug {
    /// Current monotonic time
    fn now(&self) -> Instant;

    /// Suspend the calling task for `duration`
    async fn sleep(&self, duration: Duration);
}

/// Clock backed by `Instant::now()` and `tokio::time::sleep`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

// ============================================================================
// Limiter
// ============================================================================

/// Minimum-interval rate limiter
///
/// Clones share state: every clone of an interval limiter waits on the
/// same "last acquired" timestamp.
#[derive(Clone, Debug, Default)]
pub enum RateLimiter {
    /// Limiting disabled
    #[default]
    Null,
    /// Enforce a minimum interval between acquisitions
    Interval(IntervalLimiter),
}

impl RateLimiter {
    /// Create a limiter; a zero interval disables limiting
    pub fn new(interval: Duration) -> Self {
        Self::with_clock(interval, Arc::new(SystemClock))
    }

    /// Create a limiter with a custom clock
    pub fn with_clock(interval: Duration, clock: Arc<dyn Clock>) -> Self {
        if interval.is_zero() {
            RateLimiter::Null
        } else {
            RateLimiter::Interval(IntervalLimiter::new(interval, clock))
        }
    }

    /// Limiter that never waits
    pub fn disabled() -> Self {
        RateLimiter::Null
    }

    /// Create a limiter from a number of seconds
    ///
    /// Zero or negative values disable limiting. NaN and infinity are rejected.
    pub fn from_secs_f64(seconds: f64) -> Result<Self> {
        if !seconds.is_finite() {
            return Err(Error::invalid_value(
                "interval_seconds",
                format!("must be a finite number, got {seconds}"),
            ));
        }
        if seconds <= 0.0 {
            return Ok(RateLimiter::Null);
        }
        let interval = Duration::try_from_secs_f64(seconds)
            .map_err(|e| Error::invalid_value("interval_seconds", e.to_string()))?;
        Ok(Self::new(interval))
    }

    /// Wait until a request may be made
    ///
    /// Dropping the returned future before it completes leaves the limiter
    /// state untouched.
    pub async fn acquire(&self) {
        match self {
            RateLimiter::Null => {}
            RateLimiter::Interval(limiter) => limiter.acquire().await,
        }
    }

    /// Configured interval (zero when disabled)
    pub fn interval(&self) -> Duration {
        match self {
            RateLimiter::Null => Duration::ZERO,
            RateLimiter::Interval(limiter) => limiter.interval,
        }
    }

    /// Check if limiting is enabled
    pub fn is_enabled(&self) -> bool {
        matches!(self, RateLimiter::Interval(_))
    }
}

/// Interval strategy state
#[derive(Clone)]
pub struct IntervalLimiter {
    interval: Duration,
    /// Completion time of the previous acquisition; `None` until the first one
    last: Arc<Mutex<Option<Instant>>>,
    clock: Arc<dyn Clock>,
}

impl IntervalLimiter {
    fn new(interval: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            interval,
            last: Arc::new(Mutex::new(None)),
            clock,
        }
    }

    async fn acquire(&self) {
        // Held across the sleep so waiters queue in order and none reads a
        // stale timestamp.
        let mut last = self.last.lock().await;

        if let Some(previous) = *last {
            let elapsed = self.clock.now().saturating_duration_since(previous);
            let wait = self.interval.saturating_sub(elapsed);
            if !wait.is_zero() {
                trace!(wait_ms = wait.as_millis() as u64, "rate limiter waiting");
                self.clock.sleep(wait).await;
            }
        }

        *last = Some(self.clock.now());
    }
}

impl fmt::Debug for IntervalLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntervalLimiter")
            .field("interval", &self.interval)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod rate_limit_tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    /// Clock that only moves when slept on, recording every sleep
    #[derive(Debug)]
    struct ManualClock {
        start: Instant,
        state: StdMutex<ManualState>,
    }

    #[derive(Debug, Default)]
    struct ManualState {
        offset: Duration,
        sleeps: Vec<Duration>,
    }

    impl ManualClock {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                start: Instant::now(),
                state: StdMutex::new(ManualState::default()),
            })
        }

        fn advance(&self, by: Duration) {
            self.state.lock().unwrap().offset += by;
        }

        fn sleeps(&self) -> Vec<Duration> {
            self.state.lock().unwrap().sleeps.clone()
        }
    }

    #[async_trait]
    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            self.start + self.state.lock().unwrap().offset
        }

        async fn sleep(&self, duration: Duration) {
            {
                let mut state = self.state.lock().unwrap();
                state.offset += duration;
                state.sleeps.push(duration);
            }
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_zero_interval_never_sleeps() {
        let clock = ManualClock::new();
        let limiter = RateLimiter::with_clock(Duration::ZERO, clock.clone());

        for _ in 0..1000 {
            limiter.acquire().await;
        }

        assert!(!limiter.is_enabled());
        assert_eq!(limiter.interval(), Duration::ZERO);
        assert!(clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_first_acquire_does_not_wait() {
        let clock = ManualClock::new();
        let limiter = RateLimiter::with_clock(Duration::from_secs(1), clock.clone());

        limiter.acquire().await;

        assert!(clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_consecutive_acquires_wait_full_interval() {
        let clock = ManualClock::new();
        let limiter = RateLimiter::with_clock(Duration::from_secs(1), clock.clone());

        limiter.acquire().await;
        let first = clock.now();
        limiter.acquire().await;
        let second = clock.now();

        assert_eq!(clock.sleeps(), vec![Duration::from_secs(1)]);
        assert!(second - first >= Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_wait_accounts_for_elapsed_time() {
        let clock = ManualClock::new();
        let limiter = RateLimiter::with_clock(Duration::from_secs(1), clock.clone());

        limiter.acquire().await;
        clock.advance(Duration::from_millis(300));
        limiter.acquire().await;

        assert_eq!(clock.sleeps(), vec![Duration::from_millis(700)]);
    }

    #[tokio::test]
    async fn test_no_wait_after_interval_passed() {
        let clock = ManualClock::new();
        let limiter = RateLimiter::with_clock(Duration::from_secs(1), clock.clone());

        limiter.acquire().await;
        clock.advance(Duration::from_secs(5));
        limiter.acquire().await;

        assert!(clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_acquires_keep_spacing() {
        let clock = ManualClock::new();
        let limiter = RateLimiter::with_clock(Duration::from_millis(500), clock.clone());

        let tasks = (0..8).map(|_| {
            let limiter = limiter.clone();
            let clock = clock.clone();
            async move {
                limiter.acquire().await;
                clock.now()
            }
        });
        let mut stamps = futures::future::join_all(tasks).await;
        stamps.sort();

        for pair in stamps.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_millis(500));
        }
        assert_eq!(clock.sleeps().len(), 7);
    }

    #[tokio::test]
    async fn test_cancelled_acquire_keeps_last() {
        let clock = ManualClock::new();
        let limiter = RateLimiter::with_clock(Duration::from_secs(1), clock.clone());

        limiter.acquire().await;
        let RateLimiter::Interval(inner) = &limiter else {
            panic!("expected interval limiter");
        };
        let recorded = *inner.last.lock().await;

        // Poll once so the acquire reaches its sleep, then drop it.
        {
            let pending = limiter.acquire();
            tokio::pin!(pending);
            let polled = futures::poll!(pending.as_mut());
            assert!(polled.is_pending());
        }

        assert_eq!(*inner.last.lock().await, recorded);
    }

    #[tokio::test]
    async fn test_real_clock_spacing() {
        let limiter = RateLimiter::new(Duration::from_millis(50));
        let start = Instant::now();

        limiter.acquire().await;
        limiter.acquire().await;
        limiter.acquire().await;

        assert!(start.elapsed() >= Duration::from_millis(100));
    }

    #[test]
    fn test_from_secs_f64() {
        assert!(!RateLimiter::from_secs_f64(0.0).unwrap().is_enabled());
        assert!(!RateLimiter::from_secs_f64(-1.0).unwrap().is_enabled());

        let limiter = RateLimiter::from_secs_f64(1.5).unwrap();
        assert_eq!(limiter.interval(), Duration::from_millis(1500));

        assert!(RateLimiter::from_secs_f64(f64::NAN).is_err());
        assert!(RateLimiter::from_secs_f64(f64::INFINITY).is_err());
    }

    #[test]
    fn test_clones_share_state() {
        let limiter = RateLimiter::new(Duration::from_secs(1));
        let clone = limiter.clone();

        let (RateLimiter::Interval(a), RateLimiter::Interval(b)) = (&limiter, &clone) else {
            panic!("expected interval limiters");
        };
        assert!(Arc::ptr_eq(&a.last, &b.last));
    }
}
