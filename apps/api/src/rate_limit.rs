//! Per-identity fixed-window rate limiting for the caption route.
//!
//! One record per identity: window start plus admission count. The whole map
//! sits behind a single mutex so the check-and-increment is atomic — two
//! in-flight requests for the same identity can never both take the last
//! remaining slot.
//!
//! `AppState` holds an `Arc<RateLimiter>`; window and cap come from config.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Prune expired records once the map grows past this many identities.
const PRUNE_THRESHOLD: usize = 1024;

#[derive(Debug)]
struct WindowRecord {
    window_start: Instant,
    count: u32,
}

/// Fixed-window request limiter keyed by client identity.
///
/// Defaults used in deployment: 20 requests per 15 minutes per identity.
pub struct RateLimiter {
    windows: Mutex<HashMap<String, WindowRecord>>,
    window: Duration,
    max_requests: u32,
}

impl RateLimiter {
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            window,
            max_requests,
        }
    }

    /// Admits or denies a request from `identity`.
    ///
    /// A denial still increments the counter — there is no rollback, which
    /// is standard fixed-window behavior.
    pub fn allow(&self, identity: &str) -> bool {
        self.allow_at(identity, Instant::now())
    }

    /// Clock-injected core of [`RateLimiter::allow`]; tests drive this
    /// directly to exercise window rollover without sleeping.
    pub fn allow_at(&self, identity: &str, now: Instant) -> bool {
        let mut windows = self.windows.lock().unwrap();

        if windows.len() > PRUNE_THRESHOLD {
            let window = self.window;
            windows.retain(|_, w| now.duration_since(w.window_start) < window);
        }

        match windows.get_mut(identity) {
            Some(w) if now.duration_since(w.window_start) < self.window => {
                w.count += 1;
                w.count <= self.max_requests
            }
            _ => {
                // First request from this identity, or its window expired.
                windows.insert(
                    identity.to_string(),
                    WindowRecord {
                        window_start: now,
                        count: 1,
                    },
                );
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Barrier};
    use std::thread;

    const WINDOW: Duration = Duration::from_secs(900);

    #[test]
    fn test_admits_up_to_cap() {
        let limiter = RateLimiter::new(WINDOW, 3);
        let start = Instant::now();
        for _ in 0..3 {
            assert!(limiter.allow_at("1.2.3.4", start));
        }
    }

    #[test]
    fn test_denies_over_cap() {
        let limiter = RateLimiter::new(WINDOW, 3);
        let start = Instant::now();
        for _ in 0..3 {
            assert!(limiter.allow_at("1.2.3.4", start));
        }
        assert!(!limiter.allow_at("1.2.3.4", start));
        assert!(!limiter.allow_at("1.2.3.4", start));
    }

    #[test]
    fn test_window_rollover_resets_count() {
        let limiter = RateLimiter::new(WINDOW, 2);
        let start = Instant::now();
        assert!(limiter.allow_at("1.2.3.4", start));
        assert!(limiter.allow_at("1.2.3.4", start));
        assert!(!limiter.allow_at("1.2.3.4", start));

        let after_window = start + WINDOW + Duration::from_secs(1);
        assert!(limiter.allow_at("1.2.3.4", after_window));
        assert!(limiter.allow_at("1.2.3.4", after_window));
        assert!(!limiter.allow_at("1.2.3.4", after_window));
    }

    #[test]
    fn test_identities_are_independent() {
        let limiter = RateLimiter::new(WINDOW, 1);
        let start = Instant::now();
        assert!(limiter.allow_at("1.2.3.4", start));
        assert!(!limiter.allow_at("1.2.3.4", start));
        assert!(limiter.allow_at("5.6.7.8", start));
    }

    #[test]
    fn test_denial_does_not_roll_back() {
        let limiter = RateLimiter::new(WINDOW, 1);
        let start = Instant::now();
        assert!(limiter.allow_at("1.2.3.4", start));
        // Denied requests keep counting; admission never reopens mid-window.
        for _ in 0..5 {
            assert!(!limiter.allow_at("1.2.3.4", start));
        }
    }

    #[test]
    fn test_concurrent_requests_admit_exactly_cap() {
        const CAP: u32 = 5;
        const TASKS: usize = 20;

        let limiter = Arc::new(RateLimiter::new(WINDOW, CAP));
        let barrier = Arc::new(Barrier::new(TASKS));

        let handles: Vec<_> = (0..TASKS)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    limiter.allow("1.2.3.4")
                })
            })
            .collect();

        let admitted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|&admitted| admitted)
            .count();

        assert_eq!(admitted, CAP as usize);
    }

    #[test]
    fn test_prune_drops_expired_identities() {
        let limiter = RateLimiter::new(WINDOW, 1);
        let start = Instant::now();
        for i in 0..=PRUNE_THRESHOLD {
            assert!(limiter.allow_at(&format!("10.0.0.{i}"), start));
        }
        assert!(limiter.windows.lock().unwrap().len() > PRUNE_THRESHOLD);

        let after_window = start + WINDOW + Duration::from_secs(1);
        limiter.allow_at("fresh", after_window);
        assert_eq!(limiter.windows.lock().unwrap().len(), 1);
    }
}
