use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use super::{Middleware, MiddlewareChain};
use crate::dispatcher::{Request, Response};

/// Request counters for everything that passes through the chain.
///
/// Counters are atomics updated with `Ordering::Relaxed`; they are cheap
/// to bump and eventually consistent. Share one instance through an `Arc`
/// to read it back.
#[derive(Default)]
pub struct MetricsMiddleware {
    request_count: AtomicUsize,
    error_count: AtomicUsize,
    total_latency_ns: AtomicU64,
    status_counts: Mutex<BTreeMap<u16, usize>>,
}

impl MetricsMiddleware {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests that entered this middleware.
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::Relaxed)
    }

    /// Requests whose inner chain returned an error instead of a response.
    pub fn error_count(&self) -> usize {
        self.error_count.load(Ordering::Relaxed)
    }

    /// Mean time spent in the inner chain; zero before the first request.
    pub fn average_latency(&self) -> Duration {
        let count = self.request_count.load(Ordering::Relaxed) as u64;
        if count == 0 {
            Duration::from_nanos(0)
        } else {
            Duration::from_nanos(self.total_latency_ns.load(Ordering::Relaxed) / count)
        }
    }

    /// Responses seen per status code.
    pub fn status_counts(&self) -> BTreeMap<u16, usize> {
        self.status_counts
            .lock()
            .map(|counts| counts.clone())
            .unwrap_or_default()
    }

    fn record_status(&self, status: u16) {
        if let Ok(mut counts) = self.status_counts.lock() {
            *counts.entry(status).or_insert(0) += 1;
        }
    }
}

impl Middleware for MetricsMiddleware {
    fn process(
        &self,
        request: Request,
        chain: &mut MiddlewareChain<'_>,
    ) -> anyhow::Result<Response> {
        self.request_count.fetch_add(1, Ordering::Relaxed);
        let start = Instant::now();
        let result = chain.handle(request);
        let elapsed = u64::try_from(start.elapsed().as_nanos()).unwrap_or(u64::MAX);
        self.total_latency_ns.fetch_add(elapsed, Ordering::Relaxed);

        match &result {
            Ok(response) => self.record_status(response.status),
            Err(_) => {
                self.error_count.fetch_add(1, Ordering::Relaxed);
            }
        }
        result
    }

    fn name(&self) -> &str {
        "metrics"
    }
}
