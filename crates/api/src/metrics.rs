use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

pub struct Metrics {
    // Counters
    total_requests: AtomicUsize,
    successful_requests: AtomicUsize,
    failed_requests: AtomicUsize,

    // Timing (in microseconds)
    total_retrieve_time_us: AtomicU64,
    total_generate_time_us: AtomicU64,
    total_render_time_us: AtomicU64,

    // Counts
    retrievals: AtomicUsize,
    generations: AtomicUsize,
    documents_rendered: AtomicUsize,
    generated_chars: AtomicUsize,
    files_removed: AtomicUsize,
}

impl Metrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            total_requests: AtomicUsize::new(0),
            successful_requests: AtomicUsize::new(0),
            failed_requests: AtomicUsize::new(0),
            total_retrieve_time_us: AtomicU64::new(0),
            total_generate_time_us: AtomicU64::new(0),
            total_render_time_us: AtomicU64::new(0),
            retrievals: AtomicUsize::new(0),
            generations: AtomicUsize::new(0),
            documents_rendered: AtomicUsize::new(0),
            generated_chars: AtomicUsize::new(0),
            files_removed: AtomicUsize::new(0),
        })
    }

    pub fn record_request(&self, success: bool) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        if success {
            self.successful_requests.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed_requests.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_retrieve(&self, duration: Duration) {
        self.total_retrieve_time_us.fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
        self.retrievals.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_generate(&self, duration: Duration, chars: usize) {
        self.total_generate_time_us.fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
        self.generations.fetch_add(1, Ordering::Relaxed);
        self.generated_chars.fetch_add(chars, Ordering::Relaxed);
    }

    pub fn record_render(&self, duration: Duration) {
        self.total_render_time_us.fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
        self.documents_rendered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_files_removed(&self, count: usize) {
        self.files_removed.fetch_add(count, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            successful_requests: self.successful_requests.load(Ordering::Relaxed),
            failed_requests: self.failed_requests.load(Ordering::Relaxed),
            avg_retrieve_time_ms: self.avg_time_ms(&self.total_retrieve_time_us, &self.retrievals),
            avg_generate_time_ms: self.avg_time_ms(&self.total_generate_time_us, &self.generations),
            avg_render_time_ms: self.avg_time_ms(&self.total_render_time_us, &self.documents_rendered),
            documents_rendered: self.documents_rendered.load(Ordering::Relaxed),
            generated_chars: self.generated_chars.load(Ordering::Relaxed),
            files_removed: self.files_removed.load(Ordering::Relaxed),
        }
    }

    fn avg_time_ms(&self, total_us: &AtomicU64, count: &AtomicUsize) -> f64 {
        let total = total_us.load(Ordering::Relaxed) as f64;
        let cnt = count.load(Ordering::Relaxed) as f64;
        if cnt > 0.0 {
            total / cnt / 1000.0 // Convert to ms
        } else {
            0.0
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub total_requests: usize,
    pub successful_requests: usize,
    pub failed_requests: usize,
    pub avg_retrieve_time_ms: f64,
    pub avg_generate_time_ms: f64,
    pub avg_render_time_ms: f64,
    pub documents_rendered: usize,
    pub generated_chars: usize,
    pub files_removed: usize,
}

pub struct TimedOperation {
    start: Instant,
}

impl TimedOperation {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}
