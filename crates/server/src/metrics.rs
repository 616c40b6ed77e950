//! Lock-free session counters.
//!
//! The session bumps these after every batch of world updates; anything that
//! wants to report on them takes a [`MetricsSnapshot`].

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering::Relaxed};
use std::time::{Duration, Instant};

pub struct Metrics {
    // Monotonic counters
    batches_processed: AtomicU64,
    batches_failed: AtomicU64,
    updates_processed: AtomicU64,
    batch_ns_sum: AtomicU64,

    // Latency histogram buckets (batch duration)
    hist_under_100us: AtomicU64,
    hist_100us_1ms: AtomicU64,
    hist_1_10ms: AtomicU64,
    hist_over_10ms: AtomicU64,

    // Gauges
    players: AtomicU64,

    started_at: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            batches_processed: AtomicU64::new(0),
            batches_failed: AtomicU64::new(0),
            updates_processed: AtomicU64::new(0),
            batch_ns_sum: AtomicU64::new(0),
            hist_under_100us: AtomicU64::new(0),
            hist_100us_1ms: AtomicU64::new(0),
            hist_1_10ms: AtomicU64::new(0),
            hist_over_10ms: AtomicU64::new(0),
            players: AtomicU64::new(0),
            started_at: Instant::now(),
        }
    }

    /// Called after each successful `process_updates`.
    pub fn record_batch(&self, updates: u64, duration: Duration) {
        self.batches_processed.fetch_add(1, Relaxed);
        self.updates_processed.fetch_add(updates, Relaxed);
        self.batch_ns_sum.fetch_add(duration.as_nanos() as u64, Relaxed);

        let us = duration.as_micros() as u64;
        match us {
            0..=99 => {
                self.hist_under_100us.fetch_add(1, Relaxed);
            }
            100..=999 => {
                self.hist_100us_1ms.fetch_add(1, Relaxed);
            }
            1_000..=9_999 => {
                self.hist_1_10ms.fetch_add(1, Relaxed);
            }
            _ => {
                self.hist_over_10ms.fetch_add(1, Relaxed);
            }
        }
    }

    pub fn record_failure(&self) {
        self.batches_failed.fetch_add(1, Relaxed);
    }

    pub fn player_joined(&self) {
        self.players.fetch_add(1, Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            uptime_secs: self.started_at.elapsed().as_secs_f64(),
            batches_total: self.batches_processed.load(Relaxed),
            batches_failed: self.batches_failed.load(Relaxed),
            updates_total: self.updates_processed.load(Relaxed),
            batch_ns_sum: self.batch_ns_sum.load(Relaxed),
            players: self.players.load(Relaxed),
            hist: [
                self.hist_under_100us.load(Relaxed),
                self.hist_100us_1ms.load(Relaxed),
                self.hist_1_10ms.load(Relaxed),
                self.hist_over_10ms.load(Relaxed),
            ],
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Serializable snapshot of all counters at a point in time.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub uptime_secs: f64,
    pub batches_total: u64,
    pub batches_failed: u64,
    pub updates_total: u64,
    pub batch_ns_sum: u64,
    pub players: u64,
    /// `[<100μs, 100μs-1ms, 1-10ms, >10ms]`
    pub hist: [u64; 4],
}
