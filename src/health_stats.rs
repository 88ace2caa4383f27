//! Runtime statistics for the sampling loop.
//!
//! This module tracks tick counts, probe outcomes and tick timings. Counters
//! are atomics so the renderer side can read them while the sampling worker
//! updates them.

use std::fmt::Write as FmtWrite;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Instant;

/// Running statistics for a single metric.
#[derive(Clone, Copy, Default, Debug)]
pub struct RunningStat {
    count: u64,
    sum: f64,
    min: f64,
    max: f64,
    last: f64,
}

impl RunningStat {
    pub fn add(&mut self, value: f64) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
            self.last = value;
            self.sum = value;
            self.count = 1;
            return;
        }
        self.count += 1;
        self.sum += value;
        self.last = value;
        if value < self.min {
            self.min = value;
        }
        if value > self.max {
            self.max = value;
        }
    }

    pub fn avg(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / (self.count as f64)
        }
    }
}

/// Thread-safe wrapper for running statistics.
#[derive(Default)]
pub struct Stat {
    inner: Mutex<RunningStat>,
}

/// Point-in-time copy of a `Stat`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StatSnapshot {
    pub last: f64,
    pub avg: f64,
    pub max: f64,
    pub min: f64,
    pub count: u64,
}

impl Stat {
    pub fn add_sample(&self, value: f64) {
        if let Ok(mut s) = self.inner.lock() {
            s.add(value);
        }
    }

    pub fn snapshot(&self) -> StatSnapshot {
        if let Ok(s) = self.inner.lock() {
            StatSnapshot {
                last: s.last,
                avg: s.avg(),
                max: s.max,
                min: s.min,
                count: s.count,
            }
        } else {
            StatSnapshot::default()
        }
    }
}

/// Counters and timings collected across ticks.
pub struct TickStats {
    pub ticks: AtomicU64,
    pub no_interface_ticks: AtomicU64,
    pub counter_read_failures: AtomicU64,
    pub counter_regressions: AtomicU64,
    pub probe_successes: AtomicU64,
    pub probe_failures: AtomicU64,
    pub interface_swaps: AtomicU64,
    pub dropped_snapshots: AtomicU64,

    pub tick_duration_ms: Stat,
    pub latency_ms: Stat,

    started: Instant,
}

impl Default for TickStats {
    fn default() -> Self {
        Self::new()
    }
}

impl TickStats {
    pub fn new() -> Self {
        Self {
            ticks: AtomicU64::new(0),
            no_interface_ticks: AtomicU64::new(0),
            counter_read_failures: AtomicU64::new(0),
            counter_regressions: AtomicU64::new(0),
            probe_successes: AtomicU64::new(0),
            probe_failures: AtomicU64::new(0),
            interface_swaps: AtomicU64::new(0),
            dropped_snapshots: AtomicU64::new(0),
            tick_duration_ms: Stat::default(),
            latency_ms: Stat::default(),
            started: Instant::now(),
        }
    }

    pub fn record_probe(&self, latency_ms: Option<u64>) {
        match latency_ms {
            Some(ms) => {
                self.probe_successes.fetch_add(1, Ordering::Relaxed);
                self.latency_ms.add_sample(ms as f64);
            }
            None => {
                self.probe_failures.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Share of probes that got a reply, in percent.
    pub fn probe_success_percent(&self) -> f64 {
        let ok = self.probe_successes.load(Ordering::Relaxed);
        let failed = self.probe_failures.load(Ordering::Relaxed);
        let total = ok + failed;
        if total == 0 {
            0.0
        } else {
            ok as f64 * 100.0 / total as f64
        }
    }

    /// Multi-line human readable summary for the shutdown log.
    pub fn render_summary(&self) -> String {
        let mut out = String::new();
        let tick = self.tick_duration_ms.snapshot();
        let latency = self.latency_ms.snapshot();

        let _ = writeln!(
            out,
            "uptime: {:.1}s, ticks: {} (no interface: {}, read failures: {})",
            self.started.elapsed().as_secs_f64(),
            self.ticks.load(Ordering::Relaxed),
            self.no_interface_ticks.load(Ordering::Relaxed),
            self.counter_read_failures.load(Ordering::Relaxed),
        );
        let _ = writeln!(
            out,
            "interface swaps: {}, counter regressions: {}, dropped snapshots: {}",
            self.interface_swaps.load(Ordering::Relaxed),
            self.counter_regressions.load(Ordering::Relaxed),
            self.dropped_snapshots.load(Ordering::Relaxed),
        );
        let _ = writeln!(
            out,
            "probes: {} ok / {} failed ({:.1}% reachable)",
            self.probe_successes.load(Ordering::Relaxed),
            self.probe_failures.load(Ordering::Relaxed),
            self.probe_success_percent(),
        );
        let _ = writeln!(
            out,
            "latency ms: last {:.0}, avg {:.1}, min {:.0}, max {:.0}",
            latency.last, latency.avg, latency.min, latency.max
        );
        let _ = write!(
            out,
            "tick duration ms: last {:.1}, avg {:.1}, max {:.1}",
            tick.last, tick.avg, tick.max
        );
        out
    }
}
