//! One sampling tick: counters, rates, latency and window total.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, instrument, warn};

use crate::accumulator::RollingUsageAccumulator;
use crate::collectors::{CounterPair, Interface, NetSource};
use crate::health_stats::TickStats;
use crate::latency::LatencyProbe;
use crate::snapshot::{NetworkStats, Snapshot};

/// Static parameters of the sampler.
#[derive(Debug, Clone)]
pub struct SamplerConfig {
    /// Nominal time between ticks, used as the rate divisor.
    pub tick_interval: Duration,
    pub probe_target: String,
    pub probe_timeout: Duration,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(1000),
            probe_target: "8.8.8.8".to_string(),
            probe_timeout: Duration::from_millis(1000),
        }
    }
}

/// Produces one `Snapshot` per call.
///
/// The sampler keeps its own counter baseline for rate computation; the
/// accumulator it drives keeps a separate one for window accounting.
pub struct StatsSampler {
    source: Arc<dyn NetSource>,
    probe: Box<dyn LatencyProbe>,
    config: SamplerConfig,
    accumulator: RollingUsageAccumulator,
    last: Option<CounterPair>,
    stats: Arc<TickStats>,
}

impl StatsSampler {
    pub fn new(
        source: Arc<dyn NetSource>,
        probe: Box<dyn LatencyProbe>,
        accumulator: RollingUsageAccumulator,
        config: SamplerConfig,
    ) -> Self {
        Self {
            source,
            probe,
            config,
            accumulator,
            last: None,
            stats: Arc::new(TickStats::new()),
        }
    }

    /// Shares an existing statistics sink instead of a private one.
    pub fn with_stats(mut self, stats: Arc<TickStats>) -> Self {
        self.stats = stats;
        self
    }

    /// Samples `interface`, or returns the no-network sentinel for `None`.
    #[instrument(skip_all, fields(interface = interface.map(|i| i.name.as_str()).unwrap_or("-")))]
    pub fn sample(&mut self, interface: Option<&Interface>) -> Snapshot {
        let Some(iface) = interface else {
            self.stats.no_interface_ticks.fetch_add(1, Ordering::Relaxed);
            return Snapshot::no_active_network();
        };

        let current = match self.source.counters(&iface.name) {
            Ok(counters) => counters,
            Err(e) => {
                warn!("Failed to read counters of {}: {}", iface.name, e);
                self.stats
                    .counter_read_failures
                    .fetch_add(1, Ordering::Relaxed);
                // The next successful read would otherwise span several ticks
                self.last = None;
                return Snapshot::no_active_network();
            }
        };

        let secs = self.config.tick_interval.as_secs_f64();
        let (download_bps, upload_bps) = match self.last {
            Some(prev) => (
                bits_per_second(prev.bytes_received, current.bytes_received, secs),
                bits_per_second(prev.bytes_sent, current.bytes_sent, secs),
            ),
            None => (0.0, 0.0),
        };

        let latency = self
            .probe
            .probe(&self.config.probe_target, self.config.probe_timeout);
        self.stats.record_probe(latency.as_millis());

        let regressions_before = self.accumulator.regressions();
        let window_total_bytes = self
            .accumulator
            .record_tick(current.bytes_received, current.bytes_sent);
        let regressions = self.accumulator.regressions() - regressions_before;
        if regressions > 0 {
            self.stats
                .counter_regressions
                .fetch_add(regressions, Ordering::Relaxed);
        }

        self.last = Some(current);

        debug!(
            "down={:.0}bps up={:.0}bps latency={:?} window={}B",
            download_bps, upload_bps, latency, window_total_bytes
        );

        Snapshot::Active(NetworkStats {
            interface: iface.name.clone(),
            download_bps,
            upload_bps,
            latency,
            window_total_bytes,
            window_ticks: self.accumulator.window().len(),
            timestamp: Utc::now(),
        })
    }

    /// Drops both counter baselines; the usage window is kept.
    ///
    /// Called when the active interface changes so the first tick on the new
    /// interface reports zero instead of the difference between two adapters.
    pub fn rebaseline(&mut self) {
        self.last = None;
        self.accumulator.rebaseline();
    }

    pub fn last_counters(&self) -> Option<CounterPair> {
        self.last
    }

    pub fn accumulator(&self) -> &RollingUsageAccumulator {
        &self.accumulator
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    pub fn stats(&self) -> Arc<TickStats> {
        Arc::clone(&self.stats)
    }
}

/// Byte-counter delta over `secs`, in bits per second. Regressions yield 0.
pub fn bits_per_second(previous: u64, current: u64, secs: f64) -> f64 {
    if secs <= 0.0 {
        return 0.0;
    }
    current.saturating_sub(previous) as f64 * 8.0 / secs
}
