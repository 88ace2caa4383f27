//! Periodic driver for the sampler.
//!
//! A tokio task owns the sampling worker and runs one tick per interval on
//! the blocking pool, awaiting it before the next tick is scheduled, so ticks
//! never overlap and a slow latency probe delays the schedule instead of
//! stacking probes. All sampler and accumulator mutation happens inside that
//! single worker.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::collectors::Interface;
use crate::health_stats::TickStats;
use crate::sampler::StatsSampler;
use crate::selector::InterfaceSelector;
use crate::snapshot::Snapshot;

/// Default re-selection cadence while an interface is active.
pub const DEFAULT_RESELECT_EVERY_TICKS: u64 = 30;

/// Shortest tick period; tokio intervals cannot be zero.
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Scheduling parameters.
#[derive(Debug, Clone)]
pub struct PollingConfig {
    pub interval: Duration,
    /// Re-run interface selection every N ticks while an interface is
    /// active (0 disables). Without an active interface selection runs on
    /// every tick.
    pub reselect_every_ticks: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(1000),
            reselect_every_ticks: DEFAULT_RESELECT_EVERY_TICKS,
        }
    }
}

/// State moved onto the blocking pool for each tick.
struct Worker {
    selector: InterfaceSelector,
    sampler: StatsSampler,
    active: Option<Interface>,
    /// Set when the active interface failed a counter read.
    stale: bool,
    ticks: u64,
    reselect_every: u64,
    stats: Arc<TickStats>,
}

impl Worker {
    fn reselect(&mut self) {
        let selected = self.selector.select_active_interface();

        match (&self.active, &selected) {
            (Some(old), Some(new)) if old.name == new.name => {}
            (Some(old), Some(new)) => {
                info!("Active interface changed: {} -> {}", old.name, new.name);
                self.stats.interface_swaps.fetch_add(1, Ordering::Relaxed);
                self.sampler.rebaseline();
            }
            (None, Some(new)) => {
                info!("Active interface: {} ({})", new.name, new.kind);
                self.sampler.rebaseline();
            }
            (Some(old), None) => {
                warn!("Interface {} no longer qualifies, no active network", old.name);
            }
            (None, None) => {
                debug!("Still no active network interface");
            }
        }

        self.active = selected;
        self.stale = false;
    }

    fn reselect_due(&self) -> bool {
        if self.ticks == 0 {
            // Selection already ran in PollingLoop::start
            return false;
        }
        self.active.is_none()
            || self.stale
            || (self.reselect_every > 0 && self.ticks % self.reselect_every == 0)
    }

    fn tick(&mut self) -> Snapshot {
        let start = Instant::now();

        if self.reselect_due() {
            self.reselect();
        }

        let snapshot = self.sampler.sample(self.active.as_ref());
        self.stale = self.active.is_some() && !snapshot.is_active();

        self.ticks += 1;
        self.stats.ticks.fetch_add(1, Ordering::Relaxed);
        self.stats
            .tick_duration_ms
            .add_sample(start.elapsed().as_secs_f64() * 1000.0);

        snapshot
    }
}

/// Handle to a running sampling loop.
pub struct PollingLoop {
    shutdown: watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
    stats: Arc<TickStats>,
}

impl PollingLoop {
    /// Selects the initial interface and starts ticking.
    ///
    /// Must be called from within a tokio runtime. `on_snapshot` runs on the
    /// loop task, once per tick, with the tick's snapshot.
    pub fn start<F>(
        config: PollingConfig,
        selector: InterfaceSelector,
        sampler: StatsSampler,
        on_snapshot: F,
    ) -> Self
    where
        F: FnMut(Snapshot) + Send + 'static,
    {
        let stats = sampler.stats();

        let interval = config.interval.max(MIN_INTERVAL);
        if interval != config.interval {
            warn!(
                "Polling interval {:?} is below the minimum, using {:?}",
                config.interval, interval
            );
        }

        let mut worker = Worker {
            selector,
            sampler,
            active: None,
            stale: false,
            ticks: 0,
            reselect_every: config.reselect_every_ticks,
            stats: Arc::clone(&stats),
        };
        worker.reselect();
        if worker.active.is_none() {
            warn!("No active network interface found at startup, will keep looking");
        }

        let (shutdown, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(run(worker, interval, shutdown_rx, on_snapshot));

        info!(
            "Polling loop started (interval {} ms, reselect every {} ticks)",
            interval.as_millis(),
            config.reselect_every_ticks
        );

        Self {
            shutdown,
            handle: Some(handle),
            stats,
        }
    }

    /// Stops the loop and waits for it to finish.
    ///
    /// Idempotent. Once this returns no further snapshot is delivered; a tick
    /// still in flight when stop is requested completes but is discarded.
    pub async fn stop(&mut self) {
        let _ = self.shutdown.send(true);

        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                error!("Polling loop task failed: {}", e);
            }
            info!("Polling loop stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub fn stats(&self) -> Arc<TickStats> {
        Arc::clone(&self.stats)
    }
}

impl Drop for PollingLoop {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
    }
}

async fn run<F>(
    mut worker: Worker,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
    mut on_snapshot: F,
) where
    F: FnMut(Snapshot) + Send + 'static,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            _ = ticker.tick() => {}
        }

        let result = tokio::task::spawn_blocking(move || {
            let snapshot = worker.tick();
            (worker, snapshot)
        })
        .await;

        let snapshot = match result {
            Ok((returned, snapshot)) => {
                worker = returned;
                snapshot
            }
            Err(e) => {
                error!("Sampling tick failed: {}", e);
                break;
            }
        };

        if *shutdown.borrow() {
            debug!("Discarding snapshot of tick completed after stop request");
            worker
                .stats
                .dropped_snapshots
                .fetch_add(1, Ordering::Relaxed);
            break;
        }

        on_snapshot(snapshot);
    }
}
