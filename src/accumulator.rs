//! Rolling usage accumulator.
//!
//! Turns raw cumulative interface counters into per-tick usage and keeps the
//! trailing-window total. The accumulator owns its own baseline, separate
//! from the sampler's rate baseline, so the two computations never depend on
//! each other's update order.

use tracing::debug;

use crate::ringbuffer::UsageWindow;

/// Default window length: one hour at one tick per second.
pub const DEFAULT_WINDOW_TICKS: usize = 3600;

/// Bytes transferred over the most recent `capacity` ticks.
#[derive(Debug, Clone)]
pub struct RollingUsageAccumulator {
    window: UsageWindow,
    last_total: Option<u64>,
    regressions: u64,
}

impl RollingUsageAccumulator {
    pub fn new(window_ticks: usize) -> Self {
        Self {
            window: UsageWindow::new(window_ticks),
            last_total: None,
            regressions: 0,
        }
    }

    /// Records one tick worth of counters and returns the window total.
    ///
    /// The first tick after construction or `rebaseline` only establishes the
    /// baseline and records zero usage. A total below the previous one
    /// (adapter reset, 32-bit counter wrap, reconnect) also records zero.
    pub fn record_tick(&mut self, current_received: u64, current_sent: u64) -> u64 {
        let total = current_received.saturating_add(current_sent);

        let tick_usage = match self.last_total {
            None => 0,
            Some(last) if total < last => {
                self.regressions += 1;
                debug!(
                    "Counter regression: total {} below previous {}, recording 0",
                    total, last
                );
                0
            }
            Some(last) => total - last,
        };

        self.window.push(tick_usage);
        self.last_total = Some(total);

        self.window.total()
    }

    /// Forgets the counter baseline while keeping the window contents.
    pub fn rebaseline(&mut self) {
        self.last_total = None;
    }

    pub fn window_total(&self) -> u64 {
        self.window.total()
    }

    /// Window total computed by walking every slot.
    pub fn recompute_total(&self) -> u64 {
        self.window.recompute_total()
    }

    pub fn window(&self) -> &UsageWindow {
        &self.window
    }

    pub fn has_baseline(&self) -> bool {
        self.last_total.is_some()
    }

    /// Number of ticks whose counters went backwards.
    pub fn regressions(&self) -> u64 {
        self.regressions
    }
}

impl Default for RollingUsageAccumulator {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_TICKS)
    }
}
