//! Herakles Network Monitor Library
//!
//! This library samples the active network interface of a Linux host once
//! per tick and derives three live metrics: download/upload throughput,
//! round-trip latency to a reference host and the bytes transferred over a
//! trailing window.
//!
//! # Features
//!
//! - **Interface Selection**: first up, non-loopback interface in kernel order,
//!   optionally pinned or restricted to non-virtual adapters
//! - **Delta Rates**: bits per second from cumulative byte counters, zero on the
//!   first tick and on counter resets
//! - **Rolling Usage Window**: fixed-size ringbuffer with an O(1) running sum
//! - **Latency Probing**: one ICMP echo per tick with a hard deadline
//! - **Non-overlapping Polling**: a single worker drives every tick
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use herakles_netmon::{
//!     format, InterfaceSelector, PingProbe, PollingConfig, PollingLoop,
//!     RollingUsageAccumulator, SamplerConfig, SelectionPolicy, StatsSampler,
//!     SysfsNetSource,
//! };
//!
//! # async fn demo() {
//! let source = Arc::new(SysfsNetSource::new());
//! let selector = InterfaceSelector::new(source.clone(), SelectionPolicy::default());
//! let sampler = StatsSampler::new(
//!     source,
//!     Box::new(PingProbe::new()),
//!     RollingUsageAccumulator::new(3600),
//!     SamplerConfig::default(),
//! );
//!
//! let mut poller = PollingLoop::start(PollingConfig::default(), selector, sampler, |snapshot| {
//!     println!("{}", format::render_text(&snapshot));
//! });
//!
//! tokio::time::sleep(std::time::Duration::from_secs(5)).await;
//! poller.stop().await;
//! # }
//! ```

pub mod accumulator;
pub mod collectors;
pub mod format;
pub mod health_stats;
pub mod latency;
pub mod poller;
pub mod ringbuffer;
pub mod sampler;
pub mod selector;
pub mod snapshot;

// Re-export main types for convenience
pub use accumulator::{RollingUsageAccumulator, DEFAULT_WINDOW_TICKS};
pub use collectors::{
    CollectError, CounterPair, Interface, InterfaceKind, NetSource, OperStatus, SysfsNetSource,
};
pub use health_stats::TickStats;
pub use latency::{LatencyProbe, PingProbe, ProbeResult};
pub use poller::{PollingConfig, PollingLoop};
pub use ringbuffer::UsageWindow;
pub use sampler::{SamplerConfig, StatsSampler};
pub use selector::{InterfaceSelector, SelectionPolicy};
pub use snapshot::{NetworkStats, Snapshot};
