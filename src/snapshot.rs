//! Per-tick snapshot values handed to the renderer.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::latency::ProbeResult;

/// Measurements of one tick on the active interface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkStats {
    pub interface: String,
    /// Download throughput in bits per second.
    pub download_bps: f64,
    /// Upload throughput in bits per second.
    pub upload_bps: f64,
    pub latency: ProbeResult,
    /// Bytes transferred over the trailing window.
    pub window_total_bytes: u64,
    /// Ticks currently covered by the window (grows until the window is full).
    pub window_ticks: usize,
    pub timestamp: DateTime<Utc>,
}

/// Immutable result of one tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Snapshot {
    /// No qualifying interface, or its counters could not be read.
    NoActiveNetwork { timestamp: DateTime<Utc> },
    Active(NetworkStats),
}

impl Snapshot {
    pub fn no_active_network() -> Self {
        Snapshot::NoActiveNetwork {
            timestamp: Utc::now(),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Snapshot::Active(_))
    }

    pub fn stats(&self) -> Option<&NetworkStats> {
        match self {
            Snapshot::Active(stats) => Some(stats),
            Snapshot::NoActiveNetwork { .. } => None,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Snapshot::NoActiveNetwork { timestamp } => *timestamp,
            Snapshot::Active(stats) => stats.timestamp,
        }
    }
}
