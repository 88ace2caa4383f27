//! Network interface byte counters from /proc/net/dev.
//!
//! The kernel lists interfaces in registration order, which is also the order
//! the interface selector walks when looking for the first usable adapter.

use serde::Serialize;
use std::fs;
use std::path::Path;

use super::CollectError;

/// Cumulative byte counters of a single interface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CounterPair {
    pub bytes_received: u64,
    pub bytes_sent: u64,
}

impl CounterPair {
    pub fn new(bytes_received: u64, bytes_sent: u64) -> Self {
        Self {
            bytes_received,
            bytes_sent,
        }
    }

    /// Received plus sent, saturating at `u64::MAX`.
    pub fn total(&self) -> u64 {
        self.bytes_received.saturating_add(self.bytes_sent)
    }
}

/// One row of /proc/net/dev.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetDevEntry {
    pub name: String,
    pub counters: CounterPair,
}

/// Reads /proc/net/dev below `proc_root` and returns the rows in file order.
pub fn read_netdev(proc_root: &Path) -> Result<Vec<NetDevEntry>, CollectError> {
    let path = proc_root.join("net/dev");
    let content = fs::read_to_string(&path).map_err(|source| CollectError::Io {
        path: path.clone(),
        source,
    })?;

    parse_netdev(&content)
}

/// Parses the content of /proc/net/dev.
///
/// Header lines and malformed rows are skipped; an unparsable byte counter on
/// an otherwise well-formed row is an error since silently reading it as zero
/// would show up as a counter reset downstream.
pub fn parse_netdev(content: &str) -> Result<Vec<NetDevEntry>, CollectError> {
    let mut entries = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        // Skip the first two header lines
        if idx < 2 {
            continue;
        }

        let Some((name, stats)) = line.split_once(':') else {
            continue;
        };

        let name = name.trim();
        let values: Vec<&str> = stats.split_whitespace().collect();
        if name.is_empty() || values.len() < 16 {
            continue;
        }

        let bytes_received = parse_counter(name, "receive_bytes", values[0])?;
        let bytes_sent = parse_counter(name, "transmit_bytes", values[8])?;

        entries.push(NetDevEntry {
            name: name.to_string(),
            counters: CounterPair::new(bytes_received, bytes_sent),
        });
    }

    Ok(entries)
}

fn parse_counter(interface: &str, field: &'static str, raw: &str) -> Result<u64, CollectError> {
    raw.parse().map_err(|_| CollectError::Parse {
        interface: interface.to_string(),
        field,
        value: raw.to_string(),
    })
}
