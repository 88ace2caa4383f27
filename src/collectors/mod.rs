//! Collectors module for network interface data.
//!
//! This module provides the `NetSource` seam the sampler reads through, and
//! the Linux implementation backed by /proc/net/dev and /sys/class/net.

pub mod interface;
pub mod netdev;

use std::path::PathBuf;

pub use interface::{Interface, InterfaceKind, OperStatus};
pub use netdev::{CounterPair, NetDevEntry};

/// Errors raised while reading interface data.
#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid {field} counter '{value}' for interface {interface}")]
    Parse {
        interface: String,
        field: &'static str,
        value: String,
    },

    #[error("Interface {0} not found")]
    NotFound(String),
}

/// Source of interface enumeration and byte counters.
pub trait NetSource: Send + Sync {
    /// All interfaces in platform order.
    fn interfaces(&self) -> Result<Vec<Interface>, CollectError>;

    /// Current cumulative counters of the named interface.
    fn counters(&self, name: &str) -> Result<CounterPair, CollectError>;
}

/// `NetSource` reading the proc and sys filesystems.
#[derive(Debug, Clone)]
pub struct SysfsNetSource {
    proc_root: PathBuf,
    sys_root: PathBuf,
}

impl SysfsNetSource {
    /// Source rooted at `/proc` and `/sys`.
    pub fn new() -> Self {
        Self::with_roots("/proc", "/sys")
    }

    /// Source rooted at custom directories (used with fake trees in tests).
    pub fn with_roots(proc_root: impl Into<PathBuf>, sys_root: impl Into<PathBuf>) -> Self {
        Self {
            proc_root: proc_root.into(),
            sys_root: sys_root.into(),
        }
    }
}

impl Default for SysfsNetSource {
    fn default() -> Self {
        Self::new()
    }
}

impl NetSource for SysfsNetSource {
    fn interfaces(&self) -> Result<Vec<Interface>, CollectError> {
        let entries = netdev::read_netdev(&self.proc_root)?;

        Ok(entries
            .into_iter()
            .map(|entry| {
                let (status, kind, flags) =
                    interface::read_interface_attrs(&self.sys_root, &entry.name);
                Interface {
                    name: entry.name,
                    status,
                    kind,
                    flags,
                    counters: entry.counters,
                }
            })
            .collect())
    }

    fn counters(&self, name: &str) -> Result<CounterPair, CollectError> {
        netdev::read_netdev(&self.proc_root)?
            .into_iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.counters)
            .ok_or_else(|| CollectError::NotFound(name.to_string()))
    }
}
