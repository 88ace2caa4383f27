//! Interface status and kind from /sys/class/net.

use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::Path;

use super::netdev::CounterPair;

/// Operational status as reported by `operstate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperStatus {
    Up,
    Down,
    Unknown,
}

/// Coarse classification of a network adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InterfaceKind {
    Loopback,
    Physical,
    Virtual,
}

/// A network adapter as seen at enumeration time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Interface {
    pub name: String,
    pub status: OperStatus,
    pub kind: InterfaceKind,
    /// Raw `IFF_*` flags, zero when unreadable.
    pub flags: u32,
    pub counters: CounterPair,
}

impl Interface {
    /// True when the adapter is passing traffic.
    ///
    /// tun/ppp style devices report an `unknown` operstate while up, so those
    /// count as up when the administrative `IFF_UP` flag is set.
    pub fn is_up(&self) -> bool {
        match self.status {
            OperStatus::Up => true,
            OperStatus::Down => false,
            OperStatus::Unknown => self.flags & libc::IFF_UP as u32 != 0,
        }
    }

    pub fn is_loopback(&self) -> bool {
        self.kind == InterfaceKind::Loopback
    }
}

impl fmt::Display for OperStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperStatus::Up => f.pad("up"),
            OperStatus::Down => f.pad("down"),
            OperStatus::Unknown => f.pad("unknown"),
        }
    }
}

impl fmt::Display for InterfaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterfaceKind::Loopback => f.pad("loopback"),
            InterfaceKind::Physical => f.pad("physical"),
            InterfaceKind::Virtual => f.pad("virtual"),
        }
    }
}

/// Parses the content of `/sys/class/net/<iface>/operstate`.
pub fn parse_operstate(raw: &str) -> OperStatus {
    match raw.trim() {
        "up" => OperStatus::Up,
        "down" | "lowerlayerdown" | "notpresent" | "dormant" => OperStatus::Down,
        _ => OperStatus::Unknown,
    }
}

/// Parses the hex content of `/sys/class/net/<iface>/flags` (e.g. `0x1003`).
pub fn parse_flags(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    let hex = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .unwrap_or(raw);
    u32::from_str_radix(hex, 16).ok()
}

/// Reads status, flags and kind of `name` below `sys_root`.
///
/// Missing sysfs entries are not an error: the interface is reported with
/// `Unknown` status and no flags, which keeps it out of selection.
pub fn read_interface_attrs(sys_root: &Path, name: &str) -> (OperStatus, InterfaceKind, u32) {
    let class_dir = sys_root.join("class/net").join(name);

    let status = fs::read_to_string(class_dir.join("operstate"))
        .map(|s| parse_operstate(&s))
        .unwrap_or(OperStatus::Unknown);

    let flags = fs::read_to_string(class_dir.join("flags"))
        .ok()
        .and_then(|s| parse_flags(&s))
        .unwrap_or(0);

    let kind = if flags & libc::IFF_LOOPBACK as u32 != 0 {
        InterfaceKind::Loopback
    } else if sys_root.join("devices/virtual/net").join(name).exists() {
        InterfaceKind::Virtual
    } else {
        InterfaceKind::Physical
    };

    (status, kind, flags)
}
