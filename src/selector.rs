//! Active interface selection.
//!
//! Walks the interfaces in platform order and picks the first one that is up
//! and not a loopback. The policy can pin a specific name or skip virtual
//! adapters (bridges, veth pairs, tunnels).

use std::sync::Arc;
use tracing::{debug, warn};

use crate::collectors::{Interface, InterfaceKind, NetSource};

/// Selection knobs.
#[derive(Debug, Clone, Default)]
pub struct SelectionPolicy {
    /// Only this interface may be selected.
    pub pinned: Option<String>,
    /// Skip interfaces classified as virtual.
    pub exclude_virtual: bool,
}

impl SelectionPolicy {
    /// True if `iface` may become the active interface.
    pub fn accepts(&self, iface: &Interface) -> bool {
        if !iface.is_up() || iface.is_loopback() {
            return false;
        }
        if let Some(pinned) = &self.pinned {
            return iface.name == *pinned;
        }
        !(self.exclude_virtual && iface.kind == InterfaceKind::Virtual)
    }
}

/// Returns the first interface accepted by `policy`, in slice order.
pub fn select_from<'a>(interfaces: &'a [Interface], policy: &SelectionPolicy) -> Option<&'a Interface> {
    interfaces.iter().find(|iface| policy.accepts(iface))
}

/// Chooses the single interface to monitor.
pub struct InterfaceSelector {
    source: Arc<dyn NetSource>,
    policy: SelectionPolicy,
}

impl InterfaceSelector {
    pub fn new(source: Arc<dyn NetSource>, policy: SelectionPolicy) -> Self {
        Self { source, policy }
    }

    pub fn policy(&self) -> &SelectionPolicy {
        &self.policy
    }

    /// Enumerates interfaces and returns the first qualifying one.
    ///
    /// Enumeration failures are logged and reported as no active interface.
    pub fn select_active_interface(&self) -> Option<Interface> {
        let interfaces = match self.source.interfaces() {
            Ok(list) => list,
            Err(e) => {
                warn!("Interface enumeration failed: {}", e);
                return None;
            }
        };

        let selected = select_from(&interfaces, &self.policy).cloned();
        match &selected {
            Some(iface) => debug!(
                "Selected interface {} ({}, {}) out of {}",
                iface.name,
                iface.kind,
                iface.status,
                interfaces.len()
            ),
            None => debug!(
                "No qualifying interface among {} candidates",
                interfaces.len()
            ),
        }
        selected
    }
}
