//! Interfaces command implementation.
//!
//! Lists enumerated interfaces and marks the one the selector would monitor.

use herakles_netmon::format::format_usage;
use herakles_netmon::selector::select_from;
use herakles_netmon::{NetSource, SysfsNetSource};

use crate::config::Config;

/// Lists network interfaces in kernel order.
pub fn command_interfaces(verbose: bool, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("🌐 Herakles Network Monitor - Interfaces");
    println!("========================================");

    let source = SysfsNetSource::new();
    let interfaces = source.interfaces()?;
    let policy = config.selection_policy();
    let selected = select_from(&interfaces, &policy).map(|i| i.name.clone());

    if interfaces.is_empty() {
        println!("\n   ❌ No interfaces found in /proc/net/dev");
        return Ok(());
    }

    println!();
    for iface in &interfaces {
        let marker = if selected.as_deref() == Some(iface.name.as_str()) {
            "▶"
        } else {
            " "
        };
        println!(
            " {} {:<16} {:<8} {:<9} rx {:>12}  tx {:>12}",
            marker,
            iface.name,
            iface.status,
            iface.kind,
            format_usage(iface.counters.bytes_received),
            format_usage(iface.counters.bytes_sent),
        );
        if verbose {
            println!(
                "   ├─ flags: {:#06x}, usable: {}",
                iface.flags,
                policy.accepts(iface)
            );
            println!(
                "   └─ bytes: rx {} / tx {}",
                iface.counters.bytes_received, iface.counters.bytes_sent
            );
        }
    }

    println!("\n📋 Summary:");
    match selected {
        Some(name) => println!("   ✅ Would monitor: {}", name),
        None => match &policy.pinned {
            Some(pinned) => println!("   ❌ Pinned interface '{}' is not up", pinned),
            None => println!("   ❌ No up, non-loopback interface - no active network"),
        },
    }

    Ok(())
}
