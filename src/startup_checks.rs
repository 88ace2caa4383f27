//! Startup requirement validation for herakles-netmon.
//!
//! This module validates that the monitor can read interface counters and
//! run latency probes before the polling loop starts.

use nix::unistd::geteuid;
use std::fs;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::{debug, error, info, warn};

/// Validate all runtime requirements
pub fn validate_requirements(ping_program: &str) -> Result<(), ValidationError> {
    info!("🔍 Validating runtime requirements...");

    check_netdev_access()?;
    check_sysfs_access();
    check_ping_program(ping_program)?;
    check_icmp_privileges();

    info!("✅ All runtime requirements validated");
    Ok(())
}

/// Check that /proc/net/dev is readable
fn check_netdev_access() -> Result<(), ValidationError> {
    let path = "/proc/net/dev";

    match fs::read_to_string(path) {
        Ok(content) => {
            let rows = content.lines().count().saturating_sub(2);
            info!("✅ {} readable ({} interfaces)", path, rows);
            Ok(())
        }
        Err(e) => {
            error!("❌ Cannot read {}: {}", path, e);
            error!("   Interface counters are unavailable, every tick will report no active network");
            Err(ValidationError::NetDevUnreadable(e.to_string()))
        }
    }
}

/// Check /sys/class/net presence (status and kind detection)
fn check_sysfs_access() {
    if Path::new("/sys/class/net").is_dir() {
        info!("✅ /sys/class/net available");
    } else {
        warn!("⚠️  /sys/class/net not found - interface status cannot be determined");
        warn!("   Only interfaces with a readable operstate can be selected");
    }
}

/// Check that the ping program can be spawned
fn check_ping_program(program: &str) -> Result<(), ValidationError> {
    let spawned = Command::new(program)
        .arg("-V")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match spawned {
        Ok(status) => {
            debug!("{} -V exited with {}", program, status);
            info!("✅ Ping program available: {}", program);
            Ok(())
        }
        Err(e) => {
            error!("❌ Cannot run '{}': {}", program, e);
            error!("   Latency will always be reported as unavailable");
            error!("   Solution: install iputils-ping or set ping_program in the config");
            Err(ValidationError::PingUnavailable(program.to_string(), e.to_string()))
        }
    }
}

/// Warn when unprivileged ICMP may be restricted
fn check_icmp_privileges() {
    if geteuid().is_root() {
        info!("✅ Running as root (uid=0)");
        return;
    }

    match fs::read_to_string("/proc/sys/net/ipv4/ping_group_range") {
        Ok(range) => debug!("net.ipv4.ping_group_range = {}", range.trim()),
        Err(e) => debug!("Cannot read ping_group_range: {}", e),
    }
    warn!("⚠️  Not running as root - latency probes rely on ping being setuid or capability-enabled");
}

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Cannot read /proc/net/dev: {0}")]
    NetDevUnreadable(String),

    #[error("Ping program '{0}' cannot be run: {1}")]
    PingUnavailable(String, String),
}
