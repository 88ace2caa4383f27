//! Text rendering of snapshots.
//!
//! Rates are shown in Kbps (bits / 1024) and switch to Mbps from 1024 Kbps
//! on; window totals are shown in MB (bytes / 1024²) and switch to GB from
//! 1024 MB on. Both use two decimals.

use crate::latency::ProbeResult;
use crate::snapshot::Snapshot;

/// Text shown instead of measurements when no interface is active.
pub const NO_ACTIVE_NETWORK: &str = "No Active Network";

/// Formats a rate given in bits per second.
pub fn format_rate(bits_per_second: f64) -> String {
    let kbps = bits_per_second / 1024.0;
    if kbps >= 1024.0 {
        format!("{:.2} Mbps", kbps / 1024.0)
    } else {
        format!("{:.2} Kbps", kbps)
    }
}

/// Formats a byte total.
pub fn format_usage(bytes: u64) -> String {
    let mb = bytes as f64 / 1024.0 / 1024.0;
    if mb >= 1024.0 {
        format!("{:.2} GB", mb / 1024.0)
    } else {
        format!("{:.2} MB", mb)
    }
}

pub fn format_latency(latency: &ProbeResult) -> String {
    match latency {
        ProbeResult::RoundTrip { ms } => format!("{} ms", ms),
        ProbeResult::Unreachable => "unavailable".to_string(),
    }
}

/// Four-line text block for one snapshot.
pub fn render_text(snapshot: &Snapshot) -> String {
    match snapshot {
        Snapshot::NoActiveNetwork { .. } => NO_ACTIVE_NETWORK.to_string(),
        Snapshot::Active(stats) => format!(
            "D: {}\nU: {}\nPing: {}\nUsage: {}",
            format_rate(stats.download_bps),
            format_rate(stats.upload_bps),
            format_latency(&stats.latency),
            format_usage(stats.window_total_bytes),
        ),
    }
}

/// Single-line variant of `render_text`, prefixed with the interface name.
pub fn render_line(snapshot: &Snapshot) -> String {
    match snapshot {
        Snapshot::NoActiveNetwork { timestamp } => {
            format!("{} {}", timestamp.format("%H:%M:%S"), NO_ACTIVE_NETWORK)
        }
        Snapshot::Active(stats) => format!(
            "{} [{}] D: {} | U: {} | Ping: {} | Usage: {}",
            stats.timestamp.format("%H:%M:%S"),
            stats.interface,
            format_rate(stats.download_bps),
            format_rate(stats.upload_bps),
            format_latency(&stats.latency),
            format_usage(stats.window_total_bytes),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::NetworkStats;
    use chrono::Utc;

    #[test]
    fn test_rate_units() {
        assert_eq!(format_rate(0.0), "0.00 Kbps");
        assert_eq!(format_rate(8_192.0), "8.00 Kbps");
        // 1023.99 Kbps stays in Kbps
        assert_eq!(format_rate(1_048_565.0), "1023.99 Kbps");
        assert_eq!(format_rate(1_048_576.0), "1.00 Mbps");
        assert_eq!(format_rate(104_857_600.0), "100.00 Mbps");
    }

    #[test]
    fn test_usage_units() {
        assert_eq!(format_usage(0), "0.00 MB");
        assert_eq!(format_usage(1_572_864), "1.50 MB");
        assert_eq!(format_usage(1_073_741_824), "1.00 GB");
        assert_eq!(format_usage(5 * 1_073_741_824 / 2), "2.50 GB");
    }

    #[test]
    fn test_render_text() {
        let snap = Snapshot::Active(NetworkStats {
            interface: "eth0".into(),
            download_bps: 2_097_152.0,
            upload_bps: 51_200.0,
            latency: ProbeResult::RoundTrip { ms: 23 },
            window_total_bytes: 10_485_760,
            window_ticks: 4,
            timestamp: Utc::now(),
        });
        assert_eq!(
            render_text(&snap),
            "D: 2.00 Mbps\nU: 50.00 Kbps\nPing: 23 ms\nUsage: 10.00 MB"
        );
    }

    #[test]
    fn test_render_sentinel() {
        assert_eq!(render_text(&Snapshot::no_active_network()), NO_ACTIVE_NETWORK);
        assert!(render_line(&Snapshot::no_active_network()).ends_with(NO_ACTIVE_NETWORK));
    }

    #[test]
    fn test_render_unreachable() {
        assert_eq!(format_latency(&ProbeResult::Unreachable), "unavailable");
    }
}
