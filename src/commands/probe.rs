//! Probe command implementation.
//!
//! Runs latency probes against the configured target and prints the results.

use std::time::Instant;

use herakles_netmon::format::format_latency;
use herakles_netmon::health_stats::RunningStat;
use herakles_netmon::{LatencyProbe, PingProbe};

use crate::config::Config;

/// Runs `count` probes, one after another.
pub fn command_probe(count: usize, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("📡 Herakles Network Monitor - Latency Probe");
    println!("============================================");

    let probe = PingProbe::with_program(config.ping_program());
    let target = config.probe_target();
    let timeout = config.probe_timeout();

    println!(
        "\n   Target: {} (timeout {} ms, via {})",
        target,
        timeout.as_millis(),
        probe.program()
    );

    let mut rtt = RunningStat::default();
    let mut failures = 0usize;
    let count = count.max(1);

    for attempt in 1..=count {
        let start = Instant::now();
        let result = probe.probe(target, timeout);
        let elapsed = start.elapsed();

        match result.as_millis() {
            Some(ms) => rtt.add(ms as f64),
            None => failures += 1,
        }

        println!(
            "   {} Probe {}/{}: {} (took {:.0} ms)",
            if result.is_reachable() { "✅" } else { "❌" },
            attempt,
            count,
            format_latency(&result),
            elapsed.as_secs_f64() * 1000.0
        );
    }

    println!("\n📋 Summary:");
    println!("   Replies: {}/{}", count - failures, count);
    if failures < count {
        println!("   Average round trip: {:.1} ms", rtt.avg());
    }

    Ok(())
}
