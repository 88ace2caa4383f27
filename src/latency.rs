//! Latency probing via ICMP echo.
//!
//! Raw ICMP sockets need privileges, so the probe drives the system `ping`
//! binary, which is setuid or capability-enabled on every mainstream
//! distribution. The child is polled against a hard deadline and killed when
//! it overruns, so a probe never blocks longer than its timeout plus a small
//! slack.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::io::Read;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};
use tracing::debug;

/// Extra time granted to the child beyond the probe timeout before it is killed.
pub const KILL_SLACK: Duration = Duration::from_millis(100);

/// Poll period while waiting for the child to exit.
const POLL_INTERVAL: Duration = Duration::from_millis(5);

static RTT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"time[=<]\s*([0-9]+(?:\.[0-9]+)?)\s*ms").expect("valid regex"));

/// Outcome of a single echo request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProbeResult {
    /// Round-trip time in whole milliseconds.
    RoundTrip { ms: u64 },
    Unreachable,
}

impl ProbeResult {
    pub fn as_millis(&self) -> Option<u64> {
        match self {
            ProbeResult::RoundTrip { ms } => Some(*ms),
            ProbeResult::Unreachable => None,
        }
    }

    pub fn is_reachable(&self) -> bool {
        matches!(self, ProbeResult::RoundTrip { .. })
    }
}

/// Measures round-trip time to a target.
///
/// Implementations must not panic and must return within `timeout` plus a
/// small scheduling slack; every failure maps to `Unreachable`.
pub trait LatencyProbe: Send {
    fn probe(&self, target: &str, timeout: Duration) -> ProbeResult;
}

/// `LatencyProbe` backed by the system ping binary.
#[derive(Debug, Clone)]
pub struct PingProbe {
    program: String,
    prefix_args: Vec<String>,
}

impl PingProbe {
    /// Probe using `ping` from `PATH`.
    pub fn new() -> Self {
        Self::with_program("ping")
    }

    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            prefix_args: Vec::new(),
        }
    }

    /// Arguments placed before the generated ping flags.
    pub fn with_prefix_args(mut self, args: Vec<String>) -> Self {
        self.prefix_args = args;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn build_args(&self, target: &str, timeout: Duration) -> Vec<String> {
        // iputils ping takes -W in whole seconds; round up so it never gives
        // up before our own deadline does.
        let wait_secs = timeout.as_millis().div_ceil(1000).max(1);

        let mut args = self.prefix_args.clone();
        args.extend([
            "-n".to_string(),
            "-c".to_string(),
            "1".to_string(),
            "-W".to_string(),
            wait_secs.to_string(),
            target.to_string(),
        ]);
        args
    }

    fn run(&self, target: &str, timeout: Duration) -> Result<u64, String> {
        let deadline = timeout + KILL_SLACK;

        let mut child = Command::new(&self.program)
            .args(self.build_args(target, timeout))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| format!("failed to spawn {}: {}", self.program, e))?;

        let start = Instant::now();
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    if start.elapsed() >= deadline {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(format!("no reply within {} ms", timeout.as_millis()));
                    }
                    std::thread::sleep(POLL_INTERVAL);
                }
                Err(e) => {
                    let _ = child.kill();
                    return Err(format!("failed to wait for {}: {}", self.program, e));
                }
            }
        };

        if !status.success() {
            return Err(format!("{} exited with {}", self.program, status));
        }

        let mut output = String::new();
        if let Some(mut stdout) = child.stdout.take() {
            stdout
                .read_to_string(&mut output)
                .map_err(|e| format!("failed to read output: {}", e))?;
        }

        parse_round_trip_ms(&output).ok_or_else(|| "no round-trip time in output".to_string())
    }
}

impl Default for PingProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl LatencyProbe for PingProbe {
    fn probe(&self, target: &str, timeout: Duration) -> ProbeResult {
        match self.run(target, timeout) {
            Ok(ms) => ProbeResult::RoundTrip { ms },
            Err(reason) => {
                debug!("Probe to {} unreachable: {}", target, reason);
                ProbeResult::Unreachable
            }
        }
    }
}

/// Extracts the round-trip time from ping output, rounded to whole milliseconds.
pub fn parse_round_trip_ms(output: &str) -> Option<u64> {
    let caps = RTT_RE.captures(output)?;
    let ms: f64 = caps.get(1)?.as_str().parse().ok()?;
    Some(ms.round() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_iputils_reply() {
        let out = "PING 8.8.8.8 (8.8.8.8) 56(84) bytes of data.\n\
                   64 bytes from 8.8.8.8: icmp_seq=1 ttl=117 time=12.6 ms\n";
        assert_eq!(parse_round_trip_ms(out), Some(13));
    }

    #[test]
    fn test_parse_sub_millisecond_reply() {
        assert_eq!(parse_round_trip_ms("time=0.045 ms"), Some(0));
        assert_eq!(parse_round_trip_ms("time<1ms"), Some(1));
        assert_eq!(parse_round_trip_ms("time=7 ms"), Some(7));
    }

    #[test]
    fn test_parse_no_reply() {
        let out = "1 packets transmitted, 0 received, 100% packet loss, time 0ms\n";
        assert_eq!(parse_round_trip_ms(out), None);
    }

    #[test]
    fn test_wait_seconds_round_up() {
        let probe = PingProbe::new();
        let args = probe.build_args("1.1.1.1", Duration::from_millis(1500));
        assert_eq!(args, vec!["-n", "-c", "1", "-W", "2", "1.1.1.1"]);

        let args = probe.build_args("1.1.1.1", Duration::from_millis(200));
        assert_eq!(args[4], "1");
    }

    #[test]
    fn test_missing_binary_is_unreachable() {
        let probe = PingProbe::with_program("/nonexistent/herakles-ping");
        assert_eq!(
            probe.probe("8.8.8.8", Duration::from_millis(100)),
            ProbeResult::Unreachable
        );
    }

    #[test]
    fn test_as_millis() {
        assert_eq!(ProbeResult::RoundTrip { ms: 4 }.as_millis(), Some(4));
        assert_eq!(ProbeResult::Unreachable.as_millis(), None);
        assert!(!ProbeResult::Unreachable.is_reachable());
    }
}
