//! Integration tests for the polling loop.
//!
//! The loop runs against an in-memory host whose interfaces can be changed
//! while it is ticking.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use herakles_netmon::{
    CollectError, CounterPair, Interface, InterfaceKind, InterfaceSelector, LatencyProbe,
    NetSource, OperStatus, PollingConfig, PollingLoop, ProbeResult, RollingUsageAccumulator,
    SamplerConfig, SelectionPolicy, Snapshot, StatsSampler,
};

/// Bytes received per counter read on every interface.
const STEP: u64 = 1000;

/// In-memory host; each counter read advances the interface by `STEP`.
#[derive(Default)]
struct FakeHost {
    interfaces: Mutex<Vec<Interface>>,
    counters: Mutex<HashMap<String, CounterPair>>,
    /// Number of upcoming counter reads that fail with an I/O error.
    failing_reads: AtomicU64,
}

impl FakeHost {
    fn add(&self, name: &str, kind: InterfaceKind, start: u64) {
        let flags = if kind == InterfaceKind::Loopback { 0x9 } else { 0x1003 };
        self.interfaces.lock().unwrap().push(Interface {
            name: name.to_string(),
            status: OperStatus::Up,
            kind,
            flags,
            counters: CounterPair::default(),
        });
        self.counters
            .lock()
            .unwrap()
            .insert(name.to_string(), CounterPair::new(start, start));
    }

    fn fail_next_reads(&self, n: u64) {
        self.failing_reads.store(n, Ordering::SeqCst);
    }

    fn remove(&self, name: &str) {
        self.interfaces.lock().unwrap().retain(|i| i.name != name);
        self.counters.lock().unwrap().remove(name);
    }

    fn set_status(&self, name: &str, status: OperStatus) {
        for iface in self.interfaces.lock().unwrap().iter_mut() {
            if iface.name == name {
                iface.status = status;
            }
        }
    }
}

impl NetSource for FakeHost {
    fn interfaces(&self) -> Result<Vec<Interface>, CollectError> {
        Ok(self.interfaces.lock().unwrap().clone())
    }

    fn counters(&self, name: &str) -> Result<CounterPair, CollectError> {
        let failing = self
            .failing_reads
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if failing.is_ok() {
            return Err(CollectError::Io {
                path: "/proc/net/dev".into(),
                source: std::io::Error::other("device busy"),
            });
        }

        let mut counters = self.counters.lock().unwrap();
        let pair = counters
            .get_mut(name)
            .ok_or_else(|| CollectError::NotFound(name.to_string()))?;
        pair.bytes_received += STEP;
        Ok(*pair)
    }
}

struct FixedProbe;

impl LatencyProbe for FixedProbe {
    fn probe(&self, _target: &str, _timeout: Duration) -> ProbeResult {
        ProbeResult::RoundTrip { ms: 12 }
    }
}

type Collected = Arc<Mutex<Vec<Snapshot>>>;

fn start_loop(host: &Arc<FakeHost>, reselect_every_ticks: u64) -> (PollingLoop, Collected) {
    start_loop_with(
        host,
        PollingConfig {
            interval: Duration::from_millis(10),
            reselect_every_ticks,
        },
    )
}

fn start_loop_with(host: &Arc<FakeHost>, config: PollingConfig) -> (PollingLoop, Collected) {
    let source: Arc<dyn NetSource> = host.clone();
    let selector = InterfaceSelector::new(Arc::clone(&source), SelectionPolicy::default());
    let sampler = StatsSampler::new(
        source,
        Box::new(FixedProbe),
        RollingUsageAccumulator::new(10_000),
        SamplerConfig::default(),
    );

    let collected: Collected = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&collected);
    let poller = PollingLoop::start(
        config,
        selector,
        sampler,
        move |snapshot| sink.lock().unwrap().push(snapshot),
    );

    (poller, collected)
}

/// Waits until `cond` holds on the collected snapshots, up to two seconds.
async fn wait_for<F>(collected: &Collected, cond: F)
where
    F: Fn(&[Snapshot]) -> bool,
{
    for _ in 0..200 {
        if cond(&collected.lock().unwrap()) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached within 2s");
}

#[tokio::test]
async fn test_delivers_snapshots_for_active_interface() {
    let host = Arc::new(FakeHost::default());
    host.add("lo", InterfaceKind::Loopback, 0);
    host.add("eth0", InterfaceKind::Physical, 0);

    let (mut poller, collected) = start_loop(&host, 30);
    assert!(poller.is_running());

    wait_for(&collected, |s| s.len() >= 3).await;
    poller.stop().await;

    let snapshots = collected.lock().unwrap();
    let first = snapshots[0].stats().unwrap();
    assert_eq!(first.interface, "eth0");
    assert_eq!(first.download_bps, 0.0);
    assert_eq!(first.latency, ProbeResult::RoundTrip { ms: 12 });

    let second = snapshots[1].stats().unwrap();
    assert_eq!(second.download_bps, (STEP * 8) as f64);
    assert_eq!(second.upload_bps, 0.0);
    assert_eq!(second.window_total_bytes, STEP);
    assert!(snapshots[2].timestamp() >= snapshots[1].timestamp());
}

#[tokio::test]
async fn test_no_snapshots_after_stop() {
    let host = Arc::new(FakeHost::default());
    host.add("eth0", InterfaceKind::Physical, 0);

    let (mut poller, collected) = start_loop(&host, 30);
    wait_for(&collected, |s| s.len() >= 2).await;

    poller.stop().await;
    assert!(!poller.is_running());
    let delivered = collected.lock().unwrap().len();

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(collected.lock().unwrap().len(), delivered);

    let stats = poller.stats();
    let ticks = stats.ticks.load(Ordering::Relaxed);
    let dropped = stats.dropped_snapshots.load(Ordering::Relaxed);
    assert_eq!(ticks, delivered as u64 + dropped);
}

#[tokio::test]
async fn test_stop_is_idempotent() {
    let host = Arc::new(FakeHost::default());
    host.add("eth0", InterfaceKind::Physical, 0);

    let (mut poller, collected) = start_loop(&host, 30);
    wait_for(&collected, |s| !s.is_empty()).await;

    poller.stop().await;
    poller.stop().await;
    assert!(!poller.is_running());
}

#[tokio::test]
async fn test_interface_swap_does_not_spike_rate() {
    let host = Arc::new(FakeHost::default());
    host.add("eth0", InterfaceKind::Physical, 0);
    host.add("wlan0", InterfaceKind::Physical, 1_000_000_000_000);
    host.set_status("wlan0", OperStatus::Down);

    let (mut poller, collected) = start_loop(&host, 1);
    wait_for(&collected, |s| s.len() >= 3).await;

    host.set_status("eth0", OperStatus::Down);
    host.set_status("wlan0", OperStatus::Up);

    wait_for(&collected, |s| {
        s.iter()
            .filter_map(Snapshot::stats)
            .filter(|st| st.interface == "wlan0")
            .count()
            >= 3
    })
    .await;
    poller.stop().await;

    let snapshots = collected.lock().unwrap();
    let max_rate = (STEP * 8) as f64;
    for stats in snapshots.iter().filter_map(Snapshot::stats) {
        assert!(stats.download_bps <= max_rate, "spike on {}", stats.interface);
        assert!(stats.window_total_bytes < 1_000_000, "window absorbed counter jump");
    }

    let first_wlan = snapshots
        .iter()
        .filter_map(Snapshot::stats)
        .find(|st| st.interface == "wlan0")
        .unwrap();
    assert_eq!(first_wlan.download_bps, 0.0);
    assert_eq!(poller.stats().interface_swaps.load(Ordering::Relaxed), 1);
}

#[tokio::test]
async fn test_no_interface_then_recovery() {
    let host = Arc::new(FakeHost::default());
    host.add("lo", InterfaceKind::Loopback, 0);

    // Periodic re-selection off: recovery relies on per-tick selection while idle
    let (mut poller, collected) = start_loop(&host, 0);
    wait_for(&collected, |s| s.len() >= 2).await;
    assert!(collected
        .lock()
        .unwrap()
        .iter()
        .all(|s| matches!(s, Snapshot::NoActiveNetwork { .. })));

    host.add("eth0", InterfaceKind::Physical, 0);
    wait_for(&collected, |s| s.iter().any(Snapshot::is_active)).await;
    poller.stop().await;

    let snapshots = collected.lock().unwrap();
    let first_active = snapshots.iter().find_map(Snapshot::stats).unwrap();
    assert_eq!(first_active.interface, "eth0");
    assert_eq!(first_active.download_bps, 0.0);
    assert_eq!(first_active.window_total_bytes, 0);
    assert!(poller.stats().no_interface_ticks.load(Ordering::Relaxed) >= 2);
}

/// Asserts the window never grows by more than one counter step per tick.
fn assert_no_window_jump(snapshots: &[Snapshot]) {
    let totals: Vec<u64> = snapshots
        .iter()
        .filter_map(Snapshot::stats)
        .map(|st| st.window_total_bytes)
        .collect();
    for pair in totals.windows(2) {
        assert!(pair[1] <= pair[0] + STEP, "window jumped {:?}", pair);
    }
}

#[tokio::test]
async fn test_read_failure_reselects_same_interface() {
    let host = Arc::new(FakeHost::default());
    host.add("eth0", InterfaceKind::Physical, 0);

    // Periodic re-selection off: only the failed read triggers selection
    let (mut poller, collected) = start_loop(&host, 0);
    wait_for(&collected, |s| s.len() >= 3).await;
    let before = collected.lock().unwrap().len();

    host.fail_next_reads(2);
    wait_for(&collected, |s| {
        s[before..]
            .iter()
            .rposition(|snap| !snap.is_active())
            .is_some_and(|last_failed| before + last_failed + 1 < s.len())
    })
    .await;
    poller.stop().await;

    let snapshots = collected.lock().unwrap();
    let first_failed = snapshots
        .iter()
        .position(|snap| !snap.is_active())
        .unwrap();
    let failed = snapshots[first_failed..]
        .iter()
        .take_while(|snap| !snap.is_active())
        .count();
    assert_eq!(failed, 2);

    let recovered = snapshots[first_failed + failed].stats().unwrap();
    assert_eq!(recovered.interface, "eth0");
    assert_eq!(recovered.download_bps, 0.0);

    // Same interface again: the accumulator kept its baseline and counts the
    // single step since the last good read
    let last_good = snapshots[first_failed - 1].stats().unwrap();
    assert_eq!(
        recovered.window_total_bytes,
        last_good.window_total_bytes + STEP
    );
    assert_no_window_jump(&snapshots);

    let stats = poller.stats();
    assert_eq!(stats.counter_read_failures.load(Ordering::Relaxed), 2);
    assert_eq!(stats.interface_swaps.load(Ordering::Relaxed), 0);
}

#[tokio::test]
async fn test_vanished_interface_swaps_without_spike() {
    let host = Arc::new(FakeHost::default());
    host.add("eth0", InterfaceKind::Physical, 0);
    host.add("wlan0", InterfaceKind::Physical, 1_000_000_000_000);

    let (mut poller, collected) = start_loop(&host, 0);
    wait_for(&collected, |s| s.len() >= 3).await;

    host.remove("eth0");
    wait_for(&collected, |s| {
        s.iter()
            .filter_map(Snapshot::stats)
            .filter(|st| st.interface == "wlan0")
            .count()
            >= 2
    })
    .await;
    poller.stop().await;

    let snapshots = collected.lock().unwrap();
    assert!(snapshots
        .iter()
        .any(|s| matches!(s, Snapshot::NoActiveNetwork { .. })));

    let first_wlan = snapshots
        .iter()
        .filter_map(Snapshot::stats)
        .find(|st| st.interface == "wlan0")
        .unwrap();
    assert_eq!(first_wlan.download_bps, 0.0);
    assert_no_window_jump(&snapshots);

    let stats = poller.stats();
    assert_eq!(stats.counter_read_failures.load(Ordering::Relaxed), 1);
    assert_eq!(stats.interface_swaps.load(Ordering::Relaxed), 1);
}

#[tokio::test]
async fn test_zero_interval_is_clamped() {
    let host = Arc::new(FakeHost::default());
    host.add("eth0", InterfaceKind::Physical, 0);

    let (mut poller, collected) = start_loop_with(
        &host,
        PollingConfig {
            interval: Duration::ZERO,
            reselect_every_ticks: 30,
        },
    );
    wait_for(&collected, |s| s.len() >= 3).await;
    assert!(poller.is_running());

    poller.stop().await;
    assert!(collected.lock().unwrap().iter().all(Snapshot::is_active));
}
