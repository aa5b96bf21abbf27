//! Periodic protocol work.
//!
//! Two jobs per local interface: a 1905 topology discovery and an
//! LLDP bridge discovery, each every 60 seconds by default. Every
//! interface gets a randomized initial offset so a node with many
//! interfaces does not emit its discoveries in a convoy. A third job
//! drives the autoconfiguration retry state machine.
//!
//! The schedule itself is plain data ([`PeriodicSchedule`]) driven by
//! a single worker thread; asynchronous triggers (new neighbor,
//! notification, renew) bypass the schedule entirely and are sent
//! straight from the dispatcher.

use std::{
    sync::Arc,
    thread::{spawn, JoinHandle},
    time::{Duration, Instant},
};

use log::{debug, warn};
use parking_lot::{Condvar, Mutex};
use rand::Rng;

use crate::{al::AlContext, consts::tlv::FreqBand, types::MacAddr};

/// Period of the 1905 topology discovery job.
pub const DISCOVERY_PERIOD: Duration = Duration::from_secs(60);

/// Default period of the LLDP bridge discovery job.
pub const BRIDGE_DISCOVERY_PERIOD: Duration = Duration::from_secs(60);

/// How often the autoconfiguration retry machinery is polled.
const AUTOCONFIG_TICK: Duration = Duration::from_secs(1);

/// One kind of periodic work.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum JobKind {
    /// Multicast a topology discovery on the named interface.
    TopologyDiscovery(String),
    /// Multicast an LLDP bridge discovery on the named interface.
    BridgeDiscovery(String),
    /// Drive autoconfiguration timeouts.
    AutoconfigTick,
}

struct Job {
    kind: JobKind,
    next: Instant,
    period: Duration,
}

/// The deadline table for one AL node's periodic work.
pub struct PeriodicSchedule {
    jobs: Vec<Job>,
}

impl PeriodicSchedule {
    /// Build the schedule for a set of interfaces, with a random
    /// initial offset per interface job.
    pub fn new(interfaces: &[String], now: Instant, bridge_discovery_period: Duration) -> Self {
        let mut rng = rand::thread_rng();
        let mut jobs = Vec::with_capacity(interfaces.len() * 2 + 1);
        for interface in interfaces {
            let offset = Duration::from_millis(
                rng.gen_range(0..DISCOVERY_PERIOD.as_millis() as u64),
            );
            jobs.push(Job {
                kind: JobKind::TopologyDiscovery(interface.clone()),
                next: now + offset,
                period: DISCOVERY_PERIOD,
            });
            let offset = Duration::from_millis(
                rng.gen_range(0..bridge_discovery_period.as_millis() as u64),
            );
            jobs.push(Job {
                kind: JobKind::BridgeDiscovery(interface.clone()),
                next: now + offset,
                period: bridge_discovery_period,
            });
        }
        jobs.push(Job {
            kind: JobKind::AutoconfigTick,
            next: now + AUTOCONFIG_TICK,
            period: AUTOCONFIG_TICK,
        });
        PeriodicSchedule { jobs }
    }

    /// The earliest pending deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.jobs.iter().map(|job| job.next).min()
    }

    /// Pop every job due at `now`, advancing each past `now` so a
    /// stalled thread cannot build up a burst.
    pub fn due(&mut self, now: Instant) -> Vec<JobKind> {
        let mut due = Vec::new();
        for job in &mut self.jobs {
            if job.next <= now {
                due.push(job.kind.clone());
                while job.next <= now {
                    job.next += job.period;
                }
            }
        }
        due
    }
}

/// Handle of the running scheduler thread.
pub struct Scheduler {
    shutdown: Arc<(Mutex<bool>, Condvar)>,
    handle: Option<JoinHandle<()>>,
}

impl Scheduler {
    /// Spawn the scheduler thread for an AL context.
    pub fn spawn(al: Arc<AlContext>, bridge_discovery_period: Duration) -> Self {
        let shutdown = Arc::new((Mutex::new(false), Condvar::new()));
        let thread_shutdown = Arc::clone(&shutdown);
        let handle = spawn(move || {
            let now = Instant::now();
            let interfaces = al.platform_interfaces();
            let mut schedule = PeriodicSchedule::new(&interfaces, now, bridge_discovery_period);
            loop {
                let deadline = schedule
                    .next_deadline()
                    .unwrap_or_else(|| Instant::now() + AUTOCONFIG_TICK);
                {
                    let (lock, condvar) = &*thread_shutdown;
                    let mut stopped = lock.lock();
                    if !*stopped {
                        let timeout = deadline.saturating_duration_since(Instant::now());
                        let _ = condvar.wait_for(&mut stopped, timeout);
                    }
                    if *stopped {
                        break;
                    }
                }
                let now = Instant::now();
                for job in schedule.due(now) {
                    run_job(&al, job, now);
                }
            }
            debug!("scheduler thread exiting");
        });
        Scheduler {
            shutdown,
            handle: Some(handle),
        }
    }

    /// Stop the scheduler and join its thread.
    pub fn stop(mut self) {
        self.stop_inner();
    }

    fn stop_inner(&mut self) {
        {
            let (lock, condvar) = &*self.shutdown;
            *lock.lock() = true;
            condvar.notify_all();
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.stop_inner();
    }
}

fn run_job(al: &AlContext, job: JobKind, now: Instant) {
    match job {
        JobKind::TopologyDiscovery(interface) => {
            if let Err(err) = al.send_topology_discovery(&interface, al.next_mid()) {
                warn!("periodic topology discovery on {interface} failed: {err}");
            }
        }
        JobKind::BridgeDiscovery(interface) => {
            if let Err(err) = al.send_lldp_bridge_discovery(&interface) {
                warn!("periodic bridge discovery on {interface} failed: {err}");
            }
        }
        JobKind::AutoconfigTick => {
            let radios = al.autoconfig_tick(now);
            let bands = al.bands_of_radios(&radios);
            for band in bands {
                if let Err(err) = al.send_ap_autoconfig_search(band) {
                    warn!("autoconfiguration search retry failed: {err}");
                }
            }
        }
    }
}

impl AlContext {
    /// Interface names as the platform reports them.
    pub(crate) fn platform_interfaces(&self) -> Vec<String> {
        self.platform.interfaces()
    }

    /// Run enrollee timeouts; returns radios whose search expired.
    pub(crate) fn autoconfig_tick(&self, now: Instant) -> Vec<MacAddr> {
        self.autoconfig.lock().tick(now)
    }

    /// Distinct bands of the given (still unconfigured) radios.
    pub(crate) fn bands_of_radios(&self, radios: &[MacAddr]) -> Vec<FreqBand> {
        let db = self.db.lock();
        let mut bands = Vec::new();
        for radio in db.radios() {
            if !radios.contains(&radio.uid) || !radio.is_unconfigured() {
                continue;
            }
            for band in &radio.bands {
                if !bands.contains(band) {
                    bands.push(*band);
                }
            }
        }
        bands
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use std::sync::Arc;

    use crate::{
        al::{AlConfigBuilder, AlContext},
        platform::{testing::FakePlatform, Platform},
    };

    #[test]
    fn test_every_interface_gets_both_jobs() {
        let interfaces = vec!["eth0".to_string(), "wlan0".to_string()];
        let now = Instant::now();
        let mut schedule = PeriodicSchedule::new(&interfaces, now, BRIDGE_DISCOVERY_PERIOD);
        // Everything fires within the first full period.
        let due = schedule.due(now + DISCOVERY_PERIOD + AUTOCONFIG_TICK);
        assert_eq!(due.len(), 5);
        for interface in &interfaces {
            assert!(due.contains(&JobKind::TopologyDiscovery(interface.clone())));
            assert!(due.contains(&JobKind::BridgeDiscovery(interface.clone())));
        }
        assert!(due.contains(&JobKind::AutoconfigTick));
    }

    #[test]
    fn test_due_jobs_rearm_past_now() {
        let interfaces = vec!["eth0".to_string()];
        let now = Instant::now();
        let mut schedule = PeriodicSchedule::new(&interfaces, now, BRIDGE_DISCOVERY_PERIOD);
        // Stall three periods, then drain: each job fires once, not
        // three times.
        let late = now + DISCOVERY_PERIOD * 3;
        let first = schedule.due(late);
        assert_eq!(
            first
                .iter()
                .filter(|job| matches!(job, JobKind::TopologyDiscovery(_)))
                .count(),
            1
        );
        // And the next deadline is in the future.
        assert!(schedule.next_deadline().unwrap() > late);
    }

    #[test]
    fn test_scheduler_thread_starts_and_stops() {
        let mut platform = FakePlatform::new();
        platform.add_ethernet_interface("eth0", crate::types::MacAddr([2, 0, 0, 0, 1, 1]));
        let al = Arc::new(AlContext::new(
            AlConfigBuilder::default()
                .al_mac(crate::types::MacAddr([2, 0, 0, 0, 0, 1]))
                .build()
                .unwrap(),
            Arc::new(platform) as Arc<dyn Platform>,
        ));
        let scheduler = Scheduler::spawn(Arc::clone(&al), BRIDGE_DISCOVERY_PERIOD);
        scheduler.stop();
    }
}
