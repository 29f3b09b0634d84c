//! # Readiness Coordinator
//!
//! Drives the device from "configuration requested" to "network usable",
//! optionally gated on a plausible wall clock.
//!
//! Two entry points share one lifecycle:
//!
//! * [`ReadinessCoordinator::setup`] applies the configuration and returns at
//!   once. A background worker waits for address-change events and then sets
//!   the "fully ready" signal, which callers consume with
//!   [`ReadinessCoordinator::wait_ready`] and their own timeout.
//! * [`ReadinessCoordinator::setup_and_wait`] applies the configuration and
//!   polls on the calling thread until the network is ready or the
//!   [`CancelToken`] fires.
//!
//! Either entry point may be used once per coordinator. The applied
//! configuration is never rolled back, whatever the outcome.
//!
//! **Known limitation:** once the address has been observed it is never
//! re-checked, so a later address loss does not bring the state back.

mod state;
mod strategy;

pub use state::ReadinessState;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use anyhow::Context;
use netready_common::network::{Address, AddressChange, InterfaceState, IpConfiguration};
use tracing::{debug, error, info, warn};

use crate::cancel::CancelToken;
use crate::config::ReadinessConfig;
use crate::error::ReadinessError;
use crate::ports::{AddressChangeCallback, Clock, InterfaceRepository, SubscriptionId};
use crate::signal::Signal;
use state::StateCell;
use strategy::{AddressProbe, AddressWait, EventWait, PollWait, Wait};

/// Why preparing the interface stopped.
enum Fault {
    /// Raised to the caller.
    Environment(ReadinessError),
    /// Retained and reported through the status.
    Unexpected(anyhow::Error),
}

impl From<anyhow::Error> for Fault {
    fn from(err: anyhow::Error) -> Self {
        Fault::Unexpected(err)
    }
}

struct Shared {
    network: Arc<dyn InterfaceRepository>,
    clock: Arc<dyn Clock>,
    config: ReadinessConfig,
    status: StateCell,
    setup_requested: AtomicBool,
    /// Bumped by every reset so stale workers can tell they were superseded.
    generation: AtomicU64,
    address_observed: Signal,
    ready: Signal,
    last_error: Mutex<Option<Arc<anyhow::Error>>>,
    applied: Mutex<Option<IpConfiguration>>,
    subscription: Mutex<Option<SubscriptionId>>,
}

/// Context object owning one readiness lifecycle.
///
/// Inject a single coordinator wherever readiness is needed; a device is
/// expected to run one at a time.
pub struct ReadinessCoordinator {
    shared: Arc<Shared>,
}

impl ReadinessCoordinator {
    pub fn new(
        network: Arc<dyn InterfaceRepository>,
        clock: Arc<dyn Clock>,
        config: ReadinessConfig,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                network,
                clock,
                config,
                status: StateCell::new(),
                setup_requested: AtomicBool::new(false),
                generation: AtomicU64::new(0),
                address_observed: Signal::new(),
                ready: Signal::new(),
                last_error: Mutex::new(None),
                applied: Mutex::new(None),
                subscription: Mutex::new(None),
            }),
        }
    }

    /// Event-driven setup.
    ///
    /// Applies `config` (DHCP with automatic DNS when `None`) and hands the
    /// wait to a background worker. Returns once the worker is running.
    ///
    /// # Errors
    /// * [`ReadinessError::AlreadySetUp`] if setup was already requested.
    /// * [`ReadinessError::NoInterface`] if no interface of the target type exists.
    ///
    /// Any other failure is retained, see [`last_error`](Self::last_error).
    pub fn setup(
        &self,
        config: Option<IpConfiguration>,
        requires_clock: bool,
    ) -> Result<(), ReadinessError> {
        self.claim()?;
        let shared = &self.shared;
        let generation = shared.generation.load(Ordering::Acquire);
        let (tx, rx) = mpsc::channel();

        let desired = config.as_ref().map(IpConfiguration::address);
        match shared.prepare(config, Some(tx)) {
            Ok(()) => {}
            Err(Fault::Environment(err)) => return Err(err),
            Err(Fault::Unexpected(err)) => {
                shared.fail(err);
                return Ok(());
            }
        }

        let worker_shared = Arc::clone(shared);
        let spawned = thread::Builder::new()
            .name("netready-worker".into())
            .spawn(move || {
                let events = EventWait::new(rx, worker_shared.config.poll_interval);
                worker_shared.run_worker(events, desired, requires_clock, generation);
            });

        if let Err(err) = spawned {
            shared.fail(anyhow::Error::new(err).context("failed to start the readiness worker"));
        }
        Ok(())
    }

    /// Polling setup that blocks the caller until ready or cancelled.
    ///
    /// Returns `Ok(true)` once the network is ready. `Ok(false)` means the
    /// token fired or an unexpected fault occurred; [`status`](Self::status)
    /// tells which.
    ///
    /// # Errors
    /// Same usage and environment errors as [`setup`](Self::setup).
    pub fn setup_and_wait(
        &self,
        config: Option<IpConfiguration>,
        token: &CancelToken,
        requires_clock: bool,
    ) -> Result<bool, ReadinessError> {
        self.claim()?;
        let shared = &self.shared;
        let desired = config.as_ref().map(IpConfiguration::address);

        match shared.prepare(config, None) {
            Ok(()) => {}
            Err(Fault::Environment(err)) => return Err(err),
            Err(Fault::Unexpected(err)) => {
                shared.fail(err);
                return Ok(false);
            }
        }

        let cancelled = || token.is_cancelled();
        let probe = AddressProbe {
            network: shared.network.as_ref(),
            target: shared.config.target,
            desired,
        };

        let mut polling = PollWait::new(shared.config.poll_interval);
        match polling.wait_for_address(&probe, &cancelled) {
            Ok(Wait::Satisfied) => shared.address_observed.set(),
            Ok(Wait::Cancelled) => {
                shared.expire(ReadinessState::TokenExpiredWaitingAddress);
                return Ok(false);
            }
            Err(err) => {
                shared.fail(err);
                return Ok(false);
            }
        }

        if requires_clock && shared.wait_for_clock(&cancelled) == Wait::Cancelled {
            shared.expire(ReadinessState::TokenExpiredWaitingClock);
            return Ok(false);
        }

        shared.mark_ready();
        Ok(true)
    }

    /// Waits for the "fully ready" signal.
    ///
    /// Returns `false` on timeout, or early once the coordinator has reached
    /// a failure state. A timeout leaves the background work running.
    pub fn wait_ready(&self, timeout: Duration) -> bool {
        self.shared.ready.wait_timeout(timeout)
    }

    pub fn status(&self) -> ReadinessState {
        self.shared.status.load()
    }

    pub fn is_ready(&self) -> bool {
        self.shared.ready.is_set()
    }

    pub fn is_address_observed(&self) -> bool {
        self.shared.address_observed.is_set()
    }

    /// The fault behind [`ReadinessState::ExceptionOccurred`].
    pub fn last_error(&self) -> Option<Arc<anyhow::Error>> {
        lock(&self.shared.last_error).clone()
    }

    /// Static configuration applied by setup. `None` for DHCP or before setup.
    pub fn applied_configuration(&self) -> Option<IpConfiguration> {
        lock(&self.shared.applied).clone()
    }

    pub fn config(&self) -> &ReadinessConfig {
        &self.shared.config
    }

    /// Returns the coordinator to [`ReadinessState::None`] so setup can run again.
    ///
    /// Test and tooling backdoor only. Calling it while a setup is in flight
    /// is unsupported; a background worker from the previous setup notices
    /// and stops without touching the new lifecycle.
    #[cfg(any(test, feature = "testing"))]
    pub fn reset(&self) {
        let shared = &self.shared;
        shared.generation.fetch_add(1, Ordering::AcqRel);
        shared.release_subscription();
        shared.ready.clear();
        shared.address_observed.clear();
        *lock(&shared.last_error) = None;
        *lock(&shared.applied) = None;
        shared.status.store(ReadinessState::None);
        shared.setup_requested.store(false, Ordering::Release);
        debug!("readiness coordinator reset");
    }

    /// Single-use guard.
    fn claim(&self) -> Result<(), ReadinessError> {
        self.shared
            .setup_requested
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(|_| ReadinessError::AlreadySetUp)
    }
}

impl Shared {
    /// Finds the target interface, subscribes when asked to, applies the
    /// configuration and lets it settle.
    fn prepare(
        &self,
        config: Option<IpConfiguration>,
        events: Option<Sender<AddressChange>>,
    ) -> Result<(), Fault> {
        self.status.store(ReadinessState::Started);
        debug!("network setup started for the {} interface", self.config.target);

        let interfaces = self
            .network
            .list_interfaces()
            .context("failed to list network interfaces")?;

        let Some(iface) = interfaces
            .iter()
            .find(|iface| iface.kind == self.config.target)
            .cloned()
        else {
            self.status.store(ReadinessState::FailedNoInterface);
            self.ready.abandon();
            let err = ReadinessError::NoInterface {
                target: self.config.target,
                found: interfaces.len(),
            };
            error!("{err}");
            return Err(Fault::Environment(err));
        };

        if let Some(tx) = events {
            let callback: AddressChangeCallback = Arc::new(move |change: &AddressChange| {
                // the worker may be gone already
                let _ = tx.send(change.clone());
            });
            let id = self
                .network
                .subscribe_address_changes(callback)
                .context("failed to subscribe to address changes")?;
            *lock(&self.subscription) = Some(id);
        }

        self.apply(&iface, config.as_ref())?;
        *lock(&self.applied) = config;

        thread::sleep(self.config.settle_delay);
        Ok(())
    }

    fn apply(&self, iface: &InterfaceState, config: Option<&IpConfiguration>) -> anyhow::Result<()> {
        let network = self.network.as_ref();
        match config {
            Some(cfg) => {
                debug!("applying static configuration {cfg} to {}", iface.name);
                network
                    .apply_static_ipv4(iface, cfg.address(), cfg.subnet_mask(), cfg.gateway())
                    .with_context(|| format!("failed to apply {cfg} to {}", iface.name))?;
                let dns = if cfg.dns().is_empty() {
                    network.apply_automatic_dns(iface)
                } else {
                    network.apply_static_dns(iface, cfg.dns())
                };
                dns.with_context(|| format!("failed to configure DNS on {}", iface.name))
            }
            None => {
                debug!("requesting DHCP on {}", iface.name);
                network
                    .apply_dhcp(iface)
                    .with_context(|| format!("failed to enable DHCP on {}", iface.name))?;
                network
                    .apply_automatic_dns(iface)
                    .with_context(|| format!("failed to configure DNS on {}", iface.name))
            }
        }
    }

    fn run_worker(
        &self,
        mut events: EventWait,
        desired: Option<Address>,
        requires_clock: bool,
        generation: u64,
    ) {
        let stale = || self.generation.load(Ordering::Acquire) != generation;
        let probe = AddressProbe {
            network: self.network.as_ref(),
            target: self.config.target,
            desired,
        };

        match events.wait_for_address(&probe, &stale) {
            Ok(Wait::Satisfied) => {}
            Ok(Wait::Cancelled) => {
                debug!("readiness worker superseded by reset");
                return;
            }
            Err(err) => {
                if !stale() {
                    self.fail(err);
                }
                return;
            }
        }

        // a reset may have started a new lifecycle while we were waiting
        if stale() {
            debug!("readiness worker superseded by reset");
            return;
        }
        self.address_observed.set();
        self.release_subscription();

        if requires_clock && self.wait_for_clock(&stale) == Wait::Cancelled {
            debug!("readiness worker superseded by reset");
            return;
        }

        if !stale() {
            self.mark_ready();
        }
    }

    fn wait_for_clock(&self, cancelled: &dyn Fn() -> bool) -> Wait {
        debug!("address ready, waiting for a plausible clock");
        strategy::wait_for_clock(
            self.clock.as_ref(),
            self.config.min_valid_year,
            self.config.clock_poll_interval,
            cancelled,
        )
    }

    fn mark_ready(&self) {
        self.status.store(ReadinessState::NetworkIsReady);
        self.ready.set();
        info!("network is ready on the {} interface", self.config.target);
    }

    fn expire(&self, state: ReadinessState) {
        self.release_subscription();
        self.status.store(state);
        self.ready.abandon();
        warn!("network setup {state}");
    }

    fn fail(&self, err: anyhow::Error) {
        error!("network setup failed: {err:#}");
        self.release_subscription();
        *lock(&self.last_error) = Some(Arc::new(err));
        self.status.store(ReadinessState::ExceptionOccurred);
        self.ready.abandon();
    }

    fn release_subscription(&self) {
        if let Some(id) = lock(&self.subscription).take() {
            self.network.unsubscribe_address_changes(id);
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ManualClock, MockNetwork};
    use netready_common::network::InterfaceType;

    fn addr(s: &str) -> Address {
        s.parse().unwrap()
    }

    fn fast_config() -> ReadinessConfig {
        ReadinessConfig::default()
            .with_poll_interval(Duration::from_millis(10))
            .with_clock_poll_interval(Duration::from_millis(5))
            .with_settle_delay(Duration::from_millis(1))
    }

    fn static_config() -> IpConfiguration {
        IpConfiguration::new(
            addr("192.168.1.111"),
            addr("255.255.255.0"),
            addr("192.168.1.1"),
        )
        .unwrap()
    }

    fn coordinator(network: &Arc<MockNetwork>, clock: &Arc<ManualClock>) -> ReadinessCoordinator {
        ReadinessCoordinator::new(network.clone(), clock.clone(), fast_config())
    }

    #[test]
    fn polling_static_configuration_becomes_ready() {
        let network = Arc::new(MockNetwork::ethernet());
        let clock = Arc::new(ManualClock::at_year(2024));
        let coordinator = coordinator(&network, &clock);

        let token = CancelToken::with_timeout(Duration::from_secs(5));
        let ready = coordinator
            .setup_and_wait(Some(static_config()), &token, false)
            .unwrap();

        assert!(ready);
        assert_eq!(coordinator.status(), ReadinessState::NetworkIsReady);
        assert!(coordinator.is_ready());
        assert!(coordinator.is_address_observed());
        assert_eq!(coordinator.applied_configuration(), Some(static_config()));
        assert_eq!(network.static_applied(), Some(addr("192.168.1.111")));
    }

    #[test]
    fn already_cancelled_token_fails_waiting_for_address() {
        let network = Arc::new(MockNetwork::ethernet());
        let clock = Arc::new(ManualClock::at_year(2024));
        let coordinator = coordinator(&network, &clock);

        let token = CancelToken::new();
        token.cancel();
        let ready = coordinator.setup_and_wait(None, &token, true).unwrap();

        assert!(!ready);
        assert_eq!(coordinator.status(), ReadinessState::TokenExpiredWaitingAddress);
        // configuration stays applied
        assert!(network.dhcp_applied());
        assert!(!coordinator.wait_ready(Duration::from_secs(1)));
    }

    #[test]
    fn second_setup_is_rejected_until_reset() {
        let network = Arc::new(MockNetwork::ethernet());
        let clock = Arc::new(ManualClock::at_year(2024));
        let coordinator = coordinator(&network, &clock);

        coordinator.setup(None, false).unwrap();
        assert_eq!(coordinator.setup(None, false), Err(ReadinessError::AlreadySetUp));
        let token = CancelToken::new();
        assert_eq!(
            coordinator.setup_and_wait(None, &token, false),
            Err(ReadinessError::AlreadySetUp)
        );

        assert!(coordinator.wait_ready(Duration::from_secs(5)));
        assert_eq!(coordinator.setup(None, false), Err(ReadinessError::AlreadySetUp));

        coordinator.reset();
        assert_eq!(coordinator.status(), ReadinessState::None);
        assert!(!coordinator.is_ready());
        assert!(coordinator.setup(None, false).is_ok());
        assert!(coordinator.wait_ready(Duration::from_secs(5)));
    }

    #[test]
    fn event_setup_waits_for_matching_event() {
        let network = Arc::new(MockNetwork::ethernet().with_delayed_assignment());
        let clock = Arc::new(ManualClock::at_year(2024));
        let coordinator = coordinator(&network, &clock);

        coordinator.setup(Some(static_config()), false).unwrap();
        assert!(!coordinator.wait_ready(Duration::from_millis(50)));
        assert_eq!(coordinator.status(), ReadinessState::Started);

        network.assign_pending();
        assert!(coordinator.wait_ready(Duration::from_secs(5)));
        assert_eq!(coordinator.status(), ReadinessState::NetworkIsReady);
        // worker dropped its subscription once the address showed up
        assert_eq!(network.subscriber_count(), 0);
    }

    #[test]
    fn event_setup_gated_on_clock() {
        let network = Arc::new(MockNetwork::ethernet());
        let clock = Arc::new(ManualClock::epoch());
        let coordinator = coordinator(&network, &clock);

        coordinator.setup(None, true).unwrap();
        assert!(!coordinator.wait_ready(Duration::from_millis(50)));
        assert!(coordinator.is_address_observed());

        clock.set_year(2025);
        assert!(coordinator.wait_ready(Duration::from_secs(5)));
    }

    #[test]
    fn missing_interface_is_raised() {
        let network = Arc::new(MockNetwork::new(Vec::new()));
        let clock = Arc::new(ManualClock::at_year(2024));
        let coordinator = coordinator(&network, &clock);

        assert_eq!(
            coordinator.setup(None, false),
            Err(ReadinessError::NoInterface {
                target: InterfaceType::Ethernet,
                found: 0
            })
        );
        assert_eq!(coordinator.status(), ReadinessState::FailedNoInterface);
        assert!(!coordinator.wait_ready(Duration::from_secs(1)));
    }

    #[test]
    fn configuration_fault_is_retained_not_raised() {
        let network = Arc::new(MockNetwork::ethernet().failing_on_apply("driver refused"));
        let clock = Arc::new(ManualClock::at_year(2024));
        let coordinator = coordinator(&network, &clock);

        let token = CancelToken::with_timeout(Duration::from_secs(5));
        let ready = coordinator
            .setup_and_wait(Some(static_config()), &token, false)
            .unwrap();

        assert!(!ready);
        assert_eq!(coordinator.status(), ReadinessState::ExceptionOccurred);
        let err = coordinator.last_error().expect("fault should be retained");
        assert!(format!("{err:#}").contains("driver refused"));
    }

    #[test]
    fn superseded_worker_leaves_new_lifecycle_alone() {
        let network = Arc::new(MockNetwork::ethernet());
        network.set_address("eth0", addr("192.168.1.111"));
        let clock = Arc::new(ManualClock::at_year(2024));
        let coordinator = coordinator(&network, &clock);
        let shared = Arc::clone(&coordinator.shared);

        let generation = shared.generation.load(Ordering::Acquire);
        coordinator.reset();
        *lock(&shared.subscription) = Some(SubscriptionId(42));

        let (_tx, rx) = mpsc::channel();
        let events = EventWait::new(rx, Duration::from_millis(10));
        shared.run_worker(events, None, false, generation);

        assert!(!coordinator.is_address_observed());
        assert!(!coordinator.is_ready());
        assert_eq!(*lock(&shared.subscription), Some(SubscriptionId(42)));
        assert_eq!(coordinator.status(), ReadinessState::None);
    }

    #[test]
    fn reset_stops_stale_worker() {
        let network = Arc::new(MockNetwork::ethernet().with_delayed_assignment());
        let clock = Arc::new(ManualClock::at_year(2024));
        let coordinator = coordinator(&network, &clock);

        coordinator.setup(None, false).unwrap();
        coordinator.reset();
        assert_eq!(network.subscriber_count(), 0);

        thread::sleep(Duration::from_millis(50));
        assert_eq!(coordinator.status(), ReadinessState::None);
        assert!(coordinator.last_error().is_none());
    }
}
