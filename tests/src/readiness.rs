use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use netready_common::network::{Address, InterfaceState, InterfaceType, IpConfiguration};
use netready_core::ports::InterfaceRepository;
use netready_core::testing::{DHCP_LEASE, ManualClock, MockNetwork};
use netready_core::{
    CancelToken, ReadinessConfig, ReadinessCoordinator, ReadinessError, ReadinessState,
};

fn config() -> ReadinessConfig {
    ReadinessConfig::default()
        .with_poll_interval(Duration::from_millis(10))
        .with_clock_poll_interval(Duration::from_millis(5))
        .with_settle_delay(Duration::from_millis(1))
}

fn office_lan() -> IpConfiguration {
    IpConfiguration::from_cidr("10.20.0.15/16", "10.20.0.1".parse().unwrap())
        .unwrap()
        .with_dns(vec!["10.20.0.2".parse().unwrap(), "1.1.1.1".parse().unwrap()])
        .unwrap()
}

/*************************************************************
                    Polling setup
**************************************************************/

#[test]
fn static_configuration_with_dns_is_ready() {
    let network = Arc::new(MockNetwork::ethernet());
    let clock = Arc::new(ManualClock::at_year(2025));
    let coordinator = ReadinessCoordinator::new(network.clone(), clock, config());

    let token = CancelToken::with_timeout(Duration::from_secs(5));
    let ready = coordinator
        .setup_and_wait(Some(office_lan()), &token, true)
        .expect("setup should succeed");

    assert!(ready);
    assert_eq!(coordinator.status(), ReadinessState::NetworkIsReady);
    assert_eq!(network.static_applied(), Some("10.20.0.15".parse().unwrap()));
    assert_eq!(network.static_dns().len(), 2);
    assert!(!network.dhcp_applied());
}

#[test]
fn dhcp_with_unset_clock_expires_waiting_for_clock() {
    let network = Arc::new(MockNetwork::ethernet());
    let clock = Arc::new(ManualClock::epoch());
    let coordinator = ReadinessCoordinator::new(network.clone(), clock, config());

    let token = CancelToken::with_timeout(Duration::from_millis(200));
    let ready = coordinator.setup_and_wait(None, &token, true).unwrap();

    assert!(!ready);
    assert!(network.dhcp_applied());
    assert!(coordinator.is_address_observed());
    assert_eq!(coordinator.status(), ReadinessState::TokenExpiredWaitingClock);
    assert_eq!(coordinator.applied_configuration(), None);
}

#[test]
fn clock_set_while_waiting_completes_setup() {
    let network = Arc::new(MockNetwork::ethernet());
    let clock = Arc::new(ManualClock::epoch());
    let coordinator = ReadinessCoordinator::new(network, clock.clone(), config());

    let setter = {
        let clock = clock.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            clock.set_year(2024);
        })
    };

    let token = CancelToken::with_timeout(Duration::from_secs(5));
    assert!(coordinator.setup_and_wait(None, &token, true).unwrap());
    setter.join().unwrap();
    assert_eq!(coordinator.status(), ReadinessState::NetworkIsReady);
}

#[test]
fn missing_interface_is_an_error() {
    let network = Arc::new(MockNetwork::new(vec![
        InterfaceState::new("lo", InterfaceType::Loopback).with_ipv4(Address::LOOPBACK),
    ]));
    let coordinator =
        ReadinessCoordinator::new(network, Arc::new(ManualClock::at_year(2025)), config());

    let token = CancelToken::new();
    let result = coordinator.setup_and_wait(None, &token, false);

    assert_eq!(
        result,
        Err(ReadinessError::NoInterface { target: InterfaceType::Ethernet, found: 1 })
    );
    assert_eq!(coordinator.status(), ReadinessState::FailedNoInterface);
}

#[test]
fn no_interfaces_at_all() {
    let network = Arc::new(MockNetwork::new(Vec::new()));
    let coordinator =
        ReadinessCoordinator::new(network, Arc::new(ManualClock::at_year(2025)), config());

    let result = coordinator.setup(None, false);

    assert!(matches!(result, Err(ReadinessError::NoInterface { found: 0, .. })));
    assert!(!coordinator.wait_ready(Duration::from_secs(1)));
}

#[test]
fn cancelled_before_start_leaves_configuration_applied() {
    let network = Arc::new(MockNetwork::ethernet().with_delayed_assignment());
    let coordinator =
        ReadinessCoordinator::new(network.clone(), Arc::new(ManualClock::at_year(2025)), config());

    let token = CancelToken::new();
    token.cancel();

    assert!(!coordinator.setup_and_wait(Some(office_lan()), &token, false).unwrap());
    assert_eq!(coordinator.status(), ReadinessState::TokenExpiredWaitingAddress);
    assert_eq!(coordinator.applied_configuration(), Some(office_lan()));
    assert!(network.static_applied().is_some());
}

#[test]
fn coordinator_is_single_use() {
    let network = Arc::new(MockNetwork::ethernet());
    let coordinator =
        ReadinessCoordinator::new(network, Arc::new(ManualClock::at_year(2025)), config());

    let token = CancelToken::with_timeout(Duration::from_secs(5));
    assert!(coordinator.setup_and_wait(None, &token, false).unwrap());
    assert_eq!(
        coordinator.setup_and_wait(None, &token, false),
        Err(ReadinessError::AlreadySetUp)
    );
    assert_eq!(coordinator.setup(None, false), Err(ReadinessError::AlreadySetUp));
    assert_eq!(coordinator.status(), ReadinessState::NetworkIsReady);
}

#[test]
fn concurrent_setup_admits_exactly_one_caller() {
    const CALLERS: usize = 8;

    let network = Arc::new(MockNetwork::ethernet());
    let coordinator = Arc::new(ReadinessCoordinator::new(
        network,
        Arc::new(ManualClock::at_year(2025)),
        config(),
    ));
    let barrier = Arc::new(Barrier::new(CALLERS));

    let handles: Vec<_> = (0..CALLERS)
        .map(|_| {
            let coordinator = Arc::clone(&coordinator);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                coordinator.setup(None, false)
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter(|r| r.is_err())
        .all(|r| *r == Err(ReadinessError::AlreadySetUp)));
    assert!(coordinator.wait_ready(Duration::from_secs(5)));
}

/*************************************************************
                    Event-driven setup
**************************************************************/

#[test]
fn dhcp_lease_arriving_later_sets_ready() {
    let network = Arc::new(MockNetwork::ethernet().with_delayed_assignment());
    let coordinator =
        ReadinessCoordinator::new(network.clone(), Arc::new(ManualClock::at_year(2025)), config());

    coordinator.setup(None, false).unwrap();
    assert_eq!(coordinator.status(), ReadinessState::Started);
    assert!(!coordinator.wait_ready(Duration::from_millis(50)));

    network.assign_pending();

    assert!(coordinator.wait_ready(Duration::from_secs(5)));
    assert_eq!(coordinator.status(), ReadinessState::NetworkIsReady);
    assert!(network.dhcp_applied());
    assert_eq!(network.subscriber_count(), 0);

    let eth0 = &network.list_interfaces().unwrap()[0];
    assert_eq!(eth0.ipv4_address, DHCP_LEASE);
    assert!(eth0.is_dhcp_enabled);
}

#[test]
fn failed_configuration_is_reported_not_raised() {
    let network = Arc::new(MockNetwork::ethernet().failing_on_apply("link is down"));
    let coordinator =
        ReadinessCoordinator::new(network, Arc::new(ManualClock::at_year(2025)), config());

    assert_eq!(coordinator.setup(Some(office_lan()), false), Ok(()));
    assert!(!coordinator.wait_ready(Duration::from_secs(1)));
    assert_eq!(coordinator.status(), ReadinessState::ExceptionOccurred);

    let err = coordinator.last_error().expect("fault should be retained");
    assert!(format!("{err:#}").contains("link is down"));
}
