use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, bail};
use colored::*;
use netready_common::network::{Address, IpConfiguration};
use netready_core::host::{HostMode, HostNetwork, SystemClock};
use netready_core::{
    CancelToken, ReadinessConfig, ReadinessCoordinator, ReadinessError, ReadinessState,
};
use tracing::{debug, warn};

use crate::commands::WaitArgs;
use crate::terminal::{colors, print, spinner};

const WATCH_INTERVAL: Duration = Duration::from_millis(250);
const READY_POLL: Duration = Duration::from_millis(250);

pub async fn wait(args: WaitArgs) -> anyhow::Result<()> {
    let ip_config = ip_configuration(&args)?;
    let mode = if args.apply { HostMode::Apply } else { HostMode::Observe };

    let config = ReadinessConfig::default()
        .with_target(args.interface_type)
        .with_min_valid_year(args.min_year);
    let network = Arc::new(HostNetwork::new(mode, WATCH_INTERVAL));
    let coordinator = Arc::new(ReadinessCoordinator::new(network, Arc::new(SystemClock), config));

    let token = match args.timeout {
        Some(timeout) => CancelToken::with_timeout(timeout),
        None => CancelToken::new(),
    };

    let interrupt = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, giving up");
            interrupt.cancel();
        }
    });

    let require_clock = args.require_clock;
    let events = args.events;
    let worker = Arc::clone(&coordinator);
    let start_time = Instant::now();
    spinner::start(&format!("Waiting for {} to come up...", args.interface_type));

    let outcome = tokio::task::spawn_blocking(move || -> Result<bool, ReadinessError> {
        if events {
            worker.setup(ip_config, require_clock)?;
            Ok(wait_for_signal(&worker, &token))
        } else {
            worker.setup_and_wait(ip_config, &token, require_clock)
        }
    })
    .await
    .context("readiness task panicked")?;

    spinner::stop();
    let ready = outcome?;
    report(&coordinator, start_time.elapsed());

    if !ready {
        let last_error = coordinator.last_error();
        bail!("{}", not_ready_message(coordinator.status(), last_error.as_deref()));
    }
    Ok(())
}

/// A coordinator that is neither ready nor failed was abandoned by our own wait.
fn not_ready_message(status: ReadinessState, last_error: Option<&anyhow::Error>) -> String {
    match last_error {
        Some(err) => format!("network is not ready: {err:#}"),
        None if status.is_failure() => format!("network is not ready: {status}"),
        None => format!("gave up waiting for the network: timed out or interrupted while {status}"),
    }
}

fn ip_configuration(args: &WaitArgs) -> anyhow::Result<Option<IpConfiguration>> {
    let Some(cidr) = &args.static_cidr else {
        return Ok(None);
    };
    let config = IpConfiguration::from_cidr(cidr, args.gateway.unwrap_or(Address::ANY))?
        .with_dns(args.dns.clone())?;
    Ok(Some(config))
}

/// Blocks on the ready signal until it fires, a failure is recorded or the token fires.
fn wait_for_signal(coordinator: &ReadinessCoordinator, token: &CancelToken) -> bool {
    loop {
        if coordinator.wait_ready(READY_POLL) {
            return true;
        }
        let status = coordinator.status();
        if status.is_failure() {
            debug!("coordinator stopped in {status}");
            return false;
        }
        if token.is_cancelled() {
            return false;
        }
    }
}

fn report(coordinator: &ReadinessCoordinator, elapsed: Duration) {
    let status = coordinator.status();
    let status_text: ColoredString = if status == ReadinessState::NetworkIsReady {
        status.to_string().green().bold()
    } else {
        status.to_string().color(colors::FAILURE).bold()
    };

    print::set_key_width(&["Status", "Config", "Elapsed"]);
    print::aligned_line("Status", status_text);
    match coordinator.applied_configuration() {
        Some(applied) => print::aligned_line("Config", applied.to_string().color(colors::IPV4_ADDR)),
        None => print::aligned_line("Config", "dhcp"),
    }
    print::aligned_line(
        "Elapsed",
        format!("{:.2}s", elapsed.as_secs_f64()).bold().yellow(),
    );
}
