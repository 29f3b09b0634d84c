pub mod decode;
pub mod encode;
pub mod interfaces;
pub mod wait;

use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use netready_common::network::{Address, Endpoint, InterfaceType};

#[derive(Parser)]
#[command(name = "netready")]
#[command(about = "Waits until the network is usable.")]
pub struct CommandLine {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the interfaces visible to the coordinator
    #[command(alias = "i")]
    Interfaces,
    /// Configure the target interface and wait until it is ready
    #[command(alias = "w")]
    Wait(WaitArgs),
    /// Print the socket-address bytes of an endpoint
    #[command(alias = "e")]
    Encode { endpoint: Endpoint },
    /// Decode socket-address bytes given as hex
    #[command(alias = "d")]
    Decode { hex: String },
}

#[derive(Args, Debug)]
pub struct WaitArgs {
    /// Static address in ADDRESS/PREFIX form; DHCP when omitted
    #[arg(long = "static", value_name = "ADDR/PREFIX")]
    pub static_cidr: Option<String>,

    /// Default gateway for the static address
    #[arg(long, requires = "static_cidr")]
    pub gateway: Option<Address>,

    /// DNS server for the static address, at most two
    #[arg(long, requires = "static_cidr")]
    pub dns: Vec<Address>,

    /// Also wait for a plausible wall clock
    #[arg(long)]
    pub require_clock: bool,

    /// Earliest UTC year accepted as a set clock
    #[arg(long, default_value_t = 2019)]
    pub min_year: i32,

    /// Give up after this many seconds
    #[arg(long, value_parser = parse_seconds)]
    pub timeout: Option<Duration>,

    /// Use the event-driven setup instead of polling
    #[arg(long)]
    pub events: bool,

    /// Interface kind to configure (ethernet, wifi, wireless-ap, loopback)
    #[arg(long, default_value_t = InterfaceType::Ethernet)]
    pub interface_type: InterfaceType,

    /// Run configuration commands on the host instead of only observing
    #[arg(long)]
    pub apply: bool,
}

fn parse_seconds(s: &str) -> Result<Duration, String> {
    s.parse::<f64>()
        .ok()
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
        .map(Duration::from_secs_f64)
        .ok_or_else(|| format!("invalid number of seconds: {s}"))
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wait_arguments_parse() {
        let cli = CommandLine::try_parse_from([
            "netready",
            "wait",
            "--static",
            "10.0.0.2/24",
            "--gateway",
            "10.0.0.1",
            "--dns",
            "1.1.1.1",
            "--timeout",
            "2.5",
            "--require-clock",
        ])
        .unwrap();

        let Commands::Wait(args) = cli.command else {
            panic!("expected the wait command");
        };
        assert_eq!(args.static_cidr.as_deref(), Some("10.0.0.2/24"));
        assert_eq!(args.gateway, Some(Address::from_octets([10, 0, 0, 1])));
        assert_eq!(args.dns.len(), 1);
        assert_eq!(args.timeout, Some(Duration::from_millis(2500)));
        assert!(args.require_clock);
        assert_eq!(args.interface_type, InterfaceType::Ethernet);
    }

    #[test]
    fn gateway_requires_static_address() {
        assert!(CommandLine::try_parse_from(["netready", "wait", "--gateway", "10.0.0.1"]).is_err());
    }

    #[test]
    fn negative_timeout_rejected() {
        assert!(parse_seconds("-1").is_err());
        assert_eq!(parse_seconds("0").unwrap(), Duration::ZERO);
    }
}
