use std::time::Duration;

use netready_common::network::InterfaceType;

/// Tunables for the readiness coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadinessConfig {
    /// Which interface the coordinator configures and watches.
    pub target: InterfaceType,
    /// Delay between address checks in the polling strategy.
    pub poll_interval: Duration,
    /// Delay between wall-clock checks once the address is ready.
    pub clock_poll_interval: Duration,
    /// Pause after configuration commands before the interface is queried again.
    pub settle_delay: Duration,
    /// The wall clock is plausible once its UTC year reaches this value.
    pub min_valid_year: i32,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            target: InterfaceType::Ethernet,
            poll_interval: Duration::from_millis(200),
            clock_poll_interval: Duration::from_millis(100),
            settle_delay: Duration::from_millis(100),
            min_valid_year: 2019,
        }
    }
}

impl ReadinessConfig {
    pub fn with_target(mut self, target: InterfaceType) -> Self {
        self.target = target;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_clock_poll_interval(mut self, interval: Duration) -> Self {
        self.clock_poll_interval = interval;
        self
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn with_min_valid_year(mut self, year: i32) -> Self {
        self.min_valid_year = year;
        self
    }
}
