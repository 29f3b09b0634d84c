use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Progress of a coordinator from "nothing requested" to "network usable".
///
/// `None` is only re-entered through a reset. Every state after `Started`
/// is terminal for the coordinator's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ReadinessState {
    None = 0,
    Started = 1,
    NetworkIsReady = 2,
    FailedNoInterface = 3,
    TokenExpiredWaitingAddress = 4,
    TokenExpiredWaitingClock = 5,
    ExceptionOccurred = 6,
}

impl ReadinessState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, ReadinessState::None | ReadinessState::Started)
    }

    pub fn is_failure(self) -> bool {
        self.is_terminal() && self != ReadinessState::NetworkIsReady
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => ReadinessState::Started,
            2 => ReadinessState::NetworkIsReady,
            3 => ReadinessState::FailedNoInterface,
            4 => ReadinessState::TokenExpiredWaitingAddress,
            5 => ReadinessState::TokenExpiredWaitingClock,
            6 => ReadinessState::ExceptionOccurred,
            _ => ReadinessState::None,
        }
    }
}

impl fmt::Display for ReadinessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ReadinessState::None => "not started",
            ReadinessState::Started => "waiting for network",
            ReadinessState::NetworkIsReady => "network is ready",
            ReadinessState::FailedNoInterface => "no interface available",
            ReadinessState::TokenExpiredWaitingAddress => "cancelled while waiting for an IP address",
            ReadinessState::TokenExpiredWaitingClock => "cancelled while waiting for a valid clock",
            ReadinessState::ExceptionOccurred => "failed with an error",
        };
        f.write_str(text)
    }
}

/// Lock-free holder for the current state, shared with the worker thread.
#[derive(Debug)]
pub(crate) struct StateCell(AtomicU8);

impl StateCell {
    pub(crate) fn new() -> Self {
        Self(AtomicU8::new(ReadinessState::None as u8))
    }

    pub(crate) fn load(&self) -> ReadinessState {
        ReadinessState::from_u8(self.0.load(Ordering::Acquire))
    }

    pub(crate) fn store(&self, state: ReadinessState) {
        self.0.store(state as u8, Ordering::Release);
    }
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

    #[test]
    fn cell_round_trips_every_state() {
        let cell = StateCell::new();
        assert_eq!(cell.load(), ReadinessState::None);
        for state in [
            ReadinessState::Started,
            ReadinessState::NetworkIsReady,
            ReadinessState::FailedNoInterface,
            ReadinessState::TokenExpiredWaitingAddress,
            ReadinessState::TokenExpiredWaitingClock,
            ReadinessState::ExceptionOccurred,
            ReadinessState::None,
        ] {
            cell.store(state);
            assert_eq!(cell.load(), state);
        }
    }

    #[test]
    fn terminal_and_failure_classification() {
        assert!(!ReadinessState::None.is_terminal());
        assert!(!ReadinessState::Started.is_terminal());
        assert!(ReadinessState::NetworkIsReady.is_terminal());
        assert!(!ReadinessState::NetworkIsReady.is_failure());
        assert!(ReadinessState::TokenExpiredWaitingClock.is_failure());
        assert!(ReadinessState::ExceptionOccurred.is_failure());
    }
}
