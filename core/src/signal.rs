//! Manual-reset signal: once set, every current and future waiter passes
//! until [`Signal::clear`] is called.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Pending,
    Set,
    /// The producer gave up; waiters return `false` without sleeping out their timeout.
    Abandoned,
}

#[derive(Debug)]
pub struct Signal {
    slot: Mutex<Slot>,
    changed: Condvar,
}

impl Default for Signal {
    fn default() -> Self {
        Self::new()
    }
}

impl Signal {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(Slot::Pending),
            changed: Condvar::new(),
        }
    }

    pub fn set(&self) {
        self.store(Slot::Set);
    }

    pub fn abandon(&self) {
        let mut slot = self.lock();
        if *slot == Slot::Pending {
            *slot = Slot::Abandoned;
            self.changed.notify_all();
        }
    }

    pub fn clear(&self) {
        self.store(Slot::Pending);
    }

    pub fn is_set(&self) -> bool {
        *self.lock() == Slot::Set
    }

    /// Blocks until the signal is set, abandoned, or `timeout` elapses.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now().checked_add(timeout);
        let mut slot = self.lock();

        loop {
            match *slot {
                Slot::Set => return true,
                Slot::Abandoned => return false,
                Slot::Pending => {}
            }

            let remaining = match deadline {
                Some(deadline) => match deadline.checked_duration_since(Instant::now()) {
                    Some(remaining) if !remaining.is_zero() => remaining,
                    _ => return false,
                },
                None => Duration::from_secs(3600),
            };

            slot = self
                .changed
                .wait_timeout(slot, remaining)
                .map(|(guard, _)| guard)
                .unwrap_or_else(|poisoned| poisoned.into_inner().0);
        }
    }

    fn store(&self, value: Slot) {
        let mut slot = self.lock();
        *slot = value;
        self.changed.notify_all();
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
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
