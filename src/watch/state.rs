//! Watch-mode state machine.
//!
//! ```text
//!            change                deadline            done (no pending)
//!   Idle ───────────▶ Debouncing ───────────▶ Rebuilding ───────────▶ Idle
//!                      ▲      │ change:                │ change: pending
//!                      │      └ reset deadline         │
//!                      └───────────────────────────────┘ done (pending)
//!
//!   any state ── stop ──▶ Stopped
//! ```
//!
//! The machine is pure: callers pass the current instant in and act on what
//! it returns. The async driver lives in the parent module.

use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    /// Waiting for changes.
    Idle,
    /// Changes seen; rebuild once `deadline` passes without further changes.
    Debouncing { deadline: Instant },
    /// A rebuild is running; `pending` records changes seen meanwhile.
    Rebuilding { pending: bool },
    Stopped,
}

#[derive(Debug)]
pub struct WatchMachine {
    state: WatchState,
    window: Duration,
}

impl WatchMachine {
    pub fn new(window: Duration) -> Self {
        Self {
            state: WatchState::Idle,
            window,
        }
    }

    pub fn state(&self) -> WatchState {
        self.state
    }

    pub fn is_stopped(&self) -> bool {
        self.state == WatchState::Stopped
    }

    /// Pending debounce deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            WatchState::Debouncing { deadline } => Some(deadline),
            _ => None,
        }
    }

    /// A relevant change arrived.
    pub fn on_change(&mut self, now: Instant) {
        self.state = match self.state {
            WatchState::Idle | WatchState::Debouncing { .. } => WatchState::Debouncing {
                deadline: now + self.window,
            },
            WatchState::Rebuilding { .. } => WatchState::Rebuilding { pending: true },
            WatchState::Stopped => WatchState::Stopped,
        };
    }

    /// Returns `true` when the caller should start a rebuild now.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.state {
            WatchState::Debouncing { deadline } if now >= deadline => {
                self.state = WatchState::Rebuilding { pending: false };
                true
            }
            _ => false,
        }
    }

    /// The in-flight rebuild finished (successfully or not).
    pub fn on_rebuild_done(&mut self, now: Instant) {
        self.state = match self.state {
            WatchState::Rebuilding { pending: true } => WatchState::Debouncing {
                deadline: now + self.window,
            },
            WatchState::Rebuilding { pending: false } => WatchState::Idle,
            other => other,
        };
    }

    /// Terminal. Discards any pending deadline.
    pub fn stop(&mut self) {
        self.state = WatchState::Stopped;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(200);

    #[test]
    fn test_burst_resets_deadline() {
        let start = Instant::now();
        let mut machine = WatchMachine::new(WINDOW);

        for i in 0..10 {
            machine.on_change(start + Duration::from_millis(i * 10));
            assert!(!machine.poll(start + Duration::from_millis(i * 10 + 5)));
        }

        assert_eq!(machine.deadline(), Some(start + Duration::from_millis(290)));
        assert!(!machine.poll(start + Duration::from_millis(289)));
        assert!(machine.poll(start + Duration::from_millis(290)));
        assert_eq!(machine.state(), WatchState::Rebuilding { pending: false });

        // Only one rebuild per elapsed deadline
        assert!(!machine.poll(start + Duration::from_millis(500)));
    }

    #[test]
    fn test_change_during_rebuild_is_pending() {
        let start = Instant::now();
        let mut machine = WatchMachine::new(WINDOW);
        machine.on_change(start);
        assert!(machine.poll(start + WINDOW));

        machine.on_change(start + Duration::from_millis(250));
        assert_eq!(machine.state(), WatchState::Rebuilding { pending: true });
        assert_eq!(machine.deadline(), None);

        let done = start + Duration::from_millis(400);
        machine.on_rebuild_done(done);
        assert_eq!(machine.deadline(), Some(done + WINDOW));
    }

    #[test]
    fn test_rebuild_done_returns_to_idle() {
        let start = Instant::now();
        let mut machine = WatchMachine::new(WINDOW);
        machine.on_change(start);
        assert!(machine.poll(start + WINDOW));

        machine.on_rebuild_done(start + WINDOW);
        assert_eq!(machine.state(), WatchState::Idle);
    }

    #[test]
    fn test_stop_is_terminal() {
        let start = Instant::now();
        let mut machine = WatchMachine::new(WINDOW);
        machine.on_change(start);
        machine.stop();

        assert!(machine.is_stopped());
        assert_eq!(machine.deadline(), None);

        machine.on_change(start);
        machine.on_rebuild_done(start);
        assert!(!machine.poll(start + WINDOW));
        assert!(machine.is_stopped());
    }
}
