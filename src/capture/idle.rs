use std::time::{Duration, Instant};

/// Liveness of the frame source: whether anything has arrived within the
/// timeout window.
pub struct Idle {
    timeout: Duration,
    last:    Instant,
    state:   State,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum State {
    Active,
    Idle,
}

impl Idle {
    pub fn new(timeout: Duration, now: Instant) -> Self {
        Idle {
            timeout: timeout,
            last:    now,
            state:   State::Active,
        }
    }

    pub fn seen(&mut self, now: Instant) {
        self.last  = now;
        self.state = State::Active;
    }

    /// True once per window of silence. Restarts the window when it fires.
    pub fn expired(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.last) >= self.timeout {
            self.last  = now;
            self.state = State::Idle;
            true
        } else {
            false
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}
