//! Cancellable countdown
//!
//! Replaces a delayed callback: the owner advances it and reacts when it
//! fires. Every `start` issues a fresh token, so a cancelled or superseded
//! countdown can never fire.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct Countdown {
    remaining: f32,
    token: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Timer {
    active: Option<Countdown>,
    next_token: u64,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) the countdown. Returns its token.
    pub fn start(&mut self, seconds: f32) -> u64 {
        self.next_token += 1;
        self.active = Some(Countdown {
            remaining: seconds.max(0.0),
            token: self.next_token,
        });
        self.next_token
    }

    /// Cancel the pending countdown. Returns true if one was pending.
    pub fn cancel(&mut self) -> bool {
        self.active.take().is_some()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Token of the pending countdown
    pub fn token(&self) -> Option<u64> {
        self.active.map(|c| c.token)
    }

    pub fn remaining(&self) -> Option<f32> {
        self.active.map(|c| c.remaining)
    }

    /// Advance; returns the token if the countdown elapsed this call
    pub fn advance(&mut self, dt: f32) -> Option<u64> {
        let countdown = self.active.as_mut()?;
        countdown.remaining -= dt;
        if countdown.remaining <= 0.0 {
            let token = countdown.token;
            self.active = None;
            return Some(token);
        }
        None
    }
}
