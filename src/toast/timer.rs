//! Pausable auto-dismiss countdown
//!
//! The timer itself never sleeps. Each (re)start bumps a generation number;
//! the notifier spawns a sleeper per generation and a sleeper whose
//! generation is no longer current does nothing when it wakes.

use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone)]
pub(crate) struct DismissTimer {
    duration: Duration,
    deadline: Option<Instant>,
    remaining: Duration,
    generation: u64,
}

impl DismissTimer {
    pub(crate) fn started(duration: Duration, now: Instant) -> Self {
        Self {
            duration,
            deadline: Some(now + duration),
            remaining: duration,
            generation: 0,
        }
    }

    /// Start over with the full duration
    ///
    /// A paused timer stays paused but will resume with the full duration.
    pub(crate) fn restart(&mut self, now: Instant) -> Option<Instant> {
        self.generation += 1;
        self.remaining = self.duration;
        if self.deadline.is_some() {
            self.deadline = Some(now + self.duration);
        }
        self.deadline
    }

    /// Freeze the countdown; returns false if already paused
    pub(crate) fn pause(&mut self, now: Instant) -> bool {
        match self.deadline.take() {
            Some(deadline) => {
                self.remaining = deadline.saturating_duration_since(now);
                self.generation += 1;
                true
            }
            None => false,
        }
    }

    /// Continue with the time left at pause; returns the new deadline
    pub(crate) fn resume(&mut self, now: Instant) -> Option<Instant> {
        if self.deadline.is_some() {
            return None;
        }
        self.generation += 1;
        let deadline = now + self.remaining;
        self.deadline = Some(deadline);
        Some(deadline)
    }

    pub(crate) fn is_paused(&self) -> bool {
        self.deadline.is_none()
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub(crate) fn remaining(&self, now: Instant) -> Duration {
        match self.deadline {
            Some(deadline) => deadline.saturating_duration_since(now),
            None => self.remaining,
        }
    }
}
