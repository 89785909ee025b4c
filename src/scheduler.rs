//! Frame-driven scheduler that decouples rendering from logic steps.
//!
//! Call [`Scheduler::frame`] once per display frame. It renders every time and
//! steps the session at most once, whenever a full step interval has elapsed
//! since the last committed step.

use std::cell::Cell;
use std::time::{Duration, Instant};

use crate::session::Session;
use crate::state::{Phase, Snapshot};

/// Monotonic time source, as an offset from an arbitrary origin.
pub trait Clock {
    fn now(&self) -> Duration;
}

#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Duration {
        (**self).now()
    }
}

/// Draws a frame from a snapshot.
pub trait Renderer {
    type Error;

    fn render(&mut self, frame: &Snapshot<'_>) -> Result<(), Self::Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    /// Game over or stopped; no further frames will step.
    Stop,
}

#[derive(Debug)]
pub struct Scheduler<C> {
    clock: C,
    /// Time of the last committed step.
    reference: Duration,
    active: bool,
}

impl<C: Clock> Scheduler<C> {
    pub fn new(clock: C) -> Self {
        let reference = clock.now();
        Self {
            clock,
            reference,
            active: true,
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Run one frame: maybe step, always render.
    pub fn frame<R: Renderer>(
        &mut self,
        session: &mut Session,
        renderer: &mut R,
    ) -> Result<LoopControl, R::Error> {
        if !self.active {
            return Ok(LoopControl::Stop);
        }

        let now = self.clock.now();
        if session.phase() == Phase::Running {
            let interval = session.interval();
            if now.saturating_sub(self.reference) >= interval {
                session.step();
                // Consume one interval and carry the remainder, but never
                // bank more than one step's worth of lag.
                self.reference += interval;
                if now.saturating_sub(self.reference) >= interval {
                    self.reference = now;
                }
            }
        } else {
            // Time spent paused or waiting to start doesn't count.
            self.reference = now;
        }

        renderer.render(&session.snapshot())?;

        if session.phase() == Phase::GameOver {
            self.stop();
            return Ok(LoopControl::Stop);
        }
        Ok(LoopControl::Continue)
    }

    pub fn stop(&mut self) {
        self.active = false;
    }

    /// Reactivate after a stop, timing from now.
    pub fn resume(&mut self) {
        self.active = true;
        self.reference = self.clock.now();
    }
}
