//! Frame scheduling.
//!
//! The session never sleeps or reads the clock itself; a scheduler decides
//! when the next frame happens and how much time it covers.
use std::thread;
use std::time::{Duration, Instant};

use crate::entities::PlayerId;
use crate::session::Session;

/// ≈60 FPS, the usual display refresh.
pub const FRAME: Duration = Duration::from_micros(16_667);

pub trait FrameScheduler {
    /// Block until the next frame is due and return the time it covers.
    fn next_frame(&mut self) -> Duration;
}

/// Sleeps off whatever is left of the frame budget.
pub struct Realtime {
    budget: Duration,
    last: Instant,
}

impl Realtime {
    pub fn new(budget: Duration) -> Self {
        Self {
            budget,
            last: Instant::now(),
        }
    }
}

impl Default for Realtime {
    fn default() -> Self {
        Self::new(FRAME)
    }
}

impl FrameScheduler for Realtime {
    fn next_frame(&mut self) -> Duration {
        let spent = self.last.elapsed();
        if spent < self.budget {
            thread::sleep(self.budget - spent);
        }
        let now = Instant::now();
        let covered = now - self.last;
        self.last = now;
        covered
    }
}

/// Returns the same step every frame without sleeping.
#[derive(Debug, Clone, Copy)]
pub struct FixedStep(pub Duration);

impl FrameScheduler for FixedStep {
    fn next_frame(&mut self) -> Duration {
        self.0
    }
}

/// Wait for the next frame and tick the session through it.
pub fn step(session: &mut Session, scheduler: &mut impl FrameScheduler) -> Option<PlayerId> {
    let elapsed = scheduler.next_frame();
    session.tick(elapsed)
}

/// Tick `frames` times, stopping early once a winner is decided.
pub fn run_frames(
    session: &mut Session,
    scheduler: &mut impl FrameScheduler,
    frames: usize,
) -> Option<PlayerId> {
    for _ in 0..frames {
        if let Some(winner) = step(session, scheduler) {
            return Some(winner);
        }
    }
    None
}
