//! Agent contract
//!
//! The decision-making agent runs on its own thread, reads [`Game`]
//! snapshots, and enqueues commands. Cancellation is cooperative: the
//! session sets the stop token at teardown and the agent must return from
//! `run` promptly, bounded only by its own sleep granularity. There is no
//! hard-kill path.

use crate::game::Game;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Shared cancellation flag between a session and its agent.
#[derive(Debug, Clone, Default)]
pub struct StopToken {
    stopped: Arc<AtomicBool>,
}

impl StopToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal the agent to exit its run loop.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    /// Sleep in small slices so a stop request is noticed quickly.
    /// Returns false if stopped before the full duration elapsed.
    pub fn sleep(&self, duration: Duration) -> bool {
        const SLICE: Duration = Duration::from_millis(50);
        let mut remaining = duration;
        while !remaining.is_zero() {
            if self.is_stopped() {
                return false;
            }
            let step = remaining.min(SLICE);
            std::thread::sleep(step);
            remaining -= step;
        }
        !self.is_stopped()
    }
}

/// A decision-making agent.
///
/// `run` is invoked on a dedicated thread once the first frame has been
/// applied, and must not return until `stop` is set. Agents own no shared
/// mutable state beyond the command queue and read-only game snapshots.
pub trait Agent: Send + 'static {
    fn run(&mut self, game: Arc<Game>, stop: &StopToken);
}

/// Factory producing a fresh agent for each session.
pub type AgentFactory = Box<dyn Fn() -> Box<dyn Agent> + Send + Sync>;

/// Agent that does nothing and exits as soon as it is told to.
#[derive(Debug, Default)]
pub struct NullAgent;

impl Agent for NullAgent {
    fn run(&mut self, _game: Arc<Game>, stop: &StopToken) {
        while stop.sleep(Duration::from_millis(200)) {}
    }
}
