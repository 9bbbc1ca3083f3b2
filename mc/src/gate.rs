//! Music gate - generation-counted broadcast signal
//!
//! The coordinator is the only writer. Stopping the music bumps the
//! generation; players wait for a generation newer than the last one they
//! acted on, so each stop is reacted to exactly once no matter how the
//! wakeups interleave. Backed by [`tokio::sync::watch`], which always holds
//! the latest state, so a player that starts waiting late still sees it.
//! Finishing the game releases every waiter for good.

use tokio::sync::watch;
use tracing::debug;

use crate::error::GameError;

/// Snapshot of the gate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GateState {
    /// Number of times the music has stopped
    pub generation: u64,

    /// True between a stop and the following resume
    pub stopped: bool,

    /// Set once the game is over
    pub finished: bool,
}

/// Broadcast gate shared by the coordinator and every player
pub struct MusicGate {
    tx: watch::Sender<GateState>,
}

impl MusicGate {
    /// Create a gate with the music playing at generation 0
    pub fn new() -> Self {
        debug!("MusicGate::new: called");
        let (tx, _) = watch::channel(GateState::default());
        Self { tx }
    }

    /// Stop the music, waking every waiter, and return the new generation
    pub fn stop(&self) -> Result<u64, GameError> {
        let mut result = Ok(0);
        self.tx.send_modify(|state| {
            if state.finished {
                result = Err(GameError::invariant("music stopped after the game finished"));
                return;
            }
            if state.stopped {
                result = Err(GameError::invariant(format!(
                    "music stopped twice in generation {}",
                    state.generation
                )));
                return;
            }
            state.generation += 1;
            state.stopped = true;
            result = Ok(state.generation);
        });
        debug!(?result, "MusicGate::stop: done");
        result
    }

    /// Start the music again for the next generation
    pub fn resume(&self) {
        debug!("MusicGate::resume: called");
        self.tx.send_if_modified(|state| {
            let changed = state.stopped;
            state.stopped = false;
            changed
        });
    }

    /// End the game, releasing every waiter without a new generation
    pub fn finish(&self) {
        debug!("MusicGate::finish: called");
        self.tx.send_modify(|state| {
            state.stopped = false;
            state.finished = true;
        });
    }

    /// Current gate state
    pub fn state(&self) -> GateState {
        *self.tx.borrow()
    }

    /// Current generation
    pub fn generation(&self) -> u64 {
        self.tx.borrow().generation
    }

    /// Create a waiter handle for a player
    pub fn subscribe(&self) -> GateWaiter {
        GateWaiter { rx: self.tx.subscribe() }
    }
}

impl Default for MusicGate {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving end of the gate, one per player
pub struct GateWaiter {
    rx: watch::Receiver<GateState>,
}

impl GateWaiter {
    /// Generation as currently visible to this waiter
    pub fn generation(&self) -> u64 {
        self.rx.borrow().generation
    }

    /// Wait until the music has stopped for a generation newer than `last_seen`
    ///
    /// Returns that generation, or `None` once the game is finished. Errors
    /// only if the gate is dropped.
    pub async fn wait_for_stop(&mut self, last_seen: u64) -> Result<Option<u64>, GameError> {
        debug!(last_seen, "GateWaiter::wait_for_stop: called");
        let state = *self
            .rx
            .wait_for(|state| state.finished || state.generation > last_seen)
            .await
            .map_err(|_| GameError::GateClosed)?;
        if state.finished {
            debug!("GateWaiter::wait_for_stop: game finished");
            return Ok(None);
        }
        debug!(generation = state.generation, "GateWaiter::wait_for_stop: released");
        Ok(Some(state.generation))
    }
}
