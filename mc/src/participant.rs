//! Players - one competing task per seat hunter
//!
//! A player waits for the music to stop, makes exactly one attempt to take a
//! chair, and reports the outcome to the coordinator. A player that finds no
//! chair is eliminated and its task ends, so it never consumes another stop.
//!
//! ```text
//! WaitingForSignal ──stop──► Attempting ──chair──► Seated ──reset──► WaitingForSignal
//!                                 │
//!                                 └──no chair──► Eliminated (terminal)
//! ```

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info};

use crate::error::GameError;
use crate::events::EventBus;
use crate::gate::{GateWaiter, MusicGate};
use crate::pool::ChairPool;

/// Stable player identifier, 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub usize);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player {}", self.0)
    }
}

/// Where a player is in its round state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerPhase {
    WaitingForSignal,
    Attempting,
    Seated,
    Eliminated,
}

/// Result of a single seat attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seat {
    /// Took the chair with this 1-based ordinal
    Seated { chair: usize },
    Eliminated,
}

/// Outcome a player reports to the coordinator after its attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeatOutcome {
    pub player: PlayerId,
    pub generation: u64,
    pub seat: Seat,
}

impl SeatOutcome {
    pub fn is_seated(&self) -> bool {
        matches!(self.seat, Seat::Seated { .. })
    }
}

#[derive(Debug)]
struct PlayerState {
    active: bool,
    attempted: bool,
    last_generation: u64,
    phase: PlayerPhase,
}

/// A player in the roster
///
/// Only the player writes `active` and sets `attempted`. The coordinator
/// clears `attempted` through [`Player::reset_round`] once every player in
/// the round has reported.
#[derive(Debug)]
pub struct Player {
    id: PlayerId,
    state: Mutex<PlayerState>,
}

impl Player {
    pub fn new(id: PlayerId) -> Self {
        Self {
            id,
            state: Mutex::new(PlayerState {
                active: true,
                attempted: false,
                last_generation: 0,
                phase: PlayerPhase::WaitingForSignal,
            }),
        }
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    /// True until the player is eliminated
    pub async fn is_active(&self) -> bool {
        self.state.lock().await.active
    }

    pub async fn phase(&self) -> PlayerPhase {
        self.state.lock().await.phase
    }

    pub async fn has_attempted(&self) -> bool {
        self.state.lock().await.attempted
    }

    /// Make this round's single attempt at a chair
    ///
    /// Returns `None` for an eliminated player. Reacting twice to the same
    /// generation, or attempting again before the coordinator reset the
    /// round, is an invariant violation.
    pub async fn attempt_seat(&self, generation: u64, pool: &ChairPool) -> Result<Option<SeatOutcome>, GameError> {
        debug!(player = %self.id, generation, "Player::attempt_seat: called");
        let mut state = self.state.lock().await;

        if !state.active {
            debug!(player = %self.id, "Player::attempt_seat: inactive, skipping");
            return Ok(None);
        }
        if state.attempted || generation <= state.last_generation {
            return Err(GameError::invariant(format!(
                "{} attempted twice (generation {}, last acted on {})",
                self.id, generation, state.last_generation
            )));
        }

        state.attempted = true;
        state.last_generation = generation;
        state.phase = PlayerPhase::Attempting;

        let seat = match pool.try_take() {
            Some(chair) => {
                state.phase = PlayerPhase::Seated;
                Seat::Seated { chair }
            }
            None => {
                state.active = false;
                state.phase = PlayerPhase::Eliminated;
                Seat::Eliminated
            }
        };
        debug!(player = %self.id, ?seat, "Player::attempt_seat: done");

        Ok(Some(SeatOutcome {
            player: self.id,
            generation,
            seat,
        }))
    }

    /// Clear the per-round attempt flag; coordinator only, between rounds
    pub async fn reset_round(&self) {
        let mut state = self.state.lock().await;
        state.attempted = false;
        if state.active {
            state.phase = PlayerPhase::WaitingForSignal;
        }
    }
}

/// The running half of a player: its gate subscription and reporting channels
pub struct PlayerTask {
    player: Arc<Player>,
    waiter: GateWaiter,
    pool: Arc<ChairPool>,
    outcomes: mpsc::Sender<SeatOutcome>,
    events: EventBus,
    last_seen: u64,
}

impl PlayerTask {
    pub fn new(
        player: Arc<Player>,
        gate: &MusicGate,
        pool: Arc<ChairPool>,
        outcomes: mpsc::Sender<SeatOutcome>,
        events: EventBus,
    ) -> Self {
        let waiter = gate.subscribe();
        // Stops from before this task existed are not ours to react to
        let last_seen = waiter.generation();
        Self {
            player,
            waiter,
            pool,
            outcomes,
            events,
            last_seen,
        }
    }

    /// Suspend until the music stops for a generation not yet acted on
    ///
    /// Returns `None` once the game is over.
    pub async fn await_round_start(&mut self) -> Result<Option<u64>, GameError> {
        let generation = self.waiter.wait_for_stop(self.last_seen).await?;
        if let Some(generation) = generation {
            self.last_seen = generation;
        }
        Ok(generation)
    }

    /// Play rounds until eliminated or the game finishes
    pub async fn run_loop(mut self) -> Result<PlayerId, GameError> {
        let id = self.player.id();
        debug!(player = %id, "PlayerTask::run_loop: called");

        while self.player.is_active().await {
            let Some(generation) = self.await_round_start().await? else {
                break;
            };
            let Some(outcome) = self.player.attempt_seat(generation, &self.pool).await? else {
                break;
            };

            match outcome.seat {
                Seat::Seated { chair } => self.events.seated(generation, id, chair),
                Seat::Eliminated => {
                    info!(player = %id, generation, "Player eliminated");
                    self.events.eliminated(generation, id);
                }
            }

            self.outcomes
                .send(outcome)
                .await
                .map_err(|_| GameError::invariant(format!("coordinator stopped collecting before {} reported", id)))?;
        }

        debug!(player = %id, "PlayerTask::run_loop: finished");
        Ok(id)
    }
}
