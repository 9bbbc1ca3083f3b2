//! Event Bus - pub/sub for game events
//!
//! The EventBus uses a tokio broadcast channel so any number of observers
//! (console narrator, tests) can follow a game. Emitting is best-effort and
//! never blocks the coordinator or a player.

use tokio::sync::broadcast;
use tracing::debug;

use super::types::GameEvent;
use crate::participant::PlayerId;

/// Default channel capacity (events)
/// A game emits roughly 2N events per round, so this covers large rosters
pub const DEFAULT_CHANNEL_CAPACITY: usize = 4_096;

/// Central event bus for game observation
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<GameEvent>,
}

impl EventBus {
    /// Create a new event bus with the given capacity
    pub fn new(capacity: usize) -> Self {
        debug!(capacity, "EventBus::new: creating event bus");
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Create a new event bus with default capacity
    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Emit an event to all subscribers
    ///
    /// This is fire-and-forget: if there are no subscribers, the event is dropped.
    pub fn emit(&self, event: GameEvent) {
        debug!(event_type = event.event_type(), round = ?event.round(), "EventBus::emit");
        // Ignore send errors (no subscribers is OK)
        let _ = self.tx.send(event);
    }

    /// Subscribe to receive events emitted from now on
    pub fn subscribe(&self) -> broadcast::Receiver<GameEvent> {
        debug!("EventBus::subscribe: new subscriber");
        self.tx.subscribe()
    }

    // === Convenience methods ===

    /// Emit a game started event
    pub fn game_started(&self, players: usize, chairs: usize) {
        self.emit(GameEvent::GameStarted { players, chairs });
    }

    /// Emit a round started event
    pub fn round_started(&self, round: u64, active_players: usize, chairs: usize) {
        self.emit(GameEvent::RoundStarted {
            round,
            active_players,
            chairs,
        });
    }

    /// Emit a music stopped event
    pub fn music_stopped(&self, round: u64, generation: u64) {
        self.emit(GameEvent::MusicStopped { round, generation });
    }

    /// Emit a player seated event
    pub fn seated(&self, round: u64, player: PlayerId, chair: usize) {
        self.emit(GameEvent::PlayerSeated { round, player, chair });
    }

    /// Emit a player eliminated event
    pub fn eliminated(&self, round: u64, player: PlayerId) {
        self.emit(GameEvent::PlayerEliminated { round, player });
    }

    /// Emit a round completed event
    pub fn round_completed(&self, round: u64, remaining: usize) {
        self.emit(GameEvent::RoundCompleted { round, remaining });
    }

    /// Emit the final event of a game
    pub fn winner(&self, player: Option<PlayerId>, rounds: u64) {
        match player {
            Some(player) => self.emit(GameEvent::Winner { player, rounds }),
            None => self.emit(GameEvent::NoWinner { rounds }),
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}
