//! Event types for game narration
//!
//! These events are everything an observer can see of a game:
//! - Game lifecycle (start, winner)
//! - Round lifecycle (start, music stop, completion)
//! - Player outcomes (seated, eliminated)

use serde::{Deserialize, Serialize};

use crate::participant::PlayerId;

/// Core event enum - the vocabulary of a game
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    // === Game Lifecycle ===
    /// The game has started
    GameStarted { players: usize, chairs: usize },
    /// One player is left
    Winner { player: PlayerId, rounds: u64 },
    /// Nobody is left
    NoWinner { rounds: u64 },

    // === Round Lifecycle ===
    /// A round has started and the music is playing
    RoundStarted {
        round: u64,
        active_players: usize,
        chairs: usize,
    },
    /// The music stopped
    MusicStopped { round: u64, generation: u64 },
    /// Every player in the round has made their attempt
    RoundCompleted { round: u64, remaining: usize },

    // === Player Outcomes ===
    /// A player took a chair
    PlayerSeated { round: u64, player: PlayerId, chair: usize },
    /// A player found no chair and is out
    PlayerEliminated { round: u64, player: PlayerId },
}

impl GameEvent {
    /// Get the round this event belongs to, if any
    pub fn round(&self) -> Option<u64> {
        match self {
            GameEvent::RoundStarted { round, .. }
            | GameEvent::MusicStopped { round, .. }
            | GameEvent::RoundCompleted { round, .. }
            | GameEvent::PlayerSeated { round, .. }
            | GameEvent::PlayerEliminated { round, .. } => Some(*round),
            GameEvent::GameStarted { .. } | GameEvent::Winner { .. } | GameEvent::NoWinner { .. } => None,
        }
    }

    /// Get the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            GameEvent::GameStarted { .. } => "GameStarted",
            GameEvent::Winner { .. } => "Winner",
            GameEvent::NoWinner { .. } => "NoWinner",
            GameEvent::RoundStarted { .. } => "RoundStarted",
            GameEvent::MusicStopped { .. } => "MusicStopped",
            GameEvent::RoundCompleted { .. } => "RoundCompleted",
            GameEvent::PlayerSeated { .. } => "PlayerSeated",
            GameEvent::PlayerEliminated { .. } => "PlayerEliminated",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_round() {
        let event = GameEvent::PlayerSeated {
            round: 2,
            player: PlayerId(3),
            chair: 1,
        };
        assert_eq!(event.round(), Some(2));

        let event = GameEvent::GameStarted { players: 4, chairs: 3 };
        assert_eq!(event.round(), None);
    }

    #[test]
    fn test_event_type() {
        let event = GameEvent::PlayerEliminated {
            round: 1,
            player: PlayerId(4),
        };
        assert_eq!(event.event_type(), "PlayerEliminated");
        assert_eq!(GameEvent::NoWinner { rounds: 0 }.event_type(), "NoWinner");
    }

    #[test]
    fn test_event_serialization() {
        let event = GameEvent::RoundStarted {
            round: 1,
            active_players: 4,
            chairs: 3,
        };

        let yaml = serde_yaml::to_string(&event).unwrap();
        assert!(yaml.contains("RoundStarted"));

        let parsed: GameEvent = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, event);
    }
}
