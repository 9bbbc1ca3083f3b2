//! Musical chairs - a bounded-resource concurrency exercise
//!
//! N players race for a shrinking pool of chairs each time the music stops.
//! Whoever finds no chair is out; the coordinator takes a chair away and
//! plays the next round until one player is left.
//!
//! # Core Concepts
//!
//! - **Chair pool**: counting semaphore, claimed without blocking
//! - **Music gate**: generation-counted broadcast, one reaction per stop
//! - **Players**: one tokio task each, one attempt per round
//! - **Coordinator**: sole writer of the gate and the pool size
//!
//! # Modules
//!
//! - [`pool`] - chair pool
//! - [`gate`] - music gate
//! - [`participant`] - player state machine and task
//! - [`coordinator`] - round loop
//! - [`game`] - wiring and task-group wait
//! - [`events`] - narration events and console narrator
//! - [`config`] - configuration types and loading
//! - [`cli`] - command-line interface

pub mod cli;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod events;
pub mod game;
pub mod gate;
pub mod participant;
pub mod pool;

pub use config::Config;
pub use coordinator::{Coordinator, CoordinatorConfig, GameSummary, RoundReport};
pub use error::GameError;
pub use events::{EventBus, GameEvent, render, spawn_narrator};
pub use game::Game;
pub use gate::{GateState, GateWaiter, MusicGate};
pub use participant::{Player, PlayerId, PlayerPhase, PlayerTask, Seat, SeatOutcome};
pub use pool::ChairPool;

/// Default number of players
pub const DEFAULT_PLAYERS: usize = 4;
