//! Game events and their observers
//!
//! The coordinator and the players report what happens to an [`EventBus`];
//! observers subscribe. Reporting is best-effort: the game never waits on
//! an observer.
//!
//! ```text
//!   Coordinator              Players
//!   - RoundStarted           - PlayerSeated
//!   - MusicStopped           - PlayerEliminated
//!   - RoundCompleted
//!   - Winner / NoWinner
//!          │                    │
//!          └──────► EventBus ◄──┘
//!                      │
//!              ┌───────┴───────┐
//!           narrator         tests
//! ```

mod bus;
mod narrator;
mod types;

pub use bus::{DEFAULT_CHANNEL_CAPACITY, EventBus};
pub use narrator::{render, spawn_narrator};
pub use types::GameEvent;
