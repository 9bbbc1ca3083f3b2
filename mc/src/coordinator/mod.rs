//! Coordinator - sole authority over rounds
//!
//! The coordinator plays the music, stops it, waits for every player in the
//! round to report, takes a chair away and starts the next round, until one
//! player is left.
//!
//! ```text
//! Running ─► RoundInProgress ─► Draining ─► Resetting ─┐
//!                  ▲                                   │
//!                  └──────────── active > 1 ───────────┘
//!                                active <= 1 ─► Announcing ─► Done
//! ```

mod config;
mod core;

pub use config::CoordinatorConfig;
pub use core::{Coordinator, GameSummary, RoundReport};
