//! Game driver - wires the shared pool and gate into the player tasks and
//! the coordinator, then waits for the whole task group

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::coordinator::{Coordinator, CoordinatorConfig, GameSummary};
use crate::error::GameError;
use crate::events::EventBus;
use crate::gate::MusicGate;
use crate::participant::{Player, PlayerId, PlayerTask};
use crate::pool::ChairPool;

/// One game of musical chairs
pub struct Game {
    config: Config,
    events: EventBus,
}

impl Game {
    /// Validate the configuration and prepare a game
    ///
    /// Nothing is spawned until [`Game::run`].
    pub fn new(config: Config) -> Result<Self, GameError> {
        Self::with_event_bus(config, EventBus::with_default_capacity())
    }

    /// Prepare a game reporting to an existing event bus
    pub fn with_event_bus(config: Config, events: EventBus) -> Result<Self, GameError> {
        debug!(?config, "Game::with_event_bus: called");
        config.validate()?;
        Ok(Self { config, events })
    }

    /// Event bus observers can subscribe to before the game runs
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Play the game to completion
    pub async fn run(self) -> Result<GameSummary, GameError> {
        let players = self.config.players;
        info!(players, "Game::run: starting");

        let pool = Arc::new(ChairPool::new(players - 1)?);
        let gate = Arc::new(MusicGate::new());
        let roster: Vec<Arc<Player>> = (1..=players).map(|i| Arc::new(Player::new(PlayerId(i)))).collect();
        let (outcome_tx, outcome_rx) = mpsc::channel(players);

        let mut tasks = JoinSet::new();
        for player in &roster {
            let task = PlayerTask::new(
                player.clone(),
                &gate,
                pool.clone(),
                outcome_tx.clone(),
                self.events.clone(),
            );
            tasks.spawn(task.run_loop());
        }
        drop(outcome_tx);

        let coordinator = Coordinator::new(
            CoordinatorConfig::from(&self.config),
            pool,
            gate,
            roster,
            outcome_rx,
            self.events.clone(),
        );
        let mut coordinator = tokio::spawn(coordinator.run_game());

        // A player failing while the coordinator runs ends the game
        let result = loop {
            tokio::select! {
                joined = &mut coordinator => break joined.map_err(GameError::from).and_then(|r| r),
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    match joined.map_err(GameError::from).and_then(|r| r) {
                        Ok(player) => debug!(%player, "Game::run: player task finished"),
                        Err(e) => {
                            coordinator.abort();
                            break Err(e);
                        }
                    }
                }
            }
        };

        let summary = match result {
            Ok(summary) => summary,
            Err(e) => {
                error!(error = %e, "Game::run: aborting remaining tasks");
                tasks.shutdown().await;
                return Err(e);
            }
        };

        // Winner and any stragglers exit once the gate is finished
        while let Some(joined) = tasks.join_next().await {
            let player = joined??;
            debug!(%player, "Game::run: player task finished");
        }

        info!(winner = ?summary.winner, rounds = summary.rounds, "Game::run: finished");
        Ok(summary)
    }
}
