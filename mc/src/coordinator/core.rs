//! Main Coordinator task implementation

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use super::config::CoordinatorConfig;
use crate::error::GameError;
use crate::events::EventBus;
use crate::gate::MusicGate;
use crate::participant::{Player, PlayerId, SeatOutcome};
use crate::pool::ChairPool;

/// Where the coordinator is in the game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CoordinatorPhase {
    Running,
    RoundInProgress,
    Draining,
    Resetting,
    Announcing,
    Done,
}

/// What happened in one round
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundReport {
    pub round: u64,
    pub generation: u64,
    pub active_players: usize,
    pub chairs: usize,
    pub seated: Vec<PlayerId>,
    pub eliminated: Vec<PlayerId>,
}

/// Result of a finished game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSummary {
    pub winner: Option<PlayerId>,
    pub rounds: u64,
    /// Players in the order they were eliminated
    pub eliminations: Vec<PlayerId>,
    pub reports: Vec<RoundReport>,
}

/// The Coordinator drives rounds until a single player remains
pub struct Coordinator {
    config: CoordinatorConfig,
    pool: Arc<ChairPool>,
    gate: Arc<MusicGate>,
    roster: Vec<Arc<Player>>,
    outcomes: mpsc::Receiver<SeatOutcome>,
    events: EventBus,
    rng: StdRng,
    phase: CoordinatorPhase,
}

impl Coordinator {
    /// Create a coordinator over a roster sharing `pool` and `gate`
    pub fn new(
        config: CoordinatorConfig,
        pool: Arc<ChairPool>,
        gate: Arc<MusicGate>,
        roster: Vec<Arc<Player>>,
        outcomes: mpsc::Receiver<SeatOutcome>,
        events: EventBus,
    ) -> Self {
        debug!(?config, players = roster.len(), "Coordinator::new: called");
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            config,
            pool,
            gate,
            roster,
            outcomes,
            events,
            rng,
            phase: CoordinatorPhase::Running,
        }
    }

    /// Number of players not yet eliminated
    pub async fn count_active_participants(&self) -> usize {
        let mut active = 0;
        for player in &self.roster {
            if player.is_active().await {
                active += 1;
            }
        }
        active
    }

    /// Run rounds until at most one player is left, then announce the winner
    pub async fn run_game(mut self) -> Result<GameSummary, GameError> {
        debug!("Coordinator::run_game: called");
        match self.play().await {
            Ok(summary) => Ok(summary),
            Err(e) => {
                error!(error = %e, phase = ?self.phase, "Coordinator aborting game");
                self.gate.finish();
                Err(e)
            }
        }
    }

    async fn play(&mut self) -> Result<GameSummary, GameError> {
        let mut active = self.count_active_participants().await;
        if active == 0 {
            return Err(GameError::config("no players in the roster"));
        }

        info!(players = active, chairs = self.pool.capacity(), "Game starting");
        self.events.game_started(active, self.pool.capacity());

        let mut reports = Vec::new();
        while active > 1 {
            let report = self.play_round(reports.len() as u64 + 1, active).await?;
            active = report.seated.len();
            reports.push(report);
        }

        self.enter(CoordinatorPhase::Announcing);
        let winner = self.find_winner(active).await?;
        let rounds = reports.len() as u64;
        match winner {
            Some(player) => info!(%player, rounds, "Winner"),
            None => info!(rounds, "Game ended without a winner"),
        }
        self.gate.finish();
        self.events.winner(winner, rounds);
        self.enter(CoordinatorPhase::Done);

        Ok(GameSummary {
            winner,
            rounds,
            eliminations: reports.iter().flat_map(|r| r.eliminated.iter().copied()).collect(),
            reports,
        })
    }

    async fn play_round(&mut self, round: u64, active: usize) -> Result<RoundReport, GameError> {
        self.enter(CoordinatorPhase::RoundInProgress);
        let chairs = active - 1;
        if self.pool.available() != chairs {
            return Err(GameError::invariant(format!(
                "round {} starts with {} chairs for {} players",
                round,
                self.pool.available(),
                active
            )));
        }

        info!(round, active, chairs, "Round starting");
        self.events.round_started(round, active, chairs);

        let music = self.music_duration();
        debug!(round, ?music, "Coordinator::play_round: music playing");
        tokio::time::sleep(music).await;

        // Narrate first so the stop precedes every player's outcome
        self.events.music_stopped(round, round);
        let generation = self.gate.stop()?;
        if generation != round {
            return Err(GameError::invariant(format!(
                "round {} stopped the music at generation {}",
                round, generation
            )));
        }

        tokio::time::sleep(self.config.grace()).await;

        self.enter(CoordinatorPhase::Draining);
        let outcomes = self.collect_outcomes(generation, active).await?;
        let (seated, eliminated): (Vec<SeatOutcome>, Vec<SeatOutcome>) =
            outcomes.into_iter().partition(SeatOutcome::is_seated);
        let seated: Vec<PlayerId> = seated.into_iter().map(|o| o.player).collect();
        let eliminated: Vec<PlayerId> = eliminated.into_iter().map(|o| o.player).collect();

        if seated.len() != chairs || eliminated.len() != active - chairs {
            return Err(GameError::invariant(format!(
                "round {} had {} chairs for {} players but {} sat and {} were eliminated",
                round,
                chairs,
                active,
                seated.len(),
                eliminated.len()
            )));
        }

        let remaining = self.count_active_participants().await;
        if remaining != seated.len() {
            return Err(GameError::invariant(format!(
                "round {} left {} active players but {} were seated",
                round,
                remaining,
                seated.len()
            )));
        }

        self.enter(CoordinatorPhase::Resetting);
        self.reset_round(remaining).await?;
        info!(round, remaining, ?eliminated, "Round complete");
        self.events.round_completed(round, remaining);

        Ok(RoundReport {
            round,
            generation,
            active_players: active,
            chairs,
            seated,
            eliminated,
        })
    }

    /// Wait for exactly one outcome from each player in the round
    async fn collect_outcomes(&mut self, generation: u64, expected: usize) -> Result<Vec<SeatOutcome>, GameError> {
        debug!(generation, expected, "Coordinator::collect_outcomes: called");
        let mut seen = HashSet::with_capacity(expected);
        let mut outcomes = Vec::with_capacity(expected);

        while outcomes.len() < expected {
            let Some(outcome) = self.outcomes.recv().await else {
                return Err(GameError::invariant(format!(
                    "players hung up after {} of {} outcomes in generation {}",
                    outcomes.len(),
                    expected,
                    generation
                )));
            };
            if outcome.generation != generation {
                return Err(GameError::invariant(format!(
                    "{} reported for generation {} during generation {}",
                    outcome.player, outcome.generation, generation
                )));
            }
            if !seen.insert(outcome.player) {
                return Err(GameError::invariant(format!(
                    "{} reported twice in generation {}",
                    outcome.player, generation
                )));
            }
            outcomes.push(outcome);
        }

        Ok(outcomes)
    }

    /// Take a chair away and re-arm every player for the next generation
    ///
    /// Every player in the round has reported, so none is mid-attempt.
    async fn reset_round(&mut self, remaining: usize) -> Result<(), GameError> {
        let chairs = remaining.saturating_sub(1);
        debug!(remaining, chairs, "Coordinator::reset_round: called");
        self.pool.reset(chairs)?;
        for player in &self.roster {
            player.reset_round().await;
        }
        self.gate.resume();
        Ok(())
    }

    async fn find_winner(&self, active: usize) -> Result<Option<PlayerId>, GameError> {
        let mut winners = Vec::new();
        for player in &self.roster {
            if player.is_active().await {
                winners.push(player.id());
            }
        }
        if winners.len() != active || winners.len() > 1 {
            return Err(GameError::invariant(format!(
                "expected at most one survivor, found {:?}",
                winners
            )));
        }
        Ok(winners.pop())
    }

    fn music_duration(&mut self) -> Duration {
        let ms = self
            .rng
            .random_range(self.config.music_min_ms..=self.config.music_max_ms);
        Duration::from_millis(ms)
    }

    fn enter(&mut self, phase: CoordinatorPhase) {
        debug!(from = ?self.phase, to = ?phase, "Coordinator: phase transition");
        self.phase = phase;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::participant::PlayerTask;

    fn fast_config() -> CoordinatorConfig {
        CoordinatorConfig {
            music_min_ms: 0,
            music_max_ms: 2,
            grace_ms: 1,
            seed: Some(7),
        }
    }

    fn roster(n: usize) -> Vec<Arc<Player>> {
        (1..=n).map(|i| Arc::new(Player::new(PlayerId(i)))).collect()
    }

    #[test]
    fn test_music_duration_within_bounds() {
        let (_tx, rx) = mpsc::channel(1);
        let mut coordinator = Coordinator::new(
            CoordinatorConfig {
                music_min_ms: 10,
                music_max_ms: 20,
                grace_ms: 0,
                seed: Some(1),
            },
            Arc::new(ChairPool::new(1).unwrap()),
            Arc::new(MusicGate::new()),
            roster(2),
            rx,
            EventBus::new(4),
        );
        for _ in 0..100 {
            let d = coordinator.music_duration();
            assert!(d >= Duration::from_millis(10) && d <= Duration::from_millis(20));
        }
    }

    #[tokio::test]
    async fn test_empty_roster_is_configuration_error() {
        let (_tx, rx) = mpsc::channel(1);
        let coordinator = Coordinator::new(
            fast_config(),
            Arc::new(ChairPool::new(0).unwrap()),
            Arc::new(MusicGate::new()),
            Vec::new(),
            rx,
            EventBus::new(4),
        );
        assert!(coordinator.run_game().await.unwrap_err().is_configuration());
    }

    #[tokio::test]
    async fn test_single_player_wins_without_rounds() {
        let (_tx, rx) = mpsc::channel(1);
        let gate = Arc::new(MusicGate::new());
        let coordinator = Coordinator::new(
            fast_config(),
            Arc::new(ChairPool::new(0).unwrap()),
            gate.clone(),
            roster(1),
            rx,
            EventBus::new(4),
        );
        let summary = coordinator.run_game().await.unwrap();
        assert_eq!(summary.winner, Some(PlayerId(1)));
        assert_eq!(summary.rounds, 0);
        assert_eq!(gate.generation(), 0);
        assert!(gate.state().finished);
    }

    #[tokio::test]
    async fn test_pool_mismatch_aborts() {
        let (_tx, rx) = mpsc::channel(1);
        let gate = Arc::new(MusicGate::new());
        let coordinator = Coordinator::new(
            fast_config(),
            Arc::new(ChairPool::new(5).unwrap()),
            gate.clone(),
            roster(3),
            rx,
            EventBus::new(4),
        );
        assert!(coordinator.run_game().await.unwrap_err().is_invariant_violation());
        // Players would be released rather than left waiting
        assert!(gate.state().finished);
    }

    #[tokio::test]
    async fn test_stale_outcome_aborts() {
        let (tx, rx) = mpsc::channel(4);
        let coordinator = Coordinator::new(
            fast_config(),
            Arc::new(ChairPool::new(1).unwrap()),
            Arc::new(MusicGate::new()),
            roster(2),
            rx,
            EventBus::new(4),
        );

        tx.send(SeatOutcome {
            player: PlayerId(1),
            generation: 9,
            seat: crate::participant::Seat::Eliminated,
        })
        .await
        .unwrap();

        assert!(coordinator.run_game().await.unwrap_err().is_invariant_violation());
    }

    #[tokio::test]
    async fn test_players_hanging_up_aborts() {
        let (tx, rx) = mpsc::channel(4);
        drop(tx);
        let coordinator = Coordinator::new(
            fast_config(),
            Arc::new(ChairPool::new(1).unwrap()),
            Arc::new(MusicGate::new()),
            roster(2),
            rx,
            EventBus::new(4),
        );
        assert!(coordinator.run_game().await.unwrap_err().is_invariant_violation());
    }

    #[tokio::test]
    async fn test_round_splits_seated_and_eliminated() {
        let (tx, rx) = mpsc::channel(4);
        let pool = Arc::new(ChairPool::new(2).unwrap());
        let gate = Arc::new(MusicGate::new());
        let players = roster(3);
        let events = EventBus::new(64);

        let mut tasks = Vec::new();
        for player in &players {
            let task = PlayerTask::new(player.clone(), &gate, pool.clone(), tx.clone(), events.clone());
            tasks.push(tokio::spawn(task.run_loop()));
        }
        drop(tx);

        let coordinator = Coordinator::new(fast_config(), pool, gate, players, rx, events);
        let summary = coordinator.run_game().await.unwrap();

        assert_eq!(summary.rounds, 2);
        let first = &summary.reports[0];
        assert_eq!((first.active_players, first.chairs), (3, 2));
        assert_eq!(first.seated.len(), 2);
        assert_eq!(first.eliminated.len(), 1);
        assert!(!first.seated.contains(&first.eliminated[0]));
        assert_eq!(summary.reports[1].seated, vec![summary.winner.unwrap()]);
        assert_eq!(summary.eliminations.len(), 2);

        for task in tasks {
            task.await.unwrap().unwrap();
        }
    }
}
