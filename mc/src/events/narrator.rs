//! Console narrator - prints game events as they happen

use colored::*;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use super::bus::EventBus;
use super::types::GameEvent;

/// Render one event as a console line
pub fn render(event: &GameEvent) -> String {
    match event {
        GameEvent::GameStarted { players, chairs } => format!(
            "{} {} players, {} chairs",
            "Musical chairs!".bold(),
            players,
            chairs
        ),
        GameEvent::RoundStarted {
            round,
            active_players,
            chairs,
        } => format!(
            "\n{} {} players, {} chairs. The music is playing...",
            format!("Round {}:", round).cyan().bold(),
            active_players,
            chairs
        ),
        GameEvent::MusicStopped { .. } => "> The music stopped! Everyone scrambles for a chair."
            .magenta()
            .to_string(),
        GameEvent::PlayerSeated { player, chair, .. } => {
            format!("  {} {} sat in chair {}", "✓".green(), player, chair)
        }
        GameEvent::PlayerEliminated { player, .. } => {
            format!("  {} {} found no chair and is out", "✗".red(), player)
        }
        GameEvent::RoundCompleted { round, remaining } => {
            format!("Round {} over, {} left", round, remaining).dimmed().to_string()
        }
        GameEvent::Winner { player, rounds } => format!(
            "\n{} {} wins after {} rounds!",
            "🏆".yellow(),
            player.to_string().yellow().bold(),
            rounds
        ),
        GameEvent::NoWinner { rounds } => format!("\n{} after {} rounds", "Nobody is left".red().bold(), rounds),
    }
}

/// Spawn the narrator as a background task
///
/// Subscribes before returning so no event emitted afterwards is missed.
/// The task ends once every bus handle is dropped.
pub fn spawn_narrator(event_bus: &EventBus) -> tokio::task::JoinHandle<()> {
    let mut rx = event_bus.subscribe();
    tokio::spawn(async move {
        debug!("narrator: started");
        loop {
            match rx.recv().await {
                Ok(event) => println!("{}", render(&event)),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(missed = n, "narrator: lagged behind, missed events");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("narrator: channel closed, shutting down");
                    break;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::participant::PlayerId;

    #[test]
    fn test_render_lines() {
        colored::control::set_override(false);

        let line = render(&GameEvent::PlayerSeated {
            round: 1,
            player: PlayerId(2),
            chair: 3,
        });
        assert_eq!(line, "  ✓ player 2 sat in chair 3");

        let line = render(&GameEvent::PlayerEliminated {
            round: 1,
            player: PlayerId(4),
        });
        assert!(line.contains("player 4"));
        assert!(line.contains("out"));

        let line = render(&GameEvent::Winner {
            player: PlayerId(1),
            rounds: 3,
        });
        assert!(line.contains("player 1 wins after 3 rounds"));
    }

    #[tokio::test]
    async fn test_narrator_stops_when_bus_dropped() {
        let bus = EventBus::new(8);
        let handle = spawn_narrator(&bus);
        bus.game_started(2, 1);
        drop(bus);
        tokio::time::timeout(std::time::Duration::from_secs(1), handle)
            .await
            .expect("narrator should stop once the bus is gone")
            .unwrap();
    }
}
