//! Game results.

use crate::players::PlayerState;
use derive_new::new;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tsuro_core::Color;

/// A player leaving the game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct Elimination {
    /// Player name.
    #[new(into)]
    pub name: String,
    /// Player color.
    pub color: Color,
    /// How the player left: dead, collided, or ejected.
    pub state: PlayerState,
}

/// Eliminations keyed by the round they happened in.
///
/// Serializes as a JSON object from round number to eliminations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameResults {
    rounds: BTreeMap<u32, Vec<Elimination>>,
}

impl GameResults {
    /// Empty results.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an elimination in `round`.
    pub fn record(&mut self, round: u32, elimination: Elimination) {
        self.rounds.entry(round).or_default().push(elimination);
    }

    /// Eliminations in one round, in the order they happened.
    pub fn round(&self, round: u32) -> &[Elimination] {
        self.rounds.get(&round).map(Vec::as_slice).unwrap_or_default()
    }

    /// Rounds with eliminations, oldest first.
    pub fn rounds(&self) -> impl DoubleEndedIterator<Item = (u32, &[Elimination])> {
        self.rounds.iter().map(|(&round, eliminated)| (round, eliminated.as_slice()))
    }

    /// Total number of eliminations.
    pub fn len(&self) -> usize {
        self.rounds.values().map(Vec::len).sum()
    }

    /// Whether nobody has been eliminated.
    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }

    /// Ranks the players: ejected players lose, everyone else is grouped by
    /// the round they went out in, latest round first.
    pub fn outcome(&self) -> GameOutcome {
        let mut outcome = GameOutcome::default();
        for (_, eliminated) in self.rounds().rev() {
            let mut winners = Vec::new();
            for elimination in eliminated {
                if elimination.state == PlayerState::Ejected {
                    outcome.losers.push(elimination.name.clone());
                } else {
                    winners.push(elimination.name.clone());
                }
            }
            if !winners.is_empty() {
                outcome.winners.push(winners);
            }
        }
        outcome
    }
}

/// Final standings: `{"losers": [...], "winners": [[...], ...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOutcome {
    /// Ejected players.
    pub losers: Vec<String>,
    /// Remaining players grouped by round, most recent round first.
    pub winners: Vec<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn out(name: &str, color: Color, state: PlayerState) -> Elimination {
        Elimination {
            name: name.to_string(),
            color,
            state,
        }
    }

    #[test]
    fn test_outcome_orders_rounds_newest_first() {
        let mut results = GameResults::new();
        results.record(0, out("ann", Color::White, PlayerState::Ejected));
        results.record(0, out("bob", Color::Black, PlayerState::Dead));
        results.record(3, out("cat", Color::Red, PlayerState::Collided));
        results.record(3, out("dan", Color::Green, PlayerState::Dead));
        results.record(5, out("eve", Color::Blue, PlayerState::Ejected));

        let outcome = results.outcome();
        assert_eq!(outcome.losers, vec!["eve", "ann"]);
        assert_eq!(
            outcome.winners,
            vec![vec!["cat".to_string(), "dan".to_string()], vec!["bob".to_string()]]
        );
        assert_eq!(results.len(), 5);
    }

    #[test]
    fn test_results_json_keys_are_rounds() {
        let mut results = GameResults::new();
        results.record(2, out("ann", Color::White, PlayerState::Dead));
        let json = serde_json::to_value(&results).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"2": [{"name": "ann", "color": "white", "state": "DEAD"}]})
        );
        let parsed: GameResults = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, results);
    }
}
