//! Batch drivers: whole local games and single turn checks.

use serde_json::{Value, json};
use tsuro::{Replay, check_turn, run_game};
use tsuro_core::{Color, Placement, Port, Position, Token};

fn moves(value: Value) -> Vec<Value> {
    value.as_array().cloned().unwrap()
}

#[tokio::test]
async fn test_run_game_ranks_every_player() {
    let names: Vec<String> = ["ann", "bo", "cy", "dee", "eve"].map(String::from).to_vec();
    let outcome = run_game(&names).await.unwrap();

    let mut ranked: Vec<String> = outcome
        .losers
        .iter()
        .chain(outcome.winners.iter().flatten())
        .cloned()
        .collect();
    ranked.sort();
    assert_eq!(ranked, names);
    assert!(outcome.winners.iter().all(|group| !group.is_empty()));
}

#[tokio::test]
async fn test_run_game_is_deterministic() {
    let names: Vec<String> = ["ann", "bo", "cy"].map(String::from).to_vec();
    assert_eq!(run_game(&names).await.unwrap(), run_game(&names).await.unwrap());
}

#[tokio::test]
async fn test_run_game_rejects_bad_rosters() {
    assert!(run_game(&["solo".to_string()]).await.is_err());
    let six: Vec<String> = (0..6).map(|i| format!("p{i}")).collect();
    assert!(run_game(&six).await.is_err());
}

#[test]
fn test_replay_moves_tokens_along_paths() {
    let mut replay = Replay::new();
    replay
        .apply(&Placement::from_json_array(&json!([33, 0, "green", "A", 2, 0])).unwrap())
        .unwrap();
    assert_eq!(
        replay.token(Color::Green),
        Some(Token::new(Position::new(2, 0).unwrap(), Port::F))
    );

    replay
        .apply(&Placement::from_json_array(&json!(["green", 33, 0, 2, 1])).unwrap())
        .unwrap();
    assert_eq!(
        replay.token(Color::Green),
        Some(Token::new(Position::new(2, 1).unwrap(), Port::F))
    );
    assert_eq!(replay.board().tile_count(), 2);
    assert_eq!(replay.token(Color::Red), None);
}

#[test]
fn test_check_turn_accepts_the_facing_cell() {
    let input = moves(json!([
        [33, 0, "green", "A", 2, 0],
        [["green", 33, 0, 2, 1], 0, 1]
    ]));
    assert!(check_turn(&input).unwrap());
}

#[test]
fn test_check_turn_rejects_the_wrong_cell() {
    let input = moves(json!([
        [33, 0, "green", "A", 2, 0],
        [["green", 33, 0, 3, 1], 0, 1]
    ]));
    assert!(!check_turn(&input).unwrap());
}

#[test]
fn test_check_turn_rejects_avoidable_suicide() {
    // Tile 0 sends green back into its opening tile and off the top edge,
    // while tile 33 would carry it further down.
    let input = moves(json!([
        [33, 0, "green", "A", 2, 0],
        [["green", 0, 0, 2, 1], 33, 1]
    ]));
    assert!(!check_turn(&input).unwrap());
}

#[test]
fn test_check_turn_needs_a_token() {
    let input = moves(json!([
        [33, 0, "green", "A", 2, 0],
        [["red", 33, 0, 5, 1], 0, 1]
    ]));
    assert!(check_turn(&input).is_err());
}

#[test]
fn test_check_turn_rejects_malformed_input() {
    assert!(check_turn(&[]).is_err());
    assert!(check_turn(&moves(json!([[["green", 33, 0, 2, 1], 0]]))).is_err());
    assert!(check_turn(&moves(json!([[33, 0, "green", "A", 2, 0], "nonsense"]))).is_err());
}
