use prediction_gateway::prediction::{
    parse_prediction_response, validate_game_request, validate_player_request, PredictionKind,
    PredictionResult,
};
use serde_json::json;

#[test]
fn test_same_team_example_is_rejected() {
    let err = validate_game_request(&json!({
        "home_team_id": 5,
        "away_team_id": 5,
        "game_date": "2025-12-08T19:00:00Z",
    }))
    .expect_err("same team on both sides must fail");
    assert!(err
        .errors
        .iter()
        .any(|e| e.reason == "away_team_id equals home_team_id"));
    assert!(err.has_field("home_team_id"));
}

#[test]
fn test_out_of_range_and_bad_date_reported_together() {
    let err = validate_game_request(&json!({
        "home_team_id": 3,
        "away_team_id": 40,
        "game_date": "not-a-date",
    }))
    .expect_err("two invalid fields");
    let fields: Vec<&str> = err.errors.iter().map(|e| e.field.as_str()).collect();
    assert_eq!(fields, vec!["away_team_id", "game_date"]);
}

#[test]
fn test_every_team_id_outside_range_names_the_field() {
    for id in (-3..=0).chain(31..=35) {
        let err = validate_game_request(&json!({
            "home_team_id": 1,
            "away_team_id": id,
            "game_date": "2025-12-08T19:00:00Z",
        }))
        .expect_err("out-of-range away id");
        assert!(err.has_field("away_team_id"), "id {id}");
        assert!(!err.has_field("home_team_id"), "id {id}");
    }
}

#[test]
fn test_normalized_requests_revalidate_unchanged() {
    for home in 1..=30u32 {
        let away = if home == 30 { 1 } else { home + 1 };
        let once = validate_game_request(&json!({
            "home_team_id": home.to_string(),
            "away_team_id": away,
            "game_date": "2026-01-15T20:00:00.5-08:00",
        }))
        .expect("valid request");
        let twice = validate_game_request(&once.to_raw()).expect("normalized request");
        assert_eq!(once, twice);
    }

    let player = validate_player_request(&json!({
        "player_id": 2544,
        "opponent_team_id": 5,
        "game_date": "2024-12-15T19:30:00Z",
    }))
    .expect("valid player request");
    assert_eq!(validate_player_request(&player.to_raw()).expect("normalized"), player);
}

#[test]
fn test_documented_game_response_parses_exactly() {
    let result = parse_prediction_response(
        &json!({
            "home_win_probability": 0.62,
            "away_win_probability": 0.38,
            "confidence": 0.81,
        }),
        PredictionKind::Game,
    )
    .expect("valid response");
    match result {
        PredictionResult::Game(game) => {
            assert_eq!(game.home_win_probability, 0.62);
            assert_eq!(game.away_win_probability, 0.38);
            assert_eq!(game.confidence, 0.81);
        }
        other => panic!("expected game result, got {other:?}"),
    }
}

#[test]
fn test_probabilities_summing_to_095_are_rejected() {
    let err = parse_prediction_response(
        &json!({
            "home_win_probability": 0.57,
            "away_win_probability": 0.38,
            "confidence": 0.81,
        }),
        PredictionKind::Game,
    )
    .expect_err("sum outside tolerance");
    assert_eq!(err.kind, PredictionKind::Game);
}
