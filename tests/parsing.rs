use std::fs;
use std::path::PathBuf;

use sensei_terminal::api::{
    parse_chat_reply_json, parse_login_error_json, parse_login_json, parse_player_json,
    parse_players_json,
};
use sensei_terminal::state::LOGIN_FALLBACK_ERROR;

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn parses_login_fixture() {
    let raw = read_fixture("login_success.json");
    let session = parse_login_json(&raw).expect("fixture should parse");
    assert_eq!(session.coach_id, "c1");
    assert_eq!(session.token, "t1");
}

#[test]
fn login_error_prefers_backend_message() {
    let raw = read_fixture("login_error.json");
    assert_eq!(parse_login_error_json(&raw), "Unknown coach email");
}

#[test]
fn login_error_falls_back_without_message() {
    assert_eq!(parse_login_error_json("{}"), LOGIN_FALLBACK_ERROR);
    assert_eq!(parse_login_error_json("not json"), LOGIN_FALLBACK_ERROR);
    assert_eq!(
        parse_login_error_json(r#"{ "message": "  " }"#),
        LOGIN_FALLBACK_ERROR
    );
}

#[test]
fn parses_players_fixture() {
    let raw = read_fixture("players.json");
    let players = parse_players_json(&raw).expect("fixture should parse");
    assert_eq!(players.len(), 2);
    assert_eq!(players[0].id, "p1");
    assert_eq!(players[0].position, "Point Guard");
    assert_eq!(players[0].height, Some(188.0));
    assert_eq!(players[0].diet_plan.as_deref(), Some("High-carb on game days"));
    // Second entry only carries the required fields plus an image.
    assert_eq!(players[1].id, "p2");
    assert!(players[1].position.is_empty());
    assert!(players[1].training_plan.is_none());
    assert_eq!(
        players[1].image.as_deref(),
        Some("https://example.com/marta.png")
    );
}

#[test]
fn players_null_is_empty() {
    assert!(parse_players_json("null").expect("null should parse").is_empty());
    assert!(parse_players_json("  ").expect("blank should parse").is_empty());
}

#[test]
fn parses_player_fixture_with_plain_id() {
    let raw = read_fixture("player.json");
    let player = parse_player_json(&raw).expect("fixture should parse");
    assert_eq!(player.id, "p3");
    assert_eq!(player.name, "Dimitri Volkov");
    assert_eq!(player.height, Some(208.5));
    assert_eq!(player.training_plan.as_deref(), Some("Post footwork"));
    assert!(player.performance_review.is_none());
}

#[test]
fn parses_chat_reply_fixture() {
    let raw = read_fixture("chat_reply.json");
    let reply = parse_chat_reply_json(&raw).expect("fixture should parse");
    assert_eq!(reply, "Switch to a zone press for the first quarter.");
}

#[test]
fn chat_reply_must_be_present_and_non_blank() {
    assert!(parse_chat_reply_json("{}").is_err());
    assert!(parse_chat_reply_json(r#"{ "reply": "" }"#).is_err());
    assert!(parse_chat_reply_json(r#"{ "reply": "   " }"#).is_err());
}
