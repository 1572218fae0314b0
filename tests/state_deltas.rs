use sensei_terminal::chat::{CHAT_FAILED_NOTICE, ChatRole};
use sensei_terminal::session::Session;
use sensei_terminal::state::{
    AppState, Delta, NO_PLAYERS_NOTICE, PLAYER_FETCH_ERROR, PLAYERS_FETCH_ERROR, Player, Screen,
    apply_delta,
};

fn sample_player(id: &str) -> Player {
    Player {
        id: id.to_string(),
        name: "Ayo Adebayo".to_string(),
        position: "Point Guard".to_string(),
        image: None,
        height: Some(188.0),
        weight: Some(82.0),
        diet_plan: None,
        training_plan: Some("Ball-handling circuits".to_string()),
        performance_review: None,
    }
}

fn sample_session() -> Session {
    Session {
        coach_id: "c1".to_string(),
        token: "t1".to_string(),
    }
}

#[test]
fn session_started_navigates_to_dashboard_and_clears_form() {
    let mut state = AppState::new();
    state.login.email = "coach@example.com".to_string();
    state.login.password = "pw123".to_string();
    state.login.in_flight = true;
    state.login.error = Some("old error".to_string());

    apply_delta(&mut state, Delta::SessionStarted(sample_session()));

    assert_eq!(state.screen, Screen::Dashboard);
    assert_eq!(state.session.as_ref().map(|s| s.coach_id.as_str()), Some("c1"));
    assert!(!state.login.in_flight);
    assert!(state.login.error.is_none());
    assert!(state.login.password.is_empty());
    assert!(state.players_loading);
}

#[test]
fn login_failed_keeps_login_screen_and_shows_message() {
    let mut state = AppState::new();
    state.login.in_flight = true;

    apply_delta(&mut state, Delta::LoginFailed("Unknown coach email".to_string()));

    assert_eq!(state.screen, Screen::Login);
    assert!(state.session.is_none());
    assert!(!state.login.in_flight);
    assert_eq!(state.login.error.as_deref(), Some("Unknown coach email"));
}

#[test]
fn empty_roster_is_not_an_error() {
    let mut state = AppState::new();
    state.screen = Screen::Dashboard;
    state.players_loading = true;

    apply_delta(&mut state, Delta::SetPlayers(Vec::new()));

    assert!(!state.players_loading);
    assert!(state.players_error.is_none());
    assert!(state.players.is_empty());
    // The empty state renders its own notice, distinct from the error text.
    assert_ne!(NO_PLAYERS_NOTICE, PLAYERS_FETCH_ERROR);
}

#[test]
fn players_failure_clears_loading_and_sets_generic_error() {
    let mut state = AppState::new();
    state.screen = Screen::Dashboard;
    state.players_loading = true;

    apply_delta(
        &mut state,
        Delta::PlayersFailed(PLAYERS_FETCH_ERROR.to_string()),
    );

    assert!(!state.players_loading);
    assert_eq!(state.players_error.as_deref(), Some(PLAYERS_FETCH_ERROR));
}

#[test]
fn player_detail_applies_only_to_matching_profile() {
    let mut state = AppState::new();
    state.open_profile("p1".to_string());
    assert!(state.player_loading);

    apply_delta(&mut state, Delta::SetPlayerDetail(sample_player("p2")));
    assert!(state.player_loading);
    assert!(state.player_detail.is_none());

    apply_delta(&mut state, Delta::SetPlayerDetail(sample_player("p1")));
    assert!(!state.player_loading);
    assert_eq!(state.player_detail.as_ref().map(|p| p.id.as_str()), Some("p1"));
}

#[test]
fn player_detail_failure_halts_the_card() {
    let mut state = AppState::new();
    state.open_profile("p1".to_string());

    apply_delta(
        &mut state,
        Delta::PlayerDetailFailed {
            player_id: "p1".to_string(),
            message: PLAYER_FETCH_ERROR.to_string(),
        },
    );

    assert!(!state.player_loading);
    assert_eq!(state.player_error.as_deref(), Some(PLAYER_FETCH_ERROR));
    assert!(state.player_detail.is_none());
}

#[test]
fn chat_reply_appends_assistant_and_optimistically_updates_training_plan() {
    let mut state = AppState::new();
    state.open_profile("p1".to_string());
    apply_delta(&mut state, Delta::SetPlayerDetail(sample_player("p1")));

    state.chat.input = "Change tactics to zone defense".to_string();
    let submission = state.chat.submit().expect("submit should produce a request");
    assert!(submission.tactics);
    assert_eq!(state.chat.messages.len(), 1);
    assert_eq!(state.chat.messages[0].role, ChatRole::User);

    let reply = "Run a 2-3 zone with aggressive wing traps.".to_string();
    apply_delta(
        &mut state,
        Delta::ChatReply {
            player_id: Some("p1".to_string()),
            reply: reply.clone(),
            update_training_plan: true,
        },
    );

    assert_eq!(state.chat.messages.len(), 2);
    assert_eq!(state.chat.messages[1].role, ChatRole::Assistant);
    assert_eq!(state.chat.messages[1].content, reply);
    // Local copy mutates immediately, before any PUT confirmation exists.
    assert_eq!(
        state.player_detail.as_ref().and_then(|p| p.training_plan.as_deref()),
        Some(reply.as_str())
    );
}

#[test]
fn chat_reply_for_a_left_view_is_dropped() {
    let mut state = AppState::new();
    state.open_profile("p1".to_string());
    state.chat.input = "How is his conditioning?".to_string();
    state.chat.submit().expect("submit should produce a request");

    state.back_to_dashboard();

    apply_delta(
        &mut state,
        Delta::ChatReply {
            player_id: Some("p1".to_string()),
            reply: "Better every week.".to_string(),
            update_training_plan: false,
        },
    );

    assert!(state.chat.messages.is_empty());
    assert!(!state.chat.pending);
}

#[test]
fn chat_failure_is_absorbed_as_assistant_notice() {
    let mut state = AppState::new();
    state.open_profile("p1".to_string());
    state.chat.input = "Any advice?".to_string();
    state.chat.submit().expect("submit should produce a request");

    apply_delta(
        &mut state,
        Delta::ChatFailed {
            player_id: Some("p1".to_string()),
        },
    );

    assert_eq!(state.chat.messages.len(), 2);
    assert_eq!(state.chat.messages[1].role, ChatRole::Assistant);
    assert_eq!(state.chat.messages[1].content, CHAT_FAILED_NOTICE);
    assert!(state.player_error.is_none());
}

#[test]
fn log_delta_lands_in_the_console_buffer() {
    let mut state = AppState::new();
    apply_delta(&mut state, Delta::Log("[WARN] something".to_string()));
    assert_eq!(state.logs.back().map(String::as_str), Some("[WARN] something"));
}
