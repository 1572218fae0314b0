use std::sync::mpsc::{Receiver, Sender};
use std::thread;
use std::time::Duration;

use rand::Rng;

use crate::chat::is_tactics_trigger;
use crate::session::Session;
use crate::state::{Delta, LOGIN_FALLBACK_ERROR, PLAYER_FETCH_ERROR, Player, ProviderCommand};

const DEMO_COACH_ID: &str = "demo-coach";

const CANNED_REPLIES: [&str; 4] = [
    "Work on transition defense this week; close-outs were late in the last scrimmage.",
    "Shot selection looks good. Add two extra free-throw blocks after practice.",
    "Conditioning is trending up. Keep the interval sessions at three per week.",
    "Focus on off-ball movement; too many possessions end in isolation.",
];

const TACTICS_PLANS: [&str; 3] = [
    "Switch to a 2-3 zone base, trap the first pass past half court, and run the press break drill daily.",
    "Drop to a pack-line setup, deny the high post, and rehearse late-clock switching twice a week.",
    "Full-court man pressure for the first quarter, then rotate into matchup zone looks.",
];

/// Offline stand-in for the real provider: same command/delta contract, but
/// every answer comes from a seeded roster and canned assistant lines, with a
/// little latency so the in-flight states are visible.
pub fn spawn_demo_provider(tx: Sender<Delta>, cmd_rx: Receiver<ProviderCommand>) {
    thread::spawn(move || {
        let mut rng = rand::thread_rng();
        let roster = seed_roster();

        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                ProviderCommand::Login { email, password } => {
                    pause(&mut rng);
                    if email.trim().is_empty() || password.trim().is_empty() {
                        let _ = tx.send(Delta::LoginFailed(LOGIN_FALLBACK_ERROR.to_string()));
                    } else {
                        // Demo sessions stay in memory; the session file on
                        // disk is left alone.
                        let _ = tx.send(Delta::SessionStarted(Session {
                            coach_id: DEMO_COACH_ID.to_string(),
                            token: "demo-token".to_string(),
                        }));
                    }
                }
                ProviderCommand::FetchPlayers { coach_id } => {
                    pause(&mut rng);
                    if coach_id == DEMO_COACH_ID {
                        let _ = tx.send(Delta::SetPlayers(roster.clone()));
                    } else {
                        let _ = tx.send(Delta::SetPlayers(Vec::new()));
                    }
                }
                ProviderCommand::FetchPlayer { player_id } => {
                    pause(&mut rng);
                    match roster.iter().find(|p| p.id == player_id) {
                        Some(player) => {
                            let _ = tx.send(Delta::SetPlayerDetail(player.clone()));
                        }
                        None => {
                            let _ = tx.send(Delta::PlayerDetailFailed {
                                player_id,
                                message: PLAYER_FETCH_ERROR.to_string(),
                            });
                        }
                    }
                }
                ProviderCommand::SendChat {
                    message,
                    player_id,
                    tactics,
                } => {
                    pause(&mut rng);
                    let reply = demo_reply(&mut rng, &message, player_id.as_deref(), &roster);
                    let _ = tx.send(Delta::ChatReply {
                        update_training_plan: tactics && player_id.is_some(),
                        player_id,
                        reply,
                    });
                }
            }
        }
    });
}

fn demo_reply(
    rng: &mut impl Rng,
    message: &str,
    player_id: Option<&str>,
    roster: &[Player],
) -> String {
    let body = if is_tactics_trigger(message) {
        TACTICS_PLANS[rng.gen_range(0..TACTICS_PLANS.len())]
    } else {
        CANNED_REPLIES[rng.gen_range(0..CANNED_REPLIES.len())]
    };
    let player = player_id.and_then(|id| roster.iter().find(|p| p.id == id));
    match player {
        Some(player) => format!("For {}: {body}", player.name),
        None => body.to_string(),
    }
}

fn pause(rng: &mut impl Rng) {
    thread::sleep(Duration::from_millis(rng.gen_range(120..450)));
}

fn seed_roster() -> Vec<Player> {
    vec![
        seed_player(
            "p-ayo",
            "Ayo Adebayo",
            "Point Guard",
            188.0,
            82.0,
            "High-carb on game days, 3L water minimum.",
            "Ball-handling circuits, 45 min daily.",
            "Led the team in assists across the last five games.",
        ),
        seed_player(
            "p-marta",
            "Marta Silva",
            "Shooting Guard",
            179.0,
            70.0,
            "Lean protein focus, no late-night meals.",
            "Catch-and-shoot ladder, 300 attempts per session.",
            "Three-point percentage up 6 points this month.",
        ),
        seed_player(
            "p-dimitri",
            "Dimitri Volkov",
            "Center",
            208.0,
            104.0,
            "Calorie surplus, supervised by team nutritionist.",
            "Post footwork plus short-roll passing reads.",
            "Rim protection solid; foul count needs work.",
        ),
        seed_player(
            "p-kenji",
            "Kenji Sato",
            "Small Forward",
            198.0,
            92.0,
            "Standard plan with extra omega-3.",
            "Wing close-out drills and weak-hand finishing.",
            "Best two-way outing of the season last Friday.",
        ),
    ]
}

#[allow(clippy::too_many_arguments)]
fn seed_player(
    id: &str,
    name: &str,
    position: &str,
    height: f32,
    weight: f32,
    diet: &str,
    training: &str,
    review: &str,
) -> Player {
    Player {
        id: id.to_string(),
        name: name.to_string(),
        position: position.to_string(),
        image: None,
        height: Some(height),
        weight: Some(weight),
        diet_plan: Some(diet.to_string()),
        training_plan: Some(training.to_string()),
        performance_review: Some(review.to_string()),
    }
}
