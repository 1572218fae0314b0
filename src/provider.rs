use std::env;
use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use crate::api;
use crate::session;
use crate::state::{Delta, PLAYER_FETCH_ERROR, PLAYERS_FETCH_ERROR, ProviderCommand};

/// Background worker owning all network I/O. Commands arrive over the channel
/// from the UI thread; each one becomes an independent job on a small fetch
/// pool, so a slow call never delays another. The thread exits when the UI
/// drops its sender.
pub fn spawn_provider(tx: Sender<Delta>, cmd_rx: Receiver<ProviderCommand>) {
    thread::spawn(move || {
        let base = api::api_base();
        let pool = build_fetch_pool();

        while let Ok(cmd) = cmd_rx.recv() {
            handle_command(cmd, &base, pool.as_ref(), &tx);
        }
    });
}

fn handle_command(
    cmd: ProviderCommand,
    base: &str,
    pool: Option<&rayon::ThreadPool>,
    tx: &Sender<Delta>,
) {
    match cmd {
        ProviderCommand::Login { email, password } => {
            let tx = tx.clone();
            let base = base.to_string();
            run_job(pool, move || {
                match api::login(&base, &email, &password) {
                    Ok(session) => {
                        if let Err(err) = session::save(&session) {
                            let _ = tx.send(Delta::Log(format!("[WARN] Session save error: {err}")));
                        }
                        let _ = tx.send(Delta::SessionStarted(session));
                    }
                    Err(err) => {
                        let _ = tx.send(Delta::Log(format!("[WARN] Login error: {err:#}")));
                        let _ = tx.send(Delta::LoginFailed(api::login_failure_message(&err)));
                    }
                }
            });
        }
        ProviderCommand::FetchPlayers { coach_id } => {
            let tx = tx.clone();
            let base = base.to_string();
            run_job(pool, move || {
                match api::fetch_players(&base, &coach_id) {
                    Ok(players) => {
                        let _ = tx.send(Delta::SetPlayers(players));
                    }
                    Err(err) => {
                        let _ = tx.send(Delta::Log(format!("[WARN] Players fetch error: {err:#}")));
                        let _ = tx.send(Delta::PlayersFailed(PLAYERS_FETCH_ERROR.to_string()));
                    }
                }
            });
        }
        ProviderCommand::FetchPlayer { player_id } => {
            let tx = tx.clone();
            let base = base.to_string();
            run_job(pool, move || {
                match api::fetch_player(&base, &player_id) {
                    Ok(player) => {
                        let _ = tx.send(Delta::SetPlayerDetail(player));
                    }
                    Err(err) => {
                        let _ = tx.send(Delta::Log(format!("[WARN] Player fetch error: {err:#}")));
                        let _ = tx.send(Delta::PlayerDetailFailed {
                            player_id,
                            message: PLAYER_FETCH_ERROR.to_string(),
                        });
                    }
                }
            });
        }
        ProviderCommand::SendChat {
            message,
            player_id,
            tactics,
        } => {
            let tx = tx.clone();
            let base = base.to_string();
            run_job(pool, move || {
                match api::send_chat(&base, &message, player_id.as_deref()) {
                    Ok(reply) => {
                        let update = tactics && player_id.is_some();
                        let _ = tx.send(Delta::ChatReply {
                            player_id: player_id.clone(),
                            reply: reply.clone(),
                            update_training_plan: update,
                        });
                        // Fire-and-forget confirm; the local apply above
                        // already happened and is never rolled back.
                        if update && let Some(pid) = player_id.as_deref() {
                            if let Err(err) = api::update_training_plan(&base, pid, &reply) {
                                let _ = tx.send(Delta::Log(format!(
                                    "[WARN] Training plan update error: {err:#}"
                                )));
                            }
                        }
                    }
                    Err(err) => {
                        let _ = tx.send(Delta::Log(format!("[WARN] Chatbot error: {err:#}")));
                        let _ = tx.send(Delta::ChatFailed { player_id });
                    }
                }
            });
        }
    }
}

fn run_job(pool: Option<&rayon::ThreadPool>, job: impl FnOnce() + Send + 'static) {
    if let Some(pool) = pool {
        pool.spawn(job);
    } else {
        thread::spawn(job);
    }
}

fn build_fetch_pool() -> Option<rayon::ThreadPool> {
    let threads = env::var("SENSEI_FETCH_THREADS")
        .ok()
        .and_then(|val| val.parse::<usize>().ok())
        .unwrap_or(4)
        .clamp(1, 16);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("sensei-fetch-{i}"))
        .build()
        .ok()
}
