use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::chat::ChatTranscript;
use crate::session::Session;

pub const LOGIN_FALLBACK_ERROR: &str = "Invalid email or password.";
pub const PLAYERS_FETCH_ERROR: &str = "Failed to load players. Please try again.";
pub const NO_PLAYERS_NOTICE: &str = "No players found for this coach.";
pub const PLAYER_FETCH_ERROR: &str = "Error fetching player details";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Login,
    Dashboard,
    PlayerProfile { player_id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginField {
    #[default]
    Email,
    Password,
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub focus: LoginField,
    pub error: Option<String>,
    pub in_flight: bool,
}

impl LoginForm {
    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            LoginField::Email => LoginField::Password,
            LoginField::Password => LoginField::Email,
        };
    }

    pub fn focused_field_mut(&mut self) -> &mut String {
        match self.focus {
            LoginField::Email => &mut self.email,
            LoginField::Password => &mut self.password,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    // MongoDB-backed deployments send `_id`; newer ones send `id`.
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub height: Option<f32>,
    #[serde(default)]
    pub weight: Option<f32>,
    #[serde(default)]
    pub diet_plan: Option<String>,
    #[serde(default)]
    pub training_plan: Option<String>,
    #[serde(default)]
    pub performance_review: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub screen: Screen,
    pub session: Option<Session>,
    pub login: LoginForm,
    pub players: Vec<Player>,
    pub players_loading: bool,
    pub players_error: Option<String>,
    pub selected: usize,
    pub player_detail: Option<Player>,
    pub player_loading: bool,
    pub player_error: Option<String>,
    pub chat: ChatTranscript,
    pub chat_overlay: bool,
    pub chat_input_active: bool,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            screen: Screen::Login,
            session: None,
            login: LoginForm::default(),
            players: Vec::new(),
            players_loading: false,
            players_error: None,
            selected: 0,
            player_detail: None,
            player_loading: false,
            player_error: None,
            chat: ChatTranscript::default(),
            chat_overlay: false,
            chat_input_active: false,
            logs: VecDeque::new(),
            help_overlay: false,
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn selected_player(&self) -> Option<&Player> {
        self.players.get(self.selected)
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.players.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Navigate to a player's profile. The profile gets a fresh transcript
    /// bound to this player, with the tactics side effect enabled.
    pub fn open_profile(&mut self, player_id: String) {
        self.chat = ChatTranscript::new(Some(player_id.clone()), true);
        self.chat_input_active = false;
        self.player_detail = None;
        self.player_loading = true;
        self.player_error = None;
        self.screen = Screen::PlayerProfile { player_id };
    }

    /// Leave the profile. The transcript belongs to the view instance and is
    /// dropped with it.
    pub fn back_to_dashboard(&mut self) {
        self.chat = ChatTranscript::default();
        self.chat_input_active = false;
        self.player_detail = None;
        self.player_loading = false;
        self.player_error = None;
        self.screen = Screen::Dashboard;
    }

    /// Open the dashboard chat overlay. The context is the currently selected
    /// roster entry; an empty roster leaves the transcript without one and it
    /// short-circuits on submit.
    pub fn open_dashboard_chat(&mut self) {
        let context = self.selected_player().map(|p| p.id.clone());
        self.chat = ChatTranscript::new(context, false);
        self.chat_overlay = true;
        self.chat_input_active = true;
    }

    pub fn close_dashboard_chat(&mut self) {
        self.chat = ChatTranscript::default();
        self.chat_overlay = false;
        self.chat_input_active = false;
    }

    /// Drop everything session-scoped and land on the login screen. Only the
    /// console log survives, so logout reasons stay visible.
    pub fn reset_to_login(&mut self) {
        let logs = std::mem::take(&mut self.logs);
        *self = AppState::new();
        self.logs = logs;
    }
}

#[derive(Debug, Clone)]
pub enum Delta {
    SessionStarted(Session),
    LoginFailed(String),
    SetPlayers(Vec<Player>),
    PlayersFailed(String),
    SetPlayerDetail(Player),
    PlayerDetailFailed {
        player_id: String,
        message: String,
    },
    ChatReply {
        player_id: Option<String>,
        reply: String,
        update_training_plan: bool,
    },
    ChatFailed {
        player_id: Option<String>,
    },
    Log(String),
}

#[derive(Debug, Clone)]
pub enum ProviderCommand {
    Login {
        email: String,
        password: String,
    },
    FetchPlayers {
        coach_id: String,
    },
    FetchPlayer {
        player_id: String,
    },
    SendChat {
        message: String,
        player_id: Option<String>,
        tactics: bool,
    },
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::SessionStarted(session) => {
            state.login.in_flight = false;
            state.login.error = None;
            state.login.password.clear();
            state.session = Some(session);
            state.players = Vec::new();
            state.players_loading = true;
            state.players_error = None;
            state.selected = 0;
            state.screen = Screen::Dashboard;
        }
        Delta::LoginFailed(message) => {
            state.login.in_flight = false;
            state.login.error = Some(message);
        }
        Delta::SetPlayers(players) => {
            state.players_loading = false;
            state.players_error = None;
            state.players = players;
            if !state.players.is_empty() && state.selected >= state.players.len() {
                state.selected = state.players.len() - 1;
            }
        }
        Delta::PlayersFailed(message) => {
            state.players_loading = false;
            state.players_error = Some(message);
        }
        Delta::SetPlayerDetail(player) => {
            if profile_matches(state, &player.id) {
                state.player_loading = false;
                state.player_error = None;
                state.player_detail = Some(player);
            }
        }
        Delta::PlayerDetailFailed { player_id, message } => {
            if profile_matches(state, &player_id) {
                state.player_loading = false;
                state.player_error = Some(message);
            }
        }
        Delta::ChatReply {
            player_id,
            reply,
            update_training_plan,
        } => {
            if !state.chat.accepts(player_id.as_deref()) {
                state.push_log("[INFO] Dropped assistant reply for a closed chat");
                return;
            }
            state.chat.settle_reply(reply.clone());
            if update_training_plan {
                // Optimistic apply: the confirming PUT runs fire-and-forget in
                // the provider and its outcome never rolls this back.
                if let Some(pid) = player_id.as_deref()
                    && let Some(player) = state.player_detail.as_mut()
                    && player.id == pid
                {
                    player.training_plan = Some(reply);
                }
            }
        }
        Delta::ChatFailed { player_id } => {
            if state.chat.accepts(player_id.as_deref()) {
                state.chat.settle_failure();
            }
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}

fn profile_matches(state: &AppState, player_id: &str) -> bool {
    matches!(&state.screen, Screen::PlayerProfile { player_id: current } if current == player_id)
}
