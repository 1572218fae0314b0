use chrono::{DateTime, Local};

pub const CHAT_FAILED_NOTICE: &str = "AI response failed. Try again later.";
pub const MISSING_PLAYER_NOTICE: &str = "Player ID missing. Cannot process request.";
pub const TACTICS_TRIGGER: &str = "change tactics";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    pub at: DateTime<Local>,
}

/// What a successful submit hands to the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSubmission {
    pub message: String,
    pub player_id: Option<String>,
    pub tactics: bool,
}

/// One chat pane. The profile view and the dashboard overlay both use this
/// type; they differ only in the optional player context and in whether a
/// tactics-triggering message should also rewrite the training plan.
#[derive(Debug, Clone, Default)]
pub struct ChatTranscript {
    pub player_id: Option<String>,
    pub tactics_enabled: bool,
    pub messages: Vec<ChatMessage>,
    pub input: String,
    pub pending: bool,
}

impl ChatTranscript {
    pub fn new(player_id: Option<String>, tactics_enabled: bool) -> Self {
        Self {
            player_id,
            tactics_enabled,
            ..Self::default()
        }
    }

    /// Take the current input and turn it into an outgoing request. The user
    /// entry is appended before any network activity starts; the assistant
    /// entry arrives later via settle_reply/settle_failure. Returns None when
    /// there is nothing to send: blank input, a request already in flight, or
    /// a missing player context (which leaves a warning entry instead).
    pub fn submit(&mut self) -> Option<ChatSubmission> {
        if self.pending {
            return None;
        }
        let message = self.input.trim().to_string();
        if message.is_empty() {
            return None;
        }
        self.input.clear();

        if self.player_id.is_none() {
            self.push(ChatRole::Assistant, MISSING_PLAYER_NOTICE.to_string());
            return None;
        }

        self.push(ChatRole::User, message.clone());
        self.pending = true;
        Some(ChatSubmission {
            tactics: self.tactics_enabled && is_tactics_trigger(&message),
            player_id: self.player_id.clone(),
            message,
        })
    }

    /// Whether a settling delta still belongs to this transcript. Replies for
    /// a view the user has navigated away from fail this check and are dropped.
    pub fn accepts(&self, player_id: Option<&str>) -> bool {
        self.pending && self.player_id.as_deref() == player_id
    }

    pub fn settle_reply(&mut self, reply: String) {
        self.pending = false;
        self.push(ChatRole::Assistant, reply);
    }

    pub fn settle_failure(&mut self) {
        self.pending = false;
        self.push(ChatRole::Assistant, CHAT_FAILED_NOTICE.to_string());
    }

    fn push(&mut self, role: ChatRole, content: String) {
        self.messages.push(ChatMessage {
            role,
            content,
            at: Local::now(),
        });
    }
}

pub fn is_tactics_trigger(message: &str) -> bool {
    message.to_lowercase().contains(TACTICS_TRIGGER)
}
