use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::session::Session;
use crate::state::{LOGIN_FALLBACK_ERROR, Player};

const REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_API_BASE: &str = "http://localhost:5000";

static CLIENT: OnceCell<Client> = OnceCell::new();

fn client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("failed to build http client")
    })
}

pub fn api_base() -> String {
    std::env::var("SENSEI_API_BASE")
        .ok()
        .map(|v| v.trim().trim_end_matches('/').to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
}

/// A request the backend answered with a user-facing rejection message, as
/// opposed to a transport or decoding failure.
#[derive(Debug, Clone)]
pub struct Rejected(pub String);

impl std::fmt::Display for Rejected {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for Rejected {}

/// The inline message to show for a failed login: the backend's `.message`
/// when one came back, the fixed fallback otherwise.
pub fn login_failure_message(err: &anyhow::Error) -> String {
    match err.downcast_ref::<Rejected>() {
        Some(rejected) => rejected.0.clone(),
        None => LOGIN_FALLBACK_ERROR.to_string(),
    }
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

pub fn login(base: &str, email: &str, password: &str) -> Result<Session> {
    let url = format!("{base}/api/coaches/login");
    let resp = client()?
        .post(&url)
        .json(&LoginRequest { email, password })
        .send()
        .context("login request failed")?;
    let status = resp.status();
    let body = resp.text().context("failed reading login response")?;
    if !status.is_success() {
        return Err(anyhow::Error::new(Rejected(parse_login_error_json(&body))));
    }
    parse_login_json(&body)
}

pub fn parse_login_json(raw: &str) -> Result<Session> {
    serde_json::from_str::<Session>(raw.trim()).context("invalid login json")
}

pub fn parse_login_error_json(raw: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        #[serde(default)]
        message: Option<String>,
    }
    serde_json::from_str::<ErrorBody>(raw.trim())
        .ok()
        .and_then(|body| body.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| LOGIN_FALLBACK_ERROR.to_string())
}

pub fn fetch_players(base: &str, coach_id: &str) -> Result<Vec<Player>> {
    let url = format!("{base}/api/players?coachId={coach_id}");
    let body = get_text(&url)?;
    parse_players_json(&body)
}

pub fn fetch_player(base: &str, player_id: &str) -> Result<Player> {
    let url = format!("{base}/api/players/{player_id}");
    let body = get_text(&url)?;
    parse_player_json(&body)
}

pub fn parse_players_json(raw: &str) -> Result<Vec<Player>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    serde_json::from_str(trimmed).context("invalid players json")
}

pub fn parse_player_json(raw: &str) -> Result<Player> {
    serde_json::from_str(raw.trim()).context("invalid player json")
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
    #[serde(rename = "playerId", skip_serializing_if = "Option::is_none")]
    player_id: Option<&'a str>,
}

pub fn send_chat(base: &str, message: &str, player_id: Option<&str>) -> Result<String> {
    let url = format!("{base}/api/chatbot");
    let resp = client()?
        .post(&url)
        .json(&ChatRequest { message, player_id })
        .send()
        .context("chatbot request failed")?;
    let status = resp.status();
    let body = resp.text().context("failed reading chatbot response")?;
    if !status.is_success() {
        return Err(anyhow!("http {}: {}", status, body));
    }
    parse_chat_reply_json(&body)
}

pub fn parse_chat_reply_json(raw: &str) -> Result<String> {
    #[derive(Deserialize)]
    struct ChatResponse {
        #[serde(default)]
        reply: Option<String>,
    }
    let parsed: ChatResponse =
        serde_json::from_str(raw.trim()).context("invalid chatbot json")?;
    parsed
        .reply
        .filter(|reply| !reply.trim().is_empty())
        .ok_or_else(|| anyhow!("empty assistant reply"))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TrainingPlanUpdate<'a> {
    training_plan: &'a str,
}

/// Best-effort confirm of a tactics change. The response body is unused.
pub fn update_training_plan(base: &str, player_id: &str, plan: &str) -> Result<()> {
    let url = format!("{base}/api/players/{player_id}");
    let resp = client()?
        .put(&url)
        .json(&TrainingPlanUpdate { training_plan: plan })
        .send()
        .context("training plan update failed")?;
    let status = resp.status();
    if !status.is_success() {
        return Err(anyhow!("http {status}"));
    }
    Ok(())
}

fn get_text(url: &str) -> Result<String> {
    let resp = client()?.get(url).send().context("request failed")?;
    let status = resp.status();
    let body = resp.text().context("failed reading body")?;
    if !status.is_success() {
        return Err(anyhow!("http {}: {}", status, body));
    }
    Ok(body)
}
