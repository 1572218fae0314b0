use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use sensei_terminal::chat::{ChatMessage, ChatRole, ChatTranscript};
use sensei_terminal::state::{
    self, AppState, Delta, LoginField, Player, ProviderCommand, Screen, apply_delta,
};
use sensei_terminal::{demo_feed, provider, session};

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
}

impl App {
    fn new(cmd_tx: Option<mpsc::Sender<ProviderCommand>>) -> Self {
        Self {
            state: AppState::new(),
            should_quit: false,
            cmd_tx,
        }
    }

    /// Restore a persisted session, if any, and land on the dashboard; with
    /// none the app stays on the login screen.
    fn bootstrap(&mut self) {
        if let Some(session) = session::load() {
            self.state.session = Some(session);
            self.enter_dashboard();
        }
    }

    fn enter_dashboard(&mut self) {
        let Some(coach_id) = self.state.session.as_ref().map(|s| s.coach_id.clone()) else {
            self.state.reset_to_login();
            return;
        };
        self.state.screen = Screen::Dashboard;
        self.request_players(coach_id);
    }

    fn send(&mut self, cmd: ProviderCommand, what: &str) -> bool {
        let Some(tx) = &self.cmd_tx else {
            self.state
                .push_log(format!("[WARN] {what} unavailable: no provider"));
            return false;
        };
        if tx.send(cmd).is_err() {
            self.state
                .push_log(format!("[WARN] {what} failed: provider gone"));
            return false;
        }
        true
    }

    fn request_players(&mut self, coach_id: String) {
        self.state.players_loading = true;
        self.state.players_error = None;
        if !self.send(ProviderCommand::FetchPlayers { coach_id }, "Players fetch") {
            self.state.players_loading = false;
            self.state.players_error = Some(state::PLAYERS_FETCH_ERROR.to_string());
        }
    }

    fn refresh_players(&mut self) {
        if self.state.players_loading {
            return;
        }
        match self.state.session.as_ref().map(|s| s.coach_id.clone()) {
            Some(coach_id) => self.request_players(coach_id),
            None => self.state.reset_to_login(),
        }
    }

    fn request_player(&mut self, player_id: String) {
        self.state.player_loading = true;
        self.state.player_error = None;
        if !self.send(ProviderCommand::FetchPlayer { player_id }, "Player fetch") {
            self.state.player_loading = false;
            self.state.player_error = Some(state::PLAYER_FETCH_ERROR.to_string());
        }
    }

    fn open_profile(&mut self, player_id: String) {
        if self.state.session.is_none() {
            self.state.reset_to_login();
            return;
        }
        self.state.open_profile(player_id.clone());
        self.request_player(player_id);
    }

    fn refresh_profile(&mut self) {
        if self.state.player_loading {
            return;
        }
        let Screen::PlayerProfile { player_id } = &self.state.screen else {
            return;
        };
        let player_id = player_id.clone();
        self.request_player(player_id);
    }

    fn submit_login(&mut self) {
        if self.state.login.in_flight {
            return;
        }
        let email = self.state.login.email.clone();
        let password = self.state.login.password.clone();
        self.state.login.error = None;
        self.state.login.in_flight = true;
        if !self.send(ProviderCommand::Login { email, password }, "Login") {
            self.state.login.in_flight = false;
            self.state.login.error = Some(state::LOGIN_FALLBACK_ERROR.to_string());
        }
    }

    fn submit_chat(&mut self) {
        let Some(submission) = self.state.chat.submit() else {
            return;
        };
        let sent = self.send(
            ProviderCommand::SendChat {
                message: submission.message,
                player_id: submission.player_id,
                tactics: submission.tactics,
            },
            "Chat send",
        );
        if !sent {
            self.state.chat.settle_failure();
        }
    }

    fn logout(&mut self) {
        session::clear();
        self.state.reset_to_login();
        self.state.push_log("[INFO] Logged out");
    }

    fn apply(&mut self, delta: Delta) {
        let session_started = matches!(delta, Delta::SessionStarted(_));
        apply_delta(&mut self.state, delta);
        if session_started
            && let Some(coach_id) = self.state.session.as_ref().map(|s| s.coach_id.clone())
        {
            self.request_players(coach_id);
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.help_overlay {
            if matches!(
                key.code,
                KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q')
            ) {
                self.state.help_overlay = false;
            }
            return;
        }
        if self.state.chat_input_active {
            self.on_chat_key(key);
            return;
        }
        match self.state.screen {
            Screen::Login => self.on_login_key(key),
            Screen::Dashboard => self.on_dashboard_key(key),
            Screen::PlayerProfile { .. } => self.on_profile_key(key),
        }
    }

    fn on_login_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Enter => self.submit_login(),
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                self.state.login.toggle_focus();
            }
            KeyCode::Backspace => {
                self.state.login.focused_field_mut().pop();
            }
            KeyCode::Char(c) => {
                if key.modifiers.contains(KeyModifiers::CONTROL) {
                    return;
                }
                self.state.login.focused_field_mut().push(c);
            }
            _ => {}
        }
    }

    fn on_dashboard_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Enter | KeyCode::Char('d') => {
                if let Some(player) = self.state.selected_player() {
                    let player_id = player.id.clone();
                    self.open_profile(player_id);
                }
            }
            KeyCode::Char('a') => self.state.open_dashboard_chat(),
            KeyCode::Char('r') => self.refresh_players(),
            KeyCode::Char('x') => self.logout(),
            KeyCode::Char('?') => self.state.help_overlay = true,
            _ => {}
        }
    }

    fn on_profile_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('b') | KeyCode::Esc => self.state.back_to_dashboard(),
            KeyCode::Char('i') | KeyCode::Enter => self.state.chat_input_active = true,
            KeyCode::Char('r') => self.refresh_profile(),
            KeyCode::Char('?') => self.state.help_overlay = true,
            _ => {}
        }
    }

    fn on_chat_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                if self.state.chat_overlay {
                    self.state.close_dashboard_chat();
                } else {
                    self.state.chat_input_active = false;
                }
            }
            KeyCode::Enter => self.submit_chat(),
            KeyCode::Backspace => {
                self.state.chat.input.pop();
            }
            KeyCode::Char(c) => {
                if key.modifiers.contains(KeyModifiers::CONTROL) {
                    return;
                }
                self.state.chat.input.push(c);
            }
            _ => {}
        }
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    if demo_mode() {
        demo_feed::spawn_demo_provider(tx, cmd_rx);
    } else {
        provider::spawn_provider(tx, cmd_rx);
    }

    let mut app = App::new(Some(cmd_tx));
    app.bootstrap();
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn demo_mode() -> bool {
    std::env::var("SENSEI_DEMO")
        .map(|v| !v.trim().is_empty() && v.trim() != "0")
        .unwrap_or(false)
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            app.apply(delta);
        }

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(2),
        ])
        .split(frame.size());

    let header =
        Paragraph::new(header_text(&app.state)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match &app.state.screen {
        Screen::Login => render_login(frame, chunks[1], &app.state),
        Screen::Dashboard => render_dashboard(frame, chunks[1], &app.state),
        Screen::PlayerProfile { .. } => render_profile(frame, chunks[1], &app.state),
    }

    let footer =
        Paragraph::new(footer_text(&app.state)).block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[2]);

    if app.state.chat_overlay {
        render_chat_overlay(frame, frame.size(), &app.state);
    }

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let title = match &state.screen {
        Screen::Login => "COACH LOGIN".to_string(),
        Screen::Dashboard => match &state.session {
            Some(session) => format!("TEAM DASHBOARD | Coach {}", session.coach_id),
            None => "TEAM DASHBOARD".to_string(),
        },
        Screen::PlayerProfile { .. } => {
            let name = state
                .player_detail
                .as_ref()
                .map(|p| p.name.as_str())
                .unwrap_or("...");
            format!("PLAYER PROFILE | {name}")
        }
    };
    let line1 = format!("  __   GAMESENSEI | {title}");
    let line2 = " (__)".to_string();
    let line3 = "  ||".to_string();
    format!("{line1}\n{line2}\n{line3}")
}

fn footer_text(state: &AppState) -> String {
    if state.chat_input_active {
        return "Enter Send | Esc Leave chat | type to compose".to_string();
    }
    match state.screen {
        Screen::Login => "Tab Switch field | Enter Login | Esc Quit".to_string(),
        Screen::Dashboard => {
            "j/k/↑/↓ Move | Enter/d Open player | a Ask AI | r Refresh | x Logout | ? Help | q Quit"
                .to_string()
        }
        Screen::PlayerProfile { .. } => {
            "i/Enter Chat | r Refresh | b/Esc Back | ? Help | q Quit".to_string()
        }
    }
}

fn render_login(frame: &mut Frame, area: Rect, state: &AppState) {
    let popup = centered_rect(50, 40, area);
    let block = Block::default().title("Coach Login").borders(Borders::ALL);
    let inner = block.inner(popup);
    frame.render_widget(block, popup);
    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let login = &state.login;
    let marker = |field: LoginField| if login.focus == field { "> " } else { "  " };
    let masked = "*".repeat(login.password.chars().count());

    let mut lines = vec![
        Line::from(format!("{}Email:    {}", marker(LoginField::Email), login.email)),
        Line::from(format!("{}Password: {masked}", marker(LoginField::Password))),
        Line::from(""),
    ];
    if login.in_flight {
        lines.push(Line::styled(
            "Logging in...",
            Style::default().fg(Color::Yellow),
        ));
    } else if let Some(error) = &login.error {
        lines.push(Line::styled(
            error.clone(),
            Style::default().fg(Color::Red),
        ));
    }

    let form = Paragraph::new(Text::from(lines)).wrap(Wrap { trim: false });
    frame.render_widget(form, inner);
}

fn render_dashboard(frame: &mut Frame, area: Rect, state: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(3)])
        .split(area);

    render_roster(frame, rows[0], state);
    render_console(frame, rows[1], state);
}

fn render_roster(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().title("Your Players").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height == 0 || inner.width == 0 {
        return;
    }

    if state.players_loading {
        let loading =
            Paragraph::new("Loading players...").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(loading, inner);
        return;
    }
    if let Some(error) = &state.players_error {
        let error = Paragraph::new(error.as_str()).style(Style::default().fg(Color::Red));
        frame.render_widget(error, inner);
        return;
    }
    if state.players.is_empty() {
        let empty =
            Paragraph::new(state::NO_PLAYERS_NOTICE).style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    }

    let widths = roster_columns();
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(inner);
    render_roster_header(frame, sections[0], &widths);

    let list_area = sections[1];
    if list_area.height == 0 {
        return;
    }
    let visible = list_area.height as usize;
    let (start, end) = visible_range(state.selected, state.players.len(), visible);

    for (i, idx) in (start..end).enumerate() {
        let row_area = Rect {
            x: list_area.x,
            y: list_area.y + i as u16,
            width: list_area.width,
            height: 1,
        };

        let selected = idx == state.selected;
        let row_style = if selected {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else {
            Style::default()
        };
        if selected {
            frame.render_widget(Block::default().style(row_style), row_area);
        }

        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(widths)
            .split(row_area);

        let player = &state.players[idx];
        render_cell_text(frame, cols[0], &player.name, row_style);
        render_cell_text(frame, cols[1], &player.position, row_style);
        render_cell_text(frame, cols[2], &metric(player.height, "cm"), row_style);
        render_cell_text(frame, cols[3], &metric(player.weight, "kg"), row_style);
    }
}

fn roster_columns() -> [Constraint; 4] {
    [
        Constraint::Min(20),
        Constraint::Length(16),
        Constraint::Length(9),
        Constraint::Length(9),
    ]
}

fn render_roster_header(frame: &mut Frame, area: Rect, widths: &[Constraint]) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(widths)
        .split(area);
    let style = Style::default().add_modifier(Modifier::BOLD);

    render_cell_text(frame, cols[0], "Name", style);
    render_cell_text(frame, cols[1], "Position", style);
    render_cell_text(frame, cols[2], "Height", style);
    render_cell_text(frame, cols[3], "Weight", style);
}

fn render_cell_text(frame: &mut Frame, area: Rect, text: &str, style: Style) {
    let paragraph = Paragraph::new(text).style(style);
    frame.render_widget(paragraph, area);
}

fn metric(value: Option<f32>, unit: &str) -> String {
    match value {
        Some(v) => format!("{v:.0} {unit}"),
        None => "-".to_string(),
    }
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn render_profile(frame: &mut Frame, area: Rect, state: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(3)])
        .split(area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(44), Constraint::Min(30)])
        .split(rows[0]);

    render_player_card(frame, columns[0], state);
    render_chat_pane(frame, columns[1], state, "GameSensei AI".to_string());
    render_console(frame, rows[1], state);
}

fn render_player_card(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().title("Player").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height == 0 || inner.width == 0 {
        return;
    }

    if state.player_loading {
        let loading =
            Paragraph::new("Loading player details...").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(loading, inner);
        return;
    }
    if let Some(error) = &state.player_error {
        let error = Paragraph::new(error.as_str())
            .style(Style::default().fg(Color::Red))
            .wrap(Wrap { trim: false });
        frame.render_widget(error, inner);
        return;
    }
    let text = match &state.player_detail {
        Some(player) => player_card_text(player),
        None => "No player data".to_string(),
    };
    let card = Paragraph::new(text).wrap(Wrap { trim: false });
    frame.render_widget(card, inner);
}

fn player_card_text(player: &Player) -> String {
    let position = if player.position.is_empty() {
        "-"
    } else {
        player.position.as_str()
    };
    let lines = vec![
        player.name.clone(),
        format!("Position: {position}"),
        format!("Height: {}", metric(player.height, "cm")),
        format!("Weight: {}", metric(player.weight, "kg")),
        String::new(),
        format!("Diet Plan: {}", field(&player.diet_plan)),
        format!("Training Plan: {}", field(&player.training_plan)),
        format!("Performance: {}", field(&player.performance_review)),
    ];
    lines.join("\n")
}

fn field(value: &Option<String>) -> &str {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or("-")
}

fn render_chat_pane(frame: &mut Frame, area: Rect, state: &AppState, title: String) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(3)])
        .split(area);

    let block = Block::default().title(title).borders(Borders::ALL);
    let inner = block.inner(sections[0]);
    frame.render_widget(block, sections[0]);
    if inner.height > 0 && inner.width > 0 {
        let text = transcript_text(&state.chat, inner.height as usize);
        let transcript = Paragraph::new(text).wrap(Wrap { trim: false });
        frame.render_widget(transcript, inner);
    }

    let input_title = if state.chat_input_active {
        "Message (Enter to send)"
    } else {
        "Message (press i)"
    };
    let input_block = Block::default().title(input_title).borders(Borders::ALL);
    let input_inner = input_block.inner(sections[1]);
    frame.render_widget(input_block, sections[1]);
    if input_inner.height == 0 || input_inner.width == 0 {
        return;
    }
    if state.chat.input.is_empty() {
        let placeholder =
            Paragraph::new("Ask GameSensei AI...").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(placeholder, input_inner);
    } else {
        let input = Paragraph::new(state.chat.input.as_str());
        frame.render_widget(input, input_inner);
    }
}

fn transcript_text(chat: &ChatTranscript, max_lines: usize) -> Text<'static> {
    if chat.messages.is_empty() && !chat.pending {
        return Text::from(Line::styled(
            "No messages yet",
            Style::default().fg(Color::DarkGray),
        ));
    }

    let take = max_lines.max(1);
    let start = chat.messages.len().saturating_sub(take);
    let mut lines: Vec<Line> = chat.messages[start..].iter().map(message_line).collect();
    if chat.pending {
        lines.push(Line::styled(
            "Sensei is thinking...",
            Style::default().fg(Color::DarkGray),
        ));
    }
    Text::from(lines)
}

fn message_line(msg: &ChatMessage) -> Line<'static> {
    let (label, style) = match msg.role {
        ChatRole::User => ("You", Style::default().fg(Color::Cyan)),
        ChatRole::Assistant => ("Sensei", Style::default().fg(Color::Green)),
    };
    Line::from(vec![
        Span::styled(format!("[{}] {label}: ", msg.at.format("%H:%M")), style),
        Span::raw(msg.content.clone()),
    ])
}

fn render_chat_overlay(frame: &mut Frame, area: Rect, state: &AppState) {
    let popup = centered_rect(70, 70, area);
    frame.render_widget(Clear, popup);

    let title = match state
        .chat
        .player_id
        .as_ref()
        .and_then(|id| state.players.iter().find(|p| p.id == *id))
    {
        Some(player) => format!("GameSensei AI - {}", player.name),
        None => "GameSensei AI".to_string(),
    };
    render_chat_pane(frame, popup, state, title);
}

fn render_console(frame: &mut Frame, area: Rect, state: &AppState) {
    let console = Paragraph::new(console_text(state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, area);
}

fn console_text(state: &AppState) -> String {
    match state.logs.back() {
        Some(last) => last.clone(),
        None => "No alerts yet".to_string(),
    }
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "GameSensei Terminal - Help",
        "",
        "Dashboard:",
        "  j/k or ↑/↓   Move",
        "  Enter / d    Open player",
        "  a            Ask GameSensei AI",
        "  r            Refresh roster",
        "  x            Logout",
        "",
        "Profile:",
        "  i / Enter    Focus chat",
        "  r            Refresh player",
        "  b / Esc      Back",
        "",
        "Chat:",
        "  Enter        Send",
        "  Esc          Leave chat",
        "",
        "  ?            Toggle help",
        "  q            Quit",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
