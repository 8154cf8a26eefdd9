use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, List, ListItem, Paragraph, Row, Table};

use quizroom::{ChannelState, CloseReason, SessionState, Snapshot};

use super::{Field, View};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    MainMenu,
    JoinForm,
    Creating,
    Lobby,
    HostQuestion,
    WaitingForStart,
    PlayerQuestion,
    Results,
    Closed,
}

impl Screen {
    pub fn of(snapshot: &Snapshot) -> Self {
        if snapshot.closed.is_some() {
            return Screen::Closed;
        }

        match snapshot.session.state() {
            SessionState::Start => Screen::MainMenu,
            SessionState::AwaitingRoomPin => Screen::JoinForm,
            SessionState::HostWaiting => Screen::Creating,
            SessionState::HostWaitingWithRoster => Screen::Lobby,
            SessionState::InGameHost => Screen::HostQuestion,
            SessionState::PlayerWaitingForStart => Screen::WaitingForStart,
            SessionState::InGamePlayer => Screen::PlayerQuestion,
            SessionState::GameOverHost | SessionState::GameOverPlayer => Screen::Results,
        }
    }
}

const MENU_ITEMS: [&str; 3] = ["  Host a Game", "  Join a Game", "  Quit"];

pub fn render(frame: &mut Frame, snapshot: &Snapshot, view: &View) {
    let area = frame.area();

    let block = Block::default()
        .title(" Quiz Room ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    match Screen::of(snapshot) {
        Screen::MainMenu => render_main_menu(frame, chunks[0], view.selected_index),
        Screen::JoinForm => render_join_form(frame, chunks[0], snapshot, view),
        Screen::Creating => render_waiting(
            frame,
            chunks[0],
            " Creating Room ",
            "Asking the server for a room...",
        ),
        Screen::Lobby => render_lobby(frame, chunks[0], snapshot),
        Screen::HostQuestion => render_host_question(frame, chunks[0], snapshot),
        Screen::WaitingForStart => render_waiting(
            frame,
            chunks[0],
            " Joined ",
            "You're in! Waiting for the host to start...",
        ),
        Screen::PlayerQuestion => render_player_question(frame, chunks[0], snapshot, view),
        Screen::Results => render_results(frame, chunks[0], snapshot),
        Screen::Closed => render_closed(frame, chunks[0], snapshot.closed.as_ref()),
    }

    render_status(frame, chunks[1], snapshot);
}

fn render_main_menu(frame: &mut Frame, area: Rect, selected: usize) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    let title = Paragraph::new("Q U I Z   R O O M")
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center);
    frame.render_widget(title, chunks[0]);

    let items: Vec<ListItem> = MENU_ITEMS
        .iter()
        .enumerate()
        .map(|(i, label)| ListItem::new(*label).style(highlight(i == selected)))
        .collect();

    let menu = List::new(items).block(
        Block::default()
            .title(" Menu ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    frame.render_widget(menu, centered_rect(40, 7, chunks[1]));

    render_help(frame, chunks[2], "↑↓ Navigate  Enter Select  Q Quit");
}

fn render_join_form(frame: &mut Frame, area: Rect, snapshot: &Snapshot, view: &View) {
    let dialog_area = centered_rect(50, 14, area);
    frame.render_widget(Clear, dialog_area);

    let dialog = Block::default()
        .title(" Join a Game ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    frame.render_widget(dialog, dialog_area);

    let inner = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(2),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(dialog_area);

    frame.render_widget(
        text_field("Room PIN", &view.form.pin, view.form.focus == Field::Pin),
        inner[0],
    );
    frame.render_widget(
        text_field("Your Name", &view.form.name, view.form.focus == Field::Name),
        inner[1],
    );

    let note = match (&snapshot.rejection, snapshot.session.room_code()) {
        (Some(err), _) => Span::styled(err.to_string(), Style::default().fg(Color::Red)),
        (None, Some(pin)) => Span::styled(
            format!("Joining room {}...", pin),
            Style::default().fg(Color::Yellow),
        ),
        (None, None) => Span::raw(""),
    };
    frame.render_widget(
        Paragraph::new(Line::from(note)).alignment(Alignment::Center),
        inner[2],
    );

    render_help(frame, inner[4], "Tab Switch Field  Enter Join  Esc Quit");
}

fn text_field<'a>(label: &'a str, value: &'a str, focused: bool) -> Paragraph<'a> {
    let border = if focused { Color::Yellow } else { Color::DarkGray };
    let text = if focused {
        format!("{}_", value)
    } else {
        value.to_string()
    };

    Paragraph::new(text)
        .style(Style::default().fg(Color::White))
        .block(
            Block::default()
                .title(format!(" {} ", label))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border)),
        )
}

fn render_waiting(frame: &mut Frame, area: Rect, title: &str, message: &str) {
    let dialog_area = centered_rect(50, 7, area);
    frame.render_widget(Clear, dialog_area);

    let dialog = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    frame.render_widget(dialog, dialog_area);

    let inner = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(dialog_area);

    let status = Paragraph::new(message)
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Center);
    frame.render_widget(status, inner[0]);

    render_help(frame, inner[1], "Q Quit");
}

fn render_lobby(frame: &mut Frame, area: Rect, snapshot: &Snapshot) {
    let session = &snapshot.session;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    let pin = session.room_code().map(|p| p.as_str()).unwrap_or("-");
    let header = Paragraph::new(Line::from(vec![
        Span::styled("Room PIN: ", Style::default().fg(Color::White)),
        Span::styled(
            pin,
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
    ]))
    .alignment(Alignment::Center);
    frame.render_widget(header, chunks[0]);

    let items: Vec<ListItem> = if session.roster().is_empty() {
        vec![ListItem::new("  Waiting for players...").style(Style::default().fg(Color::DarkGray))]
    } else {
        session
            .roster()
            .iter()
            .map(|name| ListItem::new(format!("  {}", name)))
            .collect()
    };

    let roster = List::new(items).block(
        Block::default()
            .title(format!(" Players ({}) ", session.roster().len()))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    frame.render_widget(roster, centered_rect(40, 12, chunks[1]));

    render_help(frame, chunks[2], "S Start Game  Q Quit");
}

fn question_header(snapshot: &Snapshot) -> (String, String) {
    match snapshot.session.question() {
        Some(q) => (
            format!(" Question {} of {} ", q.question + 1, q.total),
            q.text.clone(),
        ),
        None => (" Question ".to_string(), String::new()),
    }
}

fn render_host_question(frame: &mut Frame, area: Rect, snapshot: &Snapshot) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    let (title, text) = question_header(snapshot);
    render_question_text(frame, chunks[0], title, text);

    let options: Vec<ListItem> = snapshot
        .session
        .question()
        .map(|q| {
            q.options
                .iter()
                .enumerate()
                .map(|(i, option)| ListItem::new(format!("  {}. {}", i + 1, option)))
                .collect()
        })
        .unwrap_or_default();
    frame.render_widget(
        List::new(options).block(Block::default().title(" Options ").borders(Borders::ALL)),
        chunks[1],
    );

    render_help(frame, chunks[2], "N Next Question  Q Quit");
}

fn render_player_question(frame: &mut Frame, area: Rect, snapshot: &Snapshot, view: &View) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    let (title, text) = question_header(snapshot);
    render_question_text(frame, chunks[0], title, text);

    let chosen = snapshot.session.selected_option();
    let options: Vec<ListItem> = snapshot
        .session
        .question()
        .map(|q| {
            q.options
                .iter()
                .enumerate()
                .map(|(i, option)| {
                    let marker = if chosen == Some(i) { "✔" } else { " " };
                    let item = ListItem::new(format!("{} {}. {}", marker, i + 1, option));
                    if chosen == Some(i) {
                        item.style(
                            Style::default()
                                .fg(Color::Black)
                                .bg(Color::Green)
                                .add_modifier(Modifier::BOLD),
                        )
                    } else {
                        item.style(highlight(i == view.selected_index))
                    }
                })
                .collect()
        })
        .unwrap_or_default();
    frame.render_widget(
        List::new(options).block(Block::default().title(" Your Answer ").borders(Borders::ALL)),
        chunks[1],
    );

    if let Some(err) = &snapshot.rejection {
        let error = Paragraph::new(err.to_string())
            .style(Style::default().fg(Color::Red))
            .alignment(Alignment::Center);
        frame.render_widget(error, chunks[2]);
    }

    render_help(frame, chunks[3], "1-9 Answer  ↑↓ Navigate  Enter Answer  Q Quit");
}

fn render_question_text(frame: &mut Frame, area: Rect, title: String, text: String) {
    let question = Paragraph::new(text)
        .style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );
    frame.render_widget(question, area);
}

fn render_results(frame: &mut Frame, area: Rect, snapshot: &Snapshot) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    let me = snapshot.session.player_name();
    let rows: Vec<Row> = snapshot
        .session
        .results()
        .unwrap_or_default()
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let style = if me == Some(entry.name.as_str()) {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            Row::new(vec![
                Cell::from(format!("{}.", i + 1)),
                Cell::from(entry.name.clone()),
                Cell::from(entry.score.to_string()),
            ])
            .style(style)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(4),
            Constraint::Min(12),
            Constraint::Length(8),
        ],
    )
    .header(Row::new(vec!["#", "Player", "Score"]).style(Style::default().fg(Color::Cyan)))
    .block(
        Block::default()
            .title(" Game Over ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green)),
    );
    frame.render_widget(table, centered_rect(50, 14, chunks[0]));

    render_help(frame, chunks[1], "Q Quit");
}

fn render_closed(frame: &mut Frame, area: Rect, reason: Option<&CloseReason>) {
    let dialog_area = centered_rect(54, 8, area);
    frame.render_widget(Clear, dialog_area);

    let dialog = Block::default()
        .title(" Connection Closed ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));
    frame.render_widget(dialog, dialog_area);

    let inner = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(dialog_area);

    let message = match reason {
        Some(CloseReason::Remote) => "The server closed the connection.".to_string(),
        Some(CloseReason::Failed(e)) => format!("Connection failed:\n{}", e),
        Some(CloseReason::Local) | None => "Disconnected.".to_string(),
    };
    let text = Paragraph::new(message)
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Center);
    frame.render_widget(text, inner[0]);

    render_help(frame, inner[1], "Q Quit");
}

fn render_status(frame: &mut Frame, area: Rect, snapshot: &Snapshot) {
    let (label, color) = match snapshot.channel {
        ChannelState::Idle => ("idle", Color::DarkGray),
        ChannelState::Opening => ("connecting", Color::Yellow),
        ChannelState::Open => ("connected", Color::Green),
        ChannelState::Closed => ("closed", Color::Red),
    };

    let mut spans = vec![Span::styled(format!("● {}", label), Style::default().fg(color))];
    if let Some(name) = snapshot.session.player_name() {
        spans.push(Span::styled(
            format!("  {}", name),
            Style::default().fg(Color::White),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_help(frame: &mut Frame, area: Rect, text: &str) {
    let help = Paragraph::new(text)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(help, area);
}

fn highlight(selected: bool) -> Style {
    if selected {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    }
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}
