mod screens;

use std::io;

use crossterm::event::{Event, EventStream, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute};
use futures_util::StreamExt;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::{mpsc, watch};

use quizroom::{Intent, Snapshot};

pub use screens::Screen;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
    Send(Intent),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Pin,
    Name,
}

#[derive(Debug, Clone)]
pub struct JoinForm {
    pub pin: String,
    pub name: String,
    pub focus: Field,
}

/// Input state that lives only in the terminal, never in the session.
#[derive(Debug, Clone)]
pub struct View {
    pub form: JoinForm,
    pub selected_index: usize,
    screen: Screen,
    question: Option<u32>,
}

impl View {
    pub fn new(player_name: Option<String>) -> Self {
        Self {
            form: JoinForm {
                pin: String::new(),
                name: player_name.unwrap_or_default(),
                focus: Field::Pin,
            },
            selected_index: 0,
            screen: Screen::MainMenu,
            question: None,
        }
    }

    /// Resets the cursor whenever the screen or the question changes.
    pub fn sync(&mut self, snapshot: &Snapshot) {
        let screen = Screen::of(snapshot);
        let question = snapshot.session.question().map(|q| q.question);

        if screen != self.screen || question != self.question {
            self.selected_index = 0;
        }
        if screen == Screen::JoinForm && self.screen != Screen::JoinForm {
            self.form.focus = Field::Pin;
        }

        self.screen = screen;
        self.question = question;
    }

    pub fn handle_key(
        &mut self,
        snapshot: &Snapshot,
        code: KeyCode,
        modifiers: KeyModifiers,
    ) -> Action {
        if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
            return Action::Quit;
        }

        match Screen::of(snapshot) {
            Screen::MainMenu => self.handle_main_menu_key(code),
            Screen::JoinForm => self.handle_join_form_key(code),
            Screen::Lobby => match code {
                KeyCode::Char('s') => Action::Send(Intent::StartGame),
                code => quit_key(code),
            },
            Screen::HostQuestion => match code {
                KeyCode::Char('n') => Action::Send(Intent::NextQuestion),
                code => quit_key(code),
            },
            Screen::PlayerQuestion => {
                let options = snapshot
                    .session
                    .question()
                    .map_or(0, |q| q.options.len());
                self.handle_answer_key(code, options)
            }
            Screen::Creating | Screen::WaitingForStart | Screen::Results | Screen::Closed => {
                quit_key(code)
            }
        }
    }

    fn handle_main_menu_key(&mut self, code: KeyCode) -> Action {
        match code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected_index = self.selected_index.saturating_sub(1);
                Action::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected_index = (self.selected_index + 1).min(2);
                Action::None
            }
            KeyCode::Enter => match self.selected_index {
                0 => Action::Send(Intent::Host),
                1 => Action::Send(Intent::Join),
                _ => Action::Quit,
            },
            KeyCode::Char('h') => Action::Send(Intent::Host),
            code => quit_key(code),
        }
    }

    fn handle_join_form_key(&mut self, code: KeyCode) -> Action {
        let field = match self.form.focus {
            Field::Pin => &mut self.form.pin,
            Field::Name => &mut self.form.name,
        };

        match code {
            KeyCode::Esc => Action::Quit,
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                self.form.focus = match self.form.focus {
                    Field::Pin => Field::Name,
                    Field::Name => Field::Pin,
                };
                Action::None
            }
            KeyCode::Enter => Action::Send(Intent::SubmitJoin {
                pin: self.form.pin.clone(),
                name: self.form.name.clone(),
            }),
            KeyCode::Backspace => {
                field.pop();
                Action::None
            }
            KeyCode::Char(c) if !c.is_control() => {
                field.push(c);
                Action::None
            }
            _ => Action::None,
        }
    }

    fn handle_answer_key(&mut self, code: KeyCode, options: usize) -> Action {
        match code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected_index = self.selected_index.saturating_sub(1);
                Action::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected_index = (self.selected_index + 1).min(options.saturating_sub(1));
                Action::None
            }
            KeyCode::Enter => Action::Send(Intent::SelectOption(self.selected_index)),
            KeyCode::Char(c @ '1'..='9') => {
                let index = (c as usize) - ('1' as usize);
                if index < options {
                    self.selected_index = index;
                }
                Action::Send(Intent::SelectOption(index))
            }
            code => quit_key(code),
        }
    }
}

fn quit_key(code: KeyCode) -> Action {
    match code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        _ => Action::None,
    }
}

pub struct Tui {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    snapshots: watch::Receiver<Snapshot>,
    snapshot: Snapshot,
    intents: mpsc::Sender<Intent>,
    view: View,
    should_quit: bool,
}

impl Tui {
    pub fn new(
        snapshots: watch::Receiver<Snapshot>,
        intents: mpsc::Sender<Intent>,
        player_name: Option<String>,
    ) -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, cursor::Hide)?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        let snapshot = snapshots.borrow().clone();
        let mut view = View::new(player_name);
        view.sync(&snapshot);

        Ok(Self {
            terminal,
            snapshots,
            snapshot,
            intents,
            view,
            should_quit: false,
        })
    }

    pub async fn run(&mut self) -> io::Result<()> {
        let mut keys = EventStream::new();

        while !self.should_quit {
            self.draw()?;

            tokio::select! {
                changed = self.snapshots.changed() => {
                    if changed.is_err() {
                        log::debug!("Client stopped publishing, leaving TUI");
                        break;
                    }
                    self.snapshot = self.snapshots.borrow_and_update().clone();
                    self.view.sync(&self.snapshot);
                }
                event = keys.next() => match event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        let action = self.view.handle_key(&self.snapshot, key.code, key.modifiers);
                        self.process_action(action).await;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e),
                    None => break,
                },
            }
        }

        Ok(())
    }

    fn draw(&mut self) -> io::Result<()> {
        let snapshot = &self.snapshot;
        let view = &self.view;

        self.terminal.draw(|frame| {
            screens::render(frame, snapshot, view);
        })?;

        Ok(())
    }

    async fn process_action(&mut self, action: Action) {
        match action {
            Action::None => {}
            Action::Quit => {
                self.should_quit = true;
            }
            Action::Send(intent) => {
                log::debug!("User intent {}", intent.kind());
                if self.intents.send(intent).await.is_err() {
                    self.should_quit = true;
                }
            }
        }
    }

    pub fn restore_terminal(&mut self) -> io::Result<()> {
        terminal::disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            cursor::Show
        )?;
        Ok(())
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        let _ = self.restore_terminal();
    }
}

pub async fn run(
    snapshots: watch::Receiver<Snapshot>,
    intents: mpsc::Sender<Intent>,
    player_name: Option<String>,
) -> io::Result<()> {
    let mut tui = Tui::new(snapshots, intents, player_name)?;
    let result = tui.run().await;
    tui.restore_terminal()?;
    result
}
