use std::fmt;

use crate::protocol::{ClientCommand, QuestionPayload, RoomCode, ServerEvent};

use super::state::{Role, Session, SessionState};
use super::{SessionError, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Host,
    Join,
    SubmitJoin { pin: String, name: String },
    StartGame,
    NextQuestion,
    SelectOption(usize),
}

impl Intent {
    pub fn kind(&self) -> &'static str {
        match self {
            Intent::Host => "host",
            Intent::Join => "join",
            Intent::SubmitJoin { .. } => "submit_join",
            Intent::StartGame => "start_game",
            Intent::NextQuestion => "next_question",
            Intent::SelectOption(_) => "select_option",
        }
    }
}

/// One unit of work for the state machine: a user intent or a server event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Intent(Intent),
    Event(ServerEvent),
}

impl From<Intent> for Input {
    fn from(intent: Intent) -> Self {
        Input::Intent(intent)
    }
}

impl From<ServerEvent> for Input {
    fn from(event: ServerEvent) -> Self {
        Input::Event(event)
    }
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Input::Intent(intent) => write!(f, "intent `{}`", intent.kind()),
            Input::Event(event) => write!(f, "event `{}`", event.kind()),
        }
    }
}

impl Session {
    /// Pure transition: returns the next session and the commands to send.
    /// On error `self` is the session to keep.
    pub fn step(&self, input: Input) -> Result<(Session, Vec<ClientCommand>), SessionError> {
        let mut next = self.clone();
        let commands = next.transition(input)?;
        Ok((next, commands))
    }

    pub fn apply(&mut self, input: Input) -> Result<Vec<ClientCommand>, SessionError> {
        let (next, commands) = self.step(input)?;
        *self = next;
        Ok(commands)
    }

    fn transition(&mut self, input: Input) -> Result<Vec<ClientCommand>, SessionError> {
        use SessionState as S;

        let rejected = SessionError::InvalidTransition {
            state: self.state,
            input: input.to_string(),
        };

        match (self.state, input) {
            (S::Start, Input::Intent(Intent::Host)) => {
                self.role = Role::Host;
                self.state = S::HostWaiting;
                Ok(vec![ClientCommand::Create])
            }
            (S::Start, Input::Intent(Intent::Join)) => {
                self.role = Role::Player;
                self.state = S::AwaitingRoomPin;
                Ok(Vec::new())
            }
            (S::HostWaiting, Input::Event(ServerEvent::Created { pin })) => {
                self.room_code = Some(pin);
                self.state = S::HostWaitingWithRoster;
                Ok(Vec::new())
            }
            (S::HostWaitingWithRoster, Input::Event(ServerEvent::PlayerJoined { name })) => {
                self.roster.push(name);
                Ok(Vec::new())
            }
            (S::AwaitingRoomPin, Input::Intent(Intent::SubmitJoin { pin, name })) => {
                if pin.is_empty() {
                    return Err(ValidationError::EmptyPin.into());
                }
                if name.is_empty() {
                    return Err(ValidationError::EmptyName.into());
                }
                let pin = RoomCode::new(pin);
                let command = ClientCommand::join(&pin, name.as_str());
                self.room_code = Some(pin);
                self.player_name = Some(name);
                Ok(vec![command])
            }
            (S::AwaitingRoomPin, Input::Event(ServerEvent::Joined)) if self.room_code.is_some() => {
                self.state = S::PlayerWaitingForStart;
                Ok(Vec::new())
            }
            (S::HostWaitingWithRoster, Input::Intent(Intent::StartGame)) => {
                let pin = self.room_code.as_ref().ok_or(rejected)?;
                Ok(vec![ClientCommand::start(pin)])
            }
            (
                S::HostWaitingWithRoster | S::InGameHost,
                Input::Event(ServerEvent::Question(payload)),
            ) => {
                self.show_question(payload).map_err(|()| rejected)?;
                self.state = S::InGameHost;
                Ok(Vec::new())
            }
            (
                S::PlayerWaitingForStart | S::InGamePlayer,
                Input::Event(ServerEvent::Question(payload)),
            ) => {
                self.show_question(payload).map_err(|()| rejected)?;
                self.state = S::InGamePlayer;
                Ok(Vec::new())
            }
            (S::InGameHost, Input::Intent(Intent::NextQuestion)) => {
                let index = self.question_index.saturating_add(1);
                let pin = self.room_code.as_ref().ok_or(rejected)?;
                let command = ClientCommand::next_question(pin, index);
                self.question_index = index;
                Ok(vec![command])
            }
            (S::InGamePlayer, Input::Intent(Intent::SelectOption(index))) => {
                let len = self.question.as_ref().map_or(0, |q| q.options.len());
                if index >= len {
                    return Err(ValidationError::OptionOutOfRange { index, len }.into());
                }
                let pin = self.room_code.as_ref().ok_or(rejected)?;
                let command = ClientCommand::answer(pin, index as u32);
                self.selected = Some(index);
                Ok(vec![command])
            }
            (S::InGameHost, Input::Event(ServerEvent::GameOver { results })) => {
                self.results = Some(results);
                self.state = S::GameOverHost;
                Ok(Vec::new())
            }
            (S::InGamePlayer, Input::Event(ServerEvent::GameOver { results })) => {
                self.results = Some(results);
                self.state = S::GameOverPlayer;
                Ok(Vec::new())
            }
            _ => Err(rejected),
        }
    }

    // Stale questions (lower index than the one on screen) are refused.
    fn show_question(&mut self, payload: QuestionPayload) -> Result<(), ()> {
        if payload.question < self.question_index {
            return Err(());
        }
        let same_question = self
            .question
            .as_ref()
            .is_some_and(|q| q.question == payload.question);
        if !same_question {
            self.selected = None;
        }
        self.question_index = payload.question;
        self.question = Some(payload);
        Ok(())
    }
}
