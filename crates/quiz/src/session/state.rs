use crate::protocol::{QuestionPayload, ResultEntry, RoomCode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Role {
    #[default]
    Undetermined,
    Host,
    Player,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    #[default]
    Start,
    AwaitingRoomPin,
    HostWaiting,
    HostWaitingWithRoster,
    InGameHost,
    GameOverHost,
    PlayerWaitingForStart,
    InGamePlayer,
    GameOverPlayer,
}

impl SessionState {
    pub const ALL: [SessionState; 9] = [
        SessionState::Start,
        SessionState::AwaitingRoomPin,
        SessionState::HostWaiting,
        SessionState::HostWaitingWithRoster,
        SessionState::InGameHost,
        SessionState::GameOverHost,
        SessionState::PlayerWaitingForStart,
        SessionState::InGamePlayer,
        SessionState::GameOverPlayer,
    ];

    pub fn is_game_over(self) -> bool {
        matches!(self, SessionState::GameOverHost | SessionState::GameOverPlayer)
    }

    pub fn is_in_game(self) -> bool {
        matches!(self, SessionState::InGameHost | SessionState::InGamePlayer)
    }
}

/// Everything the client knows about the current game. Fields only change
/// through [`Session::step`](super::Session::step) / `apply`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    pub(super) state: SessionState,
    pub(super) role: Role,
    pub(super) room_code: Option<RoomCode>,
    pub(super) player_name: Option<String>,
    pub(super) question_index: u32,
    pub(super) question: Option<QuestionPayload>,
    pub(super) selected: Option<usize>,
    pub(super) roster: Vec<String>,
    pub(super) results: Option<Vec<ResultEntry>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn room_code(&self) -> Option<&RoomCode> {
        self.room_code.as_ref()
    }

    pub fn player_name(&self) -> Option<&str> {
        self.player_name.as_deref()
    }

    pub fn question_index(&self) -> u32 {
        self.question_index
    }

    pub fn question(&self) -> Option<&QuestionPayload> {
        self.question.as_ref()
    }

    /// Option chosen by this player for the question on screen.
    pub fn selected_option(&self) -> Option<usize> {
        self.selected
    }

    pub fn roster(&self) -> &[String] {
        &self.roster
    }

    pub fn results(&self) -> Option<&[ResultEntry]> {
        self.results.as_deref()
    }
}
