use std::fmt;

use serde::{Deserialize, Serialize};

pub const DEFAULT_ENDPOINT: &str = "ws://localhost:8080/ws";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(String);

impl RoomCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Client -> server messages. Room-scoped variants are built through the
/// constructors below so a [`RoomCode`] must already be in hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientCommand {
    Create,
    Join { pin: RoomCode, name: String },
    Start { pin: RoomCode },
    NextQuestion { pin: RoomCode, question: u32 },
    Answer { pin: RoomCode, answer: u32 },
}

impl ClientCommand {
    pub fn join(pin: &RoomCode, name: impl Into<String>) -> Self {
        Self::Join {
            pin: pin.clone(),
            name: name.into(),
        }
    }

    pub fn start(pin: &RoomCode) -> Self {
        Self::Start { pin: pin.clone() }
    }

    pub fn next_question(pin: &RoomCode, question: u32) -> Self {
        Self::NextQuestion {
            pin: pin.clone(),
            question,
        }
    }

    pub fn answer(pin: &RoomCode, answer: u32) -> Self {
        Self::Answer {
            pin: pin.clone(),
            answer,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Join { .. } => "join",
            Self::Start { .. } => "start",
            Self::NextQuestion { .. } => "next_question",
            Self::Answer { .. } => "answer",
        }
    }

    pub fn encode(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(ProtocolError::Encode)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionPayload {
    pub text: String,
    pub options: Vec<String>,
    pub question: u32,
    pub total: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultEntry {
    pub name: String,
    pub score: i64,
}

/// Server -> client messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    Created { pin: RoomCode },
    PlayerJoined { name: String },
    Joined,
    Question(QuestionPayload),
    GameOver { results: Vec<ResultEntry> },
    #[serde(other)]
    Unknown,
}

impl ServerEvent {
    /// Parses one inbound message. Unrecognized `type` values yield
    /// `Ok(None)`; anything else that fails to parse is a [`ProtocolError`].
    pub fn decode(text: &str) -> Result<Option<Self>, ProtocolError> {
        match serde_json::from_str::<Self>(text).map_err(ProtocolError::Decode)? {
            Self::Unknown => Ok(None),
            event => Ok(Some(event)),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Created { .. } => "created",
            Self::PlayerJoined { .. } => "player_joined",
            Self::Joined => "joined",
            Self::Question(_) => "question",
            Self::GameOver { .. } => "game_over",
            Self::Unknown => "unknown",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("encoding failed: {0}")]
    Encode(serde_json::Error),
    #[error("malformed message: {0}")]
    Decode(serde_json::Error),
}
