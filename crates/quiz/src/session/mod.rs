mod machine;
mod state;

pub use machine::{Input, Intent};
pub use state::{Role, Session, SessionState};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("room pin is required")]
    EmptyPin,
    #[error("player name is required")]
    EmptyName,
    #[error("option {index} does not exist (question has {len} options)")]
    OptionOutOfRange { index: usize, len: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{input} does not apply in state {state:?}")]
    InvalidTransition { state: SessionState, input: String },
}
