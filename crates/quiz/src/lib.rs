pub mod client;
pub mod net;
pub mod protocol;
pub mod session;

pub use client::{QuizClient, Snapshot};
pub use net::{
    Channel, ChannelConfig, ChannelEvent, ChannelEvents, ChannelState, CloseReason,
    ConnectionError, Transport, WebSocketTransport,
};
pub use protocol::{
    ClientCommand, DEFAULT_ENDPOINT, ProtocolError, QuestionPayload, ResultEntry, RoomCode,
    ServerEvent,
};
pub use session::{Input, Intent, Role, Session, SessionError, SessionState, ValidationError};
