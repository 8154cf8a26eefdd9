mod channel;
mod transport;

pub use channel::{Channel, ChannelConfig, ChannelEvent, ChannelEvents, ChannelState, CloseReason};
pub use transport::{Transport, WebSocketTransport};

#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("could not connect to {endpoint}: {source}")]
    Connect {
        endpoint: String,
        #[source]
        source: tokio_tungstenite::tungstenite::Error,
    },
    #[error("channel is {0:?}, expected Idle")]
    NotIdle(ChannelState),
    #[error("send failed: {0}")]
    Send(String),
    #[error("receive failed: {0}")]
    Receive(String),
}
