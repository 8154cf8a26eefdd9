use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::error::Error as WsError;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use super::ConnectionError;

/// A connected, message-oriented pipe to the game server. Each message is one
/// JSON text document.
#[async_trait]
pub trait Transport: Send + 'static {
    async fn send(&mut self, text: String) -> Result<(), ConnectionError>;

    /// `None` once the peer has closed the connection.
    async fn recv(&mut self) -> Option<Result<String, ConnectionError>>;

    async fn close(&mut self) -> Result<(), ConnectionError>;
}

pub struct WebSocketTransport {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WebSocketTransport {
    pub async fn connect(endpoint: &str) -> Result<Self, ConnectionError> {
        log::info!("Connecting to {}", endpoint);

        let (stream, _response) = tokio_tungstenite::connect_async(endpoint)
            .await
            .map_err(|source| ConnectionError::Connect {
                endpoint: endpoint.to_string(),
                source,
            })?;

        Ok(Self { stream })
    }
}

#[async_trait]
impl Transport for WebSocketTransport {
    async fn send(&mut self, text: String) -> Result<(), ConnectionError> {
        self.stream
            .send(Message::Text(text.into()))
            .await
            .map_err(|e| ConnectionError::Send(e.to_string()))
    }

    async fn recv(&mut self) -> Option<Result<String, ConnectionError>> {
        while let Some(frame) = self.stream.next().await {
            match frame {
                Ok(Message::Text(text)) => return Some(Ok(text.as_str().to_owned())),
                Ok(Message::Close(_)) => return None,
                // Pings are answered by tungstenite itself.
                Ok(_) => continue,
                Err(WsError::ConnectionClosed) => return None,
                Err(e) => return Some(Err(ConnectionError::Receive(e.to_string()))),
            }
        }
        None
    }

    async fn close(&mut self) -> Result<(), ConnectionError> {
        match self.stream.close(None).await {
            Ok(()) | Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => Ok(()),
            Err(e) => Err(ConnectionError::Send(e.to_string())),
        }
    }
}
