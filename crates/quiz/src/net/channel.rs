use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use super::transport::{Transport, WebSocketTransport};
use super::ConnectionError;
use crate::protocol::{ClientCommand, ServerEvent};

const DEFAULT_EVENT_CAPACITY: usize = 256;
const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Idle,
    Opening,
    Open,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// `Channel::close` was called or the channel handle went away.
    Local,
    /// The server ended the connection.
    Remote,
    /// The transport broke.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    Message(ServerEvent),
    Closed(CloseReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelConfig {
    pub event_capacity: usize,
    pub shutdown_timeout: Duration,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            event_capacity: DEFAULT_EVENT_CAPACITY,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }
}

/// Inbound side of an open channel. Yields every decoded server event in
/// arrival order, then exactly one [`ChannelEvent::Closed`], then `None`.
#[derive(Debug)]
pub struct ChannelEvents {
    rx: mpsc::Receiver<ServerEvent>,
    closed: Option<oneshot::Receiver<CloseReason>>,
}

impl ChannelEvents {
    pub async fn next(&mut self) -> Option<ChannelEvent> {
        if let Some(event) = self.rx.recv().await {
            return Some(ChannelEvent::Message(event));
        }

        // An aborted task never reports a reason.
        let closed = self.closed.take()?;
        let reason = closed.await.unwrap_or(CloseReason::Local);
        Some(ChannelEvent::Closed(reason))
    }
}

pub struct Channel {
    config: ChannelConfig,
    state: Arc<watch::Sender<ChannelState>>,
    cmd_tx: Option<mpsc::UnboundedSender<ClientCommand>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl Channel {
    pub fn new(config: ChannelConfig) -> Self {
        let (state, _) = watch::channel(ChannelState::Idle);
        Self {
            config,
            state: Arc::new(state),
            cmd_tx: None,
            shutdown_tx: None,
            task: None,
        }
    }

    pub async fn connect(&mut self, endpoint: &str) -> Result<ChannelEvents, ConnectionError> {
        self.ensure_idle()?;
        self.state.send_replace(ChannelState::Opening);

        match WebSocketTransport::connect(endpoint).await {
            Ok(transport) => Ok(self.start(transport)),
            Err(e) => {
                log::warn!("Connection to {} failed: {}", endpoint, e);
                self.state.send_replace(ChannelState::Closed);
                Err(e)
            }
        }
    }

    /// Opens the channel over a transport that is already connected.
    pub fn attach(&mut self, transport: impl Transport) -> Result<ChannelEvents, ConnectionError> {
        self.ensure_idle()?;
        Ok(self.start(transport))
    }

    fn ensure_idle(&self) -> Result<(), ConnectionError> {
        match self.state() {
            ChannelState::Idle => Ok(()),
            state => Err(ConnectionError::NotIdle(state)),
        }
    }

    fn start(&mut self, transport: impl Transport) -> ChannelEvents {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::channel(self.config.event_capacity.max(1));
        let (closed_tx, closed_rx) = oneshot::channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        // Open before the task runs so a transport that dies immediately
        // still ends up Closed.
        self.state.send_replace(ChannelState::Open);

        self.task = Some(tokio::spawn(transport_loop(
            transport,
            cmd_rx,
            event_tx,
            closed_tx,
            Arc::clone(&self.state),
            shutdown_rx,
        )));
        self.cmd_tx = Some(cmd_tx);
        self.shutdown_tx = Some(shutdown_tx);

        ChannelEvents {
            rx: event_rx,
            closed: Some(closed_rx),
        }
    }

    /// Queues a command for transmission. Never blocks; returns `false` and
    /// logs a warning when the channel is not open.
    pub fn send(&self, command: ClientCommand) -> bool {
        let state = self.state();
        if state != ChannelState::Open {
            log::warn!("Dropping `{}` command: channel is {:?}", command.kind(), state);
            return false;
        }

        match &self.cmd_tx {
            Some(tx) => match tx.send(command) {
                Ok(()) => true,
                Err(mpsc::error::SendError(command)) => {
                    log::warn!("Dropping `{}` command: channel is closing", command.kind());
                    false
                }
            },
            None => false,
        }
    }

    pub async fn close(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        self.cmd_tx = None;

        if let Some(mut task) = self.task.take() {
            match tokio::time::timeout(self.config.shutdown_timeout, &mut task).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => log::warn!("Channel task failed: {}", e),
                Err(_) => {
                    log::warn!("Channel task did not stop in time, aborting");
                    task.abort();
                }
            }
        }

        if self.state() != ChannelState::Idle {
            self.state.send_replace(ChannelState::Closed);
        }
    }

    pub fn state(&self) -> ChannelState {
        *self.state.borrow()
    }

    pub fn watch_state(&self) -> watch::Receiver<ChannelState> {
        self.state.subscribe()
    }

    pub fn is_open(&self) -> bool {
        self.state() == ChannelState::Open
    }
}

impl Drop for Channel {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn transport_loop(
    mut transport: impl Transport,
    mut cmd_rx: mpsc::UnboundedReceiver<ClientCommand>,
    event_tx: mpsc::Sender<ServerEvent>,
    closed_tx: oneshot::Sender<CloseReason>,
    state: Arc<watch::Sender<ChannelState>>,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    let reason = loop {
        tokio::select! {
            command = cmd_rx.recv() => match command {
                Some(command) => {
                    let text = match command.encode() {
                        Ok(text) => text,
                        Err(e) => {
                            log::error!("Could not encode `{}` command: {}", command.kind(), e);
                            continue;
                        }
                    };
                    log::debug!("-> {}", text);
                    if let Err(e) = transport.send(text).await {
                        break CloseReason::Failed(e.to_string());
                    }
                }
                None => {
                    close_transport(&mut transport).await;
                    break CloseReason::Local;
                }
            },
            _ = &mut shutdown_rx => {
                close_transport(&mut transport).await;
                break CloseReason::Local;
            }
            incoming = transport.recv() => match incoming {
                Some(Ok(text)) => {
                    log::debug!("<- {}", text);
                    let event = match ServerEvent::decode(&text) {
                        Ok(Some(event)) => event,
                        Ok(None) => {
                            log::debug!("Ignoring unrecognized message");
                            continue;
                        }
                        Err(e) => {
                            log::warn!("Dropping message: {}", e);
                            continue;
                        }
                    };

                    // Stop reading while the consumer is behind, but stay closable.
                    tokio::select! {
                        sent = event_tx.send(event) => {
                            if sent.is_err() {
                                log::debug!("Event receiver dropped");
                            }
                        }
                        _ = &mut shutdown_rx => {
                            close_transport(&mut transport).await;
                            break CloseReason::Local;
                        }
                    }
                }
                Some(Err(e)) => break CloseReason::Failed(e.to_string()),
                None => break CloseReason::Remote,
            },
        }
    };

    state.send_replace(ChannelState::Closed);
    log::info!("Channel closed: {:?}", reason);

    // Delivered after the queued messages, whatever the queue holds.
    let _ = closed_tx.send(reason);
}

async fn close_transport(transport: &mut impl Transport) {
    if let Err(e) = transport.close().await {
        log::debug!("Close handshake failed: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_channel_is_idle() {
        let channel = Channel::new(ChannelConfig::default());
        assert_eq!(channel.state(), ChannelState::Idle);
        assert!(!channel.is_open());
    }

    #[test]
    fn test_send_before_open_is_noop() {
        let channel = Channel::new(ChannelConfig::default());
        assert!(!channel.send(ClientCommand::Create));
        assert_eq!(channel.state(), ChannelState::Idle);
    }

    #[tokio::test]
    async fn test_connect_failure_closes() {
        let mut channel = Channel::new(ChannelConfig::default());

        let result = channel.connect("ws://127.0.0.1:1/ws").await;
        assert!(matches!(result, Err(ConnectionError::Connect { .. })));
        assert_eq!(channel.state(), ChannelState::Closed);

        let again = channel.connect("ws://127.0.0.1:1/ws").await;
        assert!(matches!(
            again,
            Err(ConnectionError::NotIdle(ChannelState::Closed))
        ));
    }

    #[tokio::test]
    async fn test_close_idle_channel_stays_idle() {
        let mut channel = Channel::new(ChannelConfig::default());
        channel.close().await;
        assert_eq!(channel.state(), ChannelState::Idle);
    }
}
