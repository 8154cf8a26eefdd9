use tokio::sync::{mpsc, watch};

use crate::net::{
    Channel, ChannelEvent, ChannelEvents, ChannelState, CloseReason, ConnectionError,
};
use crate::session::{Input, Intent, Session, SessionError, ValidationError};

/// What the presentation layer gets to see after every processed input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub session: Session,
    pub channel: ChannelState,
    pub closed: Option<CloseReason>,
    /// Last rejected user input, cleared by the next accepted one.
    pub rejection: Option<ValidationError>,
}

/// Owns the session and the channel and runs every input to completion
/// before looking at the next one.
pub struct QuizClient {
    session: Session,
    channel: Channel,
    closed: Option<CloseReason>,
    rejection: Option<ValidationError>,
    updates: watch::Sender<Snapshot>,
}

impl QuizClient {
    pub fn new(channel: Channel) -> (Self, watch::Receiver<Snapshot>) {
        let session = Session::new();
        let (updates, rx) = watch::channel(Snapshot {
            session: session.clone(),
            channel: channel.state(),
            closed: None,
            rejection: None,
        });

        let client = Self {
            session,
            channel,
            closed: None,
            rejection: None,
            updates,
        };
        (client, rx)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn channel(&self) -> &Channel {
        &self.channel
    }

    pub fn close_reason(&self) -> Option<&CloseReason> {
        self.closed.as_ref()
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.updates.subscribe()
    }

    /// Applies one input and sends whatever commands it produced, in order.
    /// Once the channel has closed the session is frozen and inputs are
    /// ignored.
    pub fn dispatch(&mut self, input: Input) -> Result<(), SessionError> {
        if self.closed.is_some() {
            log::debug!("Ignoring {} after channel close", input);
            return Ok(());
        }

        let label = input.to_string();
        match self.session.apply(input) {
            Ok(commands) => {
                log::debug!("{} -> {:?}", label, self.session.state());
                for command in commands {
                    self.channel.send(command);
                }
                self.rejection = None;
                self.publish();
                Ok(())
            }
            Err(SessionError::Validation(e)) => {
                log::warn!("Rejected {}: {}", label, e);
                self.rejection = Some(e.clone());
                self.publish();
                Err(SessionError::Validation(e))
            }
            Err(e) => {
                log::debug!("Dropped {}", e);
                Err(e)
            }
        }
    }

    pub fn handle_channel_event(&mut self, event: ChannelEvent) {
        match event {
            ChannelEvent::Message(event) => {
                let _ = self.dispatch(event.into());
            }
            ChannelEvent::Closed(reason) => {
                log::warn!("Connection closed: {:?}", reason);
                self.closed = Some(reason);
                self.publish();
            }
        }
    }

    pub fn connection_failed(&mut self, error: &ConnectionError) {
        self.handle_channel_event(ChannelEvent::Closed(CloseReason::Failed(error.to_string())));
    }

    /// Dispatch loop: inbound events and user intents share one queue.
    /// Returns when the intent sender is dropped, closing the channel.
    /// `events` is `None` when the channel never opened.
    pub async fn run(
        mut self,
        mut events: Option<ChannelEvents>,
        mut intents: mpsc::Receiver<Intent>,
    ) {
        loop {
            tokio::select! {
                Some(event) = next_event(&mut events) => self.handle_channel_event(event),
                intent = intents.recv() => match intent {
                    Some(intent) => {
                        let _ = self.dispatch(intent.into());
                    }
                    None => break,
                },
            }
        }

        self.channel.close().await;
        self.publish();
    }

    fn publish(&self) {
        self.updates.send_replace(Snapshot {
            session: self.session.clone(),
            channel: self.channel.state(),
            closed: self.closed.clone(),
            rejection: self.rejection.clone(),
        });
    }
}

async fn next_event(events: &mut Option<ChannelEvents>) -> Option<ChannelEvent> {
    match events {
        Some(events) => events.next().await,
        None => None,
    }
}
