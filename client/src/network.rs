use crate::error::{ClientError, Result};
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use rand::Rng;
use shared::{decode_server_message, encode_client_message, ClientMessage, ServerMessage};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_tungstenite::tungstenite::protocol::Message;

const IDENTITY_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Connecting,
    Open,
    Closed,
}

/// Lifecycle and payload notifications delivered by the connection task.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    Opened,
    Message(String),
    Error(String),
    Closed,
}

/// The session's end of the connection: lifecycle state plus the outbound
/// queue. Sends are only attempted while the channel is open.
#[derive(Debug)]
pub struct Channel {
    state: ChannelState,
    outbox: Option<mpsc::UnboundedSender<String>>,
}

impl Channel {
    pub fn new(outbox: mpsc::UnboundedSender<String>) -> Self {
        Self {
            state: ChannelState::Connecting,
            outbox: Some(outbox),
        }
    }

    /// A channel that never opens; used before any connection exists.
    pub fn detached() -> Self {
        Self {
            state: ChannelState::Closed,
            outbox: None,
        }
    }

    pub fn state(&self) -> ChannelState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == ChannelState::Open
    }

    /// `Connecting -> Open`. Ignored once closed; closed is terminal.
    pub fn mark_open(&mut self) {
        match self.state {
            ChannelState::Connecting => {
                info!("Channel open");
                self.state = ChannelState::Open;
            }
            ChannelState::Open => {}
            ChannelState::Closed => warn!("Ignoring open notification on a closed channel"),
        }
    }

    pub fn mark_closed(&mut self) {
        if self.state != ChannelState::Closed {
            info!("Channel closed");
        }
        self.state = ChannelState::Closed;
        self.outbox = None;
    }

    /// Closes the channel from this side. Dropping the outbound queue tells
    /// the connection task to send a close frame and exit.
    pub fn close(&mut self) {
        self.mark_closed();
    }

    /// Serializes and queues a command. Returns `false` (and drops the
    /// command) when the channel is not open.
    pub fn send(&mut self, message: &ClientMessage) -> bool {
        match self.try_send(message) {
            Ok(()) => true,
            Err(ClientError::ChannelClosed) => false,
            Err(e) => {
                error!("Error sending {:?}: {}", message, e);
                false
            }
        }
    }

    fn try_send(&mut self, message: &ClientMessage) -> Result<()> {
        if self.state != ChannelState::Open {
            return Err(ClientError::ChannelClosed);
        }
        let outbox = self.outbox.as_ref().ok_or(ClientError::ChannelClosed)?;
        let text = encode_client_message(message)?;

        if outbox.send(text).is_err() {
            // Connection task already gone; its Closed event may still be queued.
            self.mark_closed();
            return Err(ClientError::ChannelClosed);
        }

        debug!("Sent {:?}", message);
        Ok(())
    }
}

/// Decodes one inbound frame. Malformed frames are dropped with a warning.
pub fn decode_inbound(text: &str) -> Option<ServerMessage> {
    match decode_server_message(text) {
        Ok(ServerMessage::Unknown) => {
            debug!("Ignoring unrecognized message kind");
            None
        }
        Ok(message) => Some(message),
        Err(e) => {
            warn!("Dropping malformed message: {}", e);
            None
        }
    }
}

/// Receiving half of the connection task's event queue.
pub struct ChannelEvents {
    rx: mpsc::UnboundedReceiver<ChannelEvent>,
}

impl ChannelEvents {
    pub fn new(rx: mpsc::UnboundedReceiver<ChannelEvent>) -> Self {
        Self { rx }
    }

    /// Non-blocking poll, for frame-driven hosts.
    pub fn try_next(&mut self) -> Option<ChannelEvent> {
        self.rx.try_recv().ok()
    }

    /// Waits for the next event. `None` once the connection task has exited
    /// and every event has been drained.
    pub async fn next(&mut self) -> Option<ChannelEvent> {
        self.rx.recv().await
    }
}

/// Options for the connection task.
#[derive(Debug, Clone, Default)]
pub struct ConnectOptions {
    /// Artificial delay applied to every outbound frame.
    pub fake_ping: Duration,
}

/// Starts a connection task on `runtime` and returns the session's channel
/// (in `Connecting` state) along with the event queue it will be driven by.
pub fn spawn_connection(
    runtime: &Handle,
    url: &str,
    options: ConnectOptions,
) -> (Channel, ChannelEvents, JoinHandle<()>) {
    let (outbox_tx, outbox_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();

    let url = url.to_string();
    let task = runtime.spawn(run_connection(url, options, outbox_rx, event_tx));

    (Channel::new(outbox_tx), ChannelEvents::new(event_rx), task)
}

async fn run_connection(
    url: String,
    options: ConnectOptions,
    mut outbox: mpsc::UnboundedReceiver<String>,
    events: mpsc::UnboundedSender<ChannelEvent>,
) {
    info!("Connecting to {}", url);

    let mut stream = match tokio_tungstenite::connect_async(url.as_str()).await {
        Ok((stream, _response)) => stream,
        Err(e) => {
            let e = ClientError::Connect(e.to_string());
            error!("{}", e);
            let _ = events.send(ChannelEvent::Error(e.to_string()));
            let _ = events.send(ChannelEvent::Closed);
            return;
        }
    };

    info!("Connected to {}", url);
    if events.send(ChannelEvent::Opened).is_err() {
        let _ = stream.close(None).await;
        return;
    }

    loop {
        tokio::select! {
            inbound = stream.next() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => {
                        if events.send(ChannelEvent::Message(text.to_string())).is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        debug!("Received close frame: {:?}", frame);
                        break;
                    }
                    Some(Ok(Message::Binary(_))) => {
                        warn!("Skipping unexpected binary frame");
                    }
                    // Pings are answered by tungstenite.
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        let e = ClientError::TransportReceive(e.to_string());
                        error!("{}", e);
                        let _ = events.send(ChannelEvent::Error(e.to_string()));
                        break;
                    }
                    None => break,
                }
            }

            outbound = outbox.recv() => {
                match outbound {
                    Some(text) => {
                        if !options.fake_ping.is_zero() {
                            sleep(options.fake_ping).await;
                        }
                        if let Err(e) = stream.send(Message::Text(text.into())).await {
                            let e = ClientError::TransportSend(e.to_string());
                            error!("{}", e);
                            let _ = events.send(ChannelEvent::Error(e.to_string()));
                            break;
                        }
                    }
                    None => {
                        debug!("Channel dropped locally, closing socket");
                        let _ = stream.close(None).await;
                        break;
                    }
                }
            }
        }
    }

    let _ = events.send(ChannelEvent::Closed);
    info!("Connection to {} finished", url);
}

/// Builds the endpoint for one (room, identity) pair.
pub fn endpoint_url(base: &str, room: &str, identity: &str) -> String {
    format!("{}/ws/{}/{}", base.trim_end_matches('/'), room, identity)
}

/// Random lowercase base-36 token.
pub fn random_token(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect()
}

/// Opaque per-session identity, stable for the lifetime of the session.
pub fn generate_identity() -> String {
    format!("player_{}", random_token(IDENTITY_LEN))
}
