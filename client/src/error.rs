//! Error types for the game client.

use thiserror::Error;

/// Errors raised while connecting to or talking with the remote simulation.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The WebSocket handshake could not be completed.
    #[error("failed to connect: {0}")]
    Connect(String),

    #[error("transport send error: {0}")]
    TransportSend(String),

    #[error("transport receive error: {0}")]
    TransportReceive(String),

    /// An outbound command was attempted on a channel that is not open.
    #[error("channel closed")]
    ChannelClosed,

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The async runtime backing socket I/O could not be started.
    #[error("runtime error: {0}")]
    Runtime(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;
