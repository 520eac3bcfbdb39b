//! Transport abstraction for the dashboard socket.
//!
//! This module provides a pluggable transport layer that abstracts
//! the underlying connection mechanism (WebSocket, mock for testing).
//!
//! # Design
//!
//! The transport trait is async and connection-oriented:
//! - `connect()` opens the socket
//! - `send()` transmits one frame
//! - `recv()` waits for the next inbound frame
//! - `close()` gracefully terminates
//!
//! Frames are delivered in arrival order. A text frame and the binary
//! frame that follows it are never reordered.
//!
//! # Example
//!
//! ```ignore
//! let transport = MockTransport::new();
//! transport.connect("ws://localhost:3000/ws/client").await?;
//! transport.send(ClientCommand::RegisterDashboard.to_frame()?).await?;
//! let frame = transport.recv().await?;
//! ```

mod mock;
mod ws;

pub use mock::MockTransport;
pub use ws::WsTransport;

use async_trait::async_trait;
use logos_types::Frame;
use thiserror::Error;

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Not connected.
    #[error("not connected")]
    NotConnected,

    /// Connection closed.
    #[error("connection closed")]
    ConnectionClosed,

    /// Send failed.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// Receive failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(String),
}

/// Transport trait for the dashboard socket.
///
/// Implementations handle the underlying connection mechanism
/// (WebSocket, mock, etc).
#[async_trait]
pub trait Transport: Send + Sync {
    /// Connect to the endpoint URL.
    async fn connect(&self, endpoint: &str) -> Result<(), TransportError>;

    /// Send one frame over the connection.
    async fn send(&self, frame: Frame) -> Result<(), TransportError>;

    /// Receive the next frame.
    ///
    /// Waits until a frame is available or the connection closes. Must be
    /// cancel-safe: dropping the future loses no frame.
    async fn recv(&self) -> Result<Frame, TransportError>;

    /// Check if currently connected.
    fn is_connected(&self) -> bool;

    /// Close the connection gracefully.
    async fn close(&self) -> Result<(), TransportError>;
}
