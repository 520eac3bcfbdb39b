//! WebSocket transport on tokio-tungstenite.
//!
//! The socket is split into a write half and a read half, each behind its
//! own lock, so a pending `recv()` never blocks an outbound `send()`.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use logos_types::Frame;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use super::{Transport, TransportError};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// WebSocket client transport.
#[derive(Default)]
pub struct WsTransport {
    sink: Mutex<Option<SplitSink<WsStream, Message>>>,
    stream: Mutex<Option<SplitStream<WsStream>>>,
    connected: AtomicBool,
}

impl WsTransport {
    /// Create an unconnected transport.
    pub fn new() -> Self {
        Self::default()
    }
}

impl std::fmt::Debug for WsTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsTransport")
            .field("connected", &self.is_connected())
            .finish()
    }
}

#[async_trait]
impl Transport for WsTransport {
    async fn connect(&self, endpoint: &str) -> Result<(), TransportError> {
        let (socket, _response) = connect_async(endpoint)
            .await
            .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;
        let (write, read) = socket.split();

        *self.sink.lock().await = Some(write);
        *self.stream.lock().await = Some(read);
        self.connected.store(true, Ordering::SeqCst);

        tracing::debug!(endpoint, "websocket open");
        Ok(())
    }

    async fn send(&self, frame: Frame) -> Result<(), TransportError> {
        let mut sink = self.sink.lock().await;
        let write = sink.as_mut().ok_or(TransportError::NotConnected)?;

        let message = match frame {
            Frame::Text(text) => Message::Text(text.into()),
            Frame::Binary(bytes) => Message::Binary(bytes.into()),
        };
        write
            .send(message)
            .await
            .map_err(|e| TransportError::SendFailed(e.to_string()))
    }

    async fn recv(&self) -> Result<Frame, TransportError> {
        let mut stream = self.stream.lock().await;
        let read = stream.as_mut().ok_or(TransportError::NotConnected)?;

        loop {
            match read.next().await {
                Some(Ok(Message::Text(text))) => return Ok(Frame::Text(text.to_string())),
                Some(Ok(Message::Binary(bytes))) => return Ok(Frame::Binary(bytes.to_vec())),
                Some(Ok(Message::Close(close))) => {
                    tracing::debug!(?close, "websocket close frame");
                    self.connected.store(false, Ordering::SeqCst);
                    return Err(TransportError::ConnectionClosed);
                }
                // Pong replies are handled by tungstenite
                Some(Ok(_)) => continue,
                Some(Err(e)) => {
                    self.connected.store(false, Ordering::SeqCst);
                    return Err(TransportError::ReceiveFailed(e.to_string()));
                }
                None => {
                    self.connected.store(false, Ordering::SeqCst);
                    return Err(TransportError::ConnectionClosed);
                }
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.connected.store(false, Ordering::SeqCst);
        self.stream.lock().await.take();

        let write = self.sink.lock().await.take();
        if let Some(mut write) = write {
            // The peer may already be gone; a failed close handshake is not an error
            if let Err(e) = write.close().await {
                tracing::debug!(error = %e, "websocket close handshake failed");
            }
        }
        Ok(())
    }
}
