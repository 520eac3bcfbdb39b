//! DashboardClient - the run loop for the Logos dashboard.
//!
//! This module provides [`DashboardClient`], which owns the socket and the
//! pure engine from logos-core, and [`DashboardHandle`], the cloneable
//! handle applications use to issue intents and observe state.
//!
//! # Architecture
//!
//! The client feeds every input (frame, intent, timer) to the engine one at
//! a time and interprets the returned actions to perform actual I/O via the
//! Transport trait. Observers are notified after each input is fully applied.
//!
//! ```text
//! DashboardHandle → intents ─┐
//!                            ↓
//! Transport → frames → DashboardClient → DownloadSink
//!                            ↓
//!              logos-core (DashboardEngine)
//!                            ↓
//!                 DashboardState (watch)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use logos_client::{ClientConfig, DashboardClient, WsTransport};
//!
//! let (downloads, mut finished) = tokio::sync::mpsc::unbounded_channel();
//! let (client, handle) = DashboardClient::new(ClientConfig::default(), WsTransport::new(), downloads);
//! tokio::spawn(client.run());
//!
//! handle.join_storage("3f2a...")?;
//! handle.download_file("notes.txt")?;
//! let download = finished.recv().await;
//! ```

use std::collections::VecDeque;
use std::time::Duration;

use logos_core::{Action, DashboardEngine, EngineConfig, Input, Intent, SyncEvent};
use logos_types::{ClientCommand, ProtocolError};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};

use crate::observe::{DashboardState, Publisher};
use crate::sink::DownloadSink;
use crate::transport::{Transport, TransportError};

/// Default dashboard socket endpoint.
pub const DEFAULT_ENDPOINT: &str = "ws://localhost:3000/ws/client";

/// How often pending downloads are checked against the timeout.
pub const EXPIRY_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Protocol error.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The run loop has stopped.
    #[error("dashboard client has shut down")]
    Shutdown,
}

/// Configuration for DashboardClient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// WebSocket URL of the server's dashboard endpoint.
    pub endpoint: String,
    /// Engine settings.
    pub engine: EngineConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            engine: EngineConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Create a configuration for `endpoint` with default engine settings.
    pub fn new(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            ..Self::default()
        }
    }

    /// Set the engine settings.
    pub fn with_engine(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }
}

/// Cloneable handle for issuing intents and observing state.
#[derive(Debug, Clone)]
pub struct DashboardHandle {
    intents: mpsc::UnboundedSender<Intent>,
    state: DashboardState,
}

impl DashboardHandle {
    /// Submit an intent to the run loop.
    pub fn submit(&self, intent: Intent) -> Result<(), ClientError> {
        self.intents.send(intent).map_err(|_| ClientError::Shutdown)
    }

    /// Ask for a fresh storage list.
    pub fn refresh_storages(&self) -> Result<(), ClientError> {
        self.submit(Intent::RefreshStorages)
    }

    /// Create a storage.
    pub fn create_storage(&self, name: &str) -> Result<(), ClientError> {
        self.submit(Intent::CreateStorage {
            name: name.to_string(),
        })
    }

    /// Join a storage.
    pub fn join_storage(&self, storage_id: &str) -> Result<(), ClientError> {
        self.submit(Intent::JoinStorage {
            storage_id: storage_id.to_string(),
        })
    }

    /// Delete a storage.
    pub fn delete_storage(&self, storage_id: &str) -> Result<(), ClientError> {
        self.submit(Intent::DeleteStorage {
            storage_id: storage_id.to_string(),
        })
    }

    /// Delete a file (ignored while disconnected).
    pub fn delete_file(&self, path: &str) -> Result<(), ClientError> {
        self.submit(Intent::DeleteFile {
            path: path.to_string(),
        })
    }

    /// Download a file (ignored while disconnected).
    pub fn download_file(&self, path: &str) -> Result<(), ClientError> {
        self.submit(Intent::DownloadFile {
            path: path.to_string(),
        })
    }

    /// Stop the run loop and close the socket.
    pub fn shutdown(&self) -> Result<(), ClientError> {
        self.submit(Intent::Shutdown)
    }

    /// Observable state.
    pub fn state(&self) -> &DashboardState {
        &self.state
    }
}

/// The dashboard run loop.
///
/// Owns the transport, the engine and the download sink. Consumed by
/// [`DashboardClient::run`].
pub struct DashboardClient<T: Transport, S: DownloadSink> {
    config: ClientConfig,
    transport: T,
    sink: S,
    engine: DashboardEngine,
    intents: mpsc::UnboundedReceiver<Intent>,
    publisher: Publisher,
    reconnect_at: Option<Instant>,
}

impl<T: Transport, S: DownloadSink> DashboardClient<T, S> {
    /// Create a client and its handle. Nothing happens until `run()`.
    pub fn new(config: ClientConfig, transport: T, sink: S) -> (Self, DashboardHandle) {
        let engine = DashboardEngine::new(config.engine.clone());
        let (publisher, state) = Publisher::new(engine.store());
        let (intents_tx, intents) = mpsc::unbounded_channel();

        let client = Self {
            config,
            transport,
            sink,
            engine,
            intents,
            publisher,
            reconnect_at: None,
        };
        let handle = DashboardHandle {
            intents: intents_tx,
            state,
        };
        (client, handle)
    }

    /// A fresh set of state receivers.
    pub fn subscribe(&self) -> DashboardState {
        self.publisher.subscribe()
    }

    /// Connect and process inputs until shutdown.
    ///
    /// Returns once [`DashboardHandle::shutdown`] is called or every handle
    /// is dropped.
    pub async fn run(mut self) -> Result<(), ClientError> {
        tracing::info!(endpoint = %self.config.endpoint, "dashboard client starting");

        let expiry_enabled = self.config.engine.pending_timeout.is_some();
        let mut expiry = tokio::time::interval(EXPIRY_SWEEP_INTERVAL);
        expiry.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        if self.step(Input::Start).await? {
            return Ok(());
        }

        loop {
            let open = self.engine.connection().is_open();
            let reconnect_at = self.reconnect_at;

            let input = tokio::select! {
                received = self.transport.recv(), if open => match received {
                    Ok(frame) => Input::Frame(frame),
                    Err(e) => Input::Closed { reason: e.to_string() },
                },
                intent = self.intents.recv() => match intent {
                    Some(intent) => Input::Intent(intent),
                    // Every handle is gone; nobody can observe us anymore
                    None => Input::Intent(Intent::Shutdown),
                },
                _ = sleep_until(reconnect_at.unwrap_or_else(Instant::now)), if reconnect_at.is_some() => {
                    Input::ReconnectTimer
                },
                _ = expiry.tick(), if expiry_enabled => Input::ExpiryTick {
                    now: Instant::now().into_std(),
                },
            };

            if let Input::Closed { reason } = &input {
                tracing::debug!(%reason, "receive ended");
                if let Err(e) = self.transport.close().await {
                    tracing::debug!(error = %e, "close after receive failure");
                }
            }
            if matches!(input, Input::ReconnectTimer) {
                self.reconnect_at = None;
            }

            if self.step(input).await? {
                tracing::info!("dashboard client stopped");
                return Ok(());
            }
        }
    }

    /// Apply one input and everything it triggers, then publish.
    ///
    /// Returns `true` once the engine asked to stop.
    async fn step(&mut self, input: Input) -> Result<bool, ClientError> {
        let mut inputs = VecDeque::from([input]);
        let mut stopped = false;

        while let Some(input) = inputs.pop_front() {
            for action in self.engine.handle_at(input, Instant::now().into_std()) {
                match action {
                    Action::Connect => {
                        tracing::debug!(endpoint = %self.config.endpoint, "connecting");
                        match self.transport.connect(&self.config.endpoint).await {
                            Ok(()) => inputs.push_back(Input::Opened),
                            Err(e) => inputs.push_back(Input::ConnectFailed {
                                error: e.to_string(),
                            }),
                        }
                    }
                    Action::Send(command) => {
                        if let Err(e) = self.send(&command).await {
                            tracing::warn!(command = command.kind(), error = %e, "send failed");
                        }
                    }
                    Action::StartReconnectTimer { delay } => {
                        self.reconnect_at = Some(Instant::now() + delay);
                    }
                    Action::CancelReconnect => {
                        self.reconnect_at = None;
                        stopped = true;
                    }
                    Action::Disconnect => {
                        self.transport.close().await?;
                        stopped = true;
                    }
                    Action::Deliver(download) => {
                        let path = download.path.clone();
                        let size = download.bytes.len();
                        match self.sink.deliver(download).await {
                            Ok(()) => tracing::info!(%path, size, "download complete"),
                            Err(e) => tracing::warn!(%path, error = %e, "download not saved"),
                        }
                    }
                    Action::EmitEvent(event) => self.log_event(&event),
                }
            }
        }

        let changes = self.engine.take_changes();
        if !changes.is_empty() {
            self.publisher.publish(self.engine.store(), changes);
        }
        Ok(stopped)
    }

    async fn send(&self, command: &ClientCommand) -> Result<(), ClientError> {
        let frame = command.to_frame()?;
        self.transport.send(frame).await?;
        Ok(())
    }

    fn log_event(&self, event: &SyncEvent) {
        match event {
            SyncEvent::Connected => {
                tracing::info!(endpoint = %self.config.endpoint, "connected")
            }
            SyncEvent::ConnectionLost { reason, attempt } => tracing::warn!(
                %reason,
                attempt,
                retry_in_ms = self.config.engine.reconnect_delay.as_millis() as u64,
                "connection lost"
            ),
            SyncEvent::FrameRejected { error } => {
                tracing::warn!(error = %error, "dropping undecodable frame")
            }
            SyncEvent::DownloadsExpired { paths } => {
                tracing::warn!(?paths, "pending downloads timed out")
            }
        }
    }
}
