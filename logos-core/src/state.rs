//! Connection state machine for the dashboard.
//!
//! This module provides a pure, side-effect-free state machine for the
//! socket lifecycle. It takes events as input and produces a new state plus a
//! list of actions to execute.
//!
//! The actual I/O (connecting, sending frames, sleeping) is performed by
//! logos-client, not by this module.
//!
//! Reconnection is unconditional: every close or failed attempt schedules a
//! new attempt after the same fixed delay, forever.

use std::time::Duration;

use logos_types::{ClientCommand, ProtocolError};

use crate::transfer::CompletedDownload;

/// Default delay between a lost connection and the next attempt.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(3000);

/// Connection state machine - NO I/O, just state transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not connected and not trying to.
    Disconnected,
    /// Connection attempt in progress.
    Connecting {
        /// Failed attempts since the last successful open.
        attempt: u32,
    },
    /// Socket open; frames flow both ways.
    Open,
    /// Waiting for the reconnect timer.
    Reconnecting {
        /// Failed attempts since the last successful open.
        attempt: u32,
    },
}

impl ConnectionState {
    /// Create a new state machine in the Disconnected state.
    pub fn new() -> Self {
        Self::Disconnected
    }

    /// Process an event and return the new state plus actions to execute.
    ///
    /// This is a pure function. `reconnect_delay` is used for every
    /// scheduled retry; it never grows.
    pub fn on_event(self, event: Event, reconnect_delay: Duration) -> (Self, Vec<Action>) {
        match (self, event) {
            // From Disconnected
            (Self::Disconnected, Event::ConnectRequested) => {
                (Self::Connecting { attempt: 0 }, vec![Action::Connect])
            }

            // From Connecting
            (Self::Connecting { .. }, Event::ConnectSucceeded) => (
                Self::Open,
                vec![
                    Action::EmitEvent(SyncEvent::Connected),
                    Action::Send(ClientCommand::RegisterDashboard),
                    Action::Send(ClientCommand::RequestStorageList),
                ],
            ),
            (Self::Connecting { attempt }, Event::ConnectFailed { error }) => {
                lost(attempt.saturating_add(1), error, reconnect_delay)
            }

            // From Open
            (Self::Open, Event::Disconnected { reason }) => lost(1, reason, reconnect_delay),

            // From Reconnecting
            (Self::Reconnecting { attempt }, Event::ReconnectTimer) => {
                (Self::Connecting { attempt }, vec![Action::Connect])
            }

            // Shutdown from anywhere but Disconnected
            (Self::Open, Event::ShutdownRequested)
            | (Self::Connecting { .. }, Event::ShutdownRequested) => {
                (Self::Disconnected, vec![Action::Disconnect])
            }
            (Self::Reconnecting { .. }, Event::ShutdownRequested) => {
                (Self::Disconnected, vec![Action::CancelReconnect])
            }

            // Invalid transitions - stay in current state
            (state, _) => (state, vec![]),
        }
    }

    /// Check if the socket is open.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }

    /// Check if currently trying to connect.
    pub fn is_connecting(&self) -> bool {
        matches!(self, Self::Connecting { .. } | Self::Reconnecting { .. })
    }
}

impl Default for ConnectionState {
    fn default() -> Self {
        Self::new()
    }
}

fn lost(attempt: u32, reason: String, delay: Duration) -> (ConnectionState, Vec<Action>) {
    (
        ConnectionState::Reconnecting { attempt },
        vec![
            Action::EmitEvent(SyncEvent::ConnectionLost { reason, attempt }),
            Action::StartReconnectTimer { delay },
        ],
    )
}

/// Events that can occur in the connection lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Engine start.
    ConnectRequested,
    /// Transport connection opened.
    ConnectSucceeded,
    /// Transport connection could not be opened.
    ConnectFailed {
        /// Error message describing the failure.
        error: String,
    },
    /// An open connection closed or errored.
    Disconnected {
        /// Reason for disconnection.
        reason: String,
    },
    /// Reconnect timer fired.
    ReconnectTimer,
    /// User asked the engine to stop.
    ShutdownRequested,
}

/// Actions to be executed by logos-client.
///
/// These are instructions, not side effects. The client interprets them and
/// performs the actual I/O.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Open the transport.
    Connect,
    /// Close the transport and stop the run loop.
    Disconnect,
    /// Send a command over the open transport.
    Send(ClientCommand),
    /// Start a timer for reconnection.
    StartReconnectTimer {
        /// Delay before attempting reconnection.
        delay: Duration,
    },
    /// Cancel any pending reconnect timer and stop the run loop.
    CancelReconnect,
    /// Hand a finished download to the materialization collaborator.
    Deliver(CompletedDownload),
    /// Report something to the application (for logging).
    EmitEvent(SyncEvent),
}

/// Events reported to the application layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// The socket opened.
    Connected,
    /// The socket closed or could not be opened.
    ConnectionLost {
        /// Reason reported by the transport.
        reason: String,
        /// Failed attempts since the last successful open.
        attempt: u32,
    },
    /// A text frame could not be decoded and was skipped.
    FrameRejected {
        /// Why decoding failed.
        error: ProtocolError,
    },
    /// Pending downloads were dropped by the timeout sweep.
    DownloadsExpired {
        /// The expired paths.
        paths: Vec<String>,
    },
}
