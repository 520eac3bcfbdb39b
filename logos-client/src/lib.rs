//! # logos-client
//!
//! Client library for the Logos dashboard.
//!
//! This is the library a dashboard application embeds to stay in sync with
//! a Logos server over a WebSocket.
//!
//! ## Features
//!
//! - **Run Loop**: One task owns the socket and applies inputs in order
//! - **Unconditional Reconnect**: Fixed delay, forever, handshake repeated
//! - **Observable State**: One `watch` channel per state container
//! - **Transport Abstraction**: Pluggable transport layer (WebSocket, mock)
//! - **Pure Engine**: Uses logos-core for side-effect-free logic
//!
//! ## Example
//!
//! ```ignore
//! use logos_client::{ClientConfig, DashboardClient, WsTransport};
//!
//! let (downloads, _finished) = tokio::sync::mpsc::unbounded_channel();
//! let (client, handle) = DashboardClient::new(ClientConfig::default(), WsTransport::new(), downloads);
//! tokio::spawn(client.run());
//!
//! let mut files = handle.state().files.clone();
//! files.changed().await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod observe;
pub mod sink;
pub mod transport;

pub use client::{
    ClientConfig, ClientError, DashboardClient, DashboardHandle, DEFAULT_ENDPOINT,
    EXPIRY_SWEEP_INTERVAL,
};
pub use observe::DashboardState;
pub use sink::DownloadSink;
pub use transport::{MockTransport, Transport, TransportError, WsTransport};
