//! # logos-core
//!
//! Pure logic for the Logos dashboard (no I/O, instant tests).
//!
//! This crate implements the connection state machine, message dispatch,
//! the observable state store and download pairing without any network or
//! disk I/O.
//!
//! ## Design Philosophy
//!
//! All modules in this crate are **pure** - they take input and produce output
//! without side effects. This enables:
//! - Instant unit tests (no mocks, no async)
//! - Deterministic behavior (same input → same output)
//! - Easy reasoning about state transitions
//!
//! The actual I/O (socket, timers, writing downloads) is performed by
//! `logos-client`, which interprets the [`Action`]s produced by
//! [`DashboardEngine`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod activity;
pub mod dispatch;
pub mod engine;
pub mod state;
pub mod store;
pub mod transfer;

pub use activity::{ActivityEntry, ActivityFeed, ActivityKind, DEFAULT_ACTIVITY_CAPACITY};
pub use dispatch::dispatch;
pub use engine::{DashboardEngine, EngineConfig, Input, Intent, DEFAULT_CLIENT_NAME};
pub use state::{Action, ConnectionState, Event, SyncEvent, DEFAULT_RECONNECT_DELAY};
pub use store::{Changes, StateStore};
pub use transfer::{CompletedDownload, TransferCoordinator};
