//! # logos-types
//!
//! Wire format types for the Logos dashboard sync protocol.
//!
//! This crate provides the foundational types shared by the Logos crates:
//! - [`StorageInfo`], [`FileMetadata`], [`Stats`], [`ClientInfo`] - Data model
//! - [`ServerMessage`] - Inbound messages (server to dashboard)
//! - [`ClientCommand`] - Outbound commands (dashboard to server)
//! - [`Frame`] - A single text or binary socket frame
//! - [`ProtocolError`] - Error types
//!
//! Every text frame is a single-key JSON envelope whose key names the
//! variant, e.g. `{"FileUpdate": {"meta": {...}}}`. Commands without a
//! payload travel as bare JSON strings (`"RequestStorageList"`).

#![warn(missing_docs)]
#![warn(clippy::all)]

mod commands;
mod envelope;
mod error;
mod messages;
mod model;

pub use commands::ClientCommand;
pub use envelope::Frame;
pub use error::ProtocolError;
pub use messages::{
    DeleteFile, FileUpdate, Log, ServerMessage, StartTransfer, StorageList, Welcome,
};
pub use model::{ClientInfo, FileMetadata, Stats, StorageInfo};
