//! Outbound commands (dashboard to server).

use serde::{Deserialize, Serialize};

use crate::{Frame, ProtocolError};

/// Every command the dashboard sends.
///
/// Unit variants serialize as bare JSON strings, the rest as single-key
/// envelopes matching the inbound convention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientCommand {
    /// Subscribe this connection to dashboard broadcasts
    RegisterDashboard,
    /// Ask for a fresh `StorageList`
    RequestStorageList,
    /// Join a storage and receive its `Welcome` snapshot
    JoinStorage {
        /// Storage to join
        storage_id: String,
        /// Name shown to other clients
        client_name: String,
    },
    /// Ask the server to stream a file back
    RequestFile {
        /// File to download
        path: String,
    },
    /// Delete a file for every client of the storage
    DeleteFile {
        /// File to delete
        path: String,
    },
    /// Create a new storage
    CreateStorage {
        /// Display name
        name: String,
    },
    /// Delete a storage and all of its files
    DeleteStorage {
        /// Storage to delete
        storage_id: String,
    },
}

impl ClientCommand {
    /// Variant name, as it appears on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RegisterDashboard => "RegisterDashboard",
            Self::RequestStorageList => "RequestStorageList",
            Self::JoinStorage { .. } => "JoinStorage",
            Self::RequestFile { .. } => "RequestFile",
            Self::DeleteFile { .. } => "DeleteFile",
            Self::CreateStorage { .. } => "CreateStorage",
            Self::DeleteStorage { .. } => "DeleteStorage",
        }
    }

    /// Serialize to the JSON wire text.
    pub fn encode(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(|e| ProtocolError::Encode(e.to_string()))
    }

    /// Serialize into a text frame ready for the transport.
    pub fn to_frame(&self) -> Result<Frame, ProtocolError> {
        self.encode().map(Frame::Text)
    }
}
