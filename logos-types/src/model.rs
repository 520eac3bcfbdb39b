//! Data model shared between the server and the dashboard.

use serde::{Deserialize, Serialize};

/// A logical file collection hosted by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageInfo {
    /// Server-assigned storage identifier
    pub id: String,
    /// Human-readable name
    pub name: String,
}

/// Metadata for one file inside a storage.
///
/// `path` is the unique key within a storage. Deleted files are kept as
/// tombstones with `is_deleted` set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    /// Path relative to the storage root
    pub path: String,
    /// Size in bytes
    pub size: u64,
    /// Last modification time (Unix seconds)
    pub modified: u64,
    /// Monotonically increasing version per path
    pub version: u64,
    /// Content hash (hex)
    pub hash: String,
    /// Tombstone flag
    pub is_deleted: bool,
    /// Name of the client that last touched the file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_by: Option<String>,
}

/// A client currently attached to some storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    /// Connection identifier
    pub id: String,
    /// Client display name
    pub name: String,
    /// Storage the client has joined
    pub storage_id: String,
}

/// Aggregate usage statistics, always replaced wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    /// Number of connected sync clients
    pub active_clients: u64,
    /// Number of files known to the server across all storages
    pub total_files: u64,
    /// Per-client details
    #[serde(default)]
    pub client_details: Vec<ClientInfo>,
}
