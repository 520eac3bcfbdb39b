//! Inbound protocol messages (server to dashboard).
//!
//! Each variant travels as a single-key envelope whose key is the variant
//! name and whose value is the payload struct. Decoding lives in
//! [`crate::envelope`].

use serde::{Deserialize, Serialize};

use crate::{FileMetadata, Stats, StorageInfo};

/// All messages the dashboard recognizes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServerMessage {
    /// Full list of storages
    StorageList(StorageList),
    /// Snapshot of a storage after joining it
    Welcome(Welcome),
    /// Announces the binary frame that follows
    StartTransfer(StartTransfer),
    /// Server log line
    Log(Log),
    /// Usage statistics
    Stats(Stats),
    /// A file was created or changed
    FileUpdate(FileUpdate),
    /// A file was deleted
    DeleteFile(DeleteFile),
}

impl ServerMessage {
    /// Envelope keys the dashboard recognizes.
    pub const VARIANTS: &'static [&'static str] = &[
        "StorageList",
        "Welcome",
        "StartTransfer",
        "Log",
        "Stats",
        "FileUpdate",
        "DeleteFile",
    ];

    /// The envelope key for this message.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::StorageList(_) => "StorageList",
            Self::Welcome(_) => "Welcome",
            Self::StartTransfer(_) => "StartTransfer",
            Self::Log(_) => "Log",
            Self::Stats(_) => "Stats",
            Self::FileUpdate(_) => "FileUpdate",
            Self::DeleteFile(_) => "DeleteFile",
        }
    }
}

/// Replacement storage list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageList {
    /// Every storage the server knows about
    pub storages: Vec<StorageInfo>,
}

/// Storage snapshot sent in response to `JoinStorage`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Welcome {
    /// The joined storage
    pub storage_id: String,
    /// Every file in the storage, tombstones included
    pub files: Vec<FileMetadata>,
}

/// Header announcing that the next binary frame carries `path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartTransfer {
    /// File the binary payload belongs to
    pub path: String,
    /// Payload size in bytes
    #[serde(default)]
    pub size: u64,
    /// Version the payload represents
    #[serde(default)]
    pub target_version: u64,
}

/// A server log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Log {
    /// Severity (`"info"`, `"error"`, ...)
    pub level: String,
    /// Log text
    pub message: String,
    /// Unix seconds
    pub timestamp: u64,
}

/// Upserted file metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileUpdate {
    /// The new metadata for `meta.path`
    pub meta: FileMetadata,
}

/// Deletion notice for one path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteFile {
    /// Deleted path
    pub path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variants_match_kinds() {
        let messages = [
            ServerMessage::StorageList(StorageList { storages: vec![] }),
            ServerMessage::Welcome(Welcome {
                storage_id: "s".into(),
                files: vec![],
            }),
            ServerMessage::StartTransfer(StartTransfer {
                path: "a".into(),
                size: 0,
                target_version: 0,
            }),
            ServerMessage::Log(Log {
                level: "info".into(),
                message: "m".into(),
                timestamp: 0,
            }),
            ServerMessage::Stats(Stats::default()),
            ServerMessage::DeleteFile(DeleteFile { path: "a".into() }),
        ];

        for msg in &messages {
            assert!(ServerMessage::VARIANTS.contains(&msg.kind()));
        }
    }

    #[test]
    fn serializes_as_single_key_envelope() {
        let msg = ServerMessage::DeleteFile(DeleteFile {
            path: "docs/a.txt".into(),
        });

        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"DeleteFile":{"path":"docs/a.txt"}}"#);
    }

    #[test]
    fn start_transfer_accepts_server_header_fields() {
        let header: StartTransfer =
            serde_json::from_str(r#"{"path":"a.txt","size":12,"target_version":3}"#).unwrap();
        assert_eq!(header.size, 12);
        assert_eq!(header.target_version, 3);

        let bare: StartTransfer = serde_json::from_str(r#"{"path":"a.txt"}"#).unwrap();
        assert_eq!(bare.path, "a.txt");
        assert_eq!(bare.size, 0);
    }
}
