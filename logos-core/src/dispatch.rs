//! Inbound message routing.
//!
//! Applies one decoded [`ServerMessage`] to the state store and the transfer
//! coordinator. Each call runs to completion before the next message is
//! considered.

use logos_types::ServerMessage;

use crate::activity::ActivityKind;
use crate::store::StateStore;
use crate::transfer::TransferCoordinator;

/// Server log lines containing this text duplicate `FileUpdate` events and
/// are not shown.
pub const SUPPRESSED_LOG_MARKER: &str = "File updated in";

/// `user` for entries the engine generates itself.
pub const SYSTEM_USER: &str = "System";

/// `user` for server log lines.
pub const SERVER_USER: &str = "Server";

/// `user` when the server does not say who changed a file.
pub const UNKNOWN_USER: &str = "Unknown";

/// Apply an inbound message.
///
/// `now` (Unix seconds) stamps entries whose message carries no time.
pub fn dispatch(
    message: ServerMessage,
    store: &mut StateStore,
    transfers: &mut TransferCoordinator,
    now: u64,
) {
    match message {
        ServerMessage::StorageList(list) => store.replace_storages(list.storages),

        ServerMessage::Welcome(welcome) => {
            store.replace_files_from_snapshot(welcome.files);
            store.record(
                ActivityKind::System,
                &format!("Joined storage: {}...", abbreviate(&welcome.storage_id)),
                SYSTEM_USER,
                now,
            );
        }

        ServerMessage::StartTransfer(header) => {
            if transfers.on_start_transfer(&header.path) {
                store.record(
                    ActivityKind::System,
                    &format!("Downloading {}...", header.path),
                    SYSTEM_USER,
                    now,
                );
            }
        }

        ServerMessage::Log(log) => {
            if !log.message.contains(SUPPRESSED_LOG_MARKER) {
                let kind = if log.level == "error" {
                    ActivityKind::Error
                } else {
                    ActivityKind::System
                };
                store.record(kind, &log.message, SERVER_USER, or_now(log.timestamp, now));
            }
        }

        ServerMessage::Stats(stats) => store.replace_stats(stats),

        ServerMessage::FileUpdate(update) => {
            let meta = update.meta;
            let user = meta
                .last_modified_by
                .clone()
                .unwrap_or_else(|| UNKNOWN_USER.to_string());
            let path = meta.path.clone();
            let stamp = or_now(meta.modified, now);
            store.upsert_file(meta);
            store.record(ActivityKind::FileUpdate, &path, &user, stamp);
        }

        ServerMessage::DeleteFile(delete) => {
            store.mark_deleted(&delete.path);
            store.record(ActivityKind::FileDelete, &delete.path, UNKNOWN_USER, now);
        }
    }
}

/// A zero timestamp means the server sent none.
fn or_now(timestamp: u64, now: u64) -> u64 {
    if timestamp == 0 {
        now
    } else {
        timestamp
    }
}

/// First 8 characters of a storage id.
fn abbreviate(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((end, _)) => &id[..end],
        None => id,
    }
}
