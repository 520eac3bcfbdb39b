//! Download pairing for the two-phase transfer protocol.
//!
//! A download is requested with `RequestFile`. The server answers with a
//! `StartTransfer` header followed by exactly one binary frame. Binary frames
//! carry no metadata, so attribution is positional:
//!
//! 1. `request()` - path becomes pending
//! 2. `on_start_transfer()` - a pending path is armed
//! 3. `on_binary()` - the armed path receives the payload and leaves the
//!    pending set
//!
//! Only one transfer can be armed. A second header before the payload
//! replaces the first, leaving the first path pending.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// A payload paired with the file it belongs to.
#[derive(Clone, PartialEq, Eq)]
pub struct CompletedDownload {
    /// The file path announced by `StartTransfer`.
    pub path: String,
    /// Raw payload bytes.
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for CompletedDownload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletedDownload")
            .field("path", &self.path)
            .field("bytes", &format!("[{} bytes]", self.bytes.len()))
            .finish()
    }
}

/// Tracks requested downloads and the armed transfer slot.
#[derive(Debug, Clone, Default)]
pub struct TransferCoordinator {
    /// Requested paths and when they were (last) requested.
    pending: HashMap<String, Instant>,
    /// Path whose payload is expected in the next binary frame.
    armed: Option<String>,
}

impl TransferCoordinator {
    /// Create an empty coordinator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a download request.
    ///
    /// Requesting a path that is already pending refreshes its request time.
    pub fn request(&mut self, path: &str, now: Instant) {
        self.pending.insert(path.to_string(), now);
    }

    /// Handle a `StartTransfer` header.
    ///
    /// Arms the slot if `path` is pending and returns `true`. Otherwise the
    /// transfer is not ours: any armed slot is cleared and `false` returned.
    pub fn on_start_transfer(&mut self, path: &str) -> bool {
        if self.pending.contains_key(path) {
            self.armed = Some(path.to_string());
            true
        } else {
            self.armed = None;
            false
        }
    }

    /// Handle a binary frame.
    ///
    /// Returns the completed download if a slot was armed. Without an armed
    /// slot the frame is dropped.
    pub fn on_binary(&mut self, bytes: Vec<u8>) -> Option<CompletedDownload> {
        let path = self.armed.take()?;
        self.pending.remove(&path);
        Some(CompletedDownload { path, bytes })
    }

    /// Drop pending requests older than `timeout`.
    ///
    /// The armed path is never expired since its payload is already on the
    /// way. Returns the expired paths, sorted.
    pub fn expire(&mut self, now: Instant, timeout: Duration) -> Vec<String> {
        let armed = self.armed.as_deref();
        let mut expired: Vec<String> = self
            .pending
            .iter()
            .filter(|(path, requested_at)| {
                Some(path.as_str()) != armed
                    && now.saturating_duration_since(**requested_at) > timeout
            })
            .map(|(path, _)| path.clone())
            .collect();

        for path in &expired {
            self.pending.remove(path);
        }
        expired.sort();
        expired
    }

    /// Check if a download for `path` is outstanding.
    pub fn is_pending(&self, path: &str) -> bool {
        self.pending.contains_key(path)
    }

    /// Number of outstanding downloads.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Outstanding paths, sorted.
    pub fn pending_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.pending.keys().cloned().collect();
        paths.sort();
        paths
    }

    /// The armed path, if any.
    pub fn armed(&self) -> Option<&str> {
        self.armed.as_deref()
    }
}
