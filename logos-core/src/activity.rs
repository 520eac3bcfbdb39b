//! Activity feed for the dashboard.
//!
//! This module provides the bounded, append-only log shown to the user:
//! - FIFO ordering (oldest first)
//! - A fixed capacity (100 by default)
//! - Eviction of the oldest entries once the capacity is exceeded
//!
//! Entries are never edited after they are appended.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default number of entries kept in the feed.
pub const DEFAULT_ACTIVITY_CAPACITY: usize = 100;

/// Category of an activity entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActivityKind {
    /// A file was created or changed
    FileUpdate,
    /// A file was deleted
    FileDelete,
    /// Informational engine or server message
    System,
    /// Error reported by the server or the connection
    Error,
    /// The dashboard (re)connected
    Connect,
}

impl ActivityKind {
    /// Wire/display name (`file-update`, `system`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FileUpdate => "file-update",
            Self::FileDelete => "file-delete",
            Self::System => "system",
            Self::Error => "error",
            Self::Connect => "connect",
        }
    }
}

impl std::fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of the activity feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEntry {
    /// Unique entry identifier (UUID v4).
    pub id: String,
    /// Entry category.
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    /// Text shown to the user.
    pub message: String,
    /// Who caused the entry (`System`, `Server`, a client name, `Unknown`).
    pub user: String,
    /// Unix seconds.
    pub timestamp: u64,
}

impl ActivityEntry {
    /// Create a new entry with a fresh identifier.
    pub fn new(kind: ActivityKind, message: &str, user: &str, timestamp: u64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            message: message.to_string(),
            user: user.to_string(),
            timestamp,
        }
    }
}

/// Bounded activity log.
///
/// Unlike a send buffer, a full feed never rejects input: pushing past
/// capacity drops the oldest entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityFeed {
    /// Maximum number of retained entries.
    capacity: usize,
    /// Retained entries, oldest first.
    entries: VecDeque<ActivityEntry>,
}

impl ActivityFeed {
    /// Create an empty feed holding at most `capacity` entries.
    ///
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    /// Append an entry, evicting from the front when over capacity.
    ///
    /// Returns the number of evicted entries.
    pub fn push(&mut self, entry: ActivityEntry) -> usize {
        self.entries.push_back(entry);
        let mut evicted = 0;
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
            evicted += 1;
        }
        evicted
    }

    /// Iterate over retained entries, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &ActivityEntry> {
        self.entries.iter()
    }

    /// Most recent entry.
    pub fn latest(&self) -> Option<&ActivityEntry> {
        self.entries.back()
    }

    /// Copy of the retained entries, oldest first.
    pub fn to_vec(&self) -> Vec<ActivityEntry> {
        self.entries.iter().cloned().collect()
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the feed is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of retained entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for ActivityFeed {
    fn default() -> Self {
        Self::new(DEFAULT_ACTIVITY_CAPACITY)
    }
}
