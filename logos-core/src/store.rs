//! Dashboard state containers.
//!
//! [`StateStore`] holds everything the presentation layer observes. Each
//! container is replaced or edited as a whole inside one call, and every
//! mutation flags the container in [`Changes`] so the client layer can
//! publish exactly the containers that moved.

use logos_types::{FileMetadata, Stats, StorageInfo};

use crate::activity::{ActivityEntry, ActivityFeed, ActivityKind};

/// Which containers changed since the last [`StateStore::take_changes`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Changes {
    /// Storage list changed.
    pub storages: bool,
    /// Active storage selector changed.
    pub active_storage: bool,
    /// File list changed.
    pub files: bool,
    /// Activity feed changed.
    pub activity: bool,
    /// Stats snapshot changed.
    pub stats: bool,
    /// Connection flag changed.
    pub connected: bool,
}

impl Changes {
    /// Check if nothing changed.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// The dashboard's view of the server.
#[derive(Debug, Clone)]
pub struct StateStore {
    storages: Vec<StorageInfo>,
    active_storage_id: Option<String>,
    files: Vec<FileMetadata>,
    activity: ActivityFeed,
    stats: Stats,
    is_connected: bool,
    changes: Changes,
}

impl StateStore {
    /// Create an empty store whose feed keeps `activity_capacity` entries.
    pub fn new(activity_capacity: usize) -> Self {
        Self {
            storages: Vec::new(),
            active_storage_id: None,
            files: Vec::new(),
            activity: ActivityFeed::new(activity_capacity),
            stats: Stats::default(),
            is_connected: false,
            changes: Changes::default(),
        }
    }

    // Storages

    /// Replace the storage list wholesale.
    pub fn replace_storages(&mut self, storages: Vec<StorageInfo>) {
        self.storages = storages;
        self.changes.storages = true;
    }

    /// Remove a storage locally. Returns `true` if it was listed.
    pub fn remove_storage(&mut self, storage_id: &str) -> bool {
        let before = self.storages.len();
        self.storages.retain(|s| s.id != storage_id);
        let removed = self.storages.len() != before;
        if removed {
            self.changes.storages = true;
        }
        removed
    }

    /// Set or clear the active storage selector.
    pub fn set_active_storage(&mut self, storage_id: Option<String>) {
        if self.active_storage_id != storage_id {
            self.active_storage_id = storage_id;
            self.changes.active_storage = true;
        }
    }

    // Files

    /// Replace the file list with a snapshot, dropping tombstones.
    ///
    /// A path listed twice keeps the first position and the later entry.
    pub fn replace_files_from_snapshot(&mut self, files: Vec<FileMetadata>) {
        self.files.clear();
        for meta in files.into_iter().filter(|f| !f.is_deleted) {
            self.upsert_file(meta);
        }
        self.changes.files = true;
    }

    /// Empty the file list.
    pub fn clear_files(&mut self) {
        if !self.files.is_empty() {
            self.files.clear();
            self.changes.files = true;
        }
    }

    /// Insert or replace the entry for `meta.path`.
    ///
    /// An existing entry keeps its position in the list.
    pub fn upsert_file(&mut self, meta: FileMetadata) {
        match self.files.iter_mut().find(|f| f.path == meta.path) {
            Some(existing) => *existing = meta,
            None => self.files.push(meta),
        }
        self.changes.files = true;
    }

    /// Flag the entry for `path` as deleted, keeping it in the list.
    ///
    /// Returns `true` if an entry was found.
    pub fn mark_deleted(&mut self, path: &str) -> bool {
        match self.files.iter_mut().find(|f| f.path == path) {
            Some(existing) => {
                existing.is_deleted = true;
                self.changes.files = true;
                true
            }
            None => false,
        }
    }

    // Activity, stats, connection

    /// Append an activity entry.
    pub fn record(&mut self, kind: ActivityKind, message: &str, user: &str, timestamp: u64) {
        self.activity
            .push(ActivityEntry::new(kind, message, user, timestamp));
        self.changes.activity = true;
    }

    /// Replace the stats snapshot wholesale.
    pub fn replace_stats(&mut self, stats: Stats) {
        self.stats = stats;
        self.changes.stats = true;
    }

    /// Set the connection flag.
    pub fn set_connected(&mut self, connected: bool) {
        if self.is_connected != connected {
            self.is_connected = connected;
            self.changes.connected = true;
        }
    }

    // Reads

    /// Known storages.
    pub fn storages(&self) -> &[StorageInfo] {
        &self.storages
    }

    /// The storage the dashboard joined last, if any.
    pub fn active_storage_id(&self) -> Option<&str> {
        self.active_storage_id.as_deref()
    }

    /// Files of the active storage, tombstones included.
    pub fn files(&self) -> &[FileMetadata] {
        &self.files
    }

    /// Look up one file by path.
    pub fn file(&self, path: &str) -> Option<&FileMetadata> {
        self.files.iter().find(|f| f.path == path)
    }

    /// The activity feed.
    pub fn activity(&self) -> &ActivityFeed {
        &self.activity
    }

    /// Latest stats snapshot.
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Connection flag.
    pub fn is_connected(&self) -> bool {
        self.is_connected
    }

    /// Return and reset the change flags.
    pub fn take_changes(&mut self) -> Changes {
        std::mem::take(&mut self.changes)
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new(crate::activity::DEFAULT_ACTIVITY_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(path: &str, version: u64) -> FileMetadata {
        FileMetadata {
            path: path.into(),
            size: 10,
            modified: 1705000000 + version,
            version,
            hash: format!("h{}", version),
            is_deleted: false,
            last_modified_by: None,
        }
    }

    #[test]
    fn starts_empty() {
        let store = StateStore::default();

        assert!(store.storages().is_empty());
        assert!(store.active_storage_id().is_none());
        assert!(store.files().is_empty());
        assert!(store.activity().is_empty());
        assert_eq!(store.stats(), &Stats::default());
        assert!(!store.is_connected());
    }

    #[test]
    fn upsert_replaces_in_place() {
        let mut store = StateStore::default();
        store.upsert_file(meta("a", 1));
        store.upsert_file(meta("b", 1));
        store.upsert_file(meta("a", 2));

        let paths: Vec<_> = store.files().iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["a", "b"]);
        assert_eq!(store.file("a").unwrap().version, 2);
    }

    #[test]
    fn mark_deleted_keeps_entry() {
        let mut store = StateStore::default();
        store.upsert_file(meta("a", 1));

        assert!(store.mark_deleted("a"));
        assert_eq!(store.files().len(), 1);
        assert!(store.file("a").unwrap().is_deleted);
    }

    #[test]
    fn mark_deleted_unknown_path_is_no_op() {
        let mut store = StateStore::default();
        store.take_changes();

        assert!(!store.mark_deleted("missing"));
        assert!(store.take_changes().is_empty());
    }

    #[test]
    fn snapshot_drops_tombstones() {
        let mut store = StateStore::default();
        let mut gone = meta("gone", 3);
        gone.is_deleted = true;

        store.replace_files_from_snapshot(vec![meta("kept", 1), gone]);

        assert_eq!(store.files().len(), 1);
        assert!(store.file("gone").is_none());
    }

    #[test]
    fn snapshot_collapses_repeated_paths() {
        let mut store = StateStore::default();

        store.replace_files_from_snapshot(vec![meta("a", 1), meta("b", 1), meta("a", 2)]);

        let paths: Vec<_> = store.files().iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["a", "b"]);
        assert_eq!(store.file("a").unwrap().version, 2);
    }

    #[test]
    fn remove_storage_reports_presence() {
        let mut store = StateStore::default();
        store.replace_storages(vec![StorageInfo {
            id: "s1".into(),
            name: "one".into(),
        }]);

        assert!(store.remove_storage("s1"));
        assert!(!store.remove_storage("s1"));
        assert!(store.storages().is_empty());
    }

    #[test]
    fn changes_track_touched_containers() {
        let mut store = StateStore::default();

        store.upsert_file(meta("a", 1));
        store.record(ActivityKind::System, "hi", "System", 1);

        let changes = store.take_changes();
        assert!(changes.files);
        assert!(changes.activity);
        assert!(!changes.storages);
        assert!(!changes.stats);

        assert!(store.take_changes().is_empty());
    }

    #[test]
    fn unchanged_flags_are_not_reported() {
        let mut store = StateStore::default();

        store.set_connected(false);
        store.set_active_storage(None);
        store.clear_files();

        assert!(store.take_changes().is_empty());
    }
}
