//! Observable dashboard state.
//!
//! Each container of the store is published on its own `tokio::sync::watch`
//! channel. Presentation code holds a [`DashboardState`] and awaits
//! `changed()` on whichever containers it renders.

use logos_core::{ActivityEntry, Changes, StateStore};
use logos_types::{FileMetadata, Stats, StorageInfo};
use tokio::sync::watch;

/// Receiving side: one watch receiver per container.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// Known storages.
    pub storages: watch::Receiver<Vec<StorageInfo>>,
    /// Active storage selector.
    pub active_storage: watch::Receiver<Option<String>>,
    /// Files of the active storage, tombstones included.
    pub files: watch::Receiver<Vec<FileMetadata>>,
    /// Activity feed, oldest first.
    pub activity: watch::Receiver<Vec<ActivityEntry>>,
    /// Latest server stats.
    pub stats: watch::Receiver<Stats>,
    /// Connection flag.
    pub connected: watch::Receiver<bool>,
}

impl DashboardState {
    /// Current connection flag.
    pub fn is_connected(&self) -> bool {
        *self.connected.borrow()
    }

    /// Snapshot of the file list.
    pub fn files(&self) -> Vec<FileMetadata> {
        self.files.borrow().clone()
    }

    /// Snapshot of the storage list.
    pub fn storages(&self) -> Vec<StorageInfo> {
        self.storages.borrow().clone()
    }

    /// Snapshot of the activity feed.
    pub fn activity(&self) -> Vec<ActivityEntry> {
        self.activity.borrow().clone()
    }

    /// Current active storage.
    pub fn active_storage(&self) -> Option<String> {
        self.active_storage.borrow().clone()
    }

    /// Snapshot of the stats.
    pub fn stats(&self) -> Stats {
        self.stats.borrow().clone()
    }
}

/// Sending side, owned by the run loop.
#[derive(Debug)]
pub(crate) struct Publisher {
    storages: watch::Sender<Vec<StorageInfo>>,
    active_storage: watch::Sender<Option<String>>,
    files: watch::Sender<Vec<FileMetadata>>,
    activity: watch::Sender<Vec<ActivityEntry>>,
    stats: watch::Sender<Stats>,
    connected: watch::Sender<bool>,
}

impl Publisher {
    /// Create a publisher seeded from `store`.
    pub(crate) fn new(store: &StateStore) -> (Self, DashboardState) {
        let (storages, storages_rx) = watch::channel(store.storages().to_vec());
        let (active_storage, active_rx) =
            watch::channel(store.active_storage_id().map(str::to_string));
        let (files, files_rx) = watch::channel(store.files().to_vec());
        let (activity, activity_rx) = watch::channel(store.activity().to_vec());
        let (stats, stats_rx) = watch::channel(store.stats().clone());
        let (connected, connected_rx) = watch::channel(store.is_connected());

        let publisher = Self {
            storages,
            active_storage,
            files,
            activity,
            stats,
            connected,
        };
        let state = DashboardState {
            storages: storages_rx,
            active_storage: active_rx,
            files: files_rx,
            activity: activity_rx,
            stats: stats_rx,
            connected: connected_rx,
        };
        (publisher, state)
    }

    /// Push the containers flagged in `changes`.
    ///
    /// Uses `send_replace` so publishing works with no receivers left.
    pub(crate) fn publish(&self, store: &StateStore, changes: Changes) {
        if changes.storages {
            self.storages.send_replace(store.storages().to_vec());
        }
        if changes.active_storage {
            self.active_storage
                .send_replace(store.active_storage_id().map(str::to_string));
        }
        if changes.files {
            self.files.send_replace(store.files().to_vec());
        }
        if changes.activity {
            self.activity.send_replace(store.activity().to_vec());
        }
        if changes.stats {
            self.stats.send_replace(store.stats().clone());
        }
        if changes.connected {
            self.connected.send_replace(store.is_connected());
        }
    }

    /// A fresh receiver set.
    pub(crate) fn subscribe(&self) -> DashboardState {
        DashboardState {
            storages: self.storages.subscribe(),
            active_storage: self.active_storage.subscribe(),
            files: self.files.subscribe(),
            activity: self.activity.subscribe(),
            stats: self.stats.subscribe(),
            connected: self.connected.subscribe(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logos_core::ActivityKind;

    #[test]
    fn seeded_from_store() {
        let store = StateStore::default();
        let (_publisher, state) = Publisher::new(&store);

        assert!(!state.is_connected());
        assert!(state.files().is_empty());
        assert!(state.active_storage().is_none());
    }

    #[test]
    fn publishes_only_flagged_containers() {
        let mut store = StateStore::default();
        let (publisher, mut state) = Publisher::new(&store);

        store.set_connected(true);
        store.record(ActivityKind::Connect, "Dashboard connected", "System", 1);
        let changes = store.take_changes();
        publisher.publish(&store, changes);

        assert!(state.connected.has_changed().unwrap());
        assert!(state.activity.has_changed().unwrap());
        assert!(!state.files.has_changed().unwrap());
        assert!(!state.storages.has_changed().unwrap());

        state.connected.borrow_and_update();
        assert!(state.is_connected());
        assert_eq!(state.activity().len(), 1);
    }

    #[test]
    fn subscribe_sees_current_values() {
        let mut store = StateStore::default();
        let (publisher, _state) = Publisher::new(&store);

        store.set_active_storage(Some("s1".into()));
        publisher.publish(&store, store.clone().take_changes());

        let late = publisher.subscribe();
        assert_eq!(late.active_storage(), Some("s1".to_string()));
    }
}
