//! The dashboard engine.
//!
//! [`DashboardEngine`] owns the connection state machine, the state store and
//! the transfer coordinator. Every input (connection event, frame, user
//! intent, timer) goes through [`DashboardEngine::handle`], which mutates
//! state and returns the I/O [`Action`]s for logos-client to perform.
//!
//! ```text
//! Input -> DashboardEngine -> Vec<Action> -> logos-client -> Transport
//!               |
//!          StateStore (observed through Changes)
//! ```

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use logos_types::{ClientCommand, Frame, ServerMessage};

use crate::activity::{ActivityKind, DEFAULT_ACTIVITY_CAPACITY};
use crate::dispatch::{dispatch, SYSTEM_USER};
use crate::state::{Action, ConnectionState, Event, SyncEvent, DEFAULT_RECONNECT_DELAY};
use crate::store::{Changes, StateStore};
use crate::transfer::TransferCoordinator;

/// Default `client_name` sent with `JoinStorage`.
pub const DEFAULT_CLIENT_NAME: &str = "Dashboard";

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Name announced when joining a storage.
    pub client_name: String,
    /// Maximum activity entries kept.
    pub activity_capacity: usize,
    /// Fixed delay before each reconnect attempt.
    pub reconnect_delay: Duration,
    /// Drop pending downloads after this long (`None` = never).
    pub pending_timeout: Option<Duration>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            client_name: DEFAULT_CLIENT_NAME.to_string(),
            activity_capacity: DEFAULT_ACTIVITY_CAPACITY,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            pending_timeout: None,
        }
    }
}

impl EngineConfig {
    /// Set the client name.
    pub fn with_client_name(mut self, name: &str) -> Self {
        self.client_name = name.to_string();
        self
    }

    /// Set the reconnect delay.
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    /// Enable the pending-download timeout.
    pub fn with_pending_timeout(mut self, timeout: Duration) -> Self {
        self.pending_timeout = Some(timeout);
        self
    }
}

/// A user or UI request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Ask for a fresh storage list.
    RefreshStorages,
    /// Create a storage.
    CreateStorage {
        /// Display name.
        name: String,
    },
    /// Join a storage (clears local files until `Welcome` arrives).
    JoinStorage {
        /// Storage to join.
        storage_id: String,
    },
    /// Delete a storage (removed locally right away).
    DeleteStorage {
        /// Storage to delete.
        storage_id: String,
    },
    /// Delete a file (tombstoned locally right away). Needs a connection.
    DeleteFile {
        /// File to delete.
        path: String,
    },
    /// Download a file. Needs a connection.
    DownloadFile {
        /// File to download.
        path: String,
    },
    /// Stop the engine.
    Shutdown,
}

/// Everything the engine reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Start connecting.
    Start,
    /// The transport opened.
    Opened,
    /// The transport could not be opened.
    ConnectFailed {
        /// Transport error text.
        error: String,
    },
    /// The open transport closed or errored.
    Closed {
        /// Transport error text.
        reason: String,
    },
    /// An inbound frame.
    Frame(Frame),
    /// A user intent.
    Intent(Intent),
    /// The reconnect timer fired.
    ReconnectTimer,
    /// Periodic sweep of pending downloads.
    ExpiryTick {
        /// Current monotonic time.
        now: Instant,
    },
}

/// The synchronization engine - pure state, no I/O.
#[derive(Debug, Clone)]
pub struct DashboardEngine {
    config: EngineConfig,
    connection: ConnectionState,
    store: StateStore,
    transfers: TransferCoordinator,
}

impl DashboardEngine {
    /// Create an engine with empty state.
    pub fn new(config: EngineConfig) -> Self {
        let store = StateStore::new(config.activity_capacity);
        Self {
            config,
            connection: ConnectionState::new(),
            store,
            transfers: TransferCoordinator::new(),
        }
    }

    /// Process one input to completion.
    ///
    /// Returns the actions to execute, in order.
    pub fn handle(&mut self, input: Input) -> Vec<Action> {
        self.handle_at(input, Instant::now())
    }

    /// Like [`handle`](Self::handle), with `now` stamping download requests.
    pub fn handle_at(&mut self, input: Input, now: Instant) -> Vec<Action> {
        match input {
            Input::Start => self.connection_event(Event::ConnectRequested),
            Input::Opened => self.connection_event(Event::ConnectSucceeded),
            Input::ConnectFailed { error } => self.connection_event(Event::ConnectFailed { error }),
            Input::Closed { reason } => self.connection_event(Event::Disconnected { reason }),
            Input::ReconnectTimer => self.connection_event(Event::ReconnectTimer),
            Input::Frame(frame) => self.on_frame(frame),
            Input::Intent(intent) => self.on_intent(intent, now),
            Input::ExpiryTick { now } => self.expire_pending(now),
        }
    }

    fn connection_event(&mut self, event: Event) -> Vec<Action> {
        let state = std::mem::take(&mut self.connection);
        let (next, actions) = state.on_event(event, self.config.reconnect_delay);
        self.connection = next;

        let mut out = Vec::with_capacity(actions.len());
        for action in actions {
            match &action {
                Action::EmitEvent(SyncEvent::Connected) => {
                    self.store.set_connected(true);
                    self.store.record(
                        ActivityKind::Connect,
                        "Dashboard connected",
                        SYSTEM_USER,
                        unix_now(),
                    );
                }
                Action::EmitEvent(SyncEvent::ConnectionLost { .. }) => {
                    self.store.set_connected(false);
                    self.store
                        .record(ActivityKind::Error, "Connection lost", SYSTEM_USER, unix_now());
                }
                Action::Disconnect | Action::CancelReconnect => self.store.set_connected(false),
                _ => {}
            }
            out.push(action);
        }
        out
    }

    fn on_frame(&mut self, frame: Frame) -> Vec<Action> {
        match frame {
            Frame::Binary(bytes) => self
                .transfers
                .on_binary(bytes)
                .map(Action::Deliver)
                .into_iter()
                .collect(),
            Frame::Text(text) => match ServerMessage::decode(&text) {
                Ok(Some(message)) => {
                    dispatch(message, &mut self.store, &mut self.transfers, unix_now());
                    vec![]
                }
                Ok(None) => vec![],
                Err(error) => vec![Action::EmitEvent(SyncEvent::FrameRejected { error })],
            },
        }
    }

    fn on_intent(&mut self, intent: Intent, now: Instant) -> Vec<Action> {
        match intent {
            Intent::RefreshStorages => self.send(ClientCommand::RequestStorageList),
            Intent::CreateStorage { name } => self.send(ClientCommand::CreateStorage { name }),
            Intent::JoinStorage { storage_id } => {
                self.store.set_active_storage(Some(storage_id.clone()));
                self.store.clear_files();
                self.send(ClientCommand::JoinStorage {
                    storage_id,
                    client_name: self.config.client_name.clone(),
                })
            }
            Intent::DeleteStorage { storage_id } => {
                self.store.remove_storage(&storage_id);
                if self.store.active_storage_id() == Some(storage_id.as_str()) {
                    self.store.set_active_storage(None);
                    self.store.clear_files();
                }
                self.send(ClientCommand::DeleteStorage { storage_id })
            }
            Intent::DeleteFile { path } => {
                if !self.store.is_connected() {
                    return vec![];
                }
                self.store.mark_deleted(&path);
                self.send(ClientCommand::DeleteFile { path })
            }
            Intent::DownloadFile { path } => {
                if !self.store.is_connected() {
                    return vec![];
                }
                self.transfers.request(&path, now);
                self.send(ClientCommand::RequestFile { path })
            }
            Intent::Shutdown => self.connection_event(Event::ShutdownRequested),
        }
    }

    fn expire_pending(&mut self, now: Instant) -> Vec<Action> {
        let Some(timeout) = self.config.pending_timeout else {
            return vec![];
        };
        let paths = self.transfers.expire(now, timeout);
        if paths.is_empty() {
            return vec![];
        }
        for path in &paths {
            self.store.record(
                ActivityKind::Error,
                &format!("Download timed out: {}", path),
                SYSTEM_USER,
                unix_now(),
            );
        }
        vec![Action::EmitEvent(SyncEvent::DownloadsExpired { paths })]
    }

    /// Outbound frames only leave while the socket is open.
    fn send(&self, command: ClientCommand) -> Vec<Action> {
        if self.connection.is_open() {
            vec![Action::Send(command)]
        } else {
            vec![]
        }
    }

    /// Current state.
    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Return and reset the store's change flags.
    pub fn take_changes(&mut self) -> Changes {
        self.store.take_changes()
    }

    /// Download bookkeeping.
    pub fn transfers(&self) -> &TransferCoordinator {
        &self.transfers
    }

    /// Connection lifecycle state.
    pub fn connection(&self) -> &ConnectionState {
        &self.connection
    }

    /// Engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

impl Default for DashboardEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

/// Wall-clock Unix seconds.
fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use logos_types::{FileMetadata, StorageInfo};

    fn open_engine() -> DashboardEngine {
        let mut engine = DashboardEngine::default();
        engine.handle(Input::Start);
        engine.handle(Input::Opened);
        engine.take_changes();
        engine
    }

    fn text(json: &str) -> Input {
        Input::Frame(Frame::Text(json.to_string()))
    }

    fn intent(intent: Intent) -> Input {
        Input::Intent(intent)
    }

    fn sends(actions: &[Action]) -> Vec<ClientCommand> {
        actions
            .iter()
            .filter_map(|a| match a {
                Action::Send(cmd) => Some(cmd.clone()),
                _ => None,
            })
            .collect()
    }

    fn file_update(path: &str, version: u64) -> Input {
        let meta = FileMetadata {
            path: path.into(),
            size: 1,
            modified: 1_705_000_000,
            version,
            hash: String::new(),
            is_deleted: false,
            last_modified_by: None,
        };
        Input::Frame(
            ServerMessage::FileUpdate(logos_types::FileUpdate { meta })
                .encode()
                .map(Frame::Text)
                .unwrap(),
        )
    }

    // ===========================================
    // Connection Lifecycle
    // ===========================================

    #[test]
    fn start_requests_connect() {
        let mut engine = DashboardEngine::default();
        assert_eq!(engine.handle(Input::Start), vec![Action::Connect]);
        assert!(!engine.store().is_connected());
    }

    #[test]
    fn open_marks_connected_and_handshakes() {
        let mut engine = DashboardEngine::default();
        engine.handle(Input::Start);

        let actions = engine.handle(Input::Opened);

        assert!(engine.store().is_connected());
        assert_eq!(
            sends(&actions),
            vec![
                ClientCommand::RegisterDashboard,
                ClientCommand::RequestStorageList
            ]
        );
        let entry = engine.store().activity().latest().unwrap();
        assert_eq!(entry.kind, ActivityKind::Connect);
        assert_eq!(entry.message, "Dashboard connected");
    }

    #[test]
    fn close_marks_disconnected_and_schedules_retry() {
        let mut engine = open_engine();

        let actions = engine.handle(Input::Closed {
            reason: "reset".into(),
        });

        assert!(!engine.store().is_connected());
        assert!(actions.contains(&Action::StartReconnectTimer {
            delay: Duration::from_millis(3000)
        }));
        let entry = engine.store().activity().latest().unwrap();
        assert_eq!(entry.kind, ActivityKind::Error);
        assert_eq!(entry.message, "Connection lost");
        assert!(engine.take_changes().connected);
    }

    #[test]
    fn failed_connect_is_treated_like_close() {
        let mut engine = DashboardEngine::default();
        engine.handle(Input::Start);

        let actions = engine.handle(Input::ConnectFailed {
            error: "refused".into(),
        });

        assert!(actions
            .iter()
            .any(|a| matches!(a, Action::StartReconnectTimer { .. })));
        assert_eq!(
            engine.store().activity().latest().unwrap().message,
            "Connection lost"
        );
    }

    #[test]
    fn reconnect_cycle_repeats_handshake() {
        let mut engine = open_engine();
        engine.handle(Input::Closed {
            reason: "x".into(),
        });

        assert_eq!(engine.handle(Input::ReconnectTimer), vec![Action::Connect]);
        let actions = engine.handle(Input::Opened);

        assert_eq!(
            sends(&actions),
            vec![
                ClientCommand::RegisterDashboard,
                ClientCommand::RequestStorageList
            ]
        );
    }

    #[test]
    fn shutdown_disconnects_without_activity() {
        let mut engine = open_engine();
        let before = engine.store().activity().len();

        let actions = engine.handle(intent(Intent::Shutdown));

        assert_eq!(actions, vec![Action::Disconnect]);
        assert!(!engine.store().is_connected());
        assert_eq!(engine.store().activity().len(), before);
    }

    // ===========================================
    // Commands
    // ===========================================

    #[test]
    fn commands_dropped_while_disconnected() {
        let mut engine = DashboardEngine::default();

        assert!(engine.handle(intent(Intent::RefreshStorages)).is_empty());
        assert!(engine
            .handle(intent(Intent::CreateStorage {
                name: "photos".into()
            }))
            .is_empty());
    }

    #[test]
    fn join_storage_clears_files_and_sets_active() {
        let mut engine = open_engine();
        engine.handle(file_update("a.txt", 1));

        let actions = engine.handle(intent(Intent::JoinStorage {
            storage_id: "s2".into(),
        }));

        assert!(engine.store().files().is_empty());
        assert_eq!(engine.store().active_storage_id(), Some("s2"));
        assert_eq!(
            sends(&actions),
            vec![ClientCommand::JoinStorage {
                storage_id: "s2".into(),
                client_name: "Dashboard".into()
            }]
        );
    }

    #[test]
    fn join_storage_uses_configured_client_name() {
        let mut engine = DashboardEngine::new(EngineConfig::default().with_client_name("ops"));
        engine.handle(Input::Start);
        engine.handle(Input::Opened);

        let actions = engine.handle(intent(Intent::JoinStorage {
            storage_id: "s".into(),
        }));

        assert!(matches!(
            &sends(&actions)[0],
            ClientCommand::JoinStorage { client_name, .. } if client_name == "ops"
        ));
    }

    #[test]
    fn delete_active_storage_is_optimistic() {
        let mut engine = open_engine();
        engine.handle(text(
            r#"{"StorageList":{"storages":[{"id":"s1","name":"one"},{"id":"s2","name":"two"}]}}"#,
        ));
        engine.handle(intent(Intent::JoinStorage {
            storage_id: "s1".into(),
        }));
        engine.handle(file_update("a.txt", 1));

        let actions = engine.handle(intent(Intent::DeleteStorage {
            storage_id: "s1".into(),
        }));

        assert_eq!(
            engine.store().storages(),
            &[StorageInfo {
                id: "s2".into(),
                name: "two".into()
            }]
        );
        assert!(engine.store().active_storage_id().is_none());
        assert!(engine.store().files().is_empty());
        assert_eq!(
            sends(&actions),
            vec![ClientCommand::DeleteStorage {
                storage_id: "s1".into()
            }]
        );
    }

    #[test]
    fn delete_inactive_storage_keeps_selection() {
        let mut engine = open_engine();
        engine.handle(intent(Intent::JoinStorage {
            storage_id: "s1".into(),
        }));
        engine.handle(file_update("a.txt", 1));

        engine.handle(intent(Intent::DeleteStorage {
            storage_id: "s2".into(),
        }));

        assert_eq!(engine.store().active_storage_id(), Some("s1"));
        assert_eq!(engine.store().files().len(), 1);
    }

    #[test]
    fn delete_file_tombstones_locally() {
        let mut engine = open_engine();
        engine.handle(file_update("a.txt", 1));

        let actions = engine.handle(intent(Intent::DeleteFile {
            path: "a.txt".into(),
        }));

        assert!(engine.store().file("a.txt").unwrap().is_deleted);
        assert_eq!(
            sends(&actions),
            vec![ClientCommand::DeleteFile {
                path: "a.txt".into()
            }]
        );
    }

    #[test]
    fn delete_file_rejected_while_disconnected() {
        let mut engine = open_engine();
        engine.handle(file_update("a.txt", 1));
        engine.handle(Input::Closed {
            reason: "x".into(),
        });

        let actions = engine.handle(intent(Intent::DeleteFile {
            path: "a.txt".into(),
        }));

        assert!(actions.is_empty());
        assert!(!engine.store().file("a.txt").unwrap().is_deleted);
    }

    // ===========================================
    // Downloads
    // ===========================================

    #[test]
    fn download_round_trip() {
        let mut engine = open_engine();

        let actions = engine.handle(intent(Intent::DownloadFile {
            path: "a.txt".into(),
        }));
        assert_eq!(
            sends(&actions),
            vec![ClientCommand::RequestFile {
                path: "a.txt".into()
            }]
        );

        engine.handle(text(r#"{"StartTransfer":{"path":"a.txt","size":5,"target_version":1}}"#));
        let actions = engine.handle(Input::Frame(Frame::Binary(b"hello".to_vec())));

        let delivered: Vec<_> = actions
            .iter()
            .filter_map(|a| match a {
                Action::Deliver(d) => Some(d.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].path, "a.txt");
        assert_eq!(delivered[0].bytes, b"hello");
        assert!(!engine.transfers().is_pending("a.txt"));
    }

    #[test]
    fn download_rejected_while_disconnected() {
        let mut engine = DashboardEngine::default();

        let actions = engine.handle(intent(Intent::DownloadFile {
            path: "a.txt".into(),
        }));

        assert!(actions.is_empty());
        assert!(!engine.transfers().is_pending("a.txt"));
    }

    #[test]
    fn orphan_binary_frame_has_no_effect() {
        let mut engine = open_engine();

        let actions = engine.handle(Input::Frame(Frame::Binary(vec![1, 2, 3])));

        assert!(actions.is_empty());
        assert!(engine.take_changes().is_empty());
    }

    #[test]
    fn pending_downloads_never_expire_by_default() {
        let mut engine = open_engine();
        engine.handle(intent(Intent::DownloadFile {
            path: "a.txt".into(),
        }));

        let actions = engine.handle(Input::ExpiryTick {
            now: Instant::now() + Duration::from_secs(86_400),
        });

        assert!(actions.is_empty());
        assert!(engine.transfers().is_pending("a.txt"));
    }

    #[test]
    fn configured_timeout_expires_pending_downloads() {
        let config = EngineConfig::default().with_pending_timeout(Duration::from_secs(30));
        let mut engine = DashboardEngine::new(config);
        engine.handle(Input::Start);
        engine.handle(Input::Opened);
        engine.handle(intent(Intent::DownloadFile {
            path: "a.txt".into(),
        }));

        let actions = engine.handle(Input::ExpiryTick {
            now: Instant::now() + Duration::from_secs(31),
        });

        assert_eq!(
            actions,
            vec![Action::EmitEvent(SyncEvent::DownloadsExpired {
                paths: vec!["a.txt".into()]
            })]
        );
        assert!(!engine.transfers().is_pending("a.txt"));
        assert_eq!(
            engine.store().activity().latest().unwrap().message,
            "Download timed out: a.txt"
        );
    }

    // ===========================================
    // Frames
    // ===========================================

    #[test]
    fn malformed_frame_is_reported_without_state_change() {
        let mut engine = open_engine();

        let actions = engine.handle(text("{oops"));

        assert!(matches!(
            actions.as_slice(),
            [Action::EmitEvent(SyncEvent::FrameRejected { .. })]
        ));
        assert!(engine.take_changes().is_empty());
        assert!(engine.store().is_connected());
    }

    #[test]
    fn unknown_envelope_is_silent() {
        let mut engine = open_engine();

        let actions = engine.handle(text(r#"{"ConflictDetected":{"path":"a","server_version":2}}"#));

        assert!(actions.is_empty());
        assert!(engine.take_changes().is_empty());
    }

    #[test]
    fn activity_cap_holds_across_events() {
        let mut engine = open_engine();

        for i in 0..130u64 {
            engine.handle(file_update(&format!("f{}", i), 1));
        }

        let entries = engine.store().activity().to_vec();
        assert_eq!(entries.len(), 100);
        assert_eq!(entries.last().unwrap().message, "f129");
        assert_eq!(entries.first().unwrap().message, "f30");
    }
}
