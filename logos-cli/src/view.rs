//! Plain-text rendering of dashboard state.

use logos_client::DashboardState;
use logos_core::ActivityEntry;
use logos_types::FileMetadata;

/// Entries after the one with id `last_seen`.
///
/// If `last_seen` was evicted from the feed (or is `None`) every entry is new.
pub fn unseen<'a>(entries: &'a [ActivityEntry], last_seen: Option<&str>) -> &'a [ActivityEntry] {
    let Some(last_seen) = last_seen else {
        return entries;
    };
    match entries.iter().position(|e| e.id == last_seen) {
        Some(index) => &entries[index + 1..],
        None => entries,
    }
}

/// One activity line.
pub fn format_entry(entry: &ActivityEntry) -> String {
    format!(
        "[{}] {:<11} {:<10} {}",
        entry.timestamp,
        entry.kind.as_str(),
        entry.user,
        entry.message
    )
}

/// The file table, tombstones marked.
pub fn format_files(files: &[FileMetadata]) -> String {
    if files.is_empty() {
        return "  (no files)".to_string();
    }
    files
        .iter()
        .map(|f| {
            let marker = if f.is_deleted { " (deleted)" } else { "" };
            format!("  {:>10}  v{:<4} {}{}", f.size, f.version, f.path, marker)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Print activity and file changes until the client stops publishing.
pub async fn follow(mut state: DashboardState) {
    let mut last_seen: Option<String> = None;

    loop {
        tokio::select! {
            changed = state.activity.changed() => {
                if changed.is_err() {
                    break;
                }
                let entries = state.activity.borrow_and_update().clone();
                for entry in unseen(&entries, last_seen.as_deref()) {
                    println!("{}", format_entry(entry));
                }
                if let Some(latest) = entries.last() {
                    last_seen = Some(latest.id.clone());
                }
            }
            changed = state.files.changed() => {
                if changed.is_err() {
                    break;
                }
                let files = state.files.borrow_and_update().clone();
                println!("Files ({}):\n{}", files.len(), format_files(&files));
            }
        }
    }
}
