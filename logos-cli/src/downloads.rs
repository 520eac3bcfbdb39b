//! Writes finished downloads under a directory.

use async_trait::async_trait;
use logos_client::DownloadSink;
use logos_core::CompletedDownload;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Materializes each download at `<root>/<path>`.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    /// Create a sink writing below `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Where `path` would be written.
    ///
    /// Server paths are relative; absolute paths and `..` are rejected.
    pub fn target(&self, path: &str) -> io::Result<PathBuf> {
        let relative = Path::new(path);
        let mut target = self.root.clone();
        for component in relative.components() {
            match component {
                Component::Normal(part) => target.push(part),
                Component::CurDir => {}
                _ => {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        format!("refusing to write outside download directory: {}", path),
                    ))
                }
            }
        }
        if target == self.root {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("empty download path: {:?}", path),
            ));
        }
        Ok(target)
    }
}

#[async_trait]
impl DownloadSink for DirectorySink {
    async fn deliver(&self, download: CompletedDownload) -> io::Result<()> {
        let target = self.target(&download.path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, &download.bytes).await?;
        tracing::debug!(path = %target.display(), "download written");
        Ok(())
    }
}
