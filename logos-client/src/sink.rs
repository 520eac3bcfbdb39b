//! Where finished downloads go.

use async_trait::async_trait;
use logos_core::CompletedDownload;
use tokio::sync::mpsc;

/// Receives each completed download exactly once.
///
/// Deliveries run on the engine task, so slow sinks delay frame processing.
#[async_trait]
pub trait DownloadSink: Send + Sync {
    /// Materialize one download.
    async fn deliver(&self, download: CompletedDownload) -> std::io::Result<()>;
}

/// Forwards downloads to a channel for the application to consume.
#[async_trait]
impl DownloadSink for mpsc::UnboundedSender<CompletedDownload> {
    async fn deliver(&self, download: CompletedDownload) -> std::io::Result<()> {
        self.send(download).map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                format!("download receiver dropped ({})", e.0.path),
            )
        })
    }
}
