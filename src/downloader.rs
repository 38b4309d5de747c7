use crate::error::DownloaderError;
use crate::store::ObjectStore;
use crate::types::{DownloadSummary, PendingTransfer};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};
use std::time::Instant;

pub struct Downloader<'a, S: ObjectStore + ?Sized> {
    store: &'a S,
    progress: ProgressBar,
}

impl<'a, S: ObjectStore + ?Sized> Downloader<'a, S> {
    pub fn new(store: &'a S, progress: ProgressBar) -> Self {
        Self { store, progress }
    }

    /// Download every pending transfer in order, stopping at the first failure.
    ///
    /// Files finished before a failure stay on disk; a rerun skips them.
    pub async fn download_all(
        &self,
        pending: Vec<PendingTransfer>,
    ) -> Result<DownloadSummary, DownloaderError> {
        let start_time = Instant::now();
        let files = pending.len();
        let mut bytes: u64 = 0;

        self.progress.set_length(files as u64);

        for transfer in pending {
            match self.download_file(&transfer).await {
                Ok(size) => {
                    bytes += size;
                    self.progress.inc(1);
                }
                Err(e) => {
                    error!("Download failed for {}: {}", transfer.key, e);
                    self.progress.abandon_with_message("Download failed");
                    return Err(e);
                }
            }
        }

        self.progress.finish_with_message("Done");

        Ok(DownloadSummary {
            files,
            bytes,
            duration: start_time.elapsed(),
        })
    }

    async fn download_file(&self, transfer: &PendingTransfer) -> Result<u64, DownloaderError> {
        if let Some(parent) = transfer.local_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        self.progress.set_message(
            transfer
                .local_path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("unknown")
                .to_string(),
        );

        info!(
            "Downloading {} -> {}",
            transfer.key,
            transfer.local_path.display()
        );
        self.store.download(&transfer.key, &transfer.local_path).await
    }
}

/// File-count progress bar shown to the operator while downloading.
pub fn progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] {msg} [{bar:40.cyan/blue}] {pos}/{len} files ({per_sec}, {eta})")
        .map(|s| s.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb
}
