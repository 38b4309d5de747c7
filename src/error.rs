use thiserror::Error;

#[derive(Error, Debug)]
pub enum DownloaderError {
    #[error("Listing failed: {0}")]
    ListError(String),

    #[error("Download failed: {0}")]
    DownloadError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
