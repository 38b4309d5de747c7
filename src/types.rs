use std::path::PathBuf;
use std::time::Duration;

/// Which part of the dataset to mirror.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    pub state: String,
    /// `None` selects every year published for the state.
    pub year: Option<String>,
}

impl Selector {
    pub fn new(state: impl Into<String>, year: Option<String>) -> Self {
        Self {
            state: state.into(),
            year,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTransfer {
    pub key: String,
    pub local_path: PathBuf,
}

/// One page of a prefix listing.
#[derive(Debug, Clone, Default)]
pub struct ListPage {
    pub keys: Vec<String>,
    /// Token for the next page, `None` once the listing is exhausted.
    pub next_token: Option<String>,
}

#[derive(Debug)]
pub struct DownloadSummary {
    pub files: usize,
    pub bytes: u64,
    pub duration: Duration,
}
