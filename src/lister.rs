use crate::error::DownloaderError;
use crate::store::ObjectStore;
use crate::types::{PendingTransfer, Selector};
use log::{debug, info, warn};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// `<root>/<state>/<year>/` or `<root>/<state>/` when no year is selected.
pub fn remote_prefix(root: &str, selector: &Selector) -> String {
    match &selector.year {
        Some(year) => format!("{}/{}/{}/", root, selector.state, year),
        None => format!("{}/{}/", root, selector.state),
    }
}

pub fn base_dir(dest: &Path, state: &str, year: &str) -> PathBuf {
    dest.join(state).join(year)
}

/// Map a remote key onto the local mirror.
///
/// With a year selected the key minus the prefix is the relative path. Without
/// one, the first segment after the prefix is taken as the year and the rest
/// as the relative path. Keys that would resolve to a directory or leave the
/// mirror (empty, `.` or `..` segments) map to `None`.
pub fn local_path_for(
    key: &str,
    prefix: &str,
    dest: &Path,
    selector: &Selector,
) -> Option<PathBuf> {
    let remainder = key.strip_prefix(prefix)?;

    let (year, relative) = match &selector.year {
        Some(year) => (year.as_str(), remainder),
        None => {
            let (year, relative) = remainder.split_once('/')?;
            if !is_plain_segment(year) {
                return None;
            }
            (year, relative)
        }
    };

    if relative.is_empty() || !relative.split('/').all(is_plain_segment) {
        return None;
    }

    let mut path = base_dir(dest, &selector.state, year);
    path.extend(relative.split('/'));
    Some(path)
}

/// Presence alone marks a file as downloaded. A path whose parent is a regular
/// file has no entry either; the transfer reports that conflict instead.
async fn local_entry_exists(path: &Path) -> std::io::Result<bool> {
    match tokio::fs::try_exists(path).await {
        Err(e) if e.kind() == ErrorKind::NotADirectory => Ok(false),
        other => other,
    }
}

fn is_plain_segment(segment: &str) -> bool {
    !segment.is_empty() && segment != "." && segment != ".."
}

/// List every key under the selector's prefix and keep the ones with no local copy.
///
/// The whole listing is materialised before anything is downloaded.
pub async fn list_pending<S: ObjectStore + ?Sized>(
    store: &S,
    root: &str,
    dest: &Path,
    selector: &Selector,
) -> Result<Vec<PendingTransfer>, DownloaderError> {
    let prefix = remote_prefix(root, selector);
    info!("Listing objects under {}", prefix);

    let mut pending = Vec::new();
    let mut listed = 0usize;
    let mut pages = 0usize;
    let mut token: Option<String> = None;

    loop {
        let page = store.list_page(&prefix, token.as_deref()).await?;
        pages += 1;

        for key in page.keys {
            listed += 1;
            let Some(local_path) = local_path_for(&key, &prefix, dest, selector) else {
                warn!("Skipping {}: no file path under {}", key, prefix);
                continue;
            };

            if local_entry_exists(&local_path).await? {
                debug!("Already present: {}", local_path.display());
                continue;
            }

            debug!("Pending: {} -> {}", key, local_path.display());
            pending.push(PendingTransfer { key, local_path });
        }

        match page.next_token {
            Some(next) => token = Some(next),
            None => break,
        }
    }

    info!(
        "Listed {} objects in {} pages, {} to download",
        listed,
        pages,
        pending.len()
    );
    Ok(pending)
}
