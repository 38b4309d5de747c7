use crate::error::DownloaderError;
use crate::types::ListPage;
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use log::{debug, warn};
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

pub const ENDPOINT: &str = "https://data.source.coop";
pub const BUCKET: &str = "clay";
pub const DATASET_ROOT: &str = "clay-v1-5-naip-2";
// The endpoint ignores the region but the SDK refuses to sign without one.
const REGION: &str = "us-east-1";

/// Operations the lister and downloader need from a remote bucket.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch one page of keys under `prefix`, continuing from `continuation_token`.
    async fn list_page(
        &self,
        prefix: &str,
        continuation_token: Option<&str>,
    ) -> Result<ListPage, DownloaderError>;

    /// Write the object's full contents to `local_path`, returning the byte count.
    async fn download(&self, key: &str, local_path: &Path) -> Result<u64, DownloaderError>;
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub endpoint: String,
    pub bucket: String,
    pub region: String,
    pub dataset_root: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            endpoint: ENDPOINT.to_string(),
            bucket: BUCKET.to_string(),
            region: REGION.to_string(),
            dataset_root: DATASET_ROOT.to_string(),
        }
    }
}

pub struct S3Store {
    client: Client,
    bucket: String,
}

impl S3Store {
    /// Anonymous, path-style client for a public bucket.
    pub async fn connect(config: &StoreConfig) -> Self {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .no_credentials()
            .region(Region::new(config.region.clone()))
            .endpoint_url(&config.endpoint)
            .load()
            .await;

        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(true)
            .build();

        Self {
            client: Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn list_page(
        &self,
        prefix: &str,
        continuation_token: Option<&str>,
    ) -> Result<ListPage, DownloaderError> {
        let mut request = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(prefix);

        if let Some(token) = continuation_token {
            request = request.continuation_token(token);
        }

        let response = request.send().await.map_err(|e| {
            DownloaderError::ListError(format!(
                "s3://{}/{}: {}",
                self.bucket,
                prefix,
                DisplayErrorContext(&e)
            ))
        })?;

        let keys: Vec<String> = response
            .contents()
            .iter()
            .filter_map(|obj| obj.key().map(|k| k.to_string()))
            .collect();

        let next_token = if response.is_truncated().unwrap_or(false) {
            response.next_continuation_token().map(|s| s.to_string())
        } else {
            None
        };

        debug!(
            "Listed {} keys under {} (more pages: {})",
            keys.len(),
            prefix,
            next_token.is_some()
        );

        Ok(ListPage { keys, next_token })
    }

    async fn download(&self, key: &str, local_path: &Path) -> Result<u64, DownloaderError> {
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                DownloaderError::DownloadError(format!(
                    "s3://{}/{}: {}",
                    self.bucket,
                    key,
                    DisplayErrorContext(&e)
                ))
            })?;

        save_body(key, response.body, local_path).await
    }
}

/// Stream `body` into the `.part` sibling of `local_path` and rename it into
/// place. On failure the partial file is removed and `local_path` is untouched.
async fn save_body(
    key: &str,
    body: ByteStream,
    local_path: &Path,
) -> Result<u64, DownloaderError> {
    let part_path = partial_path(local_path);
    let result: Result<u64, DownloaderError> = async {
        let bytes = write_body(key, body, &part_path).await?;
        tokio::fs::rename(&part_path, local_path).await?;
        Ok(bytes)
    }
    .await;

    if result.is_err() {
        match tokio::fs::remove_file(&part_path).await {
            Err(e) if e.kind() != ErrorKind::NotFound => {
                warn!("Could not remove partial file {}: {}", part_path.display(), e);
            }
            _ => {}
        }
    }
    result
}

async fn write_body(
    key: &str,
    mut body: ByteStream,
    path: &Path,
) -> Result<u64, DownloaderError> {
    let mut file = File::create(path).await?;
    let mut written: u64 = 0;

    while let Some(chunk) = body
        .try_next()
        .await
        .map_err(|e| DownloaderError::DownloadError(format!("{}: {}", key, e)))?
    {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }

    file.flush().await?;
    Ok(written)
}

/// Sibling path the body is streamed into before being renamed into place,
/// so a killed run never leaves a truncated file that looks complete.
pub(crate) fn partial_path(local_path: &Path) -> PathBuf {
    let mut name = OsString::from(local_path.as_os_str());
    name.push(".part");
    PathBuf::from(name)
}
