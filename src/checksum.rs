//! Source archive download cache and sha256 computation
//!
//! Archives are cached under an explicit cache root, keyed by the last path
//! segment of their URL. A cached file is trusted as-is and never
//! re-downloaded. Downloads stream into `<name>.part` and are renamed into
//! place once the body is complete, so an interrupted transfer never leaves
//! a truncated file under the final name.

use crate::error::{ChecksumError, ResolverError};
use crate::resolver::HttpClient;
use futures::future::try_join_all;
use reqwest::Url;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, info};

/// Default cache directory, relative to the working directory
pub const DEFAULT_CACHE_DIR: &str = ".cache";

/// Read size while hashing (64 KiB)
const CHUNK_SIZE: usize = 1 << 16;

/// Suffix for in-flight downloads
const PARTIAL_SUFFIX: &str = ".part";

/// Downloads source archives into a cache and hashes them
#[derive(Clone)]
pub struct ChecksumFetcher {
    client: HttpClient,
    cache_dir: PathBuf,
}

impl ChecksumFetcher {
    /// Create a fetcher caching into `cache_dir`
    pub fn new(client: HttpClient, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            cache_dir: cache_dir.into(),
        }
    }

    /// The cache root
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Digest every `name -> url` pair concurrently
    ///
    /// Returns `{name}_sha256 -> hex digest`, ready to merge into the
    /// template variables. The first failure aborts the batch.
    pub async fn fetch_all(
        &self,
        named_urls: &BTreeMap<String, String>,
    ) -> Result<BTreeMap<String, String>, ChecksumError> {
        let digests = try_join_all(named_urls.values().map(|url| self.sha256(url))).await?;

        Ok(named_urls
            .keys()
            .zip(digests)
            .map(|(name, digest)| (format!("{}_sha256", name), digest))
            .collect())
    }

    /// Hex sha256 of the archive at `url`, downloading it if not cached
    pub async fn sha256(&self, url: &str) -> Result<String, ChecksumError> {
        let path = self.cache_path(url)?;
        if fs::try_exists(&path)
            .await
            .map_err(|e| ChecksumError::io(&path, e))?
        {
            debug!(url, path = %path.display(), "cache hit");
        } else {
            self.download(url, &path).await?;
        }
        hash_file(&path).await
    }

    /// Cache location for `url`
    pub fn cache_path(&self, url: &str) -> Result<PathBuf, ChecksumError> {
        Ok(self.cache_dir.join(file_name_from_url(url)?))
    }

    async fn download(&self, url: &str, path: &Path) -> Result<(), ChecksumError> {
        info!(url, "downloading");
        let mut response = self.client.get(url).await?;

        fs::create_dir_all(&self.cache_dir)
            .await
            .map_err(|e| ChecksumError::CacheDir {
                path: self.cache_dir.clone(),
                source: e,
            })?;

        let partial = partial_path(path);
        let mut file = File::create(&partial)
            .await
            .map_err(|e| ChecksumError::io(&partial, e))?;

        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ResolverError::network_error(url, "download stalled")
                } else {
                    ResolverError::network_error(url, e.to_string())
                }
            })?
        {
            file.write_all(&chunk)
                .await
                .map_err(|e| ChecksumError::io(&partial, e))?;
        }
        file.flush()
            .await
            .map_err(|e| ChecksumError::io(&partial, e))?;
        drop(file);

        fs::rename(&partial, path)
            .await
            .map_err(|e| ChecksumError::io(path, e))?;
        debug!(url, path = %path.display(), "download complete");
        Ok(())
    }
}

/// Last path segment of a URL, ignoring any query string
pub fn file_name_from_url(url: &str) -> Result<String, ChecksumError> {
    let invalid = || ChecksumError::InvalidUrl {
        url: url.to_string(),
    };
    let parsed = Url::parse(url).map_err(|_| invalid())?;
    parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
        .map(str::to_string)
        .ok_or_else(invalid)
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(PARTIAL_SUFFIX);
    PathBuf::from(name)
}

/// Hex sha256 of a file, read in fixed-size chunks
pub async fn hash_file(path: &Path) -> Result<String, ChecksumError> {
    let mut file = File::open(path)
        .await
        .map_err(|e| ChecksumError::io(path, e))?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];

    loop {
        let read = file
            .read(&mut buffer)
            .await
            .map_err(|e| ChecksumError::io(path, e))?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(hex::encode(hasher.finalize()))
}
