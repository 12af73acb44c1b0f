//! JSON file storage implementation.
//!
//! Stores each key as one JSON file in a data directory. The file holds an
//! envelope with the raw value and an optional absolute expiry; expired
//! files read as absent and are removed lazily. Writes go through a
//! temporary file and a rename so readers never observe a partial value.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use refresher_core::{Clock, SystemClock, Time};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, warn};
use super::memory_storage::expiry;
use super::{KvStore, Result};

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires_at: Option<Time>,
}

/// File-based JSON storage backend.
pub struct JsonKvStore {
    root: PathBuf,
    clock: Arc<dyn Clock>,
    write_seq: AtomicU64,
}

impl JsonKvStore {
    /// Open (and create if needed) a store rooted at `root`.
    pub async fn new(root: impl AsRef<Path>) -> Result<Self> {
        Self::with_clock(root, Arc::new(SystemClock)).await
    }

    /// Open a store that evaluates TTLs against `clock`.
    pub async fn with_clock(root: impl AsRef<Path>, clock: Arc<dyn Clock>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).await?;
        Ok(Self {
            root,
            clock,
            write_seq: AtomicU64::new(0),
        })
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", urlencoding::encode(key)))
    }

    fn temp_path(&self, key: &str) -> PathBuf {
        let seq = self.write_seq.fetch_add(1, Ordering::Relaxed);
        self.root.join(format!(
            ".{}.{}.{}.tmp",
            urlencoding::encode(key),
            std::process::id(),
            seq
        ))
    }
}

#[async_trait::async_trait]
impl KvStore for JsonKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.entry_path(key);
        let Some(envelope) = read_json::<Envelope>(&path).await? else {
            return Ok(None);
        };

        if let Some(expires_at) = envelope.expires_at {
            if expires_at <= self.clock.now() {
                debug!("Entry {} expired at {}", key, expires_at);
                if let Err(e) = fs::remove_file(&path).await {
                    if e.kind() != std::io::ErrorKind::NotFound {
                        warn!("Failed to remove expired entry {}: {}", key, e);
                    }
                }
                return Ok(None);
            }
        }

        Ok(Some(envelope.value))
    }

    async fn put(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
        let envelope = Envelope {
            value: value.to_string(),
            expires_at: ttl.map(|ttl| expiry(self.clock.now(), ttl)),
        };
        let json = serde_json::to_string_pretty(&envelope)?;

        let tmp = self.temp_path(key);
        fs::write(&tmp, json.as_bytes()).await?;
        if let Err(e) = fs::rename(&tmp, self.entry_path(key)).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match fs::read_to_string(path).await {
        Ok(json) => {
            let value = serde_json::from_str(&json)?;
            Ok(Some(value))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}
