//! File-based history store: one pretty-printed JSON document.
//!
//! The whole log lives in a single JSON array of `{sender, text, timestamp}`
//! objects, human-inspectable and hand-editable. The file is re-read on every
//! access, so it stays the single source of truth.
//!
//! Writes go to a sibling temporary file which is then renamed over the
//! target, so a reader sees either the previous document or the new one.

use async_trait::async_trait;
use chatrelay_core::error::StorageError;
use chatrelay_core::history::{HistoryStore, LoadOutcome, next_timestamp};
use chatrelay_core::message::{History, Message, Role, retain_newest};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, error};

static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// A history store backed by a JSON file.
///
/// `append`, `save` and `clear` hold `write_lock` for the whole
/// read-modify-write cycle.
pub struct FileHistoryStore {
    path: PathBuf,
    max_length: usize,
    write_lock: Mutex<()>,
}

impl FileHistoryStore {
    /// Create a store at the given path. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>, max_length: usize) -> Self {
        let path = path.into();
        debug!(path = %path.display(), max_length, "File history store ready");
        Self {
            path,
            max_length,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `history.json` → `.history.json.<pid>.<seq>.tmp` in the same directory.
    ///
    /// Unique per process and per write, so a second process writing the same
    /// log never renames our half-written file into place.
    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "history.json".to_string());
        let seq = TEMP_SEQ.fetch_add(1, Ordering::Relaxed);
        self.path
            .with_file_name(format!(".{file_name}.{}.{seq}.tmp", std::process::id()))
    }

    /// Serialize and atomically replace the document. Caller holds `write_lock`.
    async fn write_document(&self, history: &History) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| StorageError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let content = serde_json::to_vec_pretty(history)?;
        let temp = self.temp_path();

        tokio::fs::write(&temp, &content)
            .await
            .map_err(|source| StorageError::Write {
                path: temp.clone(),
                source,
            })?;

        if let Err(source) = tokio::fs::rename(&temp, &self.path).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(StorageError::Write {
                path: self.path.clone(),
                source,
            });
        }

        Ok(())
    }
}

#[async_trait]
impl HistoryStore for FileHistoryStore {
    fn name(&self) -> &str {
        "file"
    }

    fn max_length(&self) -> usize {
        self.max_length
    }

    async fn load_outcome(&self) -> LoadOutcome {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return LoadOutcome::Missing,
            Err(e) => {
                return LoadOutcome::Corrupt {
                    reason: format!("read failed: {e}"),
                };
            }
        };

        match serde_json::from_slice::<History>(&bytes) {
            Ok(history) => LoadOutcome::Loaded(history),
            Err(e) => LoadOutcome::Corrupt {
                reason: e.to_string(),
            },
        }
    }

    async fn save(&self, history: &History) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        self.write_document(history).await
    }

    async fn append(&self, sender: Role, text: &str) -> Result<Message, StorageError> {
        let _guard = self.write_lock.lock().await;

        let mut history = self.load().await;
        let message = Message::new(sender, text, next_timestamp(&history));
        history.push(message.clone());
        retain_newest(&mut history, self.max_length);

        self.write_document(&history).await?;
        debug!(sender = %sender, len = history.len(), "Appended message to history");
        Ok(message)
    }

    async fn clear(&self) -> bool {
        let _guard = self.write_lock.lock().await;
        match self.write_document(&History::new()).await {
            Ok(()) => {
                debug!(path = %self.path.display(), "History cleared");
                true
            }
            Err(e) => {
                error!(error = %e, "Failed to clear history");
                false
            }
        }
    }
}
