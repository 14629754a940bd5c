//! JSON file ledger of posts already commented on.

use async_trait::async_trait;
use exmb_error::{StorageError, StorageErrorKind};
use exmb_interface::CommentLedger;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

/// Ledger persisted as a JSON object mapping post full names to comment full names.
///
/// The whole file is rewritten on every record.
#[derive(Debug)]
pub struct JsonCommentLedger {
    file_path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl JsonCommentLedger {
    /// Open the ledger at `file_path`, starting empty when the file does not exist.
    #[instrument]
    pub async fn open(file_path: impl Into<PathBuf> + std::fmt::Debug) -> Result<Self, StorageError> {
        let file_path = file_path.into();
        let entries = if file_path.exists() {
            let json = tokio::fs::read_to_string(&file_path).await.map_err(|e| {
                StorageError::new(StorageErrorKind::FileRead(format!(
                    "{}: {}",
                    file_path.display(),
                    e
                )))
            })?;
            serde_json::from_str(&json).map_err(|e| {
                StorageError::new(StorageErrorKind::Malformed(format!(
                    "{}: {}",
                    file_path.display(),
                    e
                )))
            })?
        } else {
            BTreeMap::new()
        };
        info!(path = ?file_path, entries = entries.len(), "Comment ledger loaded");
        Ok(Self {
            file_path,
            entries: Mutex::new(entries),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Comment recorded for `post_full_name`.
    pub async fn comment_for(&self, post_full_name: &str) -> Option<String> {
        self.entries.lock().await.get(post_full_name).cloned()
    }

    /// Number of recorded posts.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Whether nothing is recorded.
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[async_trait]
impl CommentLedger for JsonCommentLedger {
    async fn contains(&self, post_full_name: &str) -> Result<bool, StorageError> {
        Ok(self.entries.lock().await.contains_key(post_full_name))
    }

    #[instrument(skip(self))]
    async fn record(&self, post_full_name: &str, comment_full_name: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().await;
        entries.insert(post_full_name.to_string(), comment_full_name.to_string());

        let json = serde_json::to_string_pretty(&*entries)
            .map_err(|e| StorageError::new(StorageErrorKind::Malformed(e.to_string())))?;
        if let Some(parent) = self.file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StorageError::new(StorageErrorKind::FileWrite(format!(
                    "{}: {}",
                    parent.display(),
                    e
                )))
            })?;
        }
        tokio::fs::write(&self.file_path, json).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "{}: {}",
                self.file_path.display(),
                e
            )))
        })?;
        debug!(path = ?self.file_path, "Comment ledger saved");
        Ok(())
    }
}
