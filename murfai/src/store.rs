use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

use crate::Result;
use murfai_core::{Configuration, MurfError};

/// A committed configuration together with its host-facing metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub entry_id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub data: Configuration,
}

impl ConfigEntry {
    pub fn new(title: String, data: Configuration) -> Self {
        Self {
            entry_id: Uuid::new_v4(),
            title,
            created_at: Utc::now(),
            data,
        }
    }

    pub fn unique_id(&self) -> &str {
        &self.data.unique_id
    }
}

/// Durable home of committed configurations, keyed by `unique_id`.
#[async_trait]
pub trait ConfigurationStore: Send + Sync {
    /// Inserts `entry` unless its `unique_id` is taken, in which case
    /// `MurfError::DuplicateConfiguration` is returned and nothing is written.
    async fn insert(&self, entry: ConfigEntry) -> Result<ConfigEntry>;

    async fn get(&self, unique_id: &str) -> Result<Option<ConfigEntry>>;

    async fn list(&self) -> Result<Vec<ConfigEntry>>;

    async fn contains(&self, unique_id: &str) -> Result<bool> {
        Ok(self.get(unique_id).await?.is_some())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryConfigurationStore {
    entries: Arc<RwLock<HashMap<String, ConfigEntry>>>,
}

impl MemoryConfigurationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConfigurationStore for MemoryConfigurationStore {
    async fn insert(&self, entry: ConfigEntry) -> Result<ConfigEntry> {
        let mut entries = self.entries.write().await;
        if entries.contains_key(entry.unique_id()) {
            return Err(MurfError::DuplicateConfiguration(entry.unique_id().to_string()));
        }
        entries.insert(entry.unique_id().to_string(), entry.clone());
        Ok(entry)
    }

    async fn get(&self, unique_id: &str) -> Result<Option<ConfigEntry>> {
        Ok(self.entries.read().await.get(unique_id).cloned())
    }

    async fn list(&self) -> Result<Vec<ConfigEntry>> {
        let mut entries: Vec<ConfigEntry> = self.entries.read().await.values().cloned().collect();
        entries.sort_by_key(|entry| entry.created_at);
        Ok(entries)
    }
}

/// Stores entries as a JSON array in a single file, rewritten atomically.
#[derive(Debug)]
pub struct JsonFileConfigurationStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileConfigurationStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Vec<ConfigEntry>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(Vec::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, entries: &[ConfigEntry]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp_path = self.path.with_extension("json.tmp");
        let contents = serde_json::to_vec_pretty(entries)?;
        tokio::fs::write(&tmp_path, contents).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;
        debug!("Wrote {} configuration entries to {}", entries.len(), self.path.display());
        Ok(())
    }
}

#[async_trait]
impl ConfigurationStore for JsonFileConfigurationStore {
    async fn insert(&self, entry: ConfigEntry) -> Result<ConfigEntry> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.load().await?;
        if entries.iter().any(|existing| existing.unique_id() == entry.unique_id()) {
            return Err(MurfError::DuplicateConfiguration(entry.unique_id().to_string()));
        }

        entries.push(entry.clone());
        self.save(&entries).await?;
        info!("Persisted configuration {}", entry.unique_id());
        Ok(entry)
    }

    async fn get(&self, unique_id: &str) -> Result<Option<ConfigEntry>> {
        Ok(self
            .load()
            .await?
            .into_iter()
            .find(|entry| entry.unique_id() == unique_id))
    }

    async fn list(&self) -> Result<Vec<ConfigEntry>> {
        self.load().await
    }
}
