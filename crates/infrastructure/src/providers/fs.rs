use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use beacon_dns_application::{Provider, SnapshotSink};
use beacon_dns_domain::{DomainError, ProviderConfig, ProviderSnapshot, RecordTable};
use serde::Deserialize;
use tracing::debug;
use walkdir::WalkDir;

use super::registry::ProviderContext;

#[derive(Debug, Deserialize)]
struct FsConfig {
    path: String,
}

/// One-shot filesystem provider: reads YAML record lists from a file or a
/// directory tree, emits a single snapshot, and returns. It does not watch
/// for changes.
pub struct FsProvider {
    id: String,
    path: PathBuf,
}

impl FsProvider {
    pub const KIND: &'static str = "fs";

    pub fn new(id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
        }
    }

    pub fn factory(
        _ctx: &ProviderContext,
        id: &str,
        config: &ProviderConfig,
    ) -> Result<Arc<dyn Provider>, DomainError> {
        let fs_config: FsConfig = toml::Value::Table(config.config.clone())
            .try_into()
            .map_err(|e| DomainError::ProviderInit {
                id: id.to_string(),
                reason: e.to_string(),
            })?;
        if fs_config.path.is_empty() {
            return Err(DomainError::ProviderInit {
                id: id.to_string(),
                reason: "path must not be empty".to_string(),
            });
        }
        Ok(Arc::new(Self::new(id, fs_config.path)))
    }

    async fn read_file(path: &Path) -> Result<RecordTable, DomainError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| DomainError::Io(format!("{}: {e}", path.display())))?;
        RecordTable::from_yaml_slice(&bytes)
            .map_err(|e| DomainError::Parse(format!("{}: {e}", path.display())))
    }

    async fn collect(&self) -> Result<RecordTable, DomainError> {
        let metadata = tokio::fs::metadata(&self.path)
            .await
            .map_err(|e| DomainError::Io(format!("{}: {e}", self.path.display())))?;

        if !metadata.is_dir() {
            return Self::read_file(&self.path).await;
        }

        // Sorted walk keeps the snapshot deterministic across runs. The
        // first bad entry or file aborts the whole walk.
        let mut files = Vec::new();
        for entry in WalkDir::new(&self.path).sort_by_file_name() {
            let entry = entry.map_err(|e| DomainError::Io(e.to_string()))?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }

        let mut records = RecordTable::new();
        for file in files {
            records.append_merge(Self::read_file(&file).await?);
        }
        Ok(records)
    }
}

#[async_trait]
impl Provider for FsProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> &'static str {
        Self::KIND
    }

    async fn run(&self, outbox: SnapshotSink) -> Result<(), DomainError> {
        let records = self.collect().await?;
        debug!(provider = %self.id, keys = records.len(), path = %self.path.display(), "records loaded");
        outbox
            .send(ProviderSnapshot::new(self.id.clone(), records))
            .await
            .map_err(|_| DomainError::ChannelClosed)
    }
}
