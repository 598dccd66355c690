use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::sync::Mutex;
use tracing::debug;

use super::{ClassificationSource, DisposableRecord, InsertOutcome, StoreError};

/// Persistent lookup/insert capability for disposable-domain records.
///
/// Implementations must treat a duplicate insert as [`InsertOutcome::AlreadyExists`],
/// never as an error.
#[async_trait]
pub trait DomainStore: Send + Sync {
    async fn find_domain(&self, domain: &str) -> Result<Option<DisposableRecord>, StoreError>;

    async fn insert_domain(
        &self,
        domain: &str,
        source: ClassificationSource,
    ) -> Result<InsertOutcome, StoreError>;
}

/// Process-local store. Useful for tests and for deployments without persistence.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, DisposableRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_domains<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let records = domains
            .into_iter()
            .map(|d| {
                let domain = d.into();
                let record = DisposableRecord::new(domain.clone(), ClassificationSource::Store);
                (domain, record)
            })
            .collect();
        Self {
            records: RwLock::new(records),
        }
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl DomainStore for MemoryStore {
    async fn find_domain(&self, domain: &str) -> Result<Option<DisposableRecord>, StoreError> {
        Ok(self.records.read().get(domain).cloned())
    }

    async fn insert_domain(
        &self,
        domain: &str,
        source: ClassificationSource,
    ) -> Result<InsertOutcome, StoreError> {
        let mut records = self.records.write();
        if records.contains_key(domain) {
            return Ok(InsertOutcome::AlreadyExists);
        }
        records.insert(domain.to_string(), DisposableRecord::new(domain, source));
        Ok(InsertOutcome::Inserted)
    }
}

/// Records kept in a JSON document on disk. The whole document is rewritten
/// through a temporary file and a rename on every insert.
pub struct JsonFileStore {
    path: PathBuf,
    records: Mutex<HashMap<String, DisposableRecord>>,
}

impl JsonFileStore {
    /// Loads `path`; a missing file starts an empty store.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let records = match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let list: Vec<DisposableRecord> = serde_json::from_slice(&bytes)
                    .map_err(|source| StoreError::Corrupt { source })?;
                list.into_iter().map(|r| (r.domain.clone(), r)).collect()
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.display().to_string(),
                    source,
                });
            }
        };
        debug!(path = %path.display(), count = records.len(), "disposable store loaded");
        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    async fn persist(&self, records: &HashMap<String, DisposableRecord>) -> Result<(), StoreError> {
        let mut list: Vec<&DisposableRecord> = records.values().collect();
        list.sort_by(|a, b| a.domain.cmp(&b.domain));
        let bytes =
            serde_json::to_vec_pretty(&list).map_err(|source| StoreError::Corrupt { source })?;

        let io_err = |source| StoreError::Io {
            path: self.path.display().to_string(),
            source,
        };
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        tokio::fs::write(&tmp, &bytes).await.map_err(io_err)?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(io_err)?;
        Ok(())
    }
}

#[async_trait]
impl DomainStore for JsonFileStore {
    async fn find_domain(&self, domain: &str) -> Result<Option<DisposableRecord>, StoreError> {
        Ok(self.records.lock().await.get(domain).cloned())
    }

    async fn insert_domain(
        &self,
        domain: &str,
        source: ClassificationSource,
    ) -> Result<InsertOutcome, StoreError> {
        let mut records = self.records.lock().await;
        if records.contains_key(domain) {
            return Ok(InsertOutcome::AlreadyExists);
        }
        // Memory changes only once the document is on disk.
        let mut updated = records.clone();
        updated.insert(domain.to_string(), DisposableRecord::new(domain, source));
        self.persist(&updated).await?;
        *records = updated;
        Ok(InsertOutcome::Inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("mailverify-{name}-{}-{nanos}.json", std::process::id()))
    }

    #[tokio::test]
    async fn memory_store_deduplicates() {
        let store = MemoryStore::new();
        let first = store
            .insert_domain("temp.io", ClassificationSource::Remote)
            .await
            .unwrap();
        let second = store
            .insert_domain("temp.io", ClassificationSource::Remote)
            .await
            .unwrap();
        assert_eq!(first, InsertOutcome::Inserted);
        assert_eq!(second, InsertOutcome::AlreadyExists);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn json_store_survives_reopen() {
        let path = temp_path("reopen");
        {
            let store = JsonFileStore::open(&path).await.unwrap();
            assert!(store.find_domain("temp.io").await.unwrap().is_none());
            store
                .insert_domain("temp.io", ClassificationSource::Remote)
                .await
                .unwrap();
        }

        let reopened = JsonFileStore::open(&path).await.unwrap();
        let record = reopened
            .find_domain("temp.io")
            .await
            .unwrap()
            .expect("record persisted");
        assert_eq!(record.source, ClassificationSource::Remote);
        assert_eq!(
            reopened
                .insert_domain("temp.io", ClassificationSource::StaticList)
                .await
                .unwrap(),
            InsertOutcome::AlreadyExists
        );
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn json_store_failed_write_keeps_memory_clean() {
        let path = temp_path("missing-dir").join("domains.json");
        let store = JsonFileStore::open(&path).await.unwrap();
        let err = store
            .insert_domain("temp.io", ClassificationSource::Remote)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
        assert!(store.find_domain("temp.io").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn json_store_dropped_insert_leaves_no_record() {
        let path = temp_path("dropped");
        let store = JsonFileStore::open(&path).await.unwrap();
        let insert = store.insert_domain("temp.io", ClassificationSource::Remote);
        let outcome = tokio::time::timeout(std::time::Duration::ZERO, insert).await;
        if outcome.is_err() {
            assert!(store.find_domain("temp.io").await.unwrap().is_none());
        }
        let mut tmp = path.clone().into_os_string();
        tmp.push(".tmp");
        let _ = std::fs::remove_file(&tmp);
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn json_store_rejects_corrupt_document() {
        let path = temp_path("corrupt");
        std::fs::write(&path, b"{not json").unwrap();
        let err = JsonFileStore::open(&path).await.err().expect("corrupt file");
        assert!(matches!(err, StoreError::Corrupt { .. }));
        let _ = std::fs::remove_file(&path);
    }
}
