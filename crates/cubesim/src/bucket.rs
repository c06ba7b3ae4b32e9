//! Simulated bucket registry
//!
//! Buckets are namespaced by provider and kept in memory behind a single
//! mutex. Every mutation rewrites the whole map to the backing JSON file
//! while the lock is held:
//!
//! ```json
//! { "aws": { "my-bucket": { "bucket": "my-bucket", "provider": "aws",
//!                           "region": "us-west-2", "status": "created" } } }
//! ```

use crate::error::{Result, SimError};
use crate::model::BucketRecord;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

type BucketMap = BTreeMap<String, BTreeMap<String, BucketRecord>>;

/// Outcome of a mutation whose in-memory effect always applies
///
/// `save_error` carries the failure of the follow-up snapshot write, if any;
/// the mutation itself is not rolled back.
#[derive(Debug)]
pub struct Persisted<T> {
    pub value: T,
    pub save_error: Option<SimError>,
}

impl<T> Persisted<T> {
    pub fn is_durable(&self) -> bool {
        self.save_error.is_none()
    }
}

pub struct BucketStore {
    buckets: Mutex<BucketMap>,
    persist_path: PathBuf,
}

impl BucketStore {
    /// Open the store backed by `persist_path`, reading any existing file.
    ///
    /// The store is always returned. The second element is the outcome of
    /// the initial [`load`](Self::load); on error the store starts empty.
    pub fn open(persist_path: impl AsRef<Path>) -> (Self, Result<usize>) {
        let store = Self {
            buckets: Mutex::new(BucketMap::new()),
            persist_path: persist_path.as_ref().to_path_buf(),
        };
        let loaded = store.load();
        (store, loaded)
    }

    pub fn persist_path(&self) -> &Path {
        &self.persist_path
    }

    fn lock(&self) -> MutexGuard<'_, BucketMap> {
        self.buckets.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the in-memory map with the file contents.
    ///
    /// A missing file is an empty store. On a read or parse error the store
    /// is left empty and the error returned. Returns the number of buckets.
    pub fn load(&self) -> Result<usize> {
        let mut buckets = self.lock();
        buckets.clear();

        if !self.persist_path.exists() {
            tracing::debug!(
                "Bucket file {} not found, starting empty",
                self.persist_path.display()
            );
            return Ok(0);
        }

        let content = fs::read_to_string(&self.persist_path)?;
        let loaded: BucketMap = serde_json::from_str(&content)?;
        *buckets = loaded;

        let count = buckets.values().map(BTreeMap::len).sum();
        tracing::debug!(
            "Loaded {} buckets from {}",
            count,
            self.persist_path.display()
        );
        Ok(count)
    }

    /// Write the current map to disk
    pub fn save(&self) -> Result<()> {
        let buckets = self.lock();
        self.write_snapshot(&buckets)
    }

    fn write_snapshot(&self, buckets: &BucketMap) -> Result<()> {
        if let Some(dir) = self.persist_path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir)?;
                tracing::debug!("Created bucket directory: {}", dir.display());
            }
        }

        let content = serde_json::to_string_pretty(buckets)?;
        fs::write(&self.persist_path, content)?;

        tracing::debug!("Persisted buckets to {}", self.persist_path.display());
        Ok(())
    }

    fn persist(&self, buckets: &BucketMap) -> Option<SimError> {
        self.write_snapshot(buckets).err()
    }

    /// Insert a new bucket; an existing `(provider, name)` is rejected
    pub fn create(
        &self,
        provider: &str,
        name: &str,
        region: &str,
    ) -> Result<Persisted<BucketRecord>> {
        let mut buckets = self.lock();
        let namespace = buckets.entry(provider.to_string()).or_default();

        if namespace.contains_key(name) {
            return Err(SimError::BucketAlreadyExists {
                provider: provider.to_string(),
                name: name.to_string(),
            });
        }

        let record = BucketRecord::created(provider, name, region);
        namespace.insert(name.to_string(), record.clone());

        let save_error = self.persist(&buckets);
        Ok(Persisted {
            value: record,
            save_error,
        })
    }

    /// Remove a bucket, returning the removed record
    pub fn delete(&self, provider: &str, name: &str) -> Result<Persisted<BucketRecord>> {
        let mut buckets = self.lock();
        let namespace = buckets
            .get_mut(provider)
            .ok_or_else(|| SimError::ProviderNotFound(provider.to_string()))?;

        let record = namespace
            .remove(name)
            .ok_or_else(|| SimError::BucketNotFound {
                provider: provider.to_string(),
                name: name.to_string(),
            })?;

        let save_error = self.persist(&buckets);
        Ok(Persisted {
            value: record,
            save_error,
        })
    }

    /// Snapshot of a provider's buckets ordered by name; empty for unknown providers
    pub fn list(&self, provider: &str) -> Vec<BucketRecord> {
        self.lock()
            .get(provider)
            .map(|ns| ns.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn get(&self, provider: &str, name: &str) -> Option<BucketRecord> {
        self.lock().get(provider).and_then(|ns| ns.get(name)).cloned()
    }
}

impl std::fmt::Debug for BucketStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BucketStore")
            .field("persist_path", &self.persist_path)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn open(path: impl AsRef<Path>) -> BucketStore {
        let (store, loaded) = BucketStore::open(path);
        loaded.unwrap();
        store
    }

    #[test]
    fn test_create_list_roundtrip() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("buckets.json");
        let store = open(&path);

        let created = store.create("aws", "logs", "eu-west-1").unwrap();
        assert!(created.is_durable());
        assert_eq!(created.value.status, "created");

        let (reopened, loaded) = BucketStore::open(&path);
        assert_eq!(loaded.unwrap(), 1);
        let buckets = reopened.list("aws");
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].bucket, "logs");
        assert_eq!(buckets[0].region, "eu-west-1");
    }

    #[test]
    fn test_duplicate_rejected() {
        let temp_dir = tempdir().unwrap();
        let store = open(temp_dir.path().join("buckets.json"));

        store.create("aws", "data", "us-east-1").unwrap();
        let err = store.create("aws", "data", "eu-west-1").unwrap_err();
        assert!(matches!(err, SimError::BucketAlreadyExists { .. }));

        let buckets = store.list("aws");
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].region, "us-east-1");

        // Same name under another provider is a different bucket
        assert!(store.create("gcp", "data", "us-central1").is_ok());
    }

    #[test]
    fn test_delete_missing() {
        let temp_dir = tempdir().unwrap();
        let store = open(temp_dir.path().join("buckets.json"));

        assert!(matches!(
            store.delete("aws", "nope"),
            Err(SimError::ProviderNotFound(_))
        ));

        store.create("aws", "keep", "us-west-2").unwrap();
        assert!(matches!(
            store.delete("aws", "nope"),
            Err(SimError::BucketNotFound { .. })
        ));
        assert_eq!(store.list("aws").len(), 1);
    }

    #[test]
    fn test_delete_removes_exactly_one() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("buckets.json");
        let store = open(&path);

        store.create("azure", "a", "eastus").unwrap();
        store.create("azure", "b", "eastus").unwrap();
        let removed = store.delete("azure", "a").unwrap();
        assert_eq!(removed.value.bucket, "a");

        let names: Vec<_> = store.list("azure").into_iter().map(|b| b.bucket).collect();
        assert_eq!(names, vec!["b"]);

        let reopened = open(&path);
        assert!(reopened.get("azure", "a").is_none());
        assert!(reopened.get("azure", "b").is_some());
    }

    #[test]
    fn test_load_missing_and_corrupt() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("buckets.json");

        let (store, loaded) = BucketStore::open(&path);
        assert_eq!(loaded.unwrap(), 0);
        assert!(store.list("aws").is_empty());

        fs::write(&path, "{ not json").unwrap();
        let (store, loaded) = BucketStore::open(&path);
        assert!(matches!(loaded, Err(SimError::Json(_))));
        assert!(store.list("aws").is_empty());
    }

    #[test]
    fn test_creates_parent_directory() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("dir").join("buckets.json");
        let store = open(&path);

        store.create("hetzner", "files", "nbg1").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_save_failure_keeps_mutation() {
        let temp_dir = tempdir().unwrap();
        // The backing path is a directory, so every write fails
        let (store, _) = BucketStore::open(temp_dir.path());

        let created = store.create("aws", "volatile", "us-west-2").unwrap();
        assert!(!created.is_durable());
        assert!(matches!(created.save_error, Some(SimError::Io(_))));
        assert_eq!(store.list("aws").len(), 1);
    }

    #[test]
    fn test_concurrent_create_single_winner() {
        let temp_dir = tempdir().unwrap();
        let store = Arc::new(open(temp_dir.path().join("buckets.json")));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || store.create("aws", "race", "us-west-2").is_ok())
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();
        assert_eq!(winners, 1);
        assert_eq!(store.list("aws").len(), 1);
    }

    #[test]
    fn test_second_store_keeps_existing_buckets() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("buckets.json");

        open(&path).create("aws", "existing", "us-west-2").unwrap();

        let second = open(&path);
        assert!(second.get("aws", "existing").is_some());
        second.create("aws", "new", "us-west-2").unwrap();

        let names: Vec<_> = open(&path).list("aws").into_iter().map(|b| b.bucket).collect();
        assert_eq!(names, vec!["existing", "new"]);
    }

    #[test]
    fn test_save_writes_snapshot() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("out").join("buckets.json");
        let store = open(&path);
        assert!(!path.exists());

        store.save().unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.trim(), "{}");

        store.create("gcp", "assets", "us-central1").unwrap();
        fs::remove_file(&path).unwrap();
        store.save().unwrap();

        let reopened = open(&path);
        assert_eq!(reopened.list("gcp").len(), 1);
    }
}
