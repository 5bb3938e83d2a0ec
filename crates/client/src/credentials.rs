//! Credential store.
//!
//! Keeps the store URL, consumer key and consumer secret across sessions.
//! The durable copy is one JSON record under a fixed name; the in-memory
//! copy is filled on first read and replaced on reconfiguration. There is no
//! deletion path.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tokio::sync::RwLock;
use tracing::instrument;
use woo_orders_core::Credentials;

use crate::error::WooError;

/// Fixed name of the durable credential record.
pub const RECORD_NAME: &str = "woocommerce_config";

/// Durable storage for the serialized credential record.
pub trait CredentialBackend: Send + Sync {
    /// Read the raw record. `Ok(None)` when nothing has been stored.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the record exists but cannot be read.
    fn load(&self) -> io::Result<Option<String>>;

    /// Replace the raw record wholesale.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the record cannot be written.
    fn save(&self, record: &str) -> io::Result<()>;
}

/// Record stored as `<dir>/woocommerce_config.json`.
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    /// Backend storing its record inside `dir`.
    #[must_use]
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(format!("{RECORD_NAME}.json")),
        }
    }

    /// Full path of the record.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialBackend for FileBackend {
    fn load(&self) -> io::Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn save(&self, record: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        // Readers never see a partially written record.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, record)?;
        std::fs::rename(&tmp, &self.path)
    }
}

/// Process-local record, for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    record: Mutex<Option<String>>,
}

impl MemoryBackend {
    /// Empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend pre-filled with a raw record.
    #[must_use]
    pub fn with_record(record: impl Into<String>) -> Self {
        Self {
            record: Mutex::new(Some(record.into())),
        }
    }
}

impl CredentialBackend for MemoryBackend {
    fn load(&self) -> io::Result<Option<String>> {
        self.record
            .lock()
            .map(|record| record.clone())
            .map_err(|_| io::Error::other("credential record lock poisoned"))
    }

    fn save(&self, record: &str) -> io::Result<()> {
        let mut guard = self
            .record
            .lock()
            .map_err(|_| io::Error::other("credential record lock poisoned"))?;
        *guard = Some(record.to_string());
        Ok(())
    }
}

/// Cached access to the stored credentials.
pub struct CredentialStore {
    cache: RwLock<Option<Credentials>>,
    backend: Box<dyn CredentialBackend>,
}

impl CredentialStore {
    /// Store over an arbitrary backend.
    #[must_use]
    pub fn new(backend: impl CredentialBackend + 'static) -> Self {
        Self {
            cache: RwLock::new(None),
            backend: Box::new(backend),
        }
    }

    /// Store backed by `<dir>/woocommerce_config.json`.
    #[must_use]
    pub fn file(dir: impl AsRef<Path>) -> Self {
        Self::new(FileBackend::new(dir))
    }

    /// Store backed by process memory only.
    #[must_use]
    pub fn memory() -> Self {
        Self::new(MemoryBackend::new())
    }

    /// Overwrite the cached and durable credentials.
    ///
    /// No validation of the URL or key format is done. The in-memory copy
    /// is replaced even if the durable write fails.
    ///
    /// # Errors
    ///
    /// Returns `WooError::Storage` if the durable write fails.
    #[instrument(skip(self, credentials), fields(store_url = %credentials.store_url))]
    pub async fn set_credentials(&self, credentials: Credentials) -> Result<(), WooError> {
        let record = serde_json::to_string(&credentials).map_err(io::Error::other)?;

        *self.cache.write().await = Some(credentials);

        self.backend.save(&record)?;
        tracing::info!("Stored WooCommerce credentials");
        Ok(())
    }

    /// Cached credentials, or the durable record on first access.
    ///
    /// A record that cannot be read or parsed is logged and treated as
    /// absent.
    #[instrument(skip(self))]
    pub async fn get_credentials(&self) -> Option<Credentials> {
        if let Some(credentials) = self.cache.read().await.as_ref() {
            return Some(credentials.clone());
        }

        let record = match self.backend.load() {
            Ok(Some(record)) => record,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read stored credentials");
                return None;
            }
        };

        match serde_json::from_str::<Credentials>(&record) {
            Ok(credentials) => Some(self.fill_cache(credentials).await),
            Err(e) => {
                tracing::warn!(error = %e, "Stored credentials are corrupt, treating as not configured");
                None
            }
        }
    }

    /// Cache `loaded` unless a concurrent set got there first, and return
    /// whatever the cache holds.
    async fn fill_cache(&self, loaded: Credentials) -> Credentials {
        self.cache.write().await.get_or_insert(loaded).clone()
    }

    /// Credentials usable for a network call.
    ///
    /// # Errors
    ///
    /// Returns `WooError::NotConfigured` when nothing is stored or any of
    /// the three fields is empty.
    pub async fn require(&self) -> Result<Credentials, WooError> {
        self.get_credentials()
            .await
            .filter(Credentials::is_complete)
            .ok_or(WooError::NotConfigured)
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample() -> Credentials {
        Credentials::new("https://shop.example.com", "ck_abc123", "cs_def456")
    }

    #[tokio::test]
    async fn test_get_before_set_is_absent() {
        let store = CredentialStore::memory();
        assert!(store.get_credentials().await.is_none());
        assert!(matches!(
            store.require().await,
            Err(WooError::NotConfigured)
        ));
    }

    #[tokio::test]
    async fn test_set_then_get_roundtrip() {
        let store = CredentialStore::memory();
        store.set_credentials(sample()).await.unwrap();
        assert_eq!(store.get_credentials().await, Some(sample()));
    }

    #[tokio::test]
    async fn test_roundtrip_through_fresh_store_on_disk() {
        let dir = tempfile::tempdir().unwrap();

        let first = CredentialStore::file(dir.path());
        first.set_credentials(sample()).await.unwrap();

        let second = CredentialStore::file(dir.path());
        assert_eq!(second.get_credentials().await, Some(sample()));
    }

    #[tokio::test]
    async fn test_set_overwrites_previous() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::file(dir.path());
        store.set_credentials(sample()).await.unwrap();

        let replacement = Credentials::new("https://other.example.com/", "ck_2", "cs_2");
        store.set_credentials(replacement.clone()).await.unwrap();

        assert_eq!(store.get_credentials().await, Some(replacement.clone()));
        let fresh = CredentialStore::file(dir.path());
        assert_eq!(fresh.get_credentials().await, Some(replacement));
    }

    #[tokio::test]
    async fn test_late_disk_read_does_not_clobber_newer_set() {
        let stale = Credentials::new("https://old.example.com", "ck_old", "cs_old");
        let store = CredentialStore::new(MemoryBackend::with_record(
            serde_json::to_string(&stale).unwrap(),
        ));

        // A set lands between the disk read and the cache fill.
        store.set_credentials(sample()).await.unwrap();
        assert_eq!(store.fill_cache(stale).await, sample());
        assert_eq!(store.get_credentials().await, Some(sample()));
    }

    #[tokio::test]
    async fn test_corrupt_record_is_absent() {
        let store = CredentialStore::new(MemoryBackend::with_record("{not json"));
        assert!(store.get_credentials().await.is_none());
    }

    #[tokio::test]
    async fn test_incomplete_credentials_not_usable() {
        let store = CredentialStore::memory();
        store
            .set_credentials(Credentials::new("https://shop.example.com", "", "cs"))
            .await
            .unwrap();
        assert!(store.get_credentials().await.is_some());
        assert!(matches!(
            store.require().await,
            Err(WooError::NotConfigured)
        ));
    }

    #[test]
    fn test_file_backend_path() {
        let backend = FileBackend::new("/tmp/woo");
        assert_eq!(
            backend.path(),
            Path::new("/tmp/woo/woocommerce_config.json")
        );
    }

    #[test]
    fn test_file_backend_missing_record() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path().join("nested"));
        assert!(backend.load().unwrap().is_none());
    }
}
