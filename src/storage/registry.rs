use fs2::FileExt;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};
use tempfile::NamedTempFile;

use super::models::AddressRecord;
use super::RecordStore;
use crate::config::LedgerConfig;
use crate::error::StorageError;

/// Bucket holding every address record
pub const ADDRESS_BUCKET: &str = "addresses";

const LOCK_POLL_INTERVAL: Duration = Duration::from_millis(10);

type Bucket = BTreeMap<String, AddressRecord>;
type Buckets = BTreeMap<String, Bucket>;

/// File-backed key-value store of address records
///
/// Each call takes an exclusive lock on a sibling `.lock` file for its
/// duration and releases it when the call returns, whatever the outcome.
/// No handle is kept between calls. Writes go to a temp file in the same
/// directory which is then renamed over the registry, so the registry file
/// always holds a complete snapshot.
#[derive(Clone, Debug)]
pub struct AddressRegistry {
    path: PathBuf,
    lock_timeout: Duration,
}

impl AddressRegistry {
    /// Create a registry at `path` with the default one second lock wait
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_lock_timeout(path, Duration::from_secs(1))
    }

    pub fn with_lock_timeout(path: impl Into<PathBuf>, lock_timeout: Duration) -> Self {
        Self {
            path: path.into(),
            lock_timeout,
        }
    }

    pub fn from_config(config: &LedgerConfig) -> Self {
        Self::with_lock_timeout(config.db_path.clone(), config.store_lock_timeout)
    }

    /// Location of the registry file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Location of the lock file guarding the registry
    pub fn lock_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".lock");
        PathBuf::from(name)
    }

    /// Write `record` under its address, replacing any previous record
    pub fn upsert(&self, record: &AddressRecord) -> Result<(), StorageError> {
        let store = self.open()?;
        let mut buckets = store.read()?;
        buckets
            .entry(ADDRESS_BUCKET.to_string())
            .or_default()
            .insert(record.address.clone(), record.clone());
        store.write(&buckets)?;
        log::debug!(
            "Stored address {} (balance={}, type={})",
            record.address,
            record.balance,
            record.address_type
        );
        Ok(())
    }

    /// Read the record stored for `address`
    pub fn get(&self, address: &str) -> Result<AddressRecord, StorageError> {
        let store = self.open()?;
        let buckets = store.read()?;
        buckets
            .get(ADDRESS_BUCKET)
            .and_then(|bucket| bucket.get(address))
            .cloned()
            .ok_or_else(|| StorageError::AddressNotFound(address.to_string()))
    }

    /// Remove the record for `address`; fails if it is not stored
    pub fn delete(&self, address: &str) -> Result<(), StorageError> {
        let store = self.open()?;
        let mut buckets = store.read()?;
        let removed = buckets
            .get_mut(ADDRESS_BUCKET)
            .and_then(|bucket| bucket.remove(address));
        if removed.is_none() {
            return Err(StorageError::AddressNotFound(address.to_string()));
        }
        store.write(&buckets)?;
        log::info!("Removed address {} from registry", address);
        Ok(())
    }

    /// Every stored record, ordered by address
    ///
    /// An empty registry and an unreadable one are both reported as
    /// `EmptyOrUnavailable`. A lock timeout is returned as is.
    pub fn list_all(&self) -> Result<Vec<AddressRecord>, StorageError> {
        match self.records() {
            Ok(records) if !records.is_empty() => Ok(records),
            Ok(_) => Err(StorageError::EmptyOrUnavailable),
            Err(e @ StorageError::LockTimeout { .. }) => Err(e),
            Err(e) => {
                log::warn!("Address registry {:?} unreadable: {}", self.path, e);
                Err(StorageError::EmptyOrUnavailable)
            }
        }
    }

    /// Every stored record; empty when nothing has been written yet
    pub(crate) fn records(&self) -> Result<Vec<AddressRecord>, StorageError> {
        let store = self.open()?;
        let mut buckets = store.read()?;
        Ok(buckets
            .remove(ADDRESS_BUCKET)
            .map(|bucket| bucket.into_values().collect())
            .unwrap_or_default())
    }

    fn open(&self) -> Result<StoreHandle<'_>, StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let lock = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(self.lock_path())?;

        let started = Instant::now();
        loop {
            match FileExt::try_lock_exclusive(&lock) {
                Ok(()) => break,
                Err(e) if is_contended(&e) => {
                    let waited = started.elapsed();
                    if waited >= self.lock_timeout {
                        log::warn!(
                            "Gave up waiting for registry lock on {:?} after {:?}",
                            self.path,
                            waited
                        );
                        return Err(StorageError::LockTimeout {
                            path: self.path.clone(),
                            waited,
                        });
                    }
                    thread::sleep(LOCK_POLL_INTERVAL);
                }
                Err(e) => return Err(e.into()),
            }
        }

        let store = StoreHandle {
            lock,
            path: &self.path,
        };
        if !self.path.exists() {
            let mut fresh = Buckets::new();
            fresh.insert(ADDRESS_BUCKET.to_string(), Bucket::new());
            store.write(&fresh)?;
        }
        Ok(store)
    }
}

impl RecordStore for AddressRegistry {
    fn upsert(&self, record: &AddressRecord) -> Result<(), StorageError> {
        AddressRegistry::upsert(self, record)
    }

    fn list_all(&self) -> Result<Vec<AddressRecord>, StorageError> {
        AddressRegistry::list_all(self)
    }
}

fn is_contended(err: &io::Error) -> bool {
    err.raw_os_error().is_some() && err.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

/// Held registry lock, released on drop
struct StoreHandle<'a> {
    lock: File,
    path: &'a Path,
}

impl StoreHandle<'_> {
    fn read(&self) -> Result<Buckets, StorageError> {
        let contents = fs::read_to_string(self.path)?;

        let mut buckets: Buckets = if contents.trim().is_empty() {
            Buckets::new()
        } else {
            serde_json::from_str(&contents)?
        };
        buckets.entry(ADDRESS_BUCKET.to_string()).or_default();
        Ok(buckets)
    }

    /// Replace the registry file with `buckets` in one rename
    fn write(&self, buckets: &Buckets) -> Result<(), StorageError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut staged = NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut staged, buckets)?;
        staged.flush()?;
        staged.as_file().sync_all()?;
        staged.persist(self.path).map_err(|e| StorageError::Io(e.error))?;
        Ok(())
    }
}

impl Drop for StoreHandle<'_> {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.lock) {
            log::warn!("Failed to release registry lock: {}", e);
        }
    }
}
