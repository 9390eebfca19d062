use std::cmp;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use clap::crate_version;
use tracing::{debug, error, info, instrument, warn};

use super::log::{Record, RecordLog};
use super::UrlEngine;
use crate::config::{Durability, StoreConfig};
use crate::error::{Result, UrlStoreError};
use crate::keygen::{Base62, KeyGenerator};

/// The primary struct for working with a [`UrlStore`].
///
/// It keeps every short key to url mapping in an in-memory index, guarded by a reader/writer
/// lock, and persists each new mapping into a [`RecordLog`]. The log is replayed into the
/// index when the store is opened, so mappings survive a restart.
///
/// `UrlStore` is a cheap handle, clone it to hand the store to another thread.
#[derive(Clone)]
pub struct UrlStore {
    inner: Arc<Shared>,

    // what was found in the record log when the store was opened
    summary: LoadSummary,
}

struct Shared {
    // maps short keys to their url
    index: RwLock<HashMap<String, String>>,

    // the log every new record gets appended to
    log: RecordLog,

    // derives candidate keys from the size of the index
    keygen: Box<dyn KeyGenerator>,

    durability: Durability,
}

/// Counts of what happened while the record log was replayed into the index.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct LoadSummary {
    /// records inserted into the index
    pub replayed: usize,
    /// records skipped because their key was already in the index
    pub duplicates: usize,
    /// byte offset of undecodable data, if replay stopped before the end of the log
    pub corrupt_offset: Option<u64>,
    /// bytes cut off the end of the log, starting at `corrupt_offset`
    pub truncated: u64,
}

impl UrlStore {
    /// opens a [`UrlStore`] backed by the record log at `path`, creating the log if it does
    /// not exist yet.
    ///
    /// All records in the log are loaded into the index before this returns. If the log holds
    /// a corrupt record, the records before it are served, a warning is logged, and the log is
    /// cut back to the end of the last good record so that new records stay replayable.
    ///
    /// # Errors
    /// returns [`UrlStoreError::Startup`] if the log file could not be opened or created, or
    /// an IO Error if a corrupt tail could not be cut off
    pub fn open(path: impl Into<PathBuf>) -> Result<UrlStore> {
        UrlStore::with_config(StoreConfig::new(path))
    }

    /// opens a [`UrlStore`] using the given `config`, with [`Base62`] keys
    pub fn with_config(config: StoreConfig) -> Result<UrlStore> {
        UrlStore::with_generator(config, Base62)
    }

    /// opens a [`UrlStore`] using the given `config`, deriving keys with `keygen`
    #[instrument(skip(config, keygen), fields(path = ?config.path))]
    pub fn with_generator<G: KeyGenerator>(config: StoreConfig, keygen: G) -> Result<UrlStore> {
        info!("opening url store version {}", crate_version!());
        let log = RecordLog::open_with(&config.path, config.sync_on_append)?;

        let mut store = UrlStore {
            inner: Arc::new(Shared {
                index: RwLock::new(HashMap::new()),
                log,
                keygen: Box::new(keygen),
                durability: config.durability,
            }),
            summary: LoadSummary::default(),
        };

        debug!("loading record log");
        store.summary = load(&store)?;
        info!(
            records = store.summary.replayed,
            durability = ?config.durability,
            "url store is serving"
        );
        Ok(store)
    }

    /// inserts `key` -> `url` unless `key` is already present.
    ///
    /// Returns `true` if the mapping was installed, `false` if the key was taken, in which
    /// case the index is left unchanged. Nothing is written to the record log.
    pub fn insert_if_absent(&self, key: String, url: String) -> Result<bool> {
        let mut index = self
            .inner
            .index
            .write()
            .map_err(|_| UrlStoreError::LockPoisoned("index"))?;
        match index.entry(key) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(entry) => {
                entry.insert(url);
                Ok(true)
            }
        }
    }

    /// the number of keys in the store
    pub fn size(&self) -> Result<usize> {
        let index = self
            .inner
            .index
            .read()
            .map_err(|_| UrlStoreError::LockPoisoned("index"))?;
        Ok(index.len())
    }

    /// path of the record log backing this store
    pub fn log_path(&self) -> &Path {
        self.inner.log.path()
    }

    /// what was found in the record log when this store was opened
    pub fn load_summary(&self) -> LoadSummary {
        self.summary
    }

    /// writes the record for a freshly inserted key into the log. A failed append is logged
    /// and the key stays visible for the lifetime of the process.
    fn persist(&self, record: Record) -> String {
        if let Err(e) = self.inner.log.append(&record) {
            warn!(key = %record.key, error = %e, "could not append record, key will not survive a restart");
        }
        record.key
    }

    /// registers `url` with the index write lock held across choosing the key, appending the
    /// record and inserting it, so a key only becomes visible once its record is in the log.
    fn register_strict(&self, url: String) -> Result<String> {
        let mut index = self
            .inner
            .index
            .write()
            .map_err(|_| UrlStoreError::LockPoisoned("index"))?;
        let mut seq = index.len() as u64;
        loop {
            let key = self.inner.keygen.generate(seq);
            if !index.contains_key(&key) {
                let record = Record { key, url };
                if let Err(e) = self.inner.log.append(&record) {
                    warn!(key = %record.key, error = %e, "could not append record, nothing registered");
                    return Err(e);
                }
                index.insert(record.key.clone(), record.url);
                return Ok(record.key);
            }
            debug!(%key, seq, "key already taken, retrying");
            seq += 1;
        }
    }
}

impl UrlEngine for UrlStore {
    /// returns the url registered under `key`, or `None` if there is no such key
    fn resolve(&self, key: &str) -> Result<Option<String>> {
        let index = self
            .inner
            .index
            .read()
            .map_err(|_| UrlStoreError::LockPoisoned("index"))?;
        Ok(index.get(key).cloned())
    }

    /// registers `url` under a newly derived key and returns the key.
    ///
    /// The candidate key comes from the current size of the index. Reading the size and
    /// inserting are separate critical sections, so a concurrent `register` may take the
    /// candidate first, in which case a new candidate is derived and the insert is retried.
    ///
    /// With [`Durability::Strict`] the record is appended before the key becomes visible, and
    /// registrations are serialized behind the append.
    fn register(&self, url: String) -> Result<String> {
        if self.inner.durability == Durability::Strict {
            return self.register_strict(url);
        }

        let mut seq = self.size()? as u64;
        loop {
            let key = self.inner.keygen.generate(seq);
            if self.insert_if_absent(key.clone(), url.clone())? {
                return Ok(self.persist(Record { key, url }));
            }
            debug!(%key, seq, "key already taken, retrying");
            // a stale size means a racing insert, an unchanged one means a hole in the keys
            seq = cmp::max(self.size()? as u64, seq + 1);
        }
    }
}

impl fmt::Debug for UrlStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UrlStore")
            .field("log", &self.inner.log)
            .field("durability", &self.inner.durability)
            .field("summary", &self.summary)
            .finish()
    }
}

/// replays the record log of `store` into its index using `insert_if_absent`.
///
/// A corrupt record ends the replay but is not an error, the records before it are kept and
/// the log is cut back to them.
///
/// # Errors
/// IO Errors will be returned if the log file could not be opened for reading, or if the
/// corrupt tail could not be cut off
fn load(store: &UrlStore) -> Result<LoadSummary> {
    let mut summary = LoadSummary::default();

    for record in store.inner.log.replay()? {
        match record {
            Ok(Record { key, url }) => {
                if store.insert_if_absent(key.clone(), url)? {
                    summary.replayed += 1;
                } else {
                    warn!(%key, "duplicate key in record log, keeping the first record");
                    summary.duplicates += 1;
                }
            }
            Err(UrlStoreError::ReplayDecode { offset, source }) => {
                warn!(
                    offset,
                    error = %source,
                    path = ?store.log_path(),
                    "could not decode record log, serving the records before the corruption"
                );
                summary.corrupt_offset = Some(offset);
            }
            Err(e) => return Err(e),
        }
    }

    if let Some(offset) = summary.corrupt_offset {
        match store.inner.log.truncate(offset) {
            Ok(dropped) => {
                warn!(offset, dropped, "cut the corrupt tail off the record log");
                summary.truncated = dropped;
            }
            Err(e) => {
                error!(offset, error = %e, "could not cut the corrupt tail off the record log");
                return Err(e);
            }
        }
    }

    Ok(summary)
}
