//! Configuration for opening a [`UrlStore`].
//!
//! [`UrlStore`]: ../struct.UrlStore.html
use std::path::{Path, PathBuf};

/// name of the record log used when no path is given
pub const DEFAULT_LOG_FILE: &str = "urls.log";

/// How `register` treats a failed write to the record log.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Durability {
    /// the key is made visible first, then appended. A failed append is logged and the key is
    /// still returned, it will not survive a restart.
    BestEffort,
    /// the record is appended before the key is made visible, under the index write lock, so a
    /// failed append leaves the index untouched and `register` returns the error. Readers wait
    /// for the append.
    Strict,
}

impl Default for Durability {
    fn default() -> Self {
        Durability::BestEffort
    }
}

/// Options used by [`UrlStore::with_config`].
///
/// [`UrlStore::with_config`]: ../struct.UrlStore.html#method.with_config
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// path of the record log file
    pub path: PathBuf,
    /// append failure handling
    pub durability: Durability,
    /// call `sync_data` on the log file after every append
    pub sync_on_append: bool,
}

impl StoreConfig {
    /// a config for the log at `path`, best-effort durability and no syncing
    pub fn new(path: impl Into<PathBuf>) -> Self {
        StoreConfig {
            path: path.into(),
            durability: Durability::default(),
            sync_on_append: false,
        }
    }

    /// a config for [`DEFAULT_LOG_FILE`] inside `dir`
    pub fn in_dir(dir: &Path) -> Self {
        StoreConfig::new(dir.join(DEFAULT_LOG_FILE))
    }

    /// sets the [`Durability`] mode
    pub fn durability(mut self, durability: Durability) -> Self {
        self.durability = durability;
        self
    }

    /// sets whether every append is synced to disk
    pub fn sync_on_append(mut self, sync: bool) -> Self {
        self.sync_on_append = sync;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::new(DEFAULT_LOG_FILE)
    }
}
