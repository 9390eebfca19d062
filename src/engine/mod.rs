//! This module provides the url storage engine: the [`UrlEngine`] trait consumed by whatever
//! serves requests, the [`UrlStore`] implementation, and the [`RecordLog`] that keeps its
//! mappings on disk.
use crate::Result;

/// A trait for the two operations a url shortening front end needs from its storage engine
pub trait UrlEngine: Clone + Send + 'static {
    /// Gets the url registered under the given `key`
    ///
    /// Returns `None` if the given `key` does not exist.
    fn resolve(&self, key: &str) -> Result<Option<String>>;

    /// Registers `url` under a new, unique short key and returns that key
    fn register(&self, url: String) -> Result<String>;
}

mod log;
mod store;

pub use self::log::{Record, RecordLog, Replay};
pub use self::store::{LoadSummary, UrlStore};
