use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// type alias for all operations on a [`UrlStore`] that could fail with a [`UrlStoreError`]
///
/// [`UrlStore`]: ./struct.UrlStore.html
pub type Result<T> = std::result::Result<T, UrlStoreError>;

/// The Error variants used by [`UrlStore`] and its [`RecordLog`].
///
/// A lookup miss is not an error, it is returned as `Ok(None)` from `resolve`.
///
/// [`UrlStore`]: ./struct.UrlStore.html
/// [`RecordLog`]: ./struct.RecordLog.html
#[derive(Debug, Error)]
pub enum UrlStoreError {
    /// the record log could not be opened or created, the store cannot start without it
    #[error("could not open record log at {path:?}: {source}")]
    Startup {
        /// path of the log file that failed to open
        path: PathBuf,
        /// the underlying io error
        source: io::Error,
    },

    /// the record log holds bytes that are not a valid record
    #[error("could not decode record at byte offset {offset}: {source}")]
    ReplayDecode {
        /// byte offset in the log where decoding stopped
        offset: u64,
        /// the underlying decoder error
        source: serde_json::Error,
    },

    /// a record could not be written to the log
    #[error("could not append record for key {key}: {source}")]
    Append {
        /// key of the record that was not written
        key: String,
        /// the underlying io error
        source: io::Error,
    },

    /// variant for errors caused from file IO
    #[error("IO Error: {0}")]
    Io(#[from] io::Error),

    /// Serde Error
    #[error("Serialization Error: {0}")]
    Serde(#[from] serde_json::Error),

    /// a thread panicked while holding one of the store's locks
    #[error("{0} lock was poisoned")]
    LockPoisoned(&'static str),

    /// a command line argument could not be parsed
    #[error("Parsing Error: {0}")]
    Parsing(String),
}
