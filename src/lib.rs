#![deny(missing_docs)]
//! A persistent, concurrent url shortening store, that maps short [`String`] keys to urls.
//!
//! This crate provides the [`UrlStore`] implementation itself, as well as a [`urlstore`]
//! executable that can be used to register and resolve urls from the command line.
//! Serving the urls over HTTP is left to the embedding application, which only needs the two
//! operations of the [`UrlEngine`] trait.
//!
//! ## Supported Operations
//!
//! - `RESOLVE` the url registered under a short key
//! - `REGISTER` a url, returning the newly minted short key
//!
//! Keys are never removed or reassigned, the store only grows.
//!
//! ## UrlStore
//! [`UrlStore`] is the implementor of the [`UrlEngine`] trait. It is responsible for:
//! - maintaining the key/url mappings within an in-memory HashMap behind a reader/writer lock
//! - minting new keys by encoding the current size of the map with a [`KeyGenerator`],
//! retrying with a new candidate if a concurrent registration took the key first
//! - persisting every new mapping into the record log
//! - replaying the record log at start-up, before any request is served
//!
//! A `UrlStore` is opened once and then cloned into every thread that needs it.
//!
//! ## Keys
//! Keys are the base-62 digits of a sequence number (see [`gen_key`]), using the characters
//! `a-z`, `A-Z` and `0-9` only, so they can be used in a URL path as is.
//!
//! ## Record Log
//! Every mapping is persisted into a single, append-only "record log" file, as a serialized
//! JSON object. There is no header and no compaction, the file only ever grows.
//! A record is appended synchronously while registering a url, but the log is not synced to
//! disk unless [`StoreConfig::sync_on_append`] is set.
//!
//! If the log contains a record that can not be decoded, the records before it are loaded,
//! a warning is logged, and the store starts serving anyway.
//!
//! [`String`]: https://doc.rust-lang.org/std/string/struct.String.html
//! [`urlstore`]: ./urlstore.rs

pub use config::{Durability, StoreConfig, DEFAULT_LOG_FILE};
pub use engine::{LoadSummary, Record, RecordLog, Replay, UrlEngine, UrlStore};
pub use error::{Result, UrlStoreError};
pub use keygen::{gen_key, Base62, KeyGenerator};

mod config;
mod engine;
mod error;
mod keygen;
