use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use serde_json::de::IoRead;
use serde_json::{Deserializer, StreamDeserializer};
use tracing::{debug, instrument, warn};

use crate::error::{Result, UrlStoreError};

/// A single short key to url mapping. This is the unit of both the in-memory index and the
/// record log.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// the short key
    pub key: String,
    /// the url the key resolves to
    pub url: String,
}

impl Record {
    /// builds a new `Record`
    pub fn new(key: impl Into<String>, url: impl Into<String>) -> Self {
        Record {
            key: key.into(),
            url: url.into(),
        }
    }
}

/// An append-only log of [`Record`]s kept in a single file.
///
/// Records are serialized JSON objects written back to back, with no header and no framing.
/// The log is only appended to and read back from the start. The one exception is a corrupt
/// or torn tail, which is cut off with [`RecordLog::truncate`] so new records land where the
/// next replay can reach them.
/// Appends are serialized through a mutex so that records written from multiple threads can
/// not interleave.
#[derive(Debug)]
pub struct RecordLog {
    // path of the log file
    path: PathBuf,

    // the file, positioned at the end of the log
    writer: Mutex<LogWriter>,

    // sync file data to disk after every append
    sync_on_append: bool,
}

impl RecordLog {
    /// opens the log at `path`, creating the file (and its parent directories) if it does not
    /// exist yet.
    ///
    /// # Errors
    /// returns [`UrlStoreError::Startup`] if the file could not be created or opened
    pub fn open(path: &Path) -> Result<RecordLog> {
        RecordLog::open_with(path, false)
    }

    /// same as [`RecordLog::open`], if `sync_on_append` is set every append is followed by a
    /// `sync_data` of the log file
    #[instrument]
    pub fn open_with(path: &Path, sync_on_append: bool) -> Result<RecordLog> {
        let startup = |source: io::Error| UrlStoreError::Startup {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(startup)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(path)
            .map_err(startup)?;
        let writer = LogWriter::new(file).map_err(startup)?;
        debug!(len = writer.pos, "record log opened");

        Ok(RecordLog {
            path: path.to_path_buf(),
            writer: Mutex::new(writer),
            sync_on_append,
        })
    }

    /// appends `record` to the end of the log.
    ///
    /// The record is written straight to the file, where it is handed to the OS but not synced
    /// to disk unless the log was opened with `sync_on_append`. A crash may still lose the
    /// most recent appends.
    ///
    /// # Errors
    /// returns [`UrlStoreError::Append`] if the record could not be written
    pub fn append(&self, record: &Record) -> Result<()> {
        let bytes = serde_json::to_vec(record)?;
        let append = |source: io::Error| UrlStoreError::Append {
            key: record.key.clone(),
            source,
        };

        let mut writer = self
            .writer
            .lock()
            .map_err(|_| UrlStoreError::LockPoisoned("record log"))?;
        writer
            .write_record(&bytes, self.sync_on_append)
            .map_err(append)
    }

    /// returns an iterator over every record in the log, starting from the beginning of the
    /// file. Each call starts over from the first record.
    ///
    /// # Errors
    /// IO Errors will be returned if the log file could not be opened for reading
    pub fn replay(&self) -> Result<Replay> {
        let mut file = File::open(&self.path)?;
        file.seek(SeekFrom::Start(0))?;
        let stream = Deserializer::from_reader(BufReader::new(file)).into_iter::<Record>();
        Ok(Replay {
            stream,
            failed: false,
        })
    }

    /// cuts the log back to its first `offset` bytes, dropping everything after them.
    /// Later appends continue at `offset`. Returns the number of bytes dropped, an `offset` at
    /// or past the end of the log leaves it as is.
    ///
    /// # Errors
    /// IO Errors will be returned if the file could not be truncated
    pub fn truncate(&self, offset: u64) -> Result<u64> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| UrlStoreError::LockPoisoned("record log"))?;
        if offset >= writer.pos {
            return Ok(0);
        }
        let dropped = writer.pos - offset;
        writer.file.set_len(offset)?;
        if self.sync_on_append {
            writer.file.sync_data()?;
        }
        writer.pos = offset;
        Ok(dropped)
    }

    /// path of the log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// number of bytes in the log
    pub fn len(&self) -> Result<u64> {
        let writer = self
            .writer
            .lock()
            .map_err(|_| UrlStoreError::LockPoisoned("record log"))?;
        Ok(writer.pos)
    }

    /// returns `true` if nothing has been written to the log yet
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

/// A lazy, front to back iterator over the records of a [`RecordLog`].
///
/// Reaching the end of the file ends the iteration. A record that can not be decoded yields a
/// single [`UrlStoreError::ReplayDecode`] and the iteration ends after it.
pub struct Replay {
    stream: StreamDeserializer<'static, IoRead<BufReader<File>>, Record>,
    failed: bool,
}

impl Replay {
    /// byte offset just past the last record that was decoded
    pub fn offset(&self) -> u64 {
        self.stream.byte_offset() as u64
    }
}

impl Iterator for Replay {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.stream.next()? {
            Ok(record) => Some(Ok(record)),
            Err(source) => {
                self.failed = true;
                Some(Err(UrlStoreError::ReplayDecode {
                    offset: self.offset(),
                    source,
                }))
            }
        }
    }
}

/// The write end of the log: the file plus the length of its complete records
#[derive(Debug)]
struct LogWriter {
    file: File,
    pos: u64,
}

impl LogWriter {
    fn new(mut file: File) -> io::Result<Self> {
        let pos = file.seek(SeekFrom::End(0))?;
        Ok(LogWriter { file, pos })
    }

    /// writes one encoded record. On failure the file is cut back to the last complete
    /// record, so a partial write never ends up in front of later records.
    fn write_record(&mut self, bytes: &[u8], sync: bool) -> io::Result<()> {
        let written = self.file.write_all(bytes).and_then(|_| {
            if sync {
                self.file.sync_data()
            } else {
                Ok(())
            }
        });
        match written {
            Ok(()) => {
                self.pos += bytes.len() as u64;
                Ok(())
            }
            Err(e) => {
                if let Err(truncate) = self.file.set_len(self.pos) {
                    warn!(pos = self.pos, error = %truncate, "could not truncate partial record");
                }
                Err(e)
            }
        }
    }
}
