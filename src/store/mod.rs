//! Store Module
//!
//! Single-file embedded key-value store with transactions over named
//! buckets.
//!
//! ## Responsibilities
//! - Own the store file and its exclusive lock for the life of the handle
//! - Replay the log on open
//! - Serialize writers; commit = append + fsync, then apply to the keyspace
//! - Serve readers from consistent snapshots
//!
//! ## Concurrency Model: Single-Writer / Multiple-Reader (SWMR)
//!
//! - **Writes** (`update` and the helpers built on it): serialized by the
//!   `writer` mutex, held from the start of the transaction through commit
//! - **Reads** (`view`, `get`): share the keyspace read lock and never take
//!   the writer mutex

mod lock;
mod tx;

use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::error::{Result, ShortenerError};
use crate::keyspace::Keyspace;
use crate::pathmap::PathUrl;
use crate::wal::{LogRecovery, LogWriter};

pub use tx::{ReadTx, WriteTx};

/// Handle on an open store file
pub struct Store {
    path: PathBuf,

    /// Log writer; also the writer lock
    writer: Mutex<LogWriter>,

    /// Committed state (internal RwLock)
    keyspace: Keyspace,
}

impl Store {
    /// Open or create a store file
    ///
    /// On open:
    /// 1. Open/create the file
    /// 2. Take the exclusive lock (fails with `Locked` if another process has it)
    /// 3. Recover the log, truncating any torn tail
    /// 4. Replay recovered transactions into the keyspace
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| ShortenerError::file(&path, e))?;

        lock::try_lock_exclusive(&file).map_err(|e| {
            if e.kind() == ErrorKind::WouldBlock {
                ShortenerError::Locked(path.clone())
            } else {
                ShortenerError::file(&path, e)
            }
        })?;

        let (records, recovery) = LogRecovery::recover(&mut file)?;

        if recovery.was_truncated {
            tracing::warn!(
                path = %path.display(),
                bytes_discarded = recovery.bytes_discarded,
                reason = ?recovery.torn,
                "Discarded damaged log tail"
            );
        }

        let keyspace = Keyspace::new();
        for record in &records {
            keyspace.apply(&record.ops);
        }

        tracing::info!(
            path = %path.display(),
            records = recovery.records_recovered,
            last_lsn = recovery.last_lsn,
            buckets = keyspace.bucket_count(),
            entries = keyspace.entry_count(),
            "Store opened"
        );

        let writer = LogWriter::new(file, recovery.last_lsn)?;

        Ok(Self {
            path,
            writer: Mutex::new(writer),
            keyspace,
        })
    }

    /// Run a read-write transaction
    ///
    /// If `f` returns `Err`, nothing is written. Otherwise every staged
    /// operation is appended as one record, synced, and made visible to
    /// readers in one step.
    pub fn update<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut WriteTx<'_>) -> Result<T>,
    {
        let mut writer = self.writer.lock();

        let mut tx = WriteTx::new(&self.keyspace);
        let value = f(&mut tx)?;

        let ops = tx.into_ops();
        if ops.is_empty() {
            return Ok(value);
        }

        let record = writer.append(ops)?;
        self.keyspace.apply(&record.ops);

        tracing::debug!(lsn = record.lsn, ops = record.ops.len(), "Committed transaction");
        Ok(value)
    }

    /// Run a read-only transaction over a consistent snapshot
    pub fn view<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&ReadTx<'_>) -> Result<T>,
    {
        let tx = ReadTx::new(&self.keyspace);
        f(&tx)
    }

    /// Create a bucket unless it already exists
    pub fn ensure_bucket(&self, name: &str) -> Result<()> {
        let created = self.update(|tx| tx.create_bucket_if_not_exists(name))?;
        if created {
            tracing::info!(bucket = name, "Created bucket");
        }
        Ok(())
    }

    /// Write all entries as one atomic transaction
    ///
    /// Entries are applied in order, so the last of two entries with the
    /// same path wins. Either every entry lands or none does.
    pub fn put_all(&self, bucket: &str, entries: &[PathUrl]) -> Result<()> {
        self.update(|tx| {
            for entry in entries {
                tx.put(bucket, entry.path.as_bytes(), entry.url.as_bytes())?;
            }
            Ok(())
        })
    }

    /// Put a single key-value pair
    pub fn put(&self, bucket: &str, key: &[u8], value: &[u8]) -> Result<()> {
        self.update(|tx| tx.put(bucket, key, value))
    }

    /// Get a value by key; an absent key is `Ok(None)`
    pub fn get(&self, bucket: &str, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.view(|tx| tx.get(bucket, key))
    }

    /// All entries of a bucket, ordered by key
    pub fn entries(&self, bucket: &str) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        self.view(|tx| tx.entries(bucket))
    }

    /// Names of all buckets, ordered
    pub fn bucket_names(&self) -> Vec<String> {
        ReadTx::new(&self.keyspace).bucket_names()
    }

    /// Close the store
    ///
    /// Syncs the file and releases it together with the lock. Dropping the
    /// store releases the lock too; `close` reports sync failures.
    pub fn close(self) -> Result<()> {
        self.writer.lock().sync()?;
        tracing::debug!(path = %self.path.display(), "Store closed");
        Ok(())
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Path of the store file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// LSN of the last committed transaction (0 if none)
    pub fn last_lsn(&self) -> u64 {
        self.writer.lock().last_lsn()
    }

    /// Size of the store file in bytes
    pub fn file_size(&self) -> u64 {
        self.writer.lock().offset()
    }
}
