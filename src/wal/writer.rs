//! Log Writer
//!
//! Appends committed transactions to the store file.

use std::fs::File;
use std::io::{Seek, SeekFrom, Write};

use crate::error::{Result, ShortenerError};

use super::{Operation, Transaction};

/// Appends records to the store file
///
/// Owns the file handle, and with it the process's exclusive lock on the
/// store. Every append is fsynced before it returns.
pub struct LogWriter {
    file: File,
    /// End of the last committed record
    offset: u64,
    last_lsn: u64,
    /// Set when a failed append could not be rolled back
    failed: bool,
}

impl LogWriter {
    /// Wrap a recovered store file, positioned at the end of its valid log
    pub fn new(mut file: File, last_lsn: u64) -> Result<Self> {
        let offset = file.seek(SeekFrom::End(0))?;
        Ok(Self {
            file,
            offset,
            last_lsn,
            failed: false,
        })
    }

    /// Append one transaction and sync it to disk
    ///
    /// A failed write is rolled back by truncating to the previous end, so
    /// the next append never lands behind a torn record.
    pub fn append(&mut self, ops: Vec<Operation>) -> Result<Transaction> {
        if self.failed {
            return Err(ShortenerError::Store(
                "log writer is unusable after an unrecoverable write failure".into(),
            ));
        }

        let tx = Transaction::new(self.last_lsn + 1, ops);
        let record = tx.encode()?;

        if let Err(e) = self.write_record(&record) {
            if self.rollback().is_err() {
                self.failed = true;
            }
            return Err(e);
        }

        self.offset += record.len() as u64;
        self.last_lsn = tx.lsn;
        Ok(tx)
    }

    fn write_record(&mut self, record: &[u8]) -> Result<()> {
        self.file.write_all(record)?;
        self.file.sync_data()?;
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        self.file.set_len(self.offset)?;
        self.file.seek(SeekFrom::Start(self.offset))?;
        Ok(())
    }

    /// Force sync to disk
    pub fn sync(&mut self) -> Result<()> {
        self.file.sync_all()?;
        Ok(())
    }

    /// LSN of the last committed record
    pub fn last_lsn(&self) -> u64 {
        self.last_lsn
    }

    /// Size of the log in bytes, header included
    pub fn offset(&self) -> u64 {
        self.offset
    }
}
