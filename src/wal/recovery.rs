//! Log Recovery
//!
//! Rebuilds committed state from the log and cuts away anything after the
//! last verified record.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom, Write};

use crate::error::Result;

use super::entry::check_file_header;
use super::{file_header, LogReader, ReadOutcome, Transaction, TornReason, FILE_HEADER_SIZE};

/// Handles log recovery on open
pub struct LogRecovery;

/// Result of a recovery operation
#[derive(Debug, Clone, Default)]
pub struct RecoveryResult {
    /// Number of records successfully replayed
    pub records_recovered: u64,

    /// Last valid LSN (0 for an empty log)
    pub last_lsn: u64,

    /// Whether the file was truncated (torn or corrupt tail removed)
    pub was_truncated: bool,

    /// Bytes removed from the end of the file
    pub bytes_discarded: u64,

    /// What stopped replay early, if anything
    pub torn: Option<TornReason>,
}

impl LogRecovery {
    /// Recover committed transactions from an open, locked store file
    ///
    /// This will:
    /// 1. Write the file header if the file is new (or its header was torn during creation)
    /// 2. Validate the header otherwise
    /// 3. Read records until the end or the first damaged record
    /// 4. Truncate the file to the end of the last valid record
    ///
    /// On return the file is positioned at its (possibly new) end.
    pub fn recover(file: &mut File) -> Result<(Vec<Transaction>, RecoveryResult)> {
        let file_len = file.metadata()?.len();
        let expected = file_header();

        if file_len < FILE_HEADER_SIZE {
            let mut existing = vec![0u8; file_len as usize];
            file.seek(SeekFrom::Start(0))?;
            file.read_exact(&mut existing)?;

            if existing[..] != expected[..existing.len()] {
                let mut header = [0u8; FILE_HEADER_SIZE as usize];
                header[..existing.len()].copy_from_slice(&existing);
                check_file_header(&header)?;
            }

            file.set_len(0)?;
            file.seek(SeekFrom::Start(0))?;
            file.write_all(&expected)?;
            file.sync_all()?;

            let result = RecoveryResult {
                was_truncated: file_len > 0,
                ..RecoveryResult::default()
            };
            return Ok((Vec::new(), result));
        }

        let mut header = [0u8; FILE_HEADER_SIZE as usize];
        file.seek(SeekFrom::Start(0))?;
        file.read_exact(&mut header)?;
        check_file_header(&header)?;

        let mut records = Vec::new();
        let (valid_end, last_lsn, torn) = {
            let mut reader = LogReader::new(BufReader::new(&mut *file));
            let torn = loop {
                match reader.next_record()? {
                    ReadOutcome::Record(tx) => records.push(tx),
                    ReadOutcome::End => break None,
                    ReadOutcome::Torn(reason) => break Some(reason),
                }
            };
            (reader.valid_end(), reader.last_lsn(), torn)
        };

        let was_truncated = valid_end < file_len;
        if was_truncated {
            file.set_len(valid_end)?;
            file.sync_all()?;
        }
        file.seek(SeekFrom::Start(valid_end))?;

        let result = RecoveryResult {
            records_recovered: records.len() as u64,
            last_lsn,
            was_truncated,
            bytes_discarded: file_len - valid_end,
            torn,
        };

        Ok((records, result))
    }
}
