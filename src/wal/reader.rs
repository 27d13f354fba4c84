//! Log Reader
//!
//! Reads records sequentially and reports where the valid prefix ends.

use std::io::{ErrorKind, Read};

use crate::error::Result;

use super::{RecordHeader, Transaction, FILE_HEADER_SIZE, MAX_PAYLOAD_SIZE, RECORD_HEADER_SIZE};

/// Outcome of reading one record
#[derive(Debug)]
pub enum ReadOutcome {
    /// A complete, verified record
    Record(Transaction),

    /// Clean end of log
    End,

    /// The bytes at the current offset are not a valid record
    Torn(TornReason),
}

/// Why reading stopped before the end of the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TornReason {
    PartialHeader,
    PartialPayload,
    BadLength,
    ChecksumMismatch,
    Undecodable,
    OutOfSequence,
}

/// Reads records from a log positioned just past the file header
pub struct LogReader<R> {
    inner: R,
    /// Offset just past the last verified record
    valid_end: u64,
    /// LSN of the last verified record
    last_lsn: u64,
}

impl<R: Read> LogReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            valid_end: FILE_HEADER_SIZE,
            last_lsn: 0,
        }
    }

    /// Read the next record from the log
    ///
    /// Only real I/O failures are errors; damaged bytes are reported as
    /// [`ReadOutcome::Torn`] and leave `valid_end` untouched.
    pub fn next_record(&mut self) -> Result<ReadOutcome> {
        let mut header = [0u8; RECORD_HEADER_SIZE];
        match read_full(&mut self.inner, &mut header)? {
            0 => return Ok(ReadOutcome::End),
            n if n < RECORD_HEADER_SIZE => return Ok(ReadOutcome::Torn(TornReason::PartialHeader)),
            _ => {}
        }

        let header = RecordHeader::from_bytes(&header);
        if header.len > MAX_PAYLOAD_SIZE {
            return Ok(ReadOutcome::Torn(TornReason::BadLength));
        }

        let mut payload = vec![0u8; header.len as usize];
        if read_full(&mut self.inner, &mut payload)? < payload.len() {
            return Ok(ReadOutcome::Torn(TornReason::PartialPayload));
        }

        if crc32fast::hash(&payload) != header.crc {
            return Ok(ReadOutcome::Torn(TornReason::ChecksumMismatch));
        }

        let tx = match Transaction::decode_payload(&payload) {
            Ok(tx) => tx,
            Err(_) => return Ok(ReadOutcome::Torn(TornReason::Undecodable)),
        };

        if tx.lsn != header.lsn || tx.lsn != self.last_lsn + 1 {
            return Ok(ReadOutcome::Torn(TornReason::OutOfSequence));
        }

        self.last_lsn = tx.lsn;
        self.valid_end += (RECORD_HEADER_SIZE + payload.len()) as u64;
        Ok(ReadOutcome::Record(tx))
    }

    /// Offset just past the last verified record
    pub fn valid_end(&self) -> u64 {
        self.valid_end
    }

    /// LSN of the last verified record (0 if none)
    pub fn last_lsn(&self) -> u64 {
        self.last_lsn
    }
}

/// Fill `buf` as far as the reader allows; returns the number of bytes read
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}
