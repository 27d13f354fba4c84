//! Log record definitions
//!
//! Defines the transaction payload and the record framing around it.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::{Result, ShortenerError};

/// Magic bytes identifying a urlshort store file
pub const FILE_MAGIC: &[u8; 4] = b"USKV";

/// Current store file format version
pub const FORMAT_VERSION: u16 = 1;

/// File header size: Magic (4) + Version (2) + Reserved (2) = 8 bytes
pub const FILE_HEADER_SIZE: u64 = 8;

/// Record header size: LSN (8) + CRC (4) + Len (4) = 16 bytes
pub const RECORD_HEADER_SIZE: usize = 16;

/// Largest payload accepted for one record (64 MB)
pub const MAX_PAYLOAD_SIZE: u32 = 64 * 1024 * 1024;

/// A committed transaction, as stored in one log record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Log Sequence Number - starts at 1, increases by one per record
    pub lsn: u64,

    /// Timestamp (unix millis) when the transaction committed
    pub timestamp: u64,

    /// Operations, in the order they were staged
    pub ops: Vec<Operation>,
}

/// Operations that can be logged
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    /// Create a bucket
    CreateBucket { name: String },

    /// Put a key-value pair into a bucket
    Put {
        bucket: String,
        key: Vec<u8>,
        value: Vec<u8>,
    },
}

impl Transaction {
    pub fn new(lsn: u64, ops: Vec<Operation>) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();

        Self { lsn, timestamp, ops }
    }

    /// Encode the full record: header followed by payload
    pub fn encode(&self) -> Result<Vec<u8>> {
        let payload = bincode::serialize(self)?;
        if payload.len() > MAX_PAYLOAD_SIZE as usize {
            return Err(ShortenerError::Store(format!(
                "transaction too large: {} bytes (max {})",
                payload.len(),
                MAX_PAYLOAD_SIZE
            )));
        }

        let header = RecordHeader {
            lsn: self.lsn,
            crc: crc32fast::hash(&payload),
            len: payload.len() as u32,
        };

        let mut record = Vec::with_capacity(RECORD_HEADER_SIZE + payload.len());
        record.extend_from_slice(&header.to_bytes());
        record.extend_from_slice(&payload);
        Ok(record)
    }

    /// Decode a payload whose checksum has already been verified
    pub fn decode_payload(payload: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(payload)?)
    }
}

/// Fixed-size header in front of every record payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    pub lsn: u64,
    pub crc: u32,
    pub len: u32,
}

impl RecordHeader {
    pub fn to_bytes(&self) -> [u8; RECORD_HEADER_SIZE] {
        let mut buf = [0u8; RECORD_HEADER_SIZE];
        buf[0..8].copy_from_slice(&self.lsn.to_le_bytes());
        buf[8..12].copy_from_slice(&self.crc.to_le_bytes());
        buf[12..16].copy_from_slice(&self.len.to_le_bytes());
        buf
    }

    pub fn from_bytes(buf: &[u8; RECORD_HEADER_SIZE]) -> Self {
        let mut lsn = [0u8; 8];
        let mut crc = [0u8; 4];
        let mut len = [0u8; 4];
        lsn.copy_from_slice(&buf[0..8]);
        crc.copy_from_slice(&buf[8..12]);
        len.copy_from_slice(&buf[12..16]);

        Self {
            lsn: u64::from_le_bytes(lsn),
            crc: u32::from_le_bytes(crc),
            len: u32::from_le_bytes(len),
        }
    }
}

/// The header every store file starts with
pub fn file_header() -> [u8; FILE_HEADER_SIZE as usize] {
    let mut buf = [0u8; FILE_HEADER_SIZE as usize];
    buf[0..4].copy_from_slice(FILE_MAGIC);
    buf[4..6].copy_from_slice(&FORMAT_VERSION.to_le_bytes());
    buf
}

/// Validate a file header read from disk
pub(crate) fn check_file_header(buf: &[u8; FILE_HEADER_SIZE as usize]) -> Result<()> {
    if &buf[0..4] != FILE_MAGIC {
        return Err(ShortenerError::Store(format!(
            "not a urlshort store file: expected magic USKV, got {:?}",
            &buf[0..4]
        )));
    }

    let version = u16::from_le_bytes([buf[4], buf[5]]);
    if version != FORMAT_VERSION {
        return Err(ShortenerError::Store(format!(
            "unsupported store format version: {}",
            version
        )));
    }

    Ok(())
}
