//! Transaction Log Module
//!
//! The on-disk format of the store: one append-only file of committed
//! transactions.
//!
//! ## Responsibilities
//! - Append one record per committed transaction, fsynced before commit returns
//! - CRC32 checksums for corruption detection
//! - Log Sequence Numbers (LSN) for ordering
//! - Crash recovery: replay valid records, cut torn tails
//!
//! ## File Format
//! ```text
//! ┌─────────────────────────────────────────┐
//! │ File Header (8)                         │
//! │ ┌──────────┬───────────┬──────────────┐ │
//! │ │Magic (4) │Version (2)│ Reserved (2) │ │
//! │ └──────────┴───────────┴──────────────┘ │
//! ├─────────────────────────────────────────┤
//! │ Record 1                                │
//! │ ┌─────────┬─────────┬────────┬────────┐ │
//! │ │ LSN (8) │ CRC (4) │Len (4) │ Data   │ │
//! │ └─────────┴─────────┴────────┴────────┘ │
//! ├─────────────────────────────────────────┤
//! │ Record 2 ...                            │
//! └─────────────────────────────────────────┘
//! ```
//!
//! Data is a bincode-encoded [`Transaction`]; every operation of a
//! transaction lives in the same record, so a transaction is either fully
//! on disk or cut away by recovery.

mod entry;
mod writer;
mod reader;
mod recovery;

pub use entry::{
    file_header, Operation, RecordHeader, Transaction, FILE_HEADER_SIZE, FILE_MAGIC,
    FORMAT_VERSION, MAX_PAYLOAD_SIZE, RECORD_HEADER_SIZE,
};
pub use writer::LogWriter;
pub use reader::{LogReader, ReadOutcome, TornReason};
pub use recovery::{LogRecovery, RecoveryResult};
