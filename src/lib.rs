//! # urlshort
//!
//! A URL shortener with:
//! - A single-file transactional key-value store (buckets, atomic batches)
//! - Crash recovery that drops torn or corrupt log tails
//! - Path maps merged from built-in defaults, a YAML file and a JSON file
//! - An HTTP server that answers every path with a redirect decision
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      HTTP Server                             │
//! │                (one task per connection)                     │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ get (read snapshot)
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                      Store                                   │
//! │            (Single Writer / Multi Reader)                    │
//! └─────────────────────┬───────────────────────────────────────┘
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │  Log file   │          │  Keyspace   │
//!   │  (Append)   │          │  (RwLock)   │
//!   └─────────────┘          └─────────────┘
//!          ▲
//!          │ put_all, one batch per source (startup only)
//! ┌────────┴────────────────────────────────────────────────────┐
//! │        Merger: defaults → YAML map → JSON map               │
//! └─────────────────────────────────────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod wal;
pub mod keyspace;
pub mod store;
pub mod pathmap;
pub mod merge;
pub mod http;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{ErrorKind, Result, ShortenerError};
pub use config::{Config, MissPolicy};
pub use pathmap::{Format, PathUrl};
pub use store::Store;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of urlshort
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
