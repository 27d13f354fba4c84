//! PathMap Loader
//!
//! Decodes YAML or JSON buffers into ordered `(path, url)` pairs.
//!
//! Both formats share one shape, a sequence of objects with `path` and `url`:
//!
//! ```yaml
//! - path: /foo
//!   url: https://example.com/foo
//! ```
//!
//! ```json
//! [{"path": "/bar", "url": "https://example.com/bar"}]
//! ```
//!
//! Element order is preserved: it decides which entry wins when a path
//! repeats.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ShortenerError};

/// One mapping from a request path to its redirect target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathUrl {
    pub path: String,
    pub url: String,
}

impl PathUrl {
    pub fn new(path: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            url: url.into(),
        }
    }
}

/// Path map encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Json,
}

impl Format {
    /// Decode a buffer into path mappings
    ///
    /// A YAML buffer holding only whitespace decodes to an empty list. JSON
    /// has no empty document, so a blank JSON buffer is a decode error.
    pub fn decode(self, bytes: &[u8]) -> Result<Vec<PathUrl>> {
        if self == Format::Yaml && bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        let decoded: std::result::Result<Vec<PathUrl>, String> = match self {
            Format::Yaml => serde_yaml::from_slice(bytes).map_err(|e| e.to_string()),
            Format::Json => serde_json::from_slice(bytes).map_err(|e| e.to_string()),
        };

        decoded.map_err(|message| ShortenerError::Decode {
            format: self,
            message,
        })
    }

    /// Pick a format from a file extension (`.yaml`, `.yml`, `.json`)
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "yaml" | "yml" => Some(Format::Yaml),
            "json" => Some(Format::Json),
            _ => None,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Yaml => f.write_str("YAML"),
            Format::Json => f.write_str("JSON"),
        }
    }
}

/// Decode `bytes` with the given format
pub fn decode(bytes: &[u8], format: Format) -> Result<Vec<PathUrl>> {
    format.decode(bytes)
}

/// Read and decode a path map file
pub fn load_file(path: impl AsRef<Path>, format: Format) -> Result<Vec<PathUrl>> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| ShortenerError::file(path, e))?;
    format.decode(&bytes)
}
