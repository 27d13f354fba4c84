//! Merger
//!
//! Establishes the full mapping at startup by applying sources in a fixed
//! order, one atomic batch per source:
//!
//! 1. Built-in defaults
//! 2. The YAML path map
//! 3. The JSON path map
//!
//! A later source replaces whole entries written by an earlier one. Each
//! source is read and decoded completely before anything of it is written.

use std::path::Path;

use crate::config::Config;
use crate::error::Result;
use crate::pathmap::{self, Format, PathUrl};
use crate::store::Store;

/// Mappings built into the server
pub fn default_paths() -> Vec<PathUrl> {
    vec![
        PathUrl::new(
            "/urlshort-godoc",
            "https://godoc.org/github.com/gophercises/urlshort",
        ),
        PathUrl::new("/yaml-godoc", "https://godoc.org/gopkg.in/yaml.v2"),
    ]
}

/// A named, decoded set of mappings
#[derive(Debug, Clone)]
pub struct Source {
    pub name: String,
    pub entries: Vec<PathUrl>,
}

impl Source {
    pub fn new(name: impl Into<String>, entries: Vec<PathUrl>) -> Self {
        Self {
            name: name.into(),
            entries,
        }
    }

    /// The built-in defaults
    pub fn defaults() -> Self {
        Self::new("defaults", default_paths())
    }

    /// Read and decode a path map file
    pub fn from_file(path: &Path, format: Format) -> Result<Self> {
        let entries = pathmap::load_file(path, format)?;
        Ok(Self::new(path.display().to_string(), entries))
    }
}

/// What a merge wrote
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// `(source name, entry count)` in application order
    pub sources: Vec<(String, usize)>,

    /// LSN of the store after the last batch
    pub last_lsn: u64,
}

impl MergeReport {
    /// Total entries written across all sources
    pub fn total_entries(&self) -> usize {
        self.sources.iter().map(|(_, n)| n).sum()
    }
}

/// Applies sources to one bucket
pub struct Merger<'a> {
    store: &'a Store,
    bucket: String,
    report: MergeReport,
}

impl<'a> Merger<'a> {
    /// Create a merger for `bucket`, creating the bucket if it is absent
    pub fn new(store: &'a Store, bucket: impl Into<String>) -> Result<Self> {
        let bucket = bucket.into();
        store.ensure_bucket(&bucket)?;

        Ok(Self {
            store,
            bucket,
            report: MergeReport::default(),
        })
    }

    /// Apply one source as a single batch
    pub fn apply(&mut self, source: &Source) -> Result<()> {
        self.store.put_all(&self.bucket, &source.entries)?;

        tracing::info!(
            source = %source.name,
            entries = source.entries.len(),
            bucket = %self.bucket,
            "Merged path map"
        );

        self.report
            .sources
            .push((source.name.clone(), source.entries.len()));
        Ok(())
    }

    /// Finish and report what was written
    pub fn finish(mut self) -> MergeReport {
        self.report.last_lsn = self.store.last_lsn();
        self.report
    }
}

/// Apply sources in order; stops at the first failure
pub fn merge_all<I>(store: &Store, bucket: &str, sources: I) -> Result<MergeReport>
where
    I: IntoIterator<Item = Source>,
{
    let mut merger = Merger::new(store, bucket)?;
    for source in sources {
        merger.apply(&source)?;
    }
    Ok(merger.finish())
}

/// Startup sequence: defaults, then the YAML file, then the JSON file
///
/// Files are loaded lazily, so a missing JSON file still leaves the
/// defaults and YAML batches committed.
pub fn seed(store: &Store, config: &Config) -> Result<MergeReport> {
    let mut merger = Merger::new(store, config.bucket.as_str())?;

    merger.apply(&Source::defaults())?;
    merger.apply(&Source::from_file(&config.yaml_path, Format::Yaml)?)?;
    merger.apply(&Source::from_file(&config.json_path, Format::Json)?)?;

    Ok(merger.finish())
}
