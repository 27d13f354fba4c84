//! Keyspace Module
//!
//! In-memory view of every bucket, rebuilt from the log on open.
//!
//! ## Data Structure Choice
//! Nested BTreeMaps wrapped in one RwLock:
//! - Ordered keys (for listing)
//! - A read guard is a consistent snapshot of all buckets
//! - A commit applies every operation of a transaction under one write guard,
//!   so readers never observe half a transaction

use std::collections::BTreeMap;

use parking_lot::{RwLock, RwLockReadGuard};

use crate::wal::Operation;

/// Entries of a single bucket, ordered by key
pub type Bucket = BTreeMap<Vec<u8>, Vec<u8>>;

/// All buckets, by name
pub type Buckets = BTreeMap<String, Bucket>;

/// In-memory state shared by all transactions
#[derive(Default)]
pub struct Keyspace {
    buckets: RwLock<Buckets>,
}

impl Keyspace {
    /// Create an empty keyspace
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the operations of one committed transaction atomically
    pub fn apply(&self, ops: &[Operation]) {
        let mut buckets = self.buckets.write();
        for op in ops {
            apply_op(&mut buckets, op);
        }
    }

    /// Take a read snapshot
    pub fn read(&self) -> RwLockReadGuard<'_, Buckets> {
        self.buckets.read()
    }

    /// Number of buckets
    pub fn bucket_count(&self) -> usize {
        self.buckets.read().len()
    }

    /// Number of entries across all buckets
    pub fn entry_count(&self) -> usize {
        self.buckets.read().values().map(BTreeMap::len).sum()
    }
}

fn apply_op(buckets: &mut Buckets, op: &Operation) {
    match op {
        Operation::CreateBucket { name } => {
            buckets.entry(name.clone()).or_default();
        }
        Operation::Put { bucket, key, value } => {
            buckets
                .entry(bucket.clone())
                .or_default()
                .insert(key.clone(), value.clone());
        }
    }
}
