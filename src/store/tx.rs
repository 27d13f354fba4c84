//! Transactions
//!
//! - [`ReadTx`]: a read guard over the keyspace, i.e. a consistent snapshot
//! - [`WriteTx`]: staged operations plus an overlay of the staged values;
//!   nothing reaches the log or the keyspace until the store commits it

use std::collections::{BTreeMap, BTreeSet};

use parking_lot::RwLockReadGuard;

use crate::error::{Result, ShortenerError};
use crate::keyspace::{Bucket, Buckets, Keyspace};
use crate::wal::Operation;

/// Read-only transaction over a snapshot of all buckets
pub struct ReadTx<'a> {
    buckets: RwLockReadGuard<'a, Buckets>,
}

impl<'a> ReadTx<'a> {
    pub(crate) fn new(keyspace: &'a Keyspace) -> Self {
        Self {
            buckets: keyspace.read(),
        }
    }

    fn bucket(&self, name: &str) -> Result<&Bucket> {
        self.buckets
            .get(name)
            .ok_or_else(|| ShortenerError::BucketNotFound(name.to_string()))
    }

    /// Get a value by key
    ///
    /// Returns:
    /// - `Ok(Some(value))`: key found
    /// - `Ok(None)`: key not in the bucket
    /// - `Err(BucketNotFound)`: no such bucket
    pub fn get(&self, bucket: &str, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.bucket(bucket)?.get(key).cloned())
    }

    /// All entries of a bucket, ordered by key
    pub fn entries(&self, bucket: &str) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        Ok(self
            .bucket(bucket)?
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    pub fn bucket_exists(&self, bucket: &str) -> bool {
        self.buckets.contains_key(bucket)
    }

    pub fn bucket_names(&self) -> Vec<String> {
        self.buckets.keys().cloned().collect()
    }
}

/// Read-write transaction
///
/// Writers are serialized by the store, so committed state cannot change
/// while a `WriteTx` is alive.
pub struct WriteTx<'a> {
    committed: &'a Keyspace,
    ops: Vec<Operation>,
    created: BTreeSet<String>,
    staged: BTreeMap<(String, Vec<u8>), Vec<u8>>,
}

impl<'a> WriteTx<'a> {
    pub(crate) fn new(committed: &'a Keyspace) -> Self {
        Self {
            committed,
            ops: Vec::new(),
            created: BTreeSet::new(),
            staged: BTreeMap::new(),
        }
    }

    /// Whether the bucket exists, counting buckets created in this transaction
    pub fn bucket_exists(&self, bucket: &str) -> bool {
        self.created.contains(bucket) || self.committed.read().contains_key(bucket)
    }

    /// Create the bucket unless it already exists
    ///
    /// Returns `true` if the bucket was created by this call.
    pub fn create_bucket_if_not_exists(&mut self, bucket: &str) -> Result<bool> {
        if bucket.is_empty() {
            return Err(ShortenerError::Store("create bucket: name must not be empty".into()));
        }
        if self.bucket_exists(bucket) {
            return Ok(false);
        }

        self.created.insert(bucket.to_string());
        self.ops.push(Operation::CreateBucket {
            name: bucket.to_string(),
        });
        Ok(true)
    }

    /// Stage a put; a later put of the same key in this transaction wins
    pub fn put(&mut self, bucket: &str, key: &[u8], value: &[u8]) -> Result<()> {
        if !self.bucket_exists(bucket) {
            return Err(ShortenerError::BucketNotFound(bucket.to_string()));
        }
        if key.is_empty() {
            return Err(ShortenerError::Store("put: key must not be empty".into()));
        }

        self.staged
            .insert((bucket.to_string(), key.to_vec()), value.to_vec());
        self.ops.push(Operation::Put {
            bucket: bucket.to_string(),
            key: key.to_vec(),
            value: value.to_vec(),
        });
        Ok(())
    }

    /// Get a value, seeing this transaction's own staged writes
    pub fn get(&self, bucket: &str, key: &[u8]) -> Result<Option<Vec<u8>>> {
        if let Some(value) = self.staged.get(&(bucket.to_string(), key.to_vec())) {
            return Ok(Some(value.clone()));
        }
        if self.created.contains(bucket) {
            return Ok(None);
        }

        ReadTx::new(self.committed).get(bucket, key)
    }

    pub(crate) fn into_ops(self) -> Vec<Operation> {
        self.ops
    }
}
