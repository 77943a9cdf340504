// Copyright (c) 2023-2025 Strtr Developers
// Distributed under the MIT software license

//! Secondary index

use std::collections::HashMap;
use std::hash::Hash;

use super::bucket::EventBucket;
use super::event::SharedEvent;

/// Secondary index: maps an index key to the bucket of events carrying it
#[derive(Debug)]
pub struct KeyedIndex<K> {
    buckets: HashMap<K, EventBucket>,
}

impl<K> Default for KeyedIndex<K> {
    fn default() -> Self {
        Self {
            buckets: HashMap::new(),
        }
    }
}

impl<K> KeyedIndex<K>
where
    K: Eq + Hash,
{
    /// New empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the shared event into the bucket for `key`, creating the
    /// bucket on first use.
    pub fn insert(&mut self, key: K, event: SharedEvent) {
        self.buckets.entry(key).or_default().insert(event);
    }

    /// Bucket for a single key
    #[inline]
    pub fn bucket(&self, key: &K) -> Option<&EventBucket> {
        self.buckets.get(key)
    }

    /// Buckets for the given keys (missing keys skipped), together with
    /// their total size.
    pub fn candidates<'a, 'k, I>(&'a self, keys: I) -> (Vec<&'a EventBucket>, usize)
    where
        I: IntoIterator<Item = &'k K>,
        K: 'k,
    {
        let mut buckets: Vec<&EventBucket> = Vec::new();
        let mut total: usize = 0;
        for key in keys.into_iter() {
            if let Some(bucket) = self.buckets.get(key) {
                total += bucket.len();
                buckets.push(bucket);
            }
        }
        (buckets, total)
    }
}
