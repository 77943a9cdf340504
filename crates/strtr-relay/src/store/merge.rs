// Copyright (c) 2023-2025 Strtr Developers
// Distributed under the MIT software license

//! Merged descending iteration over multiple buckets

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use strtr_proto::{Event, EventId, Filter};

use super::bucket::{BucketQuery, EventBucket};
use super::event::{event_cmp, SharedEvent};

/// Head of one bucket cursor. The heap is a max-heap over the event
/// ordering, so the newest head pops first. Cursors live outside the heap;
/// a head only carries its cursor's index.
struct Head<'a> {
    event: &'a SharedEvent,
    cursor: usize,
}

impl PartialEq for Head<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Head<'_> {}

impl PartialOrd for Head<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Head<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        event_cmp(self.event.event(), other.event.event())
    }
}

/// Walk all buckets at once, newest first, deduplicating by id.
///
/// Every bucket iterator already applies the filter; the seen-set only
/// guards against the same event reached through different buckets.
pub(super) fn merge_query(buckets: &[&EventBucket], filter: &Filter, limit: usize) -> Vec<Event> {
    let mut cursors: Vec<BucketQuery<'_>> = buckets.iter().map(|b| b.query(filter)).collect();

    let mut heap: BinaryHeap<Head<'_>> = BinaryHeap::with_capacity(cursors.len());
    for (cursor, query) in cursors.iter_mut().enumerate() {
        if let Some(event) = query.next() {
            heap.push(Head { event, cursor });
        }
    }

    let mut seen: HashSet<EventId> = HashSet::new();
    let mut out: Vec<Event> = Vec::new();

    while out.len() < limit {
        let Head { event, cursor } = match heap.pop() {
            Some(head) => head,
            None => break,
        };

        if seen.insert(event.id()) {
            out.push(event.event().clone());
        }

        if let Some(next) = cursors[cursor].next() {
            heap.push(Head {
                event: next,
                cursor,
            });
        }
    }

    out
}
