// Copyright (c) 2023-2025 Strtr Developers
// Distributed under the MIT software license

//! Event bucket

use std::cmp::Ordering;

use strtr_proto::Filter;

use super::event::{event_cmp, SharedEvent};

/// A sequence of shared events kept sorted ascending by the event ordering
#[derive(Debug, Default)]
pub struct EventBucket {
    events: Vec<SharedEvent>,
}

impl EventBucket {
    /// New empty bucket
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an event, sifting it backward until the bucket is sorted
    /// again.
    ///
    /// Amortized O(1) while arrivals are near-monotonic in `created_at`,
    /// O(n) in the worst case.
    pub fn insert(&mut self, event: SharedEvent) {
        self.events.push(event);
        let mut i: usize = self.events.len() - 1;
        while i > 0
            && event_cmp(self.events[i - 1].event(), self.events[i].event()) == Ordering::Greater
        {
            self.events.swap(i - 1, i);
            i -= 1;
        }
    }

    /// Number of events (deleted ones included)
    #[inline]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if the bucket is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Iterate matching, non-deleted events in descending time order.
    ///
    /// The walk starts at the newest event with `created_at <= until` and
    /// stops at the first event older than `since`.
    pub fn query<'a>(&'a self, filter: &'a Filter) -> BucketQuery<'a> {
        let start: usize = match filter.until {
            Some(until) => self.events.partition_point(|ev| ev.created_at() <= until),
            None => self.events.len(),
        };
        BucketQuery {
            events: &self.events,
            pos: start,
            filter,
        }
    }
}

/// Descending iterator returned by [`EventBucket::query`]
#[derive(Debug)]
pub struct BucketQuery<'a> {
    events: &'a [SharedEvent],
    pos: usize,
    filter: &'a Filter,
}

impl<'a> Iterator for BucketQuery<'a> {
    type Item = &'a SharedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos > 0 {
            self.pos -= 1;
            let ev: &SharedEvent = &self.events[self.pos];

            if let Some(since) = self.filter.since {
                if ev.created_at() < since {
                    self.pos = 0;
                    return None;
                }
            }

            if ev.is_deleted() {
                continue;
            }

            if self.filter.match_event(ev.event()) {
                return Some(ev);
            }
        }

        None
    }
}
