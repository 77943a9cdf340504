// Copyright (c) 2023-2025 Strtr Developers
// Distributed under the MIT software license

//! Stored event

use std::cmp::Ordering;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;

use strtr_proto::{Event, EventId, Timestamp};

/// The shared stored-event instance.
///
/// Every bucket and index holds the same [`Arc`] for a given id, so
/// flipping the deleted bit on one is observed by all readers.
pub type SharedEvent = Arc<StoredEvent>;

/// An admitted event together with its deletion flag
#[derive(Debug)]
pub struct StoredEvent {
    event: Event,
    deleted: AtomicBool,
}

impl StoredEvent {
    /// Wrap an event into a new shared instance
    pub fn new(event: Event) -> SharedEvent {
        Arc::new(Self {
            event,
            deleted: AtomicBool::new(false),
        })
    }

    /// The wrapped event
    #[inline]
    pub fn event(&self) -> &Event {
        &self.event
    }

    /// Event id
    #[inline]
    pub fn id(&self) -> EventId {
        self.event.id
    }

    /// Event timestamp
    #[inline]
    pub fn created_at(&self) -> Timestamp {
        self.event.created_at
    }

    /// Check the deletion flag
    #[inline]
    pub fn is_deleted(&self) -> bool {
        self.deleted.load(AtomicOrdering::SeqCst)
    }

    /// Flip the deletion flag
    #[inline]
    pub(crate) fn mark_deleted(&self) {
        self.deleted.store(true, AtomicOrdering::SeqCst);
    }
}

/// Total order on events used for bucket sorting and replacement: a later
/// `created_at` wins, ties go to the lexicographically smaller id.
pub fn event_cmp(a: &Event, b: &Event) -> Ordering {
    a.created_at
        .cmp(&b.created_at)
        .then_with(|| b.id.cmp(&a.id))
}

/// Check if `a` wins over `b` by the event ordering
#[inline]
pub fn is_newer(a: &Event, b: &Event) -> bool {
    event_cmp(a, b) == Ordering::Greater
}
