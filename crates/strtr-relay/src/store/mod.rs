// Copyright (c) 2023-2025 Strtr Developers
// Distributed under the MIT software license

//! In-memory event store
//!
//! One global time-sorted bucket plus four secondary indices (author,
//! kind, `e` tag, `p` tag) over shared event instances. Deletion flips a
//! flag on the shared instance instead of unlinking it from every bucket.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use strtr_proto::{Event, EventAddr, EventId, Filter, Kind, PublicKey, SingleLetterTag};
use tokio::sync::RwLock;

pub mod bucket;
pub mod event;
pub mod index;
mod merge;
pub mod replaceable;

pub use self::bucket::{BucketQuery, EventBucket};
pub use self::event::{event_cmp, is_newer, SharedEvent, StoredEvent};
pub use self::index::KeyedIndex;
pub use self::replaceable::{Replacement, ReplaceableTracker};

/// Default and maximum number of events one filter may return
pub const MAX_LIMIT: usize = 500;

/// Insertion outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertStatus {
    /// Newly admitted
    Stored,
    /// An event with this id is already present; nothing changed
    Duplicate,
    /// This id was deleted earlier; the re-submission is rejected
    Deleted,
}

#[derive(Debug, Default)]
struct InnerStore {
    events_by_id: HashMap<EventId, SharedEvent>,
    all_events: EventBucket,
    author_index: KeyedIndex<PublicKey>,
    kind_index: KeyedIndex<Kind>,
    e_tag_index: KeyedIndex<String>,
    p_tag_index: KeyedIndex<String>,
    replaceable: ReplaceableTracker,
    deleted_ids: HashSet<EventId>,
}

impl InnerStore {
    /// Insert a verified, semantically valid, non-ephemeral event.
    fn insert(&mut self, event: &Event) -> InsertStatus {
        if self.events_by_id.contains_key(&event.id) {
            return InsertStatus::Duplicate;
        }

        if self.deleted_ids.contains(&event.id) {
            return InsertStatus::Deleted;
        }

        // A deletion event is stored like any regular event, then its
        // targets are resolved. It never deletes other deletion events and
        // never events of other authors.
        if event.kind == Kind::EVENT_DELETION {
            self.store(event.clone());

            let requester: PublicKey = event.pubkey;

            let targets: Vec<EventId> = event.tags.event_ids().collect();
            for id in targets {
                if self.delete_by_id(&id, &requester) {
                    self.deleted_ids.insert(id);
                }
            }

            let addrs: Vec<EventAddr> = event.tags.addresses().collect();
            for addr in addrs {
                self.delete_by_addr(&addr, &requester);
            }

            return InsertStatus::Stored;
        }

        match event.addr() {
            Some(addr) => {
                let Replacement {
                    overwritten,
                    to_store,
                    ..
                } = self.replaceable.replace(addr, event);
                if let Some(winner) = to_store {
                    self.store(winner);
                }
                if let Some(loser) = overwritten {
                    self.delete_by_id(&loser.id, &event.pubkey);
                }
            }
            None => self.store(event.clone()),
        }

        InsertStatus::Stored
    }

    /// Wrap the event and link the one shared instance into the id map,
    /// the global bucket and every applicable index bucket.
    fn store(&mut self, event: Event) {
        let id: EventId = event.id;
        let author: PublicKey = event.pubkey;
        let kind: Kind = event.kind;
        let e_values: HashSet<String> = event.tags.values("e").map(String::from).collect();
        let p_values: HashSet<String> = event.tags.values("p").map(String::from).collect();

        let shared: SharedEvent = StoredEvent::new(event);

        self.events_by_id.insert(id, shared.clone());
        self.all_events.insert(shared.clone());
        self.author_index.insert(author, shared.clone());
        self.kind_index.insert(kind, shared.clone());
        for value in e_values {
            self.e_tag_index.insert(value, shared.clone());
        }
        for value in p_values {
            self.p_tag_index.insert(value, shared.clone());
        }
    }

    /// Flag the event deleted on behalf of `requester`.
    ///
    /// Fails when the id is unknown, the requester is not the author, or
    /// the target is itself a deletion event.
    fn delete_by_id(&mut self, id: &EventId, requester: &PublicKey) -> bool {
        match self.events_by_id.get(id) {
            Some(stored)
                if stored.event().pubkey == *requester
                    && stored.event().kind != Kind::EVENT_DELETION =>
            {
                stored.mark_deleted();
                true
            }
            _ => false,
        }
    }

    /// Retract the retained event at a replaceable address on behalf of
    /// `requester`. A foreign or unoccupied address is a no-op.
    fn delete_by_addr(&mut self, addr: &EventAddr, requester: &PublicKey) -> bool {
        let owned: bool =
            matches!(self.replaceable.get(addr), Some(retained) if retained.pubkey == *requester);
        if !owned {
            return false;
        }

        match self.replaceable.delete(addr) {
            Some(removed) => self.delete_by_id(&removed.id, requester),
            None => false,
        }
    }

    /// Pick the cheapest way to answer a filter: the id path and the
    /// no-selective-field path scan the global bucket; otherwise the
    /// candidate with the smallest total size wins, ties broken by fewer
    /// buckets.
    fn candidate_buckets<'a>(&'a self, filter: &Filter) -> Vec<&'a EventBucket> {
        if filter.ids.is_some() {
            return vec![&self.all_events];
        }

        let mut candidates: Vec<(Vec<&EventBucket>, usize)> = Vec::new();

        if let Some(authors) = &filter.authors {
            candidates.push(self.author_index.candidates(authors));
        }

        if let Some(kinds) = &filter.kinds {
            candidates.push(self.kind_index.candidates(kinds));
        }

        if let Some(values) = filter.generic_tags.get(&SingleLetterTag::E) {
            candidates.push(self.e_tag_index.candidates(values));
        }

        if let Some(values) = filter.generic_tags.get(&SingleLetterTag::P) {
            candidates.push(self.p_tag_index.candidates(values));
        }

        match candidates
            .into_iter()
            .min_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.len().cmp(&b.0.len())))
        {
            Some((buckets, _)) => buckets,
            None => vec![&self.all_events],
        }
    }

    /// Answer one filter, newest first, up to `min(limit, 500)` events.
    fn query_filter(&self, filter: &Filter) -> Vec<Event> {
        if filter.is_unsatisfiable() {
            return Vec::new();
        }

        let limit: usize = filter.limit.map_or(MAX_LIMIT, |limit| limit.min(MAX_LIMIT));
        if limit == 0 {
            return Vec::new();
        }

        let buckets: Vec<&EventBucket> = self.candidate_buckets(filter);
        match buckets.as_slice() {
            [] => Vec::new(),
            [bucket] => bucket
                .query(filter)
                .take(limit)
                .map(|ev| ev.event().clone())
                .collect(),
            _ => merge::merge_query(&buckets, filter, limit),
        }
    }

    fn event_by_id(&self, id: &EventId) -> Option<&Event> {
        let stored: &SharedEvent = self.events_by_id.get(id)?;
        if stored.is_deleted() {
            return None;
        }
        Some(stored.event())
    }
}

/// In-memory event store shared between connections.
///
/// All mutation serializes through one write lock; the deletion flag is
/// atomic so readers observe it without re-locking.
#[derive(Debug, Clone, Default)]
pub struct EventStore {
    inner: Arc<RwLock<InnerStore>>,
}

impl EventStore {
    /// New empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an event.
    ///
    /// The event must already be verified and semantically valid, and must
    /// not be ephemeral.
    pub async fn insert(&self, event: &Event) -> InsertStatus {
        let mut inner = self.inner.write().await;
        inner.insert(event)
    }

    /// All events matching any of the filters.
    ///
    /// Each filter independently yields up to `min(limit, 500)` events in
    /// descending time order; results are concatenated per filter.
    pub async fn query(&self, filters: &[Filter]) -> Vec<Event> {
        let inner = self.inner.read().await;
        let mut events: Vec<Event> = Vec::new();
        for filter in filters {
            events.extend(inner.query_filter(filter));
        }
        events
    }

    /// Get a non-deleted event by id
    pub async fn event_by_id(&self, id: &EventId) -> Option<Event> {
        let inner = self.inner.read().await;
        inner.event_by_id(id).cloned()
    }
}
