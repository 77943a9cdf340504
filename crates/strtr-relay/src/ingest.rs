// Copyright (c) 2023-2025 Strtr Developers
// Distributed under the MIT software license

//! Ingestor: the single entry point events take into the relay

use std::sync::Arc;

use strtr_proto::Event;
use tokio::sync::Mutex;

use crate::pool::SubscriptionPool;
use crate::store::{EventStore, InsertStatus};

/// Outcome of ingesting one event, surfaced to the client via `OK`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOutcome {
    /// Whether the event was accepted
    pub accepted: bool,
    /// Machine-readable message (empty on plain success)
    pub message: String,
}

impl IngestOutcome {
    fn accepted() -> Self {
        Self {
            accepted: true,
            message: String::new(),
        }
    }

    fn rejected<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            accepted: false,
            message: message.into(),
        }
    }
}

/// Validates an inbound event, routes it to the store and fans it out to
/// live subscriptions.
#[derive(Debug, Clone)]
pub struct Ingestor {
    store: EventStore,
    pool: SubscriptionPool,
    // One event is stored *and* broadcast before the next one starts.
    gate: Arc<Mutex<()>>,
}

impl Ingestor {
    /// New ingestor over the given store and pool
    pub fn new(store: EventStore, pool: SubscriptionPool) -> Self {
        Self {
            store,
            pool,
            gate: Arc::new(Mutex::new(())),
        }
    }

    /// Ingest one event.
    ///
    /// Rejected events (bad signature, semantic failure, previously
    /// deleted) are neither stored nor broadcast. A duplicate is reported
    /// as accepted but changes nothing and is not re-broadcast. Ephemeral
    /// events skip the store entirely.
    pub async fn ingest(&self, event: Event) -> IngestOutcome {
        if !event.verify_id() || !event.verify_signature() {
            return IngestOutcome::rejected("error: invalid signature");
        }

        if event.kind.is_addressable() && event.tags.identifier().is_none() {
            return IngestOutcome::rejected("error: no d-tag in parametarized replaceable event");
        }

        let _guard = self.gate.lock().await;

        if !event.kind.is_ephemeral() {
            match self.store.insert(&event).await {
                InsertStatus::Stored => {}
                InsertStatus::Duplicate => {
                    return IngestOutcome {
                        accepted: true,
                        message: "duplicate: already have this event".to_string(),
                    };
                }
                InsertStatus::Deleted => {
                    return IngestOutcome::rejected("error: already deleted this event");
                }
            }
        }

        self.pool.broadcast(&event).await;

        IngestOutcome::accepted()
    }
}

#[cfg(test)]
mod tests {
    use strtr_proto::{
        EventBuilder, Filter, Keys, Kind, RelayMessage, SubscriptionId, Timestamp,
    };
    use tokio::sync::mpsc;

    use super::*;
    use crate::pool::{ClientId, Subscription};

    fn setup() -> (Ingestor, EventStore, SubscriptionPool) {
        let store = EventStore::new();
        let pool = SubscriptionPool::new();
        let ingestor = Ingestor::new(store.clone(), pool.clone());
        (ingestor, store, pool)
    }

    async fn listen(
        pool: &SubscriptionPool,
        filters: Vec<Filter>,
    ) -> mpsc::UnboundedReceiver<RelayMessage> {
        let (tx, rx) = mpsc::unbounded_channel();
        pool.register(
            ClientId::new(0),
            SubscriptionId::new("test"),
            Subscription::new(filters, tx),
        )
        .await;
        rx
    }

    #[tokio::test]
    async fn test_rejects_bad_signature() {
        let (ingestor, store, _) = setup();
        let keys = Keys::generate();
        let mut event = EventBuilder::text_note("tampered").sign(&keys);
        event.content = "changed".to_string();

        let outcome = ingestor.ingest(event.clone()).await;
        assert!(!outcome.accepted);
        assert_eq!(outcome.message, "error: invalid signature");
        assert!(store.query(&[Filter::new()]).await.is_empty());
    }

    #[tokio::test]
    async fn test_rejects_addressable_without_d_tag() {
        let (ingestor, store, _) = setup();
        let keys = Keys::generate();
        let event = EventBuilder::new(Kind::new(30_000), "no d tag").sign(&keys);

        let outcome = ingestor.ingest(event).await;
        assert!(!outcome.accepted);
        assert_eq!(
            outcome.message,
            "error: no d-tag in parametarized replaceable event"
        );
        assert!(store.query(&[Filter::new()]).await.is_empty());
    }

    #[tokio::test]
    async fn test_accepts_and_broadcasts() {
        let (ingestor, store, pool) = setup();
        let keys = Keys::generate();
        let mut rx = listen(&pool, vec![Filter::new().kind(Kind::TEXT_NOTE)]).await;

        let event = EventBuilder::text_note("hello").sign(&keys);
        let outcome = ingestor.ingest(event.clone()).await;
        assert_eq!(outcome, IngestOutcome::accepted());

        assert_eq!(store.event_by_id(&event.id).await, Some(event.clone()));
        assert!(matches!(
            rx.try_recv().unwrap(),
            RelayMessage::Event { event: received, .. } if *received == event
        ));
    }

    #[tokio::test]
    async fn test_duplicate_not_rebroadcast() {
        let (ingestor, _, pool) = setup();
        let keys = Keys::generate();
        let event = EventBuilder::text_note("once").sign(&keys);

        ingestor.ingest(event.clone()).await;
        let mut rx = listen(&pool, vec![Filter::new()]).await;

        let outcome = ingestor.ingest(event).await;
        assert!(outcome.accepted);
        assert_eq!(outcome.message, "duplicate: already have this event");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_deleted_event_rejected_and_not_broadcast() {
        let (ingestor, _, pool) = setup();
        let keys = Keys::generate();
        let event = EventBuilder::text_note("gone")
            .custom_created_at(Timestamp::from_secs(100))
            .sign(&keys);
        let deletion = EventBuilder::delete([event.id]).sign(&keys);

        ingestor.ingest(event.clone()).await;
        ingestor.ingest(deletion).await;

        let mut rx = listen(&pool, vec![Filter::new()]).await;
        let outcome = ingestor.ingest(event).await;
        assert!(!outcome.accepted);
        assert_eq!(outcome.message, "error: already deleted this event");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_ephemeral_broadcast_only() {
        let (ingestor, store, pool) = setup();
        let keys = Keys::generate();
        let kind = Kind::new(20_000);
        let mut rx = listen(&pool, vec![Filter::new().kind(kind)]).await;

        let event = EventBuilder::new(kind, "now or never").sign(&keys);
        let outcome = ingestor.ingest(event.clone()).await;
        assert_eq!(outcome, IngestOutcome::accepted());

        // Fanned out but never stored
        assert!(rx.try_recv().is_ok());
        assert!(store.query(&[Filter::new().kind(kind)]).await.is_empty());
        assert_eq!(store.event_by_id(&event.id).await, None);
    }
}
