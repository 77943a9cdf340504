// Copyright (c) 2023-2025 Strtr Developers
// Distributed under the MIT software license

//! End-to-end scenarios for the ingest pipeline: store, replaceable
//! reconciliation, deletion and live fan-out.

use strtr_relay::proto::{
    EventBuilder, Filter, Keys, Kind, RelayMessage, SubscriptionId, Tag, Timestamp,
};
use strtr_relay::{ClientId, EventStore, IngestOutcome, Ingestor, Subscription, SubscriptionPool};
use tokio::sync::mpsc;

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
        ClientId::new(42),
        SubscriptionId::new("scenario"),
        Subscription::new(filters, tx),
    )
    .await;
    rx
}

#[tokio::test]
async fn scenario_duplicate_submission() {
    let (ingestor, store, _) = setup();
    let keys = Keys::generate();
    let event = EventBuilder::text_note("first").sign(&keys);

    assert_eq!(
        ingestor.ingest(event.clone()).await,
        IngestOutcome {
            accepted: true,
            message: String::new(),
        }
    );
    assert_eq!(
        ingestor.ingest(event.clone()).await,
        IngestOutcome {
            accepted: true,
            message: "duplicate: already have this event".to_string(),
        }
    );

    let found = store.query(&[Filter::new().id(event.id)]).await;
    assert_eq!(found, vec![event]);
}

#[tokio::test]
async fn scenario_replaceable_overwrite() {
    let (ingestor, store, _) = setup();
    let keys = Keys::generate();

    let r1 = EventBuilder::new(Kind::METADATA, "{\"name\":\"one\"}")
        .custom_created_at(Timestamp::from_secs(100))
        .sign(&keys);
    let r2 = EventBuilder::new(Kind::METADATA, "{\"name\":\"two\"}")
        .custom_created_at(Timestamp::from_secs(101))
        .sign(&keys);

    assert!(ingestor.ingest(r1).await.accepted);
    assert!(ingestor.ingest(r2.clone()).await.accepted);

    let filter = Filter::new().author(keys.public_key()).kind(Kind::METADATA);
    assert_eq!(store.query(&[filter]).await, vec![r2]);
}

#[tokio::test]
async fn scenario_addressable_by_d_tag() {
    let (ingestor, store, _) = setup();
    let keys = Keys::generate();
    let kind = Kind::new(30_000);

    let p1 = EventBuilder::new(kind, "p1")
        .tag(Tag::identifier("x"))
        .custom_created_at(Timestamp::from_secs(1))
        .sign(&keys);
    let p2 = EventBuilder::new(kind, "p2")
        .tag(Tag::identifier("y"))
        .custom_created_at(Timestamp::from_secs(1))
        .sign(&keys);
    let p3 = EventBuilder::new(kind, "p3")
        .tag(Tag::identifier("x"))
        .custom_created_at(Timestamp::from_secs(2))
        .sign(&keys);

    for event in [p1, p2.clone(), p3.clone()] {
        assert!(ingestor.ingest(event).await.accepted);
    }

    let filter = Filter::new().kinds([kind]).author(keys.public_key());
    assert_eq!(store.query(&[filter]).await, vec![p3, p2]);
}

#[tokio::test]
async fn scenario_deletion_happy_path() {
    let (ingestor, store, _) = setup();
    let keys = Keys::generate();

    let e1 = EventBuilder::text_note("to be deleted")
        .custom_created_at(Timestamp::from_secs(100))
        .sign(&keys);
    assert!(ingestor.ingest(e1.clone()).await.accepted);

    let deletion = EventBuilder::delete([e1.id]).sign(&keys);
    assert!(ingestor.ingest(deletion).await.accepted);

    assert!(store.query(&[Filter::new().id(e1.id)]).await.is_empty());

    let outcome = ingestor.ingest(e1).await;
    assert!(!outcome.accepted);
    assert_eq!(outcome.message, "error: already deleted this event");
}

#[tokio::test]
async fn scenario_deletion_by_non_author_rejected() {
    let (ingestor, store, _) = setup();
    let alice = Keys::generate();
    let bob = Keys::generate();

    let e1 = EventBuilder::text_note("alice's note").sign(&alice);
    assert!(ingestor.ingest(e1.clone()).await.accepted);

    let deletion = EventBuilder::delete([e1.id]).sign(&bob);
    assert!(ingestor.ingest(deletion).await.accepted);

    assert_eq!(store.query(&[Filter::new().id(e1.id)]).await, vec![e1]);
}

#[tokio::test]
async fn scenario_ephemeral_fan_out_only() {
    let (ingestor, store, pool) = setup();
    let keys = Keys::generate();
    let kind = Kind::new(20_000);

    let mut rx = listen(&pool, vec![Filter::new().kinds([kind])]).await;

    let eph = EventBuilder::new(kind, "gone in a blink").sign(&keys);
    assert!(ingestor.ingest(eph.clone()).await.accepted);

    match rx.try_recv().expect("subscription must receive the event") {
        RelayMessage::Event { event, .. } => assert_eq!(*event, eph),
        other => panic!("unexpected message: {other:?}"),
    }

    assert!(store.query(&[Filter::new().kinds([kind])]).await.is_empty());
}

#[tokio::test]
async fn scenario_merged_index_dedup() {
    let (ingestor, store, _) = setup();
    let keys = Keys::generate();
    let target = Keys::generate();

    let referenced = EventBuilder::text_note("referenced").sign(&keys);
    let event = EventBuilder::text_note("overlapping tags")
        .tag(Tag::event(referenced.id))
        .tag(Tag::public_key(target.public_key()))
        .sign(&keys);
    assert!(ingestor.ingest(event.clone()).await.accepted);

    let filter = Filter::new()
        .event(referenced.id)
        .pubkey(target.public_key());
    assert_eq!(store.query(&[filter]).await, vec![event]);
}

#[tokio::test]
async fn scenario_limit_cap() {
    let (ingestor, store, _) = setup();
    let keys = Keys::generate();

    for secs in 0..800u64 {
        let event = EventBuilder::text_note(format!("note {secs}"))
            .custom_created_at(Timestamp::from_secs(secs))
            .sign(&keys);
        assert!(ingestor.ingest(event).await.accepted);
    }

    let filter = Filter::new().author(keys.public_key());
    assert_eq!(store.query(&[filter.clone()]).await.len(), 500);
    assert_eq!(store.query(&[filter.clone().limit(100)]).await.len(), 100);
    assert!(store.query(&[filter.limit(0)]).await.is_empty());
}
