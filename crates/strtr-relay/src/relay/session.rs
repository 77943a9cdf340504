// Copyright (c) 2023-2025 Strtr Developers
// Distributed under the MIT software license

//! Per-connection coordinator

use std::collections::HashSet;

use strtr_proto::{ClientMessage, Filter, MessageError, RelayMessage, SubscriptionId};
use tokio::sync::mpsc;

use crate::ingest::Ingestor;
use crate::pool::{ClientId, Subscription, SubscriptionPool};
use crate::store::EventStore;

/// State and message dispatch of one accepted client.
///
/// Every outbound frame goes through the session's channel, so responses
/// to a request and pool broadcasts reach the socket in production order.
pub(crate) struct Session {
    client_id: ClientId,
    store: EventStore,
    pool: SubscriptionPool,
    ingestor: Ingestor,
    subscriptions: HashSet<SubscriptionId>,
    tx: mpsc::UnboundedSender<RelayMessage>,
}

impl Session {
    pub(crate) fn new(
        client_id: ClientId,
        store: EventStore,
        pool: SubscriptionPool,
        ingestor: Ingestor,
        tx: mpsc::UnboundedSender<RelayMessage>,
    ) -> Self {
        Self {
            client_id,
            store,
            pool,
            ingestor,
            subscriptions: HashSet::new(),
            tx,
        }
    }

    fn send(&self, msg: RelayMessage) {
        let _ = self.tx.send(msg);
    }

    pub(crate) fn notice<S>(&self, message: S)
    where
        S: Into<String>,
    {
        self.send(RelayMessage::notice(message));
    }

    /// Dispatch one inbound text frame. A frame that fails to parse is
    /// answered with a `NOTICE`; the connection stays open either way.
    pub(crate) async fn handle_frame(&mut self, raw: &str) {
        match ClientMessage::from_json(raw) {
            Ok(msg) => self.handle_client_msg(msg).await,
            Err(MessageError::UnsupportedType(tag)) => {
                self.notice(format!("unsupported message type: {tag}"));
            }
            Err(MessageError::Malformed) => {
                self.notice(format!("malformed message: {raw}"));
            }
        }
    }

    async fn handle_client_msg(&mut self, msg: ClientMessage) {
        match msg {
            ClientMessage::Event(event) => {
                let event_id = event.id;
                let outcome = self.ingestor.ingest(*event).await;
                self.send(RelayMessage::ok(event_id, outcome.accepted, outcome.message));
            }
            ClientMessage::Req {
                subscription_id,
                filters,
            } => {
                let events = self.store.query(&filters).await;
                tracing::debug!(
                    "found {} events for subscription '{subscription_id}'",
                    events.len()
                );

                for event in events {
                    self.send(RelayMessage::event(subscription_id.clone(), event));
                }
                self.send(RelayMessage::eose(subscription_id.clone()));

                let effective: Vec<Filter> = filters
                    .into_iter()
                    .filter(|filter| !filter.is_unsatisfiable() && filter.limit != Some(0))
                    .collect();

                if effective.is_empty() {
                    self.send(RelayMessage::closed(
                        subscription_id,
                        "error: no effective filter",
                    ));
                    return;
                }

                self.pool
                    .register(
                        self.client_id,
                        subscription_id.clone(),
                        Subscription::new(effective, self.tx.clone()),
                    )
                    .await;
                self.subscriptions.insert(subscription_id);
            }
            ClientMessage::Close(subscription_id) => {
                if self.subscriptions.remove(&subscription_id) {
                    self.pool.unregister(self.client_id, &subscription_id).await;
                }
            }
        }
    }

    /// Connection teardown: every subscription of this client leaves the
    /// pool.
    pub(crate) async fn teardown(&mut self) {
        self.subscriptions.clear();
        self.pool.unregister_client(self.client_id).await;
    }
}
