// Copyright (c) 2023-2025 Strtr Developers
// Distributed under the MIT software license

//! Subscription pool

use core::fmt;
use std::collections::HashMap;
use std::sync::Arc;

use strtr_proto::{Event, Filter, RelayMessage, SubscriptionId};
use tokio::sync::mpsc;
use tokio::sync::RwLock;

/// Identifier of one accepted connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClientId(u64);

impl ClientId {
    /// Construct from a connection counter value
    #[inline]
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "client-{}", self.0)
    }
}

/// A live subscription: its filters plus the outbound channel of the
/// connection that issued it.
#[derive(Debug, Clone)]
pub struct Subscription {
    filters: Vec<Filter>,
    sender: mpsc::UnboundedSender<RelayMessage>,
}

impl Subscription {
    /// New subscription over the given filters
    pub fn new(filters: Vec<Filter>, sender: mpsc::UnboundedSender<RelayMessage>) -> Self {
        Self { filters, sender }
    }

    /// Check the event against the subscription's filters
    #[inline]
    pub fn matches(&self, event: &Event) -> bool {
        self.filters.iter().any(|filter| filter.match_event(event))
    }
}

/// Registry of live subscriptions keyed by `(client, subscription id)`
#[derive(Debug, Clone, Default)]
pub struct SubscriptionPool {
    inner: Arc<RwLock<HashMap<(ClientId, SubscriptionId), Subscription>>>,
}

impl SubscriptionPool {
    /// New empty pool
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscription. A subscription already present under the
    /// same key is replaced.
    pub async fn register(
        &self,
        client_id: ClientId,
        subscription_id: SubscriptionId,
        subscription: Subscription,
    ) {
        let mut inner = self.inner.write().await;
        inner.insert((client_id, subscription_id), subscription);
    }

    /// Remove one subscription. Removing an absent key is a no-op.
    pub async fn unregister(&self, client_id: ClientId, subscription_id: &SubscriptionId) {
        let mut inner = self.inner.write().await;
        inner.remove(&(client_id, subscription_id.clone()));
    }

    /// Remove every subscription of a client (connection teardown)
    pub async fn unregister_client(&self, client_id: ClientId) {
        let mut inner = self.inner.write().await;
        inner.retain(|(client, _), _| *client != client_id);
    }

    /// Deliver a newly admitted event to every matching subscription.
    ///
    /// A send failure means the receiving connection is gone; its
    /// subscription is dropped from the pool.
    pub async fn broadcast(&self, event: &Event) {
        let mut stale: Vec<(ClientId, SubscriptionId)> = Vec::new();

        {
            let inner = self.inner.read().await;
            for ((client_id, subscription_id), subscription) in inner.iter() {
                if !subscription.matches(event) {
                    continue;
                }

                let msg = RelayMessage::event(subscription_id.clone(), event.clone());
                if subscription.sender.send(msg).is_err() {
                    stale.push((*client_id, subscription_id.clone()));
                }
            }
        }

        if !stale.is_empty() {
            let mut inner = self.inner.write().await;
            for key in stale {
                inner.remove(&key);
            }
        }
    }

    /// Number of live subscriptions
    pub async fn len(&self) -> usize {
        let inner = self.inner.read().await;
        inner.len()
    }

    /// Check if no subscription is registered
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
