// Copyright (c) 2023-2025 Strtr Developers
// Distributed under the MIT software license

//! Messages sent by the relay, received by clients

use serde_json::json;

use super::SubscriptionId;
use crate::event::id::EventId;
use crate::event::Event;

/// Messages sent by the relay, received by clients
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayMessage {
    /// `["EVENT", <subscription id>, <event>]`
    Event {
        /// Subscription id
        subscription_id: SubscriptionId,
        /// Event
        event: Box<Event>,
    },
    /// `["OK", <event id>, <accepted>, <message>]`
    Ok {
        /// Event id
        event_id: EventId,
        /// Whether the event was accepted
        status: bool,
        /// Machine-readable outcome message
        message: String,
    },
    /// `["EOSE", <subscription id>]`
    EndOfStoredEvents {
        /// Subscription id
        subscription_id: SubscriptionId,
    },
    /// `["CLOSED", <subscription id>, <message>]`
    Closed {
        /// Subscription id
        subscription_id: SubscriptionId,
        /// Reason the subscription was not kept
        message: String,
    },
    /// `["NOTICE", <message>]`
    Notice {
        /// Message
        message: String,
    },
}

impl RelayMessage {
    /// Compose an `EVENT` message
    #[inline]
    pub fn event(subscription_id: SubscriptionId, event: Event) -> Self {
        Self::Event {
            subscription_id,
            event: Box::new(event),
        }
    }

    /// Compose an `OK` message
    pub fn ok<S>(event_id: EventId, status: bool, message: S) -> Self
    where
        S: Into<String>,
    {
        Self::Ok {
            event_id,
            status,
            message: message.into(),
        }
    }

    /// Compose an `EOSE` message
    #[inline]
    pub fn eose(subscription_id: SubscriptionId) -> Self {
        Self::EndOfStoredEvents { subscription_id }
    }

    /// Compose a `CLOSED` message
    pub fn closed<S>(subscription_id: SubscriptionId, message: S) -> Self
    where
        S: Into<String>,
    {
        Self::Closed {
            subscription_id,
            message: message.into(),
        }
    }

    /// Compose a `NOTICE` message
    pub fn notice<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self::Notice {
            message: message.into(),
        }
    }

    /// Serialize as a JSON array
    pub fn as_json(&self) -> String {
        match self {
            Self::Event {
                subscription_id,
                event,
            } => json!(["EVENT", subscription_id, event]).to_string(),
            Self::Ok {
                event_id,
                status,
                message,
            } => json!(["OK", event_id, status, message]).to_string(),
            Self::EndOfStoredEvents { subscription_id } => {
                json!(["EOSE", subscription_id]).to_string()
            }
            Self::Closed {
                subscription_id,
                message,
            } => json!(["CLOSED", subscription_id, message]).to_string(),
            Self::Notice { message } => json!(["NOTICE", message]).to_string(),
        }
    }
}
