// Copyright (c) 2023-2025 Strtr Developers
// Distributed under the MIT software license

//! Messages sent by clients, received by the relay

use serde_json::{json, Value};

use super::{MessageError, SubscriptionId};
use crate::event::Event;
use crate::filter::Filter;

/// Messages sent by clients, received by the relay
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    /// `["EVENT", <event>]`
    Event(Box<Event>),
    /// `["REQ", <subscription id>, <filter>, <filter>, ...]`
    Req {
        /// Subscription id
        subscription_id: SubscriptionId,
        /// Filters (at least one)
        filters: Vec<Filter>,
    },
    /// `["CLOSE", <subscription id>]`
    Close(SubscriptionId),
}

impl ClientMessage {
    /// Compose an `EVENT` message
    #[inline]
    pub fn event(event: Event) -> Self {
        Self::Event(Box::new(event))
    }

    /// Compose a `REQ` message
    #[inline]
    pub fn req(subscription_id: SubscriptionId, filters: Vec<Filter>) -> Self {
        Self::Req {
            subscription_id,
            filters,
        }
    }

    /// Compose a `CLOSE` message
    #[inline]
    pub fn close(subscription_id: SubscriptionId) -> Self {
        Self::Close(subscription_id)
    }

    /// Serialize as a JSON array
    pub fn as_json(&self) -> String {
        match self {
            Self::Event(event) => json!(["EVENT", event]).to_string(),
            Self::Req {
                subscription_id,
                filters,
            } => {
                let mut json = json!(["REQ", subscription_id]);
                let mut filters = json!(filters);

                if let Some(json) = json.as_array_mut() {
                    if let Some(filters) = filters.as_array_mut() {
                        json.append(filters);
                    }
                }

                json.to_string()
            }
            Self::Close(subscription_id) => json!(["CLOSE", subscription_id]).to_string(),
        }
    }

    /// Parse a message from a JSON array frame.
    ///
    /// A frame whose tag is a string this relay doesn't serve (`"AUTH"`,
    /// `"COUNT"`, ...) fails with [`MessageError::UnsupportedType`];
    /// anything else that doesn't parse fails with
    /// [`MessageError::Malformed`].
    pub fn from_json<S>(json: S) -> Result<Self, MessageError>
    where
        S: AsRef<str>,
    {
        let v: Vec<Value> =
            serde_json::from_str(json.as_ref()).map_err(|_| MessageError::Malformed)?;

        let tag: &str = v
            .first()
            .and_then(|tag| tag.as_str())
            .ok_or(MessageError::Malformed)?;

        match tag {
            // ["EVENT", <event>]
            "EVENT" => {
                if v.len() != 2 {
                    return Err(MessageError::Malformed);
                }
                let event: Event =
                    serde_json::from_value(v[1].clone()).map_err(|_| MessageError::Malformed)?;
                Ok(Self::event(event))
            }
            // ["REQ", <subscription id>, <filter>, ...]
            "REQ" => {
                if v.len() < 3 {
                    return Err(MessageError::Malformed);
                }
                let subscription_id: SubscriptionId =
                    serde_json::from_value(v[1].clone()).map_err(|_| MessageError::Malformed)?;
                let filters: Vec<Filter> = v[2..]
                    .iter()
                    .map(|value| serde_json::from_value(value.clone()))
                    .collect::<Result<_, _>>()
                    .map_err(|_| MessageError::Malformed)?;
                Ok(Self::Req {
                    subscription_id,
                    filters,
                })
            }
            // ["CLOSE", <subscription id>]
            "CLOSE" => {
                if v.len() != 2 {
                    return Err(MessageError::Malformed);
                }
                let subscription_id: SubscriptionId =
                    serde_json::from_value(v[1].clone()).map_err(|_| MessageError::Malformed)?;
                Ok(Self::Close(subscription_id))
            }
            other => Err(MessageError::UnsupportedType(other.to_string())),
        }
    }
}
