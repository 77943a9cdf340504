// Copyright (c) 2023-2025 Strtr Developers
// Distributed under the MIT software license

//! Event builder

use secp256k1::schnorr::Signature;

use super::addr::EventAddr;
use super::id::EventId;
use super::kind::Kind;
use super::tag::{Tag, Tags};
use super::Event;
use crate::key::Keys;
use crate::timestamp::Timestamp;

/// Compose and sign an [`Event`]
#[derive(Debug, Clone)]
pub struct EventBuilder {
    kind: Kind,
    content: String,
    tags: Vec<Tag>,
    custom_created_at: Option<Timestamp>,
}

impl EventBuilder {
    /// New event builder
    pub fn new<S>(kind: Kind, content: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            kind,
            content: content.into(),
            tags: Vec::new(),
            custom_created_at: None,
        }
    }

    /// Compose a text note
    #[inline]
    pub fn text_note<S>(content: S) -> Self
    where
        S: Into<String>,
    {
        Self::new(Kind::TEXT_NOTE, content)
    }

    /// Compose a deletion request for the given event ids
    pub fn delete<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = EventId>,
    {
        Self::new(Kind::EVENT_DELETION, "").tags(ids.into_iter().map(Tag::event))
    }

    /// Compose a deletion request for the given replaceable addresses
    pub fn delete_addrs<'a, I>(addrs: I) -> Self
    where
        I: IntoIterator<Item = &'a EventAddr>,
    {
        Self::new(Kind::EVENT_DELETION, "").tags(addrs.into_iter().map(Tag::address))
    }

    /// Add a tag
    pub fn tag(mut self, tag: Tag) -> Self {
        self.tags.push(tag);
        self
    }

    /// Add tags
    pub fn tags<I>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = Tag>,
    {
        self.tags.extend(tags);
        self
    }

    /// Use a fixed `created_at` instead of the current time
    pub fn custom_created_at(mut self, created_at: Timestamp) -> Self {
        self.custom_created_at = Some(created_at);
        self
    }

    /// Timestamp, compute the id and sign
    pub fn sign(self, keys: &Keys) -> Event {
        let created_at: Timestamp = self.custom_created_at.unwrap_or_else(Timestamp::now);
        let pubkey = keys.public_key();
        let tags = Tags::new(self.tags);
        let id: EventId = EventId::new(&pubkey, created_at, self.kind, &tags, &self.content);
        let sig: Signature = keys.sign_schnorr(id.to_bytes());
        Event {
            id,
            pubkey,
            created_at,
            kind: self.kind,
            tags,
            content: self.content,
            sig,
        }
    }
}
