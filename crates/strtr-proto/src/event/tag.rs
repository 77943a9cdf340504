// Copyright (c) 2023-2025 Strtr Developers
// Distributed under the MIT software license

//! Tags

use serde::{Deserialize, Serialize};

use super::addr::EventAddr;
use super::id::EventId;
use crate::key::PublicKey;

/// Event tag: an ordered list of strings whose first element is the tag name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag(Vec<String>);

impl Tag {
    /// Construct from a list of strings
    #[inline]
    pub fn new(fields: Vec<String>) -> Self {
        Self(fields)
    }

    /// Compose an `e` tag referencing an event
    pub fn event(id: EventId) -> Self {
        Self(vec!["e".to_string(), id.to_hex()])
    }

    /// Compose a `p` tag referencing a public key
    pub fn public_key(public_key: PublicKey) -> Self {
        Self(vec!["p".to_string(), public_key.to_hex()])
    }

    /// Compose a `d` tag (addressable event identifier)
    pub fn identifier<S>(identifier: S) -> Self
    where
        S: Into<String>,
    {
        Self(vec!["d".to_string(), identifier.into()])
    }

    /// Compose an `a` tag referencing a replaceable event address
    pub fn address(addr: &EventAddr) -> Self {
        Self(vec!["a".to_string(), addr.to_string()])
    }

    /// Tag name (the first element)
    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.0.first().map(|s| s.as_str())
    }

    /// Tag value (the second element)
    #[inline]
    pub fn content(&self) -> Option<&str> {
        self.0.get(1).map(|s| s.as_str())
    }

    /// Get as a string slice
    #[inline]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl From<Vec<String>> for Tag {
    fn from(fields: Vec<String>) -> Self {
        Self(fields)
    }
}

/// Tag list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tags(Vec<Tag>);

impl Tags {
    /// Construct from a list of tags
    #[inline]
    pub fn new(tags: Vec<Tag>) -> Self {
        Self(tags)
    }

    /// Check if there are no tags
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of tags
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate tags
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.0.iter()
    }

    /// Values of every tag with the given name
    pub fn values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .iter()
            .filter(move |tag| tag.name() == Some(name))
            .filter_map(|tag| tag.content())
    }

    /// The `d` tag value, if any
    #[inline]
    pub fn identifier(&self) -> Option<&str> {
        self.values("d").next()
    }

    /// Parsed values of every `e` tag (unparsable values skipped)
    pub fn event_ids(&self) -> impl Iterator<Item = EventId> + '_ {
        self.values("e").filter_map(|v| EventId::from_hex(v).ok())
    }

    /// Parsed values of every `a` tag (unparsable values skipped)
    pub fn addresses(&self) -> impl Iterator<Item = EventAddr> + '_ {
        self.values("a").filter_map(|v| v.parse().ok())
    }
}

impl From<Vec<Tag>> for Tags {
    fn from(tags: Vec<Tag>) -> Self {
        Self(tags)
    }
}

impl IntoIterator for Tags {
    type Item = Tag;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<Tag> for Tags {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = Tag>,
    {
        Self(iter.into_iter().collect())
    }
}
