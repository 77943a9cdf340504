// Copyright (c) 2023-2025 Strtr Developers
// Distributed under the MIT software license

//! Filters

use std::collections::{BTreeMap, BTreeSet};
use core::fmt;
use core::str::FromStr;

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::event::id::EventId;
use crate::event::kind::Kind;
use crate::event::Event;
use crate::key::PublicKey;
use crate::timestamp::Timestamp;
use crate::util::JsonUtil;

type GenericTags = BTreeMap<SingleLetterTag, BTreeSet<String>>;

/// [`SingleLetterTag`] error
#[derive(Debug, PartialEq, Eq, Error)]
pub enum SingleLetterTagError {
    /// The char is not a letter
    #[error("invalid char")]
    InvalidChar,
}

/// Single-letter tag name (a-zA-Z), used by `#X` filter entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SingleLetterTag(char);

impl SingleLetterTag {
    /// The `a` tag (replaceable event address)
    pub const A: Self = Self('a');
    /// The `d` tag (addressable event identifier)
    pub const D: Self = Self('d');
    /// The `e` tag (referenced event)
    pub const E: Self = Self('e');
    /// The `p` tag (referenced public key)
    pub const P: Self = Self('p');

    /// Parse a single-letter tag from a [char]
    pub fn from_char(c: char) -> Result<Self, SingleLetterTagError> {
        if c.is_ascii_alphabetic() {
            Ok(Self(c))
        } else {
            Err(SingleLetterTagError::InvalidChar)
        }
    }

    /// Get as `char`
    #[inline]
    pub fn as_char(&self) -> char {
        self.0
    }
}

impl fmt::Display for SingleLetterTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SingleLetterTag {
    type Err = SingleLetterTagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_char(c),
            _ => Err(SingleLetterTagError::InvalidChar),
        }
    }
}

/// Subscription filter: a conjunction of optional constraints.
///
/// Every field that is present must hold for an event to match; a missing
/// field doesn't constrain anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    /// List of event ids
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub ids: Option<BTreeSet<EventId>>,
    /// List of authors
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub authors: Option<BTreeSet<PublicKey>>,
    /// List of kinds
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub kinds: Option<BTreeSet<Kind>>,
    /// Substring to look for in the event content
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub search: Option<String>,
    /// Events must be newer than or equal to this unix timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub since: Option<Timestamp>,
    /// Events must be older than or equal to this unix timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub until: Option<Timestamp>,
    /// Maximum number of events to be returned by a query
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub limit: Option<usize>,
    /// Generic tag queries: `#X` → accepted values for tags named `X`
    #[serde(
        flatten,
        serialize_with = "serialize_generic_tags",
        deserialize_with = "deserialize_generic_tags"
    )]
    #[serde(default)]
    pub generic_tags: GenericTags,
}

impl Filter {
    /// Create a new empty [`Filter`]
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an event id
    #[inline]
    pub fn id(self, id: EventId) -> Self {
        self.ids([id])
    }

    /// Add event ids
    pub fn ids<I>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = EventId>,
    {
        self.ids.get_or_insert_with(BTreeSet::new).extend(ids);
        self
    }

    /// Add an author
    #[inline]
    pub fn author(self, author: PublicKey) -> Self {
        self.authors([author])
    }

    /// Add authors
    pub fn authors<I>(mut self, authors: I) -> Self
    where
        I: IntoIterator<Item = PublicKey>,
    {
        self.authors.get_or_insert_with(BTreeSet::new).extend(authors);
        self
    }

    /// Add a kind
    #[inline]
    pub fn kind(self, kind: Kind) -> Self {
        self.kinds([kind])
    }

    /// Add kinds
    pub fn kinds<I>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = Kind>,
    {
        self.kinds.get_or_insert_with(BTreeSet::new).extend(kinds);
        self
    }

    /// Add a referenced event (`#e`)
    #[inline]
    pub fn event(self, id: EventId) -> Self {
        self.custom_tag(SingleLetterTag::E, id.to_hex())
    }

    /// Add referenced events (`#e`)
    #[inline]
    pub fn events<I>(self, ids: I) -> Self
    where
        I: IntoIterator<Item = EventId>,
    {
        self.custom_tags(SingleLetterTag::E, ids.into_iter().map(|id| id.to_hex()))
    }

    /// Add a referenced public key (`#p`)
    #[inline]
    pub fn pubkey(self, pubkey: PublicKey) -> Self {
        self.custom_tag(SingleLetterTag::P, pubkey.to_hex())
    }

    /// Add referenced public keys (`#p`)
    #[inline]
    pub fn pubkeys<I>(self, pubkeys: I) -> Self
    where
        I: IntoIterator<Item = PublicKey>,
    {
        self.custom_tags(SingleLetterTag::P, pubkeys.into_iter().map(|p| p.to_hex()))
    }

    /// Add an identifier (`#d`)
    #[inline]
    pub fn identifier<S>(self, identifier: S) -> Self
    where
        S: Into<String>,
    {
        self.custom_tag(SingleLetterTag::D, identifier)
    }

    /// Add a custom tag constraint
    #[inline]
    pub fn custom_tag<S>(self, tag: SingleLetterTag, value: S) -> Self
    where
        S: Into<String>,
    {
        self.custom_tags(tag, [value])
    }

    /// Add custom tag constraints
    pub fn custom_tags<I, S>(mut self, tag: SingleLetterTag, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.generic_tags
            .entry(tag)
            .or_default()
            .extend(values.into_iter().map(|v| v.into()));
        self
    }

    /// Add a search string
    pub fn search<S>(mut self, value: S) -> Self
    where
        S: Into<String>,
    {
        self.search = Some(value.into());
        self
    }

    /// Add a since unix timestamp
    pub fn since(mut self, since: Timestamp) -> Self {
        self.since = Some(since);
        self
    }

    /// Add an until unix timestamp
    pub fn until(mut self, until: Timestamp) -> Self {
        self.until = Some(until);
        self
    }

    /// Add a limit
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Check if the filter can never match any event: some set-valued field
    /// is present but empty, or `since > until`.
    pub fn is_unsatisfiable(&self) -> bool {
        if matches!(&self.ids, Some(ids) if ids.is_empty()) {
            return true;
        }

        if matches!(&self.authors, Some(authors) if authors.is_empty()) {
            return true;
        }

        if matches!(&self.kinds, Some(kinds) if kinds.is_empty()) {
            return true;
        }

        if self.generic_tags.values().any(|set| set.is_empty()) {
            return true;
        }

        if let (Some(since), Some(until)) = (self.since, self.until) {
            if since > until {
                return true;
            }
        }

        false
    }

    #[inline]
    fn ids_match(&self, event: &Event) -> bool {
        self.ids.as_ref().map_or(true, |ids| ids.contains(&event.id))
    }

    #[inline]
    fn authors_match(&self, event: &Event) -> bool {
        self.authors
            .as_ref()
            .map_or(true, |authors| authors.contains(&event.pubkey))
    }

    #[inline]
    fn kind_match(&self, event: &Event) -> bool {
        self.kinds
            .as_ref()
            .map_or(true, |kinds| kinds.contains(&event.kind))
    }

    fn tag_match(&self, event: &Event) -> bool {
        if self.generic_tags.is_empty() {
            return true;
        }

        if event.tags.is_empty() {
            return false;
        }

        self.generic_tags.iter().all(|(tag_name, set)| {
            let mut name_buf = [0u8; 4];
            let name: &str = tag_name.as_char().encode_utf8(&mut name_buf);
            let matched = event.tags.values(name).any(|value| set.contains(value));
            matched
        })
    }

    #[inline]
    fn search_match(&self, event: &Event) -> bool {
        match &self.search {
            Some(query) if !query.is_empty() => event
                .content
                .as_bytes()
                .windows(query.len())
                .any(|window| window.eq_ignore_ascii_case(query.as_bytes())),
            _ => true,
        }
    }

    /// Determine if the filter matches the given [`Event`]
    pub fn match_event(&self, event: &Event) -> bool {
        self.ids_match(event)
            && self.authors_match(event)
            && self.kind_match(event)
            && self.since.map_or(true, |t| event.created_at >= t)
            && self.until.map_or(true, |t| event.created_at <= t)
            && self.tag_match(event)
            && self.search_match(event)
    }
}

impl JsonUtil for Filter {
    type Err = serde_json::Error;
}

fn serialize_generic_tags<S>(generic_tags: &GenericTags, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut map = serializer.serialize_map(Some(generic_tags.len()))?;
    for (tag, values) in generic_tags.iter() {
        map.serialize_entry(&format!("#{tag}"), values)?;
    }
    map.end()
}

fn deserialize_generic_tags<'de, D>(deserializer: D) -> Result<GenericTags, D::Error>
where
    D: Deserializer<'de>,
{
    struct GenericTagsVisitor;

    impl<'de> Visitor<'de> for GenericTagsVisitor {
        type Value = GenericTags;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("map in which the keys are \"#X\" for some character X")
        }

        fn visit_map<M>(self, mut map: M) -> Result<Self::Value, M::Error>
        where
            M: MapAccess<'de>,
        {
            let mut generic_tags = BTreeMap::new();
            while let Some(key) = map.next_key::<String>()? {
                let mut chars = key.chars();
                if let (Some('#'), Some(ch), None) = (chars.next(), chars.next(), chars.next()) {
                    let tag: SingleLetterTag =
                        SingleLetterTag::from_char(ch).map_err(serde::de::Error::custom)?;
                    let values: BTreeSet<String> = map.next_value()?;
                    generic_tags.insert(tag, values);
                } else {
                    map.next_value::<serde::de::IgnoredAny>()?;
                }
            }
            Ok(generic_tags)
        }
    }

    deserializer.deserialize_map(GenericTagsVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::builder::EventBuilder;
    use crate::event::tag::Tag;
    use crate::key::Keys;

    #[test]
    fn test_filter_serialization() {
        let filter = Filter::new()
            .identifier("identifier")
            .search("search")
            .custom_tag(SingleLetterTag::from_char('j').unwrap(), "test");
        let json = r##"{"search":"search","#d":["identifier"],"#j":["test"]}"##;
        assert_eq!(filter.as_json(), json);
    }

    #[test]
    fn test_filter_deserialization() {
        let json = r##"{"#a":["...", "test"],"search":"test","ids":["2be17aa3031bdcb006f0fce80c146dea9c1c0268b0af2398bb673365c6444d45"]}"##;
        let filter = Filter::from_json(json).unwrap();
        let expected = Filter::new()
            .ids([EventId::from_hex(
                "2be17aa3031bdcb006f0fce80c146dea9c1c0268b0af2398bb673365c6444d45",
            )
            .unwrap()])
            .search("test")
            .custom_tags(SingleLetterTag::A, ["...".to_string(), "test".to_string()]);
        assert_eq!(filter, expected);

        // Unknown non-`#X` keys are ignored
        let json = r##"{"authors":[], "not-a-tag": 1}"##;
        let filter = Filter::from_json(json).unwrap();
        assert_eq!(filter, Filter::new().authors([]));
    }

    #[test]
    fn test_match_event() {
        let keys = Keys::generate();
        let other = Keys::generate();
        let event = EventBuilder::text_note("my first note")
            .custom_created_at(Timestamp::from_secs(500))
            .tag(Tag::public_key(other.public_key()))
            .sign(&keys);

        assert!(Filter::new().author(keys.public_key()).match_event(&event));
        assert!(Filter::new().kind(Kind::TEXT_NOTE).match_event(&event));
        assert!(Filter::new().id(event.id).match_event(&event));
        assert!(Filter::new().pubkey(other.public_key()).match_event(&event));
        assert!(Filter::new()
            .since(Timestamp::from_secs(400))
            .until(Timestamp::from_secs(600))
            .match_event(&event));
        assert!(Filter::new().search("FIRST").match_event(&event));

        assert!(!Filter::new().author(other.public_key()).match_event(&event));
        assert!(!Filter::new().kind(Kind::METADATA).match_event(&event));
        assert!(!Filter::new().since(Timestamp::from_secs(501)).match_event(&event));
        assert!(!Filter::new().until(Timestamp::from_secs(499)).match_event(&event));
        assert!(!Filter::new().pubkey(keys.public_key()).match_event(&event));
        assert!(!Filter::new().search("missing").match_event(&event));
    }

    #[test]
    fn test_unsatisfiable() {
        assert!(Filter::new().authors([]).is_unsatisfiable());
        assert!(Filter::new().ids([]).is_unsatisfiable());
        assert!(Filter::new().kinds([]).is_unsatisfiable());
        assert!(Filter::from_json(r##"{"#e":[]}"##).unwrap().is_unsatisfiable());
        assert!(Filter::new()
            .since(Timestamp::from_secs(10))
            .until(Timestamp::from_secs(5))
            .is_unsatisfiable());

        assert!(!Filter::new().is_unsatisfiable());
        assert!(!Filter::new()
            .since(Timestamp::from_secs(5))
            .until(Timestamp::from_secs(5))
            .is_unsatisfiable());
        assert!(!Filter::new().kind(Kind::TEXT_NOTE).is_unsatisfiable());
    }
}
