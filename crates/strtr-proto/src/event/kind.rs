// Copyright (c) 2023-2025 Strtr Developers
// Distributed under the MIT software license

//! Event kind

use core::fmt;
use core::num::ParseIntError;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Event kind
///
/// The kind number determines both the meaning of an event and its storage
/// class: regular, replaceable, addressable or ephemeral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Kind(u16);

impl Kind {
    /// Metadata (profile)
    pub const METADATA: Self = Self(0);
    /// Short text note
    pub const TEXT_NOTE: Self = Self(1);
    /// Contact list
    pub const CONTACT_LIST: Self = Self(3);
    /// Event deletion request
    pub const EVENT_DELETION: Self = Self(5);

    /// Construct from a kind number
    #[inline]
    pub const fn new(kind: u16) -> Self {
        Self(kind)
    }

    /// Get as 16-bit unsigned integer
    #[inline]
    pub const fn as_u16(&self) -> u16 {
        self.0
    }

    /// Check if it's a replaceable kind: `0`, `3` or `10000 <= kind < 20000`.
    ///
    /// At most one event is retained per `(kind, pubkey)` pair.
    #[inline]
    pub const fn is_replaceable(&self) -> bool {
        matches!(self.0, 0 | 3 | 10_000..=19_999)
    }

    /// Check if it's an ephemeral kind: `20000 <= kind < 30000`.
    ///
    /// Ephemeral events are never stored, only broadcast to live
    /// subscriptions.
    #[inline]
    pub const fn is_ephemeral(&self) -> bool {
        matches!(self.0, 20_000..=29_999)
    }

    /// Check if it's an addressable (parameterized replaceable) kind:
    /// `30000 <= kind < 40000`.
    ///
    /// At most one event is retained per `(kind, pubkey, d-tag)` triple.
    #[inline]
    pub const fn is_addressable(&self) -> bool {
        matches!(self.0, 30_000..=39_999)
    }

    /// Check if it's a regular kind (stored until deleted)
    #[inline]
    pub const fn is_regular(&self) -> bool {
        !self.is_replaceable() && !self.is_ephemeral() && !self.is_addressable()
    }
}

impl From<u16> for Kind {
    fn from(kind: u16) -> Self {
        Self(kind)
    }
}

impl FromStr for Kind {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
