// Copyright (c) 2023-2025 Strtr Developers
// Distributed under the MIT software license

//! Replaceable event address

use core::fmt;
use core::str::FromStr;

use thiserror::Error;

use super::kind::Kind;
use crate::key::PublicKey;

/// [`EventAddr`] error
#[derive(Debug, PartialEq, Eq, Error)]
pub enum Error {
    /// Invalid replaceable event address
    #[error("invalid event address")]
    InvalidEventAddr,
}

/// The slot a replaceable event occupies: `"<kind>:<pubkey>:<d>"`.
///
/// The identifier is empty for non-parameterized replaceable kinds.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventAddr {
    /// Kind
    pub kind: Kind,
    /// Author public key
    pub public_key: PublicKey,
    /// The `d` tag value (empty when non-parameterized)
    pub identifier: String,
}

impl EventAddr {
    /// Address of a non-parameterized replaceable event
    #[inline]
    pub fn new(kind: Kind, public_key: PublicKey) -> Self {
        Self {
            kind,
            public_key,
            identifier: String::new(),
        }
    }

    /// Set the identifier (`d` tag value)
    pub fn identifier<S>(mut self, identifier: S) -> Self
    where
        S: Into<String>,
    {
        self.identifier = identifier.into();
        self
    }
}

impl fmt::Display for EventAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.kind, self.public_key, self.identifier)
    }
}

impl FromStr for EventAddr {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut split = s.splitn(3, ':');
        match (split.next(), split.next(), split.next()) {
            (Some(kind), Some(public_key), Some(identifier)) => Ok(Self {
                kind: kind.parse().map_err(|_| Error::InvalidEventAddr)?,
                public_key: PublicKey::from_hex(public_key)
                    .map_err(|_| Error::InvalidEventAddr)?,
                identifier: identifier.to_string(),
            }),
            _ => Err(Error::InvalidEventAddr),
        }
    }
}
