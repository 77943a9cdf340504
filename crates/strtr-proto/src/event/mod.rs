// Copyright (c) 2023-2025 Strtr Developers
// Distributed under the MIT software license

//! Event

use secp256k1::schnorr::Signature;
use secp256k1::{Message, Secp256k1};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

pub mod addr;
pub mod builder;
pub mod id;
pub mod kind;
pub mod tag;

use self::addr::EventAddr;
use self::id::EventId;
use self::kind::Kind;
use self::tag::Tags;
use crate::key::PublicKey;
use crate::timestamp::Timestamp;
use crate::util::{self, JsonUtil};

/// [`Event`] error
#[derive(Debug, PartialEq, Eq, Error)]
pub enum Error {
    /// The id field doesn't match the canonical serialization
    #[error("event id does not match")]
    InvalidId,
    /// Schnorr signature verification failed
    #[error("invalid signature")]
    InvalidSignature,
}

/// Event
///
/// A signed, timestamped record. Events are value objects: once admitted
/// they are never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Event {
    /// Id: sha256 of the canonical serialization
    pub id: EventId,
    /// Author public key
    pub pubkey: PublicKey,
    /// Unix timestamp (seconds)
    pub created_at: Timestamp,
    /// Kind
    pub kind: Kind,
    /// Tag list
    pub tags: Tags,
    /// Content
    pub content: String,
    /// Schnorr signature over the id
    #[serde(deserialize_with = "deserialize_sig")]
    pub sig: Signature,
}

impl Event {
    /// Check that the id matches the canonical serialization
    pub fn verify_id(&self) -> bool {
        let id: EventId =
            EventId::new(&self.pubkey, self.created_at, self.kind, &self.tags, &self.content);
        id == self.id
    }

    /// Check the signature against the id
    pub fn verify_signature(&self) -> bool {
        let secp = Secp256k1::verification_only();
        let message: Message = Message::from_digest(self.id.to_bytes());
        match self.pubkey.x_only() {
            Ok(public_key) => secp.verify_schnorr(&self.sig, &message, &public_key).is_ok(),
            Err(..) => false,
        }
    }

    /// Verify both the id and the signature
    pub fn verify(&self) -> Result<(), Error> {
        if !self.verify_id() {
            return Err(Error::InvalidId);
        }
        if !self.verify_signature() {
            return Err(Error::InvalidSignature);
        }
        Ok(())
    }

    /// The replaceable address this event occupies, if its kind is
    /// replaceable or addressable.
    ///
    /// Returns `None` for an addressable kind with no `d` tag.
    pub fn addr(&self) -> Option<EventAddr> {
        if self.kind.is_replaceable() {
            Some(EventAddr::new(self.kind, self.pubkey))
        } else if self.kind.is_addressable() {
            let identifier: &str = self.tags.identifier()?;
            Some(EventAddr::new(self.kind, self.pubkey).identifier(identifier))
        } else {
            None
        }
    }
}

impl JsonUtil for Event {
    type Err = serde_json::Error;
}

fn deserialize_sig<'de, D>(deserializer: D) -> Result<Signature, D::Error>
where
    D: Deserializer<'de>,
{
    let sig: String = String::deserialize(deserializer)?;

    if sig.len() != 128 || !util::is_lowercase_hex(&sig) {
        return Err(serde::de::Error::custom("invalid signature format"));
    }

    let bytes: Vec<u8> = hex::decode(&sig).map_err(serde::de::Error::custom)?;
    Signature::from_slice(&bytes).map_err(serde::de::Error::custom)
}
