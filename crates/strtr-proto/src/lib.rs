// Copyright (c) 2023-2025 Strtr Developers
// Distributed under the MIT software license

//! Protocol types for the strtr relay: events, filters and wire messages.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::bare_urls)]

pub use secp256k1;

pub mod event;
pub mod filter;
pub mod key;
pub mod message;
pub mod timestamp;
mod util;

pub use self::event::addr::EventAddr;
pub use self::event::builder::EventBuilder;
pub use self::event::id::EventId;
pub use self::event::kind::Kind;
pub use self::event::tag::{Tag, Tags};
pub use self::event::Event;
pub use self::filter::{Filter, SingleLetterTag};
pub use self::key::{Keys, PublicKey};
pub use self::message::{ClientMessage, MessageError, RelayMessage, SubscriptionId};
pub use self::timestamp::Timestamp;
pub use self::util::JsonUtil;
