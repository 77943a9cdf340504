// Copyright (c) 2023-2025 Strtr Developers
// Distributed under the MIT software license

//! Wire messages
//!
//! Every frame on the wire is a JSON array whose first element names the
//! message type.

use thiserror::Error;

mod client;
mod relay;
mod subscription;

pub use self::client::ClientMessage;
pub use self::relay::RelayMessage;
pub use self::subscription::SubscriptionId;

/// Inbound message error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageError {
    /// The frame is not a well-formed message
    #[error("malformed message")]
    Malformed,
    /// The message tag is recognized as a type this relay doesn't serve
    #[error("unsupported message type: {0}")]
    UnsupportedType(String),
}
