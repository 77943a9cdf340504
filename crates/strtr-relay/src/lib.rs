// Copyright (c) 2023-2025 Strtr Developers
// Distributed under the MIT software license

//! The strtr relay core: an in-memory event store with secondary indices,
//! a filter-driven query engine, live subscription fan-out and the
//! websocket server tying them together.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::bare_urls)]

pub use strtr_proto as proto;

pub mod error;
pub mod ingest;
pub mod pool;
pub mod relay;
pub mod store;

pub use self::error::Error;
pub use self::ingest::{IngestOutcome, Ingestor};
pub use self::pool::{ClientId, Subscription, SubscriptionPool};
pub use self::relay::{Relay, RelayBuilder, DEFAULT_PORT};
pub use self::store::{EventStore, InsertStatus};
