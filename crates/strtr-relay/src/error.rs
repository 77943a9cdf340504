// Copyright (c) 2023-2025 Strtr Developers
// Distributed under the MIT software license

//! Relay error

use std::io;

use thiserror::Error;

/// Relay error
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error
    #[error(transparent)]
    IO(#[from] io::Error),
    /// WebSocket error
    #[error(transparent)]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
}
