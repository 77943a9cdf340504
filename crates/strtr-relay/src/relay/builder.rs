// Copyright (c) 2023-2025 Strtr Developers
// Distributed under the MIT software license

//! Relay builder

use std::net::IpAddr;

/// Default port the relay listens on
pub const DEFAULT_PORT: u16 = 5454;

/// Relay configuration
#[derive(Debug, Clone, Default)]
pub struct RelayBuilder {
    /// IP address (default: `127.0.0.1`)
    pub addr: Option<IpAddr>,
    /// Port (default: an ephemeral port chosen by the OS)
    pub port: Option<u16>,
}

impl RelayBuilder {
    /// New builder with all defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the IP address
    #[inline]
    pub fn addr(mut self, ip: IpAddr) -> Self {
        self.addr = Some(ip);
        self
    }

    /// Set the port
    #[inline]
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }
}
