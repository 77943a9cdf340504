// Copyright (c) 2023-2025 Strtr Developers
// Distributed under the MIT software license

//! Utilities

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Convert types to and from JSON
pub trait JsonUtil: Sized + Serialize + DeserializeOwned {
    /// Error
    type Err: From<serde_json::Error>;

    /// Deserialize from JSON
    fn from_json<T>(json: T) -> Result<Self, Self::Err>
    where
        T: AsRef<[u8]>,
    {
        Ok(serde_json::from_slice(json.as_ref())?)
    }

    /// Serialize to JSON
    fn as_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Check that `s` is entirely lowercase hex.
#[inline]
pub(crate) fn is_lowercase_hex(s: &str) -> bool {
    s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
