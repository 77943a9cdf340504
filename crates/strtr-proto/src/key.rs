// Copyright (c) 2023-2025 Strtr Developers
// Distributed under the MIT software license

//! Keys

use core::fmt;
use core::str::FromStr;

use secp256k1::rand::rngs::OsRng;
use secp256k1::schnorr::Signature;
use secp256k1::{Keypair, Message, Secp256k1, SecretKey, XOnlyPublicKey};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::util;

/// Public key size
pub const PUBLIC_KEY_SIZE: usize = 32;

/// Key error
#[derive(Debug, PartialEq, Eq, Error)]
pub enum Error {
    /// Invalid public key
    #[error("invalid public key")]
    InvalidPublicKey,
    /// Secp256k1 error
    #[error(transparent)]
    Secp256k1(#[from] secp256k1::Error),
}

/// Author public key: 32 bytes, serialized as lowercase hex
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PublicKey([u8; PUBLIC_KEY_SIZE]);

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_hex())
    }
}

impl PublicKey {
    /// Construct from a 32-byte array
    #[inline]
    pub const fn from_byte_array(bytes: [u8; PUBLIC_KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Parse from a lowercase hex string
    pub fn from_hex<S>(hex: S) -> Result<Self, Error>
    where
        S: AsRef<str>,
    {
        let hex: &str = hex.as_ref();

        if hex.len() != PUBLIC_KEY_SIZE * 2 || !util::is_lowercase_hex(hex) {
            return Err(Error::InvalidPublicKey);
        }

        let mut bytes: [u8; PUBLIC_KEY_SIZE] = [0u8; PUBLIC_KEY_SIZE];
        hex::decode_to_slice(hex, &mut bytes).map_err(|_| Error::InvalidPublicKey)?;
        Ok(Self(bytes))
    }

    /// Get as bytes
    #[inline]
    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_SIZE] {
        &self.0
    }

    /// Get as hex string
    #[inline]
    pub fn to_hex(&self) -> String {
        hex::encode(self.as_bytes())
    }

    /// Get the x-only verification key
    pub fn x_only(&self) -> Result<XOnlyPublicKey, Error> {
        Ok(XOnlyPublicKey::from_slice(&self.0)?)
    }
}

impl From<XOnlyPublicKey> for PublicKey {
    fn from(pk: XOnlyPublicKey) -> Self {
        Self(pk.serialize())
    }
}

impl FromStr for PublicKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for PublicKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let pk: String = String::deserialize(deserializer)?;
        Self::from_hex(pk).map_err(serde::de::Error::custom)
    }
}

/// Secret and public key pair
#[derive(Debug, Clone)]
pub struct Keys {
    key_pair: Keypair,
    public_key: PublicKey,
}

impl Keys {
    /// Construct from a secret key
    pub fn new(secret_key: SecretKey) -> Self {
        let secp = Secp256k1::new();
        let key_pair: Keypair = Keypair::from_secret_key(&secp, &secret_key);
        let (xonly, _) = key_pair.x_only_public_key();
        Self {
            key_pair,
            public_key: xonly.into(),
        }
    }

    /// Generate random keys
    pub fn generate() -> Self {
        Self::new(SecretKey::new(&mut OsRng))
    }

    /// Get the public key
    #[inline]
    pub fn public_key(&self) -> PublicKey {
        self.public_key
    }

    /// Schnorr-sign a 32-byte digest
    pub fn sign_schnorr(&self, digest: [u8; 32]) -> Signature {
        let secp = Secp256k1::new();
        let message: Message = Message::from_digest(digest);
        secp.sign_schnorr_with_rng(&message, &self.key_pair, &mut OsRng)
    }
}
