//! # Value Objects
//!
//! Immutable domain primitives for the chat ledger.
//! These types are defined by their value, not identity.
//!
//! Identities and chat ids serialize as `0x`-prefixed lowercase hex in
//! human-readable formats (JSON) and as raw bytes in binary formats (the
//! ledger's bincode records).

use crate::errors::LedgerError;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

// Re-export U256 from primitive-types for fee arithmetic
pub use primitive_types::U256;

/// Monetary amount in the smallest currency unit.
pub type Amount = U256;

/// Seconds since the Unix epoch.
pub type Timestamp = u64;

/// Byte length of an [`Identity`].
pub const IDENTITY_LEN: usize = 20;

/// Byte length of a [`ChatId`].
pub const CHAT_ID_LEN: usize = 32;

// =============================================================================
// IDENTITY (20 bytes)
// =============================================================================

/// A participant identity (20-byte address).
///
/// Equality is byte-exact. Textual parsing accepts upper, lower or mixed case
/// hex, so two spellings of the same address always map to the same value.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Identity(pub [u8; IDENTITY_LEN]);

impl Identity {
    /// The zero identity. Reserved; never a valid chat counterparty or owner.
    pub const ZERO: Self = Self([0u8; IDENTITY_LEN]);

    /// Creates an identity from a 20-byte array.
    #[must_use]
    pub const fn new(bytes: [u8; IDENTITY_LEN]) -> Self {
        Self(bytes)
    }

    /// Creates an identity from a slice. Returns None if wrong length.
    #[must_use]
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        let bytes: [u8; IDENTITY_LEN] = slice.try_into().ok()?;
        Some(Self(bytes))
    }

    /// Returns the underlying bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; IDENTITY_LEN] {
        &self.0
    }

    /// Returns true if this is the zero identity.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; IDENTITY_LEN]
    }

    /// Lowercase `0x`-prefixed hex form.
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({})", self.to_hex())
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Identity {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = parse_prefixed_hex(s, IDENTITY_LEN).ok_or_else(|| {
            LedgerError::MalformedInput(format!("invalid identity: {s:?}"))
        })?;
        Self::from_slice(&bytes)
            .ok_or_else(|| LedgerError::MalformedInput(format!("invalid identity: {s:?}")))
    }
}

impl From<[u8; IDENTITY_LEN]> for Identity {
    fn from(bytes: [u8; IDENTITY_LEN]) -> Self {
        Self(bytes)
    }
}

impl Serialize for Identity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_hex())
        } else {
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for Identity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            s.parse().map_err(D::Error::custom)
        } else {
            <[u8; IDENTITY_LEN]>::deserialize(deserializer).map(Self)
        }
    }
}

// =============================================================================
// CHAT ID (32 bytes)
// =============================================================================

/// Deterministic identifier of a chat between two identities.
///
/// Only produced by [`crate::domain::services::derive_chat_id`] or parsed
/// back from its hex form.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ChatId(pub [u8; CHAT_ID_LEN]);

impl ChatId {
    /// Creates a chat id from a 32-byte array.
    #[must_use]
    pub const fn new(bytes: [u8; CHAT_ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Returns the underlying bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; CHAT_ID_LEN] {
        &self.0
    }

    /// Lowercase `0x`-prefixed hex form.
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChatId({})", self.to_hex())
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for ChatId {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = parse_prefixed_hex(s, CHAT_ID_LEN)
            .ok_or_else(|| LedgerError::MalformedInput(format!("invalid chat id: {s:?}")))?;
        let bytes: [u8; CHAT_ID_LEN] = bytes
            .try_into()
            .map_err(|_| LedgerError::MalformedInput(format!("invalid chat id: {s:?}")))?;
        Ok(Self(bytes))
    }
}

impl From<[u8; CHAT_ID_LEN]> for ChatId {
    fn from(bytes: [u8; CHAT_ID_LEN]) -> Self {
        Self(bytes)
    }
}

impl Serialize for ChatId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_hex())
        } else {
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for ChatId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            s.parse().map_err(D::Error::custom)
        } else {
            <[u8; CHAT_ID_LEN]>::deserialize(deserializer).map(Self)
        }
    }
}

/// Decodes `0x`-prefixed (or bare) hex of exactly `len` bytes, any case.
fn parse_prefixed_hex(s: &str, len: usize) -> Option<Vec<u8>> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    if digits.len() != len * 2 {
        return None;
    }
    hex::decode(digits).ok()
}

// =============================================================================
// TESTS
// =============================================================================
