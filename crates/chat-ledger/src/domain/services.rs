//! # Domain Services
//!
//! Pure functions: chat id canonicalization and hashing.
//!
//! - NO I/O operations
//! - NO side effects

use crate::domain::value_objects::{ChatId, Identity, IDENTITY_LEN};
use crate::errors::{LedgerError, LedgerResult};
use sha3::{Digest, Keccak256};

// =============================================================================
// CHAT ID DERIVATION
// =============================================================================

/// Derives the chat id for an unordered pair of identities.
///
/// ChatId = keccak256(lower ‖ higher), where `lower`/`higher` are the two
/// identities ordered byte-wise. Both participants therefore compute the
/// same id regardless of argument order.
///
/// # Errors
///
/// [`LedgerError::SelfChat`] if `a == b`.
pub fn derive_chat_id(a: &Identity, b: &Identity) -> LedgerResult<ChatId> {
    let (lower, higher) = canonical_pair(a, b)?;

    let mut packed = [0u8; IDENTITY_LEN * 2];
    packed[..IDENTITY_LEN].copy_from_slice(lower.as_bytes());
    packed[IDENTITY_LEN..].copy_from_slice(higher.as_bytes());

    Ok(keccak256(&packed))
}

/// Orders two distinct identities byte-wise.
///
/// # Errors
///
/// [`LedgerError::SelfChat`] if `a == b`.
pub fn canonical_pair(a: &Identity, b: &Identity) -> LedgerResult<(Identity, Identity)> {
    match a.cmp(b) {
        std::cmp::Ordering::Less => Ok((*a, *b)),
        std::cmp::Ordering::Greater => Ok((*b, *a)),
        std::cmp::Ordering::Equal => Err(LedgerError::SelfChat(*a)),
    }
}

// =============================================================================
// KECCAK256 UTILITY
// =============================================================================

/// Computes keccak256 hash of data.
#[must_use]
pub fn keccak256(data: &[u8]) -> ChatId {
    let hash = Keccak256::digest(data);
    ChatId::new(hash.into())
}

// =============================================================================
// TESTS
// =============================================================================
