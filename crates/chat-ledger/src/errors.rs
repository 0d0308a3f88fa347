//! # Error Types
//!
//! All error types for the chat ledger.
//!
//! Every [`LedgerError`] maps onto one [`ErrorKind`] of the ledger's error
//! taxonomy. Any error aborts the whole operation; nothing is committed.

use crate::domain::value_objects::{Amount, ChatId, Identity};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result alias for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

// =============================================================================
// LEDGER ERRORS
// =============================================================================

/// Errors returned by ledger operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// A chat needs two distinct identities.
    #[error("cannot open a chat with yourself: {0}")]
    SelfChat(Identity),

    /// The zero identity is reserved.
    #[error("zero identity is not a valid participant")]
    ZeroIdentity,

    /// Message content is empty.
    #[error("message content is empty")]
    EmptyContent,

    /// Message content exceeds the configured bound.
    #[error("message content too long: {len} > {max} bytes")]
    ContentTooLong { len: usize, max: usize },

    /// Maximum message length must be positive.
    #[error("max message length must be greater than zero")]
    InvalidMaxLength,

    /// Input could not be parsed.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// No chat with this id.
    #[error("chat not found: {0}")]
    ChatNotFound(ChatId),

    /// No message at this index.
    #[error("message {index} not found in chat {chat_id}")]
    MessageNotFound { chat_id: ChatId, index: u64 },

    /// Caller is not one of the chat's two participants.
    #[error("{caller} is not a participant of chat {chat_id}")]
    NotParticipant { chat_id: ChatId, caller: Identity },

    /// Caller did not author the message.
    #[error("{caller} is not the sender of message {index} in chat {chat_id}")]
    NotSender {
        chat_id: ChatId,
        index: u64,
        caller: Identity,
    },

    /// Caller is not the ledger owner.
    #[error("{0} is not the ledger owner")]
    NotOwner(Identity),

    /// Payment is below the message fee.
    #[error("insufficient fee: required {required}, paid {paid}")]
    InsufficientFee { required: Amount, paid: Amount },

    /// Fee pool arithmetic overflowed.
    #[error("fee pool overflow")]
    FeePoolOverflow,

    /// A chat already exists for this pair.
    #[error("chat already exists: {0}")]
    ChatAlreadyExists(ChatId),

    /// The message was soft-deleted and is immutable.
    #[error("message {index} in chat {chat_id} is deleted")]
    MessageDeleted { chat_id: ChatId, index: u64 },

    /// Key-value store failure.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Stored record could not be encoded or decoded.
    #[error("codec error: {0}")]
    Codec(String),
}

impl LedgerError {
    /// Returns the taxonomy bucket of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::SelfChat(_)
            | Self::ZeroIdentity
            | Self::EmptyContent
            | Self::ContentTooLong { .. }
            | Self::InvalidMaxLength
            | Self::MalformedInput(_) => ErrorKind::Validation,
            Self::ChatNotFound(_) | Self::MessageNotFound { .. } => ErrorKind::NotFound,
            Self::NotParticipant { .. } | Self::NotSender { .. } | Self::NotOwner(_) => {
                ErrorKind::Permission
            }
            Self::InsufficientFee { .. } | Self::FeePoolOverflow => ErrorKind::Payment,
            Self::ChatAlreadyExists(_) | Self::MessageDeleted { .. } => ErrorKind::State,
            Self::Store(_) | Self::Codec(_) => ErrorKind::Storage,
        }
    }
}

impl From<bincode::Error> for LedgerError {
    fn from(err: bincode::Error) -> Self {
        Self::Codec(err.to_string())
    }
}

/// Error taxonomy shared by all ledger operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed input, empty/oversized content, self-chat.
    Validation,
    /// Unknown chat or message index.
    NotFound,
    /// Caller is not a participant, the sender, or the owner.
    Permission,
    /// Insufficient fee.
    Payment,
    /// Mutating a deleted message, duplicate chat creation.
    State,
    /// Infrastructure fault in the backing store.
    Storage,
}

/// Serializable ledger error for host responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerErrorPayload {
    /// Taxonomy bucket.
    pub kind: ErrorKind,
    /// Human-readable message.
    pub message: String,
}

impl From<&LedgerError> for LedgerErrorPayload {
    fn from(err: &LedgerError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl From<LedgerError> for LedgerErrorPayload {
    fn from(err: LedgerError) -> Self {
        Self::from(&err)
    }
}

// =============================================================================
// STORE ERRORS
// =============================================================================

/// Errors from the key-value store port.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// I/O error during read/write.
    #[error("I/O error: {message}")]
    Io { message: String },

    /// Data corruption in the store.
    #[error("corruption: {message}")]
    Corruption { message: String },

    /// Another process holds the store lock.
    #[error("store locked by another process: {path}")]
    Locked { path: String },
}

// =============================================================================
// TESTS
// =============================================================================
