//! # Event Schema
//!
//! Events describing committed ledger changes. Published through the
//! [`EventPublisher`](crate::ports::outbound::EventPublisher) port after a
//! successful commit, never for rejected operations.

use crate::domain::value_objects::{Amount, ChatId, Identity, Timestamp};
use serde::{Deserialize, Serialize};

/// A committed ledger change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// A chat was opened.
    ChatCreated {
        chat_id: ChatId,
        creator: Identity,
        other: Identity,
        timestamp: Timestamp,
    },
    /// A message was appended and its fee collected.
    MessageSent {
        chat_id: ChatId,
        index: u64,
        sender: Identity,
        fee_paid: Amount,
        timestamp: Timestamp,
    },
    /// A message's content was replaced.
    MessageEdited {
        chat_id: ChatId,
        index: u64,
        sender: Identity,
        timestamp: Timestamp,
    },
    /// A message was soft-deleted.
    MessageDeleted {
        chat_id: ChatId,
        index: u64,
        sender: Identity,
        timestamp: Timestamp,
    },
    /// The per-message fee changed.
    MessageFeeUpdated { old_fee: Amount, new_fee: Amount },
    /// The content bound changed.
    MaxMessageLengthUpdated { old_length: usize, new_length: usize },
    /// The fee pool was emptied by the owner.
    FeesWithdrawn { owner: Identity, amount: Amount },
    /// Ownership moved to another identity.
    OwnershipTransferred {
        previous_owner: Identity,
        new_owner: Identity,
    },
}

impl LedgerEvent {
    /// Short, stable name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::ChatCreated { .. } => "chat_created",
            Self::MessageSent { .. } => "message_sent",
            Self::MessageEdited { .. } => "message_edited",
            Self::MessageDeleted { .. } => "message_deleted",
            Self::MessageFeeUpdated { .. } => "message_fee_updated",
            Self::MaxMessageLengthUpdated { .. } => "max_message_length_updated",
            Self::FeesWithdrawn { .. } => "fees_withdrawn",
            Self::OwnershipTransferred { .. } => "ownership_transferred",
        }
    }

    /// The chat this event concerns, if any.
    #[must_use]
    pub fn chat_id(&self) -> Option<ChatId> {
        match self {
            Self::ChatCreated { chat_id, .. }
            | Self::MessageSent { chat_id, .. }
            | Self::MessageEdited { chat_id, .. }
            | Self::MessageDeleted { chat_id, .. } => Some(*chat_id),
            _ => None,
        }
    }
}
