//! # Core Domain Entities
//!
//! Chats, messages and the ledger-wide settings record.
//!
//! A message's lifecycle lives in [`MessageState`]: the content of a deleted
//! message does not exist as a field, so it cannot be edited back.

use crate::domain::value_objects::{Amount, ChatId, Identity, Timestamp};
use crate::errors::{LedgerError, LedgerResult};
use serde::{Deserialize, Serialize};

/// Version of the persisted record layout.
pub const SCHEMA_VERSION: u32 = 1;

// =============================================================================
// CHAT
// =============================================================================

/// A pairwise conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    /// Symmetric id derived from the two participants.
    pub id: ChatId,
    /// The identity that created the chat.
    pub participant_a: Identity,
    /// The counterparty.
    pub participant_b: Identity,
    /// Number of messages ever appended (deleted ones included).
    pub message_count: u64,
    /// Creation time.
    pub created_at: Timestamp,
}

impl Chat {
    /// Creates an empty chat.
    #[must_use]
    pub fn new(id: ChatId, creator: Identity, other: Identity, created_at: Timestamp) -> Self {
        Self {
            id,
            participant_a: creator,
            participant_b: other,
            message_count: 0,
            created_at,
        }
    }

    /// Index the next appended message will take.
    #[must_use]
    pub fn next_index(&self) -> u64 {
        self.message_count
    }
}

// =============================================================================
// MESSAGE
// =============================================================================

/// Lifecycle state of a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageState {
    /// As sent.
    Active {
        /// Message body.
        content: String,
    },
    /// Edited at least once.
    Edited {
        /// Current body.
        content: String,
        /// Time of the latest edit.
        edited_at: Timestamp,
    },
    /// Soft-deleted. Terminal.
    Deleted {
        /// Time of the latest edit before deletion, 0 if never edited.
        edited_at: Timestamp,
    },
}

impl MessageState {
    /// Current content; empty once deleted.
    #[must_use]
    pub fn content(&self) -> &str {
        match self {
            Self::Active { content } | Self::Edited { content, .. } => content,
            Self::Deleted { .. } => "",
        }
    }

    /// Time of the latest edit, 0 if never edited.
    #[must_use]
    pub fn updated_at(&self) -> Timestamp {
        match self {
            Self::Active { .. } => 0,
            Self::Edited { edited_at, .. } | Self::Deleted { edited_at } => *edited_at,
        }
    }

    /// True once soft-deleted.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        matches!(self, Self::Deleted { .. })
    }

    /// Short status tag.
    #[must_use]
    pub fn status(&self) -> MessageStatus {
        match self {
            Self::Active { .. } => MessageStatus::Active,
            Self::Edited { .. } => MessageStatus::Edited,
            Self::Deleted { .. } => MessageStatus::Deleted,
        }
    }

    /// `Active | Edited -> Edited`. None from `Deleted`.
    fn edit(&self, content: String, edited_at: Timestamp) -> Option<Self> {
        match self {
            Self::Deleted { .. } => None,
            _ => Some(Self::Edited { content, edited_at }),
        }
    }

    /// `Active | Edited -> Deleted`. None from `Deleted`.
    fn delete(&self) -> Option<Self> {
        match self {
            Self::Deleted { .. } => None,
            other => Some(Self::Deleted {
                edited_at: other.updated_at(),
            }),
        }
    }
}

/// Status tag of a [`MessageState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    Active,
    Edited,
    Deleted,
}

/// One entry of a chat's message log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Owning chat.
    pub chat_id: ChatId,
    /// Position in the chat log, dense from 0.
    pub index: u64,
    /// Original author.
    pub sender: Identity,
    /// Append time.
    pub created_at: Timestamp,
    /// Lifecycle state.
    pub state: MessageState,
}

impl Message {
    /// Creates a freshly appended, active message.
    #[must_use]
    pub fn new(
        chat_id: ChatId,
        index: u64,
        sender: Identity,
        content: String,
        created_at: Timestamp,
    ) -> Self {
        Self {
            chat_id,
            index,
            sender,
            created_at,
            state: MessageState::Active { content },
        }
    }

    /// Current content; empty once deleted.
    #[must_use]
    pub fn content(&self) -> &str {
        self.state.content()
    }

    /// Time of the latest edit, 0 if never edited.
    #[must_use]
    pub fn updated_at(&self) -> Timestamp {
        self.state.updated_at()
    }

    /// True once soft-deleted.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.state.is_deleted()
    }

    /// Replaces the content.
    ///
    /// The edit time never goes backwards and is always non-zero, so
    /// `updated_at() > 0` reliably means "edited".
    pub fn edit(&mut self, new_content: String, now: Timestamp) -> LedgerResult<()> {
        let edited_at = now
            .max(self.updated_at())
            .max(self.created_at)
            .max(1);
        self.state = self
            .state
            .edit(new_content, edited_at)
            .ok_or(LedgerError::MessageDeleted {
                chat_id: self.chat_id,
                index: self.index,
            })?;
        Ok(())
    }

    /// Soft-deletes the message, keeping its position and timestamps.
    pub fn delete(&mut self) -> LedgerResult<()> {
        self.state = self.state.delete().ok_or(LedgerError::MessageDeleted {
            chat_id: self.chat_id,
            index: self.index,
        })?;
        Ok(())
    }
}

/// Flat read model of a message, the shape clients render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageView {
    pub chat_id: ChatId,
    pub index: u64,
    pub sender: Identity,
    pub content: String,
    pub created_at: Timestamp,
    /// 0 = never edited.
    pub updated_at: Timestamp,
    pub deleted: bool,
}

impl From<&Message> for MessageView {
    fn from(message: &Message) -> Self {
        Self {
            chat_id: message.chat_id,
            index: message.index,
            sender: message.sender,
            content: message.content().to_string(),
            created_at: message.created_at,
            updated_at: message.updated_at(),
            deleted: message.is_deleted(),
        }
    }
}

// =============================================================================
// SETTINGS & CONFIG
// =============================================================================

/// Ledger-wide settings, persisted with the data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSettings {
    /// Identity allowed to run administrative operations.
    pub owner: Identity,
    /// Fee required per appended message.
    pub message_fee: Amount,
    /// Maximum message content length in bytes.
    pub max_message_length: usize,
    /// Collected, not yet withdrawn fees.
    pub fee_pool: Amount,
    /// Record layout version.
    pub schema_version: u32,
}

impl From<&LedgerConfig> for LedgerSettings {
    fn from(config: &LedgerConfig) -> Self {
        Self {
            owner: config.owner,
            message_fee: config.message_fee,
            max_message_length: config.max_message_length,
            fee_pool: Amount::zero(),
            schema_version: SCHEMA_VERSION,
        }
    }
}

/// Initial configuration, applied when a ledger is opened on an empty store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Initial owner.
    pub owner: Identity,
    /// Initial per-message fee (default: 10^14 units).
    pub message_fee: Amount,
    /// Initial content bound in bytes (default: 1000).
    pub max_message_length: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            owner: Identity::ZERO,
            message_fee: Amount::from(100_000_000_000_000u64),
            max_message_length: 1000,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
