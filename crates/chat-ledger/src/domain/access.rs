//! # Access Control
//!
//! Authorization predicates shared by every ledger operation, so chat,
//! message and admin checks cannot drift apart.

use crate::domain::entities::{Chat, LedgerSettings, Message};
use crate::domain::value_objects::Identity;
use crate::errors::{LedgerError, LedgerResult};

/// True if `identity` is one of the chat's two participants.
#[must_use]
pub fn is_participant(chat: &Chat, identity: &Identity) -> bool {
    chat.participant_a == *identity || chat.participant_b == *identity
}

/// True if `identity` authored the message.
#[must_use]
pub fn is_original_sender(message: &Message, identity: &Identity) -> bool {
    message.sender == *identity
}

/// True if `identity` owns the ledger.
#[must_use]
pub fn is_owner(settings: &LedgerSettings, identity: &Identity) -> bool {
    settings.owner == *identity
}

/// Fails with [`LedgerError::NotParticipant`] unless `caller` is in the chat.
pub fn require_participant(chat: &Chat, caller: &Identity) -> LedgerResult<()> {
    if is_participant(chat, caller) {
        Ok(())
    } else {
        Err(LedgerError::NotParticipant {
            chat_id: chat.id,
            caller: *caller,
        })
    }
}

/// Fails with [`LedgerError::NotSender`] unless `caller` authored the message.
pub fn require_original_sender(message: &Message, caller: &Identity) -> LedgerResult<()> {
    if is_original_sender(message, caller) {
        Ok(())
    } else {
        Err(LedgerError::NotSender {
            chat_id: message.chat_id,
            index: message.index,
            caller: *caller,
        })
    }
}

/// Fails with [`LedgerError::NotOwner`] unless `caller` owns the ledger.
pub fn require_owner(settings: &LedgerSettings, caller: &Identity) -> LedgerResult<()> {
    if is_owner(settings, caller) {
        Ok(())
    } else {
        Err(LedgerError::NotOwner(*caller))
    }
}
