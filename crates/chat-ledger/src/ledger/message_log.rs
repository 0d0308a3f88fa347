//! # Message Log
//!
//! Per-chat message sequences. Entries are keyed by `(chat_id, index)` and
//! are never removed; the owning `Chat::message_count` is the log length.

use crate::domain::entities::{Chat, Message};
use crate::domain::value_objects::{ChatId, Identity, Timestamp};
use crate::errors::{LedgerError, LedgerResult, StoreError};
use crate::ledger::keys::{self, message_key, message_prefix, read_record};
use crate::ledger::WriteBatch;
use crate::ports::outbound::KeyValueStore;

/// Borrowed view of the message entries in a store.
pub struct MessageLog<'s, S: KeyValueStore + ?Sized> {
    store: &'s S,
}

impl<'s, S: KeyValueStore + ?Sized> MessageLog<'s, S> {
    /// Wraps a store.
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// The entry at `index`, if present.
    pub fn find(&self, chat_id: &ChatId, index: u64) -> LedgerResult<Option<Message>> {
        read_record(self.store, &message_key(chat_id, index))
    }

    /// The entry at `index`, or [`LedgerError::MessageNotFound`].
    pub fn get(&self, chat_id: &ChatId, index: u64) -> LedgerResult<Message> {
        self.find(chat_id, index)?.ok_or(LedgerError::MessageNotFound {
            chat_id: *chat_id,
            index,
        })
    }

    /// Up to `limit` entries of `chat` starting at `offset`, in index order.
    ///
    /// Empty when `offset >= message_count`. Deleted entries are included.
    pub fn range(&self, chat: &Chat, offset: u64, limit: u64) -> LedgerResult<Vec<Message>> {
        if offset >= chat.message_count {
            return Ok(Vec::new());
        }
        let end = offset.saturating_add(limit).min(chat.message_count);

        (offset..end)
            .map(|index| -> LedgerResult<Message> {
                self.find(&chat.id, index)?.ok_or_else(|| {
                    LedgerError::from(StoreError::Corruption {
                        message: format!("chat {} is missing message {}", chat.id, index),
                    })
                })
            })
            .collect()
    }

    /// Every stored entry of `chat_id`, in index order.
    ///
    /// Unlike [`range`](Self::range) this does not trust `message_count`;
    /// audits use it to compare the two.
    pub fn scan(&self, chat_id: &ChatId) -> LedgerResult<Vec<Message>> {
        self.store
            .prefix_scan(&message_prefix(chat_id))?
            .iter()
            .map(|(_, bytes)| keys::decode(bytes))
            .collect()
    }

    /// Stages a new entry at the end of `chat` and bumps its count.
    ///
    /// Only the entry is staged; the caller stages the bumped chat through
    /// [`ChatRegistry::stage_update`](crate::ledger::ChatRegistry::stage_update).
    /// Participant, content and fee checks are also the caller's.
    pub fn stage_append(
        &self,
        chat: &mut Chat,
        sender: Identity,
        content: String,
        now: Timestamp,
        batch: &mut WriteBatch,
    ) -> LedgerResult<Message> {
        let message = Message::new(chat.id, chat.next_index(), sender, content, now);
        chat.message_count += 1;
        batch.put(message_key(&chat.id, message.index), &message)?;
        Ok(message)
    }

    /// Stages an updated entry in place.
    pub fn stage_update(&self, message: &Message, batch: &mut WriteBatch) -> LedgerResult<()> {
        batch.put(message_key(&message.chat_id, message.index), message)
    }
}
