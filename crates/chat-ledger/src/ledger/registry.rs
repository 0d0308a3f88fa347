//! # Chat Registry
//!
//! Chat records keyed by `ChatId` plus the identity → chats reverse index.

use crate::domain::entities::Chat;
use crate::domain::services::derive_chat_id;
use crate::domain::value_objects::{ChatId, Identity, Timestamp};
use crate::errors::{LedgerError, LedgerResult};
use crate::events::LedgerEvent;
use crate::ledger::keys::{self, chat_key, read_record, user_key, CHAT_PREFIX};
use crate::ledger::WriteBatch;
use crate::ports::outbound::KeyValueStore;

/// Borrowed view of the chat records in a store.
pub struct ChatRegistry<'s, S: KeyValueStore + ?Sized> {
    store: &'s S,
}

impl<'s, S: KeyValueStore + ?Sized> ChatRegistry<'s, S> {
    /// Wraps a store.
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// The chat, if it exists.
    pub fn find(&self, chat_id: &ChatId) -> LedgerResult<Option<Chat>> {
        read_record(self.store, &chat_key(chat_id))
    }

    /// The chat, or [`LedgerError::ChatNotFound`].
    pub fn get(&self, chat_id: &ChatId) -> LedgerResult<Chat> {
        self.find(chat_id)?
            .ok_or(LedgerError::ChatNotFound(*chat_id))
    }

    /// Chats of `identity` in creation order; empty if none.
    pub fn user_chats(&self, identity: &Identity) -> LedgerResult<Vec<ChatId>> {
        Ok(read_record(self.store, &user_key(identity))?.unwrap_or_default())
    }

    /// Every chat record, ordered by chat id.
    pub fn all(&self) -> LedgerResult<Vec<Chat>> {
        self.store
            .prefix_scan(CHAT_PREFIX)?
            .iter()
            .map(|(_, bytes)| keys::decode(bytes))
            .collect()
    }

    /// Stages a new chat between `creator` and `other`.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::SelfChat`] if `other == creator`
    /// - [`LedgerError::ZeroIdentity`] if either side is the zero identity
    /// - [`LedgerError::ChatAlreadyExists`] if the pair already has a chat
    pub fn stage_create(
        &self,
        creator: Identity,
        other: Identity,
        now: Timestamp,
        batch: &mut WriteBatch,
    ) -> LedgerResult<Chat> {
        if creator.is_zero() || other.is_zero() {
            return Err(LedgerError::ZeroIdentity);
        }
        let chat_id = derive_chat_id(&creator, &other)?;
        if self.store.exists(&chat_key(&chat_id))? {
            return Err(LedgerError::ChatAlreadyExists(chat_id));
        }

        let chat = Chat::new(chat_id, creator, other, now);
        batch.put(chat_key(&chat_id), &chat)?;

        for participant in [creator, other] {
            let mut chats = self.user_chats(&participant)?;
            chats.push(chat_id);
            batch.put(user_key(&participant), &chats)?;
        }

        batch.emit(LedgerEvent::ChatCreated {
            chat_id,
            creator,
            other,
            timestamp: now,
        });
        Ok(chat)
    }

    /// Stages an updated chat record, such as a bumped message count.
    pub fn stage_update(&self, chat: &Chat, batch: &mut WriteBatch) -> LedgerResult<()> {
        batch.put(chat_key(&chat.id), chat)
    }
}
