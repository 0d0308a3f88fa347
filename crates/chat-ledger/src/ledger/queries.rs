//! # Query Facade
//!
//! Read-only lookups and pagination over the last committed state.
//! Nothing here writes, and no caller identity is required.

use crate::domain::entities::{Chat, Message};
use crate::domain::services::derive_chat_id;
use crate::domain::value_objects::{Amount, ChatId, Identity};
use crate::errors::LedgerResult;
use crate::ledger::{ChatRegistry, MessageLog};
use crate::ports::inbound::LedgerQueries;
use crate::ports::outbound::{EventPublisher, KeyValueStore, TimeSource};
use crate::service::ChatLedger;
use tracing::debug;

impl<S, T, P> LedgerQueries for ChatLedger<S, T, P>
where
    S: KeyValueStore,
    T: TimeSource,
    P: EventPublisher,
{
    fn get_chat_id(&self, a: Identity, b: Identity) -> LedgerResult<ChatId> {
        derive_chat_id(&a, &b)
    }

    fn get_chat(&self, chat_id: ChatId) -> LedgerResult<Chat> {
        ChatRegistry::new(self.store()).get(&chat_id)
    }

    fn get_user_chats(&self, identity: Identity) -> LedgerResult<Vec<ChatId>> {
        ChatRegistry::new(self.store()).user_chats(&identity)
    }

    fn get_messages(
        &self,
        chat_id: ChatId,
        offset: u64,
        limit: u64,
    ) -> LedgerResult<Vec<Message>> {
        let Some(chat) = ChatRegistry::new(self.store()).find(&chat_id)? else {
            return Ok(Vec::new());
        };
        let page = MessageLog::new(self.store()).range(&chat, offset, limit)?;
        debug!(%chat_id, offset, limit, returned = page.len(), "Messages read");
        Ok(page)
    }

    fn get_message(&self, chat_id: ChatId, index: u64) -> LedgerResult<Message> {
        MessageLog::new(self.store()).get(&chat_id, index)
    }

    fn get_message_count(&self, chat_id: ChatId) -> LedgerResult<u64> {
        Ok(ChatRegistry::new(self.store())
            .find(&chat_id)?
            .map_or(0, |chat| chat.message_count))
    }

    fn get_message_fee(&self) -> LedgerResult<Amount> {
        Ok(self.settings()?.message_fee)
    }

    fn get_max_message_length(&self) -> LedgerResult<usize> {
        Ok(self.settings()?.max_message_length)
    }

    fn get_owner(&self) -> LedgerResult<Identity> {
        Ok(self.settings()?.owner)
    }

    fn get_fee_pool(&self) -> LedgerResult<Amount> {
        Ok(self.settings()?.fee_pool)
    }

    fn get_version(&self) -> &'static str {
        crate::VERSION
    }
}
