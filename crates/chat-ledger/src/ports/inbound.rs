//! # Driving Ports (API - Inbound)
//!
//! The operations the ledger exposes to its host.
//!
//! - [`LedgerCommands`]: state-changing operations. The caller identity is an
//!   explicit parameter supplied by the host, never read from a payload.
//! - [`LedgerQueries`]: pure reads over the last committed state.

use crate::domain::entities::{Chat, Message};
use crate::domain::value_objects::{Amount, ChatId, Identity};
use crate::errors::LedgerResult;

/// State-changing ledger operations.
///
/// Every method is all-or-nothing: on `Err` no record, fee or counter has
/// changed.
pub trait LedgerCommands {
    /// Opens a chat between `caller` and `other`.
    fn create_chat(&mut self, caller: Identity, other: Identity) -> LedgerResult<ChatId>;

    /// Appends a message, collecting `payment` in the same commit.
    fn send_message(
        &mut self,
        caller: Identity,
        chat_id: ChatId,
        content: String,
        payment: Amount,
    ) -> LedgerResult<Message>;

    /// Replaces the content of one of the caller's own messages.
    fn edit_message(
        &mut self,
        caller: Identity,
        chat_id: ChatId,
        index: u64,
        new_content: String,
    ) -> LedgerResult<()>;

    /// Soft-deletes one of the caller's own messages.
    fn delete_message(&mut self, caller: Identity, chat_id: ChatId, index: u64)
        -> LedgerResult<()>;

    /// Owner only.
    fn set_message_fee(&mut self, caller: Identity, fee: Amount) -> LedgerResult<()>;

    /// Owner only. `max_length` must be positive.
    fn set_max_message_length(&mut self, caller: Identity, max_length: usize)
        -> LedgerResult<()>;

    /// Owner only. Empties the fee pool and returns what it held.
    fn withdraw_fees(&mut self, caller: Identity) -> LedgerResult<Amount>;

    /// Owner only.
    fn transfer_ownership(&mut self, caller: Identity, new_owner: Identity) -> LedgerResult<()>;
}

/// Read-only ledger operations. No authentication required.
pub trait LedgerQueries {
    /// Chat id for a pair of identities, whether or not the chat exists.
    fn get_chat_id(&self, a: Identity, b: Identity) -> LedgerResult<ChatId>;

    /// The chat record.
    fn get_chat(&self, chat_id: ChatId) -> LedgerResult<Chat>;

    /// Chats `identity` takes part in, in creation order.
    fn get_user_chats(&self, identity: Identity) -> LedgerResult<Vec<ChatId>>;

    /// Up to `limit` messages starting at `offset`, in index order.
    fn get_messages(&self, chat_id: ChatId, offset: u64, limit: u64)
        -> LedgerResult<Vec<Message>>;

    /// A single message.
    fn get_message(&self, chat_id: ChatId, index: u64) -> LedgerResult<Message>;

    /// Messages ever appended; 0 for an unknown chat.
    fn get_message_count(&self, chat_id: ChatId) -> LedgerResult<u64>;

    /// Fee required per message.
    fn get_message_fee(&self) -> LedgerResult<Amount>;

    /// Content bound in bytes.
    fn get_max_message_length(&self) -> LedgerResult<usize>;

    /// Current owner.
    fn get_owner(&self) -> LedgerResult<Identity>;

    /// Collected, not yet withdrawn fees.
    fn get_fee_pool(&self) -> LedgerResult<Amount>;

    /// Crate version string.
    fn get_version(&self) -> &'static str;
}
