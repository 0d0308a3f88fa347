//! Persisted layout: record keys and the bincode codec.
//!
//! | Key | Value |
//! |-----|-------|
//! | `settings` | `LedgerSettings` |
//! | `chat:` ‖ chat_id | `Chat` |
//! | `msg:` ‖ chat_id ‖ index (u64 BE) | `Message` |
//! | `user:` ‖ identity | `Vec<ChatId>` |
//!
//! Big-endian indices keep a chat's messages in index order under a prefix
//! scan.

use crate::domain::value_objects::{ChatId, Identity};
use crate::errors::LedgerResult;
use crate::ports::outbound::KeyValueStore;
use serde::de::DeserializeOwned;
use serde::Serialize;

pub const SETTINGS_KEY: &[u8] = b"settings";
pub const CHAT_PREFIX: &[u8] = b"chat:";
pub const MESSAGE_PREFIX: &[u8] = b"msg:";
pub const USER_PREFIX: &[u8] = b"user:";

pub fn chat_key(chat_id: &ChatId) -> Vec<u8> {
    [CHAT_PREFIX, chat_id.as_bytes().as_slice()].concat()
}

pub fn message_prefix(chat_id: &ChatId) -> Vec<u8> {
    [MESSAGE_PREFIX, chat_id.as_bytes().as_slice()].concat()
}

pub fn message_key(chat_id: &ChatId, index: u64) -> Vec<u8> {
    [MESSAGE_PREFIX, chat_id.as_bytes().as_slice(), index.to_be_bytes().as_slice()].concat()
}

pub fn user_key(identity: &Identity) -> Vec<u8> {
    [USER_PREFIX, identity.as_bytes().as_slice()].concat()
}

pub fn encode<T: Serialize>(record: &T) -> LedgerResult<Vec<u8>> {
    Ok(bincode::serialize(record)?)
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> LedgerResult<T> {
    Ok(bincode::deserialize(bytes)?)
}

/// Reads and decodes one record.
pub fn read_record<S, T>(store: &S, key: &[u8]) -> LedgerResult<Option<T>>
where
    S: KeyValueStore + ?Sized,
    T: DeserializeOwned,
{
    store.get(key)?.map(|bytes| decode(&bytes)).transpose()
}
