//! # Ledger Components
//!
//! Storage-facing components of the ledger. Readers go straight to the
//! store; writers only ever stage into a [`WriteBatch`], which the
//! [`ChatLedger`](crate::service::ChatLedger) commits in one
//! `atomic_batch_write`.
//!
//! - `registry`: chat records and the identity → chats reverse index
//! - `message_log`: per-chat message sequences
//! - `queries`: the read-only facade

pub mod keys;
pub mod message_log;
pub mod queries;
pub mod registry;

pub use message_log::MessageLog;
pub use registry::ChatRegistry;

use crate::errors::LedgerResult;
use crate::events::LedgerEvent;
use crate::ports::outbound::BatchOperation;
use serde::Serialize;

/// Staged effects of one ledger operation.
///
/// Dropping a batch discards it; nothing reaches the store until commit.
#[derive(Debug, Default)]
pub struct WriteBatch {
    operations: Vec<BatchOperation>,
    events: Vec<LedgerEvent>,
}

impl WriteBatch {
    /// Creates an empty batch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages an encoded record under `key`.
    pub fn put<T: Serialize>(&mut self, key: Vec<u8>, record: &T) -> LedgerResult<()> {
        self.operations
            .push(BatchOperation::put(key, keys::encode(record)?));
        Ok(())
    }

    /// Stages an event, published only if the batch commits.
    pub fn emit(&mut self, event: LedgerEvent) {
        self.events.push(event);
    }

    /// Number of staged writes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// True if nothing is staged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Splits the batch into store operations and events.
    #[must_use]
    pub fn into_parts(self) -> (Vec<BatchOperation>, Vec<LedgerEvent>) {
        (self.operations, self.events)
    }
}
