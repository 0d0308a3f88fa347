//! # Chat Ledger - Fee-Gated Peer-to-Peer Messaging
//!
//! ## Purpose
//!
//! A ledger of pairwise conversations between participant identities. Each
//! chat holds an ordered, append-mostly message log; messages can be edited
//! or soft-deleted by their author, and every new message pays a fee that is
//! collected in the same commit that stores it.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | Symmetric chat id | `domain/services.rs` - `derive_chat_id()` |
//! | One chat per unordered pair | `ledger/registry.rs` - `stage_create()` |
//! | Dense indices, count == log length | `ledger/message_log.rs` - `stage_append()` |
//! | Deleted messages are immutable | `domain/entities.rs` - `MessageState` |
//! | `updated_at` never decreases | `domain/entities.rs` - `Message::edit()` |
//! | Fee and message commit together | `service.rs` - `ChatLedger::send_message()` |
//! | All-or-nothing writes | `service.rs` - `ChatLedger::commit()` |
//!
//! ## Error Taxonomy
//!
//! | Kind | Raised when |
//! |------|-------------|
//! | `Validation` | self-chat, zero identity, empty or oversize content |
//! | `NotFound` | unknown chat or message |
//! | `Permission` | non-participant, non-sender, non-owner |
//! | `Payment` | payment below the message fee |
//! | `State` | duplicate chat, mutation of a deleted message |
//! | `Storage` | store I/O or record decoding failure |
//!
//! ## Outbound Dependencies
//!
//! | Trait | Purpose | Adapters |
//! |-------|---------|----------|
//! | `KeyValueStore` | Records, atomic batch commit | `InMemoryKVStore`, `FileBackedKVStore` |
//! | `TimeSource` | Message and edit timestamps | `SystemTimeSource`, `MockTimeSource` |
//! | `EventPublisher` | Committed-change events | `NoOpPublisher`, `RecordingPublisher` |
//!
//! ## Usage Example
//!
//! ```
//! use chat_ledger::prelude::*;
//!
//! let alice: Identity = "0x00000000000000000000000000000000000000a1".parse().unwrap();
//! let bob: Identity = "0x00000000000000000000000000000000000000b2".parse().unwrap();
//!
//! let mut ledger = ChatLedger::in_memory(LedgerConfig {
//!     owner: alice,
//!     ..LedgerConfig::default()
//! })
//! .unwrap();
//!
//! let chat_id = ledger.create_chat(alice, bob).unwrap();
//! let fee = ledger.get_message_fee().unwrap();
//! ledger.send_message(bob, chat_id, "hi".into(), fee).unwrap();
//!
//! assert_eq!(ledger.get_message_count(chat_id).unwrap(), 1);
//! assert_eq!(ledger.get_fee_pool().unwrap(), fee);
//! ```

// Crate-level lints
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod domain;
pub mod errors;
pub mod events;
pub mod ledger;
pub mod ports;
pub mod service;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Domain
    pub use crate::domain::entities::{
        Chat, LedgerConfig, LedgerSettings, Message, MessageState, MessageStatus, MessageView,
    };
    pub use crate::domain::invariants::{InvariantCheckResult, InvariantViolation};
    pub use crate::domain::services::derive_chat_id;
    pub use crate::domain::value_objects::{Amount, ChatId, Identity, Timestamp, U256};

    // Ports
    pub use crate::ports::inbound::{LedgerCommands, LedgerQueries};
    pub use crate::ports::outbound::{
        EventPublisher, KeyValueStore, MockTimeSource, SystemTimeSource, TimeSource,
    };

    // Events & errors
    pub use crate::errors::{ErrorKind, LedgerError, LedgerErrorPayload, LedgerResult};
    pub use crate::events::LedgerEvent;

    // Adapters
    pub use crate::adapters::{
        FileBackedKVStore, InMemoryKVStore, NoOpPublisher, RecordingPublisher,
    };

    // Service
    pub use crate::service::{AuditReport, ChatLedger, LedgerStats};
}

// =============================================================================
// CRATE INFO
// =============================================================================

/// Crate version, reported by `get_version`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
