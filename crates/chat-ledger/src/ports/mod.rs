//! # Ports Layer (Middle Hexagon)
//!
//! Trait definitions between the ledger and the outside world.
//!
//! - **Driving Ports (Inbound)**: `LedgerCommands`, `LedgerQueries`
//! - **Driven Ports (Outbound)**: `KeyValueStore`, `TimeSource`, `EventPublisher`
//! - No concrete storage implementations in this module

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
