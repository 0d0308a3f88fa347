//! # Domain Layer (Inner Hexagon)
//!
//! Pure business logic for the chat ledger.
//! NO I/O, NO async, NO storage access.
//!
//! - This is the **inner layer** of the hexagonal architecture.
//! - Dependencies point INWARD only (the ledger and adapters depend on this).

pub mod access;
pub mod entities;
pub mod fees;
pub mod invariants;
pub mod services;
pub mod value_objects;

pub use access::*;
pub use entities::*;
pub use fees::*;
pub use invariants::*;
pub use services::*;
pub use value_objects::*;
