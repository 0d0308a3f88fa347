//! # Chat Node
//!
//! Host process for the chat ledger.
//!
//! ## Modular Structure
//!
//! - `config` - Defaults plus `CHAT_*` environment overrides
//! - `payloads` - JSON-lines request/response types
//! - `handler` - Caller-aware dispatch under a read/write lock
//! - `server` - The async stdin → stdout request loop
//!
//! ## Startup Sequence
//!
//! 1. Initialize logging (stderr; stdout carries responses)
//! 2. Load configuration from the environment
//! 3. Open (or initialize) the file-backed ledger
//! 4. Serve requests until stdin closes

pub mod config;
pub mod handler;
pub mod payloads;
pub mod server;

pub use config::{load_config, ConfigError, NodeConfig};
pub use handler::RequestHandler;
pub use payloads::{CorrelationId, Request, RequestEnvelope, ResponseEnvelope};
pub use server::serve;
