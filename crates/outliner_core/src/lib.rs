//! Client-side model of a remote hierarchical outliner.
//! This crate rebuilds the remote item tree in memory and keeps it
//! consistent with every mutation it mirrors to the service.

pub mod account;
pub mod client;
pub mod config;
pub mod error;
pub mod ids;
pub mod logging;
pub mod model;
pub mod transport;
pub mod tree;

pub use account::Account;
pub use client::{Client, Session};
pub use config::{ClientConfig, LoggingConfig};
pub use error::{ErrorKind, InvalidOperation, OutlineError, OutlineResult};
pub use ids::{generate_item_id, is_valid_item_id, IdGenerator, RandomIdGenerator};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::item::{ItemId, OutlineItem, ROOT_ID};
pub use model::wire::{InitializationPayload, RawItem};
pub use transport::operation::{Operation, OperationType};
pub use transport::{HttpTransport, MemoryTransport, SessionId, Transport};
pub use tree::{NewItem, Outline, SearchOptions};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
