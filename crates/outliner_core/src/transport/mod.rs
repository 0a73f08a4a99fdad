//! Remote service boundary.
//!
//! # Responsibility
//! - Define the contract the outline uses to load and persist items.
//! - Provide an HTTP implementation and an in-memory one.
//!
//! # Invariants
//! - A failed submit must leave the caller free to keep its local state
//!   untouched: implementations never report success for a failed call.
//! - No retries happen at this layer.

pub mod http;
pub mod memory;
pub mod operation;
pub mod session;

use crate::error::OutlineResult;
use crate::model::wire::InitializationPayload;
use operation::Operation;
use std::time::{SystemTime, UNIX_EPOCH};

pub use http::HttpTransport;
pub use memory::MemoryTransport;
pub use operation::OperationType;
pub use session::SessionId;

/// Remote outline service.
pub trait Transport {
    /// Loads the full item tree plus account/session bookkeeping.
    fn fetch_initialization_payload(&mut self) -> OutlineResult<InitializationPayload>;

    /// Persists one mutation. Returns only after the service answered.
    fn submit_operation(&mut self, operation: &Operation) -> OutlineResult<()>;

    /// Best-effort current time in unix seconds, used for local echoes.
    fn current_timestamp(&self) -> i64 {
        unix_now_seconds()
    }
}

pub(crate) fn unix_now_seconds() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs() as i64)
        .unwrap_or(0)
}
