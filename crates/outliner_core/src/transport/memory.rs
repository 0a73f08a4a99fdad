//! In-process transport.
//!
//! Serves a fixed initialization payload and records every accepted
//! operation. Failures can be scheduled to exercise error paths.

use super::operation::Operation;
use super::Transport;
use crate::error::{OutlineError, OutlineResult};
use crate::model::wire::InitializationPayload;
use log::debug;
use serde_json::Value;

/// Transport that never leaves the process.
#[derive(Debug)]
pub struct MemoryTransport {
    payload: InitializationPayload,
    submitted: Vec<Operation>,
    // (successful submits still allowed, error to raise afterwards)
    pending_failure: Option<(usize, OutlineError)>,
    clock: Option<i64>,
    fetch_count: usize,
}

impl MemoryTransport {
    pub fn new(payload: InitializationPayload) -> Self {
        Self {
            payload,
            submitted: Vec::new(),
            pending_failure: None,
            clock: None,
            fetch_count: 0,
        }
    }

    /// Creates a transport from a JSON payload document.
    pub fn from_json(value: Value) -> OutlineResult<Self> {
        Ok(Self::new(InitializationPayload::from_value(value)?))
    }

    /// Pins `current_timestamp` to a fixed value.
    pub fn with_clock(mut self, now_seconds: i64) -> Self {
        self.clock = Some(now_seconds);
        self
    }

    /// Fails the next submit with `error`.
    pub fn fail_next_submit(&mut self, error: OutlineError) {
        self.fail_submit_after(0, error);
    }

    /// Lets `successes` submits through, then fails one with `error`.
    pub fn fail_submit_after(&mut self, successes: usize, error: OutlineError) {
        self.pending_failure = Some((successes, error));
    }

    /// Operations accepted so far, in submission order.
    pub fn submitted(&self) -> &[Operation] {
        &self.submitted
    }

    pub fn fetch_count(&self) -> usize {
        self.fetch_count
    }
}

impl Transport for MemoryTransport {
    fn fetch_initialization_payload(&mut self) -> OutlineResult<InitializationPayload> {
        self.fetch_count += 1;
        Ok(self.payload.clone())
    }

    fn submit_operation(&mut self, operation: &Operation) -> OutlineResult<()> {
        if let Some((remaining, error)) = self.pending_failure.take() {
            if remaining == 0 {
                debug!(
                    "event=submit module=memory_transport status=error op={} item_id={}",
                    operation.kind().as_str(),
                    operation.item_id()
                );
                return Err(error);
            }
            self.pending_failure = Some((remaining - 1, error));
        }
        self.submitted.push(operation.clone());
        Ok(())
    }

    fn current_timestamp(&self) -> i64 {
        self.clock.unwrap_or_else(super::unix_now_seconds)
    }
}
