//! Crate-wide error model.
//!
//! # Responsibility
//! - Give every failure one of a small, fixed set of kinds.
//! - Keep transport/decoding failures distinguishable from illegal
//!   structural mutations.
//!
//! # Invariants
//! - Errors are raised synchronously at the point of violation.
//! - Validation errors are produced before any network call.

use crate::model::item::ItemId;
use crate::transport::operation::OperationType;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type used across outliner core APIs.
pub type OutlineResult<T> = Result<T, OutlineError>;

/// Coarse error category, for callers that only branch on kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Auth,
    Protocol,
    RemoteRejected,
    InvalidOperation,
    NotFound,
}

/// Structural mutations that are never allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidOperation {
    /// Item was asked to become its own child.
    SelfMove(ItemId),
    /// The synthetic root was used as a move destination.
    MoveToRoot(ItemId),
    /// Destination lies inside the moved item's own subtree.
    MoveIntoDescendant {
        item_id: ItemId,
        destination_id: ItemId,
    },
    /// The synthetic root itself was asked to move.
    MoveRoot,
    /// The synthetic root was asked to be deleted.
    DeleteRoot,
}

impl Display for InvalidOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SelfMove(id) => write!(f, "item {id} cannot be moved into itself"),
            Self::MoveToRoot(id) => {
                write!(f, "item {id} cannot be moved: root is not a move destination")
            }
            Self::MoveIntoDescendant {
                item_id,
                destination_id,
            } => write!(
                f,
                "destination {destination_id} is a descendant of moved item {item_id}"
            ),
            Self::MoveRoot => write!(f, "the root item cannot be moved"),
            Self::DeleteRoot => write!(f, "the root item cannot be deleted"),
        }
    }
}

/// Errors from outliner core operations.
#[derive(Debug)]
pub enum OutlineError {
    /// Malformed caller input (session id, search pattern, config value).
    Validation(String),
    /// Login rejected or no session cookie returned.
    Auth(String),
    /// Transport/HTTP failure or malformed server payload.
    Protocol(String),
    /// Server answered but flagged the submitted operation as failed.
    RemoteRejected {
        operation: OperationType,
        message: String,
    },
    /// Illegal structural mutation.
    InvalidOperation(InvalidOperation),
    /// Lookup by an id the outline does not contain.
    NotFound(ItemId),
}

impl OutlineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Auth(_) => ErrorKind::Auth,
            Self::Protocol(_) => ErrorKind::Protocol,
            Self::RemoteRejected { .. } => ErrorKind::RemoteRejected,
            Self::InvalidOperation(_) => ErrorKind::InvalidOperation,
            Self::NotFound(_) => ErrorKind::NotFound,
        }
    }
}

impl Display for OutlineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(message) => write!(f, "invalid input: {message}"),
            Self::Auth(message) => write!(f, "authentication failed: {message}"),
            Self::Protocol(message) => write!(f, "protocol error: {message}"),
            Self::RemoteRejected { operation, message } => write!(
                f,
                "remote rejected `{}` operation: {message}",
                operation.as_str()
            ),
            Self::InvalidOperation(op) => write!(f, "invalid operation: {op}"),
            Self::NotFound(id) => write!(f, "item not found: {id}"),
        }
    }
}

impl Error for OutlineError {}

impl From<InvalidOperation> for OutlineError {
    fn from(value: InvalidOperation) -> Self {
        Self::InvalidOperation(value)
    }
}

impl From<reqwest::Error> for OutlineError {
    fn from(value: reqwest::Error) -> Self {
        match value.status() {
            Some(status) => Self::Protocol(format!("http status {status}: {value}")),
            None => Self::Protocol(format!("request failed: {value}")),
        }
    }
}

impl From<serde_json::Error> for OutlineError {
    fn from(value: serde_json::Error) -> Self {
        Self::Protocol(format!("malformed payload: {value}"))
    }
}
