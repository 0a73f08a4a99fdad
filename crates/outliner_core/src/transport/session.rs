//! Session identifier validation.

use crate::error::{OutlineError, OutlineResult};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::{Debug, Formatter};

static SESSION_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]{32}$").expect("session id pattern is a valid regex"));

/// Validated session cookie value.
///
/// `Debug` is redacted so the secret never reaches logs.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionId(String);

impl SessionId {
    /// Validates a session id: exactly 32 lowercase alphanumeric chars.
    pub fn parse(value: &str) -> OutlineResult<Self> {
        if !SESSION_ID_PATTERN.is_match(value) {
            return Err(OutlineError::Validation(
                "session id must be 32 lowercase alphanumeric characters".to_string(),
            ));
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Debug for SessionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "SessionId(<redacted>)")
    }
}
