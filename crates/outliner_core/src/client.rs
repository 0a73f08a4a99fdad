//! Session-level entry points.
//!
//! # Responsibility
//! - Turn credentials or a stored session id into a ready outline.
//! - Load account attributes and the item tree from one payload fetch.
//!
//! # Invariants
//! - Session ids are validated before any request is made.

use crate::account::Account;
use crate::config::ClientConfig;
use crate::error::OutlineResult;
use crate::transport::{HttpTransport, SessionId, Transport};
use crate::tree::Outline;
use log::info;

/// Account plus outline loaded from a single initialization payload.
pub struct Session<T: Transport> {
    account: Account,
    outline: Outline<T>,
}

impl<T: Transport> Session<T> {
    /// Fetches the payload once and builds both views from it.
    pub fn open(mut transport: T, max_depth: usize) -> OutlineResult<Self> {
        let payload = transport.fetch_initialization_payload()?;
        let account = Account::from_payload(&payload);
        let outline = Outline::from_payload(transport, payload, max_depth)?;
        Ok(Self { account, outline })
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn outline(&self) -> &Outline<T> {
        &self.outline
    }

    pub fn outline_mut(&mut self) -> &mut Outline<T> {
        &mut self.outline
    }

    pub fn into_parts(self) -> (Account, Outline<T>) {
        (self.account, self.outline)
    }
}

/// HTTP client facade.
#[derive(Debug, Clone, Default)]
pub struct Client {
    config: ClientConfig,
}

impl Client {
    pub fn new(config: ClientConfig) -> OutlineResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Exchanges credentials for a session id.
    pub fn login(&self, username: &str, password: &str) -> OutlineResult<SessionId> {
        HttpTransport::login(&self.config, username, password)
    }

    /// Opens a session from a stored session id.
    ///
    /// # Errors
    /// - `Validation` for a malformed session id, before any request.
    /// - Transport and payload errors from the initial fetch.
    pub fn connect(&self, session_id: &str) -> OutlineResult<Session<HttpTransport>> {
        let session = SessionId::parse(session_id)?;
        let transport = HttpTransport::new(&self.config, session)?;
        let opened = Session::open(transport, self.config.max_depth)?;
        info!(
            "event=session_open module=client status=ok items={}",
            opened.outline().len() - 1
        );
        Ok(opened)
    }
}

#[cfg(test)]
mod tests {
    use super::{Client, Session};
    use crate::config::DEFAULT_MAX_DEPTH;
    use crate::error::ErrorKind;
    use crate::transport::MemoryTransport;
    use serde_json::json;

    #[test]
    fn connect_rejects_malformed_session_before_network() {
        let client = Client::default();
        let err = client.connect("NOT-A-SESSION").err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn session_fetches_payload_once() {
        let transport = MemoryTransport::from_json(json!({
            "projectTreeData": { "mainProjectTreeInfo": {
                "rootProjectChildren": [{ "id": "a", "nm": "A" }]
            }},
            "user": "me@example.com"
        }))
        .unwrap();

        let session = Session::open(transport, DEFAULT_MAX_DEPTH).unwrap();
        assert_eq!(session.account().email(), "me@example.com");
        assert_eq!(session.outline().len(), 2);
        assert_eq!(session.outline().transport().fetch_count(), 1);
    }
}
