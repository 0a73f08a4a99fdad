//! Blocking HTTP transport for the hosted outline service.
//!
//! # Responsibility
//! - Exchange credentials for a session cookie.
//! - Fetch the initialization payload and push single-operation batches.
//!
//! # Invariants
//! - Operations are only pushed after the payload was fetched, since the
//!   push needs the client id and latest transaction id.
//! - The session id and password never appear in log lines.

use super::operation::Operation;
use super::session::SessionId;
use super::Transport;
use crate::config::ClientConfig;
use crate::error::{OutlineError, OutlineResult};
use crate::model::wire::InitializationPayload;
use log::{error, info, warn};
use reqwest::blocking::{Client, Response};
use reqwest::header::{ACCEPT, COOKIE, SET_COOKIE};
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use uuid::Uuid;

const LOGIN_PATH: &str = "ajax_login";
const INIT_PATH: &str = "get_initialization_data";
const PUSH_PATH: &str = "push_and_poll";
const SESSION_COOKIE: &str = "sessionid";
const PUSH_POLL_ID_LEN: usize = 8;

/// Session-bound HTTP transport.
pub struct HttpTransport {
    client: Client,
    config: ClientConfig,
    session: SessionId,
    client_id: Option<String>,
    transaction_id: Option<String>,
    joined_epoch_seconds: i64,
}

impl HttpTransport {
    /// Creates a transport for an existing session.
    pub fn new(config: &ClientConfig, session: SessionId) -> OutlineResult<Self> {
        config.validate()?;
        Ok(Self {
            client: build_client(config)?,
            config: config.clone(),
            session,
            client_id: None,
            transaction_id: None,
            joined_epoch_seconds: 0,
        })
    }

    /// Logs in and returns the session id from the `Set-Cookie` header.
    ///
    /// # Errors
    /// - `Validation` when username or password is blank (no request sent).
    /// - `Auth` when the service rejects the credentials or sets no cookie.
    /// - `Protocol` on transport failure.
    pub fn login(config: &ClientConfig, username: &str, password: &str) -> OutlineResult<SessionId> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(OutlineError::Validation(
                "username and password are required".to_string(),
            ));
        }
        config.validate()?;

        let started_at = Instant::now();
        info!("event=login module=transport status=start");
        let client = build_client(config)?;
        let response = client
            .post(config.endpoint(LOGIN_PATH))
            .header(ACCEPT, "application/json")
            .form(&[("username", username), ("password", password)])
            .send()?;

        let status = response.status();
        if status.is_client_error() {
            warn!(
                "event=login module=transport status=rejected http_status={} duration_ms={}",
                status.as_u16(),
                started_at.elapsed().as_millis()
            );
            return Err(OutlineError::Auth(format!(
                "credentials rejected (http {status})"
            )));
        }
        let response = response.error_for_status()?;

        let session = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find_map(session_from_set_cookie)
            .ok_or_else(|| {
                OutlineError::Auth("service did not return a session cookie".to_string())
            })?;
        let session = SessionId::parse(&session).map_err(|_| {
            OutlineError::Auth("service returned a malformed session cookie".to_string())
        })?;

        info!(
            "event=login module=transport status=ok duration_ms={}",
            started_at.elapsed().as_millis()
        );
        Ok(session)
    }

    fn post_with_session(&self, path: &str, form: &[(&str, String)]) -> OutlineResult<Response> {
        let response = self
            .client
            .post(self.config.endpoint(path))
            .header(ACCEPT, "application/json")
            .header(COOKIE, format!("{SESSION_COOKIE}={}", self.session.as_str()))
            .form(form)
            .send()?;
        Ok(response.error_for_status()?)
    }
}

impl Transport for HttpTransport {
    fn fetch_initialization_payload(&mut self) -> OutlineResult<InitializationPayload> {
        let started_at = Instant::now();
        let form = [("client_version", self.config.client_version.to_string())];
        let body = match self.post_with_session(INIT_PATH, &form) {
            Ok(response) => response.text()?,
            Err(err) => {
                error!(
                    "event=fetch_init module=transport status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(err);
            }
        };
        let payload =
            InitializationPayload::from_json_str_with_max_depth(&body, self.config.max_depth)?;

        self.client_id = payload.client_id().map(str::to_string);
        self.transaction_id = payload.most_recent_transaction_id().map(str::to_string);
        self.joined_epoch_seconds = payload.joined_epoch_seconds();

        info!(
            "event=fetch_init module=transport status=ok duration_ms={} bytes={}",
            started_at.elapsed().as_millis(),
            body.len()
        );
        Ok(payload)
    }

    fn submit_operation(&mut self, operation: &Operation) -> OutlineResult<()> {
        let (Some(client_id), Some(transaction_id)) =
            (self.client_id.clone(), self.transaction_id.clone())
        else {
            return Err(OutlineError::Protocol(
                "initialization data must be fetched before submitting operations".to_string(),
            ));
        };

        let started_at = Instant::now();
        let client_timestamp = self.current_timestamp() - self.joined_epoch_seconds;
        let push_poll_data = build_push_poll_data(&transaction_id, operation, client_timestamp);
        let form = [
            ("client_id", client_id),
            ("client_version", self.config.client_version.to_string()),
            ("push_poll_id", new_push_poll_id()),
            ("push_poll_data", push_poll_data.to_string()),
        ];

        let body: Value = serde_json::from_str(&self.post_with_session(PUSH_PATH, &form)?.text()?)?;
        match parse_push_result(&body, operation) {
            Ok(next_transaction_id) => {
                if let Some(next) = next_transaction_id {
                    self.transaction_id = Some(next);
                }
                info!(
                    "event=submit module=transport status=ok op={} item_id={} duration_ms={}",
                    operation.kind().as_str(),
                    operation.item_id(),
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=submit module=transport status=error op={} item_id={} error={}",
                    operation.kind().as_str(),
                    operation.item_id(),
                    err
                );
                Err(err)
            }
        }
    }
}

fn build_client(config: &ClientConfig) -> OutlineResult<Client> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(|err| OutlineError::Protocol(format!("failed to build http client: {err}")))
}

/// Extracts the session value from one `Set-Cookie` header.
fn session_from_set_cookie(header: &str) -> Option<String> {
    let pair = header.split(';').next()?;
    let (name, value) = pair.split_once('=')?;
    if name.trim() != SESSION_COOKIE {
        return None;
    }
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn build_push_poll_data(transaction_id: &str, operation: &Operation, client_timestamp: i64) -> Value {
    let mut wire = operation.to_wire();
    wire["client_timestamp"] = json!(client_timestamp);
    wire["undo_data"] = json!({});
    json!([{
        "most_recent_operation_transaction_id": transaction_id,
        "operations": [wire],
    }])
}

/// Returns the new transaction id, or a rejection error.
fn parse_push_result(body: &Value, operation: &Operation) -> OutlineResult<Option<String>> {
    let result = body
        .get("results")
        .and_then(Value::as_array)
        .and_then(|results| results.first())
        .ok_or_else(|| OutlineError::Protocol("push response has no results".to_string()))?;

    if result
        .get("error_encountered_in_remote_operations")
        .and_then(Value::as_bool)
        .unwrap_or(false)
    {
        return Err(OutlineError::RemoteRejected {
            operation: operation.kind(),
            message: format!("service reported an error for item {}", operation.item_id()),
        });
    }

    Ok(result
        .get("new_most_recent_operation_transaction_id")
        .and_then(Value::as_str)
        .map(str::to_string))
}

fn new_push_poll_id() -> String {
    Uuid::new_v4().simple().to_string()[..PUSH_POLL_ID_LEN].to_string()
}

#[cfg(test)]
mod tests {
    use super::{
        build_push_poll_data, new_push_poll_id, parse_push_result, session_from_set_cookie,
        HttpTransport, PUSH_POLL_ID_LEN,
    };
    use crate::config::ClientConfig;
    use crate::error::ErrorKind;
    use crate::transport::operation::{Operation, OperationType};
    use crate::transport::session::SessionId;
    use crate::transport::Transport;
    use serde_json::json;

    fn complete_op() -> Operation {
        Operation::Complete {
            id: "item-1".to_string(),
        }
    }

    #[test]
    fn session_cookie_is_extracted() {
        assert_eq!(
            session_from_set_cookie("sessionid=abc123; Path=/; HttpOnly"),
            Some("abc123".to_string())
        );
        assert_eq!(session_from_set_cookie("csrftoken=zzz; Path=/"), None);
        assert_eq!(session_from_set_cookie("sessionid=; Path=/"), None);
    }

    #[test]
    fn push_poll_data_wraps_single_operation() {
        let data = build_push_poll_data("tx-9", &complete_op(), 120);
        assert_eq!(data[0]["most_recent_operation_transaction_id"], "tx-9");
        let op = &data[0]["operations"][0];
        assert_eq!(op["type"], "complete");
        assert_eq!(op["data"]["projectid"], "item-1");
        assert_eq!(op["client_timestamp"], 120);
        assert_eq!(op["undo_data"], json!({}));
    }

    #[test]
    fn push_result_advances_transaction_id() {
        let body = json!({ "results": [{
            "new_most_recent_operation_transaction_id": "tx-10",
            "error_encountered_in_remote_operations": false
        }]});
        assert_eq!(
            parse_push_result(&body, &complete_op()).unwrap(),
            Some("tx-10".to_string())
        );
    }

    #[test]
    fn push_result_error_flag_is_remote_rejection() {
        let body = json!({ "results": [{ "error_encountered_in_remote_operations": true }]});
        let err = parse_push_result(&body, &complete_op()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RemoteRejected);
        assert!(matches!(
            err,
            crate::error::OutlineError::RemoteRejected {
                operation: OperationType::Complete,
                ..
            }
        ));
    }

    #[test]
    fn push_result_without_results_is_protocol_error() {
        let err = parse_push_result(&json!({}), &complete_op()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Protocol);
    }

    #[test]
    fn push_poll_id_has_fixed_length() {
        assert_eq!(new_push_poll_id().len(), PUSH_POLL_ID_LEN);
    }

    #[test]
    fn login_rejects_blank_credentials_before_network() {
        let err = HttpTransport::login(&ClientConfig::default(), " ", "secret").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        let err = HttpTransport::login(&ClientConfig::default(), "me", "").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn submit_before_fetch_is_protocol_error() {
        let session = SessionId::parse("abcdefghijklmnopqrstuvwxyz012345").unwrap();
        let mut transport = HttpTransport::new(&ClientConfig::default(), session).unwrap();
        let err = transport.submit_operation(&complete_op()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Protocol);
    }
}
