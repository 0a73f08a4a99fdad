//! Serde shapes of the initialization payload.
//!
//! # Responsibility
//! - Decode the nested item array, join epoch and session bookkeeping.
//! - Apply the documented default for every optional field.
//!
//! # Invariants
//! - `projectTreeData.mainProjectTreeInfo` is required; everything else
//!   defaults when absent or `null`.
//! - Item keys accept both the short wire names and the long names.
//! - JSON text nesting is bounded by the outline depth limit before it is
//!   decoded; decoding itself runs on a growable stack.

use crate::config::DEFAULT_MAX_DEPTH;
use crate::error::{OutlineError, OutlineResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Root document returned by the initialization endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializationPayload {
    pub project_tree_data: ProjectTreeData,
    /// Account email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    /// Registration date; the service has sent both strings and numbers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_joined: Option<Value>,
    /// Any JSON value; `Account` reads non-integers as 0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_item_quota: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items_created: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invite_link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectTreeData {
    pub main_project_tree_info: MainProjectTreeInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MainProjectTreeInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_project_children: Option<Vec<RawItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_joined_timestamp_in_seconds: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_most_recent_operation_transaction_id: Option<String>,
}

/// One item as sent by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(
        default,
        rename = "nm",
        alias = "name",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<String>,
    #[serde(
        default,
        rename = "no",
        alias = "description",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,
    #[serde(
        default,
        rename = "ch",
        alias = "children",
        skip_serializing_if = "Option::is_none"
    )]
    pub children: Option<Vec<RawItem>>,
    #[serde(
        default,
        rename = "ct",
        alias = "createdOffset",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_offset: Option<i64>,
    #[serde(
        default,
        rename = "lm",
        alias = "modifiedOffset",
        skip_serializing_if = "Option::is_none"
    )]
    pub modified_offset: Option<i64>,
    #[serde(
        default,
        rename = "cp",
        alias = "completedOffset",
        skip_serializing_if = "Option::is_none"
    )]
    pub completed_offset: Option<i64>,
}

impl InitializationPayload {
    /// Decodes a payload from an already-parsed JSON document.
    ///
    /// Missing tree structure is reported as a protocol error.
    pub fn from_value(value: Value) -> OutlineResult<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Decodes a payload from JSON text, bounded by the default depth limit.
    pub fn from_json_str(text: &str) -> OutlineResult<Self> {
        Self::from_json_str_with_max_depth(text, DEFAULT_MAX_DEPTH)
    }

    /// Decodes a payload from JSON text whose items nest at most
    /// `max_depth` levels.
    ///
    /// # Errors
    /// - `Protocol` when the text nests deeper than `max_depth` items allow
    ///   or is not a well-formed payload.
    pub fn from_json_str_with_max_depth(text: &str, max_depth: usize) -> OutlineResult<Self> {
        let allowed = max_json_nesting(max_depth);
        let nesting = json_nesting_depth(text);
        if nesting > allowed {
            return Err(OutlineError::Protocol(format!(
                "payload nests {nesting} levels deep, more than the limit of {max_depth} items allows"
            )));
        }

        let mut deserializer = serde_json::Deserializer::from_str(text);
        deserializer.disable_recursion_limit();
        let payload = Self::deserialize(serde_stacker::Deserializer::new(&mut deserializer))?;
        deserializer.end()?;
        Ok(payload)
    }

    /// Top-level items in sibling order; empty when absent.
    pub fn root_items(&self) -> &[RawItem] {
        self.project_tree_data
            .main_project_tree_info
            .root_project_children
            .as_deref()
            .unwrap_or(&[])
    }

    /// Account join epoch added to every relative item timestamp.
    pub fn joined_epoch_seconds(&self) -> i64 {
        self.project_tree_data
            .main_project_tree_info
            .date_joined_timestamp_in_seconds
            .unwrap_or(0)
    }

    pub fn client_id(&self) -> Option<&str> {
        self.project_tree_data.client_id.as_deref()
    }

    pub fn most_recent_transaction_id(&self) -> Option<&str> {
        self.project_tree_data
            .main_project_tree_info
            .initial_most_recent_operation_transaction_id
            .as_deref()
    }
}

/// Converts a relative offset into an absolute timestamp.
///
/// Absent offsets stay 0 instead of collapsing onto the epoch itself.
pub(crate) fn absolute_time(epoch_seconds: i64, offset: Option<i64>) -> OutlineResult<i64> {
    match offset {
        Some(offset) => epoch_seconds.checked_add(offset).ok_or_else(|| {
            OutlineError::Protocol(format!(
                "timestamp offset {offset} overflows join epoch {epoch_seconds}"
            ))
        }),
        None => Ok(0),
    }
}

/// Container levels a payload may use: the three wrapping objects and the
/// root array, then an object plus a `ch` array per item level.
fn max_json_nesting(max_depth: usize) -> usize {
    max_depth.saturating_mul(2).saturating_add(4)
}

/// Deepest `{`/`[` nesting in `text`, ignoring brackets inside strings.
fn json_nesting_depth(text: &str) -> usize {
    let mut depth = 0usize;
    let mut deepest = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for byte in text.bytes() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' | b'[' => {
                depth += 1;
                deepest = deepest.max(depth);
            }
            b'}' | b']' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    deepest
}

#[cfg(test)]
mod tests {
    use super::{absolute_time, json_nesting_depth, InitializationPayload, RawItem};
    use crate::error::ErrorKind;
    use serde_json::json;

    /// Payload text with one chain of items `depth` levels deep.
    fn nested_payload_text(depth: usize) -> String {
        let mut item = String::new();
        for level in (1..=depth).rev() {
            item = if item.is_empty() {
                format!(r#"{{"id":"n{level}","nm":"level {level}"}}"#)
            } else {
                format!(r#"{{"id":"n{level}","nm":"level {level}","ch":[{item}]}}"#)
            };
        }
        format!(
            r#"{{"projectTreeData":{{"mainProjectTreeInfo":{{"rootProjectChildren":[{item}]}}}}}}"#
        )
    }

    #[test]
    fn raw_item_accepts_short_and_long_keys() {
        let short: RawItem = serde_json::from_value(json!({
            "id": "a", "nm": "Inbox", "no": "notes", "ct": 5, "lm": 6, "cp": 7
        }))
        .unwrap();
        let long: RawItem = serde_json::from_value(json!({
            "id": "a", "name": "Inbox", "description": "notes",
            "createdOffset": 5, "modifiedOffset": 6, "completedOffset": 7
        }))
        .unwrap();
        assert_eq!(short, long);
        assert_eq!(short.name.as_deref(), Some("Inbox"));
    }

    #[test]
    fn null_fields_decode_as_absent() {
        let item: RawItem = serde_json::from_value(json!({
            "id": "a", "nm": null, "ch": null, "cp": null
        }))
        .unwrap();
        assert_eq!(item.name, None);
        assert_eq!(item.children, None);
        assert_eq!(item.completed_offset, None);
    }

    #[test]
    fn payload_without_tree_info_is_protocol_error() {
        let err = InitializationPayload::from_value(json!({ "projectTreeData": {} })).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Protocol);
    }

    #[test]
    fn payload_defaults_when_tree_fields_absent() {
        let payload = InitializationPayload::from_value(json!({
            "projectTreeData": { "mainProjectTreeInfo": {} }
        }))
        .unwrap();
        assert!(payload.root_items().is_empty());
        assert_eq!(payload.joined_epoch_seconds(), 0);
        assert_eq!(payload.client_id(), None);
    }

    #[test]
    fn absolute_time_keeps_absent_as_zero() {
        assert_eq!(absolute_time(1_000, None).unwrap(), 0);
        assert_eq!(absolute_time(1_000, Some(0)).unwrap(), 1_000);
        assert_eq!(absolute_time(1_000, Some(25)).unwrap(), 1_025);
    }

    #[test]
    fn absolute_time_overflow_is_protocol_error() {
        let err = absolute_time(i64::MAX, Some(1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Protocol);
        let err = absolute_time(i64::MIN, Some(-1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Protocol);
    }

    #[test]
    fn deep_payload_text_decodes_past_serde_default_limit() {
        let text = nested_payload_text(70);
        let payload = InitializationPayload::from_json_str(&text).unwrap();

        let mut depth = 0;
        let mut items = payload.root_items();
        while let Some(item) = items.first() {
            depth += 1;
            items = item.children.as_deref().unwrap_or(&[]);
        }
        assert_eq!(depth, 70);
    }

    #[test]
    fn payload_text_deeper_than_limit_is_protocol_error() {
        let text = nested_payload_text(10);
        assert!(InitializationPayload::from_json_str_with_max_depth(&text, 10).is_ok());
        let err = InitializationPayload::from_json_str_with_max_depth(&text, 9).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Protocol);
    }

    #[test]
    fn nesting_depth_ignores_brackets_in_strings() {
        assert_eq!(json_nesting_depth(r#"{"a":[1,{"b":"[[{"}]}"#), 3);
        assert_eq!(json_nesting_depth(r#"["\"[", []]"#), 2);
        assert_eq!(json_nesting_depth("42"), 0);
    }

    #[test]
    fn non_integer_counters_still_decode() {
        let payload = InitializationPayload::from_value(json!({
            "projectTreeData": { "mainProjectTreeInfo": {
                "rootProjectChildren": [{ "id": "a" }]
            }},
            "monthlyItemQuota": "unlimited",
            "itemsCreated": 3.5
        }))
        .unwrap();
        assert_eq!(payload.root_items().len(), 1);
    }
}
