//! Read-only account attributes from the initialization payload.

use crate::model::wire::InitializationPayload;
use serde::Serialize;
use serde_json::Value;

/// Account summary. Absent fields are empty strings or zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Account {
    email: String,
    name: String,
    registration_date: String,
    monthly_item_quota: i64,
    items_created_this_month: i64,
    invite_link: String,
}

impl Account {
    pub fn from_payload(payload: &InitializationPayload) -> Self {
        Self {
            email: payload.user.clone().unwrap_or_default(),
            name: payload.full_name.clone().unwrap_or_default(),
            registration_date: payload
                .date_joined
                .as_ref()
                .map(date_text)
                .unwrap_or_default(),
            monthly_item_quota: payload.monthly_item_quota.as_ref().map_or(0, count),
            items_created_this_month: payload.items_created.as_ref().map_or(0, count),
            invite_link: payload.invite_link.clone().unwrap_or_default(),
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Full name of the account owner.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn registration_date(&self) -> &str {
        &self.registration_date
    }

    pub fn monthly_item_quota(&self) -> i64 {
        self.monthly_item_quota
    }

    pub fn items_created_this_month(&self) -> i64 {
        self.items_created_this_month
    }

    pub fn invite_link(&self) -> &str {
        &self.invite_link
    }
}

fn date_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Integer counters, also when sent as digit strings; anything else is 0.
fn count(value: &Value) -> i64 {
    match value {
        Value::Number(number) => number.as_i64().unwrap_or(0),
        Value::String(text) => text.trim().parse().unwrap_or(0),
        _ => 0,
    }
}
