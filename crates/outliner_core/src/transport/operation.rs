//! Remote mutation operations.
//!
//! # Invariants
//! - Every local structural change maps to exactly one operation type.
//! - The root id is sent as `None`, which is how the service names the
//!   top of the tree.

use crate::model::item::{ItemId, ROOT_ID};
use serde_json::{json, Map, Value};

const WIRE_ROOT_PARENT: &str = "None";

/// Operation kinds understood by the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationType {
    Edit,
    Complete,
    Uncomplete,
    Move,
    Delete,
    Create,
}

impl OperationType {
    /// Stable wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Edit => "edit",
            Self::Complete => "complete",
            Self::Uncomplete => "uncomplete",
            Self::Move => "move",
            Self::Delete => "delete",
            Self::Create => "create",
        }
    }
}

/// One mutation submitted to the remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Carries only the fields that changed.
    Edit {
        id: ItemId,
        name: Option<String>,
        description: Option<String>,
    },
    Complete {
        id: ItemId,
    },
    Uncomplete {
        id: ItemId,
    },
    Move {
        id: ItemId,
        parent_id: ItemId,
        priority: usize,
    },
    Delete {
        id: ItemId,
    },
    Create {
        id: ItemId,
        parent_id: ItemId,
        priority: usize,
    },
}

impl Operation {
    pub fn kind(&self) -> OperationType {
        match self {
            Self::Edit { .. } => OperationType::Edit,
            Self::Complete { .. } => OperationType::Complete,
            Self::Uncomplete { .. } => OperationType::Uncomplete,
            Self::Move { .. } => OperationType::Move,
            Self::Delete { .. } => OperationType::Delete,
            Self::Create { .. } => OperationType::Create,
        }
    }

    /// Id of the item the operation targets.
    pub fn item_id(&self) -> &str {
        match self {
            Self::Edit { id, .. }
            | Self::Complete { id }
            | Self::Uncomplete { id }
            | Self::Move { id, .. }
            | Self::Delete { id }
            | Self::Create { id, .. } => id,
        }
    }

    /// Builds the `{type, data}` object the service expects.
    pub fn to_wire(&self) -> Value {
        let mut data = Map::new();
        data.insert("projectid".to_string(), json!(self.item_id()));
        match self {
            Self::Edit {
                name, description, ..
            } => {
                if let Some(name) = name {
                    data.insert("name".to_string(), json!(name));
                }
                if let Some(description) = description {
                    data.insert("description".to_string(), json!(description));
                }
            }
            Self::Move {
                parent_id,
                priority,
                ..
            }
            | Self::Create {
                parent_id,
                priority,
                ..
            } => {
                data.insert("parentid".to_string(), json!(wire_parent_id(parent_id)));
                data.insert("priority".to_string(), json!(priority));
            }
            Self::Complete { .. } | Self::Uncomplete { .. } | Self::Delete { .. } => {}
        }
        json!({
            "type": self.kind().as_str(),
            "data": Value::Object(data),
        })
    }
}

fn wire_parent_id(parent_id: &str) -> &str {
    if parent_id == ROOT_ID {
        WIRE_ROOT_PARENT
    } else {
        parent_id
    }
}
