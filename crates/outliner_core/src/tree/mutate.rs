//! Remote-mirrored mutations.
//!
//! Every method validates first, submits to the transport second, and
//! only then touches local state. A failed submit leaves the outline
//! exactly as it was.

use super::Outline;
use crate::error::{InvalidOperation, OutlineError, OutlineResult};
use crate::model::item::{ItemId, OutlineItem};
use crate::transport::operation::Operation;
use crate::transport::Transport;
use log::{info, warn};

/// Draws allowed per `create_child` before the generator is given up on.
const MAX_ID_ATTEMPTS: usize = 16;

/// Fields for [`Outline::create_child`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewItem {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Sibling index; clamped to the end of the child list.
    pub priority: usize,
}

impl NewItem {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn at(mut self, priority: usize) -> Self {
        self.priority = priority;
        self
    }
}

impl<T: Transport> Outline<T> {
    /// Renames one item.
    pub fn rename(&mut self, id: &str, name: impl Into<String>) -> OutlineResult<()> {
        let name = name.into();
        self.ensure_editable(id)?;
        self.transport.submit_operation(&Operation::Edit {
            id: id.to_string(),
            name: Some(name.clone()),
            description: None,
        })?;

        let now = self.transport.current_timestamp();
        if let Some(item) = self.items.get_mut(id) {
            item.name = name;
            item.last_modified_time = now;
        }
        info!("event=item_rename module=tree status=ok item_id={id}");
        Ok(())
    }

    /// Replaces one item's description.
    pub fn set_description(
        &mut self,
        id: &str,
        description: impl Into<String>,
    ) -> OutlineResult<()> {
        let description = description.into();
        self.ensure_editable(id)?;
        self.transport.submit_operation(&Operation::Edit {
            id: id.to_string(),
            name: None,
            description: Some(description.clone()),
        })?;

        let now = self.transport.current_timestamp();
        if let Some(item) = self.items.get_mut(id) {
            item.description = description;
            item.last_modified_time = now;
        }
        info!("event=item_describe module=tree status=ok item_id={id}");
        Ok(())
    }

    /// Marks one item complete or not complete.
    ///
    /// Completion echoes the transport clock into `completed_time` until
    /// the next full build brings the server value; clearing resets it to 0.
    pub fn set_completed(&mut self, id: &str, completed: bool) -> OutlineResult<()> {
        self.ensure_editable(id)?;
        let operation = if completed {
            Operation::Complete { id: id.to_string() }
        } else {
            Operation::Uncomplete { id: id.to_string() }
        };
        self.transport.submit_operation(&operation)?;

        let completed_time = if completed {
            self.transport.current_timestamp()
        } else {
            0
        };
        if let Some(item) = self.items.get_mut(id) {
            item.completed_time = completed_time;
        }
        info!("event=item_complete module=tree status=ok item_id={id} completed={completed}");
        Ok(())
    }

    /// Moves `id` under `destination_id` at sibling index `priority`.
    ///
    /// # Errors
    /// - `NotFound` for an unknown item or destination.
    /// - `InvalidOperation` when moving the root, moving an item into
    ///   itself, targeting the root, or targeting a descendant.
    /// - Transport errors unchanged; the outline is untouched then.
    pub fn move_item(
        &mut self,
        id: &str,
        destination_id: &str,
        priority: usize,
    ) -> OutlineResult<()> {
        let item_level = self.item(id)?.level;
        let destination_level = self.item(destination_id)?.level;

        if item_level == 0 {
            return Err(InvalidOperation::MoveRoot.into());
        }
        if destination_id == id {
            return Err(InvalidOperation::SelfMove(id.to_string()).into());
        }
        if destination_level == 0 {
            return Err(InvalidOperation::MoveToRoot(id.to_string()).into());
        }
        self.ensure_not_ancestor(id, item_level, destination_id)?;

        self.transport.submit_operation(&Operation::Move {
            id: id.to_string(),
            parent_id: destination_id.to_string(),
            priority,
        })?;
        self.reparent(id, destination_id, priority);
        info!(
            "event=item_move module=tree status=ok item_id={id} parent_id={destination_id} priority={priority}"
        );
        Ok(())
    }

    /// Deletes `id` together with its whole subtree.
    pub fn delete(&mut self, id: &str) -> OutlineResult<()> {
        if self.item(id)?.level == 0 {
            return Err(InvalidOperation::DeleteRoot.into());
        }
        self.transport
            .submit_operation(&Operation::Delete { id: id.to_string() })?;

        let removed = self.register_delete(id);
        info!("event=item_delete module=tree status=ok item_id={id} removed={removed}");
        Ok(())
    }

    /// Creates a child of `parent_id` and returns its provisional id.
    ///
    /// Issues `create`, then an `edit` when a name or description is
    /// given. The item is indexed as soon as `create` succeeds and always
    /// carries the requested name and description; if the follow-up
    /// `edit` fails, that error is returned while the item stays indexed.
    ///
    /// # Errors
    /// - `Validation` when the id generator keeps yielding indexed ids;
    ///   nothing is submitted in that case.
    pub fn create_child(&mut self, parent_id: &str, new_item: NewItem) -> OutlineResult<ItemId> {
        let parent_level = self.item(parent_id)?.level;
        let id = self.fresh_id()?;
        let NewItem {
            name,
            description,
            priority,
        } = new_item;

        self.transport.submit_operation(&Operation::Create {
            id: id.clone(),
            parent_id: parent_id.to_string(),
            priority,
        })?;

        let mut item = OutlineItem::blank(id.clone(), parent_level + 1);
        item.name = name.clone().unwrap_or_default();
        item.description = description.clone().unwrap_or_default();
        self.register_create(item, parent_id, priority);
        info!(
            "event=item_create module=tree status=ok item_id={id} parent_id={parent_id} priority={priority}"
        );

        if name.is_some() || description.is_some() {
            let edit = Operation::Edit {
                id: id.clone(),
                name,
                description,
            };
            if let Err(err) = self.transport.submit_operation(&edit) {
                warn!(
                    "event=item_create module=tree status=partial item_id={id} error={err}"
                );
                return Err(err);
            }
        }
        Ok(id)
    }

    fn ensure_editable(&self, id: &str) -> OutlineResult<()> {
        if self.item(id)?.level == 0 {
            return Err(OutlineError::Validation(
                "the root item has no remote counterpart to edit".to_string(),
            ));
        }
        Ok(())
    }

    /// Climbs from the destination while above the moved item's level;
    /// meeting the item itself means the destination is its descendant.
    fn ensure_not_ancestor(
        &self,
        id: &str,
        item_level: u32,
        destination_id: &str,
    ) -> OutlineResult<()> {
        let mut cursor = self.item(destination_id)?;
        while cursor.level > item_level {
            cursor = match self.parent(&cursor.id) {
                Some(parent) => parent,
                None => break,
            };
            if cursor.id == id {
                return Err(InvalidOperation::MoveIntoDescendant {
                    item_id: id.to_string(),
                    destination_id: destination_id.to_string(),
                }
                .into());
            }
        }
        Ok(())
    }

    fn fresh_id(&mut self) -> OutlineResult<ItemId> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = self.id_generator.next_id();
            if !self.items.contains_key(&id) {
                return Ok(id);
            }
            warn!("event=id_collision module=tree status=retry item_id={id}");
        }
        Err(OutlineError::Validation(format!(
            "id generator yielded only indexed ids in {MAX_ID_ATTEMPTS} attempts"
        )))
    }
}
