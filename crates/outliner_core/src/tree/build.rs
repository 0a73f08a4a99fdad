//! Outline construction from the initialization payload.

use super::Outline;
use crate::config::DEFAULT_MAX_DEPTH;
use crate::error::{OutlineError, OutlineResult};
use crate::model::item::{ItemId, OutlineItem, ROOT_ID};
use crate::model::wire::{absolute_time, InitializationPayload, RawItem};
use crate::transport::Transport;
use log::{error, info};
use std::time::Instant;

impl<T: Transport> Outline<T> {
    /// Fetches the payload and builds the outline.
    ///
    /// # Errors
    /// - `Protocol` when the fetch fails or the payload lacks required
    ///   structure, has items without ids, duplicate ids, timestamps that
    ///   overflow, or nests deeper than the default depth limit.
    pub fn build(transport: T) -> OutlineResult<Self> {
        Self::build_with_max_depth(transport, DEFAULT_MAX_DEPTH)
    }

    pub fn build_with_max_depth(mut transport: T, max_depth: usize) -> OutlineResult<Self> {
        let payload = transport.fetch_initialization_payload()?;
        Self::from_payload(transport, payload, max_depth)
    }

    /// Builds the outline from an already-fetched payload.
    ///
    /// Items are visited depth-first, pre-order; each gets
    /// `level = parent level + 1` and is indexed as it is visited.
    pub fn from_payload(
        transport: T,
        payload: InitializationPayload,
        max_depth: usize,
    ) -> OutlineResult<Self> {
        let started_at = Instant::now();
        let epoch = payload.joined_epoch_seconds();
        let raw_items = payload
            .project_tree_data
            .main_project_tree_info
            .root_project_children
            .unwrap_or_default();

        let mut outline = Self::empty(transport, epoch);
        match outline.index_raw_items(raw_items, max_depth) {
            Ok(deepest) => {
                info!(
                    "event=outline_build module=tree status=ok items={} depth={} duration_ms={}",
                    outline.len() - 1,
                    deepest,
                    started_at.elapsed().as_millis()
                );
                Ok(outline)
            }
            Err(err) => {
                error!(
                    "event=outline_build module=tree status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    /// Returns the deepest level reached.
    fn index_raw_items(&mut self, raw_items: Vec<RawItem>, max_depth: usize) -> OutlineResult<u32> {
        let epoch = self.joined_epoch_seconds;
        let mut deepest = 0;

        if let Some(root) = self.items.get_mut(ROOT_ID) {
            root.children = child_ids(&raw_items);
        }
        // Reversed so the first sibling is popped first (pre-order).
        let mut stack: Vec<(RawItem, ItemId, u32)> = raw_items
            .into_iter()
            .rev()
            .map(|raw| (raw, ROOT_ID.to_string(), 1))
            .collect();

        while let Some((raw, parent_id, level)) = stack.pop() {
            let id = raw.id.unwrap_or_default();
            if id.is_empty() {
                return Err(OutlineError::Protocol(format!(
                    "item without id under parent `{parent_id}`"
                )));
            }
            if level as usize > max_depth {
                return Err(OutlineError::Protocol(format!(
                    "item {id} nests deeper than the limit of {max_depth}"
                )));
            }
            if self.items.contains_key(&id) {
                return Err(OutlineError::Protocol(format!("duplicate item id {id}")));
            }

            let raw_children = raw.children.unwrap_or_default();
            let item = OutlineItem {
                id: id.clone(),
                name: raw.name.unwrap_or_default(),
                description: raw.description.unwrap_or_default(),
                level,
                creation_time: absolute_time(epoch, raw.created_offset)?,
                last_modified_time: absolute_time(epoch, raw.modified_offset)?,
                completed_time: absolute_time(epoch, raw.completed_offset)?,
                children: child_ids(&raw_children),
            };
            deepest = deepest.max(level);

            stack.extend(
                raw_children
                    .into_iter()
                    .rev()
                    .map(|child| (child, id.clone(), level + 1)),
            );
            self.parent_of.insert(id.clone(), parent_id);
            self.items.insert(id, item);
        }
        Ok(deepest)
    }
}

fn child_ids(raw_items: &[RawItem]) -> Vec<ItemId> {
    raw_items
        .iter()
        .map(|raw| raw.id.clone().unwrap_or_default())
        .collect()
}
