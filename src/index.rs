//! In-memory navigable view of the catalog.
//!
//! A doubly-linked list of [`IndexNode`]s with a movable cursor, used for
//! "previous / next image" browsing. The list lives in an arena: nodes sit
//! in a `Vec` of slots and refer to their neighbours by slot handle, never
//! by pointer. The cursor is just another optional handle, so removing the
//! node under it can never leave it dangling.
//!
//! ```text
//!   head                                   tail
//!    │                                      │
//!    ▼                                      ▼
//! ┌──────┐ next ┌──────┐ next ┌──────┐ next
//! │ id 1 │─────▶│ id 2 │─────▶│ id 5 │─────▶ ∅
//! │      │◀─────│      │◀─────│      │
//! └──────┘ prev └──────┘ prev └──────┘
//!                  ▲
//!                cursor
//! ```
//!
//! ## Invariants
//!
//! After every public operation:
//!
//! - walking `next` from `head` visits exactly `len()` nodes and ends at `tail`
//! - walking `prev` from `tail` visits the same nodes in reverse and ends at `head`
//! - the cursor is `None` exactly when the list is empty
//!
//! [`NavigableIndex::check_links`] verifies all of this and is what
//! [`GalleryManager::resync`](crate::gallery::GalleryManager::resync) uses to
//! decide whether a full rebuild is needed.
//!
//! ## Device Sizes
//!
//! Every node carries a map from device class (`"mobile"`, `"pc"`, …) to a
//! [`SizeConfig`]. New nodes start with the stock `mobile` and `pc` profiles;
//! lookups for a class the node does not know fall back to `pc`.

use crate::types::{
    CurrentImage, DeviceSizes, FALLBACK_DEVICE, ImageEntry, SizeConfig, default_device_sizes,
};
use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    #[error("forward walk from head does not end at tail")]
    BrokenForwardChain,
    #[error("backward walk from tail does not end at head")]
    BrokenBackwardChain,
    #[error("index reports {expected} nodes but {found} are linked")]
    SizeMismatch { expected: usize, found: usize },
    #[error("cursor does not point at a linked node")]
    DanglingCursor,
}

/// Slot handle into the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NodeId(usize);

/// One image in the index.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexNode {
    pub id: i64,
    pub filename: String,
    pub filepath: String,
    pub created_at: DateTime<Utc>,
    pub sizes: DeviceSizes,
    prev: Option<NodeId>,
    next: Option<NodeId>,
}

impl IndexNode {
    fn new(id: i64, filename: String, filepath: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            filename,
            filepath,
            created_at,
            sizes: default_device_sizes(),
            prev: None,
            next: None,
        }
    }

    /// Size profile for `device`, or the `pc` profile for unknown classes.
    pub fn size_for_device(&self, device: &str) -> SizeConfig {
        self.sizes
            .get(device)
            .or_else(|| self.sizes.get(FALLBACK_DEVICE))
            .copied()
            .unwrap_or_else(SizeConfig::pc)
    }

    /// Insert or overwrite the profile for `device`.
    pub fn set_size(&mut self, device: &str, config: SizeConfig) {
        self.sizes.insert(device.to_string(), config);
    }

    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    pub fn has_prev(&self) -> bool {
        self.prev.is_some()
    }

    fn current_image(&self, device: &str) -> CurrentImage {
        CurrentImage {
            id: self.id,
            filename: self.filename.clone(),
            filepath: self.filepath.clone(),
            created_at: self.created_at,
            size_config: self.size_for_device(device),
        }
    }

    fn entry(&self) -> ImageEntry {
        ImageEntry {
            id: self.id,
            filename: self.filename.clone(),
            filepath: self.filepath.clone(),
            created_at: self.created_at,
            size_config: self.sizes.clone(),
        }
    }
}

impl fmt::Display for IndexNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}", self.id, self.filename)
    }
}

#[derive(Debug, Clone, Default)]
pub struct NavigableIndex {
    slots: Vec<Option<IndexNode>>,
    free: Vec<usize>,
    head: Option<NodeId>,
    tail: Option<NodeId>,
    cursor: Option<NodeId>,
    size: usize,
}

impl NavigableIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Drop every node and reset the cursor.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn get(&self, handle: NodeId) -> Option<&IndexNode> {
        self.slots.get(handle.0)?.as_ref()
    }

    fn get_mut(&mut self, handle: NodeId) -> Option<&mut IndexNode> {
        self.slots.get_mut(handle.0)?.as_mut()
    }

    /// Link a new node at the tail. The first node also becomes head and cursor.
    pub fn append(
        &mut self,
        id: i64,
        filename: impl Into<String>,
        filepath: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> &mut IndexNode {
        let mut node = IndexNode::new(id, filename.into(), filepath.into(), created_at);
        let slot = match self.free.pop() {
            Some(slot) => slot,
            None => {
                self.slots.push(None);
                self.slots.len() - 1
            }
        };
        let handle = NodeId(slot);

        node.prev = self.tail;
        match self.tail {
            Some(tail) => {
                if let Some(tail) = self.get_mut(tail) {
                    tail.next = Some(handle);
                }
            }
            None => {
                self.head = Some(handle);
                self.cursor = Some(handle);
            }
        }
        self.tail = Some(handle);
        self.size += 1;

        self.slots[slot].insert(node)
    }

    fn find_handle(&self, matches: impl Fn(&IndexNode) -> bool) -> Option<NodeId> {
        let mut at = self.head;
        while let Some(handle) = at {
            let node = self.get(handle)?;
            if matches(node) {
                return Some(handle);
            }
            at = node.next;
        }
        None
    }

    pub fn find_by_id(&self, id: i64) -> Option<&IndexNode> {
        self.find_handle(|n| n.id == id).and_then(|h| self.get(h))
    }

    pub fn find_by_filename(&self, filename: &str) -> Option<&IndexNode> {
        self.find_handle(|n| n.filename == filename)
            .and_then(|h| self.get(h))
    }

    /// Unlink the node with `id`. Returns `false` if no such node exists.
    ///
    /// A cursor on the removed node moves to its predecessor, else its
    /// successor, else becomes `None`.
    pub fn remove_by_id(&mut self, id: i64) -> bool {
        let Some(handle) = self.find_handle(|n| n.id == id) else {
            return false;
        };
        let Some(node) = self.slots[handle.0].take() else {
            return false;
        };

        if self.cursor == Some(handle) {
            self.cursor = node.prev.or(node.next);
        }

        match node.prev {
            Some(prev) => {
                if let Some(prev) = self.get_mut(prev) {
                    prev.next = node.next;
                }
            }
            None => self.head = node.next,
        }
        match node.next {
            Some(next) => {
                if let Some(next) = self.get_mut(next) {
                    next.prev = node.prev;
                }
            }
            None => self.tail = node.prev,
        }

        self.free.push(handle.0);
        self.size -= 1;
        true
    }

    /// The node under the cursor.
    pub fn current(&self) -> Option<&IndexNode> {
        self.cursor.and_then(|h| self.get(h))
    }

    /// Step the cursor forward. Stays put at the tail.
    pub fn move_next(&mut self) -> Option<&IndexNode> {
        if let Some(next) = self.current().and_then(|n| n.next) {
            self.cursor = Some(next);
        }
        self.current()
    }

    /// Step the cursor back. Stays put at the head.
    pub fn move_prev(&mut self) -> Option<&IndexNode> {
        if let Some(prev) = self.current().and_then(|n| n.prev) {
            self.cursor = Some(prev);
        }
        self.current()
    }

    pub fn move_first(&mut self) -> Option<&IndexNode> {
        self.cursor = self.head;
        self.current()
    }

    pub fn move_last(&mut self) -> Option<&IndexNode> {
        self.cursor = self.tail;
        self.current()
    }

    /// 1-based position of the cursor from the head, 0 if there is no cursor.
    pub fn current_position(&self) -> usize {
        let Some(cursor) = self.cursor else {
            return 0;
        };
        let mut position = 1;
        let mut at = self.head;
        while let Some(handle) = at {
            if handle == cursor {
                return position;
            }
            position += 1;
            at = self.get(handle).and_then(|n| n.next);
        }
        0
    }

    /// The cursor node's fields with the size profile for `device`.
    pub fn current_for_device(&self, device: &str) -> Option<CurrentImage> {
        self.current().map(|n| n.current_image(device))
    }

    /// Every node, head to tail.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            index: self,
            at: self.head,
        }
    }

    pub fn all_images(&self) -> Vec<ImageEntry> {
        self.iter().map(IndexNode::entry).collect()
    }

    /// Write each listed profile into every node, overwriting existing values.
    pub fn broadcast_device_sizes(&mut self, configs: &DeviceSizes) {
        for node in self.slots.iter_mut().flatten() {
            for (device, config) in configs {
                node.set_size(device, *config);
            }
        }
    }

    /// Verify the structural invariants listed in the module docs.
    pub fn check_links(&self) -> Result<(), IndexError> {
        let occupied = self.slots.iter().flatten().count();

        let mut forward = 0;
        let mut last = None;
        let mut at = self.head;
        while let Some(handle) = at {
            let node = self.get(handle).ok_or(IndexError::BrokenForwardChain)?;
            if node.prev != last {
                return Err(IndexError::BrokenBackwardChain);
            }
            forward += 1;
            if forward > occupied {
                return Err(IndexError::BrokenForwardChain);
            }
            last = Some(handle);
            at = node.next;
        }
        if last != self.tail {
            return Err(IndexError::BrokenForwardChain);
        }

        let mut backward = 0;
        let mut first = None;
        let mut at = self.tail;
        while let Some(handle) = at {
            let node = self.get(handle).ok_or(IndexError::BrokenBackwardChain)?;
            backward += 1;
            if backward > occupied {
                return Err(IndexError::BrokenBackwardChain);
            }
            first = Some(handle);
            at = node.prev;
        }
        if first != self.head {
            return Err(IndexError::BrokenBackwardChain);
        }

        if forward != self.size || backward != self.size || occupied != self.size {
            return Err(IndexError::SizeMismatch {
                expected: self.size,
                found: forward,
            });
        }

        match self.cursor {
            None if self.size > 0 => Err(IndexError::DanglingCursor),
            Some(cursor) if self.get(cursor).is_none() => Err(IndexError::DanglingCursor),
            _ => Ok(()),
        }
    }
}

pub struct Iter<'a> {
    index: &'a NavigableIndex,
    at: Option<NodeId>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a IndexNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.index.get(self.at?)?;
        self.at = node.next;
        Some(node)
    }
}

impl fmt::Display for NavigableIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "(empty)");
        }
        let current = self.current().map(|n| n.id);
        for (i, node) in self.iter().enumerate() {
            if i > 0 {
                write!(f, " <-> ")?;
            }
            write!(f, "{node}")?;
            if Some(node.id) == current {
                write!(f, " <- current")?;
            }
        }
        Ok(())
    }
}
