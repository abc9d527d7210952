//! In-memory queue hierarchy.
//!
//! # Invariants
//! - Node ids come from one tree-wide counter; the root is 0.
//! - Every node lives in `index`, and only `insert_child` adds nodes, so the
//!   index never holds anything unreachable from the root.
//! - `parent` is set once at creation and nodes are never relinked.

use crate::error::{AppError, AppResult};
use crate::models::{PathSegment, QueueId, QueueNode, QueueSnapshot};
use std::collections::HashMap;

pub const ROOT_QUEUE_ID: QueueId = 0;

#[derive(Debug)]
pub struct QueueTree {
    index: HashMap<QueueId, QueueNode>,
    node_counter: QueueId,
}

impl QueueTree {
    /// Creates a tree holding only the root queue.
    pub fn new(root_topic: impl Into<String>) -> Self {
        let root = QueueNode::new(ROOT_QUEUE_ID, root_topic, None);
        let mut index = HashMap::new();
        index.insert(ROOT_QUEUE_ID, root);

        Self {
            index,
            node_counter: ROOT_QUEUE_ID + 1,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.index.len()
    }

    pub fn lookup(&self, id: QueueId) -> AppResult<&QueueNode> {
        self.index.get(&id).ok_or_else(|| AppError::queue_not_found(id))
    }

    /// Mutable access stays inside the crate so links can't be rewritten.
    pub(crate) fn lookup_mut(&mut self, id: QueueId) -> AppResult<&mut QueueNode> {
        self.index
            .get_mut(&id)
            .ok_or_else(|| AppError::queue_not_found(id))
    }

    /// Adds a new child under `parent_id` and returns its id.
    ///
    /// Fails before allocating an id when the parent is unknown.
    pub fn insert_child(&mut self, parent_id: QueueId, topic: impl Into<String>) -> AppResult<QueueId> {
        let id = self.node_counter;
        self.lookup_mut(parent_id)?.children.push(id);
        self.node_counter += 1;
        self.index.insert(id, QueueNode::new(id, topic, Some(parent_id)));
        Ok(id)
    }

    /// Nodes from the root down to `id`, root first.
    pub fn walk_to_root(&self, id: QueueId) -> AppResult<Vec<&QueueNode>> {
        let mut chain = vec![self.lookup(id)?];
        while let Some(parent_id) = chain[chain.len() - 1].parent {
            let parent = self.index.get(&parent_id).ok_or_else(|| {
                AppError::Internal(format!("queue {id} has a dangling parent {parent_id}"))
            })?;
            chain.push(parent);
        }
        chain.reverse();
        Ok(chain)
    }

    pub fn path(&self, id: QueueId) -> AppResult<Vec<PathSegment>> {
        Ok(self
            .walk_to_root(id)?
            .into_iter()
            .map(PathSegment::from)
            .collect())
    }

    /// Owned copy of `id` and all of its descendants.
    pub fn snapshot(&self, id: QueueId) -> AppResult<QueueSnapshot> {
        let node = self.lookup(id)?;
        let children = node
            .children
            .iter()
            .map(|child| self.snapshot(*child))
            .collect::<AppResult<Vec<_>>>()?;

        Ok(QueueSnapshot {
            id: node.id,
            topic: node.topic.clone(),
            points: node.points.clone(),
            clarifiers: node.clarifiers.clone(),
            children,
        })
    }
}
