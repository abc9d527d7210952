//! Mutation and query API over the queue tree.
//!
//! # Invariants
//! - All access goes through one tree-wide lock; writers hold it for the
//!   whole check-then-mutate sequence.
//! - Authorization and existence checks run before any state changes, so a
//!   rejected call allocates no id and bumps no counter.
//! - Events are published while the write lock is still held, which keeps
//!   the event stream in commit order.

use crate::error::{AppError, AppResult};
use crate::models::{
    DiscussionSnapshot, Entry, EntryId, EntryKind, PathSegment, QueueId, QueueSnapshot,
};
use crate::tree::{QueueTree, ROOT_QUEUE_ID};
use crate::websocket::{EventPublisher, QueueEvent};
use actix_middleware::Identity;
use tokio::sync::RwLock;

pub struct DiscussionService {
    tree: RwLock<QueueTree>,
    events: EventPublisher,
}

impl DiscussionService {
    /// Seeds the discussion with a root queue (id 0).
    pub fn new(root_topic: impl Into<String>, events: EventPublisher) -> Self {
        let root_topic = root_topic.into();
        tracing::info!(topic = %root_topic, "discussion created");

        Self {
            tree: RwLock::new(QueueTree::new(root_topic)),
            events,
        }
    }

    /// Creates a child queue under `parent_id`. Eboard only.
    pub async fn create_child_queue(
        &self,
        parent_id: QueueId,
        topic: String,
        move_viewers: bool,
        requester: &Identity,
    ) -> AppResult<QueueSnapshot> {
        require_privileged(requester, "create queues")?;

        let mut tree = self.tree.write().await;
        let id = tree.insert_child(parent_id, topic)?;
        let snapshot = tree.snapshot(id)?;

        tracing::info!(
            queue_id = id,
            parent_id,
            handle = %requester.handle,
            "child queue created"
        );

        self.events.publish(QueueEvent::NewQueue {
            queue: snapshot.clone(),
            move_viewers,
        });

        Ok(snapshot)
    }

    /// Appends the requester to the points or clarifiers list of a queue.
    pub async fn add_entry(
        &self,
        queue_id: QueueId,
        kind: EntryKind,
        requester: &Identity,
    ) -> AppResult<Entry> {
        let mut tree = self.tree.write().await;
        let entry = tree.lookup_mut(queue_id)?.push_entry(kind, requester);

        tracing::info!(
            queue_id,
            entry_id = entry.id,
            kind = %kind,
            handle = %requester.handle,
            "entry added"
        );

        self.events
            .publish(QueueEvent::entry_added(entry.clone(), queue_id));

        Ok(entry)
    }

    /// Removes an entry. Allowed for its author and for eboard.
    pub async fn remove_entry(
        &self,
        queue_id: QueueId,
        kind: EntryKind,
        entry_id: EntryId,
        requester: &Identity,
    ) -> AppResult<()> {
        let mut tree = self.tree.write().await;
        let queue = tree.lookup_mut(queue_id)?;

        let (position, entry) = queue
            .find_entry(kind, entry_id)
            .ok_or_else(|| AppError::entry_not_found(queue_id, entry_id))?;

        if !(requester.is_privileged || entry.is_authored_by(requester)) {
            tracing::warn!(
                queue_id,
                entry_id,
                handle = %requester.handle,
                author = %entry.author_handle,
                "entry removal rejected"
            );
            return Err(AppError::Forbidden(format!(
                "only the author or eboard may remove this {kind}"
            )));
        }

        queue.remove_entry_at(kind, position);

        tracing::info!(
            queue_id,
            entry_id,
            kind = %kind,
            handle = %requester.handle,
            "entry removed"
        );

        self.events.publish(QueueEvent::Delete {
            id: entry_id,
            queue_id,
            dismisser: requester.display_name.clone(),
        });

        Ok(())
    }

    /// Retitles a queue. Eboard only.
    pub async fn change_topic(
        &self,
        queue_id: QueueId,
        new_topic: String,
        requester: &Identity,
    ) -> AppResult<()> {
        require_privileged(requester, "change topics")?;

        let mut tree = self.tree.write().await;
        tree.lookup_mut(queue_id)?.topic = new_topic.clone();

        tracing::info!(queue_id, handle = %requester.handle, "topic changed");

        self.events.publish(QueueEvent::Topic {
            topic: new_topic,
            queue_id,
        });

        Ok(())
    }

    /// Breadcrumb from the root down to `queue_id`.
    pub async fn get_path(&self, queue_id: QueueId) -> AppResult<Vec<PathSegment>> {
        self.tree.read().await.path(queue_id)
    }

    pub async fn get_subtree(&self, queue_id: QueueId) -> AppResult<QueueSnapshot> {
        self.tree.read().await.snapshot(queue_id)
    }

    pub async fn get_whole_discussion(&self) -> AppResult<DiscussionSnapshot> {
        let queue = self.tree.read().await.snapshot(ROOT_QUEUE_ID)?;
        Ok(DiscussionSnapshot { queue })
    }

    pub async fn queue_count(&self) -> usize {
        self.tree.read().await.len()
    }
}

fn require_privileged(requester: &Identity, action: &str) -> AppResult<()> {
    if requester.is_privileged {
        return Ok(());
    }

    tracing::warn!(handle = %requester.handle, action, "privileged action rejected");
    Err(AppError::Forbidden(format!(
        "user is not on eboard and cannot {action}"
    )))
}
