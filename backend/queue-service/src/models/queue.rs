use super::entry::{Entry, EntryId, EntryKind};
use actix_middleware::Identity;
use serde::{Deserialize, Serialize};

/// Queue ids are unique across the whole discussion; the root is 0.
pub type QueueId = u64;

/// One topic in the discussion hierarchy.
///
/// Children are held by id; the owning tree's index is the only owner of
/// nodes, so `parent` is a plain back-reference.
#[derive(Debug, Clone)]
pub struct QueueNode {
    pub id: QueueId,
    pub topic: String,
    pub(crate) points: Vec<Entry>,
    pub(crate) clarifiers: Vec<Entry>,
    pub(crate) children: Vec<QueueId>,
    pub(crate) parent: Option<QueueId>,
    entry_counter: EntryId,
}

impl QueueNode {
    pub(crate) fn new(id: QueueId, topic: impl Into<String>, parent: Option<QueueId>) -> Self {
        Self {
            id,
            topic: topic.into(),
            points: Vec::new(),
            clarifiers: Vec::new(),
            children: Vec::new(),
            parent,
            entry_counter: 0,
        }
    }

    pub fn entries(&self, kind: EntryKind) -> &[Entry] {
        match kind {
            EntryKind::Point => &self.points,
            EntryKind::Clarifier => &self.clarifiers,
        }
    }

    fn entries_mut(&mut self, kind: EntryKind) -> &mut Vec<Entry> {
        match kind {
            EntryKind::Point => &mut self.points,
            EntryKind::Clarifier => &mut self.clarifiers,
        }
    }

    /// Appends a new entry at the tail. Points and clarifiers share one counter.
    pub fn push_entry(&mut self, kind: EntryKind, author: &Identity) -> Entry {
        self.entry_counter += 1;
        let entry = Entry::new(self.entry_counter, kind, author);
        self.entries_mut(kind).push(entry.clone());
        entry
    }

    /// Finds an entry by id, returning its position in the list.
    pub fn find_entry(&self, kind: EntryKind, entry_id: EntryId) -> Option<(usize, &Entry)> {
        self.entries(kind)
            .iter()
            .enumerate()
            .find(|(_, entry)| entry.id == entry_id)
    }

    /// Removes the entry at `position`, keeping the order of the rest.
    pub fn remove_entry_at(&mut self, kind: EntryKind, position: usize) -> Entry {
        self.entries_mut(kind).remove(position)
    }
}

/// Serializable view of a queue and everything beneath it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueSnapshot {
    pub id: QueueId,
    pub topic: String,
    pub points: Vec<Entry>,
    pub clarifiers: Vec<Entry>,
    pub children: Vec<QueueSnapshot>,
}

/// Whole discussion, rooted at the top-level queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscussionSnapshot {
    pub queue: QueueSnapshot,
}

/// One breadcrumb step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathSegment {
    pub topic: String,
    pub id: QueueId,
}

impl From<&QueueNode> for PathSegment {
    fn from(node: &QueueNode) -> Self {
        Self {
            topic: node.topic.clone(),
            id: node.id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_ids_are_shared_across_kinds() {
        let mut node = QueueNode::new(1, "Side topic", Some(0));
        let alice = Identity::new("Alice", "alice", false);

        let a = node.push_entry(EntryKind::Point, &alice);
        let b = node.push_entry(EntryKind::Clarifier, &alice);
        let c = node.push_entry(EntryKind::Point, &alice);

        assert_eq!((a.id, b.id, c.id), (1, 2, 3));
        assert_eq!(node.points.len(), 2);
        assert_eq!(node.clarifiers.len(), 1);
        assert!(node.find_entry(EntryKind::Clarifier, 1).is_none());
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut node = QueueNode::new(0, "root", None);
        let alice = Identity::new("Alice", "alice", false);
        for _ in 0..4 {
            node.push_entry(EntryKind::Point, &alice);
        }

        let (pos, _) = node.find_entry(EntryKind::Point, 2).unwrap();
        let removed = node.remove_entry_at(EntryKind::Point, pos);

        assert_eq!(removed.id, 2);
        let ids: Vec<_> = node.points.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 3, 4]);

        // removal never frees an id
        assert_eq!(node.push_entry(EntryKind::Point, &alice).id, 5);
    }
}
