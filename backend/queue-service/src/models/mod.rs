pub mod entry;
pub mod queue;

pub use entry::{Entry, EntryId, EntryKind};
pub use queue::{DiscussionSnapshot, PathSegment, QueueId, QueueNode, QueueSnapshot};
