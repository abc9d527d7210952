use actix_middleware::Identity;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Entry ids are unique within their owning queue only.
pub type EntryId = u64;

/// Which list of a queue an entry lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Point,
    Clarifier,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Point => "point",
            EntryKind::Clarifier => "clarifier",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One slot in a speaking queue.
///
/// Author fields are copied from the caller identity when the entry is
/// created, so later renames never rewrite existing entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    #[serde(rename = "name")]
    pub author_name: String,
    #[serde(rename = "username")]
    pub author_handle: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

impl Entry {
    pub fn new(id: EntryId, kind: EntryKind, author: &Identity) -> Self {
        Self {
            id,
            author_name: author.display_name.clone(),
            author_handle: author.handle.clone(),
            kind,
        }
    }

    pub fn is_authored_by(&self, who: &Identity) -> bool {
        self.author_handle == who.handle
    }
}
