//! Group domain entity
//!
//! A group is a club or regular session that shares a set of courts.
//! Players, matches, and editor access are all scoped to a single group.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GroupId(pub Uuid);

impl GroupId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for GroupId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for GroupId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A group of players sharing courts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
}

/// A group together with its stored PIN hash (never serialized)
#[derive(Debug, Clone)]
pub struct GroupCredentials {
    pub group: Group,
    pub pin_hash: String,
}

/// Data needed to create a new group
#[derive(Debug, Clone)]
pub struct NewGroup {
    pub name: String,
    pub slug: String,
    pub pin_hash: String,
}
