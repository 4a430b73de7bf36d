use crate::timestamp::Instant;

/// A release tag and the creation time of the commit it points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub commit_created_at: Instant,
}

impl Tag {
    /// Create a new tag
    pub fn new(name: impl Into<String>, commit_created_at: Instant) -> Self {
        Tag {
            name: name.into(),
            commit_created_at,
        }
    }
}
