use std::fmt;

use super::{MergeRequest, Tag};
use crate::timestamp::Instant;

/// The span of time whose merges ship in `tag`.
///
/// The end (the tag's commit time) is always included. The start is excluded
/// when it is the previous tag's commit time, so a merge at that instant stays
/// with the previous release; the oldest window includes the changelog start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseWindow {
    pub tag: Tag,
    pub start: Instant,
    pub end: Instant,
    pub start_inclusive: bool,
}

impl ReleaseWindow {
    /// Window `(older_tag_time, tag_time]` following an older release
    pub fn after(tag: Tag, older_tag_time: Instant) -> Self {
        let end = tag.commit_created_at;
        ReleaseWindow {
            tag,
            start: older_tag_time,
            end,
            start_inclusive: false,
        }
    }

    /// Window `[changelog_start, tag_time]` for the oldest release
    pub fn since(tag: Tag, changelog_start: Instant) -> Self {
        let end = tag.commit_created_at;
        ReleaseWindow {
            tag,
            start: changelog_start,
            end,
            start_inclusive: true,
        }
    }

    pub fn contains(&self, instant: Instant) -> bool {
        let after_start = if self.start_inclusive {
            self.start <= instant
        } else {
            self.start < instant
        };
        after_start && instant <= self.end
    }

    /// A window whose start lies after its end can never contain anything.
    /// This happens when the oldest tag predates the changelog start.
    pub fn is_inverted(&self) -> bool {
        self.start > self.end
    }
}

/// Changelog section a merge request is filed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Feature,
    Bug,
    Other,
}

impl Category {
    /// All categories in rendering order
    pub const ALL: [Category; 3] = [Category::Feature, Category::Bug, Category::Other];

    /// Heading used for this category's subsection
    pub fn heading(&self) -> &'static str {
        match self {
            Category::Feature => "Features",
            Category::Bug => "Bug Fixes",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.heading())
    }
}

/// The merge requests of one release window, split by category.
///
/// Items keep the order in which the classifier saw them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseBucket {
    pub window: ReleaseWindow,
    pub features: Vec<MergeRequest>,
    pub bugs: Vec<MergeRequest>,
    pub other: Vec<MergeRequest>,
}

impl ReleaseBucket {
    /// Create an empty bucket for a window
    pub fn new(window: ReleaseWindow) -> Self {
        ReleaseBucket {
            window,
            features: Vec::new(),
            bugs: Vec::new(),
            other: Vec::new(),
        }
    }

    pub fn tag_name(&self) -> &str {
        &self.window.tag.name
    }

    pub fn items(&self, category: Category) -> &[MergeRequest] {
        match category {
            Category::Feature => &self.features,
            Category::Bug => &self.bugs,
            Category::Other => &self.other,
        }
    }

    pub(crate) fn push(&mut self, category: Category, merge_request: MergeRequest) {
        match category {
            Category::Feature => self.features.push(merge_request),
            Category::Bug => self.bugs.push(merge_request),
            Category::Other => self.other.push(merge_request),
        }
    }

    /// Total number of merge requests across all categories
    pub fn len(&self) -> usize {
        self.features.len() + self.bugs.len() + self.other.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
