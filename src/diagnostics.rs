use std::fmt;

use crate::timestamp::Instant;

/// Non-fatal conditions found while building a changelog.
/// The document is still produced; these are reported to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangelogWarning {
    /// The project has no tags, so the changelog has no release sections
    NoTags { project: String },
    /// Merge requests merged outside every release window were left out
    UnmatchedMergeRequests { count: usize },
    /// The oldest tag predates the changelog start, so its section stays empty
    TagBeforeChangelogStart { tag: String, start: Instant },
}

impl fmt::Display for ChangelogWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangelogWarning::NoTags { project } => {
                write!(f, "Project '{}' has no tags; no releases to list", project)
            }
            ChangelogWarning::UnmatchedMergeRequests { count } => {
                let noun = if *count == 1 {
                    "merge request"
                } else {
                    "merge requests"
                };
                write!(
                    f,
                    "{} {} merged outside every release window were left out",
                    count, noun
                )
            }
            ChangelogWarning::TagBeforeChangelogStart { tag, start } => {
                write!(
                    f,
                    "Tag '{}' predates the changelog start ({}); its section will be empty",
                    tag,
                    start.format("%Y-%m-%d %H:%M:%S UTC")
                )
            }
        }
    }
}
