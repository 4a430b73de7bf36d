//! Derives one release window per tag from a newest-first tag list.

use crate::domain::{ReleaseWindow, Tag};
use crate::error::{ChangelogError, Result};
use crate::timestamp::{self, Instant};

/// Builds release windows, closing the oldest one at the changelog start
#[derive(Debug, Clone)]
pub struct WindowBuilder {
    changelog_start: Instant,
}

impl WindowBuilder {
    /// Create a builder whose oldest window starts at `changelog_start`
    pub fn new(changelog_start: Instant) -> Self {
        WindowBuilder { changelog_start }
    }

    /// Create a builder from a GitLab-formatted start timestamp
    pub fn from_timestamp(changelog_start: &str) -> Result<Self> {
        Ok(WindowBuilder::new(timestamp::parse(changelog_start)?))
    }

    pub fn changelog_start(&self) -> Instant {
        self.changelog_start
    }

    /// Build one window per tag, in tag order.
    ///
    /// Each window ends at its tag's commit time and starts just after the next
    /// (older) tag's commit time. The last window starts at the changelog start,
    /// inclusive.
    ///
    /// # Arguments
    /// * `tags` - Tags ordered newest-first; equal commit times are allowed
    ///
    /// # Returns
    /// * `Ok(Vec<ReleaseWindow>)` - Exactly `tags.len()` windows
    /// * `Err(ChangelogError::UnorderedTagList)` - If a tag is older than the one after it
    pub fn build_windows(&self, tags: &[Tag]) -> Result<Vec<ReleaseWindow>> {
        for pair in tags.windows(2) {
            let (current, next) = (&pair[0], &pair[1]);
            if current.commit_created_at < next.commit_created_at {
                return Err(ChangelogError::UnorderedTagList {
                    newer: next.name.clone(),
                    older: current.name.clone(),
                });
            }
        }

        let windows = tags
            .iter()
            .enumerate()
            .map(|(i, tag)| match tags.get(i + 1) {
                Some(older) => ReleaseWindow::after(tag.clone(), older.commit_created_at),
                None => ReleaseWindow::since(tag.clone(), self.changelog_start),
            })
            .collect();

        Ok(windows)
    }
}

impl Default for WindowBuilder {
    fn default() -> Self {
        WindowBuilder::new(timestamp::default_changelog_start())
    }
}
