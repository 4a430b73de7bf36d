//! Files merge requests into release windows and categories.

use tracing::debug;

use crate::config::LabelsConfig;
use crate::domain::{Category, MergeRequest, ReleaseBucket, ReleaseWindow};

/// Outcome of a classification pass
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// One bucket per window, in window order
    pub buckets: Vec<ReleaseBucket>,
    /// Merge requests whose merge time fell outside every window
    pub unmatched: usize,
}

impl Classification {
    /// Number of merge requests that were placed in a bucket
    pub fn classified(&self) -> usize {
        self.buckets.iter().map(ReleaseBucket::len).sum()
    }
}

/// Assigns merge requests to windows and categories by label
pub struct Classifier {
    labels: LabelsConfig,
}

impl Classifier {
    /// Create a new classifier
    pub fn new(labels: LabelsConfig) -> Self {
        Classifier { labels }
    }

    /// Pick the category for a merge request.
    ///
    /// The feature label wins over the bug label; anything else is `Other`.
    pub fn categorize(&self, merge_request: &MergeRequest) -> Category {
        if merge_request.has_label(&self.labels.feature) {
            Category::Feature
        } else if merge_request.has_label(&self.labels.bug) {
            Category::Bug
        } else {
            Category::Other
        }
    }

    /// Classify merge requests into one bucket per window.
    ///
    /// Each merge request goes to the first window containing its merge time.
    /// Merge requests outside every window are dropped and counted.
    pub fn classify(
        &self,
        windows: &[ReleaseWindow],
        merge_requests: &[MergeRequest],
    ) -> Classification {
        let mut buckets: Vec<ReleaseBucket> =
            windows.iter().cloned().map(ReleaseBucket::new).collect();
        let mut unmatched = 0;

        for merge_request in merge_requests {
            let slot = windows
                .iter()
                .position(|window| window.contains(merge_request.merged_at));

            match slot {
                Some(index) => {
                    let category = self.categorize(merge_request);
                    debug!(
                        reference = %merge_request.reference,
                        tag = %windows[index].tag.name,
                        %category,
                        "classified merge request"
                    );
                    buckets[index].push(category, merge_request.clone());
                }
                None => {
                    debug!(
                        reference = %merge_request.reference,
                        merged_at = %merge_request.merged_at,
                        "merge request is outside every release window"
                    );
                    unmatched += 1;
                }
            }
        }

        Classification { buckets, unmatched }
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Classifier::new(LabelsConfig::default())
    }
}
