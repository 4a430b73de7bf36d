use std::collections::BTreeSet;

use crate::timestamp::Instant;

/// Author of a merge request, linked to their profile page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub name: String,
    pub web_url: String,
}

impl Author {
    pub fn new(name: impl Into<String>, web_url: impl Into<String>) -> Self {
        Author {
            name: name.into(),
            web_url: web_url.into(),
        }
    }
}

/// A merged merge request as it appears in the changelog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeRequest {
    pub title: String,
    /// Short reference such as `!42`
    pub reference: String,
    pub web_url: String,
    pub author: Author,
    pub merged_at: Instant,
    pub labels: BTreeSet<String>,
}

impl MergeRequest {
    /// Create an unlabeled merge request
    pub fn new(
        title: impl Into<String>,
        reference: impl Into<String>,
        web_url: impl Into<String>,
        author: Author,
        merged_at: Instant,
    ) -> Self {
        MergeRequest {
            title: title.into(),
            reference: reference.into(),
            web_url: web_url.into(),
            author,
            merged_at,
            labels: BTreeSet::new(),
        }
    }

    /// Replace the label set
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.labels.contains(label)
    }
}
