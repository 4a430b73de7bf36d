//! GitLab access layer
//!
//! The changelog core only needs three things from GitLab: the project, its tags
//! and its merged merge requests. The [GitLabApi] trait names exactly those, so
//! the rest of the crate can run against either implementation:
//!
//! - [client::GitLabClient]: the REST API over a blocking `reqwest` client
//! - [mock::MockGitLab]: an in-memory implementation for tests
//!
//! ```rust
//! # use gitlab_changelog::gitlab::GitLabApi;
//! # fn example<A: GitLabApi>(api: &A) -> gitlab_changelog::Result<()> {
//! let project = api.find_project("acme", "app")?;
//! let tags = api.list_tags(&project)?;
//! let merged = api.list_merged_merge_requests(&project, None)?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod mock;

pub use client::GitLabClient;
pub use mock::MockGitLab;

use crate::domain::{MergeRequest, Tag};
use crate::error::Result;

/// A project resolved on the GitLab instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRef {
    pub id: u64,
    pub name: String,
    /// Name of the owning group or user namespace
    pub namespace: String,
}

impl ProjectRef {
    pub fn new(id: u64, namespace: impl Into<String>, name: impl Into<String>) -> Self {
        ProjectRef {
            id,
            name: name.into(),
            namespace: namespace.into(),
        }
    }

    /// `group/name`, for messages
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.namespace, self.name)
    }
}

/// Read access to the GitLab data the changelog is built from
pub trait GitLabApi {
    /// Resolve a project by its group and name.
    ///
    /// # Returns
    /// * `Ok(ProjectRef)` - The project whose namespace and name both match exactly
    /// * `Err(ChangelogError::ProjectNotFound)` - If no project matches
    fn find_project(&self, group: &str, name: &str) -> Result<ProjectRef>;

    /// List all tags of a project, newest first.
    fn list_tags(&self, project: &ProjectRef) -> Result<Vec<Tag>>;

    /// List every merged merge request of a project.
    ///
    /// # Arguments
    /// * `project` - The project to query
    /// * `target_branch` - Restrict to merge requests into this branch when `Some`
    fn list_merged_merge_requests(
        &self,
        project: &ProjectRef,
        target_branch: Option<&str>,
    ) -> Result<Vec<MergeRequest>>;
}
