use std::collections::HashMap;

use crate::domain::{MergeRequest, Tag};
use crate::error::{ChangelogError, Result};
use crate::gitlab::{GitLabApi, ProjectRef};

const MOCK_DEFAULT_BRANCH: &str = "master";

/// Mock GitLab instance for testing without network access
pub struct MockGitLab {
    projects: Vec<ProjectRef>,
    tags: HashMap<u64, Vec<Tag>>,
    merge_requests: HashMap<u64, Vec<(String, MergeRequest)>>,
}

impl MockGitLab {
    /// Create an empty mock instance
    pub fn new() -> Self {
        MockGitLab {
            projects: Vec::new(),
            tags: HashMap::new(),
            merge_requests: HashMap::new(),
        }
    }

    /// Register a project
    pub fn add_project(&mut self, project: ProjectRef) {
        self.projects.push(project);
    }

    /// Append a tag; tags are returned in insertion order
    pub fn add_tag(&mut self, project_id: u64, tag: Tag) {
        self.tags.entry(project_id).or_default().push(tag);
    }

    /// Append a merge request merged into the default branch
    pub fn add_merge_request(&mut self, project_id: u64, merge_request: MergeRequest) {
        self.add_merge_request_into(project_id, MOCK_DEFAULT_BRANCH, merge_request);
    }

    /// Append a merge request merged into `target_branch`
    pub fn add_merge_request_into(
        &mut self,
        project_id: u64,
        target_branch: impl Into<String>,
        merge_request: MergeRequest,
    ) {
        self.merge_requests
            .entry(project_id)
            .or_default()
            .push((target_branch.into(), merge_request));
    }
}

impl Default for MockGitLab {
    fn default() -> Self {
        Self::new()
    }
}

impl GitLabApi for MockGitLab {
    fn find_project(&self, group: &str, name: &str) -> Result<ProjectRef> {
        self.projects
            .iter()
            .find(|p| p.namespace == group && p.name == name)
            .cloned()
            .ok_or_else(|| ChangelogError::ProjectNotFound(format!("{}/{}", group, name)))
    }

    fn list_tags(&self, project: &ProjectRef) -> Result<Vec<Tag>> {
        Ok(self.tags.get(&project.id).cloned().unwrap_or_default())
    }

    fn list_merged_merge_requests(
        &self,
        project: &ProjectRef,
        target_branch: Option<&str>,
    ) -> Result<Vec<MergeRequest>> {
        let merged: Vec<MergeRequest> = self
            .merge_requests
            .get(&project.id)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|(branch, _)| target_branch.map_or(true, |t| t == branch.as_str()))
                    .map(|(_, mr)| mr.clone())
                    .collect()
            })
            .unwrap_or_default();
        Ok(merged)
    }
}
