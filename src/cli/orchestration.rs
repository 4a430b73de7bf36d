//! Main workflow orchestration logic
//!
//! Resolves the project, pulls tags and merged merge requests through a
//! [GitLabApi] implementation, runs them through the window builder,
//! classifier and renderer, and hands back a report. Writing the document is
//! a separate step so callers can preview it first.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::classifier::Classifier;
use crate::config::Config;
use crate::diagnostics::ChangelogWarning;
use crate::error::Result;
use crate::gitlab::GitLabApi;
use crate::render::render;
use crate::window::WindowBuilder;

/// Command-line overrides for the loaded configuration
///
/// Mirrors the CLI Args so the workflow can be driven programmatically
/// without depending on clap.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GenerateArgs {
    pub config_path: Option<String>,
    pub host: Option<String>,
    pub group: Option<String>,
    pub project: Option<String>,
    pub token: Option<String>,
    /// Changelog start timestamp
    pub since: Option<String>,
    pub output: Option<String>,
    /// Overwrite an existing output file without asking
    pub force: bool,
    /// Print the document instead of writing it
    pub dry_run: bool,
}

impl GenerateArgs {
    /// Apply every override that was given on the command line
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(host) = &self.host {
            config.gitlab.host = host.clone();
        }
        if let Some(group) = &self.group {
            config.gitlab.group = Some(group.clone());
        }
        if let Some(project) = &self.project {
            config.gitlab.project = Some(project.clone());
        }
        if let Some(token) = &self.token {
            config.gitlab.private_token = Some(token.clone());
        }
        if let Some(since) = &self.since {
            config.changelog.start = since.clone();
        }
        if let Some(output) = &self.output {
            config.changelog.output = output.clone();
        }
    }
}

/// Result of a changelog run
#[derive(Debug, Clone, PartialEq)]
pub struct ChangelogReport {
    /// `group/name` of the project
    pub project: String,
    pub document: String,
    pub releases: usize,
    /// Merged merge requests returned by GitLab
    pub merge_requests: usize,
    pub classified: usize,
    pub unmatched: usize,
    pub warnings: Vec<ChangelogWarning>,
}

/// Build the changelog document for the configured project
///
/// # Arguments
///
/// * `api` - GitLab access, real or mocked
/// * `config` - Validated configuration (group, project, start, labels)
///
/// # Returns
///
/// The rendered document and run statistics, or the first fatal error
pub fn run_changelog<A: GitLabApi>(api: &A, config: &Config) -> Result<ChangelogReport> {
    let builder = WindowBuilder::from_timestamp(&config.changelog.start)?;
    let project = api.find_project(config.group()?, config.project()?)?;
    info!(project = %project.full_name(), id = project.id, "resolved project");

    let mut warnings = Vec::new();

    let tags = api.list_tags(&project)?;
    info!(count = tags.len(), "fetched tags");
    if tags.is_empty() {
        warnings.push(ChangelogWarning::NoTags {
            project: project.full_name(),
        });
    }

    let windows = builder.build_windows(&tags)?;
    warnings.extend(windows.iter().filter(|w| w.is_inverted()).map(|w| {
        ChangelogWarning::TagBeforeChangelogStart {
            tag: w.tag.name.clone(),
            start: builder.changelog_start(),
        }
    }));

    let merge_requests =
        api.list_merged_merge_requests(&project, config.changelog.target_branch.as_deref())?;
    info!(count = merge_requests.len(), "fetched merged merge requests");

    let classification = Classifier::new(config.labels.clone()).classify(&windows, &merge_requests);
    if classification.unmatched > 0 {
        warnings.push(ChangelogWarning::UnmatchedMergeRequests {
            count: classification.unmatched,
        });
    }

    let document = render(&classification.buckets);

    Ok(ChangelogReport {
        project: project.full_name(),
        releases: classification.buckets.len(),
        merge_requests: merge_requests.len(),
        classified: classification.classified(),
        unmatched: classification.unmatched,
        warnings,
        document,
    })
}

/// Write the finished document in a single call
pub fn write_changelog(path: &Path, document: &str) -> Result<()> {
    fs::write(path, document)?;
    info!(path = %path.display(), bytes = document.len(), "changelog written");
    Ok(())
}
