//! Markdown rendering of classified releases.
//!
//! Rendering is a pure function of the bucket list: one release section per
//! bucket, each with a Features, Bug Fixes and Other subsection. Empty
//! subsections keep their heading.

use crate::domain::{Category, MergeRequest, ReleaseBucket};

/// Top-level heading of every generated document
pub const DOCUMENT_HEADER: &str = "# CHANGELOG\n\n";

/// Render the whole changelog document
pub fn render(buckets: &[ReleaseBucket]) -> String {
    let releases: Vec<String> = buckets.iter().map(render_release).collect();
    format!("{}{}", DOCUMENT_HEADER, releases.join("\n"))
}

/// Render one release section, headed by the tag name
pub fn render_release(bucket: &ReleaseBucket) -> String {
    let mut section = format!("## {}\n", bucket.tag_name());
    for category in Category::ALL {
        section.push_str(&format!("\n### {}\n", category.heading()));
        section.push_str(&render_items(bucket.items(category)));
    }
    section.push('\n');
    section
}

/// Render a single changelog line:
/// `* <title> ([<reference>](<url>), [<author>](<author url>))`
pub fn render_item(merge_request: &MergeRequest) -> String {
    format!(
        "* {} ([{}]({}), [{}]({}))",
        merge_request.title,
        merge_request.reference,
        merge_request.web_url,
        merge_request.author.name,
        merge_request.author.web_url
    )
}

fn render_items(items: &[MergeRequest]) -> String {
    items.iter().map(render_item).collect::<Vec<_>>().join("\n")
}
