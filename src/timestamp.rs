//! Parsing of GitLab timestamp strings into comparable instants.
//!
//! GitLab reports times as `YYYY-MM-DDTHH:MM:SS.fff` followed by either `Z` or a
//! `±hh:mm` offset. Every instant is normalized to UTC so that tags and merge
//! requests recorded in different offsets compare correctly.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::error::{ChangelogError, Result};

/// A point in time on the changelog axis.
pub type Instant = DateTime<Utc>;

/// Lower bound of the oldest release window unless configured otherwise.
pub const DEFAULT_CHANGELOG_START: &str = "2020-01-01T00:00:00.000Z";

const TIMESTAMP_PATTERN: &str =
    r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}\.\d{1,9}(Z|[+-]\d{2}:\d{2})$";

fn timestamp_regex() -> &'static Regex {
    static TIMESTAMP_RE: OnceLock<Regex> = OnceLock::new();
    TIMESTAMP_RE.get_or_init(|| Regex::new(TIMESTAMP_PATTERN).expect("timestamp pattern is valid"))
}

/// Parse a GitLab timestamp.
///
/// The fractional seconds and the zone designator are both mandatory.
///
/// # Returns
/// * `Ok(Instant)` - The instant in UTC
/// * `Err(ChangelogError::MalformedTimestamp)` - If the text does not match the format
pub fn parse(text: &str) -> Result<Instant> {
    if !timestamp_regex().is_match(text) {
        return Err(ChangelogError::malformed_timestamp(text));
    }

    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ChangelogError::malformed_timestamp(text))
}

/// The instant behind [`DEFAULT_CHANGELOG_START`].
pub fn default_changelog_start() -> Instant {
    parse(DEFAULT_CHANGELOG_START).unwrap_or(DateTime::<Utc>::MIN_UTC)
}
