use thiserror::Error;

/// Unified error type for changelog generation
#[derive(Error, Debug)]
pub enum ChangelogError {
    #[error("Malformed timestamp: '{0}'")]
    MalformedTimestamp(String),

    #[error("Tag list is not ordered newest-first: '{older}' is listed before '{newer}'")]
    UnorderedTagList { newer: String, older: String },

    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration file is invalid: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("GitLab API error: {0}")]
    Api(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in gitlab-changelog
pub type Result<T> = std::result::Result<T, ChangelogError>;

impl ChangelogError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ChangelogError::Config(msg.into())
    }

    /// Create a GitLab API error with context
    pub fn api(msg: impl Into<String>) -> Self {
        ChangelogError::Api(msg.into())
    }

    pub fn malformed_timestamp(text: impl Into<String>) -> Self {
        ChangelogError::MalformedTimestamp(text.into())
    }
}
