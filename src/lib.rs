pub mod classifier;
pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod domain;
pub mod error;
pub mod gitlab;
pub mod logging;
pub mod render;
pub mod timestamp;
pub mod ui;
pub mod window;

pub use error::{ChangelogError, Result};
