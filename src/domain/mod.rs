//! Domain model - plain values shared by the window builder, classifier and renderer

pub mod merge_request;
pub mod release;
pub mod tag;

pub use merge_request::{Author, MergeRequest};
pub use release::{Category, ReleaseBucket, ReleaseWindow};
pub use tag::Tag;
