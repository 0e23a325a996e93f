pub mod article;
pub mod source;

pub use article::{Article, MergeResult, ParsedFeed, RawEntry};
pub use source::{Source, SourceSet};
