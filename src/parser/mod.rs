//! Markdown parsing — section trees and frontmatter.

pub mod frontmatter;
pub mod markdown;

pub use frontmatter::extract_metadata;
pub use markdown::{extract_headings, parse, Heading, ParseOptions};
