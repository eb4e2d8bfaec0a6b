//! Documentation tool dispatch — trait-based, one implementation per tool.
//!
//! Sphinx and MkDocs have genuinely different file layouts and navigation
//! update strategies (sentinel-comment replace vs structured YAML merge),
//! so each lives behind the shared [`DocTool`] interface.

pub mod mkdocs;
pub mod sphinx;

use crate::build::BuildReport;
use crate::error::Result;
use crate::model::{ProjectMeta, ToolType};
use std::path::{Path, PathBuf};

pub trait DocTool {
    /// Write the tool's config file. Refuses to overwrite unless `force`.
    fn generate_config(&self, docs_root: &Path, meta: &ProjectMeta, force: bool)
        -> Result<PathBuf>;

    /// Write a starter docs index page.
    fn generate_index(&self, docs_root: &Path, meta: &ProjectMeta) -> Result<PathBuf>;

    /// Re-synchronize navigation with the generated page set. Idempotent:
    /// a second call with the same pages is a byte-level no-op.
    fn update_navigation(&self, docs_root: &Path, pages: &[PathBuf]) -> Result<()>;

    /// Shell out to the tool's build command.
    fn build_docs(&self, docs_root: &Path) -> Result<BuildReport>;

    /// Check the config file exists and carries its required keys.
    fn validate_project(&self, docs_root: &Path) -> Result<()>;
}

/// Create the implementation for the given tool.
pub fn create_tool(kind: ToolType) -> Box<dyn DocTool> {
    match kind {
        ToolType::Sphinx => Box::new(sphinx::SphinxTool),
        ToolType::Mkdocs => Box::new(mkdocs::MkdocsTool),
    }
}

/// Navigation entries: page paths relative to the docs root, forward
/// slashes, sorted. Pages outside the docs root are ignored.
pub(crate) fn relative_pages(docs_root: &Path, pages: &[PathBuf]) -> Vec<String> {
    let mut rels: Vec<String> = pages
        .iter()
        .filter_map(|p| p.strip_prefix(docs_root).ok())
        .map(|rel| rel.to_string_lossy().replace('\\', "/"))
        .collect();
    rels.sort();
    rels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_pages_sorted_and_scoped() {
        let docs = Path::new("/proj/docs");
        let pages = vec![
            PathBuf::from("/proj/docs/features/zeta.md"),
            PathBuf::from("/proj/docs/alpha.md"),
            PathBuf::from("/elsewhere/rogue.md"),
        ];
        assert_eq!(
            relative_pages(docs, &pages),
            vec!["alpha.md".to_string(), "features/zeta.md".to_string()]
        );
    }
}
