//! Sphinx adapter: conf.py generation and sentinel-delimited toctree
//! updates in index.md.
//!
//! The machine-managed region of index.md is delimited by HTML comments so
//! repeated runs converge to exactly one toctree block while everything a
//! human wrote around it survives untouched.

use crate::build::{self, BuildReport};
use crate::error::{Error, Result};
use crate::model::ProjectMeta;
use crate::tool::{relative_pages, DocTool};
use regex::{NoExpand, Regex};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

pub const TOCTREE_START: &str = "<!-- FEATURES_TOCTREE_START -->";
pub const TOCTREE_END: &str = "<!-- FEATURES_TOCTREE_END -->";

static RE_TOCTREE_REGION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<!-- FEATURES_TOCTREE_START -->.*?<!-- FEATURES_TOCTREE_END -->").unwrap()
});

pub struct SphinxTool;

impl DocTool for SphinxTool {
    fn generate_config(
        &self,
        docs_root: &Path,
        meta: &ProjectMeta,
        force: bool,
    ) -> Result<PathBuf> {
        let conf = docs_root.join("conf.py");
        if conf.exists() && !force {
            return Err(Error::documentation_project(
                format!("{} already exists", conf.display()),
                "pass --force to overwrite the existing configuration",
            ));
        }
        std::fs::create_dir_all(docs_root).map_err(|e| Error::io(docs_root.to_path_buf(), e))?;
        let content = format!(
            "project = \"{}\"\n\
             author = \"{}\"\n\
             release = \"{}\"\n\
             language = \"{}\"\n\
             \n\
             extensions = [\"myst_parser\"]\n\
             source_suffix = {{\".md\": \"markdown\"}}\n\
             myst_enable_extensions = [\"tasklist\"]\n\
             \n\
             html_theme = \"alabaster\"\n\
             exclude_patterns = [\"_build\"]\n",
            meta.name, meta.author, meta.version, meta.language
        );
        std::fs::write(&conf, content).map_err(|e| Error::io(conf.clone(), e))?;
        Ok(conf)
    }

    fn generate_index(&self, docs_root: &Path, meta: &ProjectMeta) -> Result<PathBuf> {
        let index = docs_root.join("index.md");
        let content = format!(
            "# {} Documentation\n\nVersion {}.\n",
            meta.name, meta.version
        );
        std::fs::write(&index, content).map_err(|e| Error::io(index.clone(), e))?;
        Ok(index)
    }

    fn update_navigation(&self, docs_root: &Path, pages: &[PathBuf]) -> Result<()> {
        let index = docs_root.join("index.md");
        // Sphinx self-heals: a missing index gets a minimal stub. MkDocs
        // deliberately does not get the same leniency.
        let content = if index.is_file() {
            std::fs::read_to_string(&index).map_err(|e| Error::io(index.clone(), e))?
        } else {
            "# Documentation\n".to_string()
        };

        let block = wrapped_toctree(&relative_pages(docs_root, pages));
        let updated = if RE_TOCTREE_REGION.is_match(&content) {
            RE_TOCTREE_REGION
                .replace(&content, NoExpand(&block))
                .into_owned()
        } else {
            let mut out = content;
            if !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
            out.push('\n');
            out.push_str(&block);
            out.push('\n');
            out
        };
        std::fs::write(&index, updated).map_err(|e| Error::io(index, e))
    }

    fn build_docs(&self, docs_root: &Path) -> Result<BuildReport> {
        build::run_build(
            "sphinx-build",
            &["-b", "html", ".", "_build/html"],
            docs_root,
            build::BUILD_TIMEOUT,
        )
    }

    fn validate_project(&self, docs_root: &Path) -> Result<()> {
        let conf = docs_root.join("conf.py");
        let content = std::fs::read_to_string(&conf).map_err(|_| {
            Error::documentation_project(
                format!("missing Sphinx config at {}", conf.display()),
                "run `specdoc init --tool sphinx` first",
            )
        })?;
        for key in ["project", "extensions"] {
            if !content.contains(&format!("{key} =")) {
                return Err(Error::documentation_project(
                    format!("conf.py is missing the `{key}` setting"),
                    format!("add `{key} = ...` to {}", conf.display()),
                ));
            }
        }
        Ok(())
    }
}

/// The sentinel-wrapped MyST toctree block for the given entries
/// (docs-root-relative paths, already sorted; `.md` is stripped).
fn wrapped_toctree(entries: &[String]) -> String {
    let mut block = String::new();
    block.push_str(TOCTREE_START);
    block.push('\n');
    block.push_str("```{toctree}\n:maxdepth: 2\n:caption: Features\n\n");
    for entry in entries {
        block.push_str(entry.strip_suffix(".md").unwrap_or(entry));
        block.push('\n');
    }
    block.push_str("```\n");
    block.push_str(TOCTREE_END);
    block
}
