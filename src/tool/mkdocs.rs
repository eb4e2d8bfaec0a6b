//! MkDocs adapter: mkdocs.yml generation and structured `nav` merges.
//!
//! mkdocs.yml lives in the project root, sibling to docs/ — a deliberate
//! asymmetry with Sphinx, whose config sits inside the docs root. A missing
//! mkdocs.yml is an error, never silently stubbed: the site config is
//! load-bearing and has no auto-creatable minimal form.

use crate::build::{self, BuildReport};
use crate::error::{Error, Result};
use crate::model::{title_case, ProjectMeta};
use crate::tool::{relative_pages, DocTool};
use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};

const FEATURES_KEY: &str = "Features";

pub struct MkdocsTool;

fn config_path(docs_root: &Path) -> PathBuf {
    docs_root.parent().unwrap_or(docs_root).join("mkdocs.yml")
}

impl DocTool for MkdocsTool {
    fn generate_config(
        &self,
        docs_root: &Path,
        meta: &ProjectMeta,
        force: bool,
    ) -> Result<PathBuf> {
        let config = config_path(docs_root);
        if config.exists() && !force {
            return Err(Error::documentation_project(
                format!("{} already exists", config.display()),
                "pass --force to overwrite the existing configuration",
            ));
        }
        std::fs::create_dir_all(docs_root).map_err(|e| Error::io(docs_root.to_path_buf(), e))?;
        let mut content = String::new();
        content.push_str(&format!("site_name: {}\n", meta.name));
        content.push_str(&format!("site_author: {}\n", meta.author));
        content.push_str("theme:\n  name: mkdocs\n");
        content.push_str(&format!("  locale: {}\n", meta.language));
        content.push_str(&format!("extra:\n  version: {}\n", meta.version));
        content.push_str("nav:\n- Home: index.md\n");
        std::fs::write(&config, content).map_err(|e| Error::io(config.clone(), e))?;
        Ok(config)
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
        let config = config_path(docs_root);
        let raw = std::fs::read_to_string(&config).map_err(|_| {
            Error::documentation_project(
                format!("missing MkDocs config at {}", config.display()),
                "run `specdoc init --tool mkdocs` first; mkdocs.yml is never auto-created",
            )
        })?;
        let mut root: Mapping = serde_yaml::from_str(&raw).map_err(|e| {
            Error::documentation_project(
                format!("{} is not a YAML mapping: {e}", config.display()),
                "fix the YAML syntax or re-run `specdoc init --tool mkdocs --force`",
            )
        })?;

        let features = feature_entries(docs_root, pages);
        let nav = match root
            .entry(Value::String("nav".into()))
            .or_insert_with(|| Value::Sequence(Vec::new()))
        {
            Value::Sequence(seq) => seq,
            other => {
                *other = Value::Sequence(Vec::new());
                match other {
                    Value::Sequence(seq) => seq,
                    _ => unreachable!("just assigned a sequence"),
                }
            }
        };

        // Replace the existing Features entry in place to preserve its
        // position in the nav order; append at the end otherwise.
        let existing = nav.iter_mut().find_map(|item| match item {
            Value::Mapping(m) if m.get(FEATURES_KEY).is_some() => Some(m),
            _ => None,
        });
        match existing {
            Some(mapping) => {
                mapping.insert(Value::String(FEATURES_KEY.into()), features);
            }
            None => {
                let mut mapping = Mapping::new();
                mapping.insert(Value::String(FEATURES_KEY.into()), features);
                nav.push(Value::Mapping(mapping));
            }
        }

        // serde_yaml emits block style and keeps mapping insertion order,
        // so human-edited nav ordering survives the round trip.
        let serialized = serde_yaml::to_string(&root).map_err(|e| {
            Error::documentation_project(
                format!("cannot re-serialize {}: {e}", config.display()),
                "this is a bug in the nav merge; report it with your mkdocs.yml",
            )
        })?;
        std::fs::write(&config, serialized).map_err(|e| Error::io(config, e))
    }

    fn build_docs(&self, docs_root: &Path) -> Result<BuildReport> {
        let project_root = docs_root.parent().unwrap_or(docs_root);
        build::run_build("mkdocs", &["build"], project_root, build::BUILD_TIMEOUT)
    }

    fn validate_project(&self, docs_root: &Path) -> Result<()> {
        let config = config_path(docs_root);
        let raw = std::fs::read_to_string(&config).map_err(|_| {
            Error::documentation_project(
                format!("missing MkDocs config at {}", config.display()),
                "run `specdoc init --tool mkdocs` first",
            )
        })?;
        let root: Mapping = serde_yaml::from_str(&raw).map_err(|e| {
            Error::documentation_project(
                format!("{} is invalid YAML: {e}", config.display()),
                "fix the YAML syntax in mkdocs.yml",
            )
        })?;
        if root.get("site_name").is_none() {
            return Err(Error::documentation_project(
                "mkdocs.yml is missing the `site_name` key".to_string(),
                format!("add `site_name: ...` to {}", config.display()),
            ));
        }
        Ok(())
    }
}

/// `{Title-Cased-Filename: relative/path.md}` entries, sorted by path.
fn feature_entries(docs_root: &Path, pages: &[PathBuf]) -> Value {
    let entries = relative_pages(docs_root, pages)
        .into_iter()
        .map(|rel| {
            let stem = rel
                .rsplit('/')
                .next()
                .unwrap_or(&rel)
                .trim_end_matches(".md");
            let mut entry = Mapping::new();
            entry.insert(
                Value::String(title_case(stem)),
                Value::String(rel.clone()),
            );
            Value::Mapping(entry)
        })
        .collect();
    Value::Sequence(entries)
}
