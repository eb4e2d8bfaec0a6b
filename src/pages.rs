//! Feature page generation.
//!
//! One markdown page per feature, rendered from the feature's spec.md (or
//! its LLM-transformed replacement) and written to the path the structure
//! policy dictates. Plan and tasks documents are linked, never inlined —
//! current policy keeps generated pages spec-only.

use crate::error::{Error, Result};
use crate::model::{self, Dialect, Document, DocumentType, Feature, StructureType};
use crate::structure;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// LLM transform map, produced by a separate invocation step this crate
/// does not perform. Keys are `{id}-{name}`.
#[derive(Debug, Default, Deserialize)]
pub struct TransformMap(BTreeMap<String, TransformEntry>);

#[derive(Debug, Deserialize)]
struct TransformEntry {
    spec_content: String,
}

impl TransformMap {
    /// Load and shape-check the transform JSON. A malformed file is a
    /// contract violation by the caller, not a parse degradation.
    pub fn load(path: &Path) -> Result<TransformMap> {
        let raw = std::fs::read_to_string(path).map_err(|e| Error::io(path.to_path_buf(), e))?;
        serde_json::from_str(&raw).map_err(|e| {
            Error::project_validation(
                format!("transform map {} is not valid: {e}", path.display()),
                "expected JSON shaped {\"NNN-name\": {\"spec_content\": \"...\"}}",
            )
        })
    }

    pub fn spec_content_for(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(|e| e.spec_content.as_str())
    }
}

/// Everything page rendering needs, threaded explicitly — the generator
/// holds no ambient structure state.
pub struct PageContext<'a> {
    pub docs_root: &'a Path,
    pub structure: StructureType,
    pub dialect: Dialect,
    pub transforms: &'a TransformMap,
    /// Optional site-wide prefix template with `${name}` substitution.
    pub prefix_template: Option<String>,
}

/// Read `docs/_prefix.md` if present. Absence is fine; a present but
/// unreadable template is a packaging defect and raises.
pub fn load_prefix_template(docs_root: &Path) -> Result<Option<String>> {
    let candidate = docs_root.join("_prefix.md");
    if !candidate.exists() {
        return Ok(None);
    }
    std::fs::read_to_string(&candidate)
        .map(Some)
        .map_err(|e| Error::io(candidate, e))
}

/// Generate one page per feature, returning the written paths in input
/// order. Features without a spec file are filtered out up front — the
/// skip is part of the flow, not error handling.
pub fn generate_pages(features: &[Feature], ctx: &PageContext) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for feature in features.iter().filter(|f| f.has_spec_file()) {
        let doc = Document::load(&feature.spec_file, DocumentType::Spec)?;
        let rel = structure::feature_page_path(ctx.structure, &feature.name);
        let out_path = ctx.docs_root.join(&rel);
        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::io(parent.to_path_buf(), e))?;
        }
        let page = render_page(feature, &doc, ctx);
        std::fs::write(&out_path, page).map_err(|e| Error::io(out_path.clone(), e))?;
        written.push(out_path);
    }
    Ok(written)
}

/// Render a feature page in a fixed order: prefix, anchor (MyST), title,
/// status line, spec body, "Feature Files" links.
fn render_page(feature: &Feature, doc: &Document, ctx: &PageContext) -> String {
    let title = doc.title();
    let mut out = String::new();

    if let Some(ref tpl) = ctx.prefix_template {
        out.push_str(&tpl.replace("${name}", &feature.name));
        out.push('\n');
    }

    if ctx.dialect == Dialect::Myst {
        out.push_str(&format!("({})=\n\n", model::slugify(&title)));
    }

    out.push_str(&format!("# {}\n\n", title));

    let mut status_line = format!("**Status:** {}", feature.status());
    if let Some(ref priority) = feature.priority {
        status_line.push_str(&format!(" · **Priority:** {}", priority));
    }
    out.push_str(&status_line);
    out.push_str("\n\n");

    match ctx.transforms.spec_content_for(&feature.key()) {
        Some(transformed) => {
            out.push_str(transformed.trim_end());
            out.push_str("\n\n");
        }
        None => write_spec_body(&mut out, doc, &title),
    }

    out.push_str("## Feature Files\n\n");
    let specs_rel = format!("{}specs/{}", "../".repeat(page_depth(ctx.structure)), feature.key());
    out.push_str(&format!("- [Specification]({specs_rel}/spec.md)\n"));
    if feature.plan_file.is_some() {
        out.push_str(&format!("- [Implementation Plan]({specs_rel}/plan.md)\n"));
    }
    if feature.tasks_file.is_some() {
        out.push_str(&format!("- [Task Breakdown]({specs_rel}/tasks.md)\n"));
    }

    out
}

/// Generate per-feature scaffold directories: `features/{id}-{name}/` with
/// an index page and one subpage per companion document.
///
/// This is the second, deliberately separate path scheme — scaffold paths
/// keep the feature ID, update paths never do. Scaffold output is not wired
/// into navigation.
pub fn scaffold_pages(
    features: &[Feature],
    docs_root: &Path,
    dialect: Dialect,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for feature in features.iter().filter(|f| f.has_spec_file()) {
        let doc = Document::load(&feature.spec_file, DocumentType::Spec)?;
        let index_path =
            docs_root.join(structure::scaffold_index_path(&feature.id, &feature.name));
        if let Some(parent) = index_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::io(parent.to_path_buf(), e))?;
        }

        let mut subpages = Vec::new();
        for (doc_type, file) in [
            (DocumentType::Plan, &feature.plan_file),
            (DocumentType::Tasks, &feature.tasks_file),
        ] {
            let Some(file) = file else { continue };
            let sub_doc = Document::load(file, doc_type)?;
            let name = doc_type.file_name().trim_end_matches(".md");
            let sub_path = docs_root.join(structure::scaffold_subpage_path(
                &feature.id,
                &feature.name,
                name,
            ));
            std::fs::write(&sub_path, sub_doc.to_markdown(dialect))
                .map_err(|e| Error::io(sub_path.clone(), e))?;
            subpages.push((name.to_string(), sub_path));
        }

        let index = render_scaffold_index(feature, &doc, &subpages);
        std::fs::write(&index_path, index).map_err(|e| Error::io(index_path.clone(), e))?;
        written.push(index_path);
        written.extend(subpages.into_iter().map(|(_, p)| p));
    }
    Ok(written)
}

fn render_scaffold_index(
    feature: &Feature,
    doc: &Document,
    subpages: &[(String, PathBuf)],
) -> String {
    let mut out = String::new();
    out.push_str(&format!("# {}\n\n", doc.title()));
    out.push_str(&format!("**Status:** {}\n\n", feature.status()));

    let headings = crate::parser::extract_headings(&doc.content);
    let outline: Vec<_> = headings.iter().filter(|h| h.level == 2).collect();
    if !outline.is_empty() {
        out.push_str("## Outline\n\n");
        for h in outline {
            out.push_str(&format!("- {}\n", h.text));
        }
        out.push('\n');
    }

    if !subpages.is_empty() {
        out.push_str("## Contents\n\n");
        for (name, _) in subpages {
            out.push_str(&format!("- [{}]({}.md)\n", model::title_case(name), name));
        }
        out.push('\n');
    }
    out
}

/// Spec content only. A leading level-1 section whose title became the page
/// title is unwrapped (its body and subsections are kept, the duplicate
/// heading is not).
fn write_spec_body(out: &mut String, doc: &Document, page_title: &str) {
    for (i, section) in doc.sections.iter().enumerate() {
        if i == 0 && section.level == 1 && section.title == page_title {
            if !section.content.is_empty() {
                out.push_str(&section.content);
                out.push_str("\n\n");
            }
            for sub in &section.subsections {
                model::write_section(out, sub);
            }
        } else {
            model::write_section(out, section);
        }
    }
}

/// Directory depth of a generated page below the docs root, used to build
/// relative links back into specs/.
fn page_depth(structure: StructureType) -> usize {
    match structure {
        StructureType::Flat => 1,
        StructureType::Comprehensive => 2,
    }
}
