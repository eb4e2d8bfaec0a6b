//! Data model for the documentation pipeline — value objects only.
//!
//! Everything here is owned, immutable after construction, and rebuilt on
//! every run; there is no persisted identity across invocations.

use crate::error::{Error, Result};
use crate::parser;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// A heading-delimited region of a markdown document.
///
/// `content` is the body text between this heading and the next heading at
/// any level; subsection text lives in `subsections`, not in `content`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    /// Heading level, 1..=6.
    pub level: u8,
    pub content: String,
    /// 1-based line of the heading.
    pub line_start: usize,
    /// 1-based last line of this section's own body (the heading line when
    /// the body is empty).
    pub line_end: usize,
    pub subsections: Vec<Section>,
}

impl Section {
    /// Depth-first walk over this section and its subsections.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Section)) {
        visit(self);
        for sub in &self.subsections {
            sub.walk(visit);
        }
    }
}

/// The three document kinds a feature directory can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentType {
    Spec,
    Plan,
    Tasks,
}

impl DocumentType {
    pub fn file_name(self) -> &'static str {
        match self {
            DocumentType::Spec => "spec.md",
            DocumentType::Plan => "plan.md",
            DocumentType::Tasks => "tasks.md",
        }
    }
}

/// Output markdown dialect for document serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// Sphinx-flavored MyST: frontmatter plus a `(slug)=` anchor target
    /// before the first heading.
    Myst,
    /// Plain CommonMark for MkDocs.
    Plain,
}

/// A parsed markdown file with its section forest and frontmatter.
#[derive(Debug, Clone)]
pub struct Document {
    pub file_path: PathBuf,
    pub doc_type: DocumentType,
    /// Raw markdown, including any preamble text before the first heading
    /// (which `sections` deliberately drops).
    pub content: String,
    pub sections: Vec<Section>,
    pub metadata: BTreeMap<String, String>,
    pub last_modified: Option<SystemTime>,
    /// Reserved for callers that track working-tree state; neither loading
    /// nor discovery populates it.
    pub git_status: Option<String>,
}

impl Document {
    /// Read and parse a file. Parsing never fails on malformed markdown;
    /// only I/O errors surface.
    pub fn load(path: &Path, doc_type: DocumentType) -> Result<Document> {
        let content =
            std::fs::read_to_string(path).map_err(|e| Error::io(path.to_path_buf(), e))?;
        let last_modified = std::fs::metadata(path).ok().and_then(|m| m.modified().ok());
        let mut doc = Document::from_content(path, doc_type, content);
        doc.last_modified = last_modified;
        Ok(doc)
    }

    pub fn from_content(path: &Path, doc_type: DocumentType, content: String) -> Document {
        let options = parser::ParseOptions {
            myst: matches!(doc_type, DocumentType::Spec),
        };
        let sections = parser::parse(&content, options);
        let metadata = parser::extract_metadata(&content);
        Document {
            file_path: path.to_path_buf(),
            doc_type,
            content,
            sections,
            metadata,
            last_modified: None,
            git_status: None,
        }
    }

    /// Resolve the document title: explicit `title` metadata, then the first
    /// level-1 section, then a title-cased file-stem fallback.
    pub fn title(&self) -> String {
        if let Some(title) = self.metadata.get("title") {
            return title.clone();
        }
        if let Some(first_h1) = self.sections.iter().find(|s| s.level == 1) {
            return first_h1.title.clone();
        }
        let stem = self
            .file_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("untitled");
        title_case(stem)
    }

    /// Serialize back to markdown in the requested dialect.
    pub fn to_markdown(&self, dialect: Dialect) -> String {
        let mut out = String::new();
        if !self.metadata.is_empty() {
            out.push_str("---\n");
            for (key, value) in &self.metadata {
                out.push_str(&format!("{}: {}\n", key, value));
            }
            out.push_str("---\n\n");
        }
        if dialect == Dialect::Myst {
            out.push_str(&format!("({})=\n\n", slugify(&self.title())));
        }
        for section in &self.sections {
            write_section(&mut out, section);
        }
        out
    }
}

pub(crate) fn write_section(out: &mut String, section: &Section) {
    out.push_str(&"#".repeat(section.level as usize));
    out.push(' ');
    out.push_str(&section.title);
    out.push_str("\n\n");
    if !section.content.is_empty() {
        out.push_str(&section.content);
        out.push_str("\n\n");
    }
    for sub in &section.subsections {
        write_section(out, sub);
    }
}

/// Coarse feature status, derived from which documents exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureStatus {
    Draft,
    Planned,
    InProgress,
    Completed,
}

impl std::fmt::Display for FeatureStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FeatureStatus::Draft => "draft",
            FeatureStatus::Planned => "planned",
            FeatureStatus::InProgress => "in-progress",
            FeatureStatus::Completed => "completed",
        };
        f.write_str(s)
    }
}

/// One spec-kit feature directory (`specs/NNN-name/`).
#[derive(Debug, Clone)]
pub struct Feature {
    /// Zero-padded 3-digit identifier.
    pub id: String,
    /// Slug name without the ID prefix.
    pub name: String,
    pub directory: PathBuf,
    pub spec_file: PathBuf,
    pub plan_file: Option<PathBuf>,
    pub tasks_file: Option<PathBuf>,
    pub priority: Option<String>,
    pub metadata: BTreeMap<String, String>,
}

impl Feature {
    /// The `{id}-{name}` key used by transform maps and scaffold paths.
    pub fn key(&self) -> String {
        format!("{}-{}", self.id, self.name)
    }

    pub fn has_spec_file(&self) -> bool {
        self.spec_file.is_file()
    }

    /// Status is derived, never stored: spec only → Draft, +plan → Planned,
    /// +plan+tasks → InProgress. Spec metadata `status: completed` upgrades
    /// to Completed regardless of which files exist.
    pub fn status(&self) -> FeatureStatus {
        if self
            .metadata
            .get("status")
            .is_some_and(|s| s.eq_ignore_ascii_case("completed"))
        {
            return FeatureStatus::Completed;
        }
        match (&self.plan_file, &self.tasks_file) {
            (Some(_), Some(_)) => FeatureStatus::InProgress,
            (Some(_), None) => FeatureStatus::Planned,
            _ => FeatureStatus::Draft,
        }
    }
}

/// Documentation site layout. See the structure policy for the one-way
/// FLAT → COMPREHENSIVE ratchet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureType {
    Flat,
    Comprehensive,
}

impl std::fmt::Display for StructureType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StructureType::Flat => f.write_str("flat"),
            StructureType::Comprehensive => f.write_str("comprehensive"),
        }
    }
}

/// Supported documentation tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ToolType {
    Sphinx,
    Mkdocs,
}

impl std::fmt::Display for ToolType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToolType::Sphinx => f.write_str("sphinx"),
            ToolType::Mkdocs => f.write_str("mkdocs"),
        }
    }
}

impl ToolType {
    pub fn config_file_name(self) -> &'static str {
        match self {
            ToolType::Sphinx => "conf.py",
            ToolType::Mkdocs => "mkdocs.yml",
        }
    }

    /// Where the tool's config lives. Sphinx keeps conf.py inside the docs
    /// root; MkDocs keeps mkdocs.yml in the project root, sibling to docs/.
    pub fn config_path(self, docs_root: &Path) -> PathBuf {
        match self {
            ToolType::Sphinx => docs_root.join("conf.py"),
            ToolType::Mkdocs => docs_root
                .parent()
                .unwrap_or(docs_root)
                .join("mkdocs.yml"),
        }
    }
}

/// Project metadata captured at init time and echoed into tool configs.
#[derive(Debug, Clone)]
pub struct ProjectMeta {
    pub name: String,
    pub author: String,
    pub version: String,
    pub language: String,
}

/// A validated documentation site rooted at `docs_root`.
///
/// Construction fails loudly when the tool's config file is absent; this is
/// a precondition, not a lazy check.
#[derive(Debug, Clone)]
pub struct DocumentationSite {
    pub docs_root: PathBuf,
    pub tool: ToolType,
    pub structure: StructureType,
    pub feature_pages: Vec<PathBuf>,
}

impl DocumentationSite {
    pub fn open(docs_root: &Path, tool: ToolType, structure: StructureType) -> Result<Self> {
        let config = tool.config_path(docs_root);
        if !config.is_file() {
            return Err(Error::documentation_project(
                format!(
                    "missing {} at {}",
                    tool.config_file_name(),
                    config.display()
                ),
                "run `specdoc init` to create the documentation project first",
            ));
        }
        Ok(DocumentationSite {
            docs_root: docs_root.to_path_buf(),
            tool,
            structure,
            feature_pages: Vec::new(),
        })
    }
}

/// Title-case a slug: `user-auth` → `User Auth`.
pub fn title_case(slug: &str) -> String {
    slug.split(['-', '_'])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lowercase anchor slug: `User Auth` → `user-auth`.
pub fn slugify(text: &str) -> String {
    let mut out = String::new();
    let mut prev_dash = false;
    for c in text.chars().flat_map(|c| c.to_lowercase()) {
        if c.is_ascii_alphanumeric() {
            out.push(c);
            prev_dash = false;
        } else if (c.is_whitespace() || c == '-' || c == '_') && !prev_dash {
            out.push('-');
            prev_dash = true;
        }
    }
    out.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feature(plan: bool, tasks: bool) -> Feature {
        let dir = PathBuf::from("/specs/001-user-auth");
        Feature {
            id: "001".into(),
            name: "user-auth".into(),
            spec_file: dir.join("spec.md"),
            plan_file: plan.then(|| dir.join("plan.md")),
            tasks_file: tasks.then(|| dir.join("tasks.md")),
            directory: dir,
            priority: None,
            metadata: BTreeMap::new(),
        }
    }

    #[test]
    fn status_is_derived_from_files() {
        assert_eq!(feature(false, false).status(), FeatureStatus::Draft);
        assert_eq!(feature(true, false).status(), FeatureStatus::Planned);
        assert_eq!(feature(true, true).status(), FeatureStatus::InProgress);
    }

    #[test]
    fn status_completed_from_metadata() {
        let mut f = feature(true, true);
        f.metadata.insert("status".into(), "Completed".into());
        assert_eq!(f.status(), FeatureStatus::Completed);
    }

    #[test]
    fn feature_key_joins_id_and_name() {
        assert_eq!(feature(false, false).key(), "001-user-auth");
    }

    #[test]
    fn title_prefers_metadata() {
        let mut doc = Document::from_content(
            Path::new("/specs/001-user-auth/spec.md"),
            DocumentType::Spec,
            "# Heading Title\n\nbody\n".into(),
        );
        assert_eq!(doc.title(), "Heading Title");
        doc.metadata.insert("title".into(), "Explicit".into());
        assert_eq!(doc.title(), "Explicit");
    }

    #[test]
    fn title_falls_back_to_file_stem() {
        let doc = Document::from_content(
            Path::new("/specs/002-rate-limiter/spec.md"),
            DocumentType::Spec,
            "no headings here\n".into(),
        );
        assert_eq!(doc.title(), "Spec");
    }

    #[test]
    fn to_markdown_myst_emits_anchor() {
        let doc = Document::from_content(
            Path::new("/x/spec.md"),
            DocumentType::Spec,
            "# User Auth\n\nbody\n".into(),
        );
        let myst = doc.to_markdown(Dialect::Myst);
        assert!(myst.starts_with("(user-auth)=\n\n# User Auth\n"));
        let plain = doc.to_markdown(Dialect::Plain);
        assert!(plain.starts_with("# User Auth\n"));
    }

    #[test]
    fn title_case_slug() {
        assert_eq!(title_case("user-auth"), "User Auth");
        assert_eq!(title_case("a_b-c"), "A B C");
    }

    #[test]
    fn slugify_round_trip() {
        assert_eq!(slugify("User Auth"), "user-auth");
        assert_eq!(slugify("API: v2!"), "api-v2");
    }

    #[test]
    fn load_records_modification_time() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("spec.md");
        std::fs::write(&path, "# Title\n\nbody\n").unwrap();
        let doc = Document::load(&path, DocumentType::Spec).unwrap();
        assert!(doc.last_modified.is_some());
        assert!(doc.git_status.is_none());
        assert_eq!(doc.sections.len(), 1);
    }

    #[test]
    fn site_open_requires_config() {
        let err = DocumentationSite::open(
            Path::new("/nonexistent/docs"),
            ToolType::Sphinx,
            StructureType::Flat,
        )
        .unwrap_err();
        assert!(err.to_string().contains("conf.py"));
    }
}
