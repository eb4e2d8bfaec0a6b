//! Documentation structure policy.
//!
//! Maps feature count to a site layout (FLAT or COMPREHENSIVE), computes
//! where a feature's page lives under each layout, and performs the one-way
//! FLAT → COMPREHENSIVE migration. Structure type is always passed
//! explicitly — nothing here keeps ambient state about what the site
//! "currently is"; the filesystem is the only source of truth.

use crate::error::{Error, Result};
use crate::model::StructureType;
use std::path::{Path, PathBuf};

/// Largest feature count served by the flat layout.
pub const FLAT_MAX_FEATURES: usize = 5;

/// Files never moved by the flat → comprehensive migration.
const MIGRATION_EXCLUSIONS: &[&str] = &["index.md", "conf.py", "mkdocs.yml", ".gitignore", "_prefix.md"];

/// Pure policy: ≤5 features → FLAT, otherwise COMPREHENSIVE.
pub fn determine_structure(feature_count: usize) -> StructureType {
    if feature_count <= FLAT_MAX_FEATURES {
        StructureType::Flat
    } else {
        StructureType::Comprehensive
    }
}

/// Inspect the docs tree: COMPREHENSIVE iff `features/` exists and is
/// non-empty. There is no manifest file; the directory is the signal.
pub fn detect_current_structure(docs_root: &Path) -> StructureType {
    let features_dir = docs_root.join("features");
    let non_empty = std::fs::read_dir(&features_dir)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false);
    if non_empty {
        StructureType::Comprehensive
    } else {
        StructureType::Flat
    }
}

/// Relative path of a feature's generated page under the given layout.
/// No feature ID appears here — pages are named by slug alone.
pub fn feature_page_path(structure: StructureType, feature_name: &str) -> PathBuf {
    match structure {
        StructureType::Flat => PathBuf::from(format!("{feature_name}.md")),
        StructureType::Comprehensive => PathBuf::from(format!("features/{feature_name}.md")),
    }
}

/// Relative path of a feature's scaffold landing page.
///
/// This is a distinct path scheme from [`feature_page_path`]: scaffolding
/// gives each feature a `{id}-{name}/` directory with an index and
/// subpages. The two schemes coexist for different consumers and are
/// deliberately not unified.
pub fn scaffold_index_path(feature_id: &str, feature_name: &str) -> PathBuf {
    PathBuf::from(format!("features/{feature_id}-{feature_name}/index.md"))
}

/// Relative path of a named subpage inside a feature's scaffold directory.
pub fn scaffold_subpage_path(feature_id: &str, feature_name: &str, subpage: &str) -> PathBuf {
    PathBuf::from(format!("features/{feature_id}-{feature_name}/{subpage}.md"))
}

/// Outcome of [`ensure_structure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructureResolution {
    pub structure: StructureType,
    /// Pages moved into `features/` by a migration this run (0 otherwise).
    pub migrated_pages: usize,
}

/// Reconcile the on-disk layout with the ideal layout for `feature_count`.
///
/// FLAT observed + COMPREHENSIVE ideal triggers the one-time migration.
/// COMPREHENSIVE observed + FLAT ideal is a hard error: the structure type
/// only ever grows.
pub fn ensure_structure(docs_root: &Path, feature_count: usize) -> Result<StructureResolution> {
    let current = detect_current_structure(docs_root);
    let ideal = determine_structure(feature_count);

    match (current, ideal) {
        (StructureType::Flat, StructureType::Comprehensive) => {
            let migrated_pages = migrate_to_comprehensive(docs_root)?;
            Ok(StructureResolution {
                structure: StructureType::Comprehensive,
                migrated_pages,
            })
        }
        (StructureType::Comprehensive, StructureType::Flat) => Err(Error::documentation_project(
            format!(
                "documentation at {} already uses the comprehensive layout, but {} feature(s) \
                 imply flat; converting back is forbidden",
                docs_root.display(),
                feature_count
            ),
            "the flat layout is only for projects that never grew past 5 features; \
             keep the features/ directory",
        )),
        (structure, _) => Ok(StructureResolution {
            structure,
            migrated_pages: 0,
        }),
    }
}

/// Move every `*.md` page in the docs root (minus the exclusion set) into
/// `features/`, preserving filenames. Returns the number of pages moved.
fn migrate_to_comprehensive(docs_root: &Path) -> Result<usize> {
    let features_dir = docs_root.join("features");
    std::fs::create_dir_all(&features_dir).map_err(|e| Error::io(features_dir.clone(), e))?;

    let pattern = docs_root.join("*.md");
    let entries = glob::glob(&pattern.to_string_lossy()).map_err(|e| {
        Error::documentation_project(
            format!("cannot scan {} for pages: {e}", docs_root.display()),
            "check the docs path for glob metacharacters like [ or ]",
        )
    })?;
    let mut moved = 0;
    for entry in entries.filter_map(|r| r.ok()) {
        let name = match entry.file_name().and_then(|n| n.to_str()) {
            Some(name) => name.to_string(),
            None => continue,
        };
        if MIGRATION_EXCLUSIONS.contains(&name.as_str()) {
            continue;
        }
        let target = features_dir.join(&name);
        std::fs::rename(&entry, &target).map_err(|e| Error::io(entry.clone(), e))?;
        moved += 1;
    }
    Ok(moved)
}
