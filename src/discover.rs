//! Feature discovery — enumerate spec-kit feature directories.
//!
//! A feature lives at `specs/NNN-name/` with a readable `spec.md`; plan.md
//! and tasks.md are optional. Discovery rebuilds the feature list on every
//! run and sorts by directory name for deterministic downstream output.

use crate::error::{Error, Result};
use crate::model::Feature;
use crate::parser;
use regex::Regex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::LazyLock;

static RE_FEATURE_DIR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d{3})-(.+)$").unwrap());

/// A spec-kit project has `.specify/` and `specs/` at its root.
pub fn validate_project(root: &Path) -> Result<()> {
    if !root.join(".specify").is_dir() {
        return Err(Error::project_validation(
            format!("{} is not a spec-kit project: .specify/ is missing", root.display()),
            "run `specify init` in the repository first",
        ));
    }
    if !root.join("specs").is_dir() {
        return Err(Error::project_validation(
            format!("{} has no specs/ directory", root.display()),
            "create at least one feature under specs/ (e.g. specs/001-my-feature/spec.md)",
        ));
    }
    Ok(())
}

/// Enumerate feature directories under `specs_dir`, sorted by directory
/// name. Directories that don't match `NNN-name` or lack a readable
/// spec.md are excluded, not errors.
pub fn discover_features(specs_dir: &Path) -> Result<Vec<Feature>> {
    let entries =
        std::fs::read_dir(specs_dir).map_err(|e| Error::io(specs_dir.to_path_buf(), e))?;

    let mut dirs: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();

    let mut features = Vec::new();
    for dir in dirs {
        let Some(dir_name) = dir.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(caps) = RE_FEATURE_DIR.captures(dir_name) else {
            continue;
        };
        let spec_file = dir.join("spec.md");
        let Ok(spec_content) = std::fs::read_to_string(&spec_file) else {
            continue;
        };
        let metadata = parser::extract_metadata(&spec_content);
        let priority = metadata.get("priority").cloned();

        let plan_file = existing(dir.join("plan.md"));
        let tasks_file = existing(dir.join("tasks.md"));
        features.push(Feature {
            id: caps[1].to_string(),
            name: caps[2].to_string(),
            directory: dir,
            spec_file,
            plan_file,
            tasks_file,
            priority,
            metadata,
        });
    }
    Ok(features)
}

/// Subset of features whose spec.md changed between `HEAD~1` and `HEAD`.
/// Falls back to all features when there is no prior commit to diff
/// against. Git being absent or the root not being a repository is a
/// validation error, not a fallback.
pub fn get_changed_features(repo_root: &Path, specs_dir: &Path) -> Result<Vec<Feature>> {
    if !repo_root.join(".git").exists() {
        return Err(Error::git_validation(
            format!("{} is not a git repository", repo_root.display()),
            "run `git init` and commit the specs before using incremental updates",
        ));
    }

    let all = discover_features(specs_dir)?;
    let output = Command::new("git")
        .arg("-C")
        .arg(repo_root)
        .args(["diff", "--name-only", "HEAD~1", "HEAD"])
        .output();

    let output = match output {
        Ok(out) => out,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::git_validation(
                "git executable not found",
                "install git or use a full (non-incremental) update",
            ));
        }
        Err(e) => return Err(Error::io(repo_root.join(".git"), e)),
    };

    if !output.status.success() {
        // Typically "unknown revision HEAD~1": first commit, nothing to
        // diff against. Treat everything as changed.
        return Ok(all);
    }

    let changed = parse_changed_specs(&String::from_utf8_lossy(&output.stdout));
    Ok(all
        .into_iter()
        .filter(|f| {
            f.spec_file
                .strip_prefix(repo_root)
                .map(|rel| changed.contains(&rel.to_string_lossy().replace('\\', "/")))
                .unwrap_or(false)
        })
        .collect())
}

/// Extract `specs/NNN-name/spec.md` paths from `git diff --name-only`
/// output.
fn parse_changed_specs(stdout: &str) -> HashSet<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with("specs/") && line.ends_with("/spec.md"))
        .map(str::to_string)
        .collect()
}

fn existing(path: PathBuf) -> Option<PathBuf> {
    path.is_file().then_some(path)
}
