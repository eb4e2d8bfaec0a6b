use predicates::prelude::*;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn cmd() -> assert_cmd::Command {
    assert_cmd::Command::from(Command::new(env!("CARGO_BIN_EXE_specdoc")))
}

/// Create a spec-kit project skeleton with the given feature directories.
fn project(features: &[&str]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    std::fs::create_dir(tmp.path().join(".specify")).unwrap();
    std::fs::create_dir(tmp.path().join("specs")).unwrap();
    for dir_name in features {
        let dir = tmp.path().join("specs").join(dir_name);
        std::fs::create_dir_all(&dir).unwrap();
        let title = dir_name.split_once('-').unwrap().1.replace('-', " ");
        std::fs::write(
            dir.join("spec.md"),
            format!("# {title}\n\nOverview of {title}.\n\n## Details\n\nMore.\n"),
        )
        .unwrap();
    }
    tmp
}

fn init(root: &Path, tool: &str) {
    cmd()
        .args(["--root", root.to_str().unwrap()])
        .args(["init", "--tool", tool, "--project-name", "Demo"])
        .assert()
        .success();
}

fn update(root: &Path, tool: &str) -> assert_cmd::assert::Assert {
    cmd()
        .args(["--root", root.to_str().unwrap()])
        .args(["update", "--tool", tool])
        .assert()
}

// -- init --

#[test]
fn init_sphinx_writes_conf_and_index() {
    let tmp = project(&[]);
    init(tmp.path(), "sphinx");
    let conf = std::fs::read_to_string(tmp.path().join("docs/conf.py")).unwrap();
    assert!(conf.contains("project = \"Demo\""));
    assert!(conf.contains("myst_parser"));
    assert!(tmp.path().join("docs/index.md").exists());
}

#[test]
fn init_mkdocs_writes_config_at_project_root() {
    let tmp = project(&[]);
    init(tmp.path(), "mkdocs");
    let config = std::fs::read_to_string(tmp.path().join("mkdocs.yml")).unwrap();
    assert!(config.contains("site_name: Demo"));
    assert!(tmp.path().join("docs/index.md").exists());
    assert!(!tmp.path().join("docs/mkdocs.yml").exists());
}

#[test]
fn init_refuses_overwrite_without_force() {
    let tmp = project(&[]);
    init(tmp.path(), "sphinx");
    cmd()
        .args(["--root", tmp.path().to_str().unwrap()])
        .args(["init", "--tool", "sphinx"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
    cmd()
        .args(["--root", tmp.path().to_str().unwrap()])
        .args(["init", "--tool", "sphinx", "--force"])
        .assert()
        .success();
}

// -- update, sphinx --

#[test]
fn update_sphinx_generates_pages_and_toctree() {
    let tmp = project(&["001-user-auth", "002-rate-limiter"]);
    init(tmp.path(), "sphinx");
    update(tmp.path(), "sphinx").success();

    // Flat structure: pages at the docs root, slug-named, no ID prefix.
    assert!(tmp.path().join("docs/user-auth.md").exists());
    assert!(tmp.path().join("docs/rate-limiter.md").exists());
    assert!(!tmp.path().join("docs/001-user-auth.md").exists());

    let index = std::fs::read_to_string(tmp.path().join("docs/index.md")).unwrap();
    assert!(index.contains("<!-- FEATURES_TOCTREE_START -->"));
    assert!(index.contains("rate-limiter\nuser-auth"));
}

#[test]
fn update_twice_is_byte_identical() {
    let tmp = project(&["001-user-auth", "002-rate-limiter"]);
    init(tmp.path(), "sphinx");
    update(tmp.path(), "sphinx").success();
    let first = std::fs::read_to_string(tmp.path().join("docs/index.md")).unwrap();
    update(tmp.path(), "sphinx").success();
    let second = std::fs::read_to_string(tmp.path().join("docs/index.md")).unwrap();
    assert_eq!(first, second);
    assert_eq!(second.matches("FEATURES_TOCTREE_START").count(), 1);
}

#[test]
fn update_preserves_manual_index_content() {
    let tmp = project(&["001-user-auth"]);
    init(tmp.path(), "sphinx");
    let index = tmp.path().join("docs/index.md");
    let manual = std::fs::read_to_string(&index).unwrap() + "\nHand-written notes.\n";
    std::fs::write(&index, &manual).unwrap();

    update(tmp.path(), "sphinx").success();
    let updated = std::fs::read_to_string(&index).unwrap();
    assert!(updated.contains("Hand-written notes."));
    assert!(updated.contains("user-auth"));
}

// -- update, mkdocs --

#[test]
fn update_mkdocs_merges_nav() {
    let tmp = project(&["001-user-auth", "002-rate-limiter"]);
    init(tmp.path(), "mkdocs");
    update(tmp.path(), "mkdocs").success();

    let config = std::fs::read_to_string(tmp.path().join("mkdocs.yml")).unwrap();
    assert!(config.contains("Features:"));
    assert!(config.contains("Rate Limiter: rate-limiter.md"));
    assert!(config.contains("User Auth: user-auth.md"));
    // Home entry survives the merge.
    assert!(config.contains("Home: index.md"));
}

#[test]
fn update_mkdocs_without_config_fails() {
    let tmp = project(&["001-user-auth"]);
    std::fs::create_dir(tmp.path().join("docs")).unwrap();
    update(tmp.path(), "mkdocs")
        .failure()
        .stderr(predicate::str::contains("mkdocs.yml").or(predicate::str::contains("MkDocs")));
}

// -- structure migration --

#[test]
fn sixth_feature_triggers_migration() {
    let dirs: Vec<String> = (1..=6).map(|i| format!("{i:03}-feature-{i}")).collect();
    let refs: Vec<&str> = dirs.iter().map(String::as_str).collect();
    let tmp = project(&refs);
    init(tmp.path(), "sphinx");
    update(tmp.path(), "sphinx")
        .success()
        .stdout(predicate::str::contains("structure: comprehensive"));

    for i in 1..=6 {
        assert!(tmp
            .path()
            .join(format!("docs/features/feature-{i}.md"))
            .exists());
    }
    assert!(!tmp.path().join("docs/feature-1.md").exists());
    assert!(tmp.path().join("docs/index.md").exists());
}

#[test]
fn flat_pages_move_during_migration() {
    let tmp = project(&[
        "001-a", "002-b", "003-c", "004-d", "005-e",
    ]);
    init(tmp.path(), "sphinx");
    update(tmp.path(), "sphinx")
        .success()
        .stdout(predicate::str::contains("structure: flat"));
    assert!(tmp.path().join("docs/a.md").exists());

    // A sixth feature appears; the existing flat pages migrate.
    let dir = tmp.path().join("specs/006-f");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("spec.md"), "# f\n\nbody\n").unwrap();

    update(tmp.path(), "sphinx")
        .success()
        .stdout(predicate::str::contains("migrated 5 page(s)"));
    assert!(tmp.path().join("docs/features/a.md").exists());
    assert!(!tmp.path().join("docs/a.md").exists());
}

#[test]
fn reverse_migration_is_refused() {
    let tmp = project(&["001-only"]);
    init(tmp.path(), "sphinx");
    std::fs::create_dir_all(tmp.path().join("docs/features")).unwrap();
    std::fs::write(tmp.path().join("docs/features/old.md"), "# Old\n").unwrap();

    update(tmp.path(), "sphinx")
        .failure()
        .stderr(predicate::str::contains("forbidden"))
        .stderr(predicate::str::contains("suggestion:"));
}

// -- transform map --

#[test]
fn transformed_content_replaces_spec_body() {
    let tmp = project(&["001-user-auth"]);
    init(tmp.path(), "sphinx");
    let map = tmp.path().join("transforms.json");
    std::fs::write(
        &map,
        r#"{"001-user-auth": {"spec_content": "Friendly end-user prose."}}"#,
    )
    .unwrap();

    cmd()
        .args(["--root", tmp.path().to_str().unwrap()])
        .args(["update", "--tool", "sphinx"])
        .args(["--transformed-content", map.to_str().unwrap()])
        .assert()
        .success();

    let page = std::fs::read_to_string(tmp.path().join("docs/user-auth.md")).unwrap();
    assert!(page.contains("Friendly end-user prose."));
    assert!(!page.contains("Overview of user auth."));
}

#[test]
fn malformed_transform_map_fails_with_suggestion() {
    let tmp = project(&["001-user-auth"]);
    init(tmp.path(), "sphinx");
    let map = tmp.path().join("transforms.json");
    std::fs::write(&map, "not json").unwrap();

    cmd()
        .args(["--root", tmp.path().to_str().unwrap()])
        .args(["update", "--tool", "sphinx"])
        .args(["--transformed-content", map.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("spec_content"));
}

// -- validation --

#[test]
fn update_outside_a_spec_kit_project_fails() {
    let tmp = TempDir::new().unwrap();
    update(tmp.path(), "sphinx")
        .failure()
        .stderr(predicate::str::contains(".specify"))
        .stderr(predicate::str::contains("suggestion:"));
}

#[test]
fn incremental_update_requires_git() {
    let tmp = project(&["001-user-auth"]);
    init(tmp.path(), "sphinx");
    cmd()
        .args(["--root", tmp.path().to_str().unwrap()])
        .args(["update", "--tool", "sphinx", "--incremental"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("git"));
}

// -- scaffold --

#[test]
fn scaffold_creates_id_prefixed_directories() {
    let mut dirs: Vec<String> = (1..=5).map(|i| format!("{i:03}-feature-{i}")).collect();
    dirs.push("042-user-authentication".into());
    let refs: Vec<&str> = dirs.iter().map(String::as_str).collect();
    let tmp = project(&refs);
    init(tmp.path(), "sphinx");
    std::fs::write(
        tmp.path().join("specs/042-user-authentication/plan.md"),
        "# Plan\n\nsteps\n",
    )
    .unwrap();

    cmd()
        .args(["--root", tmp.path().to_str().unwrap()])
        .args(["scaffold", "--tool", "sphinx"])
        .assert()
        .success();

    assert!(tmp
        .path()
        .join("docs/features/042-user-authentication/index.md")
        .exists());
    assert!(tmp
        .path()
        .join("docs/features/042-user-authentication/plan.md")
        .exists());
}

#[test]
fn scaffold_on_a_flat_project_is_refused() {
    let tmp = project(&["001-user-auth"]);
    init(tmp.path(), "sphinx");

    cmd()
        .args(["--root", tmp.path().to_str().unwrap()])
        .args(["scaffold", "--tool", "sphinx"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("flat layout"))
        .stderr(predicate::str::contains("suggestion:"));

    // The refusal leaves no features/ directory behind, so the site still
    // detects as flat and updates keep working.
    assert!(!tmp.path().join("docs/features").exists());
    update(tmp.path(), "sphinx")
        .success()
        .stdout(predicate::str::contains("structure: flat"));
    assert!(tmp.path().join("docs/user-auth.md").exists());
}

#[test]
fn update_still_works_after_scaffold() {
    let dirs: Vec<String> = (1..=6).map(|i| format!("{i:03}-feature-{i}")).collect();
    let refs: Vec<&str> = dirs.iter().map(String::as_str).collect();
    let tmp = project(&refs);
    init(tmp.path(), "sphinx");

    cmd()
        .args(["--root", tmp.path().to_str().unwrap()])
        .args(["scaffold", "--tool", "sphinx"])
        .assert()
        .success();

    update(tmp.path(), "sphinx")
        .success()
        .stdout(predicate::str::contains("structure: comprehensive"));
    assert!(tmp.path().join("docs/features/feature-1.md").exists());
    assert!(tmp
        .path()
        .join("docs/features/001-feature-1/index.md")
        .exists());
}
