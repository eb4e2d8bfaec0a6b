//! specdoc — generate and maintain Sphinx/MkDocs documentation sites from
//! spec-kit feature specifications.
//!
//! Pipeline per invocation: validate project → discover features → resolve
//! site structure (one-way flat → comprehensive) → generate feature pages →
//! re-synchronize navigation → optionally build. Single-threaded and
//! run-to-completion; re-running converges except for the structure
//! migration, which only happens once.

mod build;
mod discover;
mod error;
mod model;
mod pages;
mod parser;
mod structure;
mod tool;

use clap::{Parser, Subcommand};
use error::{Error, Result};
use model::{Dialect, DocumentationSite, ProjectMeta, StructureType, ToolType};
use pages::{PageContext, TransformMap};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "specdoc",
    version,
    about = "Generate Sphinx or MkDocs documentation from spec-kit feature specs"
)]
struct Cli {
    /// Project root containing .specify/, specs/ and docs/
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new documentation project
    Init {
        #[arg(long, value_enum)]
        tool: ToolType,
        #[arg(long, default_value = "Documentation")]
        project_name: String,
        #[arg(long, default_value = "unknown")]
        author: String,
        #[arg(long, default_value = "0.1.0")]
        version: String,
        #[arg(long, default_value = "en")]
        language: String,
        /// Overwrite an existing configuration
        #[arg(long)]
        force: bool,
    },
    /// Regenerate feature pages and navigation from specs
    Update {
        #[arg(long, value_enum)]
        tool: ToolType,
        /// Only regenerate features whose spec.md changed in the last commit
        #[arg(long)]
        incremental: bool,
        /// Path to the LLM transform map JSON ({"NNN-name": {"spec_content": ...}});
        /// pages render from the raw spec bodies when omitted
        #[arg(long)]
        transformed_content: Option<PathBuf>,
        /// Run the documentation build after updating
        #[arg(long)]
        build: bool,
    },
    /// Generate per-feature scaffold directories (features/{id}-{name}/)
    Scaffold {
        #[arg(long, value_enum)]
        tool: ToolType,
    },
    /// Build the documentation site
    Build {
        #[arg(long, value_enum)]
        tool: ToolType,
    },
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("✗ {err}");
        if let Some(suggestion) = err.suggestion() {
            eprintln!("  suggestion: {suggestion}");
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let docs_root = cli.root.join("docs");
    match cli.command {
        Commands::Init {
            tool,
            project_name,
            author,
            version,
            language,
            force,
        } => {
            let meta = ProjectMeta {
                name: project_name,
                author,
                version,
                language,
            };
            cmd_init(&docs_root, tool, &meta, force)
        }
        Commands::Update {
            tool,
            incremental,
            transformed_content,
            build,
        } => cmd_update(
            &cli.root,
            &docs_root,
            tool,
            incremental,
            transformed_content.as_deref(),
            build,
        ),
        Commands::Scaffold { tool } => cmd_scaffold(&cli.root, &docs_root, tool),
        Commands::Build { tool } => {
            let t = tool::create_tool(tool);
            t.validate_project(&docs_root)?;
            let report = t.build_docs(&docs_root)?;
            step(&format!(
                "build finished: {} warning(s), {} error(s)",
                report.warnings, report.errors
            ));
            Ok(())
        }
    }
}

fn cmd_init(docs_root: &Path, kind: ToolType, meta: &ProjectMeta, force: bool) -> Result<()> {
    let t = tool::create_tool(kind);
    let config = t.generate_config(docs_root, meta, force)?;
    step(&format!("wrote {}", config.display()));
    let index = t.generate_index(docs_root, meta)?;
    step(&format!("wrote {}", index.display()));
    Ok(())
}

fn cmd_update(
    root: &Path,
    docs_root: &Path,
    kind: ToolType,
    incremental: bool,
    transformed_content: Option<&Path>,
    run_build: bool,
) -> Result<()> {
    discover::validate_project(root)?;
    step("spec-kit project validated");

    let t = tool::create_tool(kind);
    t.validate_project(docs_root)?;
    step("documentation project validated");

    let specs_dir = root.join("specs");
    let all_features = discover::discover_features(&specs_dir)?;
    let targets = if incremental {
        discover::get_changed_features(root, &specs_dir)?
    } else {
        all_features.clone()
    };
    step(&format!(
        "discovered {} feature(s), updating {}",
        all_features.len(),
        targets.len()
    ));

    // Structure is keyed on the total feature count, never the incremental
    // subset.
    let resolution = structure::ensure_structure(docs_root, all_features.len())?;
    if resolution.migrated_pages > 0 {
        step(&format!(
            "migrated {} page(s) into features/",
            resolution.migrated_pages
        ));
    }

    let mut site = DocumentationSite::open(docs_root, kind, resolution.structure)?;
    step(&format!("site: {} (structure: {})", site.tool, site.structure));

    let transforms = match transformed_content {
        Some(path) => TransformMap::load(path)?,
        None => TransformMap::default(),
    };
    let ctx = PageContext {
        docs_root,
        structure: resolution.structure,
        dialect: dialect_for(kind),
        transforms: &transforms,
        prefix_template: pages::load_prefix_template(docs_root)?,
    };
    let generated = pages::generate_pages(&targets, &ctx)?;
    step(&format!("generated {} page(s)", generated.len()));

    // Navigation reflects every feature's page, not just the ones
    // regenerated this run.
    site.feature_pages = all_features
        .iter()
        .filter(|f| f.has_spec_file())
        .map(|f| {
            site.docs_root
                .join(structure::feature_page_path(site.structure, &f.name))
        })
        .collect();
    t.update_navigation(docs_root, &site.feature_pages)?;
    step(&format!(
        "navigation updated ({} entries)",
        site.feature_pages.len()
    ));

    if run_build {
        let report = t.build_docs(docs_root)?;
        step(&format!(
            "build finished: {} warning(s), {} error(s)",
            report.warnings, report.errors
        ));
    }
    Ok(())
}

fn cmd_scaffold(root: &Path, docs_root: &Path, kind: ToolType) -> Result<()> {
    discover::validate_project(root)?;
    let t = tool::create_tool(kind);
    t.validate_project(docs_root)?;

    let features = discover::discover_features(&root.join("specs"))?;
    // Scaffold directories live under features/. Creating them on a flat
    // site would flip structure detection to comprehensive and trip the
    // ratchet on the next update, so flat sites are refused up front.
    let resolution = structure::ensure_structure(docs_root, features.len())?;
    if resolution.structure == StructureType::Flat {
        return Err(Error::documentation_project(
            format!(
                "documentation at {} uses the flat layout; scaffolding writes into \
                 features/ and would force the comprehensive layout",
                docs_root.display()
            ),
            "the flat layout covers projects with 5 features or fewer; scaffold once \
             the project grows past 5 features",
        ));
    }

    let written = pages::scaffold_pages(&features, docs_root, dialect_for(kind))?;
    step(&format!("scaffolded {} file(s)", written.len()));
    Ok(())
}

fn dialect_for(kind: ToolType) -> Dialect {
    match kind {
        ToolType::Sphinx => Dialect::Myst,
        ToolType::Mkdocs => Dialect::Plain,
    }
}

fn step(message: &str) {
    println!("✓ {message}");
}
