//! Error taxonomy for the documentation pipeline.
//!
//! Every variant carries a human-readable message plus an actionable
//! suggestion; the CLI prints both on failure. The pairing is mandatory
//! for all errors raised in this crate.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The target repository is not a spec-kit project.
    #[error("{message}")]
    ProjectValidation { message: String, suggestion: String },

    /// Git is unavailable or the target is not a repository.
    #[error("{message}")]
    GitValidation { message: String, suggestion: String },

    /// Missing/invalid tool config, or a forbidden structure transition.
    #[error("{message}")]
    DocumentationProject { message: String, suggestion: String },

    /// Reserved for callers that need to treat parse degradation as fatal.
    /// The section parser itself never raises this.
    #[error("{message}")]
    #[allow(dead_code)]
    MarkdownParse { message: String, suggestion: String },

    /// Subprocess failure: missing binary, timeout, or non-zero exit.
    #[error("{message}")]
    Build { message: String, suggestion: String },

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn project_validation(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Error::ProjectValidation {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    pub fn git_validation(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Error::GitValidation {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    pub fn documentation_project(
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Error::DocumentationProject {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    pub fn build(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Error::Build {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// The actionable suggestion paired with this error.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Error::ProjectValidation { suggestion, .. }
            | Error::GitValidation { suggestion, .. }
            | Error::DocumentationProject { suggestion, .. }
            | Error::MarkdownParse { suggestion, .. }
            | Error::Build { suggestion, .. } => Some(suggestion),
            Error::Io { .. } => Some("check that the path exists and is readable"),
        }
    }
}
