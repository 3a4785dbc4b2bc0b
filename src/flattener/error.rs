use std::fmt::Display;
use std::path::PathBuf;

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Error type covering the different failure cases that can occur while the
/// tool validates, walks, or flattens a source tree.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Wrapper for IO failures that are not tied to a walked path.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when the plan cannot be serialised as JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Raised when the target directory does not exist.
    #[error("target directory {0} doesn't exist")]
    MissingTarget(PathBuf),

    /// Raised when the target lacks one of the `include` or `src` roots.
    #[error("target directory {target} must contain '{name}' directory")]
    MissingLayoutDir { target: PathBuf, name: &'static str },

    /// Raised when the output directory does not exist.
    #[error("output directory {0} doesn't exist")]
    MissingOutput(PathBuf),

    /// A directory could not be listed; its branch is skipped.
    #[error("cannot read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A source file could not be read as text.
    #[error("cannot read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A flattened file could not be written.
    #[error("cannot write {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Flat names are built from UTF-8 segments only.
    #[error("entry name is not valid UTF-8: {0}")]
    NonUtf8Name(PathBuf),

    /// A directory symlink points back at one of its own ancestors.
    #[error("symlink {path} loops back to {target}")]
    SymlinkCycle { path: PathBuf, target: PathBuf },

    /// Two or more sources map onto the same flat output name.
    #[error("{} flat name collision(s): {}", .0.len(), describe_collisions(.0))]
    Collisions(Vec<Collision>),

    /// Raised when `apply` is called without confirmation.
    #[error("flattening was not confirmed")]
    NotConfirmed,

    /// The run finished but some directories or files were skipped.
    #[error("run finished with {failures} failure(s)")]
    Incomplete { failures: usize },

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

impl ToolError {
    /// Process exit code reported by the command line front-end.
    pub fn exit_code(&self) -> i32 {
        match self {
            ToolError::MissingTarget(_)
            | ToolError::MissingLayoutDir { .. }
            | ToolError::MissingOutput(_) => 3,
            ToolError::Collisions(_) => 4,
            ToolError::Incomplete { .. } => 5,
            ToolError::NotConfirmed => 6,
            _ => 1,
        }
    }
}

/// A flat output name claimed by more than one source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Collision {
    pub flat_name: String,
    pub sources: Vec<PathBuf>,
}

/// A path that was skipped together with the reason.
#[derive(Debug, Serialize)]
pub struct Failure {
    pub path: PathBuf,
    #[serde(serialize_with = "serialize_display")]
    pub error: ToolError,
}

impl Failure {
    pub fn new(path: impl Into<PathBuf>, error: ToolError) -> Self {
        Self {
            path: path.into(),
            error,
        }
    }
}

fn describe_collisions(collisions: &[Collision]) -> String {
    collisions
        .iter()
        .map(|collision| {
            let sources: Vec<String> = collision
                .sources
                .iter()
                .map(|source| source.display().to_string())
                .collect();
            format!("{} <= [{}]", collision.flat_name, sources.join(", "))
        })
        .collect::<Vec<_>>()
        .join("; ")
}

fn serialize_display<T, S>(value: &T, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    T: Display,
    S: Serializer,
{
    serializer.collect_str(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collision_error_lists_every_source() {
        let error = ToolError::Collisions(vec![Collision {
            flat_name: "a_x.h".to_string(),
            sources: vec![PathBuf::from("include/a/x.h"), PathBuf::from("src/a/x.h")],
        }]);

        let message = error.to_string();
        assert!(message.contains("a_x.h <= [include/a/x.h, src/a/x.h]"));
        assert_eq!(error.exit_code(), 4);
    }

    #[test]
    fn validation_errors_share_an_exit_code() {
        let missing = ToolError::MissingLayoutDir {
            target: PathBuf::from("proj"),
            name: "src",
        };
        assert_eq!(missing.exit_code(), 3);
        assert_eq!(
            missing.to_string(),
            "target directory proj must contain 'src' directory"
        );
        assert_eq!(ToolError::MissingOutput(PathBuf::from("out")).exit_code(), 3);
        assert_eq!(ToolError::NotConfirmed.exit_code(), 6);
    }
}
