use std::path::{Path, PathBuf};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PruneError>;

#[derive(Debug, Error)]
pub enum PruneError {
    #[error("invalid protect line {line_number} (expected: <chart> <version>): {line}")]
    ProtectFormat { line_number: usize, line: String },

    #[error("index.yaml not found at {}", .path.display())]
    MissingIndex { path: PathBuf },

    #[error("index.yaml has unexpected structure at {}: {details}", .path.display())]
    MalformedIndex { path: PathBuf, details: String },

    #[error("missing dependency: `{program}` could not be executed; is it installed and on PATH?")]
    MissingDependency { program: String },

    #[error("`{command}` failed with {}", exit_description(.code))]
    Reindex { command: String, code: Option<i32> },

    #[error("IO failure at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write report: {0}")]
    Report(#[from] std::io::Error),
}

fn exit_description(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

impl PruneError {
    /// Process exit code for this failure.
    ///
    /// Index and dependency problems exit with 2. A failed reindex passes the
    /// child's exit code through.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::MissingIndex { .. }
            | Self::MalformedIndex { .. }
            | Self::MissingDependency { .. } => 2,
            Self::Reindex { code, .. } => code.filter(|c| *c != 0).unwrap_or(1),
            Self::ProtectFormat { .. } | Self::Io { .. } | Self::Report(_) => 1,
        }
    }

    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}
