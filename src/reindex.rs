use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{PruneError, Result};

/// Rebuilds `index.yaml` from the archives currently in a repository directory.
pub trait IndexRebuilder {
    /// Human readable form of the command, printed before it runs.
    fn describe(&self, repo_dir: &Path, url: &str) -> String;

    /// Fail with `MissingDependency` if the rebuild could not even start.
    /// Called before any archive is removed.
    fn check_available(&self) -> Result<()>;

    fn rebuild(&self, repo_dir: &Path, url: &str) -> Result<()>;
}

/// Runs `helm repo index <dir> --url <url>`.
///
/// Helm's stdout and stderr are inherited so its own diagnostics reach the
/// user unchanged.
#[derive(Debug, Clone)]
pub struct HelmIndexRebuilder {
    pub helm: PathBuf,
}

impl Default for HelmIndexRebuilder {
    fn default() -> Self {
        Self {
            helm: PathBuf::from("helm"),
        }
    }
}

impl HelmIndexRebuilder {
    pub fn new(helm: impl Into<PathBuf>) -> Self {
        Self { helm: helm.into() }
    }

    fn command(&self, repo_dir: &Path, url: &str) -> Command {
        let mut cmd = Command::new(&self.helm);
        cmd.arg("repo")
            .arg("index")
            .arg(repo_dir)
            .arg("--url")
            .arg(url);
        cmd
    }
}

impl IndexRebuilder for HelmIndexRebuilder {
    fn describe(&self, repo_dir: &Path, url: &str) -> String {
        format!(
            "{} repo index {} --url {}",
            self.helm.display(),
            repo_dir.display(),
            url
        )
    }

    fn check_available(&self) -> Result<()> {
        match find_program(&self.helm) {
            Some(found) => {
                tracing::debug!("Using helm at {}", found.display());
                Ok(())
            }
            None => Err(PruneError::MissingDependency {
                program: self.helm.display().to_string(),
            }),
        }
    }

    fn rebuild(&self, repo_dir: &Path, url: &str) -> Result<()> {
        let status = match self.command(repo_dir, url).status() {
            Ok(status) => status,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(PruneError::MissingDependency {
                    program: self.helm.display().to_string(),
                });
            }
            Err(e) => return Err(PruneError::io(&self.helm, e)),
        };

        if !status.success() {
            return Err(PruneError::Reindex {
                command: self.describe(repo_dir, url),
                code: status.code(),
            });
        }

        tracing::debug!("Regenerated index for {}", repo_dir.display());
        Ok(())
    }
}

/// Resolve `program` the way `Command` would: paths with a directory part are
/// checked directly, bare names are searched on `PATH`.
fn find_program(program: &Path) -> Option<PathBuf> {
    if program.components().count() > 1 {
        return is_executable(program).then(|| program.to_path_buf());
    }
    let paths = env::var_os("PATH")?;
    env::split_paths(&paths)
        .map(|dir| dir.join(program))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file() || path.with_extension("exe").is_file()
}
