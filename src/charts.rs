use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::PathBuf;

use crate::error::{PruneError, Result};
use crate::types::PruneOutcome;

/// Remove every planned chart archive from the repository directory.
///
/// An archive that is already gone is reported on stderr and recorded in
/// `missing`; any other removal failure aborts the run.
pub fn remove_planned_charts(to_delete: &BTreeSet<PathBuf>) -> Result<PruneOutcome> {
    let mut outcome = PruneOutcome::default();

    for path in to_delete {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        match fs::remove_file(path) {
            Ok(()) => {
                tracing::info!("Removed chart archive: {}", file_name);
                outcome.deleted.push(path.clone());
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                eprintln!("Warning: file not found (already deleted?): {}", file_name);
                outcome.missing.push(path.clone());
            }
            Err(e) => return Err(PruneError::io(path, e)),
        }
    }

    Ok(outcome)
}
