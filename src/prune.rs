use std::io::Write;

use crate::charts::remove_planned_charts;
use crate::error::Result;
use crate::index::load_index;
use crate::parsing::load_protected;
use crate::plan::plan_retention;
use crate::reindex::IndexRebuilder;
use crate::types::{PruneOptions, PruneOutcome, RetentionPlan};

/// Prune a chart repository directory.
///
/// Loads the protection manifest and `index.yaml`, prints the deletion plan to
/// `out`, and unless `dry_run` is set removes the planned archives and asks
/// `rebuilder` to regenerate the index. The rebuild always runs in live mode,
/// even if nothing was removed, so digests match what is on disk.
pub fn prune_repository<R, W>(
    options: &PruneOptions,
    rebuilder: &R,
    out: &mut W,
) -> Result<PruneOutcome>
where
    R: IndexRebuilder + ?Sized,
    W: Write,
{
    let protected = load_protected(options.protect_file.as_deref())?;
    let index = load_index(&options.repo_dir)?;
    let plan = plan_retention(&options.repo_dir, &index, &protected, options.keep);

    report_plan(&plan, out)?;

    if options.dry_run {
        writeln!(out, "Dry-run: not deleting or reindexing.")?;
        return Ok(PruneOutcome::default());
    }

    rebuilder.check_available()?;
    let outcome = remove_planned_charts(&plan.to_delete)?;

    writeln!(
        out,
        "Running: {}",
        rebuilder.describe(&options.repo_dir, &options.url)
    )?;
    out.flush()?;
    rebuilder.rebuild(&options.repo_dir, &options.url)?;

    if outcome.deleted.is_empty() {
        writeln!(out, "No files were deleted, but index.yaml was regenerated.")?;
    } else {
        writeln!(out, "Prune complete.")?;
    }

    tracing::info!(
        "Removed {} archive(s), {} already missing",
        outcome.deleted.len(),
        outcome.missing.len()
    );
    Ok(outcome)
}

/// Print the deletion plan, one archive name per line.
pub fn report_plan<W: Write>(plan: &RetentionPlan, out: &mut W) -> Result<()> {
    if plan.to_delete.is_empty() {
        writeln!(out, "Nothing to delete.")?;
        return Ok(());
    }

    writeln!(out, "Will delete:")?;
    for path in &plan.to_delete {
        if let Some(name) = path.file_name() {
            writeln!(out, "  - {}", name.to_string_lossy())?;
        }
    }
    Ok(())
}
