use std::collections::BTreeSet;
use std::path::Path;

use crate::parsing::{archive_file_name, parse_version};
use crate::types::{IndexEntry, ProtectionSet, RepositoryIndex, RetentionPlan};

/// Decide which chart versions to keep and which archives to delete.
///
/// Per chart, entries are ordered newest first; versions that do not parse
/// sort after every valid one and keep their index order among themselves.
/// The first `keep` versions are retained together with every protected
/// version of that chart. All `.tgz` files of the remaining entries are
/// scheduled for deletion under `repo_dir`, except files that a kept entry
/// of any chart also points at.
pub fn plan_retention(
    repo_dir: &Path,
    index: &RepositoryIndex,
    protected: &ProtectionSet,
    keep: usize,
) -> RetentionPlan {
    let mut plan = RetentionPlan::default();
    let mut referenced = BTreeSet::new();

    for (chart, versions) in &index.entries {
        let sorted = sort_newest_first(versions);

        let mut kept: BTreeSet<String> = sorted
            .iter()
            .take(keep)
            .map(|entry| entry.version.clone())
            .collect();
        if let Some(pinned) = protected.get(chart) {
            kept.extend(pinned.iter().cloned());
        }

        for entry in &sorted {
            let is_kept = kept.contains(&entry.version);
            for url in &entry.urls {
                match archive_file_name(url) {
                    Some(name) if is_kept => {
                        referenced.insert(repo_dir.join(name));
                    }
                    Some(name) => {
                        plan.to_delete.insert(repo_dir.join(name));
                    }
                    None => tracing::debug!("Ignoring non-archive url for {}: {}", chart, url),
                }
            }
        }

        tracing::debug!(
            "Chart {}: keeping {} of {} version(s)",
            chart,
            kept.len(),
            versions.len()
        );
        plan.kept.insert(chart.clone(), kept);
    }

    plan.to_delete.retain(|path| {
        let shared = referenced.contains(path);
        if shared {
            tracing::debug!("Keeping {}: still listed by a kept entry", path.display());
        }
        !shared
    });
    plan
}

fn sort_newest_first(versions: &[IndexEntry]) -> Vec<&IndexEntry> {
    let mut keyed: Vec<_> = versions
        .iter()
        .map(|entry| (parse_version(&entry.version), entry))
        .collect();
    // `Option` orders `None` below any `Some`, and `sort_by` is stable.
    keyed.sort_by(|(a, _), (b, _)| b.cmp(a));
    keyed.into_iter().map(|(_, entry)| entry).collect()
}
