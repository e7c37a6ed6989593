use std::fs;
use std::path::Path;

use semver::Version;

use crate::error::{PruneError, Result};
use crate::types::{ARCHIVE_SUFFIX, ProtectionSet};

/// Parse a protection manifest.
///
/// Each non-blank line that does not start with `#` must hold exactly two
/// whitespace separated tokens, `<chart> <version>`:
///
/// ```text
/// # keep the release pinned by prod
/// nginx 1.2.3
/// redis 17.0.0
/// ```
pub fn parse_protected(contents: &str) -> Result<ProtectionSet> {
    let mut protected = ProtectionSet::new();

    for (idx, raw) in contents.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut parts = line.split_whitespace();
        match (parts.next(), parts.next(), parts.next()) {
            (Some(chart), Some(version), None) => {
                protected
                    .entry(chart.to_string())
                    .or_default()
                    .insert(version.to_string());
            }
            _ => {
                return Err(PruneError::ProtectFormat {
                    line_number: idx + 1,
                    line: line.to_string(),
                });
            }
        }
    }

    Ok(protected)
}

/// Load the protection manifest at `path`.
///
/// No path, or a path that does not exist, yields an empty set.
pub fn load_protected(path: Option<&Path>) -> Result<ProtectionSet> {
    let Some(path) = path else {
        return Ok(ProtectionSet::new());
    };
    if !path.exists() {
        tracing::debug!("No protect file at {}", path.display());
        return Ok(ProtectionSet::new());
    }

    let contents = fs::read_to_string(path).map_err(|e| PruneError::io(path, e))?;
    let protected = parse_protected(&contents)?;
    tracing::info!(
        "Loaded {} protected version(s) from {}",
        protected.values().map(|v| v.len()).sum::<usize>(),
        path.display()
    );
    Ok(protected)
}

/// Parse a chart version, tolerating the loose forms Helm itself accepts.
///
/// Surrounding whitespace is ignored for ordering only; protection and keep
/// matching still use the version string exactly as listed. A single leading
/// `v` is stripped and one- or two-component versions are padded with zeros
/// (`1.2` becomes `1.2.0`). Anything semver still rejects returns `None`.
pub fn parse_version(version: &str) -> Option<Version> {
    let trimmed = version.trim();
    let trimmed = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed);

    if let Ok(parsed) = Version::parse(trimmed) {
        return Some(parsed);
    }

    // Pad the numeric core only; the pre-release/build suffix stays attached.
    let split = trimmed.find(['-', '+']).unwrap_or(trimmed.len());
    let (core, suffix) = trimmed.split_at(split);
    let components = core.split('.').count();
    if core.is_empty()
        || components >= 3
        || core
            .split('.')
            .any(|c| c.is_empty() || !c.bytes().all(|b| b.is_ascii_digit()))
    {
        return None;
    }

    let padded = format!("{}{}{}", core, ".0".repeat(3 - components), suffix);
    Version::parse(&padded).ok()
}

/// Return the archive file name referenced by an index URL.
///
/// Only the last non-empty `/` segment is considered, and only names ending
/// in `.tgz` are returned.
pub fn archive_file_name(url: &str) -> Option<&str> {
    let name = url.rsplit('/').find(|segment| !segment.is_empty())?;
    if name.ends_with(ARCHIVE_SUFFIX) {
        Some(name)
    } else {
        None
    }
}
