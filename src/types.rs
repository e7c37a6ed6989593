use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use serde::Deserialize;

pub const DEFAULT_KEEP: usize = 3;
pub const DEFAULT_PROTECT_FILE: &str = ".helm-keep";
pub const ARCHIVE_SUFFIX: &str = ".tgz";

/// Chart name to the versions that must never be pruned.
pub type ProtectionSet = BTreeMap<String, BTreeSet<String>>;

/// One chart version as listed under `entries` in `index.yaml`.
///
/// Only the fields needed for pruning are read; digests, timestamps and the
/// rest of the chart metadata are left to `helm repo index`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IndexEntry {
    #[serde(default, deserialize_with = "scalar_string")]
    pub version: String,
    #[serde(default, deserialize_with = "nullable_list")]
    pub urls: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryIndex {
    pub entries: BTreeMap<String, Vec<IndexEntry>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetentionPlan {
    pub kept: BTreeMap<String, BTreeSet<String>>,
    pub to_delete: BTreeSet<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct PruneOptions {
    pub repo_dir: PathBuf,
    pub keep: usize,
    pub url: String,
    pub protect_file: Option<PathBuf>,
    pub dry_run: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneOutcome {
    pub deleted: Vec<PathBuf>,
    pub missing: Vec<PathBuf>,
}

// Hand-edited indexes sometimes carry unquoted versions such as `1.0`, which
// YAML reads as a float.
fn scalar_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    match serde_yaml::Value::deserialize(deserializer)? {
        serde_yaml::Value::Null => Ok(String::new()),
        other => scalar_to_string(&other).ok_or_else(|| {
            D::Error::custom(format!("expected a scalar version, found {:?}", other))
        }),
    }
}

/// Render a YAML string, number or bool as text; `None` for anything else.
pub(crate) fn scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn nullable_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}
