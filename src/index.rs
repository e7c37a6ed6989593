use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::Value;

use crate::error::{PruneError, Result};
use crate::types::{IndexEntry, RepositoryIndex, scalar_to_string};

pub const INDEX_FILE: &str = "index.yaml";

/// Get the path of the repository's `index.yaml`.
pub fn get_index_path(repo_dir: &Path) -> PathBuf {
    repo_dir.join(INDEX_FILE)
}

/// Load and parse `index.yaml` from the repository directory.
pub fn load_index(repo_dir: &Path) -> Result<RepositoryIndex> {
    let path = get_index_path(repo_dir);
    if !path.exists() {
        return Err(PruneError::MissingIndex { path });
    }

    let contents = fs::read_to_string(&path).map_err(|e| PruneError::io(&path, e))?;
    let index = parse_index(&contents)
        .map_err(|details| PruneError::MalformedIndex { path: path.clone(), details })?;

    tracing::info!(
        "Loaded {} chart(s) from {}",
        index.entries.len(),
        path.display()
    );
    Ok(index)
}

/// Parse the text of an index document.
///
/// The document must be a map, and `entries`, when present, must be a map too.
/// Charts whose value is not a list are skipped; so are list items that do not
/// look like chart entries.
pub fn parse_index(contents: &str) -> std::result::Result<RepositoryIndex, String> {
    let document: Value = serde_yaml::from_str(contents).map_err(|e| e.to_string())?;
    let Value::Mapping(document) = document else {
        return Err("document is not a map".to_string());
    };

    let mut index = RepositoryIndex::default();
    let entries = match document.get("entries") {
        None => return Ok(index),
        Some(Value::Mapping(entries)) => entries,
        Some(_) => return Err("entries is not a map".to_string()),
    };

    for (name, versions) in entries {
        // Unquoted names such as `2048` or `true` arrive as numbers and bools.
        let name = match name {
            Value::Null => "null".to_string(),
            other => match scalar_to_string(other) {
                Some(name) => name,
                None => {
                    tracing::warn!("Skipping chart with non-scalar name: {:?}", other);
                    continue;
                }
            },
        };
        let Value::Sequence(versions) = versions else {
            tracing::debug!("Skipping chart {}: entry list is not a sequence", name);
            continue;
        };

        let mut parsed = Vec::with_capacity(versions.len());
        for item in versions {
            match serde_yaml::from_value::<IndexEntry>(item.clone()) {
                Ok(entry) => parsed.push(entry),
                Err(e) => tracing::warn!("Skipping unreadable entry for chart {}: {}", name, e),
            }
        }
        index.entries.insert(name, parsed);
    }

    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    const INDEX: &str = r#"
apiVersion: v1
entries:
  nginx:
    - apiVersion: v2
      name: nginx
      version: 1.1.0
      digest: 4e8f
      urls:
        - https://charts.example.com/nginx-1.1.0.tgz
    - name: nginx
      version: 1.0.0
      urls:
        - https://charts.example.com/nginx-1.0.0.tgz
  redis:
    - name: redis
      version: 17.0.0
      urls:
        - redis-17.0.0.tgz
generated: "2024-01-01T00:00:00Z"
"#;

    #[test]
    fn test_get_index_path() {
        assert_eq!(
            get_index_path(Path::new("/srv/charts")),
            PathBuf::from("/srv/charts/index.yaml")
        );
    }

    #[test]
    fn test_parse_index_entries() {
        let index = parse_index(INDEX).unwrap();
        assert_eq!(index.entries.len(), 2);

        let nginx = &index.entries["nginx"];
        assert_eq!(nginx.len(), 2);
        assert_eq!(nginx[0].version, "1.1.0");
        assert_eq!(
            nginx[1].urls,
            vec!["https://charts.example.com/nginx-1.0.0.tgz".to_string()]
        );
        assert_eq!(index.entries["redis"][0].urls, vec!["redis-17.0.0.tgz"]);
    }

    #[test]
    fn test_parse_index_without_entries() {
        let index = parse_index("apiVersion: v1\n").unwrap();
        assert!(index.entries.is_empty());
    }

    #[test]
    fn test_parse_index_entries_not_a_map() {
        let err = parse_index("apiVersion: v1\nentries:\n  - nginx\n").unwrap_err();
        assert!(err.contains("entries is not a map"));

        let err = parse_index("apiVersion: v1\nentries: ~\n").unwrap_err();
        assert!(err.contains("entries is not a map"));
    }

    #[test]
    fn test_parse_index_document_not_a_map() {
        assert!(parse_index("").is_err());
        assert!(parse_index("- just\n- a list\n").is_err());
        assert!(parse_index("entries: [unclosed\n").is_err());
    }

    #[test]
    fn test_parse_index_skips_non_list_charts() {
        let index = parse_index(
            r#"
entries:
  broken: "not a list"
  also-broken:
    version: 1.0.0
  ok:
    - version: 1.0.0
      urls: [ok-1.0.0.tgz]
"#,
        )
        .unwrap();
        assert_eq!(index.entries.len(), 1);
        assert!(index.entries.contains_key("ok"));
    }

    #[test]
    fn test_parse_index_scalar_chart_names() {
        let index = parse_index(
            r#"
entries:
  2048:
    - version: 1.0.0
      urls: [2048-1.0.0.tgz]
    - version: 2.0.0
      urls: [2048-2.0.0.tgz]
  true:
    - version: 0.1.0
      urls: [true-0.1.0.tgz]
  ? [not, a, name]
  : []
"#,
        )
        .unwrap();

        assert_eq!(index.entries.len(), 2);
        assert_eq!(index.entries["2048"].len(), 2);
        assert_eq!(index.entries["true"][0].version, "0.1.0");

        let plan = crate::plan::plan_retention(
            Path::new("/repo"),
            &index,
            &crate::types::ProtectionSet::new(),
            1,
        );
        assert_eq!(
            plan.to_delete.into_iter().collect::<Vec<_>>(),
            vec![PathBuf::from("/repo/2048-1.0.0.tgz")]
        );
    }

    #[test]
    fn test_parse_index_skips_unreadable_items() {
        let index = parse_index(
            r#"
entries:
  nginx:
    - just-a-string
    - version: 1.0.0
      urls: [nginx-1.0.0.tgz]
"#,
        )
        .unwrap();
        assert_eq!(index.entries["nginx"].len(), 1);
        assert_eq!(index.entries["nginx"][0].version, "1.0.0");
    }

    #[test]
    fn test_load_index_missing() {
        let td = TempDir::new().unwrap();
        match load_index(td.path()) {
            Err(PruneError::MissingIndex { path }) => {
                assert_eq!(path, td.path().join("index.yaml"));
            }
            other => panic!("expected MissingIndex, got {:?}", other),
        }
    }

    #[test]
    fn test_load_index_malformed() {
        let td = TempDir::new().unwrap();
        File::create(td.path().join("index.yaml"))
            .unwrap()
            .write_all(b"entries: 42\n")
            .unwrap();

        let err = load_index(td.path()).unwrap_err();
        assert!(matches!(err, PruneError::MalformedIndex { .. }));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_load_index_reads_file() {
        let td = TempDir::new().unwrap();
        File::create(td.path().join("index.yaml"))
            .unwrap()
            .write_all(INDEX.as_bytes())
            .unwrap();

        let index = load_index(td.path()).unwrap();
        assert_eq!(index.entries["nginx"].len(), 2);
    }
}
