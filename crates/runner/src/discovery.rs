//! Suite discovery

use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::DiscoveryConfig;
use crate::error::{RunnerError, RunnerResult};

/// List the immediate child directories of `root` whose absolute path
/// contains the configured pattern.
///
/// Order follows the directory listing and is not stable across platforms.
pub fn discover(root: &Path, config: &DiscoveryConfig) -> RunnerResult<Vec<PathBuf>> {
    let root = std::path::absolute(root).map_err(|source| RunnerError::Discovery {
        root: root.to_path_buf(),
        source,
    })?;

    let metadata = std::fs::metadata(&root).map_err(|source| RunnerError::Discovery {
        root: root.clone(),
        source,
    })?;
    if !metadata.is_dir() {
        return Err(RunnerError::NotADirectory(root));
    }

    let mut suites = Vec::new();

    for entry in WalkDir::new(&root).min_depth(1).max_depth(1) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(RunnerError::Discovery {
                    root,
                    source: e.into(),
                });
            }
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        let path = entry.path();
        if !path.to_string_lossy().contains(&config.pattern) {
            continue;
        }
        // Follows symlinks, so a linked suite directory still counts
        if !path.is_dir() {
            debug!("Ignoring non-directory {}", path.display());
            continue;
        }
        if let Some(filter) = &config.filter {
            if !entry.file_name().to_string_lossy().contains(filter.as_str()) {
                debug!("Filtered out {}", path.display());
                continue;
            }
        }

        suites.push(path.to_path_buf());
    }

    Ok(suites)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn names(paths: &[PathBuf]) -> Vec<String> {
        let mut names: Vec<String> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_discovers_only_matching_directories() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir(tmp.path().join("unit_test_arena")).unwrap();
        fs::create_dir(tmp.path().join("unit_test_segment")).unwrap();
        fs::create_dir(tmp.path().join("stress_tests")).unwrap();
        fs::create_dir(tmp.path().join("benchmarks")).unwrap();
        fs::write(tmp.path().join("unit_test.h"), "// header").unwrap();
        fs::write(tmp.path().join("run_all_unit_tests.py"), "").unwrap();

        let suites = discover(tmp.path(), &DiscoveryConfig::default()).unwrap();

        assert_eq!(names(&suites), vec!["unit_test_arena", "unit_test_segment"]);
        assert!(suites.iter().all(|p| p.is_absolute()));
    }

    #[test]
    fn test_does_not_recurse() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("nested/unit_test_deep")).unwrap();

        let suites = discover(tmp.path(), &DiscoveryConfig::default()).unwrap();
        assert!(suites.is_empty());
    }

    #[test]
    fn test_empty_root() {
        let tmp = tempfile::tempdir().unwrap();
        let suites = discover(tmp.path(), &DiscoveryConfig::default()).unwrap();
        assert!(suites.is_empty());
    }

    #[test]
    fn test_filter_narrows_by_name() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir(tmp.path().join("unit_test_arena")).unwrap();
        fs::create_dir(tmp.path().join("unit_test_heap_base")).unwrap();

        let config = DiscoveryConfig {
            filter: Some("heap".to_string()),
            ..Default::default()
        };
        let suites = discover(tmp.path(), &config).unwrap();
        assert_eq!(names(&suites), vec!["unit_test_heap_base"]);
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = discover(&tmp.path().join("missing"), &DiscoveryConfig::default()).unwrap_err();
        assert!(matches!(err, RunnerError::Discovery { .. }));
    }

    #[test]
    fn test_file_root_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("unit_test_file");
        fs::write(&file, "").unwrap();
        let err = discover(&file, &DiscoveryConfig::default()).unwrap_err();
        assert!(matches!(err, RunnerError::NotADirectory(_)));
    }
}
