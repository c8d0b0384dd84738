//! # File Discovery
//!
//! Expands the paths given on the command line into the sorted list of
//! schema files to process.
//!
//! - A path naming a file is always included, whatever its extension.
//! - A directory is walked recursively; files are kept when their name
//!   ends with one of the configured extensions.
//! - Anything at or below an ignored path is skipped.
//! - Symbolic links to directories are not followed during a walk; links to
//!   files are treated like the files they point to.
//!
//! The result is sorted and free of duplicates, so processing order (and
//! therefore report order) does not depend on directory iteration order.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Default extensions for schema documents.
pub const DEFAULT_EXTENSIONS: &[&str] = &[".json", ".yaml", ".yml"];

/// Normalize an extension to its dotted form (`json` → `.json`).
pub fn normalize_extension(extension: &str) -> String {
    if extension.starts_with('.') {
        extension.to_string()
    } else {
        format!(".{extension}")
    }
}

/// Expand `paths` into the sorted set of matching files.
pub fn discover(paths: &[PathBuf], extensions: &[String], ignore: &[PathBuf]) -> Vec<PathBuf> {
    let extensions: Vec<String> = extensions.iter().map(|e| normalize_extension(e)).collect();
    let ignore: Vec<PathBuf> = ignore.iter().map(|p| canonical_or_self(p)).collect();
    let mut found = BTreeSet::new();

    for path in paths {
        if is_ignored(path, &ignore) {
            continue;
        }
        if path.is_dir() {
            walk_for_files(path, &extensions, &ignore, &mut found);
        } else {
            found.insert(path.clone());
        }
    }

    found.into_iter().collect()
}

fn canonical_or_self(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

fn is_ignored(path: &Path, ignore: &[PathBuf]) -> bool {
    if ignore.is_empty() {
        return false;
    }
    let canonical = canonical_or_self(path);
    ignore
        .iter()
        .any(|prefix| canonical.starts_with(prefix) || path.starts_with(prefix))
}

fn matches_extension(path: &Path, extensions: &[String]) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| extensions.iter().any(|ext| name.ends_with(ext.as_str())))
}

fn walk_for_files(dir: &Path, extensions: &[String], ignore: &[PathBuf], acc: &mut BTreeSet<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            tracing::warn!(
                dir = %dir.display(),
                error = %e,
                "failed to read directory during file walk"
            );
            return;
        }
    };
    for entry in entries {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "failed to read directory entry");
                continue;
            }
        };
        let path = entry.path();
        if is_ignored(&path, ignore) {
            continue;
        }
        let file_type = match entry.file_type() {
            Ok(t) => t,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to read file type");
                continue;
            }
        };
        if file_type.is_dir() {
            walk_for_files(&path, extensions, ignore, acc);
        } else if file_type.is_symlink() && path.is_dir() {
            tracing::debug!(path = %path.display(), "skipping symlinked directory");
        } else if matches_extension(&path, extensions) {
            acc.insert(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exts() -> Vec<String> {
        DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect()
    }

    #[test]
    fn test_normalize_extension() {
        assert_eq!(normalize_extension("json"), ".json");
        assert_eq!(normalize_extension(".yaml"), ".yaml");
    }

    #[test]
    fn test_discover_recurses_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("b").join("c");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("z.json"), "{}").unwrap();
        std::fs::write(dir.path().join("a.yaml"), "{}").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "hello").unwrap();

        let files = discover(&[dir.path().to_path_buf()], &exts(), &[]);
        assert_eq!(files.len(), 2);
        assert!(files[0] < files[1], "not sorted: {files:?}");
        assert!(files.iter().all(|f| !f.ends_with("notes.txt")));
    }

    #[test]
    fn test_discover_explicit_file_ignores_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.txt");
        std::fs::write(&path, "{}").unwrap();
        let files = discover(&[path.clone()], &exts(), &[]);
        assert_eq!(files, vec![path]);
    }

    #[test]
    fn test_discover_honours_ignore() {
        let dir = tempfile::tempdir().unwrap();
        let skipped = dir.path().join("vendor");
        std::fs::create_dir_all(&skipped).unwrap();
        std::fs::write(skipped.join("x.json"), "{}").unwrap();
        std::fs::write(dir.path().join("y.json"), "{}").unwrap();

        let files = discover(&[dir.path().to_path_buf()], &exts(), &[skipped]);
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("y.json"));
    }

    #[test]
    fn test_discover_deduplicates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.json");
        std::fs::write(&path, "{}").unwrap();
        let files = discover(&[path.clone(), path.clone()], &exts(), &[]);
        assert_eq!(files.len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_discover_does_not_follow_directory_symlinks() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("a.json"), "{}").unwrap();
        std::os::unix::fs::symlink(dir.path(), nested.join("loop")).unwrap();
        std::os::unix::fs::symlink(nested.join("a.json"), dir.path().join("b.json")).unwrap();

        let files = discover(&[dir.path().to_path_buf()], &exts(), &[]);
        assert_eq!(files.len(), 2, "{files:?}");
        assert!(files[0].ends_with("b.json"));
        assert!(files[1].ends_with("nested/a.json"));
    }

    #[test]
    fn test_discover_custom_compound_extension() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.schema.json"), "{}").unwrap();
        std::fs::write(dir.path().join("b.json"), "{}").unwrap();
        let files = discover(&[dir.path().to_path_buf()], &["schema.json".to_string()], &[]);
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("a.schema.json"));
    }
}
