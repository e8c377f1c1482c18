//! Capture discovery and batch ordering.
//!
//! Capture names end in `-<device>-<build>-<run>.<ext>`, so ordering on the
//! last three `-` segments groups runs of the same build together regardless
//! of any prefix.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Ordering key of a capture file name
///
/// The last three `-`-delimited segments, rejoined and lowercased. Names
/// with fewer segments use the whole name.
pub fn sort_key(file_name: &str) -> String {
    let segments: Vec<&str> = file_name.split('-').collect();
    let first = segments.len().saturating_sub(3);
    segments[first..].join("-").to_lowercase()
}

/// List the regular files of `dir` in processing order
///
/// **Public** - ties on the sort key fall back to the full file name
///
/// # Errors
/// Any I/O error while reading the directory; this is the only fatal error
/// of a batch run.
pub fn discover_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }

    files.sort_by_cached_key(|path| {
        let name = file_name_of(path);
        (sort_key(&name), name)
    });

    Ok(files)
}

/// Final path component as an owned string
pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sort_key_uses_last_three_segments() {
        assert_eq!(sort_key("il2cpp-Pixel-B2-run1.json"), "pixel-b2-run1.json");
        assert_eq!(sort_key("a-b.json"), "a-b.json");
        assert_eq!(sort_key("Single.cpuprofile"), "single.cpuprofile");
    }

    #[test]
    fn test_discover_files_order() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "zz-dev-b1-run2.json",
            "aa-dev-b1-run2.json",
            "xx-Dev-B1-run1.json",
            "mm-dev-a9-run9.cpuprofile",
        ] {
            std::fs::write(dir.path().join(name), "[]").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested")).unwrap();

        let names: Vec<String> = discover_files(dir.path())
            .unwrap()
            .iter()
            .map(|p| file_name_of(p))
            .collect();

        assert_eq!(
            names,
            vec![
                "mm-dev-a9-run9.cpuprofile",
                "xx-Dev-B1-run1.json",
                "aa-dev-b1-run2.json",
                "zz-dev-b1-run2.json",
            ]
        );
    }

    #[test]
    fn test_discover_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover_files(&dir.path().join("absent")).is_err());
    }
}
