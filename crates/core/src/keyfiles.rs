//! Key-file selection over a repository tree.
//!
//! A "key file" is a file whose name is a strong signal for what the project
//! is (manifest, entrypoint, build file). Selection is a single short-circuit
//! scan: input order is preserved and evaluation stops at [`MAX_KEY_FILES`]
//! matches.

use serde::{Deserialize, Serialize};

/// Upper bound on selected paths per job.
pub const MAX_KEY_FILES: usize = 10;

/// Recognized file names, compared case-insensitively against the last path
/// segment. Language-agnostic on purpose.
const KEY_FILE_NAMES: [&str; 11] = [
    "package.json",
    "requirements.txt",
    "pom.xml",
    "build.gradle",
    "go.mod",
    "dockerfile",
    "vercel.json",
    "index.js",
    "server.js",
    "main.py",
    "app.js",
];

/// Whether a tree entry is a file or a directory.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeEntryKind {
    /// A file.
    Blob,
    /// A directory (or anything else that cannot carry content).
    Tree,
}

/// One entry of a recursive repository listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    pub path: String,
    pub kind: TreeEntryKind,
}

impl TreeEntry {
    pub fn new(path: impl Into<String>, kind: TreeEntryKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    pub fn blob(path: impl Into<String>) -> Self {
        Self::new(path, TreeEntryKind::Blob)
    }

    pub fn tree(path: impl Into<String>) -> Self {
        Self::new(path, TreeEntryKind::Tree)
    }
}

/// Select up to [`MAX_KEY_FILES`] interesting file paths from a tree listing.
///
/// A path matches when, lowercased, it either equals a recognized name
/// (root-level file) or ends with `/` + a recognized name (nested file).
/// Directories never match. An empty result means the repository has nothing
/// to describe the project with and the caller must treat that as fatal.
pub fn select_key_files(tree: &[TreeEntry]) -> Vec<String> {
    let mut selected = Vec::new();

    for entry in tree {
        if entry.kind != TreeEntryKind::Blob {
            continue;
        }

        let lower = entry.path.to_lowercase();
        let matches = KEY_FILE_NAMES
            .iter()
            .any(|name| lower == *name || lower.ends_with(&format!("/{name}")));

        if matches {
            selected.push(entry.path.clone());
        }

        if selected.len() >= MAX_KEY_FILES {
            break;
        }
    }

    selected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selects_blobs_and_skips_directories() {
        let tree = vec![
            TreeEntry::blob("package.json"),
            TreeEntry::blob("src/app.js"),
            TreeEntry::tree("docs/"),
        ];

        assert_eq!(select_key_files(&tree), vec!["package.json", "src/app.js"]);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let tree = vec![
            TreeEntry::blob("PACKAGE.JSON"),
            TreeEntry::blob("src/Package.Json"),
            TreeEntry::blob("Dockerfile"),
        ];

        assert_eq!(
            select_key_files(&tree),
            vec!["PACKAGE.JSON", "src/Package.Json", "Dockerfile"]
        );
    }

    #[test]
    fn suffix_must_be_a_whole_segment() {
        // "mypackage.json" is not "package.json".
        let tree = vec![
            TreeEntry::blob("mypackage.json"),
            TreeEntry::blob("nested/mypackage.json"),
        ];

        assert!(select_key_files(&tree).is_empty());
    }

    #[test]
    fn unrecognized_files_yield_empty_selection() {
        let tree = vec![TreeEntry::blob("README.md"), TreeEntry::blob("src/lib.rs")];
        assert!(select_key_files(&tree).is_empty());
    }

    #[test]
    fn selection_caps_at_ten_in_scan_order() {
        let tree: Vec<_> = (0..25)
            .map(|i| TreeEntry::blob(format!("pkg{i}/package.json")))
            .collect();

        let selected = select_key_files(&tree);
        assert_eq!(selected.len(), MAX_KEY_FILES);
        let expected: Vec<_> = (0..10).map(|i| format!("pkg{i}/package.json")).collect();
        assert_eq!(selected, expected);
    }

    #[test]
    fn input_order_is_preserved() {
        let tree = vec![
            TreeEntry::blob("server.js"),
            TreeEntry::blob("a/go.mod"),
            TreeEntry::blob("package.json"),
        ];

        assert_eq!(
            select_key_files(&tree),
            vec!["server.js", "a/go.mod", "package.json"]
        );
    }
}
