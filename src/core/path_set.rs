//! Duplicate-free path sets.
//!
//! Dependency paths reach the task from several independent tables, and the
//! same transitive path is often reported through more than one edge. A
//! [`PathSet`] identifies paths by their canonical string form, so
//! `C:\libs\a.dll`, `C:/libs/a.dll` and `C:/libs/./a.dll` collapse to a single
//! entry. Iteration and serialization follow the canonical string order.
//!
//! When several spellings of one path are seen, the lexicographically
//! smallest is kept, so the stored spelling does not depend on the order the
//! sources were merged in.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// An ordered set of paths keyed by canonical form.
///
/// Equality compares canonical keys only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<PathBuf>", into = "Vec<PathBuf>")]
pub struct PathSet {
    paths: BTreeMap<String, PathBuf>,
}

impl PathSet {
    pub fn new() -> Self {
        PathSet {
            paths: BTreeMap::new(),
        }
    }

    /// Build a set from a sequence that may contain duplicates.
    pub fn unique<I, P>(incoming: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut set = PathSet::new();
        set.extend(incoming);
        set
    }

    /// Union of `existing` and `incoming`, with duplicates collapsed.
    pub fn merge<I, P>(existing: &PathSet, incoming: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut merged = existing.clone();
        merged.extend(incoming);
        merged
    }

    /// Insert a path, returning `false` if an equivalent path was already present.
    pub fn insert(&mut self, path: impl Into<PathBuf>) -> bool {
        let path = path.into();
        match self.paths.entry(canonical(&path)) {
            Entry::Vacant(entry) => {
                entry.insert(path);
                true
            }
            Entry::Occupied(mut entry) => {
                if path.as_os_str() < entry.get().as_os_str() {
                    entry.insert(path);
                }
                false
            }
        }
    }

    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.paths.contains_key(&canonical(path.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.paths.values().map(PathBuf::as_path)
    }

    pub fn to_vec(&self) -> Vec<PathBuf> {
        self.paths.values().cloned().collect()
    }
}

impl PartialEq for PathSet {
    fn eq(&self, other: &Self) -> bool {
        self.paths.keys().eq(other.paths.keys())
    }
}

impl Eq for PathSet {}

impl<P: Into<PathBuf>> Extend<P> for PathSet {
    fn extend<I: IntoIterator<Item = P>>(&mut self, iter: I) {
        for path in iter {
            self.insert(path);
        }
    }
}

impl<P: Into<PathBuf>> FromIterator<P> for PathSet {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        PathSet::unique(iter)
    }
}

impl From<Vec<PathBuf>> for PathSet {
    fn from(paths: Vec<PathBuf>) -> Self {
        PathSet::unique(paths)
    }
}

impl From<PathSet> for Vec<PathBuf> {
    fn from(set: PathSet) -> Self {
        set.paths.into_values().collect()
    }
}

impl<'a> IntoIterator for &'a PathSet {
    type Item = &'a Path;
    type IntoIter = Box<dyn Iterator<Item = &'a Path> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

/// Canonical string form of a path, used for equality and ordering.
///
/// Separators are normalized to `/`, repeated separators and `.` segments
/// are dropped, and a trailing separator is removed. `..` is kept as-is:
/// resolving it would need the file system.
pub fn canonical(path: &Path) -> String {
    let raw = path.to_string_lossy().replace('\\', "/");
    let rooted = raw.starts_with('/');

    let segments: Vec<&str> = raw
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect();

    let joined = segments.join("/");
    if rooted {
        format!("/{}", joined)
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn set(paths: &[&str]) -> PathSet {
        PathSet::unique(paths.iter().copied())
    }

    #[test]
    fn test_canonical_form() {
        assert_eq!(canonical(Path::new("/libs/a.dll")), "/libs/a.dll");
        assert_eq!(canonical(Path::new("/libs//a.dll")), "/libs/a.dll");
        assert_eq!(canonical(Path::new("/libs/./a.dll")), "/libs/a.dll");
        assert_eq!(canonical(Path::new("C:\\libs\\a.dll")), "C:/libs/a.dll");
        assert_eq!(canonical(Path::new("out/bin/")), "out/bin");
        assert_eq!(canonical(Path::new("./")), ".");
        assert_eq!(canonical(Path::new("/")), "/");
        assert_eq!(canonical(Path::new("../shared/x.lib")), "../shared/x.lib");
    }

    #[test]
    fn test_unique_collapses_duplicates() {
        let paths = set(&["/libs/b.dll", "/libs/a.dll", "/libs/b.dll", "/libs//a.dll"]);
        assert_eq!(paths.len(), 2);
        assert_eq!(
            paths.to_vec(),
            vec![PathBuf::from("/libs/a.dll"), PathBuf::from("/libs/b.dll")]
        );
    }

    #[test]
    fn test_merge_keeps_smallest_spelling() {
        let existing = set(&["C:\\libs\\a.dll"]);
        let merged = PathSet::merge(&existing, ["C:/libs/a.dll", "C:/libs/b.dll"]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.iter().next().unwrap(), Path::new("C:/libs/a.dll"));
    }

    #[test]
    fn test_spelling_independent_of_merge_order() {
        let forward = PathSet::merge(&set(&["C:\\libs\\a.dll"]), ["C:/libs/a.dll"]);
        let backward = PathSet::merge(&set(&["C:/libs/a.dll"]), ["C:\\libs\\a.dll"]);

        assert_eq!(forward, backward);
        assert_eq!(forward.to_vec(), backward.to_vec());
        assert_eq!(
            serde_json::to_string(&forward).unwrap(),
            serde_json::to_string(&backward).unwrap()
        );
    }

    #[test]
    fn test_equality_ignores_spelling() {
        assert_eq!(set(&["/libs//a.dll"]), set(&["/libs/a.dll"]));
        assert_ne!(set(&["/libs/a.dll"]), set(&["/libs/b.dll"]));
    }

    #[test]
    fn test_merge_does_not_modify_existing() {
        let existing = set(&["/a"]);
        let merged = PathSet::merge(&existing, ["/b"]);
        assert_eq!(existing.len(), 1);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_insert_reports_duplicates() {
        let mut paths = PathSet::new();
        assert!(paths.insert("/out/TestHarness.exe"));
        assert!(!paths.insert("/out//TestHarness.exe"));
        assert!(paths.contains("/out/./TestHarness.exe"));
    }

    #[test]
    fn test_serializes_sorted() {
        let paths = set(&["/z.dll", "/a.dll", "/m.dll"]);
        let json = serde_json::to_string(&paths).unwrap();
        assert_eq!(json, r#"["/a.dll","/m.dll","/z.dll"]"#);

        let back: PathSet = serde_json::from_str(r#"["/b","/a","/b"]"#).unwrap();
        assert_eq!(back, set(&["/a", "/b"]));
    }

    fn path_list() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec("([/\\\\][a-c]{1,2}){1,3}", 0..8)
    }

    proptest! {
        #[test]
        fn prop_merge_is_idempotent(a in path_list(), b in path_list()) {
            let once = PathSet::merge(&PathSet::unique(a), b.clone());
            let twice = PathSet::merge(&once, b);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_merge_is_complete(a in path_list(), b in path_list()) {
            let left = PathSet::unique(a);
            let right = PathSet::unique(b);
            let merged = PathSet::merge(&left, right.iter());

            for path in left.iter().chain(right.iter()) {
                prop_assert!(merged.contains(path));
            }
            prop_assert!(merged.len() <= left.len() + right.len());

            let disjoint = left.iter().all(|p| !right.contains(p));
            prop_assert_eq!(merged.len() == left.len() + right.len(), disjoint);
        }

        #[test]
        fn prop_merge_order_does_not_matter(
            base in path_list(),
            first in path_list(),
            second in path_list(),
        ) {
            let base = PathSet::unique(base);
            let forward = PathSet::merge(&PathSet::merge(&base, first.clone()), second.clone());
            let backward = PathSet::merge(&PathSet::merge(&base, second), first);
            prop_assert_eq!(forward.to_vec(), backward.to_vec());
        }
    }
}
