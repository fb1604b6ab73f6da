//! Spec Tree - read-only view of the project on disk
//!
//! Rules only ever ask "does this file exist?". Loading and directory
//! enumeration live behind `SpecTree` so the whole engine can run against
//! an in-memory tree in tests.
//!
//! All paths are `/`-separated and relative to the project root.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Existence oracle for files referenced from spec documents.
pub trait ResourceResolver {
    fn exists(&self, rel_path: &str) -> bool;
}

/// Read access to a spec tree.
pub trait SpecTree: ResourceResolver {
    fn read_to_string(&self, rel_path: &str) -> io::Result<String>;

    /// Immediate subdirectory names of `rel_dir`, sorted. Missing dir yields empty.
    fn list_dirs(&self, rel_dir: &str) -> Vec<String>;

    /// File names in `rel_dir` ending in `.{extension}`, sorted.
    fn list_files(&self, rel_dir: &str, extension: &str) -> Vec<String>;

    fn is_dir(&self, rel_dir: &str) -> bool;
}

/// Join two relative path fragments with a single `/`.
pub fn join(base: &str, child: &str) -> String {
    let base = base.trim_end_matches('/');
    let child = child.trim_start_matches("./").trim_start_matches('/');
    if base.is_empty() || base == "." {
        child.to_string()
    } else {
        format!("{}/{}", base, child)
    }
}

fn has_extension(name: &str, extension: &str) -> bool {
    name.len() > extension.len() + 1
        && name.ends_with(extension)
        && name[..name.len() - extension.len()].ends_with('.')
}

/// The real file system, rooted at the project root.
#[derive(Debug, Clone)]
pub struct FsTree {
    root: PathBuf,
}

impl FsTree {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resolve(&self, rel_path: &str) -> PathBuf {
        let rel = rel_path.trim_start_matches("./").trim_start_matches('/');
        if rel.is_empty() {
            self.root.clone()
        } else {
            self.root.join(rel)
        }
    }

    fn entries(&self, rel_dir: &str) -> Vec<fs::DirEntry> {
        match fs::read_dir(self.resolve(rel_dir)) {
            Ok(iter) => iter.filter_map(Result::ok).collect(),
            Err(_) => vec![],
        }
    }
}

impl ResourceResolver for FsTree {
    fn exists(&self, rel_path: &str) -> bool {
        self.resolve(rel_path).exists()
    }
}

impl SpecTree for FsTree {
    fn read_to_string(&self, rel_path: &str) -> io::Result<String> {
        fs::read_to_string(self.resolve(rel_path))
    }

    fn list_dirs(&self, rel_dir: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .entries(rel_dir)
            .into_iter()
            .filter(|e| e.path().is_dir())
            .filter_map(|e| e.file_name().into_string().ok())
            .collect();
        names.sort();
        names
    }

    fn list_files(&self, rel_dir: &str, extension: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .entries(rel_dir)
            .into_iter()
            .filter(|e| e.path().is_file())
            .filter_map(|e| e.file_name().into_string().ok())
            .filter(|name| has_extension(name, extension))
            .collect();
        names.sort();
        names
    }

    fn is_dir(&self, rel_dir: &str) -> bool {
        self.resolve(rel_dir).is_dir()
    }
}

/// In-memory tree: file path -> contents. Directories are implied by paths.
#[derive(Debug, Clone, Default)]
pub struct MemoryTree {
    files: BTreeMap<String, String>,
}

impl MemoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, rel_path: &str, contents: &str) -> Self {
        self.insert(rel_path, contents);
        self
    }

    pub fn insert(&mut self, rel_path: &str, contents: &str) {
        self.files.insert(normalize(rel_path), contents.to_string());
    }

    pub fn remove(&mut self, rel_path: &str) {
        self.files.remove(&normalize(rel_path));
    }

    /// Names directly beneath `rel_dir`, split into (dirs, files).
    fn children(&self, rel_dir: &str) -> (Vec<String>, Vec<String>) {
        let prefix = match normalize(rel_dir) {
            d if d.is_empty() => String::new(),
            d => format!("{}/", d),
        };
        let mut dirs = vec![];
        let mut files = vec![];
        for path in self.files.keys() {
            let Some(rest) = path.strip_prefix(&prefix) else {
                continue;
            };
            match rest.split_once('/') {
                Some((dir, _)) => {
                    if !dirs.iter().any(|d| d == dir) {
                        dirs.push(dir.to_string());
                    }
                }
                None => files.push(rest.to_string()),
            }
        }
        dirs.sort();
        files.sort();
        (dirs, files)
    }
}

fn normalize(rel_path: &str) -> String {
    rel_path
        .trim_start_matches("./")
        .trim_matches('/')
        .to_string()
}

impl ResourceResolver for MemoryTree {
    fn exists(&self, rel_path: &str) -> bool {
        self.files.contains_key(&normalize(rel_path)) || self.is_dir(rel_path)
    }
}

impl SpecTree for MemoryTree {
    fn read_to_string(&self, rel_path: &str) -> io::Result<String> {
        self.files
            .get(&normalize(rel_path))
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, rel_path.to_string()))
    }

    fn list_dirs(&self, rel_dir: &str) -> Vec<String> {
        self.children(rel_dir).0
    }

    fn list_files(&self, rel_dir: &str, extension: &str) -> Vec<String> {
        self.children(rel_dir)
            .1
            .into_iter()
            .filter(|name| has_extension(name, extension))
            .collect()
    }

    fn is_dir(&self, rel_dir: &str) -> bool {
        let dir = normalize(rel_dir);
        if dir.is_empty() {
            return !self.files.is_empty();
        }
        let prefix = format!("{}/", dir);
        self.files.keys().any(|p| p.starts_with(&prefix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_normalizes_separators() {
        assert_eq!(join("UI-SPEC", "meta.yml"), "UI-SPEC/meta.yml");
        assert_eq!(join("UI-SPEC/", "/routes"), "UI-SPEC/routes");
        assert_eq!(join(".", "assets/a.svg"), "assets/a.svg");
        assert_eq!(join("", "./assets/a.svg"), "assets/a.svg");
    }

    #[test]
    fn test_memory_tree_listing_is_sorted() {
        let tree = MemoryTree::new()
            .with_file("UI-SPEC/routes/zeta/slices/b.yml", "")
            .with_file("UI-SPEC/routes/alpha/slices/a.yml", "")
            .with_file("UI-SPEC/routes/alpha/slices/notes.md", "")
            .with_file("UI-SPEC/routes/readme.txt", "");

        assert_eq!(tree.list_dirs("UI-SPEC/routes"), vec!["alpha", "zeta"]);
        assert_eq!(
            tree.list_files("UI-SPEC/routes/alpha/slices", "yml"),
            vec!["a.yml"]
        );
        assert!(tree.is_dir("UI-SPEC/routes/alpha"));
        assert!(!tree.is_dir("UI-SPEC/routes/readme.txt"));
    }

    #[test]
    fn test_memory_tree_exists() {
        let tree = MemoryTree::new().with_file("assets/icon.svg", "<svg/>");
        assert!(tree.exists("assets/icon.svg"));
        assert!(tree.exists("./assets/icon.svg"));
        assert!(tree.exists("assets"));
        assert!(!tree.exists("assets/missing.svg"));
    }

    #[test]
    fn test_extension_filter_requires_dot() {
        assert!(has_extension("home.yml", "yml"));
        assert!(!has_extension("homeyml", "yml"));
        assert!(!has_extension(".yml", "yml"));
    }

    #[test]
    fn test_fs_tree_lists_real_directories() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("routes/home/slices")).unwrap();
        fs::write(dir.path().join("routes/home/slices/main.yml"), "sliceId: x").unwrap();
        fs::write(dir.path().join("routes/home/slices/skip.txt"), "").unwrap();

        let tree = FsTree::new(dir.path());
        assert_eq!(tree.list_dirs("routes"), vec!["home"]);
        assert_eq!(tree.list_files("routes/home/slices", "yml"), vec!["main.yml"]);
        assert!(tree.exists("routes/home/slices/main.yml"));
        assert_eq!(
            tree.read_to_string("routes/home/slices/main.yml").unwrap(),
            "sliceId: x"
        );
        assert!(tree.list_dirs("nope").is_empty());
    }
}
