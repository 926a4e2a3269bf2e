use crate::error::Error;
use crate::model::SourceFile;
use glob::Pattern;
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::error;
use walkdir::WalkDir;

/// Recursive document enumeration under a single source root.
///
/// Paths are returned in lexicographic order so that "first seen" during
/// deduplication is reproducible across runs.
pub struct DocumentLoader {
    root: PathBuf,
    extension: String,
    ignore_patterns: Vec<Pattern>,
}

impl DocumentLoader {
    pub fn new(root: &Path, extension: &str, ignore_globs: &[String]) -> Self {
        let ignore_patterns = ignore_globs
            .iter()
            .filter_map(|glob| match Pattern::new(glob) {
                Ok(p) => Some(p),
                Err(e) => {
                    error!("Invalid glob pattern '{}': {}", glob, e);
                    None
                }
            })
            .collect();

        Self {
            root: root.to_path_buf(),
            extension: extension.trim_start_matches('.').to_string(),
            ignore_patterns,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn is_ignored(&self, path: &Path) -> bool {
        self.ignore_patterns
            .iter()
            .any(|pattern| pattern.matches_path(path))
    }

    fn has_extension(&self, path: &Path) -> bool {
        path.extension() == Some(OsStr::new(&self.extension))
    }

    /// Collect every matching file path, sorted. Unreadable directories are
    /// logged and skipped; a missing root is an error.
    pub fn paths(&self) -> Result<Vec<PathBuf>, Error> {
        if !self.root.is_dir() {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("Source directory {} does not exist", self.root.display()),
            )));
        }

        let mut paths: Vec<PathBuf> = WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| !self.is_ignored(entry.path()))
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(err) => {
                    error!("Error walking {}: {}", self.root.display(), err);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file() && self.has_extension(entry.path()))
            .map(|entry| entry.into_path())
            .collect();

        paths.sort();
        Ok(paths)
    }

    /// Read one file. Never fails: read errors are carried in `raw`.
    pub fn load(&self, path: &Path) -> SourceFile {
        let relative_path = path
            .strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| PathBuf::from(path.file_name().unwrap_or_default()));

        let filename = path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default();

        SourceFile {
            path: path.to_path_buf(),
            relative_path,
            filename,
            raw: fs::read(path).map_err(|e| e.to_string()),
        }
    }

    /// Lazy sequence of loaded files in traversal order.
    pub fn iter(&self) -> Result<impl Iterator<Item = SourceFile> + '_, Error> {
        let paths = self.paths()?;
        Ok(paths.into_iter().map(move |path| self.load(&path)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_paths_are_sorted_and_filtered() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("b")).unwrap();
        fs::create_dir_all(root.join("a/nested")).unwrap();
        fs::write(root.join("b/two.md"), "x").unwrap();
        fs::write(root.join("a/nested/one.md"), "x").unwrap();
        fs::write(root.join("a/notes.txt"), "x").unwrap();
        fs::write(root.join("zero.md"), "x").unwrap();

        let loader = DocumentLoader::new(root, "md", &[]);
        let paths = loader.paths().unwrap();

        let relative: Vec<_> = paths
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            relative,
            vec![
                PathBuf::from("a/nested/one.md"),
                PathBuf::from("b/two.md"),
                PathBuf::from("zero.md"),
            ]
        );
    }

    #[test]
    fn test_ignore_patterns_skip_directories() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("drafts")).unwrap();
        fs::write(root.join("drafts/skip.md"), "x").unwrap();
        fs::write(root.join("keep.md"), "x").unwrap();

        let ignore = vec![format!("{}/drafts", root.display())];
        let loader = DocumentLoader::new(root, ".md", &ignore);
        let paths = loader.paths().unwrap();

        assert_eq!(paths, vec![root.join("keep.md")]);
    }

    #[test]
    fn test_missing_root_is_error() {
        let tmp = tempdir().unwrap();
        let loader = DocumentLoader::new(&tmp.path().join("nope"), "md", &[]);
        assert!(loader.paths().is_err());
    }

    #[test]
    fn test_load_carries_relative_path() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("shelf")).unwrap();
        fs::write(root.join("shelf/book.md"), "content").unwrap();

        let loader = DocumentLoader::new(root, "md", &[]);
        let files: Vec<_> = loader.iter().unwrap().collect();

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].filename, "book.md");
        assert_eq!(files[0].relative_path, PathBuf::from("shelf/book.md"));
        assert_eq!(files[0].raw.as_deref().unwrap(), b"content");
    }
}
