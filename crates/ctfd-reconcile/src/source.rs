//! Local file content source.

use std::fmt;
use std::path::{Path, PathBuf};

/// A file's bytes could not be obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSourceError {
    pub path: PathBuf,
    pub reason: String,
}

impl fmt::Display for FileSourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unable to read {}: {}", self.path.display(), self.reason)
    }
}

impl std::error::Error for FileSourceError {}

/// Reads local file content for upload. Failures are always per-file.
pub trait FileSource {
    fn read(&self, path: &Path) -> Result<Vec<u8>, FileSourceError>;
}

/// Reads from the local filesystem. Relative paths resolve against
/// `base_dir` when one is set, otherwise against the working directory.
#[derive(Debug, Clone, Default)]
pub struct FsFileSource {
    base_dir: Option<PathBuf>,
}

impl FsFileSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl FileSource for FsFileSource {
    fn read(&self, path: &Path) -> Result<Vec<u8>, FileSourceError> {
        let resolved = self.resolve(path);
        std::fs::read(&resolved).map_err(|e| FileSourceError {
            path: resolved,
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_resolve_against_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), b"alpha").unwrap();

        let src = FsFileSource::with_base_dir(dir.path());
        assert_eq!(src.read(Path::new("a.txt")).unwrap(), b"alpha");
    }

    #[test]
    fn absolute_paths_ignore_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        let abs = dir.path().join("b.txt");
        std::fs::write(&abs, b"beta").unwrap();

        let src = FsFileSource::with_base_dir("/nonexistent");
        assert_eq!(src.read(&abs).unwrap(), b"beta");
    }

    #[test]
    fn missing_file_reports_resolved_path() {
        let src = FsFileSource::with_base_dir("/nonexistent");
        let err = src.read(Path::new("gone.txt")).unwrap_err();
        assert_eq!(err.path, PathBuf::from("/nonexistent/gone.txt"));
    }
}
