use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use ctfd_reconcile::{FileSource, FileSourceError};

/// File contents keyed by exact path. Unknown paths fail like a missing file.
#[derive(Debug, Clone, Default)]
pub struct MemoryFileSource {
    files: BTreeMap<PathBuf, Vec<u8>>,
}

impl MemoryFileSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) -> Self {
        self.files.insert(path.into(), content.into());
        self
    }
}

impl FileSource for MemoryFileSource {
    fn read(&self, path: &Path) -> Result<Vec<u8>, FileSourceError> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| FileSourceError {
                path: path.to_path_buf(),
                reason: "no such file".to_string(),
            })
    }
}
