use std::path::Path;

use crate::traits::SourceReader;
use crate::{OperationError, Result};

pub struct FileSystemSourceReader;

impl FileSystemSourceReader {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for FileSystemSourceReader {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceReader for FileSystemSourceReader {
    fn read(&self, root: &Path, path: &Path) -> Result<Vec<u8>> {
        std::fs::read(root.join(path)).map_err(|source| OperationError::SourceRead {
            path: path.to_path_buf(),
            source,
        })
    }
}
