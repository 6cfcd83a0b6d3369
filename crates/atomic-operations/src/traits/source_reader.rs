use std::path::Path;

use crate::Result;

pub trait SourceReader: Send + Sync {
    /// Reads a repository-relative file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    fn read(&self, root: &Path, path: &Path) -> Result<Vec<u8>>;
}
