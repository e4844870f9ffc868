use crate::domain::model::Layout;
use crate::utils::error::Result;
use std::path::{Path, PathBuf};

pub trait Storage {
    fn read_to_string(&self, path: &Path) -> Result<String>;
    fn read_bytes(&self, path: &Path) -> Result<Vec<u8>>;
    fn write(&self, path: &Path, data: &[u8]) -> Result<()>;
    fn exists(&self, path: &Path) -> bool;
    fn create_dir(&self, path: &Path) -> Result<()>;
    /// Entries of a directory, sorted by name.
    fn list_dir(&self, path: &Path) -> Result<Vec<PathBuf>>;
}

/// Produces the raw text of one part of an article.
pub trait Extractor {
    fn extract(&self, layout: &Layout, pdf: &Path) -> Result<String>;
}
