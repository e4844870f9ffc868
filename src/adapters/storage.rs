use crate::domain::ports::Storage;
use crate::utils::error::{QscriptError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// File-system storage. Relative paths resolve against the process working directory.
#[derive(Debug, Clone, Default)]
pub struct LocalStorage;

impl LocalStorage {
    pub fn new() -> Self {
        Self
    }
}

impl Storage for LocalStorage {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).map_err(|e| QscriptError::file(path, e))
    }

    fn read_bytes(&self, path: &Path) -> Result<Vec<u8>> {
        fs::read(path).map_err(|e| QscriptError::file(path, e))
    }

    fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| QscriptError::file(parent, e))?;
            }
        }
        fs::write(path, data).map_err(|e| QscriptError::file(path, e))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_dir(&self, path: &Path) -> Result<()> {
        fs::create_dir(path).map_err(|e| QscriptError::file(path, e))
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let mut entries = fs::read_dir(path)
            .map_err(|e| QscriptError::file(path, e))?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<_>>>()
            .map_err(|e| QscriptError::file(path, e))?;
        entries.sort();
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("raw").join("AbuDab21.txt");

        let storage = LocalStorage::new();
        storage.write(&target, b"Title\n\n").unwrap();

        assert!(storage.exists(&target));
        assert_eq!(storage.read_to_string(&target).unwrap(), "Title\n\n");
    }

    #[test]
    fn test_read_missing_file_names_the_path() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("sample.list");

        let err = LocalStorage::new().read_to_string(&missing).unwrap_err();
        assert!(err.to_string().contains("sample.list"));
    }

    #[test]
    fn test_list_dir_is_sorted() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("abstracts.B")).unwrap();
        fs::create_dir(temp_dir.path().join("abstracts.A")).unwrap();

        let entries = LocalStorage::new().list_dir(temp_dir.path()).unwrap();
        let names: Vec<_> = entries
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["abstracts.A", "abstracts.B"]);
    }
}
