use crate::domain::ports::Storage;
use crate::utils::error::{QscriptError, Result};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// In-memory storage for unit tests.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    files: RefCell<BTreeMap<PathBuf, Vec<u8>>>,
    dirs: RefCell<BTreeSet<PathBuf>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.add_parents(Path::new(path));
        self.files
            .borrow_mut()
            .insert(PathBuf::from(path), content.as_bytes().to_vec());
        self
    }

    pub fn with_dir(self, path: &str) -> Self {
        let path = PathBuf::from(path);
        self.add_parents(&path);
        self.dirs.borrow_mut().insert(path);
        self
    }

    pub fn content(&self, path: &str) -> Option<String> {
        self.files
            .borrow()
            .get(Path::new(path))
            .map(|data| String::from_utf8_lossy(data).to_string())
    }

    fn add_parents(&self, path: &Path) {
        let mut dirs = self.dirs.borrow_mut();
        for ancestor in path.ancestors().skip(1) {
            if !ancestor.as_os_str().is_empty() {
                dirs.insert(ancestor.to_path_buf());
            }
        }
    }

    fn not_found(path: &Path) -> QscriptError {
        QscriptError::file(
            path,
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        )
    }
}

impl Storage for MemoryStorage {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        let data = self.read_bytes(path)?;
        String::from_utf8(data).map_err(|e| {
            QscriptError::file(
                path,
                std::io::Error::new(std::io::ErrorKind::InvalidData, e),
            )
        })
    }

    fn read_bytes(&self, path: &Path) -> Result<Vec<u8>> {
        self.files
            .borrow()
            .get(path)
            .cloned()
            .ok_or_else(|| Self::not_found(path))
    }

    fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        self.add_parents(path);
        self.files
            .borrow_mut()
            .insert(path.to_path_buf(), data.to_vec());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.borrow().contains_key(path) || self.dirs.borrow().contains(path)
    }

    fn create_dir(&self, path: &Path) -> Result<()> {
        self.add_parents(path);
        self.dirs.borrow_mut().insert(path.to_path_buf());
        Ok(())
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        if !self.dirs.borrow().contains(path) {
            return Err(Self::not_found(path));
        }
        let files = self.files.borrow();
        let dirs = self.dirs.borrow();
        let children: BTreeSet<PathBuf> = files
            .keys()
            .chain(dirs.iter())
            .filter(|p| p.parent() == Some(path))
            .cloned()
            .collect();
        Ok(children.into_iter().collect())
    }
}
