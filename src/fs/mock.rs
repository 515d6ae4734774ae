// src/fs/mock.rs

use super::{EntryMeta, FileSystem};
use anyhow::{anyhow, bail, Result};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub enum MockEntry {
    /// `len` may exceed `contents.len()` so tests can fake large files cheaply.
    File { contents: Vec<u8>, len: u64 },
    Dir(Vec<String>), // List of child names
}

/// Operations that can be made to fail for a given path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOp {
    ReadDir,
    Metadata,
    CreateDir,
    Rename,
    Copy,
    RemoveFile,
}

#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    files: Arc<Mutex<HashMap<PathBuf, MockEntry>>>,
    failures: Arc<Mutex<HashSet<(MockOp, PathBuf)>>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        let mut files = HashMap::new();
        // Ensure root exists
        files.insert(PathBuf::from("/"), MockEntry::Dir(Vec::new()));

        Self {
            files: Arc::new(Mutex::new(files)),
            failures: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let contents = content.into();
        let len = contents.len() as u64;
        self.insert_file(path.as_ref(), contents, len);
    }

    /// Add a file that reports `len` bytes without storing them.
    pub fn add_sized_file(&self, path: impl AsRef<Path>, len: u64) {
        self.insert_file(path.as_ref(), Vec::new(), len);
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut files = self.files.lock().unwrap();
        Self::ensure_dir_entry(&mut files, path.as_ref());
    }

    /// Make `op` on `path` fail from now on.
    pub fn fail(&self, op: MockOp, path: impl AsRef<Path>) {
        self.failures
            .lock()
            .unwrap()
            .insert((op, path.as_ref().to_path_buf()));
    }

    /// Child names of a directory, sorted. Empty if it does not exist.
    pub fn list(&self, path: impl AsRef<Path>) -> Vec<String> {
        let files = self.files.lock().unwrap();
        match files.get(path.as_ref()) {
            Some(MockEntry::Dir(children)) => {
                let mut names = children.clone();
                names.sort();
                names
            }
            _ => Vec::new(),
        }
    }

    pub fn contents(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        let files = self.files.lock().unwrap();
        match files.get(path.as_ref()) {
            Some(MockEntry::File { contents, .. }) => Some(contents.clone()),
            _ => None,
        }
    }

    pub fn exists(&self, path: impl AsRef<Path>) -> bool {
        self.files.lock().unwrap().contains_key(path.as_ref())
    }

    fn insert_file(&self, path: &Path, contents: Vec<u8>, len: u64) {
        let mut files = self.files.lock().unwrap();
        if let Some(parent) = path.parent() {
            Self::ensure_dir_entry(&mut files, parent);
        }
        Self::link_child(&mut files, path);
        files.insert(path.to_path_buf(), MockEntry::File { contents, len });
    }

    fn check(&self, op: MockOp, path: &Path) -> Result<()> {
        if self
            .failures
            .lock()
            .unwrap()
            .contains(&(op, path.to_path_buf()))
        {
            bail!("injected {:?} failure for {:?}", op, path);
        }
        Ok(())
    }

    fn ensure_dir_entry(files: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
        if files.contains_key(path) {
            return;
        }
        files.insert(path.to_path_buf(), MockEntry::Dir(Vec::new()));
        if let Some(parent) = path.parent() {
            Self::ensure_dir_entry(files, parent);
            Self::link_child(files, path);
        }
    }

    fn link_child(files: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
        let (Some(parent), Some(name)) = (path.parent(), path.file_name()) else {
            return;
        };
        let name = name.to_string_lossy().into_owned();
        if let Some(MockEntry::Dir(children)) = files.get_mut(parent) {
            if !children.contains(&name) {
                children.push(name);
            }
        }
    }

    fn unlink_child(files: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
        let (Some(parent), Some(name)) = (path.parent(), path.file_name()) else {
            return;
        };
        let name = name.to_string_lossy();
        if let Some(MockEntry::Dir(children)) = files.get_mut(parent) {
            children.retain(|c| *c != name);
        }
    }

    fn require_parent_dir(files: &HashMap<PathBuf, MockEntry>, path: &Path) -> Result<()> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow!("No parent directory: {:?}", path))?;
        match files.get(parent) {
            Some(MockEntry::Dir(_)) => Ok(()),
            _ => Err(anyhow!("Directory not found: {:?}", parent)),
        }
    }
}

impl FileSystem for MockFileSystem {
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        self.check(MockOp::ReadDir, path)?;
        let files = self.files.lock().unwrap();
        match files.get(path) {
            Some(MockEntry::Dir(children)) => {
                Ok(children.iter().map(|name| path.join(name)).collect())
            }
            _ => Err(anyhow!("Not a directory or not found: {:?}", path)),
        }
    }

    fn metadata(&self, path: &Path) -> Result<EntryMeta> {
        self.check(MockOp::Metadata, path)?;
        let files = self.files.lock().unwrap();
        match files.get(path) {
            Some(MockEntry::File { len, .. }) => Ok(EntryMeta {
                len: *len,
                is_dir: false,
            }),
            Some(MockEntry::Dir(_)) => Ok(EntryMeta {
                len: 4096,
                is_dir: true,
            }),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn is_dir(&self, path: &Path) -> bool {
        let files = self.files.lock().unwrap();
        matches!(files.get(path), Some(MockEntry::Dir(_)))
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        self.check(MockOp::CreateDir, path)?;
        let mut files = self.files.lock().unwrap();
        if let Some(MockEntry::File { .. }) = files.get(path) {
            bail!("File exists: {:?}", path);
        }
        Self::ensure_dir_entry(&mut files, path);
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        self.check(MockOp::Rename, from)?;
        let mut files = self.files.lock().unwrap();
        Self::require_parent_dir(&files, to)?;
        let entry = match files.get(from) {
            Some(entry @ MockEntry::File { .. }) => entry.clone(),
            Some(MockEntry::Dir(_)) => bail!("Is a directory: {:?}", from),
            None => bail!("File not found: {:?}", from),
        };
        files.remove(from);
        Self::unlink_child(&mut files, from);
        files.insert(to.to_path_buf(), entry);
        Self::link_child(&mut files, to);
        Ok(())
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<u64> {
        self.check(MockOp::Copy, from)?;
        let mut files = self.files.lock().unwrap();
        Self::require_parent_dir(&files, to)?;
        let entry = match files.get(from) {
            Some(entry @ MockEntry::File { .. }) => entry.clone(),
            Some(MockEntry::Dir(_)) => bail!("Is a directory: {:?}", from),
            None => bail!("File not found: {:?}", from),
        };
        let len = match &entry {
            MockEntry::File { len, .. } => *len,
            MockEntry::Dir(_) => 0,
        };
        files.insert(to.to_path_buf(), entry);
        Self::link_child(&mut files, to);
        Ok(len)
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        self.check(MockOp::RemoveFile, path)?;
        let mut files = self.files.lock().unwrap();
        match files.get(path) {
            Some(MockEntry::File { .. }) => {
                files.remove(path);
                Self::unlink_child(&mut files, path);
                Ok(())
            }
            Some(MockEntry::Dir(_)) => Err(anyhow!("Is a directory: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_file_creates_parents() {
        let fs = MockFileSystem::new();
        fs.add_file("/data/run/a.dat", b"x".to_vec());

        assert!(fs.is_dir(Path::new("/data")));
        assert_eq!(fs.list("/data/run"), vec!["a.dat".to_string()]);
        assert_eq!(fs.list("/"), vec!["data".to_string()]);
    }

    #[test]
    fn rename_moves_and_overwrites() {
        let fs = MockFileSystem::new();
        fs.add_file("/run/a.dat", b"new".to_vec());
        fs.add_file("/store/a.dat", b"old".to_vec());

        fs.rename(Path::new("/run/a.dat"), Path::new("/store/a.dat"))
            .unwrap();

        assert!(fs.list("/run").is_empty());
        assert_eq!(fs.list("/store"), vec!["a.dat".to_string()]);
        assert_eq!(fs.contents("/store/a.dat").unwrap(), b"new");
    }

    #[test]
    fn rename_into_missing_dir_fails() {
        let fs = MockFileSystem::new();
        fs.add_file("/run/a.dat", b"x".to_vec());
        assert!(fs
            .rename(Path::new("/run/a.dat"), Path::new("/store/a.dat"))
            .is_err());
        assert!(fs.exists("/run/a.dat"));
    }

    #[test]
    fn injected_failure_is_reported() {
        let fs = MockFileSystem::new();
        fs.add_file("/run/a.dat", b"x".to_vec());
        fs.fail(MockOp::RemoveFile, "/run/a.dat");

        let err = fs.remove_file(Path::new("/run/a.dat")).unwrap_err();
        assert!(err.to_string().contains("injected"));
        assert!(fs.exists("/run/a.dat"));
    }
}
