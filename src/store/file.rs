use super::{KeyValueStore, StoreKey};
use crate::Result;
use crate::error::ReqlabError;
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// File-per-key store rooted at a data directory
///
/// # Concurrency Strategy
/// Each key has a sidecar `<file>.lock`. Readers take a shared lock, writers an
/// exclusive one, so a read-modify-write from one process cannot interleave
/// with another process's. Values are written to a temp file and renamed into
/// place, so a crash mid-write never leaves a truncated document behind.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, key: StoreKey) -> PathBuf {
        self.dir.join(key.file_name())
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir).map_err(ReqlabError::IoError)?;
        }
        Ok(())
    }

    fn lock_file(&self, key: StoreKey) -> Result<File> {
        self.ensure_dir()?;
        let path = self.dir.join(format!("{}.lock", key.file_name()));
        OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(path)
            .map_err(ReqlabError::IoError)
    }

    fn lock_exclusive(&self, key: StoreKey) -> Result<File> {
        let file = self.lock_file(key)?;
        FileExt::lock_exclusive(&file).map_err(ReqlabError::IoError)?;
        Ok(file)
    }

    fn read(&self, key: StoreKey) -> Result<Option<String>> {
        match fs::read_to_string(self.path(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ReqlabError::IoError(e)),
        }
    }

    fn write(&self, key: StoreKey, value: &str) -> Result<()> {
        let path = self.path(key);
        let tmp = self.dir.join(format!("{}.tmp", key.file_name()));

        let mut file = File::create(&tmp).map_err(ReqlabError::IoError)?;
        file.write_all(value.as_bytes())
            .map_err(ReqlabError::IoError)?;
        file.sync_all().map_err(ReqlabError::IoError)?;
        drop(file);

        fs::rename(&tmp, &path).map_err(ReqlabError::IoError)
    }

    fn delete(&self, key: StoreKey) -> Result<()> {
        match fs::remove_file(self.path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ReqlabError::IoError(e)),
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: StoreKey) -> Result<Option<String>> {
        // Nothing was ever written; don't create the directory just to read.
        if !self.dir.exists() {
            return Ok(None);
        }
        let lock = self.lock_file(key)?;
        FileExt::lock_shared(&lock).map_err(ReqlabError::IoError)?;
        self.read(key)
        // Unlock on drop
    }

    fn set(&self, key: StoreKey, value: &str) -> Result<()> {
        let _lock = self.lock_exclusive(key)?;
        self.write(key, value)
    }

    fn remove(&self, key: StoreKey) -> Result<()> {
        if !self.dir.exists() {
            return Ok(());
        }
        let _lock = self.lock_exclusive(key)?;
        self.delete(key)
    }

    fn take(&self, key: StoreKey) -> Result<Option<String>> {
        if !self.dir.exists() {
            return Ok(None);
        }
        let _lock = self.lock_exclusive(key)?;
        let value = self.read(key)?;
        if value.is_some() {
            self.delete(key)?;
        }
        Ok(value)
    }

    fn update(
        &self,
        key: StoreKey,
        f: &mut dyn FnMut(Option<String>) -> Result<Option<String>>,
    ) -> Result<()> {
        let _lock = self.lock_exclusive(key)?;
        let current = self.read(key)?;
        match f(current)? {
            Some(next) => self.write(key, &next),
            None => self.delete(key),
        }
    }
}
