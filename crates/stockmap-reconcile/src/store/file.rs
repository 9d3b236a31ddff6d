use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::StoreError;

use super::{StorageBackend, StoreKey};

/// Stores each collection as `<dir>/<key>.json`.
///
/// Writes go to a sibling temp file first and are renamed into place so a
/// crash mid-write leaves the previous contents intact.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: StoreKey) -> PathBuf {
        self.dir.join(format!("{}.json", key.as_str()))
    }
}

impl StorageBackend for FileBackend {
    fn read(&self, key: StoreKey) -> Result<Option<String>, StoreError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io {
                key: key.as_str(),
                source,
            }),
        }
    }

    fn write(&self, key: StoreKey, contents: &str) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            key: key.as_str(),
            source,
        };
        std::fs::create_dir_all(&self.dir).map_err(io_err)?;
        let target = self.path_for(key);
        let tmp = target.with_extension("json.tmp");
        std::fs::write(&tmp, contents).map_err(io_err)?;
        std::fs::rename(&tmp, &target).map_err(io_err)
    }
}
