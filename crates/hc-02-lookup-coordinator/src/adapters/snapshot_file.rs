//! Filesystem snapshot store
//!
//! Writes go to a sibling temp file which is synced and then renamed over the
//! target, so a crash mid-save leaves the previous snapshot intact.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::SnapshotStoreError;
use crate::ports::SnapshotStore;

/// Snapshot file on local disk
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn save(&self, snapshot: &[u8]) -> Result<(), SnapshotStoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp_path = self.path.with_extension("tmp");
        if let Err(e) = write_and_replace(&temp_path, &self.path, snapshot) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }
        Ok(())
    }

    fn load(&self) -> Result<Option<Vec<u8>>, SnapshotStoreError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

fn write_and_replace(temp_path: &Path, path: &Path, snapshot: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(temp_path)?;
    file.write_all(snapshot)?;
    file.sync_all()?;
    drop(file);

    fs::rename(temp_path, path)
}
