//! In-memory mock filesystem for testing readers without real sensor files.
//!
//! Files can be added, replaced and removed between reads, which lets tests
//! simulate a sensor changing value or disappearing mid-run.

use crate::collector::traits::FileSystem;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// In-memory filesystem for testing.
///
/// Clones share the same underlying tree, so a test can keep a handle and
/// mutate files while a reader owns another clone.
#[derive(Debug, Clone, Default)]
pub struct MockFs {
    inner: Arc<RwLock<Tree>>,
}

#[derive(Debug, Default)]
struct Tree {
    /// Map from path to file contents.
    files: HashMap<PathBuf, String>,
}

impl MockFs {
    /// Creates a new empty mock filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a file with the given content.
    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<String>) {
        let mut tree = self.inner.write().unwrap_or_else(|e| e.into_inner());
        tree.files.insert(path.as_ref().to_path_buf(), content.into());
    }

    /// Removes a file.
    pub fn remove_file(&self, path: impl AsRef<Path>) {
        let mut tree = self.inner.write().unwrap_or_else(|e| e.into_inner());
        tree.files.remove(path.as_ref());
    }
}

impl FileSystem for MockFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let tree = self.inner.read().unwrap_or_else(|e| e.into_inner());
        tree.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("file not found: {:?}", path),
            )
        })
    }
}
