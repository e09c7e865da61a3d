use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard};

use tracing::info;

use crate::error::RenameError;
use crate::jar_index::JarIndex;
use crate::renamer::{ClassRenames, MethodRenames};

/// A `JarIndex` shared between many readers and one writer at a time.
///
/// Renames are serialized among themselves and build the renamed copy under
/// a read lock. The write lock is held only for the swap, so readers keep
/// going during a rename and see either the old index or the new one.
#[derive(Clone, Debug)]
pub struct SharedJarIndex {
    inner: Arc<RwLock<JarIndex>>,
    writer: Arc<Mutex<()>>,
}

impl SharedJarIndex {
    pub fn new(index: JarIndex) -> Self {
        Self {
            inner: Arc::new(RwLock::new(index)),
            writer: Arc::new(Mutex::new(())),
        }
    }

    /// Read access. A poisoned lock still holds a whole index, since writers
    /// only ever replace it wholesale.
    pub fn read(&self) -> RwLockReadGuard<'_, JarIndex> {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// An owned copy of the current index.
    pub fn snapshot(&self) -> JarIndex {
        self.read().clone()
    }

    pub fn rename_classes(&self, renames: &ClassRenames) -> Result<(), RenameError> {
        self.replace_with(|index| index.rename_classes(renames))?;
        info!(renames = renames.len(), "renamed classes");
        Ok(())
    }

    pub fn rename_methods(&self, renames: &MethodRenames) -> Result<(), RenameError> {
        self.replace_with(|index| index.rename_methods(renames))
    }

    fn replace_with<F>(&self, rename: F) -> Result<(), RenameError>
    where
        F: FnOnce(&JarIndex) -> Result<JarIndex, RenameError>,
    {
        let _writer = self
            .writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        // No other writer runs until `_writer` drops, so the copy stays current.
        let renamed = rename(&self.read())?;
        *self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = renamed;
        Ok(())
    }
}
