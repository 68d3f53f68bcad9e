use crate::dataset::Dataset;
use crate::error::Result;
use crate::loader;
use log::{error, info};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

/// Memoized sales dataset.
///
/// The file is read on the first `get` and the result is shared by every
/// later render pass. Failed loads are not cached, so fixing the file and
/// refreshing the page is enough to recover.
pub struct DatasetCache {
    path: PathBuf,
    sheet: Option<String>,
    slot: RwLock<Option<Arc<Dataset>>>,
}

impl DatasetCache {
    pub fn new(path: impl Into<PathBuf>, sheet: Option<String>) -> Self {
        DatasetCache {
            path: path.into(),
            sheet,
            slot: RwLock::new(None),
        }
    }

    /// Wraps an already loaded dataset. Used by the terminal report and tests.
    pub fn preloaded(path: impl Into<PathBuf>, dataset: Dataset) -> Self {
        DatasetCache {
            path: path.into(),
            sheet: None,
            slot: RwLock::new(Some(Arc::new(dataset))),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_loaded(&self) -> bool {
        self.peek().is_some()
    }

    /// The cached dataset, if any. Never reads the file.
    pub fn peek(&self) -> Option<Arc<Dataset>> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(Arc::clone)
    }

    /// Returns the cached dataset, loading it on first use.
    pub fn get(&self) -> Result<Arc<Dataset>> {
        if let Some(data) = self.slot.read().unwrap_or_else(PoisonError::into_inner).as_ref() {
            return Ok(Arc::clone(data));
        }

        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        // Another request may have loaded it while we waited for the lock
        if let Some(data) = slot.as_ref() {
            return Ok(Arc::clone(data));
        }

        match loader::load(&self.path, self.sheet.as_deref()) {
            Ok(data) => {
                let data = Arc::new(data);
                *slot = Some(Arc::clone(&data));
                Ok(data)
            }
            Err(e) => {
                error!("{}", e);
                Err(e)
            }
        }
    }

    /// Drops the cached dataset; the next `get` reads the file again.
    pub fn invalidate(&self) {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        if slot.take().is_some() {
            info!("Dropped cached sales data for {}", self.path.display());
        }
    }
}
