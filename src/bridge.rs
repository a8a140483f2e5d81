//! Symbol index mapping fully qualified logical names to physical files.
//!
//! Built once per scan session, after each file's entity subtree is
//! complete, and read-only afterwards. The index is an explicit value owned
//! by the scan result — there is no ambient global instance — and it is not
//! internally synchronized: concurrent writers must be serialized by the
//! caller.

use crate::analysis::model::{EntityArena, EntityId};
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Qualified-name → file index.
#[derive(Debug, Default)]
pub struct ResourceBridge {
    index: FxHashMap<String, PathBuf>,
}

impl ResourceBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes a file entity and every descendant entity under its key.
    /// Duplicate keys keep the last write; each overwrite is logged so no
    /// collision goes unnoticed.
    pub fn index_file(&mut self, model: &EntityArena, file: EntityId, path: &Path) {
        self.insert(model.entity(file).key.clone(), path);
        for id in model.descendants(file) {
            self.insert(model.entity(id).key.clone(), path);
        }
    }

    fn insert(&mut self, key: String, path: &Path) {
        if let Some(previous) = self.index.insert(key.clone(), path.to_path_buf()) {
            if previous != path {
                warn!(
                    key = %key,
                    previous = %previous.display(),
                    replacement = %path.display(),
                    "duplicate qualified name in index, keeping the last write"
                );
            }
        }
    }

    pub fn lookup(&self, qualified_name: &str) -> Option<&Path> {
        self.index.get(qualified_name).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
