//! Export service: reconcile pending view edits, then serialize
//!
//! An edit can live in the view without ever having been committed (the
//! field still focused, no blur observed). Export therefore walks the
//! rendered fragments in parallel with the store by position, writes any
//! divergent name text into the store, and only then serializes. No commit
//! event is required to have fired.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{TaxonomyStore, ViewTree};
use crate::infrastructure::traits::FileSystem;

/// Default export file name.
pub const DEFAULT_EXPORT_FILE: &str = "taxonomy_updated.json";

pub struct ExportService {
    fs: Arc<dyn FileSystem>,
}

impl ExportService {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Copies every view-side name edit that differs from the store into
    /// the store. Depth-first, parent before children, using the same
    /// position-derived paths the view was rendered with.
    #[instrument(level = "debug", skip_all)]
    pub fn reconcile(store: &mut TaxonomyStore, view: &ViewTree) -> ApplicationResult<()> {
        let mut pending = Vec::new();
        view.walk(&mut |node| {
            let differs = store
                .resolve(&node.path)
                .ok()
                .and_then(|idx| store.name_of(idx))
                .map(|name| name != node.name)
                .unwrap_or(false);
            if differs {
                pending.push((node.path.clone(), node.name.clone()));
            }
        });
        debug!("reconcile: {} pending view edits", pending.len());
        for (path, text) in pending {
            store.rename(&path, &text)?;
        }
        Ok(())
    }

    /// Reconciles and returns the serialized taxonomy. Same format as
    /// `TaxonomyStore::serialize`.
    pub fn export(store: &mut TaxonomyStore, view: &ViewTree) -> ApplicationResult<String> {
        Self::reconcile(store, view)?;
        Ok(store.serialize()?)
    }

    /// Reconciles and writes the serialized taxonomy to `target`.
    #[instrument(level = "debug", skip(self, store, view))]
    pub fn export_to_file(
        &self,
        store: &mut TaxonomyStore,
        view: &ViewTree,
        target: &Path,
    ) -> ApplicationResult<()> {
        let serialized = Self::export(store, view)?;
        self.fs
            .ensure_parent(target)
            .and_then(|_| self.fs.write(target, &serialized))
            .map_err(|e| ApplicationError::OperationFailed {
                context: format!("write export file {}", target.display()),
                source: Box::new(e),
            })
    }
}
