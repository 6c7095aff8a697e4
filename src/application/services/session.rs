//! Editor session: the owned context object for one load→edit→export cycle
//!
//! Owns the canonical store and its rendered view, and dispatches every
//! interaction. Handlers run synchronously to completion, one at a time, so
//! the store is never observed in a partially-mutated state. The only
//! user-facing "cancel" is a pre-mutation prompt: declined confirmation or
//! empty input means the operation never starts.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::services::export::ExportService;
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{apply_filter, DomainError, LevelCap, NodePath, TaxonomyStore, ViewTree};
use crate::infrastructure::traits::{FileSystem, Prompter};

/// Outcome of an operation guarded by a user prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptedOutcome {
    Applied,
    /// User declined or supplied empty input; nothing was mutated.
    Cancelled,
}

pub struct EditorSession {
    store: TaxonomyStore,
    view: ViewTree,
    cap: LevelCap,
}

impl EditorSession {
    /// Loads the serialized taxonomy and renders the initial view.
    ///
    /// Malformed input is fatal: no session is constructed.
    #[instrument(level = "debug", skip(input))]
    pub fn load(input: &str, cap: LevelCap) -> ApplicationResult<Self> {
        let store = TaxonomyStore::load(input)?;
        let mut view = ViewTree::render(&store);
        apply_filter(&mut view, cap);
        Ok(Self { store, view, cap })
    }

    pub fn view(&self) -> &ViewTree {
        &self.view
    }

    pub fn store(&self) -> &TaxonomyStore {
        &self.store
    }

    pub fn cap(&self) -> LevelCap {
        self.cap
    }

    /// Per-level node counts for the stats display.
    pub fn level_counts(&self) -> BTreeMap<usize, usize> {
        self.store.arena().level_counts()
    }

    pub fn toggle(&mut self, path: &NodePath) {
        self.view.toggle(path);
    }

    pub fn expand_all(&mut self) {
        self.view.expand_all();
        apply_filter(&mut self.view, self.cap);
    }

    pub fn collapse_all(&mut self) {
        self.view.collapse_all();
    }

    /// Changes the depth filter and re-applies it to the rendered view.
    pub fn set_level(&mut self, cap: LevelCap) {
        debug!("set_level: {cap}");
        self.cap = cap;
        apply_filter(&mut self.view, cap);
    }

    pub fn rename(&mut self, path: &NodePath, text: &str) -> ApplicationResult<()> {
        self.view.commit_rename(&mut self.store, path, text)?;
        Ok(())
    }

    pub fn insert_child(&mut self, parent: &NodePath, name: &str) -> ApplicationResult<NodePath> {
        let path = self.view.commit_insert_child(&mut self.store, parent, name)?;
        apply_filter(&mut self.view, self.cap);
        Ok(path)
    }

    /// Insert-child flow with the name obtained from a prompt.
    ///
    /// Cancelled or empty input aborts silently, mirroring a dismissed
    /// dialog: no mutation, no error.
    #[instrument(level = "debug", skip(self, prompter))]
    pub fn insert_child_prompting(
        &mut self,
        parent: &NodePath,
        prompter: &dyn Prompter,
    ) -> ApplicationResult<PromptedOutcome> {
        let answer = prompter
            .input("Name for the new child node:")
            .map_err(|e| ApplicationError::OperationFailed {
                context: "read child name".to_string(),
                source: Box::new(e),
            })?;
        match answer {
            Some(name) if !name.trim().is_empty() => {
                self.insert_child(parent, &name)?;
                Ok(PromptedOutcome::Applied)
            }
            _ => Ok(PromptedOutcome::Cancelled),
        }
    }

    pub fn delete(&mut self, path: &NodePath) -> ApplicationResult<()> {
        self.view.commit_delete(&mut self.store, path)?;
        apply_filter(&mut self.view, self.cap);
        Ok(())
    }

    /// Delete flow guarded by explicit confirmation.
    ///
    /// The node must resolve before the prompt is shown; a declined
    /// confirmation leaves store and view byte-for-byte unchanged.
    #[instrument(level = "debug", skip(self, prompter))]
    pub fn delete_with_confirmation(
        &mut self,
        path: &NodePath,
        prompter: &dyn Prompter,
    ) -> ApplicationResult<PromptedOutcome> {
        let idx = self.store.resolve(path)?;
        let name = self
            .store
            .name_of(idx)
            .unwrap_or("this node")
            .to_string();
        let confirmed = prompter
            .confirm(&format!(
                "Delete \"{name}\" and all its children?"
            ))
            .map_err(|e| ApplicationError::OperationFailed {
                context: "read delete confirmation".to_string(),
                source: Box::new(e),
            })?;
        if !confirmed {
            debug!("delete_with_confirmation: declined, no-op");
            return Ok(PromptedOutcome::Cancelled);
        }
        self.delete(path)?;
        Ok(PromptedOutcome::Applied)
    }

    /// Records typed-but-uncommitted name text on a view node.
    pub fn set_pending_text(&mut self, path: &NodePath, text: &str) -> ApplicationResult<()> {
        if self.view.set_pending_text(path, text) {
            Ok(())
        } else {
            Err(DomainError::PathNotFound(path.clone()).into())
        }
    }

    /// Reconciles pending view edits into the store and returns the
    /// serialized taxonomy.
    pub fn export(&mut self) -> ApplicationResult<String> {
        ExportService::export(&mut self.store, &self.view)
    }

    /// Reconciles and writes the export file.
    pub fn export_to_file(
        &mut self,
        fs: Arc<dyn FileSystem>,
        target: &Path,
    ) -> ApplicationResult<()> {
        ExportService::new(fs).export_to_file(&mut self.store, &self.view, target)
    }

    /// Renders the current visible projection for the terminal.
    pub fn display(&self) -> String {
        self.view.to_display_string()
    }
}
