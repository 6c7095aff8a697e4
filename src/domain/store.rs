//! Canonical taxonomy store
//!
//! Owns the authoritative tree. All mutations go through path-qualified
//! operations; other components hold read projections only. Every operation
//! is synchronous, deterministic against the current snapshot, and
//! all-or-nothing: a failed resolution leaves the store unmodified.

use generational_arena::Index;
use tracing::{debug, instrument};

use crate::domain::arena::{TaxonArena, TaxonData};
use crate::domain::entities::Taxon;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::path::NodePath;

/// JSON indentation for the persisted form.
const EXPORT_INDENT: &str = "  ";

#[derive(Debug, Default)]
pub struct TaxonomyStore {
    arena: TaxonArena,
}

impl TaxonomyStore {
    /// Parses the serialized taxonomy into a new store.
    ///
    /// The root must be a JSON array of nodes; each node needs a `name`,
    /// while `code` and `children` default to absent/empty. Any other shape
    /// is `MalformedInput` and no tree is constructed.
    #[instrument(level = "debug", skip(input))]
    pub fn load(input: &str) -> DomainResult<Self> {
        let taxa: Vec<Taxon> =
            serde_json::from_str(input).map_err(|e| DomainError::MalformedInput {
                reason: e.to_string(),
            })?;
        debug!("load: {} root nodes", taxa.len());

        let mut arena = TaxonArena::new();
        for taxon in &taxa {
            Self::insert_recursive(&mut arena, taxon, None);
        }
        Ok(Self { arena })
    }

    fn insert_recursive(arena: &mut TaxonArena, taxon: &Taxon, parent: Option<Index>) {
        let idx = arena.insert_node(
            TaxonData {
                name: taxon.name.clone(),
                code: taxon.code.clone(),
            },
            parent,
        );
        for child in &taxon.children {
            Self::insert_recursive(arena, child, Some(idx));
        }
    }

    pub fn arena(&self) -> &TaxonArena {
        &self.arena
    }

    pub fn resolve(&self, path: &NodePath) -> DomainResult<Index> {
        self.arena.resolve(path)
    }

    pub fn name_of(&self, idx: Index) -> Option<&str> {
        self.arena.get_node(idx).map(|n| n.data.name.as_str())
    }

    /// Replaces the node's name with the trimmed text.
    ///
    /// Empty results are accepted; callers wanting non-empty enforcement
    /// check before calling.
    #[instrument(level = "debug", skip(self))]
    pub fn rename(&mut self, path: &NodePath, new_name: &str) -> DomainResult<()> {
        let idx = self.arena.resolve(path)?;
        let node = self
            .arena
            .get_node_mut(idx)
            .ok_or_else(|| DomainError::PathNotFound(path.clone()))?;
        node.data.name = new_name.trim().to_string();
        Ok(())
    }

    /// Appends a new leaf to the end of the parent's children.
    ///
    /// Fails with `EmptyName` before touching the tree if the trimmed name
    /// is empty, and `PathNotFound` if the parent does not resolve.
    #[instrument(level = "debug", skip(self))]
    pub fn insert_child(&mut self, parent_path: &NodePath, name: &str) -> DomainResult<Index> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(DomainError::EmptyName);
        }
        let parent = self.arena.resolve(parent_path)?;
        let idx = self.arena.insert_node(
            TaxonData {
                name: trimmed.to_string(),
                code: None,
            },
            Some(parent),
        );
        debug!("insert_child: appended under {}", parent_path);
        Ok(idx)
    }

    /// Removes the node at the path together with its entire subtree.
    ///
    /// Deleting a root node (length-1 path) is valid and removes it from the
    /// root sequence. Positional paths of later siblings in the containing
    /// sequence become stale; callers re-render before reusing any path.
    #[instrument(level = "debug", skip(self))]
    pub fn delete_subtree(&mut self, path: &NodePath) -> DomainResult<TaxonData> {
        let idx = self.arena.resolve(path)?;
        self.arena
            .remove_subtree(idx)
            .ok_or_else(|| DomainError::PathNotFound(path.clone()))
    }

    /// Reads the store back into the wire form, preserving sibling order.
    pub fn to_taxa(&self) -> Vec<Taxon> {
        self.arena
            .roots()
            .iter()
            .filter_map(|&idx| self.taxon_at(idx))
            .collect()
    }

    fn taxon_at(&self, idx: Index) -> Option<Taxon> {
        let node = self.arena.get_node(idx)?;
        Some(Taxon {
            name: node.data.name.clone(),
            code: node.data.code.clone(),
            children: node
                .children
                .iter()
                .filter_map(|&child| self.taxon_at(child))
                .collect(),
        })
    }

    /// Deterministic, human-readably indented encoding of the tree.
    ///
    /// Emits `code` only when present and never emits view state.
    #[instrument(level = "debug", skip(self))]
    pub fn serialize(&self) -> DomainResult<String> {
        let taxa = self.to_taxa();
        let mut buf = Vec::new();
        let formatter =
            serde_json::ser::PrettyFormatter::with_indent(EXPORT_INDENT.as_bytes());
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        serde::Serialize::serialize(&taxa, &mut ser)
            .map_err(|e| DomainError::Serialize(e.to_string()))?;
        String::from_utf8(buf).map_err(|e| DomainError::Serialize(e.to_string()))
    }
}
