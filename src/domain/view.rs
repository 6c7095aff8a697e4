//! Rendered view projection and store reconciliation
//!
//! The view is a regenerated projection of the store: after every structural
//! mutation the whole fragment tree is discarded and rebuilt with fresh
//! position-derived paths, rather than patched in place. Presentation state
//! (expanded/collapsed) survives rebuilds keyed by the stable arena index,
//! never by path, which removes the stale-path class of bugs after
//! insertions and deletions.

use std::collections::HashSet;

use generational_arena::Index;
use termtree::Tree;
use tracing::{debug, instrument};

use crate::domain::error::DomainResult;
use crate::domain::path::NodePath;
use crate::domain::store::TaxonomyStore;

/// One rendered node: presentation state plus an editable name buffer.
///
/// `path` is derived from array position at render time and is only valid
/// against the snapshot it was rendered from. `name` is the view's editable
/// text; it starts as the store name and may drift until committed or
/// reconciled at export.
#[derive(Debug, Clone)]
pub struct ViewNode {
    /// Stable identity of the underlying store node
    pub id: Index,
    /// Position-derived path, valid for this render only
    pub path: NodePath,
    /// Editable name text (may hold an uncommitted edit)
    pub name: String,
    pub code: Option<String>,
    /// Nesting depth, root = 1
    pub depth: usize,
    pub expanded: bool,
    /// Visibility under the current depth filter
    pub visible: bool,
    pub has_children: bool,
    pub children: Vec<ViewNode>,
}

impl ViewNode {
    fn label(&self) -> String {
        let affordance = if self.has_children {
            if self.expanded {
                " [-]"
            } else {
                " [+]"
            }
        } else {
            ""
        };
        match &self.code {
            Some(code) => format!("{} [{}] {}{}", self.path, code, self.name, affordance),
            None => format!("{} {}{}", self.path, self.name, affordance),
        }
    }

    fn to_display_tree(&self) -> Tree<String> {
        let leaves: Vec<_> = if self.expanded {
            self.children
                .iter()
                .filter(|child| child.visible)
                .map(|child| child.to_display_tree())
                .collect()
        } else {
            Vec::new()
        };
        Tree::new(self.label()).with_leaves(leaves)
    }
}

/// The rendered projection of the whole taxonomy.
#[derive(Debug, Default)]
pub struct ViewTree {
    pub roots: Vec<ViewNode>,
    /// Expanded state, keyed by stable node identity
    expanded: HashSet<Index>,
}

impl ViewTree {
    /// Renders a fresh projection of the store, everything collapsed.
    pub fn render(store: &TaxonomyStore) -> Self {
        let mut view = Self::default();
        view.rebuild(store);
        view
    }

    /// Discards the current fragment tree and regenerates it from the store.
    ///
    /// Paths are re-derived from sibling positions; freshly rendered nodes
    /// default to collapsed. Expanded state is carried over by stable id;
    /// ids that left the store, and nodes that lost their last child, lose
    /// their expanded state (the affordance is retracted).
    #[instrument(level = "debug", skip_all)]
    pub fn rebuild(&mut self, store: &TaxonomyStore) {
        let arena = store.arena();
        self.expanded.retain(|&id| {
            arena
                .get_node(id)
                .map(|n| !n.children.is_empty())
                .unwrap_or(false)
        });
        self.roots = arena
            .roots()
            .iter()
            .enumerate()
            .map(|(i, &idx)| self.build_node(store, idx, NodePath::new(vec![i]), 1))
            .collect();
        debug!("rebuild: {} root fragments", self.roots.len());
    }

    fn build_node(
        &self,
        store: &TaxonomyStore,
        idx: Index,
        path: NodePath,
        depth: usize,
    ) -> ViewNode {
        // Rebuild is only called with live indices, but a desynchronized id
        // must not panic the render.
        let (name, code, child_ids) = match store.arena().get_node(idx) {
            Some(node) => (
                node.data.name.clone(),
                node.data.code.clone(),
                node.children.clone(),
            ),
            None => (String::new(), None, Vec::new()),
        };
        let children: Vec<ViewNode> = child_ids
            .iter()
            .enumerate()
            .map(|(i, &child)| self.build_node(store, child, path.child(i), depth + 1))
            .collect();
        ViewNode {
            id: idx,
            name,
            code,
            depth,
            expanded: self.expanded.contains(&idx),
            visible: true,
            has_children: !children.is_empty(),
            children,
            path,
        }
    }

    pub fn node_at(&self, path: &NodePath) -> Option<&ViewNode> {
        let mut nodes = &self.roots;
        let mut found = None;
        for &index in path.indices() {
            let node = nodes.get(index)?;
            nodes = &node.children;
            found = Some(node);
        }
        found
    }

    pub fn node_at_mut(&mut self, path: &NodePath) -> Option<&mut ViewNode> {
        let (parent, last) = path.split_last().ok()?;
        let mut nodes = &mut self.roots;
        for &index in parent.indices() {
            nodes = &mut nodes.get_mut(index)?.children;
        }
        nodes.get_mut(last)
    }

    /// Flips the expanded flag for the view node at `path`.
    ///
    /// Pure presentation; never touches the store. Nodes without children
    /// have no affordance to toggle.
    pub fn toggle(&mut self, path: &NodePath) {
        let mut toggled = None;
        if let Some(node) = self.node_at_mut(path) {
            if node.has_children {
                node.expanded = !node.expanded;
                toggled = Some((node.id, node.expanded));
            }
        }
        if let Some((id, expanded)) = toggled {
            if expanded {
                self.expanded.insert(id);
            } else {
                self.expanded.remove(&id);
            }
        }
    }

    pub fn expand_all(&mut self) {
        let expanded = &mut self.expanded;
        for root in &mut self.roots {
            Self::set_expanded_recursive(root, expanded, true);
        }
    }

    pub fn collapse_all(&mut self) {
        let expanded = &mut self.expanded;
        for root in &mut self.roots {
            Self::set_expanded_recursive(root, expanded, false);
        }
    }

    fn set_expanded_recursive(node: &mut ViewNode, expanded: &mut HashSet<Index>, on: bool) {
        if node.has_children {
            node.expanded = on;
            if on {
                expanded.insert(node.id);
            } else {
                expanded.remove(&node.id);
            }
        }
        for child in &mut node.children {
            Self::set_expanded_recursive(child, expanded, on);
        }
    }

    /// Records a view-only edit of the name text, as typed into the
    /// editable field before any commit. Reconciled at export.
    pub fn set_pending_text(&mut self, path: &NodePath, text: &str) -> bool {
        match self.node_at_mut(path) {
            Some(node) => {
                node.name = text.to_string();
                true
            }
            None => false,
        }
    }

    /// The single point where a view-level name edit becomes a store
    /// mutation. Committing unchanged text twice is a semantic no-op.
    #[instrument(level = "debug", skip(self, store))]
    pub fn commit_rename(
        &mut self,
        store: &mut TaxonomyStore,
        path: &NodePath,
        text: &str,
    ) -> DomainResult<()> {
        store.rename(path, text)?;
        // No structural change: sync this node's buffer in place.
        if let Some(node) = self.node_at_mut(path) {
            node.name = text.trim().to_string();
        }
        Ok(())
    }

    /// Inserts a child in the store, then discards and re-renders the
    /// fragment tree with fresh indices and expands the parent so the new
    /// trailing child is visible.
    #[instrument(level = "debug", skip(self, store))]
    pub fn commit_insert_child(
        &mut self,
        store: &mut TaxonomyStore,
        parent_path: &NodePath,
        name: &str,
    ) -> DomainResult<NodePath> {
        let idx = store.insert_child(parent_path, name)?;
        if let Ok(parent_idx) = store.resolve(parent_path) {
            self.expanded.insert(parent_idx);
        }
        self.rebuild(store);
        store.arena().path_of(idx)
    }

    /// Deletes the subtree in the store, then re-renders so every
    /// later-sibling fragment carries its re-derived (shifted) path. A
    /// parent left childless loses its expand affordance and state.
    #[instrument(level = "debug", skip(self, store))]
    pub fn commit_delete(&mut self, store: &mut TaxonomyStore, path: &NodePath) -> DomainResult<()> {
        store.delete_subtree(path)?;
        self.rebuild(store);
        Ok(())
    }

    /// Walks every rendered node depth-first, parents before children.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a ViewNode)) {
        fn go<'a>(node: &'a ViewNode, f: &mut impl FnMut(&'a ViewNode)) {
            f(node);
            for child in &node.children {
                go(child, f);
            }
        }
        for root in &self.roots {
            go(root, f);
        }
    }

    pub(crate) fn walk_mut(&mut self, f: &mut impl FnMut(&mut ViewNode)) {
        fn go(node: &mut ViewNode, f: &mut impl FnMut(&mut ViewNode)) {
            f(node);
            for child in &mut node.children {
                go(child, f);
            }
        }
        for root in &mut self.roots {
            go(root, f);
        }
    }

    pub(crate) fn clear_expanded(&mut self, id: Index) {
        self.expanded.remove(&id);
    }

    /// Renders the visible projection as an indented terminal tree.
    pub fn to_display_string(&self) -> String {
        let mut out = String::new();
        for root in &self.roots {
            if root.visible {
                out.push_str(&root.to_display_tree().to_string());
            }
        }
        out
    }
}
