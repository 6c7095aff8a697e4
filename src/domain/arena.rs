use std::collections::BTreeMap;
use std::fmt;

use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::path::NodePath;

/// Data payload for taxonomy nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonData {
    /// Display name, free-form
    pub name: String,
    /// Optional classification code, e.g. "01.2"
    pub code: Option<String>,
}

impl fmt::Display for TaxonData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "[{}] {}", code, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Tree node in the arena-based taxonomy structure.
#[derive(Debug)]
pub struct ArenaNode {
    /// Taxon data for this node
    pub data: TaxonData,
    /// Index of parent node in the arena, None for root nodes
    pub parent: Option<Index>,
    /// Indices of child nodes in the arena, sibling order is significant
    pub children: Vec<Index>,
}

/// Arena-based tree for the taxonomy hierarchy.
///
/// Uses a generational arena so every node carries a stable opaque identity
/// from creation to removal, independent of its sibling position. Positional
/// paths are resolved against the arena on demand and never stored in it.
/// Unlike a single-rooted hierarchy, the taxonomy is an ordered forest:
/// the root sequence may hold any number of top-level nodes.
#[derive(Debug)]
pub struct TaxonArena {
    /// Arena storage for all tree nodes
    arena: Arena<ArenaNode>,
    /// Indices of root nodes, in sibling order
    roots: Vec<Index>,
}

impl Default for TaxonArena {
    fn default() -> Self {
        Self::new()
    }
}

impl TaxonArena {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            roots: Vec::new(),
        }
    }

    /// Appends a node to the end of the parent's children (root sequence
    /// when `parent` is None). Append-only: there is no positional insert.
    #[instrument(level = "trace", skip(self))]
    pub fn insert_node(&mut self, data: TaxonData, parent: Option<Index>) -> Index {
        let node = ArenaNode {
            data,
            parent,
            children: Vec::new(),
        };
        let node_idx = self.arena.insert(node);

        match parent {
            Some(parent_idx) => {
                if let Some(parent) = self.arena.get_mut(parent_idx) {
                    parent.children.push(node_idx);
                }
            }
            None => self.roots.push(node_idx),
        }

        node_idx
    }

    pub fn get_node(&self, idx: Index) -> Option<&ArenaNode> {
        self.arena.get(idx)
    }

    pub fn get_node_mut(&mut self, idx: Index) -> Option<&mut ArenaNode> {
        self.arena.get_mut(idx)
    }

    pub fn contains(&self, idx: Index) -> bool {
        self.arena.contains(idx)
    }

    /// Root indices in sibling order.
    pub fn roots(&self) -> &[Index] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Children of `parent`, or the root sequence when `parent` is None.
    pub fn children_of(&self, parent: Option<Index>) -> &[Index] {
        match parent {
            None => &self.roots,
            Some(idx) => self
                .arena
                .get(idx)
                .map(|n| n.children.as_slice())
                .unwrap_or(&[]),
        }
    }

    /// Resolves a positional path to the node's stable index.
    ///
    /// Walks the sibling indices from the root sequence. Fails with
    /// `PathNotFound` if any index is out of range at any depth; the empty
    /// path addresses the root sequence, not a node, and also fails.
    #[instrument(level = "trace", skip(self))]
    pub fn resolve(&self, path: &NodePath) -> DomainResult<Index> {
        if path.is_empty() {
            return Err(DomainError::PathNotFound(path.clone()));
        }
        let mut parent: Option<Index> = None;
        let mut current = None;
        for &sibling_index in path.indices() {
            let siblings = self.children_of(parent);
            match siblings.get(sibling_index) {
                Some(&idx) => {
                    current = Some(idx);
                    parent = Some(idx);
                }
                None => return Err(DomainError::PathNotFound(path.clone())),
            }
        }
        // Loop ran at least once, so current is set.
        current.ok_or_else(|| DomainError::PathNotFound(path.clone()))
    }

    /// Derives the positional path of a node from its current position.
    pub fn path_of(&self, idx: Index) -> DomainResult<NodePath> {
        let mut indices = Vec::new();
        let mut current = idx;
        loop {
            let row = self
                .row_of(current)
                .ok_or_else(|| DomainError::InvalidPath(format!("detached node {current:?}")))?;
            indices.push(row);
            match self.arena.get(current).and_then(|n| n.parent) {
                Some(parent) => current = parent,
                None => break,
            }
        }
        indices.reverse();
        Ok(NodePath::new(indices))
    }

    /// Position of a node among its siblings.
    pub fn row_of(&self, idx: Index) -> Option<usize> {
        let parent = self.arena.get(idx)?.parent;
        self.children_of(parent).iter().position(|&c| c == idx)
    }

    /// Removes a node and its entire subtree.
    ///
    /// Detaches the node from its containing sibling sequence first, so
    /// positional paths of later siblings shift down by one and must be
    /// re-derived by callers. Returns the removed node's data.
    #[instrument(level = "trace", skip(self))]
    pub fn remove_subtree(&mut self, idx: Index) -> Option<TaxonData> {
        match self.arena.get(idx) {
            Some(node) => match node.parent {
                Some(parent_idx) => {
                    if let Some(parent) = self.arena.get_mut(parent_idx) {
                        parent.children.retain(|&child| child != idx);
                    }
                }
                None => self.roots.retain(|&root| root != idx),
            },
            None => return None,
        }
        self.remove_detached(idx)
    }

    fn remove_detached(&mut self, idx: Index) -> Option<TaxonData> {
        let node = self.arena.remove(idx)?;
        for child in node.children {
            self.remove_detached(child);
        }
        Some(node.data)
    }

    /// Maximum nesting depth of the forest (root level = 1, empty = 0).
    pub fn depth(&self) -> usize {
        self.roots
            .iter()
            .map(|&root| self.subtree_depth(root))
            .max()
            .unwrap_or(0)
    }

    fn subtree_depth(&self, idx: Index) -> usize {
        match self.arena.get(idx) {
            Some(node) => {
                1 + node
                    .children
                    .iter()
                    .map(|&child| self.subtree_depth(child))
                    .max()
                    .unwrap_or(0)
            }
            None => 0,
        }
    }

    /// Number of nodes per depth level (root level = 1).
    #[instrument(level = "debug", skip(self))]
    pub fn level_counts(&self) -> BTreeMap<usize, usize> {
        let mut counts = BTreeMap::new();
        for (_, _, depth) in self.iter() {
            *counts.entry(depth).or_insert(0) += 1;
        }
        counts
    }

    /// Pre-order iterator over the forest, left-to-right, with depth (root = 1).
    pub fn iter(&self) -> PreOrderIterator {
        PreOrderIterator::new(self)
    }
}

pub struct PreOrderIterator<'a> {
    arena: &'a TaxonArena,
    stack: Vec<(Index, usize)>,
}

impl<'a> PreOrderIterator<'a> {
    fn new(arena: &'a TaxonArena) -> Self {
        let stack = arena
            .roots()
            .iter()
            .rev()
            .map(|&idx| (idx, 1))
            .collect();
        Self { arena, stack }
    }
}

impl<'a> Iterator for PreOrderIterator<'a> {
    type Item = (Index, &'a ArenaNode, usize);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, depth)) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push((child, depth + 1));
                }
                return Some((current_idx, node, depth));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn taxon(name: &str) -> TaxonData {
        TaxonData {
            name: name.to_string(),
            code: None,
        }
    }

    // root_a          root_b
    // ├── child1
    // │   └── grandchild
    // └── child2
    fn sample_arena() -> TaxonArena {
        let mut arena = TaxonArena::new();
        let root_a = arena.insert_node(taxon("root_a"), None);
        arena.insert_node(taxon("root_b"), None);
        let child1 = arena.insert_node(taxon("child1"), Some(root_a));
        arena.insert_node(taxon("child2"), Some(root_a));
        arena.insert_node(taxon("grandchild"), Some(child1));
        arena
    }

    #[test]
    fn test_resolve_walks_sibling_indices() {
        let arena = sample_arena();
        let idx = arena.resolve(&NodePath::new(vec![0, 0, 0])).unwrap();
        assert_eq!(arena.get_node(idx).unwrap().data.name, "grandchild");
    }

    #[test]
    fn test_resolve_empty_path_is_not_found() {
        let arena = sample_arena();
        assert!(matches!(
            arena.resolve(&NodePath::root()),
            Err(DomainError::PathNotFound(_))
        ));
    }

    #[test]
    fn test_resolve_out_of_range_is_not_found() {
        let arena = sample_arena();
        assert!(arena.resolve(&NodePath::new(vec![0, 5])).is_err());
        assert!(arena.resolve(&NodePath::new(vec![9])).is_err());
    }

    #[test]
    fn test_path_of_inverts_resolve() {
        let arena = sample_arena();
        for (idx, _, _) in arena.iter() {
            let path = arena.path_of(idx).unwrap();
            assert_eq!(arena.resolve(&path).unwrap(), idx);
        }
    }

    #[test]
    fn test_remove_subtree_reindexes_roots() {
        let mut arena = sample_arena();
        let root_a = arena.resolve(&NodePath::new(vec![0])).unwrap();
        arena.remove_subtree(root_a);
        let idx = arena.resolve(&NodePath::new(vec![0])).unwrap();
        assert_eq!(arena.get_node(idx).unwrap().data.name, "root_b");
    }

    #[test]
    fn test_remove_subtree_removes_descendants() {
        let mut arena = sample_arena();
        let child1 = arena.resolve(&NodePath::new(vec![0, 0])).unwrap();
        let grandchild = arena.resolve(&NodePath::new(vec![0, 0, 0])).unwrap();
        arena.remove_subtree(child1);
        assert!(!arena.contains(child1));
        assert!(!arena.contains(grandchild));
    }

    #[test]
    fn test_depth_and_level_counts() {
        let arena = sample_arena();
        assert_eq!(arena.depth(), 3);
        let counts = arena.level_counts();
        assert_eq!(counts.get(&1), Some(&2));
        assert_eq!(counts.get(&2), Some(&2));
        assert_eq!(counts.get(&3), Some(&1));
    }
}
