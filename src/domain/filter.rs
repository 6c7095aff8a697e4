//! Depth-based visibility filter
//!
//! Filtering acts on the rendered view only; the store is never touched.
//! The two-pass order is load-bearing: first hide every node deeper than
//! the cap, then walk up from each survivor and force its ancestors
//! visible. Hiding without the second pass would cut ancestor chains that
//! still have visible descendants.

use std::fmt;
use std::str::FromStr;

use tracing::instrument;

use crate::domain::view::{ViewNode, ViewTree};

/// Maximum visible depth, `All` meaning unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelCap {
    All,
    Max(usize),
}

impl Default for LevelCap {
    fn default() -> Self {
        Self::All
    }
}

impl fmt::Display for LevelCap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelCap::All => write!(f, "all"),
            LevelCap::Max(n) => write!(f, "{n}"),
        }
    }
}

impl FromStr for LevelCap {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("all") {
            return Ok(LevelCap::All);
        }
        match trimmed.parse::<usize>() {
            Ok(n) if n >= 1 => Ok(LevelCap::Max(n)),
            _ => Err(format!("invalid level: {trimmed:?} (expected 1..N or \"all\")")),
        }
    }
}

/// Applies the depth cap to the rendered view. Idempotent.
///
/// With a finite cap, nodes exactly at the cap are additionally forced into
/// the collapsed presentation so deeper structure is not visually implied;
/// deeper data is untouched.
#[instrument(level = "debug", skip(view))]
pub fn apply_filter(view: &mut ViewTree, cap: LevelCap) {
    let max = match cap {
        LevelCap::All => usize::MAX,
        LevelCap::Max(n) => n,
    };

    // Pass 1: hide strictly deeper than the cap.
    view.walk_mut(&mut |node| {
        node.visible = node.depth <= max;
    });

    // Pass 2: force ancestors of every surviving node visible.
    for root in &mut view.roots {
        force_visible_ancestors(root);
    }

    if let LevelCap::Max(n) = cap {
        let mut at_cap = Vec::new();
        view.walk_mut(&mut |node| {
            if node.depth == n && node.expanded {
                node.expanded = false;
                at_cap.push(node.id);
            }
        });
        for id in at_cap {
            view.clear_expanded(id);
        }
    }
}

/// Returns whether any node in the subtree is visible; re-shows the node
/// itself when a descendant survived the depth pass.
fn force_visible_ancestors(node: &mut ViewNode) -> bool {
    let mut any_descendant = false;
    for child in &mut node.children {
        if force_visible_ancestors(child) {
            any_descendant = true;
        }
    }
    if any_descendant {
        node.visible = true;
    }
    node.visible || any_descendant
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::path::NodePath;
    use crate::domain::store::TaxonomyStore;

    fn chain_view() -> (TaxonomyStore, ViewTree) {
        let store = TaxonomyStore::load(
            r#"[{"name": "root", "children": [
                {"name": "mid", "children": [{"name": "leaf"}]}
            ]}]"#,
        )
        .unwrap();
        let view = ViewTree::render(&store);
        (store, view)
    }

    fn visible_names(view: &ViewTree) -> Vec<String> {
        let mut names = Vec::new();
        view.walk(&mut |node| {
            if node.visible {
                names.push(node.name.clone());
            }
        });
        names
    }

    #[test]
    fn test_unbounded_shows_everything() {
        let (_, mut view) = chain_view();
        apply_filter(&mut view, LevelCap::All);
        assert_eq!(visible_names(&view), vec!["root", "mid", "leaf"]);
    }

    #[test]
    fn test_cap_one_shows_only_root() {
        let (_, mut view) = chain_view();
        apply_filter(&mut view, LevelCap::Max(1));
        assert_eq!(visible_names(&view), vec!["root"]);
    }

    #[test]
    fn test_cap_two_hides_leaf_and_collapses_mid() {
        let (_, mut view) = chain_view();
        view.expand_all();
        apply_filter(&mut view, LevelCap::Max(2));
        assert_eq!(visible_names(&view), vec!["root", "mid"]);
        let mid = view.node_at(&NodePath::new(vec![0, 0])).unwrap();
        assert!(!mid.expanded, "node at the cap must be forced collapsed");
    }

    #[test]
    fn test_filter_is_idempotent() {
        let (_, mut view) = chain_view();
        apply_filter(&mut view, LevelCap::Max(2));
        let first = visible_names(&view);
        apply_filter(&mut view, LevelCap::Max(2));
        assert_eq!(visible_names(&view), first);
    }

    #[test]
    fn test_relaxing_cap_reshows_hidden_nodes() {
        let (_, mut view) = chain_view();
        apply_filter(&mut view, LevelCap::Max(1));
        apply_filter(&mut view, LevelCap::All);
        assert_eq!(visible_names(&view), vec!["root", "mid", "leaf"]);
    }

    #[test]
    fn test_cap_parse() {
        assert_eq!("all".parse::<LevelCap>().unwrap(), LevelCap::All);
        assert_eq!("3".parse::<LevelCap>().unwrap(), LevelCap::Max(3));
        assert!("0".parse::<LevelCap>().is_err());
        assert!("deep".parse::<LevelCap>().is_err());
    }
}
