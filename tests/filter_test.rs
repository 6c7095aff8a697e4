//! Tests for the depth-based visibility filter

use rstest::rstest;

use taxedit::domain::{apply_filter, LevelCap, NodePath, TaxonomyStore, ViewTree};
use taxedit::util::testing;

#[ctor::ctor]
fn init() {
    testing::init_test_setup();
}

fn fixture_view() -> (TaxonomyStore, ViewTree) {
    let input = std::fs::read_to_string("tests/resources/taxonomy.json").unwrap();
    let store = TaxonomyStore::load(&input).unwrap();
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

// ============================================================
// Depth caps
// ============================================================

#[rstest]
#[case(LevelCap::Max(1), 3)] // the three kingdoms
#[case(LevelCap::Max(2), 7)] // kingdoms plus phyla
#[case(LevelCap::Max(3), 10)] // everything in the fixture
#[case(LevelCap::All, 10)]
fn given_cap_when_filtering_then_expected_visible_count(
    #[case] cap: LevelCap,
    #[case] expected: usize,
) {
    let (_, mut view) = fixture_view();
    apply_filter(&mut view, cap);
    assert_eq!(visible_names(&view).len(), expected);
}

#[test]
fn given_cap_two_when_filtering_then_classes_hidden_but_phyla_remain() {
    let (_, mut view) = fixture_view();
    apply_filter(&mut view, LevelCap::Max(2));
    let names = visible_names(&view);
    assert!(names.contains(&"Chordata".to_string()));
    assert!(!names.contains(&"Mammalia".to_string()));
    assert!(!names.contains(&"Insecta".to_string()));
}

#[test]
fn given_expanded_node_at_cap_when_filtering_then_forced_collapsed() {
    let (_, mut view) = fixture_view();
    view.expand_all();
    apply_filter(&mut view, LevelCap::Max(2));
    // Chordata sits exactly at the cap and had hidden children.
    let chordata = view.node_at(&NodePath::new(vec![0, 0])).unwrap();
    assert!(chordata.visible);
    assert!(!chordata.expanded);
    // Animalia is above the cap and keeps its expansion.
    assert!(view.node_at(&NodePath::new(vec![0])).unwrap().expanded);
}

#[test]
fn given_capped_view_when_relaxing_then_all_nodes_reshown() {
    let (_, mut view) = fixture_view();
    apply_filter(&mut view, LevelCap::Max(1));
    apply_filter(&mut view, LevelCap::All);
    assert_eq!(visible_names(&view).len(), 10);
}

#[test]
fn given_filter_when_applied_twice_then_result_unchanged() {
    let (_, mut view) = fixture_view();
    apply_filter(&mut view, LevelCap::Max(2));
    let first = visible_names(&view);
    apply_filter(&mut view, LevelCap::Max(2));
    assert_eq!(visible_names(&view), first);
}

#[test]
fn given_filter_when_applied_then_store_untouched() {
    let (store, mut view) = fixture_view();
    let before = store.serialize().unwrap();
    apply_filter(&mut view, LevelCap::Max(1));
    assert_eq!(store.serialize().unwrap(), before);
}

// ============================================================
// Cap parsing
// ============================================================

#[rstest]
#[case("all", LevelCap::All)]
#[case("All", LevelCap::All)]
#[case("1", LevelCap::Max(1))]
#[case(" 4 ", LevelCap::Max(4))]
fn given_valid_text_when_parsing_cap_then_accepted(#[case] text: &str, #[case] expected: LevelCap) {
    assert_eq!(text.parse::<LevelCap>().unwrap(), expected);
}

#[rstest]
#[case("0")]
#[case("-1")]
#[case("deep")]
#[case("")]
fn given_invalid_text_when_parsing_cap_then_rejected(#[case] text: &str) {
    assert!(text.parse::<LevelCap>().is_err());
}
