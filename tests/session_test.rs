//! Tests for the editor session: prompts, cancellation, end-to-end edits

use std::io;
use std::sync::Arc;

use tempfile::TempDir;

use taxedit::application::services::{EditorSession, PromptedOutcome};
use taxedit::domain::{LevelCap, NodePath};
use taxedit::infrastructure::traits::{Prompter, RealFileSystem};
use taxedit::util::testing;

#[ctor::ctor]
fn init() {
    testing::init_test_setup();
}

fn fixture_input() -> String {
    std::fs::read_to_string("tests/resources/taxonomy.json").unwrap()
}

fn session() -> EditorSession {
    EditorSession::load(&fixture_input(), LevelCap::All).unwrap()
}

/// Scripted prompter with fixed answers.
struct MockPrompter {
    confirm_answer: bool,
    input_answer: Option<String>,
}

impl MockPrompter {
    fn confirming(answer: bool) -> Self {
        Self {
            confirm_answer: answer,
            input_answer: None,
        }
    }

    fn answering(text: Option<&str>) -> Self {
        Self {
            confirm_answer: true,
            input_answer: text.map(String::from),
        }
    }
}

impl Prompter for MockPrompter {
    fn confirm(&self, _question: &str) -> io::Result<bool> {
        Ok(self.confirm_answer)
    }

    fn input(&self, _question: &str) -> io::Result<Option<String>> {
        Ok(self.input_answer.clone())
    }
}

// ============================================================
// Session lifecycle
// ============================================================

#[test]
fn given_malformed_input_when_loading_then_no_session() {
    assert!(EditorSession::load("{not json", LevelCap::All).is_err());
}

#[test]
fn given_loaded_session_when_counting_levels_then_matches_fixture() {
    let session = session();
    let counts = session.level_counts();
    assert_eq!(counts.get(&1), Some(&3));
    assert_eq!(counts.get(&2), Some(&4));
    assert_eq!(counts.get(&3), Some(&3));
}

#[test]
fn given_level_cap_at_load_when_displaying_then_deep_nodes_absent() {
    let mut session = EditorSession::load(&fixture_input(), LevelCap::Max(1)).unwrap();
    session.expand_all();
    let display = session.display();
    assert!(display.contains("Animalia"));
    assert!(!display.contains("Chordata"));
}

#[test]
fn given_capped_session_when_relaxing_level_then_deep_nodes_return() {
    let mut session = EditorSession::load(&fixture_input(), LevelCap::Max(1)).unwrap();
    session.set_level(LevelCap::All);
    session.expand_all();
    assert!(session.display().contains("Mammalia"));
}

// ============================================================
// Prompted delete
// ============================================================

#[test]
fn given_confirmed_delete_when_running_then_subtree_removed() {
    let mut session = session();
    let outcome = session
        .delete_with_confirmation(&NodePath::new(vec![0]), &MockPrompter::confirming(true))
        .unwrap();
    assert_eq!(outcome, PromptedOutcome::Applied);
    assert_eq!(session.store().to_taxa().len(), 2);
    assert_eq!(session.view().roots[0].name, "Plantae");
}

#[test]
fn given_declined_delete_when_running_then_store_and_view_unchanged() {
    let mut session = session();
    let store_before = session.store().serialize().unwrap();
    let view_before = session.display();

    let outcome = session
        .delete_with_confirmation(&NodePath::new(vec![0]), &MockPrompter::confirming(false))
        .unwrap();

    assert_eq!(outcome, PromptedOutcome::Cancelled);
    assert_eq!(session.store().serialize().unwrap(), store_before);
    assert_eq!(session.display(), view_before);
}

#[test]
fn given_stale_path_when_deleting_with_confirmation_then_error_before_prompt() {
    let mut session = session();
    let result =
        session.delete_with_confirmation(&NodePath::new(vec![9]), &MockPrompter::confirming(true));
    assert!(result.is_err());
}

// ============================================================
// Prompted insert
// ============================================================

#[test]
fn given_name_from_prompt_when_inserting_then_child_appended() {
    let mut session = session();
    let outcome = session
        .insert_child_prompting(
            &NodePath::new(vec![2]),
            &MockPrompter::answering(Some("Basidiomycota")),
        )
        .unwrap();
    assert_eq!(outcome, PromptedOutcome::Applied);
    assert_eq!(session.store().to_taxa()[2].children[0].name, "Basidiomycota");
}

#[test]
fn given_cancelled_prompt_when_inserting_then_no_mutation() {
    let mut session = session();
    let before = session.store().serialize().unwrap();
    let outcome = session
        .insert_child_prompting(&NodePath::new(vec![2]), &MockPrompter::answering(None))
        .unwrap();
    assert_eq!(outcome, PromptedOutcome::Cancelled);
    assert_eq!(session.store().serialize().unwrap(), before);
}

#[test]
fn given_blank_answer_when_inserting_then_treated_as_cancel() {
    let mut session = session();
    let before = session.store().serialize().unwrap();
    let outcome = session
        .insert_child_prompting(&NodePath::new(vec![2]), &MockPrompter::answering(Some("   ")))
        .unwrap();
    assert_eq!(outcome, PromptedOutcome::Cancelled);
    assert_eq!(session.store().serialize().unwrap(), before);
}

// ============================================================
// End-to-end edit cycle
// ============================================================

#[test]
fn given_edit_sequence_when_exporting_then_all_changes_present() {
    let mut session = session();
    session
        .rename(&NodePath::new(vec![0]), "Animal kingdom")
        .unwrap();
    session
        .insert_child(&NodePath::new(vec![2]), "Ascomycota")
        .unwrap();
    session.delete(&NodePath::new(vec![1])).unwrap();
    session
        .set_pending_text(&NodePath::new(vec![1, 0]), "Ascomycota (sac fungi)")
        .unwrap();

    let exported = session.export().unwrap();
    let taxa: serde_json::Value = serde_json::from_str(&exported).unwrap();
    assert_eq!(taxa[0]["name"], "Animal kingdom");
    assert_eq!(taxa[1]["name"], "Fungi");
    assert_eq!(taxa[1]["children"][0]["name"], "Ascomycota (sac fungi)");
    assert!(taxa.get(2).is_none());
}

#[test]
fn given_session_when_exporting_to_file_then_file_round_trips() {
    let mut session = session();
    session
        .rename(&NodePath::new(vec![2]), "Fungi kingdom")
        .unwrap();

    let tmp = TempDir::new().unwrap();
    let target = tmp.path().join("taxonomy_updated.json");
    session
        .export_to_file(Arc::new(RealFileSystem), &target)
        .unwrap();

    let written = std::fs::read_to_string(&target).unwrap();
    let reloaded = EditorSession::load(&written, LevelCap::All).unwrap();
    assert_eq!(reloaded.store().to_taxa()[2].name, "Fungi kingdom");
}
