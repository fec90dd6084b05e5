use inkpad::config::{SearchConfig, Theme};
use inkpad::error::{InkpadError, SearchError};
use inkpad::notify::{RecordingNotifier, Severity};
use inkpad::search::{FindReplaceEngine, ReplaceAllOutcome, ReplaceOutcome, SearchOutcome};
use inkpad::surface::{DocumentSurface, MemorySurface};
use std::rc::Rc;

fn engine() -> (FindReplaceEngine, RecordingNotifier) {
    let notifier = RecordingNotifier::new();
    let engine = FindReplaceEngine::new(
        &SearchConfig::default(),
        Theme::Light,
        Rc::new(notifier.clone()),
    );
    (engine, notifier)
}

#[test]
fn find_and_cycle_through_matches() {
    let mut surface = MemorySurface::new("<p>The cat sat on the cat mat.</p>");
    let (mut engine, _) = engine();

    assert_eq!(engine.find(&mut surface, "cat").unwrap(), SearchOutcome::Found(2));
    assert_eq!(engine.cursor(), Some(0));
    assert_eq!(engine.find_next(&mut surface).unwrap(), Some(1));
    assert_eq!(engine.find_next(&mut surface).unwrap(), Some(0));
    assert_eq!(engine.find_previous(&mut surface).unwrap(), Some(1));
}

#[test]
fn metacharacters_match_literally() {
    let mut surface = MemorySurface::new("a.b.c");
    let (mut engine, _) = engine();
    assert_eq!(engine.find(&mut surface, ".").unwrap(), SearchOutcome::Found(2));

    let mut surface = MemorySurface::new("(1+1)*2 = 4, 1+1 = 2");
    assert_eq!(engine.find(&mut surface, "1+1").unwrap(), SearchOutcome::Found(2));
}

#[test]
fn matching_ignores_case() {
    let mut surface = MemorySurface::new("<p>Cat CAT cat</p>");
    let (mut engine, _) = engine();
    assert_eq!(engine.find(&mut surface, "cAt").unwrap(), SearchOutcome::Found(3));
}

#[test]
fn tags_and_attributes_are_never_matched() {
    let mut surface =
        MemorySurface::new(r#"<p class="span">a <span title="span">span</span></p>"#);
    let (mut engine, _) = engine();
    assert_eq!(engine.find(&mut surface, "span").unwrap(), SearchOutcome::Found(1));
    assert!(surface
        .as_str()
        .contains(r#"<span title="span"><mark class="search-highlight""#));
}

#[test]
fn entities_are_matched_as_decoded_text() {
    let mut surface = MemorySurface::new("<p>Tom &amp; Jerry</p>");
    let (mut engine, _) = engine();
    assert_eq!(engine.find(&mut surface, "m & J").unwrap(), SearchOutcome::Found(1));

    engine.clear_highlights(&mut surface);
    assert_eq!(surface.as_str(), "<p>Tom &amp; Jerry</p>");
}

#[test]
fn clear_restores_original_markup() {
    let original = "<h1>Notes</h1><p>One <em>note</em>, two notes.</p>";
    let mut surface = MemorySurface::new(original);
    let (mut engine, _) = engine();

    engine.find(&mut surface, "note").unwrap();
    assert_ne!(surface.as_str(), original);
    assert_eq!(engine.clear_highlights(&mut surface), 3);
    assert_eq!(surface.as_str(), original);
    assert!(!engine.is_active());
}

#[test]
fn repeated_find_is_idempotent() {
    let mut surface = MemorySurface::new("<p>abc abc</p><p>ABC</p>");
    let (mut engine, _) = engine();

    engine.find(&mut surface, "abc").unwrap();
    let first_content = surface.content();
    let first: Vec<_> = engine.matches().iter().map(|m| m.range.clone()).collect();

    engine.find(&mut surface, "abc").unwrap();
    let second: Vec<_> = engine.matches().iter().map(|m| m.range.clone()).collect();
    assert_eq!(first, second);
    assert_eq!(surface.content(), first_content);
}

#[test]
fn replace_all_does_not_rescan_inserted_text() {
    let mut surface = MemorySurface::new("cat cat");
    let (mut engine, notifier) = engine();

    let outcome = engine.replace_all(&mut surface, "cat", "catcat").unwrap();
    assert_eq!(outcome, ReplaceAllOutcome::Replaced(2));
    assert_eq!(surface.as_str(), "catcat catcat");
    assert!(notifier.last().unwrap().message.contains('2'));
}

#[test]
fn replace_all_without_matches_leaves_content() {
    let mut surface = MemorySurface::new("<p>dog</p>");
    let (mut engine, notifier) = engine();

    let outcome = engine.replace_all(&mut surface, "cat", "x").unwrap();
    assert_eq!(outcome, ReplaceAllOutcome::NoMatches);
    assert_eq!(surface.as_str(), "<p>dog</p>");
    assert_eq!(notifier.last().unwrap().severity, Severity::Warning);
}

#[test]
fn replace_current_falls_back_to_selection() {
    let mut surface = MemorySurface::new("<p>Hello world</p>");
    let (mut engine, _) = engine();
    assert!(surface.select_first("world"));

    let outcome = engine.replace_current(&mut surface, "World", "there").unwrap();
    assert_eq!(outcome, ReplaceOutcome::Replaced);
    assert_eq!(surface.as_str(), "<p>Hello there</p>");
}

#[test]
fn replace_current_without_target_changes_nothing() {
    let mut surface = MemorySurface::new("<p>Hello world</p>");
    let (mut engine, notifier) = engine();
    assert!(surface.select_first("Hello"));

    let outcome = engine.replace_current(&mut surface, "world", "there").unwrap();
    assert_eq!(outcome, ReplaceOutcome::NothingToReplace);
    assert_eq!(surface.as_str(), "<p>Hello world</p>");
    assert_eq!(notifier.last().unwrap().severity, Severity::Warning);
}

#[test]
fn replace_current_walks_all_matches() {
    let mut surface = MemorySurface::new("<p>x y x y x</p>");
    let (mut engine, _) = engine();
    engine.find(&mut surface, "x").unwrap();

    for remaining in (0..3).rev() {
        engine.replace_current(&mut surface, "x", "z").unwrap();
        assert_eq!(engine.matches().len(), remaining);
    }
    assert_eq!(surface.as_str(), "<p>z y z y z</p>");
}

#[test]
fn edits_outside_engine_trigger_rescan() {
    let mut surface = MemorySurface::new("<p>cat</p>");
    let (mut engine, _) = engine();
    engine.find(&mut surface, "cat").unwrap();

    surface.set_content("<p>cat and cat</p>");
    assert_eq!(engine.find_next(&mut surface).unwrap(), Some(0));
    assert_eq!(engine.matches().len(), 2);
}

#[test]
fn empty_terms_are_rejected_everywhere() {
    let mut surface = MemorySurface::new("text");
    let (mut engine, _) = engine();

    assert_eq!(
        engine.find(&mut surface, ""),
        Err(InkpadError::Search(SearchError::EmptySearchTerm))
    );
    assert!(engine.replace_current(&mut surface, " ", "x").is_err());
    assert!(engine.replace_all(&mut surface, "\t", "x").is_err());
    assert_eq!(surface.as_str(), "text");
}

#[test]
fn stray_lt_in_text_keeps_markers_flat() {
    let original = "if a<b then c";
    let mut surface = MemorySurface::new(original);
    let (mut engine, _) = engine();

    assert_eq!(engine.find(&mut surface, "c").unwrap(), SearchOutcome::Found(1));
    let first = surface.content();
    assert_eq!(engine.find(&mut surface, "c").unwrap(), SearchOutcome::Found(1));
    assert_eq!(surface.content(), first);
    assert_eq!(surface.as_str().matches("<mark ").count(), 1);

    assert_eq!(engine.clear_highlights(&mut surface), 1);
    assert_eq!(surface.as_str(), original);
}

#[test]
fn text_after_stray_lt_is_searchable() {
    let mut surface = MemorySurface::new("<p>if a<b then c</p>");
    let (mut engine, _) = engine();
    assert_eq!(engine.find(&mut surface, "c").unwrap(), SearchOutcome::Found(1));
    assert_eq!(engine.find(&mut surface, "b then").unwrap(), SearchOutcome::Found(1));
}
