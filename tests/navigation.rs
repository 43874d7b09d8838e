//! Navigation tests
//!
//! Commands are executed directly through the engine so that every scan runs
//! against a real screen, session and handler stack.

mod common;

use brlkeys::keytable::{Block, Cmd};
use brlkeys::{Alert, Effect, Preferences, TextScreen};
use common::*;

// ========================================================================
// Paragraphs
// ========================================================================

#[test]
fn test_previous_paragraph_from_first_line_of_next() {
    let mut engine = test_engine(&["text one", "text two", "", "", "text three"], 10);
    run_block(&mut engine, Block::GotoLine, 4);
    assert_eq!(engine.session().position(), (0, 4));

    run(&mut engine, Cmd::PrevParagraph);
    assert_eq!(engine.session().position(), (0, 0));
}

#[test]
fn test_previous_paragraph_within_paragraph() {
    let mut engine = test_engine(&["", "alpha", "beta", "gamma"], 10);
    run_block(&mut engine, Block::GotoLine, 3);

    run(&mut engine, Cmd::PrevParagraph);
    assert_eq!(engine.session().position(), (0, 1));
}

#[test]
fn test_next_paragraph_and_bounce_at_end() {
    let mut engine = test_engine(&["text one", "text two", "", "", "text three"], 10);

    run(&mut engine, Cmd::NextParagraph);
    assert_eq!(engine.session().position(), (0, 4));
    engine.take_effects();

    run(&mut engine, Cmd::NextParagraph);
    assert_eq!(engine.session().position(), (0, 4));
    assert_eq!(take_alerts(&mut engine), vec![Alert::Bounce]);
}

// ========================================================================
// Prompts
// ========================================================================

#[test]
fn test_prompt_from_first_word() {
    let mut engine = test_engine(&["$ ls", "a.txt b.txt", "$ pwd", "/home"], 20);

    run(&mut engine, Cmd::NextPrompt);
    assert_eq!(engine.session().position(), (0, 2));

    run(&mut engine, Cmd::PrevPrompt);
    assert_eq!(engine.session().position(), (0, 0));
}

#[test]
fn test_prompt_from_patterns() {
    let lines = ["user@host:~$ make", "error", "user@host:~$ ls", "root# id"];
    let mut engine = test_engine(&lines, 20);
    let mut prefs = Preferences::default();
    prefs.prompt_patterns = vec![r"\w+@\w+:\S*\$ ".to_string(), "root# ".to_string()];
    engine.set_preferences(prefs);

    run(&mut engine, Cmd::NextPrompt);
    assert_eq!(engine.session().position(), (0, 2));
    run(&mut engine, Cmd::NextPrompt);
    assert_eq!(engine.session().position(), (0, 3));
    engine.take_effects();

    run(&mut engine, Cmd::NextPrompt);
    assert_eq!(take_alerts(&mut engine), vec![Alert::Bounce]);
}

// ========================================================================
// Identical lines
// ========================================================================

#[test]
fn test_different_line_escalates_skip_alerts() {
    let mut engine = test_engine(&["same", "same", "same", "same", "same", "other"], 10);

    run(&mut engine, Cmd::NextDifferentLine);
    assert_eq!(engine.session().position(), (0, 5));
    assert_eq!(
        take_alerts(&mut engine),
        vec![Alert::SkipFirst, Alert::SkipOne, Alert::SkipOne, Alert::SkipSeveral]
    );

    run(&mut engine, Cmd::PrevDifferentLine);
    assert_eq!(engine.session().position(), (0, 4));
    assert!(take_alerts(&mut engine).is_empty());
}

#[test]
fn test_different_line_stops_at_cursor() {
    let mut screen = TextScreen::from_lines(&["same", "same", "same", "other"]);
    screen.set_cursor(1, 2);
    let mut engine = test_engine_with(screen, Preferences::default(), 10);

    run(&mut engine, Cmd::NextDifferentLine);
    assert_eq!(engine.session().position(), (0, 2));
}

#[test]
fn test_different_line_at_edge_bounces() {
    let mut engine = test_engine(&["same", "same"], 10);

    run(&mut engine, Cmd::PrevDifferentLine);
    assert_eq!(take_alerts(&mut engine), vec![Alert::Bounce]);

    run(&mut engine, Cmd::NextDifferentLine);
    assert_eq!(engine.session().position(), (0, 1));
    assert_eq!(take_alerts(&mut engine), vec![Alert::SkipFirst, Alert::Bounce]);
}

#[test]
fn test_attributes_mode_compares_highlighting() {
    let mut screen = TextScreen::from_lines(&["aaaa", "bbbb", "cccc"]);
    screen.set_attributes(2, 0..4, 7);
    let mut engine = test_engine_with(screen, Preferences::default(), 10);

    run(&mut engine, Cmd::AttributesDown);
    assert_eq!(engine.session().position(), (0, 2));
    run(&mut engine, Cmd::Top);

    // Text comparison switches to attributes in attributes display mode
    run(&mut engine, Cmd::DisplayMode);
    engine.take_effects();
    run(&mut engine, Cmd::NextDifferentLine);
    assert_eq!(engine.session().position(), (0, 2));
    assert_eq!(take_alerts(&mut engine), vec![Alert::SkipFirst]);
}

// ========================================================================
// Cursor, anchor and marks
// ========================================================================

#[test]
fn test_home_back_return() {
    let mut screen = TextScreen::from_lines(&["top", "middle", "bottom"]).with_columns(30);
    screen.set_cursor(25, 2);
    let mut engine = test_engine_with(screen, Preferences::default(), 10);

    run(&mut engine, Cmd::Home);
    assert_eq!(engine.session().position(), (20, 2));

    run(&mut engine, Cmd::Back);
    assert_eq!(engine.session().position(), (0, 0));

    // Away from the cursor RETURN goes home
    run(&mut engine, Cmd::Return);
    assert_eq!(engine.session().position(), (20, 2));

    // At the cursor RETURN goes back
    run(&mut engine, Cmd::Return);
    assert_eq!(engine.session().position(), (0, 0));
}

#[test]
fn test_home_without_cursor_bounces() {
    let mut engine = test_engine(&["no cursor here"], 10);
    run(&mut engine, Cmd::Home);
    assert_eq!(take_alerts(&mut engine), vec![Alert::Bounce]);
}

#[test]
fn test_set_left_and_marks() {
    let mut engine = test_engine(&["0123456789abcdefghij", "second"], 10);

    run_block(&mut engine, Block::SetLeft, 7);
    assert_eq!(engine.session().position(), (7, 0));
    run_block(&mut engine, Block::SetMark, 0);
    run(&mut engine, Cmd::BottomLeft);
    assert_eq!(engine.session().position(), (0, 1));
    run_block(&mut engine, Block::GotoMark, 0);
    assert_eq!(engine.session().position(), (7, 0));
}

#[test]
fn test_route_uses_window_offset() {
    let mut engine = test_engine(&["0123456789abcdefghij"], 10);
    run(&mut engine, Cmd::FullWindowRight);
    engine.take_effects();

    run_block(&mut engine, Block::Route, 4);
    assert_eq!(engine.take_effects(), vec![Effect::RouteCursor { column: 14, row: 0 }]);
}

// ========================================================================
// Indents and columns
// ========================================================================

#[test]
fn test_indent_search() {
    let lines = ["fn main() {", "    let x = 1;", "    call(x);", "}"];
    let mut engine = test_engine(&lines, 20);
    run_block(&mut engine, Block::GotoLine, 2);

    run_block(&mut engine, Block::PrevIndent, 2);
    assert_eq!(engine.session().position(), (0, 0));

    run_block(&mut engine, Block::NextIndent, 2);
    assert_eq!(engine.session().position(), (0, 3));
}

#[test]
fn test_different_character_search() {
    let mut engine = test_engine(&["abc", "abc", "axc", "abc"], 10);

    run_block(&mut engine, Block::NextDifferentChar, 1);
    assert_eq!(engine.session().position(), (0, 2));

    run_block(&mut engine, Block::PrevDifferentChar, 1);
    assert_eq!(engine.session().position(), (0, 1));
    engine.take_effects();

    run_block(&mut engine, Block::NextDifferentChar, 0);
    assert_eq!(take_alerts(&mut engine), vec![Alert::Bounce]);
}

#[test]
fn test_window_up_and_down() {
    let mut engine = test_engine(&["a", "b", "c"], 10);
    run(&mut engine, Cmd::WindowDown);
    assert_eq!(engine.session().position(), (0, 1));
    run(&mut engine, Cmd::WindowUp);
    assert_eq!(engine.session().position(), (0, 0));
    engine.take_effects();
    run(&mut engine, Cmd::WindowUp);
    assert_eq!(take_alerts(&mut engine), vec![Alert::Bounce]);
}
