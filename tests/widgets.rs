//! Widget behaviour driven through the public API on an in-memory terminal.

use std::rc::Rc;

use cdk_tui::{
    Attr, Context, DisplayType, Entry, ExitType, Label, MemoryBackend, Point, Radio, Screen,
    ScrollBar, Widget,
};

fn context(width: i32, height: i32) -> (Rc<Context>, MemoryBackend) {
    let backend = MemoryBackend::new(width, height);
    let ctx = Context::new(backend.clone()).unwrap();
    (ctx, backend)
}

fn entry(screen: &Screen, x: i32, y: i32) -> Entry {
    Entry::new(screen, x, y, "", "", DisplayType::Mixed, 10, 0, 0).unwrap()
}

#[test]
fn widget_coordinates_are_screen_relative() {
    let (ctx, _) = context(60, 24);
    let screen = Screen::with_region(&ctx, 10, 5, 30, 12).unwrap();
    let e = entry(&screen, 2, 3);

    assert_eq!(e.position(), Point::new(12, 8));
    assert_eq!(e.relative_position(), Point::new(2, 3));

    e.move_to(1, 1, true, true).unwrap();
    assert_eq!(e.position(), Point::new(13, 9));
    assert_eq!(e.relative_position(), Point::new(3, 4));

    e.move_to(0, 0, false, true).unwrap();
    assert_eq!(e.position(), Point::new(10, 5));
}

#[test]
fn activation_reads_keys_from_the_terminal() {
    let (ctx, backend) = context(40, 10);
    let screen = Screen::new(&ctx).unwrap();
    let e = entry(&screen, 0, 0);

    backend.push_str("abc<Enter>").unwrap();
    assert_eq!(e.activate(None).unwrap(), ExitType::Normal);
    assert_eq!(e.value(), "abc");
    assert_eq!(e.exit_type(), ExitType::Normal);
    assert_eq!(ctx.last_key(), Some(cdk_tui::Key::Enter));
    assert_eq!(backend.pending_keys(), 0);
}

#[test]
fn exhausted_presets_end_early() {
    let (ctx, _) = context(40, 10);
    let screen = Screen::new(&ctx).unwrap();
    let e = entry(&screen, 0, 0);

    let keys = cdk_tui::parse_keys("ab").unwrap();
    assert_eq!(e.activate(Some(&keys)).unwrap(), ExitType::EarlyExit);
    assert_eq!(e.value(), "ab");
}

#[test]
fn running_out_of_input_is_an_error() {
    let (ctx, _) = context(40, 10);
    let screen = Screen::new(&ctx).unwrap();
    let e = entry(&screen, 0, 0);

    assert!(e.activate(None).is_err());
    assert_eq!(e.exit_type(), ExitType::Error);
}

#[test]
fn multi_line_label_keeps_every_row() {
    let (ctx, backend) = context(40, 10);
    let screen = Screen::new(&ctx).unwrap();
    let label = Label::new(&screen, 0, 0, "one\ntwo\n\nfour", true).unwrap();
    label.draw(true).unwrap();

    assert_eq!(label.rows(), vec!["one", "two", "", "four"]);
    assert_eq!(label.size().height, 6);
    assert_eq!(backend.row_text(1), "│one │");
    assert_eq!(backend.row_text(3), "│    │");
    assert_eq!(backend.row_text(4), "│four│");
}

#[test]
fn popup_label_returns_the_dismissing_key() {
    let (ctx, backend) = context(40, 10);
    let screen = Screen::new(&ctx).unwrap();

    backend.push_str("x").unwrap();
    let key = screen.popup_label("Saved").unwrap();
    assert_eq!(key, cdk_tui::Key::Char('x'));
    assert!(!backend.contains_text("Saved"));
    assert!(screen.widgets().is_empty());
}

#[test]
fn radio_selection_survives_navigation() {
    let (ctx, _) = context(40, 10);
    let screen = Screen::new(&ctx).unwrap();
    let radio = Radio::new(
        &screen,
        0,
        0,
        ScrollBar::None,
        6,
        20,
        "",
        &["a", "b", "c"],
        'X',
        0,
        Attr::INVERSE,
        true,
    )
    .unwrap();

    let keys = cdk_tui::parse_keys("<Down><Down><Space><Up><Enter>").unwrap();
    assert_eq!(radio.activate(Some(&keys)).unwrap(), ExitType::Normal);
    assert_eq!(radio.value(), 2);
    assert_eq!(radio.current_item(), 1);
}

#[test]
fn hidden_entry_masks_its_text() {
    let (ctx, backend) = context(40, 10);
    let screen = Screen::new(&ctx).unwrap();
    let e = Entry::new(&screen, 0, 0, "", "PIN ", DisplayType::Hidden, 6, 0, 6).unwrap();
    e.set_value("1234").unwrap();

    assert_eq!(e.value(), "1234");
    assert!(backend.contains_text("PIN ****.."));
    assert!(!backend.contains_text("1234"));
}
