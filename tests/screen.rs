//! Screen traversal and dialogs.

use std::cell::RefCell;
use std::fs;
use std::rc::Rc;

use cdk_tui::{
    Attr, Buttonbox, Context, DisplayType, Entry, ExitType, Flow, Key, Label, MemoryBackend,
    Menu, MenuLocation, MenuPosition, ObjectType, Screen, TkConfig, Widget, WidgetRef,
};

fn screen(width: i32, height: i32) -> (Screen, MemoryBackend) {
    let backend = MemoryBackend::new(width, height);
    let ctx = Context::new(backend.clone()).unwrap();
    (Screen::new(&ctx).unwrap(), backend)
}

fn entry(screen: &Screen, y: i32) -> Entry {
    Entry::new(screen, 0, y, "", "", DisplayType::Mixed, 10, 0, 0).unwrap()
}

#[test]
fn traverse_fills_widgets_in_order() {
    let (screen, backend) = screen(40, 12);
    let first = entry(&screen, 0);
    let _note = Label::new(&screen, 0, 3, "between", false).unwrap();
    let second = entry(&screen, 4);

    backend.push_str("ab<Tab>cd<Enter>").unwrap();
    assert_eq!(screen.traverse().unwrap(), ExitType::Normal);
    assert_eq!(first.value(), "ab");
    assert_eq!(second.value(), "cd");
    assert_eq!(screen.focused(), Some(second.widget_ref()));
}

#[test]
fn completing_a_widget_moves_to_the_next() {
    let (screen, backend) = screen(40, 12);
    let first = entry(&screen, 0);
    let second = entry(&screen, 4);

    backend.push_str("x<Enter>y<Esc>").unwrap();
    assert_eq!(screen.traverse().unwrap(), ExitType::EscapeHit);
    assert_eq!(first.value(), "x");
    assert_eq!(second.value(), "y");
}

#[test]
fn back_tab_wraps_to_the_last_widget() {
    let (screen, backend) = screen(40, 12);
    let first = entry(&screen, 0);
    let buttons = Buttonbox::new(&screen, 0, 4, 0, 0, "", 1, 2, &["OK", "No"], Attr::INVERSE, true).unwrap();

    backend.push_str("<BackTab><Right><Enter>").unwrap();
    assert_eq!(screen.traverse().unwrap(), ExitType::Normal);
    assert_eq!(buttons.value(), 1);
    assert_eq!(first.value(), "");
}

#[test]
fn traverse_sends_tab_through_pre_process() {
    let (screen, backend) = screen(40, 12);
    let first = entry(&screen, 0);
    let _second = entry(&screen, 4);

    let seen = Rc::new(RefCell::new(Vec::new()));
    let keys = seen.clone();
    first.set_pre_process(move |key| {
        keys.borrow_mut().push(key);
        Flow::Proceed
    });

    backend.push_str("a<Tab><Enter>").unwrap();
    assert_eq!(screen.traverse().unwrap(), ExitType::Normal);
    assert_eq!(*seen.borrow(), vec![Key::Char('a'), Key::Tab]);
}

#[test]
fn consumed_tab_keeps_the_focus() {
    let (screen, backend) = screen(40, 12);
    let first = entry(&screen, 0);
    let second = entry(&screen, 4);
    first.set_pre_process(|key| if key == Key::Tab { Flow::Consume } else { Flow::Proceed });

    backend.push_str("a<Tab>b<Enter>c<Enter>").unwrap();
    assert_eq!(screen.traverse().unwrap(), ExitType::Normal);
    assert_eq!(first.value(), "ab");
    assert_eq!(second.value(), "c");
}

#[test]
fn entry_below_minimum_holds_the_focus() {
    let (screen, backend) = screen(40, 12);
    let first = Entry::new(&screen, 0, 0, "", "", DisplayType::Mixed, 10, 1, 0).unwrap();
    let second = entry(&screen, 4);

    backend.push_str("<Tab><Enter>x<Tab>y<Enter>").unwrap();
    assert_eq!(screen.traverse().unwrap(), ExitType::Normal);
    assert_eq!(first.value(), "x");
    assert_eq!(second.value(), "y");
}

#[test]
fn traverse_opens_menu_pulldown() {
    let (screen, backend) = screen(30, 10);
    let note = Label::new(&screen, 2, 3, "visible", false).unwrap();
    let menu = Menu::new(
        &screen,
        &[&["File", "Open", "Save"], &["Help", "About"]],
        &[MenuLocation::Left, MenuLocation::Right],
        MenuPosition::Top,
        Attr::BOLD,
        Attr::NONE,
    )
    .unwrap();
    let name = entry(&screen, 7);

    let open = Rc::new(RefCell::new(Vec::new()));
    let seen = open.clone();
    let ctx = screen.context().clone();
    screen.set_callback(move |_: &Screen, w: WidgetRef, _: Key| {
        let shown = ctx.snapshot();
        seen.borrow_mut().push((w.obj_type, shown.contains_text("Open"), shown.contains_text("visible")));
        Flow::Proceed
    });

    backend.push_str("<Down><Enter>n<Esc>").unwrap();
    assert_eq!(screen.traverse().unwrap(), ExitType::EscapeHit);
    assert_eq!(menu.value(), (0, 1));
    assert_eq!(name.value(), "n");

    let seen = open.borrow();
    assert_eq!(seen.len(), 2);
    // The pull-down covers the label while the menu has the keyboard.
    assert_eq!(seen[0], (ObjectType::Menu, true, false));
    assert_eq!(seen[1], (ObjectType::Entry, false, true));
    assert!(!backend.contains_text("Open"));
    assert!(backend.contains_text("visible"));
    drop(note);
}

#[test]
fn refresh_draws_widgets_in_stacking_order() {
    let (screen, backend) = screen(20, 5);
    let under = Label::new(&screen, 0, 0, "under", false).unwrap();
    let _over = Label::new(&screen, 0, 0, "OVER", false).unwrap();

    screen.refresh().unwrap();
    assert_eq!(backend.row_text(0), "OVERr");

    under.raise();
    screen.refresh().unwrap();
    assert_eq!(backend.row_text(0), "under");
}

#[test]
fn file_chooser_returns_the_picked_path() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("notes.txt"), "n").unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();

    let (screen, backend) = screen(60, 20);
    // "..", "sub/", "notes.txt"
    backend.push_str("<Down><Down><Enter>").unwrap();
    let chosen = screen.choose_file_in("Open", dir.path()).unwrap();

    let expected = dir.path().canonicalize().unwrap().join("notes.txt");
    assert_eq!(chosen, Some(expected));
    assert!(screen.widgets().is_empty());
    assert!(!backend.contains_text("notes.txt"));
}

#[test]
fn cancelled_file_chooser_returns_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let (screen, backend) = screen(60, 20);

    backend.push_str("<Esc>").unwrap();
    assert_eq!(screen.choose_file_in("Open", dir.path()).unwrap(), None);
}

#[test]
fn file_chooser_starts_in_the_configured_directory() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("only.txt"), "o").unwrap();

    let backend = MemoryBackend::new(60, 20);
    let config = TkConfig {
        start_dir: Some(dir.path().to_path_buf()),
        ..TkConfig::default()
    };
    let ctx = Context::with_config(backend.clone(), config).unwrap();
    let screen = Screen::new(&ctx).unwrap();

    backend.push_str("<Down><Enter>").unwrap();
    let chosen = screen.choose_file("Open").unwrap();
    assert_eq!(chosen, Some(dir.path().canonicalize().unwrap().join("only.txt")));
}
