//! Selection - a list with any number of selected items.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use super::list::{ListCursor, draw_scrollbar, split_scrollbar};
use super::{Common, Native, Widget, WidgetBase, resolve_dimension};
use crate::error::{Error, Result};
use crate::key::Key;
use crate::renderer::FrameBuffer;
use crate::screen::Screen;
use crate::text::{string_width, truncate_to_width};
use crate::types::{Attr, ExitType, ObjectType, Rect, ScrollBar, Size};

struct SelectionState {
    common: Common,
    items: Vec<String>,
    marker: String,
    unmarked: String,
    highlight: Attr,
    scrollbar: ScrollBar,
    cursor: ListCursor,
    selected: BTreeSet<usize>,
}

impl SelectionState {
    fn view(&self) -> usize {
        self.common.body().height.max(1) as usize
    }
}

impl Native for SelectionState {
    fn common(&self) -> &Common {
        &self.common
    }

    fn common_mut(&mut self) -> &mut Common {
        &mut self.common
    }

    fn draw_body(&self, buf: &mut FrameBuffer, area: Rect) {
        let (list, bar) = split_scrollbar(area, self.scrollbar);
        for (row, index) in self.cursor.visible(list.height.max(0) as usize) {
            let prefix = if self.selected.contains(&index) { &self.marker } else { &self.unmarked };
            let text = format!("{prefix}{}", self.items[index]);
            let attrs = if index == self.cursor.current { self.highlight } else { Attr::NONE };
            buf.draw_text(list.x, list.y + row as i32, truncate_to_width(&text, list.width), attrs);
        }
        if let Some(x) = bar {
            draw_scrollbar(buf, x, list, &self.cursor);
        }
    }

    fn inject(&mut self, key: Key) -> Option<ExitType> {
        let view = self.view();
        if self.cursor.navigate(key, view) {
            return None;
        }
        match key {
            Key::Char(' ') => {
                let current = self.cursor.current;
                if !self.selected.remove(&current) {
                    self.selected.insert(current);
                }
            }
            Key::Enter => return Some(ExitType::Normal),
            Key::Escape => return Some(ExitType::EscapeHit),
            _ => {}
        }
        None
    }

    fn clean(&mut self) {
        self.selected.clear();
    }
}

/// A list of items that can each be toggled on or off.
pub struct Selection {
    base: WidgetBase,
    state: Rc<RefCell<SelectionState>>,
}

impl Selection {
    /// Create a selection list.
    ///
    /// Selected items are prefixed with the configured marker (`-->` by
    /// default), the others with as many spaces.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        screen: &Screen,
        x: i32,
        y: i32,
        height: i32,
        width: i32,
        scrollbar: ScrollBar,
        title: &str,
        items: &[&str],
        highlight: Attr,
        boxed: bool,
    ) -> Result<Self> {
        if items.is_empty() {
            tracing::warn!("selection list without items");
            return Err(Error::resource(ObjectType::Selection, "no items"));
        }

        let mut common = Common::new(screen, x, y, title, boxed);
        common.fit_outer(Size::new(
            resolve_dimension(screen.width() - x, width),
            resolve_dimension(screen.height() - y, height),
        ));
        let marker = screen.context().config().selection_marker.clone();
        let unmarked = " ".repeat(string_width(&marker) as usize);

        let state = Rc::new(RefCell::new(SelectionState {
            common,
            items: items.iter().map(|s| s.to_string()).collect(),
            marker,
            unmarked,
            highlight,
            scrollbar,
            cursor: ListCursor::new(items.len()),
            selected: BTreeSet::new(),
        }));
        let base = WidgetBase::new(screen, ObjectType::Selection, state.clone())?;
        Ok(Self { base, state })
    }

    /// Indices of the selected items, ascending.
    pub fn value(&self) -> Vec<usize> {
        self.state.borrow().selected.iter().copied().collect()
    }

    /// Select exactly `indices` and redraw. Indices past the end are ignored.
    pub fn set_value(&self, indices: &[usize]) -> Result<()> {
        {
            let mut state = self.state.borrow_mut();
            let len = state.items.len();
            state.selected = indices
                .iter()
                .copied()
                .filter(|&i| {
                    if i >= len {
                        tracing::warn!(index = i, len, "ignoring out-of-range selection");
                    }
                    i < len
                })
                .collect();
        }
        self.base.redraw()
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.state.borrow().selected.contains(&index)
    }

    /// Index of the item under the cursor.
    pub fn current_item(&self) -> usize {
        self.state.borrow().cursor.current
    }

    /// Move the cursor to `index`, clamped to the list.
    pub fn set_current_item(&self, index: usize) -> Result<()> {
        {
            let mut state = self.state.borrow_mut();
            let view = state.view();
            state.cursor.set_current(index, view);
        }
        self.base.redraw()
    }
}

impl Widget for Selection {
    fn base(&self) -> &WidgetBase {
        &self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::config::TkConfig;
    use crate::context::Context;
    use crate::key::parse_keys;

    fn screen_with(config: TkConfig) -> (Screen, MemoryBackend) {
        let backend = MemoryBackend::new(30, 10);
        let ctx = Context::with_config(backend.clone(), config).unwrap();
        (Screen::new(&ctx).unwrap(), backend)
    }

    fn selection(screen: &Screen) -> Selection {
        Selection::new(
            screen,
            0,
            0,
            6,
            16,
            ScrollBar::None,
            "Pick",
            &["one", "two", "three", "four"],
            Attr::INVERSE,
            true,
        )
        .unwrap()
    }

    #[test]
    fn test_space_toggles() {
        let (screen, _) = screen_with(TkConfig::default());
        let sel = selection(&screen);
        let keys = parse_keys("<Space><Down><Down><Space><Up><Space><Space><Enter>").unwrap();
        assert_eq!(sel.activate(Some(&keys)).unwrap(), ExitType::Normal);
        assert_eq!(sel.value(), vec![0, 2]);
    }

    #[test]
    fn test_markers_rendered() {
        let (screen, backend) = screen_with(TkConfig::default());
        let sel = selection(&screen);
        sel.set_value(&[1]).unwrap();
        assert_eq!(backend.row_text(1), "│     Pick     │");
        assert_eq!(backend.row_text(2), "│   one        │");
        assert_eq!(backend.row_text(3), "│-->two        │");
    }

    #[test]
    fn test_custom_marker() {
        let config = TkConfig {
            selection_marker: "* ".to_string(),
            ..TkConfig::default()
        };
        let (screen, backend) = screen_with(config);
        let sel = selection(&screen);
        sel.set_value(&[0]).unwrap();
        assert_eq!(backend.row_text(2), "│* one         │");
        assert_eq!(backend.row_text(3), "│  two         │");
    }

    #[test]
    fn test_set_value_ignores_out_of_range() {
        let (screen, _) = screen_with(TkConfig::default());
        let sel = selection(&screen);
        sel.set_value(&[3, 9, 1]).unwrap();
        assert_eq!(sel.value(), vec![1, 3]);
        assert!(sel.is_selected(3));

        sel.clear().unwrap();
        assert!(sel.value().is_empty());
    }

    #[test]
    fn test_empty_items_rejected() {
        let (screen, _) = screen_with(TkConfig::default());
        let result = Selection::new(&screen, 0, 0, 5, 10, ScrollBar::None, "", &[], Attr::NONE, true);
        assert!(matches!(result, Err(Error::ResourceCreation { kind: ObjectType::Selection, .. })));
    }
}
