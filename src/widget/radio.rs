//! Radio - a list with exactly one selected item.

use std::cell::RefCell;
use std::rc::Rc;

use super::list::{ListCursor, draw_scrollbar, split_scrollbar};
use super::{Common, Native, Widget, WidgetBase, resolve_dimension};
use crate::error::{Error, Result};
use crate::key::Key;
use crate::renderer::FrameBuffer;
use crate::screen::Screen;
use crate::text::truncate_to_width;
use crate::types::{Attr, ExitType, ObjectType, Rect, ScrollBar, Size};

struct RadioState {
    common: Common,
    items: Vec<String>,
    choice: char,
    highlight: Attr,
    scrollbar: ScrollBar,
    cursor: ListCursor,
    selected: usize,
}

impl RadioState {
    fn view(&self) -> usize {
        self.common.body().height.max(1) as usize
    }
}

impl Native for RadioState {
    fn common(&self) -> &Common {
        &self.common
    }

    fn common_mut(&mut self) -> &mut Common {
        &mut self.common
    }

    fn draw_body(&self, buf: &mut FrameBuffer, area: Rect) {
        let (list, bar) = split_scrollbar(area, self.scrollbar);
        for (row, index) in self.cursor.visible(list.height.max(0) as usize) {
            let mark = if index == self.selected { self.choice } else { ' ' };
            let text = format!("[{mark}] {}", self.items[index]);
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
            Key::Char(' ') => self.selected = self.cursor.current,
            Key::Enter => return Some(ExitType::Normal),
            Key::Escape => return Some(ExitType::EscapeHit),
            _ => {}
        }
        None
    }
}

/// A list of items of which exactly one is selected.
pub struct Radio {
    base: WidgetBase,
    state: Rc<RefCell<RadioState>>,
}

impl Radio {
    /// Create a radio list.
    ///
    /// `height` and `width` are the outer size and follow
    /// [`resolve_dimension`] against the screen. `choice` marks the
    /// selected item; `highlight` marks the item under the cursor.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        screen: &Screen,
        x: i32,
        y: i32,
        scrollbar: ScrollBar,
        height: i32,
        width: i32,
        title: &str,
        items: &[&str],
        choice: char,
        default: usize,
        highlight: Attr,
        boxed: bool,
    ) -> Result<Self> {
        if items.is_empty() {
            tracing::warn!("radio list without items");
            return Err(Error::resource(ObjectType::Radio, "no items"));
        }
        if default >= items.len() {
            tracing::warn!(default, len = items.len(), "radio default out of range");
            return Err(Error::resource(
                ObjectType::Radio,
                format!("default item {default} out of range"),
            ));
        }

        let mut common = Common::new(screen, x, y, title, boxed);
        common.fit_outer(Size::new(
            resolve_dimension(screen.width() - x, width),
            resolve_dimension(screen.height() - y, height),
        ));

        let mut cursor = ListCursor::new(items.len());
        let view = common.body().height.max(1) as usize;
        cursor.set_current(default, view);

        let state = Rc::new(RefCell::new(RadioState {
            common,
            items: items.iter().map(|s| s.to_string()).collect(),
            choice,
            highlight,
            scrollbar,
            cursor,
            selected: default,
        }));
        let base = WidgetBase::new(screen, ObjectType::Radio, state.clone())?;
        Ok(Self { base, state })
    }

    /// Index of the selected item.
    pub fn value(&self) -> usize {
        self.state.borrow().selected
    }

    /// Select `index`, clamped to the list, and redraw.
    pub fn set_value(&self, index: usize) -> Result<()> {
        {
            let mut state = self.state.borrow_mut();
            let index = index.min(state.items.len() - 1);
            let view = state.view();
            state.selected = index;
            state.cursor.set_current(index, view);
        }
        self.base.redraw()
    }

    /// Index of the item under the cursor.
    pub fn current_item(&self) -> usize {
        self.state.borrow().cursor.current
    }

    pub fn items(&self) -> Vec<String> {
        self.state.borrow().items.clone()
    }
}

impl Widget for Radio {
    fn base(&self) -> &WidgetBase {
        &self.base
    }
}
